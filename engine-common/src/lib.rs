// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The error type shared by [`engine_sort`](https://docs.rs/engine-sort) and
//! [`engine_planner`](https://docs.rs/engine-planner), plus the `Result` alias both
//! crates build their public APIs around.

use std::fmt;
use std::io;

/// The single error type returned by every fallible function in this workspace.
///
/// None of these are recoverable locally: a [`EngineError`] always means the
/// caller's request cannot be completed as given. Partial state (run files,
/// catalog borrows) is released by the producing object on drop, never by the
/// caller inspecting the error.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// A syscall or filesystem operation failed while the external sorter was
    /// managing run files (temp-file creation, truncation, mmap, read, write).
    #[error("I/O error in external sorter: {0}")]
    UnixError(#[from] io::Error),

    /// The planner hit a state its invariants say cannot happen: an
    /// unrecognized AST root, a condition that could not be attached to any
    /// scan or join, an unknown column type.
    #[error("internal planner error: {0}")]
    InternalError(String),

    /// A component was asked to do something its configuration forbids: no
    /// join executor enabled when a join is required, a sorter constructed
    /// with a zero-valued tunable, or a phase-ordered method called out of
    /// order.
    #[error("configuration error: {0}")]
    EngineConfigError(String),

    /// An `ORDER BY` (or other bare column reference) matched more than one
    /// of the query's selected tables.
    #[error("ambiguous column `{column}`: present in tables {candidates:?}")]
    AmbiguousColumn {
        column: String,
        candidates: Vec<String>,
    },

    /// A column reference did not resolve against any selected table's schema.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

/// The `Result` alias used throughout this workspace, mirroring the
/// single-error-type convention the rest of this codebase's crates use.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

impl EngineError {
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::InternalError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::EngineConfigError(msg.into())
    }

    pub fn ambiguous_column(column: impl Into<String>, candidates: Vec<String>) -> Self {
        EngineError::AmbiguousColumn {
            column: column.into(),
            candidates,
        }
    }

    pub fn unknown_column(column: impl Into<String>) -> Self {
        EngineError::UnknownColumn(column.into())
    }
}

/// Shorthand for building an `Err(EngineError::InternalError(..))`, in the
/// style of the `plan_err!`/`internal_err!` macros this codebase's planner
/// crates use to avoid `.map_err(|_| ...)` boilerplate at every call site.
#[macro_export]
macro_rules! internal_err {
    ($($arg:tt)*) => {
        Err($crate::EngineError::internal(format!($($arg)*)))
    };
}

/// Shorthand for building an `Err(EngineError::EngineConfigError(..))`.
#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        Err($crate::EngineError::config(format!($($arg)*)))
    };
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Write => write!(f, "write"),
            Phase::Read => write!(f, "read"),
            Phase::Done => write!(f, "done"),
        }
    }
}

/// The three lifecycle phases every [`engine_sort`] sorter session moves
/// through, in order. Shared here so the planner's and sorter's diagnostics
/// use the same vocabulary when logging phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Write,
    Read,
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_err_macro_builds_internal_error() {
        let result: Result<()> = internal_err!("bad root kind: {}", 42);
        match result {
            Err(EngineError::InternalError(msg)) => assert!(msg.contains("42")),
            _ => panic!("expected InternalError"),
        }
    }

    #[test]
    fn config_err_macro_builds_config_error() {
        let result: Result<()> = config_err!("no join executor enabled");
        assert!(matches!(result, Err(EngineError::EngineConfigError(_))));
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Write.to_string(), "write");
        assert_eq!(Phase::Read.to_string(), "read");
        assert_eq!(Phase::Done.to_string(), "done");
    }
}
