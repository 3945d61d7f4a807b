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

use std::cmp::Ordering;

/// A total order over fixed-width records, parameterized by whatever
/// column-layout metadata the implementor captures.
///
/// EMS never interprets record bytes itself; it only ever calls `compare`.
/// The "opaque comparator argument" the specification describes is simply
/// whatever state an implementor closes over (column offsets, types, sort
/// direction) — Rust's closures and structs already carry that state, so
/// there is no separate argument parameter.
pub trait RecordComparator: Send + Sync {
    /// Compares the keys embedded in `lhs` and `rhs`. Must be a stable total
    /// order: for any fixed set of inputs this must always return the same
    /// relative ordering. EMS treats comparator panics as a programmer error,
    /// not a recoverable condition — comparators must be total.
    fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Ordering;
}

impl<F> RecordComparator for F
where
    F: Fn(&[u8], &[u8]) -> Ordering + Send + Sync,
{
    fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Ordering {
        self(lhs, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_implement_record_comparator() {
        let cmp: &dyn RecordComparator = &(|a: &[u8], b: &[u8]| a.cmp(b));
        assert_eq!(cmp.compare(&[1, 2], &[1, 3]), Ordering::Less);
    }
}
