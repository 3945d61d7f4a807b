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

use std::path::PathBuf;

use engine_common::{config_err, Result};

/// The tunables an [`crate::ExternalMergeSorter`] is constructed with. All
/// three counts are immutable for the lifetime of the sorter.
#[derive(Debug, Clone)]
pub struct EmsConfig {
    /// Records held in the buffered reader used during the read phase.
    pub records_per_page: usize,
    /// Records held in one run file's mmap'd write buffer.
    pub records_per_file: usize,
    /// Width, in bytes, of one record. EMS never interprets these bytes.
    pub record_size: usize,
    /// Directory run files (`auxiliary_sort_fileXXXXXX`) are created in.
    pub scratch_dir: PathBuf,
}

impl EmsConfig {
    /// Builds a config rooted at the current working directory, matching the
    /// temp-file layout contract (`mkstemp`-style files in the working
    /// directory).
    pub fn new(
        records_per_page: usize,
        records_per_file: usize,
        record_size: usize,
    ) -> Result<Self> {
        Self::with_scratch_dir(
            records_per_page,
            records_per_file,
            record_size,
            PathBuf::from("."),
        )
    }

    pub fn with_scratch_dir(
        records_per_page: usize,
        records_per_file: usize,
        record_size: usize,
        scratch_dir: PathBuf,
    ) -> Result<Self> {
        if records_per_page == 0 {
            return config_err!("records_per_page must be non-zero");
        }
        if records_per_file == 0 {
            return config_err!("records_per_file must be non-zero");
        }
        if record_size == 0 {
            return config_err!("record_size must be non-zero");
        }
        Ok(Self {
            records_per_page,
            records_per_file,
            record_size,
            scratch_dir,
        })
    }
}
