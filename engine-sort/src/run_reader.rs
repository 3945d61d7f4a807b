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

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};

use tempfile::TempPath;

use engine_common::Result;

/// Sequential, buffered read-phase view over one sorted run file. Holds the
/// run's [`TempPath`] only until the run is exhausted, at which point the
/// file is unlinked immediately rather than waiting for this reader to drop.
pub(crate) struct RunReader {
    reader: BufReader<File>,
    record_size: usize,
    front: Option<Vec<u8>>,
    path: Option<TempPath>,
}

impl RunReader {
    /// Opens `path` and primes `front` with the run's first record.
    pub(crate) fn open(path: TempPath, record_size: usize, buffer_records: usize) -> Result<Self> {
        let file = File::open(&path)?;
        let reader = BufReader::with_capacity(buffer_records.max(1) * record_size, file);
        let mut this = Self {
            reader,
            record_size,
            front: None,
            path: Some(path),
        };
        this.advance()?;
        Ok(this)
    }

    /// The run's current front record, or `None` if the run is exhausted.
    pub(crate) fn front(&self) -> Option<&[u8]> {
        self.front.as_deref()
    }

    /// Reads the next record into `front`, or unlinks the run file and
    /// clears `front` on EOF.
    pub(crate) fn advance(&mut self) -> Result<()> {
        let mut buf = vec![0u8; self.record_size];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => {
                self.front = Some(buf);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.front = None;
                if let Some(path) = self.path.take() {
                    path.close()?;
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
