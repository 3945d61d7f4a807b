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

use std::sync::Arc;

use tempfile::TempPath;

use engine_common::{config_err, Phase, Result};

use crate::comparator::RecordComparator;
use crate::config::EmsConfig;
use crate::loser_tree::LoserTree;
use crate::run_reader::RunReader;
use crate::run_writer::RunWriter;

/// Two-phase external merge sorter over fixed-width records.
///
/// Records are accumulated into mmap'd run files during the write phase;
/// each run is sorted in place and flushed to disk once it reaches
/// [`EmsConfig::records_per_file`]. [`ExternalMergeSorter::end_write`] flushes
/// the final, possibly-partial run. [`ExternalMergeSorter::begin_read`] then
/// opens every run for buffered sequential reads and builds a loser tree over
/// them; [`ExternalMergeSorter::read`] drains records in sorted order one at
/// a time.
///
/// Calling a phase's methods out of order is a programmer error and returns
/// [`engine_common::EngineError::EngineConfigError`] rather than panicking.
pub struct ExternalMergeSorter {
    config: EmsConfig,
    comparator: Arc<dyn RecordComparator>,
    phase: Phase,
    current_writer: Option<RunWriter>,
    finalized_runs: Vec<TempPath>,
    read_state: Option<ReadState>,
}

struct ReadState {
    runs: Vec<RunReader>,
    tree: LoserTree,
}

impl ExternalMergeSorter {
    pub fn new(config: EmsConfig, comparator: Arc<dyn RecordComparator>) -> Self {
        Self {
            config,
            comparator,
            phase: Phase::Write,
            current_writer: None,
            finalized_runs: Vec::new(),
            read_state: None,
        }
    }

    /// Appends one record. Starts a fresh run file on demand and finalizes
    /// the current run once it fills up.
    pub fn write(&mut self, record: &[u8]) -> Result<()> {
        if self.phase != Phase::Write {
            return config_err!("write() called in the {} phase", self.phase);
        }
        if self.current_writer.is_none() {
            self.current_writer = Some(RunWriter::new(
                &self.config.scratch_dir,
                self.config.records_per_file,
                self.config.record_size,
            )?);
        }
        let full = self.current_writer.as_mut().expect("just set above").push(record)?;
        if full {
            self.flush_current_run()?;
        }
        Ok(())
    }

    /// Flushes any partially-filled run and moves out of the write phase.
    /// Must be called before [`ExternalMergeSorter::begin_read`].
    pub fn end_write(&mut self) -> Result<()> {
        if self.phase != Phase::Write {
            return config_err!("end_write() called in the {} phase", self.phase);
        }
        self.flush_current_run()?;
        self.phase = Phase::Done;
        log::debug!("write phase complete: {} runs", self.finalized_runs.len());
        Ok(())
    }

    fn flush_current_run(&mut self) -> Result<()> {
        if let Some(writer) = self.current_writer.take() {
            if writer.index > 0 {
                let path = writer.finalize(self.comparator.as_ref())?;
                self.finalized_runs.push(path);
            }
        }
        Ok(())
    }

    /// Opens every finalized run for buffered sequential reads and builds
    /// the loser tree that drives [`ExternalMergeSorter::read`].
    pub fn begin_read(&mut self) -> Result<()> {
        if self.phase != Phase::Done {
            return config_err!("begin_read() called before end_write() completed");
        }
        let mut runs = Vec::with_capacity(self.finalized_runs.len());
        for path in self.finalized_runs.drain(..) {
            runs.push(RunReader::open(
                path,
                self.config.record_size,
                self.config.records_per_page,
            )?);
        }
        let comparator = Arc::clone(&self.comparator);
        let tree = LoserTree::build(runs.len(), |i, j| {
            let lhs = runs[i].front().expect("loser tree never compares an exhausted run");
            let rhs = runs[j].front().expect("loser tree never compares an exhausted run");
            comparator.compare(lhs, rhs)
        });
        log::debug!("read phase begun over {} runs", runs.len());
        self.read_state = Some(ReadState { runs, tree });
        self.phase = Phase::Read;
        Ok(())
    }

    /// Returns the next record in sorted order, or `None` once every run is
    /// exhausted.
    pub fn read(&mut self) -> Result<Option<Vec<u8>>> {
        if self.phase != Phase::Read {
            return config_err!("read() called before begin_read()");
        }
        let comparator = Arc::clone(&self.comparator);
        let state = self
            .read_state
            .as_mut()
            .expect("Phase::Read always carries a read state");

        let winner = state.tree.winner();
        if winner < 0 {
            return Ok(None);
        }
        let run_idx = winner as usize;
        let record = state.runs[run_idx]
            .front()
            .expect("winner always has a front record")
            .to_vec();
        state.runs[run_idx].advance()?;

        let runs = &state.runs;
        let new_value = if runs[run_idx].front().is_some() { winner } else { -1 };
        state.tree.adjust(run_idx, new_value, |i, j| {
            let lhs = runs[i].front().expect("loser tree never compares an exhausted run");
            let rhs = runs[j].front().expect("loser tree never compares an exhausted run");
            comparator.compare(lhs, rhs)
        });
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    use engine_common::EngineError;

    fn int_comparator() -> Arc<dyn RecordComparator> {
        Arc::new(|lhs: &[u8], rhs: &[u8]| -> Ordering {
            let l = i32::from_le_bytes(lhs.try_into().unwrap());
            let r = i32::from_le_bytes(rhs.try_into().unwrap());
            l.cmp(&r)
        })
    }

    fn drain(sorter: &mut ExternalMergeSorter) -> Vec<i32> {
        let mut out = Vec::new();
        while let Some(rec) = sorter.read().unwrap() {
            out.push(i32::from_le_bytes(rec.try_into().unwrap()));
        }
        out
    }

    #[test]
    fn single_run_sorts_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmsConfig::with_scratch_dir(4, 16, 4, dir.path().to_path_buf()).unwrap();
        let mut sorter = ExternalMergeSorter::new(config, int_comparator());
        for v in [5i32, 3, 8, 1, 9, 2] {
            sorter.write(&v.to_le_bytes()).unwrap();
        }
        sorter.end_write().unwrap();
        sorter.begin_read().unwrap();
        assert_eq!(drain(&mut sorter), vec![1, 2, 3, 5, 8, 9]);
    }

    #[test]
    fn multiple_runs_merge_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        // records_per_file = 2 forces three runs over six records.
        let config = EmsConfig::with_scratch_dir(4, 2, 4, dir.path().to_path_buf()).unwrap();
        let mut sorter = ExternalMergeSorter::new(config, int_comparator());
        for v in [6i32, 1, 9, 4, 2, 8] {
            sorter.write(&v.to_le_bytes()).unwrap();
        }
        sorter.end_write().unwrap();
        sorter.begin_read().unwrap();
        assert_eq!(drain(&mut sorter), vec![1, 2, 4, 6, 8, 9]);
    }

    #[test]
    fn empty_input_drains_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmsConfig::with_scratch_dir(4, 4, 4, dir.path().to_path_buf()).unwrap();
        let mut sorter = ExternalMergeSorter::new(config, int_comparator());
        sorter.end_write().unwrap();
        sorter.begin_read().unwrap();
        assert_eq!(sorter.read().unwrap(), None);
    }

    #[test]
    fn phase_violations_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmsConfig::with_scratch_dir(4, 4, 4, dir.path().to_path_buf()).unwrap();
        let mut sorter = ExternalMergeSorter::new(config, int_comparator());
        assert!(matches!(sorter.read(), Err(EngineError::EngineConfigError(_))));
        assert!(matches!(sorter.begin_read(), Err(EngineError::EngineConfigError(_))));
        sorter.end_write().unwrap();
        assert!(matches!(
            sorter.write(&0i32.to_le_bytes()),
            Err(EngineError::EngineConfigError(_))
        ));
        assert!(matches!(sorter.end_write(), Err(EngineError::EngineConfigError(_))));
    }

    #[test]
    fn run_files_are_unlinked_once_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmsConfig::with_scratch_dir(4, 2, 4, dir.path().to_path_buf()).unwrap();
        let mut sorter = ExternalMergeSorter::new(config, int_comparator());
        for v in [3i32, 1, 4, 1, 5, 9] {
            sorter.write(&v.to_le_bytes()).unwrap();
        }
        sorter.end_write().unwrap();
        sorter.begin_read().unwrap();
        drain(&mut sorter);
        drop(sorter);
        let leftover = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with("auxiliary_sort_file")
            })
            .count();
        assert_eq!(leftover, 0);
    }
}
