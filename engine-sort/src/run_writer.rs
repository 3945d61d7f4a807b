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
use std::path::Path;

use memmap2::MmapMut;
use tempfile::TempPath;

use engine_common::{config_err, Result};

use crate::comparator::RecordComparator;

/// One run file's write-phase state: an mmap'd region, sized to
/// `capacity * record_size`, that records are appended into directly.
pub(crate) struct RunWriter {
    file: File,
    mmap: MmapMut,
    path: TempPath,
    capacity: usize,
    record_size: usize,
    pub(crate) index: usize,
}

impl RunWriter {
    pub(crate) fn new(scratch_dir: &Path, capacity: usize, record_size: usize) -> Result<Self> {
        let named = tempfile::Builder::new()
            .prefix("auxiliary_sort_file")
            .tempfile_in(scratch_dir)?;
        let (file, path) = named.into_parts();
        file.set_len((capacity * record_size) as u64)?;
        // Safety: `file` was just sized above and is exclusively owned by
        // this writer for the remainder of the write phase.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        log::trace!("opened run file {:?} (capacity={capacity} records)", path);
        Ok(Self {
            file,
            mmap,
            path,
            capacity,
            record_size,
            index: 0,
        })
    }

    /// Appends `record` and returns `true` if the run is now at capacity.
    pub(crate) fn push(&mut self, record: &[u8]) -> Result<bool> {
        if record.len() != self.record_size {
            return config_err!(
                "record length {} does not match record_size {}",
                record.len(),
                self.record_size
            );
        }
        if self.index >= self.capacity {
            return config_err!("run file is already at capacity ({})", self.capacity);
        }
        let offset = self.index * self.record_size;
        self.mmap[offset..offset + self.record_size].copy_from_slice(record);
        self.index += 1;
        Ok(self.index == self.capacity)
    }

    /// Sorts the written prefix, truncates the file to its exact used size,
    /// and releases the mapping, returning the run file's path for the read
    /// phase.
    pub(crate) fn finalize(mut self, comparator: &dyn RecordComparator) -> Result<TempPath> {
        let used = self.index;
        sort_records(
            &mut self.mmap[..used * self.record_size],
            self.record_size,
            used,
            comparator,
        );
        self.mmap.flush()?;
        self.file.set_len((used * self.record_size) as u64)?;
        drop(self.mmap);
        log::debug!("finalized run file {:?} ({used} records)", self.path);
        Ok(self.path)
    }
}

/// Sorts `len` fixed-width records packed into `buf` using `comparator`,
/// permuting the bytes in place.
fn sort_records(buf: &mut [u8], record_size: usize, len: usize, comparator: &dyn RecordComparator) {
    if len <= 1 {
        return;
    }
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_unstable_by(|&a, &b| {
        let lhs = &buf[a * record_size..(a + 1) * record_size];
        let rhs = &buf[b * record_size..(b + 1) * record_size];
        comparator.compare(lhs, rhs)
    });
    apply_permutation(buf, record_size, &order);
}

/// Rearranges `buf` in place so that `new[i] == old[order[i]]`, following
/// the cycles of `order` and moving one record-sized chunk at a time.
fn apply_permutation(buf: &mut [u8], record_size: usize, order: &[usize]) {
    let len = order.len();
    let mut done = vec![false; len];
    let mut tmp = vec![0u8; record_size];

    for i in 0..len {
        if done[i] {
            continue;
        }
        tmp.copy_from_slice(&buf[i * record_size..(i + 1) * record_size]);
        let mut j = i;
        loop {
            done[j] = true;
            let next = order[j];
            if next == i {
                buf[j * record_size..(j + 1) * record_size].copy_from_slice(&tmp);
                break;
            }
            copy_record(buf, record_size, j, next);
            j = next;
        }
    }
}

/// Copies the record at index `src` over the record at index `dst`.
/// `dst` and `src` must differ.
fn copy_record(buf: &mut [u8], record_size: usize, dst: usize, src: usize) {
    debug_assert_ne!(dst, src);
    let (lo, hi) = if dst < src { (dst, src) } else { (src, dst) };
    let (first, second) = buf.split_at_mut(hi * record_size);
    let hi_slice = &mut second[..record_size];
    let lo_slice = &mut first[lo * record_size..(lo + 1) * record_size];
    if dst < src {
        lo_slice.copy_from_slice(hi_slice);
    } else {
        hi_slice.copy_from_slice(lo_slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    struct IntKey;
    impl RecordComparator for IntKey {
        fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Ordering {
            let l = i32::from_le_bytes(lhs.try_into().unwrap());
            let r = i32::from_le_bytes(rhs.try_into().unwrap());
            l.cmp(&r)
        }
    }

    #[test]
    fn sort_records_orders_by_comparator() {
        let mut buf = Vec::new();
        for v in [3i32, 1, 4, 1] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        sort_records(&mut buf, 4, 4, &IntKey);
        let out: Vec<i32> = buf
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(out, vec![1, 1, 3, 4]);
    }

    #[test]
    fn write_then_finalize_round_trips_through_mmap() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RunWriter::new(dir.path(), 4, 4).unwrap();
        for v in [3i32, 1, 4, 1] {
            let full = writer.push(&v.to_le_bytes()).unwrap();
            assert_eq!(full, v == 1 && writer.index == 4);
        }
        let path = writer.finalize(&IntKey).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 16);
        let out: Vec<i32> = bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(out, vec![1, 1, 3, 4]);
        path.close().unwrap();
    }

    #[test]
    fn partial_run_truncates_to_used_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RunWriter::new(dir.path(), 4, 4).unwrap();
        for v in [9i32, 2] {
            writer.push(&v.to_le_bytes()).unwrap();
        }
        let path = writer.finalize(&IntKey).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 8);
        path.close().unwrap();
    }
}
