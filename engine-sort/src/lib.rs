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

//! Two-phase external merge sort over fixed-width binary records.
//!
//! Records are written into mmap-backed run files, sorted in place once a
//! run fills up, then merged back in sorted order through a loser-tree
//! k-way merge during the read phase. See [`ExternalMergeSorter`] for the
//! write/end_write/begin_read/read state machine.

mod comparator;
mod config;
mod loser_tree;
mod run_reader;
mod run_writer;
mod sorter;

pub use comparator::RecordComparator;
pub use config::EmsConfig;
pub use sorter::ExternalMergeSorter;
