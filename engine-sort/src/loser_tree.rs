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

//! A tournament tree for k-way merge that stores each internal node's
//! *loser*, with the overall winner kept in a dedicated root slot
//! (`heap[0]`). One comparison per level on `adjust`, versus two for a
//! binary min-heap.
//!
//! The tree is intentionally ignorant of I/O: it operates on run indices
//! `0..k` and asks its caller to compare two run indices' current front
//! records via `cmp`. A run index of `-1` is the dummy sentinel and always
//! loses without invoking `cmp`.

use std::cmp::Ordering;

pub(crate) struct LoserTree {
    heap: Vec<i64>,
    base: usize,
}

impl LoserTree {
    /// Builds a loser tree over `k` runs. `cmp(i, j)` compares the current
    /// front record of run `i` against that of run `j`; it is never called
    /// with a dummy index.
    pub(crate) fn build(k: usize, mut cmp: impl FnMut(usize, usize) -> Ordering) -> Self {
        if k == 0 {
            return Self {
                heap: vec![-1],
                base: 1,
            };
        }

        let mut base = 1usize;
        while base < k {
            base <<= 1;
        }
        let size = 2 * base;

        let mut heap = vec![-1i64; size];
        let mut winner = vec![-1i64; size];
        for run in 0..k {
            winner[base + run] = run as i64;
        }

        for i in (1..base).rev() {
            let (w, loser) = duel(winner[2 * i], winner[2 * i + 1], &mut cmp);
            winner[i] = w;
            heap[i] = loser;
        }
        heap[0] = winner[1];
        heap[base..size].copy_from_slice(&winner[base..size]);

        Self { heap, base }
    }

    /// The run index currently holding the globally smallest record, or `-1`
    /// if every run has been exhausted (or `k == 0`).
    pub(crate) fn winner(&self) -> i64 {
        self.heap[0]
    }

    /// Refills leaf `run_idx` with `new_value` (its run index again, or `-1`
    /// if that run just hit EOF) and re-derives the winner by walking from
    /// that leaf to the root, comparing the traveling candidate against each
    /// ancestor's stored loser.
    pub(crate) fn adjust(
        &mut self,
        run_idx: usize,
        new_value: i64,
        mut cmp: impl FnMut(usize, usize) -> Ordering,
    ) {
        let leaf = self.base + run_idx;
        self.heap[leaf] = new_value;

        let mut travelling = new_value;
        let mut pos = leaf;
        while pos > 1 {
            let parent = pos / 2;
            let (winner, loser) = duel(travelling, self.heap[parent], &mut cmp);
            self.heap[parent] = loser;
            travelling = winner;
            pos = parent;
        }
        self.heap[0] = travelling;
    }
}

/// Resolves a single match between two candidates, each either a run index
/// or the dummy sentinel `-1`. Dummies always lose. Ties favor the lower run
/// index, which is always the leftmost of the two in run declaration order.
fn duel(a: i64, b: i64, cmp: &mut impl FnMut(usize, usize) -> Ordering) -> (i64, i64) {
    match (a, b) {
        (-1, -1) => (-1, -1),
        (-1, _) => (b, a),
        (_, -1) => (a, b),
        (a, b) => match cmp(a as usize, b as usize) {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal => {
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge_all(values: &[Vec<i32>]) -> Vec<i32> {
        let mut cursors = vec![0usize; values.len()];
        let cmp = |i: usize, j: usize, cursors: &[usize]| values[i][cursors[i]].cmp(&values[j][cursors[j]]);
        let mut tree = LoserTree::build(values.len(), |i, j| cmp(i, j, &cursors));
        let mut out = Vec::new();
        loop {
            let winner = tree.winner();
            if winner < 0 {
                break;
            }
            let run = winner as usize;
            out.push(values[run][cursors[run]]);
            cursors[run] += 1;
            let new_value = if cursors[run] < values[run].len() {
                winner
            } else {
                -1
            };
            tree.adjust(run, new_value, |i, j| cmp(i, j, &cursors));
        }
        out
    }

    #[test]
    fn k_zero_never_has_a_winner() {
        let tree = LoserTree::build(0, |_, _| Ordering::Equal);
        assert_eq!(tree.winner(), -1);
    }

    #[test]
    fn k_one_is_a_no_op_walk() {
        let out = merge_all(&[vec![1, 2, 3]]);
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn three_way_merge_is_sorted() {
        let out = merge_all(&[vec![2, 5], vec![1, 9], vec![3, 7]]);
        assert_eq!(out, vec![1, 2, 3, 5, 7, 9]);
    }

    #[test]
    fn non_power_of_two_fan_in() {
        let out = merge_all(&[vec![1, 10], vec![2, 11], vec![3, 12], vec![4, 13], vec![5]]);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 10, 11, 12, 13]);
    }

    #[test]
    fn ties_resolve_to_the_leftmost_run() {
        // Two runs share the key `1`; the tree must report run 0 (declared
        // first) as the winner both times the key `1` surfaces.
        let values = vec![vec![1, 5], vec![1, 6]];
        let mut cursors = vec![0usize; values.len()];
        let cmp = |i: usize, j: usize, cursors: &[usize]| values[i][cursors[i]].cmp(&values[j][cursors[j]]);
        let mut tree = LoserTree::build(values.len(), |i, j| cmp(i, j, &cursors));
        assert_eq!(tree.winner(), 0);
        cursors[0] += 1;
        tree.adjust(0, 0, |i, j| cmp(i, j, &cursors));
        assert_eq!(tree.winner(), 1);
    }
}
