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

//! Leftmost-prefix index matching: picking which of a table's indexes best
//! serves a set of already-local predicates, and reordering those
//! predicates to match the chosen index's key order.

use std::collections::HashSet;

use crate::model::{Condition, ConditionRhs, IndexMeta, Op, TabMeta};

/// A condition only participates in index scoring when its rhs is a
/// literal: a column-vs-column predicate cannot bound an index range.
fn partition_eq_neq(conditions: &[Condition]) -> (HashSet<&str>, HashSet<&str>) {
    let mut eq = HashSet::new();
    let mut neq = HashSet::new();
    for cond in conditions {
        if !matches!(cond.rhs, ConditionRhs::Literal(_)) {
            continue;
        }
        let col = cond.lhs_col.col_name.as_str();
        if cond.op == Op::Eq {
            eq.insert(col);
        } else {
            neq.insert(col);
        }
    }
    // eq_map wins when a column appears in both.
    for col in &eq {
        neq.remove(col);
    }
    (eq, neq)
}

fn score_index(index: &IndexMeta, eq: &HashSet<&str>, neq: &HashSet<&str>) -> usize {
    let mut score = 0;
    for key_col in &index.cols {
        if eq.contains(key_col.col_name.as_str()) {
            score += 1;
        } else if neq.contains(key_col.col_name.as_str()) {
            score += 1;
            break;
        } else {
            break;
        }
    }
    score
}

/// Picks the index with the strictly greatest score. `Iterator::max_by_key`
/// keeps the *last* maximal element on ties, not the first, so the scan is
/// done by hand to honor "first such index wins ties".
pub(crate) fn select_index<'a>(table: &'a TabMeta, conditions: &[Condition]) -> Option<(&'a IndexMeta, usize)> {
    let (eq, neq) = partition_eq_neq(conditions);
    let mut best: Option<(&IndexMeta, usize)> = None;
    for index in &table.indexes {
        let score = score_index(index, &eq, &neq);
        if score == 0 {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Reorders `conditions` so the first `matched_len` of `index`'s key columns
/// lead, in index-key order, followed by the remaining conditions in their
/// original relative order.
pub(crate) fn reorder_for_index(
    mut conditions: Vec<Condition>,
    index: &IndexMeta,
    matched_len: usize,
) -> Vec<Condition> {
    let mut ordered = Vec::with_capacity(conditions.len());
    for key_col in index.cols.iter().take(matched_len) {
        if let Some(pos) = conditions
            .iter()
            .position(|c| c.lhs_col.col_name == key_col.col_name)
        {
            ordered.push(conditions.remove(pos));
        }
    }
    ordered.append(&mut conditions);
    ordered
}

/// Finds the first index on `table` whose leading key column is `col_name`,
/// used to decide `SortMergeWithIndex` eligibility for a join column.
pub(crate) fn covering_index<'a>(table: &'a TabMeta, col_name: &str) -> Option<&'a IndexMeta> {
    table
        .indexes
        .iter()
        .find(|idx| idx.cols.first().map(|c| c.col_name.as_str()) == Some(col_name))
}

pub(crate) fn index_col_names(index: &IndexMeta) -> Vec<String> {
    index.cols.iter().map(|c| c.col_name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColRef, Literal};

    fn idx(cols: &[&str]) -> IndexMeta {
        IndexMeta {
            cols: cols.iter().map(|c| ColRef::new("t", *c)).collect(),
        }
    }

    fn table_with_indexes(indexes: Vec<IndexMeta>) -> TabMeta {
        TabMeta {
            name: "t".to_string(),
            cols: Vec::new(),
            indexes,
        }
    }

    fn eq(col: &str, v: i64) -> Condition {
        Condition::new(ColRef::new("t", col), Op::Eq, ConditionRhs::Literal(Literal::Integer(v)))
    }

    fn gt(col: &str, v: i64) -> Condition {
        Condition::new(ColRef::new("t", col), Op::Gt, ConditionRhs::Literal(Literal::Integer(v)))
    }

    #[test]
    fn leftmost_prefix_match_scores_and_reorders() {
        let table = table_with_indexes(vec![idx(&["a", "b", "c"])]);
        let conditions = vec![eq("b", 1), eq("a", 2), gt("c", 0)];
        let (index, score) = select_index(&table, &conditions).unwrap();
        assert_eq!(score, 3);
        let reordered = reorder_for_index(conditions, index, score);
        let names: Vec<&str> = reordered.iter().map(|c| c.lhs_col.col_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn range_predicate_terminates_the_usable_prefix() {
        let table = table_with_indexes(vec![idx(&["a", "b", "c"])]);
        let conditions = vec![eq("a", 2), gt("b", 5), eq("c", 9)];
        let (_, score) = select_index(&table, &conditions).unwrap();
        assert_eq!(score, 2);
    }

    #[test]
    fn ties_resolve_to_the_earliest_declared_index() {
        let table = table_with_indexes(vec![idx(&["a"]), idx(&["a", "z"])]);
        // Both indexes match only column `a` for a score of 1 — the second
        // index's extra column `z` is unmatched, so scores tie at 1.
        let conditions = vec![eq("a", 2)];
        let (index, score) = select_index(&table, &conditions).unwrap();
        assert_eq!(score, 1);
        assert_eq!(index.cols.len(), 1);
    }

    #[test]
    fn no_index_scores_when_first_key_column_is_unbound() {
        let table = table_with_indexes(vec![idx(&["a", "b"])]);
        let conditions = vec![eq("b", 1)];
        assert!(select_index(&table, &conditions).is_none());
    }
}
