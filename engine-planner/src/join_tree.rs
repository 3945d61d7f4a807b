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

//! Join-tree construction (`make_one_rel`): turns a table list and a
//! cross-table condition list into a single physical plan, honoring FROM
//! order, feature-flagged join kinds, and cartesian closure.

use std::collections::{HashMap, HashSet};

use engine_common::{config_err, Result};

use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::index_selection::{covering_index, index_col_names, reorder_for_index, select_index};
use crate::model::{Condition, ConditionRhs, TabMeta};
use crate::plan::{JoinKind, JoinPlan, Plan, ScanKind, ScanPlan};
use crate::predicates::{pop_conds, push_conds, PushResult};

struct TableContext {
    scan: Plan,
    meta: TabMeta,
}

pub(crate) fn build_scan(meta: &TabMeta, conditions: Vec<Condition>) -> Plan {
    match select_index(meta, &conditions) {
        Some((index, matched_len)) => Plan::Scan(ScanPlan {
            kind: ScanKind::IndexScan,
            table: meta.name.clone(),
            conditions: reorder_for_index(conditions, index, matched_len),
            index_col_names: index_col_names(index),
        }),
        None => Plan::Scan(ScanPlan {
            kind: ScanKind::SeqScan,
            table: meta.name.clone(),
            conditions,
            index_col_names: Vec::new(),
        }),
    }
}

/// The two tables a cross-table condition references, or `None` if its rhs
/// is a literal (which should already have been popped as table-local).
fn cross_table_refs(cond: &Condition) -> Option<(String, String)> {
    match &cond.rhs {
        ConditionRhs::Column(rhs) => Some((cond.lhs_col.tab_name.clone(), rhs.tab_name.clone())),
        ConditionRhs::Literal(_) => None,
    }
}

/// Orders `(scan_a, scan_b)` so `scan_a` corresponds to whichever of
/// `lhs_table`/`rhs_table` appears first in `from_order`, swapping and
/// inverting `cond` to match when the two are out of order.
fn order_pair(
    from_order: &[String],
    lhs_table: &str,
    rhs_table: &str,
    cond: Condition,
    contexts: &mut HashMap<String, TableContext>,
) -> (TableContext, TableContext, Condition) {
    let lhs_pos = from_order.iter().position(|t| t == lhs_table).unwrap_or(usize::MAX);
    let rhs_pos = from_order.iter().position(|t| t == rhs_table).unwrap_or(usize::MAX);

    let (first_table, second_table, cond) = if lhs_pos <= rhs_pos {
        (lhs_table, rhs_table, cond)
    } else {
        (rhs_table, lhs_table, cond.swapped())
    };

    let first = contexts.remove(first_table).expect("each table is scanned exactly once");
    let second = contexts.remove(second_table).expect("each table is scanned exactly once");
    (first, second, cond)
}

/// Builds the join node for a single driving condition between two scans,
/// choosing the join kind from `config`'s feature flags.
fn build_pair_join(left: TableContext, right: TableContext, cond: Condition, config: &PlannerConfig) -> Result<Plan> {
    if config.nestedloop_enabled {
        return Ok(Plan::Join(JoinPlan {
            kind: JoinKind::NestLoop,
            left: Box::new(left.scan),
            right: Box::new(right.scan),
            conditions: vec![cond],
        }));
    }
    if config.sortmerge_enabled {
        let left_idx = covering_index(&left.meta, &cond.lhs_col.col_name);
        let right_col = match &cond.rhs {
            ConditionRhs::Column(c) => c.col_name.as_str(),
            ConditionRhs::Literal(_) => unreachable!("join conditions are always column-to-column"),
        };
        let right_idx = covering_index(&right.meta, right_col);
        if let (Some(left_idx), Some(right_idx)) = (left_idx, right_idx) {
            let left_scan = Plan::Scan(ScanPlan {
                kind: ScanKind::IndexScan,
                table: left.meta.name.clone(),
                conditions: Vec::new(),
                index_col_names: index_col_names(left_idx),
            });
            let right_scan = Plan::Scan(ScanPlan {
                kind: ScanKind::IndexScan,
                table: right.meta.name.clone(),
                conditions: Vec::new(),
                index_col_names: index_col_names(right_idx),
            });
            return Ok(Plan::Join(JoinPlan {
                kind: JoinKind::SortMergeWithIndex,
                left: Box::new(left_scan),
                right: Box::new(right_scan),
                conditions: vec![cond],
            }));
        }
        return Ok(Plan::Join(JoinPlan {
            kind: JoinKind::SortMerge,
            left: Box::new(left.scan),
            right: Box::new(right.scan),
            conditions: vec![cond],
        }));
    }
    config_err!("no join executor enabled: nestedloop and sortmerge are both disabled")
}

/// Builds the single physical plan covering every table in `tables`,
/// consuming whatever cross-table conditions remain in `conditions` after
/// each table's local predicates have been popped onto its scan.
pub(crate) fn make_one_rel(
    tables: &[String],
    mut conditions: Vec<Condition>,
    catalog: &dyn Catalog,
    config: &PlannerConfig,
) -> Result<Plan> {
    let mut contexts: HashMap<String, TableContext> = HashMap::new();
    for table in tables {
        let meta = catalog.get_table(table)?;
        let local = pop_conds(&mut conditions, table);
        let scan = build_scan(&meta, local);
        contexts.insert(table.clone(), TableContext { scan, meta });
    }

    if tables.len() == 1 {
        return Ok(contexts.remove(&tables[0]).expect("seeded above").scan);
    }

    let mut joined: HashSet<String> = HashSet::new();
    let mut tree: Option<Plan> = None;

    for cond in conditions {
        let Some((lhs_table, rhs_table)) = cross_table_refs(&cond) else {
            log::warn!("dropping a literal-rhs condition that survived pop_conds");
            continue;
        };

        if tree.is_none() {
            let (left, right, cond) = order_pair(tables, &lhs_table, &rhs_table, cond, &mut contexts);
            joined.insert(lhs_table);
            joined.insert(rhs_table);
            tree = Some(build_pair_join(left, right, cond, config)?);
            continue;
        }

        let lhs_joined = joined.contains(&lhs_table);
        let rhs_joined = joined.contains(&rhs_table);

        match (lhs_joined, rhs_joined) {
            (true, true) => {
                let mut existing = tree.take().expect("checked above");
                let result = push_conds(&mut existing, cond);
                if result == PushResult::Unresolved {
                    log::warn!("condition referenced two joined tables but could not be attached");
                }
                tree = Some(existing);
            }
            (false, false) => {
                let (left, right, cond) = order_pair(tables, &lhs_table, &rhs_table, cond, &mut contexts);
                joined.insert(lhs_table);
                joined.insert(rhs_table);
                let bottom = Plan::Join(JoinPlan {
                    kind: JoinKind::NestLoop,
                    left: Box::new(left.scan),
                    right: Box::new(right.scan),
                    conditions: vec![cond],
                });
                tree = Some(Plan::Join(JoinPlan {
                    kind: JoinKind::NestLoop,
                    left: Box::new(bottom),
                    right: Box::new(tree.take().expect("checked above")),
                    conditions: Vec::new(),
                }));
            }
            _ => {
                let unjoined_table = if lhs_joined { rhs_table.clone() } else { lhs_table.clone() };
                let unjoined = contexts
                    .remove(&unjoined_table)
                    .expect("each table is scanned exactly once");
                let normalized = if cond.lhs_col.tab_name == unjoined_table {
                    cond
                } else {
                    cond.swapped()
                };
                joined.insert(unjoined_table);
                tree = Some(Plan::Join(JoinPlan {
                    kind: JoinKind::NestLoop,
                    left: Box::new(unjoined.scan),
                    right: Box::new(tree.take().expect("checked above")),
                    conditions: vec![normalized],
                }));
            }
        }
    }

    let mut tree = tree;
    for table in tables {
        if joined.contains(table) {
            continue;
        }
        let ctx = contexts.remove(table).expect("unjoined table still has its scan");
        tree = Some(match tree {
            None => ctx.scan,
            Some(existing) => Plan::Join(JoinPlan {
                kind: JoinKind::NestLoop,
                left: Box::new(existing),
                right: Box::new(ctx.scan),
                conditions: Vec::new(),
            }),
        });
        joined.insert(table.clone());
    }

    Ok(tree.expect("at least one table was provided"))
}
