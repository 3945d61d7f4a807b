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

//! Predicate extraction and pushdown: moving a condition from a query's flat
//! list down to the deepest plan node whose output suffices to evaluate it.

use crate::model::{Condition, ConditionRhs};
use crate::plan::Plan;

/// Removes and returns every condition in `conditions` that is local to
/// `table`: a `table`-column compared to a literal, or a `table`-column
/// compared to another `table`-column. Remaining conditions stay in place,
/// in their original relative order, for higher operators to consume.
pub(crate) fn pop_conds(conditions: &mut Vec<Condition>, table: &str) -> Vec<Condition> {
    let mut extracted = Vec::new();
    let mut remaining = Vec::with_capacity(conditions.len());
    for cond in conditions.drain(..) {
        let local = match &cond.rhs {
            ConditionRhs::Literal(_) => cond.lhs_col.tab_name == table,
            ConditionRhs::Column(_) => cond.is_table_local_pair(table),
        };
        if local {
            extracted.push(cond);
        } else {
            remaining.push(cond);
        }
    }
    *conditions = remaining;
    extracted
}

/// The outcome of one [`push_conds`] call, replacing the source's overlapping
/// `0`/`1`/`2`/`3` return codes with a taxonomy matching each distinct case:
/// `LhsResolved`/`RhsResolved` signal which side of the condition was found
/// somewhere in the visited subtree without the condition being attachable
/// there yet; `Attached` means the caller is done; `Unresolved` means neither
/// side appears in the subtree at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushResult {
    LhsResolved,
    RhsResolved,
    Attached,
    Unresolved,
}

/// Attempts to attach `cond` to the deepest node in `plan` whose two
/// children between them cover both of the condition's tables. Returns the
/// outcome so an ancestor call can combine it with its sibling subtree's
/// outcome.
pub(crate) fn push_conds(plan: &mut Plan, cond: Condition) -> PushResult {
    match plan {
        Plan::Scan(scan) => {
            if cond.lhs_col.tab_name == scan.table {
                return PushResult::LhsResolved;
            }
            if let ConditionRhs::Column(rhs) = &cond.rhs {
                if rhs.tab_name == scan.table {
                    return PushResult::RhsResolved;
                }
            }
            PushResult::Unresolved
        }
        Plan::Join(join) => {
            let left = push_conds(&mut join.left, cond.clone());
            if left == PushResult::Attached {
                return PushResult::Attached;
            }
            let right = push_conds(&mut join.right, cond.clone());
            if right == PushResult::Attached {
                return PushResult::Attached;
            }
            match (left, right) {
                (PushResult::LhsResolved, PushResult::RhsResolved) => {
                    join.conditions.push(cond);
                    PushResult::Attached
                }
                (PushResult::RhsResolved, PushResult::LhsResolved) => {
                    join.conditions.push(cond.swapped());
                    PushResult::Attached
                }
                _ if left != PushResult::Unresolved => left,
                _ if right != PushResult::Unresolved => right,
                _ => PushResult::Unresolved,
            }
        }
        _ => PushResult::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColRef, Literal, Op};
    use crate::plan::{JoinKind, JoinPlan, ScanKind, ScanPlan};

    fn scan(table: &str) -> Plan {
        Plan::Scan(ScanPlan {
            kind: ScanKind::SeqScan,
            table: table.to_string(),
            conditions: Vec::new(),
            index_col_names: Vec::new(),
        })
    }

    fn col_col(lhs_table: &str, rhs_table: &str) -> Condition {
        Condition::new(
            ColRef::new(lhs_table, "x"),
            Op::Eq,
            ConditionRhs::Column(ColRef::new(rhs_table, "y")),
        )
    }

    #[test]
    fn pop_conds_extracts_literal_and_same_table_predicates() {
        let mut conds = vec![
            Condition::new(ColRef::new("r", "z"), Op::Gt, ConditionRhs::Literal(Literal::Integer(3))),
            col_col("r", "s"),
            col_col("r", "r"),
        ];
        let local = pop_conds(&mut conds, "r");
        assert_eq!(local.len(), 2);
        assert_eq!(conds.len(), 1);
        assert_eq!(conds[0].lhs_col.tab_name, "r");
        assert_eq!(conds[0].rhs, ConditionRhs::Column(ColRef::new("s", "y")));
    }

    #[test]
    fn push_conds_attaches_when_sides_split_across_children() {
        let mut join = Plan::Join(JoinPlan {
            kind: JoinKind::NestLoop,
            left: Box::new(scan("r")),
            right: Box::new(scan("s")),
            conditions: Vec::new(),
        });
        let result = push_conds(&mut join, col_col("r", "s"));
        assert_eq!(result, PushResult::Attached);
        if let Plan::Join(j) = &join {
            assert_eq!(j.conditions.len(), 1);
            assert_eq!(j.conditions[0].lhs_col.tab_name, "r");
        } else {
            unreachable!()
        }
    }

    #[test]
    fn push_conds_normalizes_lhs_to_the_left_subtree() {
        let mut join = Plan::Join(JoinPlan {
            kind: JoinKind::NestLoop,
            left: Box::new(scan("r")),
            right: Box::new(scan("s")),
            conditions: Vec::new(),
        });
        // Condition written with rhs referencing the left subtree.
        let result = push_conds(&mut join, col_col("s", "r"));
        assert_eq!(result, PushResult::Attached);
        if let Plan::Join(j) = &join {
            assert_eq!(j.conditions[0].lhs_col.tab_name, "r");
            assert_eq!(j.conditions[0].rhs, ConditionRhs::Column(ColRef::new("s", "x")));
        } else {
            unreachable!()
        }
    }

    #[test]
    fn push_conds_propagates_partial_matches_upward() {
        let mut join = Plan::Join(JoinPlan {
            kind: JoinKind::NestLoop,
            left: Box::new(scan("r")),
            right: Box::new(scan("t")),
            conditions: Vec::new(),
        });
        let result = push_conds(&mut join, col_col("r", "s"));
        assert_eq!(result, PushResult::LhsResolved);
        if let Plan::Join(j) = &join {
            assert!(j.conditions.is_empty());
        } else {
            unreachable!()
        }
    }
}
