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

//! `SELECT` plan assembly: the join tree from [`crate::join_tree`], wrapped
//! in aggregation, sort, and projection nodes as the query requires.

use engine_common::{EngineError, Result};

use crate::catalog::Catalog;
use crate::config::PlannerConfig;
use crate::join_tree::make_one_rel;
use crate::model::{AggregationSpec, ColRef, OrderBySpec, Query};
use crate::plan::{AggregationPlan, Plan, ProjectionPlan, SortPlan};

pub(crate) fn generate_select_plan(query: &mut Query, catalog: &dyn Catalog, config: &PlannerConfig) -> Result<Plan> {
    let conditions = std::mem::take(&mut query.conditions);
    let mut plan = make_one_rel(&query.tables, conditions, catalog, config)?;

    plan = generate_aggregation_group_plan(plan, query.aggregation.take());
    plan = generate_sort_plan(plan, query.order_by.take(), &query.tables, catalog)?;

    Ok(Plan::Projection(ProjectionPlan {
        child: Box::new(plan),
        projected_columns: query.projection.clone(),
    }))
}

fn generate_aggregation_group_plan(plan: Plan, aggregation: Option<AggregationSpec>) -> Plan {
    match aggregation {
        Some(spec) if spec.is_active() => Plan::Aggregation(AggregationPlan {
            child: Box::new(plan),
            output_columns: spec.output_columns,
            group_columns: spec.group_columns,
            having: spec.having,
        }),
        _ => plan,
    }
}

fn generate_sort_plan(
    plan: Plan,
    order_by: Option<OrderBySpec>,
    tables: &[String],
    catalog: &dyn Catalog,
) -> Result<Plan> {
    let Some(spec) = order_by else {
        return Ok(plan);
    };

    let mut candidates = Vec::new();
    for table in tables {
        let meta = catalog.get_table(table)?;
        if meta.cols.iter().any(|c| c.name == spec.column) {
            candidates.push(table.clone());
        }
    }

    let sort_column = match candidates.len() {
        0 => return Err(EngineError::unknown_column(spec.column)),
        1 => ColRef::new(candidates.remove(0), spec.column),
        _ => return Err(EngineError::ambiguous_column(spec.column, candidates)),
    };

    Ok(Plan::Sort(SortPlan {
        child: Box::new(plan),
        sort_column,
        descending: spec.descending,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::MapCatalog;
    use crate::model::{ColMeta, ColType, Condition, StmtKind, TabMeta};

    fn table(name: &str, cols: &[&str]) -> TabMeta {
        TabMeta {
            name: name.to_string(),
            cols: cols
                .iter()
                .map(|c| ColMeta {
                    name: c.to_string(),
                    col_type: ColType::Integer,
                    length: 8,
                    tab_name: name.to_string(),
                })
                .collect(),
            indexes: Vec::new(),
        }
    }

    #[test]
    fn order_by_resolves_against_the_owning_table() {
        let catalog = MapCatalog::default()
            .with_table(table("item", &["i_id"]))
            .with_table(table("stock", &["s_i_id"]));
        let mut query = Query::select(
            vec!["item".to_string(), "stock".to_string()],
            vec![ColRef::new("item", "i_id")],
        );
        query.root = StmtKind::Select;
        query.conditions.push(Condition::new(
            ColRef::new("stock", "s_i_id"),
            crate::model::Op::Eq,
            crate::model::ConditionRhs::Column(ColRef::new("item", "i_id")),
        ));
        query.order_by = Some(OrderBySpec {
            column: "i_id".to_string(),
            descending: false,
        });

        let plan = generate_select_plan(&mut query, &catalog, &PlannerConfig::default()).unwrap();
        match plan {
            Plan::Projection(p) => match *p.child {
                Plan::Sort(s) => assert_eq!(s.sort_column, ColRef::new("item", "i_id")),
                other => panic!("expected a sort plan, got {other:?}"),
            },
            other => panic!("expected a projection plan, got {other:?}"),
        }
    }

    #[test]
    fn ambiguous_order_by_column_is_an_error() {
        let catalog = MapCatalog::default()
            .with_table(table("r", &["id"]))
            .with_table(table("s", &["id"]));
        let mut query = Query::select(vec!["r".to_string(), "s".to_string()], vec![]);
        query.order_by = Some(OrderBySpec {
            column: "id".to_string(),
            descending: false,
        });
        let result = generate_select_plan(&mut query, &catalog, &PlannerConfig::default());
        assert!(matches!(result, Err(EngineError::AmbiguousColumn { .. })));
    }
}
