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

//! Transforms a validated [`Query`] into a physical [`Plan`] tree: index
//! selection, predicate pushdown, join-tree construction, and the
//! aggregation/sort/projection wrapping around it. See [`do_planner`] for
//! the single entry point.

mod catalog;
mod config;
mod index_selection;
mod join_tree;
mod model;
mod plan;
mod predicates;
mod select_plan;

pub use catalog::Catalog;
pub use config::PlannerConfig;
pub use model::{
    AggregationSpec, ColMeta, ColRef, ColType, Condition, ConditionRhs, DdlSpec, DmlSpec, IndexMeta, Literal, Op,
    OrderBySpec, Query, StmtKind, TabMeta,
};
pub use plan::{AggregationPlan, DdlKind, DdlPlan, DmlKind, DmlPlan, JoinKind, JoinPlan, Plan, ProjectionPlan, ScanKind, ScanPlan, SortPlan};

use engine_common::Result;
use predicates::pop_conds;
use select_plan::generate_select_plan;

fn ddl_kind_for(root: StmtKind) -> plan::DdlKind {
    match root {
        StmtKind::CreateTable => plan::DdlKind::CreateTable,
        StmtKind::DropTable => plan::DdlKind::DropTable,
        StmtKind::CreateIndex => plan::DdlKind::CreateIndex,
        StmtKind::DropIndex => plan::DdlKind::DropIndex,
        StmtKind::ShowIndex => plan::DdlKind::ShowIndex,
        other => unreachable!("ddl_kind_for called with non-DDL root {other:?}"),
    }
}

/// The planner's single entry point: dispatches on the query's AST root
/// kind and builds the corresponding plan tree.
pub fn do_planner(mut query: Query, catalog: &dyn Catalog, config: &PlannerConfig) -> Result<Plan> {
    match query.root {
        StmtKind::CreateTable | StmtKind::DropTable | StmtKind::CreateIndex | StmtKind::DropIndex | StmtKind::ShowIndex => {
            let ddl = query.ddl.take().unwrap_or_default();
            Ok(Plan::Ddl(DdlPlan {
                kind: ddl_kind_for(query.root),
                table: query.table,
                column_names: ddl.column_names,
                column_defs: ddl.column_defs,
            }))
        }
        StmtKind::Insert => {
            let dml = query.dml.take().unwrap_or_default();
            Ok(Plan::Dml(DmlPlan {
                kind: DmlKind::Insert,
                child: None,
                table: query.table,
                values: dml.insert_values,
                conditions: Vec::new(),
                set_clauses: Vec::new(),
            }))
        }
        StmtKind::Delete | StmtKind::Update => {
            let meta = catalog.get_table(&query.table)?;
            let local_conds = pop_conds(&mut query.conditions, &query.table);
            let scan = join_tree::build_scan(&meta, local_conds);
            let dml = query.dml.take().unwrap_or_default();
            let kind = if query.root == StmtKind::Delete {
                DmlKind::Delete
            } else {
                DmlKind::Update
            };
            Ok(Plan::Dml(DmlPlan {
                kind,
                child: Some(Box::new(scan)),
                table: query.table,
                values: Vec::new(),
                conditions: Vec::new(),
                set_clauses: dml.set_clauses,
            }))
        }
        StmtKind::Select => {
            let child = generate_select_plan(&mut query, catalog, config)?;
            Ok(Plan::Dml(DmlPlan {
                kind: DmlKind::Select,
                child: Some(Box::new(child)),
                table: String::new(),
                values: Vec::new(),
                conditions: Vec::new(),
                set_clauses: Vec::new(),
            }))
        }
    }
}
