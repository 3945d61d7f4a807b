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

//! The physical plan tree `do_planner` produces. Each variant maps
//! one-to-one to an executor class; trees are built bottom-up and are
//! immutable once returned, so child nodes are owned subtrees rather than
//! shared references.

use crate::model::{ColMeta, ColRef, Condition, Literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    SeqScan,
    IndexScan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanPlan {
    pub kind: ScanKind,
    pub table: String,
    pub conditions: Vec<Condition>,
    /// Non-empty only for `IndexScan`: the chosen index's full ordered key
    /// column list (not only the matched prefix).
    pub index_col_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    NestLoop,
    SortMerge,
    SortMergeWithIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    pub kind: JoinKind,
    pub left: Box<Plan>,
    pub right: Box<Plan>,
    /// Normalized so `lhs_col.tab_name` names a table in `left`.
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortPlan {
    pub child: Box<Plan>,
    pub sort_column: ColRef,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPlan {
    pub child: Box<Plan>,
    pub output_columns: Vec<ColRef>,
    pub group_columns: Vec<ColRef>,
    pub having: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPlan {
    pub child: Box<Plan>,
    pub projected_columns: Vec<ColRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlKind {
    Insert,
    Delete,
    Update,
    Select,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DmlPlan {
    pub kind: DmlKind,
    /// The scan/projection child; `None` only for `Insert`.
    pub child: Option<Box<Plan>>,
    pub table: String,
    pub values: Vec<Vec<Literal>>,
    pub conditions: Vec<Condition>,
    pub set_clauses: Vec<(ColRef, Literal)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlKind {
    CreateTable,
    DropTable,
    CreateIndex,
    DropIndex,
    ShowIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DdlPlan {
    pub kind: DdlKind,
    pub table: String,
    pub column_names: Vec<String>,
    pub column_defs: Vec<ColMeta>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Scan(ScanPlan),
    Join(JoinPlan),
    Sort(SortPlan),
    Aggregation(AggregationPlan),
    Projection(ProjectionPlan),
    Dml(DmlPlan),
    Ddl(DdlPlan),
}

impl Plan {
    /// The table this node's output is rooted at, for node kinds that carry
    /// exactly one (`Scan`). Other kinds have no single owning table.
    pub fn scan_table(&self) -> Option<&str> {
        match self {
            Plan::Scan(s) => Some(&s.table),
            _ => None,
        }
    }
}
