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

//! The planner's input data model: catalog metadata, conditions, and the
//! validated `Query` that `do_planner` consumes.

/// A column's storage type. The planner never interprets values of these
/// types itself; it only threads `ColMeta` through to `DdlPlan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColType {
    Integer,
    BigInt,
    Float,
    Varchar,
    Boolean,
}

/// A literal value appearing on the right-hand side of a condition, in an
/// `INSERT` row, or in an `UPDATE` set clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

/// One column of a table's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ColMeta {
    pub name: String,
    pub col_type: ColType,
    pub length: usize,
    pub tab_name: String,
}

/// A reference to a column by table and column name, independent of any
/// particular `ColMeta`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColRef {
    pub tab_name: String,
    pub col_name: String,
}

impl ColRef {
    pub fn new(tab_name: impl Into<String>, col_name: impl Into<String>) -> Self {
        Self {
            tab_name: tab_name.into(),
            col_name: col_name.into(),
        }
    }
}

/// An ordered key-column list defining one index on a table. Order is
/// semantically significant: it is the index's key prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMeta {
    pub cols: Vec<ColRef>,
}

/// A table's schema as exposed by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TabMeta {
    pub name: String,
    pub cols: Vec<ColMeta>,
    pub indexes: Vec<IndexMeta>,
}

/// A comparison operator. `invert` gives the operator that preserves meaning
/// when a condition's two sides are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub fn invert(self) -> Op {
        match self {
            Op::Eq => Op::Eq,
            Op::Ne => Op::Ne,
            Op::Lt => Op::Gt,
            Op::Gt => Op::Lt,
            Op::Le => Op::Ge,
            Op::Ge => Op::Le,
        }
    }
}

/// The right-hand side of a [`Condition`]: either a literal value or another
/// column reference. Replaces a separate `is_rhs_val` boolean with a type
/// that makes the two shapes mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionRhs {
    Literal(Literal),
    Column(ColRef),
}

/// A single boolean comparison: `lhs_col OP rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub lhs_col: ColRef,
    pub op: Op,
    pub rhs: ConditionRhs,
}

impl Condition {
    pub fn new(lhs_col: ColRef, op: Op, rhs: ConditionRhs) -> Self {
        Self { lhs_col, op, rhs }
    }

    /// Returns `true` when both sides name the same table (requires a
    /// column-valued rhs).
    pub fn is_table_local_pair(&self, table: &str) -> bool {
        self.lhs_col.tab_name == table
            && matches!(&self.rhs, ConditionRhs::Column(rhs) if rhs.tab_name == table)
    }

    /// Swaps `lhs_col`/`rhs` and inverts the operator. Only meaningful when
    /// `rhs` is a column; panics otherwise, since a literal cannot become a
    /// `lhs_col`.
    pub fn swapped(self) -> Condition {
        match self.rhs {
            ConditionRhs::Column(rhs_col) => Condition {
                lhs_col: rhs_col,
                op: self.op.invert(),
                rhs: ConditionRhs::Column(self.lhs_col),
            },
            ConditionRhs::Literal(_) => {
                unreachable!("a column-literal condition is never swapped during pushdown")
            }
        }
    }
}

/// The AST root kind a [`Query`] was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtKind {
    Select,
    Insert,
    Delete,
    Update,
    CreateTable,
    DropTable,
    CreateIndex,
    DropIndex,
    ShowIndex,
}

/// `GROUP BY` / aggregate output / `HAVING` specification for a `Select`.
#[derive(Debug, Clone, Default)]
pub struct AggregationSpec {
    pub output_columns: Vec<ColRef>,
    pub group_columns: Vec<ColRef>,
    pub having: Vec<Condition>,
}

impl AggregationSpec {
    pub fn is_active(&self) -> bool {
        !self.output_columns.is_empty() || !self.group_columns.is_empty()
    }
}

/// `ORDER BY` specification, prior to resolving `column` against a schema.
#[derive(Debug, Clone)]
pub struct OrderBySpec {
    pub column: String,
    pub descending: bool,
}

/// `INSERT` row values and `UPDATE` set clauses, carried separately from
/// `Query::conditions` since they are not predicates.
#[derive(Debug, Clone, Default)]
pub struct DmlSpec {
    pub insert_values: Vec<Vec<Literal>>,
    pub set_clauses: Vec<(ColRef, Literal)>,
}

/// Column list for `CREATE TABLE` / `CREATE INDEX`.
#[derive(Debug, Clone, Default)]
pub struct DdlSpec {
    pub column_names: Vec<String>,
    pub column_defs: Vec<ColMeta>,
}

/// The planner's validated input. `conditions` is mutated in place as
/// predicates are popped onto scans and joins during planning.
#[derive(Debug, Clone)]
pub struct Query {
    pub root: StmtKind,
    pub table: String,
    pub tables: Vec<String>,
    pub conditions: Vec<Condition>,
    pub projection: Vec<ColRef>,
    pub aggregation: Option<AggregationSpec>,
    pub order_by: Option<OrderBySpec>,
    pub dml: Option<DmlSpec>,
    pub ddl: Option<DdlSpec>,
}

impl Query {
    /// A bare `SELECT` skeleton with no predicates, aggregation, or
    /// ordering, useful as a starting point in tests.
    pub fn select(tables: Vec<String>, projection: Vec<ColRef>) -> Self {
        Self {
            root: StmtKind::Select,
            table: String::new(),
            tables,
            conditions: Vec::new(),
            projection,
            aggregation: None,
            order_by: None,
            dml: None,
            ddl: None,
        }
    }
}
