//! Query descriptions and request variants

use serde::{Deserialize, Serialize};

use super::ast::{ConditionExpression, FilterExpression, OrderExpression};
use crate::record::AttributeValue;

/// Attributes requested for each returned record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnSet {
    /// Every attribute the record carries
    #[default]
    All,
    /// Only the named attributes
    Columns(Vec<String>),
}

impl ColumnSet {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSet::Columns(columns.into_iter().map(Into::into).collect())
    }

    /// True when `attribute` should be kept
    pub fn includes(&self, attribute: &str) -> bool {
        match self {
            ColumnSet::All => true,
            ColumnSet::Columns(columns) => columns.iter().any(|c| c == attribute),
        }
    }
}

/// Paging parameters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PagingInfo {
    /// 1-based page; 0 means the first page
    #[serde(default)]
    pub page_number: u32,
    /// Records per page; 0 means the engine default
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub return_total_record_count: bool,
    /// Cookie from the previous page. Accepted for wire parity; paging is
    /// always positional.
    #[serde(default)]
    pub paging_cookie: Option<String>,
}

impl PagingInfo {
    pub fn page(page_number: u32, count: u32) -> Self {
        Self {
            page_number,
            count,
            ..Self::default()
        }
    }

    pub fn with_total_record_count(mut self) -> Self {
        self.return_total_record_count = true;
        self
    }
}

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateFunction {
    /// Rows in the group, nulls included
    Count,
    /// Non-null values in the group
    CountColumn,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::CountColumn => "countcolumn",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }
}

/// One aggregate output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateColumn {
    pub attribute: String,
    pub function: AggregateFunction,
    pub alias: String,
}

impl AggregateColumn {
    pub fn new(
        attribute: impl Into<String>,
        function: AggregateFunction,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            function,
            alias: alias.into(),
        }
    }
}

/// Grouping keys plus aggregate columns
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateSpec {
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub aggregates: Vec<AggregateColumn>,
}

impl AggregateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_by(mut self, attribute: impl Into<String>) -> Self {
        self.group_by.push(attribute.into());
        self
    }

    pub fn with(mut self, column: AggregateColumn) -> Self {
        self.aggregates.push(column);
        self
    }
}

/// The engine's primary input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryExpression {
    pub entity_name: String,
    #[serde(default)]
    pub column_set: ColumnSet,
    #[serde(default)]
    pub criteria: FilterExpression,
    #[serde(default)]
    pub orders: Vec<OrderExpression>,
    #[serde(default)]
    pub top_count: Option<u32>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub page_info: Option<PagingInfo>,
    #[serde(default)]
    pub aggregate: Option<AggregateSpec>,
}

impl QueryExpression {
    /// Creates a query returning every attribute of every record
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, column_set: ColumnSet) -> Self {
        self.column_set = column_set;
        self
    }

    pub fn with_criteria(mut self, criteria: FilterExpression) -> Self {
        self.criteria = criteria;
        self
    }

    /// Adds a condition to the top-level filter
    pub fn with_condition(mut self, condition: ConditionExpression) -> Self {
        self.criteria.add_condition(condition);
        self
    }

    pub fn with_order(mut self, order: OrderExpression) -> Self {
        self.orders.push(order);
        self
    }

    pub fn with_top_count(mut self, top_count: u32) -> Self {
        self.top_count = Some(top_count);
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_paging(mut self, page_info: PagingInfo) -> Self {
        self.page_info = Some(page_info);
        self
    }

    pub fn with_aggregate(mut self, aggregate: AggregateSpec) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    /// True when aggregation was requested
    pub fn is_aggregate(&self) -> bool {
        self.aggregate.is_some()
    }
}

/// Equality-only query over attribute/value pairs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryByAttribute {
    pub entity_name: String,
    #[serde(default)]
    pub column_set: ColumnSet,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
    #[serde(default)]
    pub orders: Vec<OrderExpression>,
    #[serde(default)]
    pub page_info: Option<PagingInfo>,
    #[serde(default)]
    pub top_count: Option<u32>,
}

impl QueryByAttribute {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Self::default()
        }
    }

    /// Adds one attribute/value pair
    pub fn with_attribute_value(
        mut self,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.push(attribute.into());
        self.values.push(value.into());
        self
    }

    pub fn with_columns(mut self, column_set: ColumnSet) -> Self {
        self.column_set = column_set;
        self
    }

    pub fn with_order(mut self, order: OrderExpression) -> Self {
        self.orders.push(order);
        self
    }

    pub fn with_paging(mut self, page_info: PagingInfo) -> Self {
        self.page_info = Some(page_info);
        self
    }
}

/// A query written in the external hierarchical query language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchExpression {
    pub query: String,
}

impl FetchExpression {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Every request shape the engine accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryRequest {
    Expression(QueryExpression),
    ByAttribute(QueryByAttribute),
    Fetch(FetchExpression),
}

impl From<QueryExpression> for QueryRequest {
    fn from(query: QueryExpression) -> Self {
        QueryRequest::Expression(query)
    }
}

impl From<QueryByAttribute> for QueryRequest {
    fn from(query: QueryByAttribute) -> Self {
        QueryRequest::ByAttribute(query)
    }
}

impl From<FetchExpression> for QueryRequest {
    fn from(query: FetchExpression) -> Self {
        QueryRequest::Fetch(query)
    }
}
