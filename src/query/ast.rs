//! Condition tree and ordering structures
//!
//! The front-end builds these; the executor only evaluates them.

use serde::{Deserialize, Serialize};

use crate::record::AttributeValue;

/// How many comparison values an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No values (null checks)
    None,
    /// Exactly one value
    One,
    /// Exactly two values (range)
    Two,
    /// One or more values (list membership)
    Many,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Like,
    NotLike,
    BeginsWith,
    DoesNotBeginWith,
    EndsWith,
    DoesNotEndWith,
    Contains,
    DoesNotContain,
    In,
    NotIn,
    Between,
    NotBetween,
    Null,
    NotNull,
}

impl ConditionOperator {
    /// Returns the number of values the operator expects
    pub fn arity(&self) -> Arity {
        match self {
            ConditionOperator::Null | ConditionOperator::NotNull => Arity::None,
            ConditionOperator::Between | ConditionOperator::NotBetween => Arity::Two,
            ConditionOperator::In | ConditionOperator::NotIn => Arity::Many,
            _ => Arity::One,
        }
    }

    /// Returns the operator name for diagnostics
    pub fn op_name(&self) -> &'static str {
        match self {
            ConditionOperator::Equal => "eq",
            ConditionOperator::NotEqual => "ne",
            ConditionOperator::GreaterThan => "gt",
            ConditionOperator::GreaterEqual => "ge",
            ConditionOperator::LessThan => "lt",
            ConditionOperator::LessEqual => "le",
            ConditionOperator::Like => "like",
            ConditionOperator::NotLike => "not-like",
            ConditionOperator::BeginsWith => "begins-with",
            ConditionOperator::DoesNotBeginWith => "not-begin-with",
            ConditionOperator::EndsWith => "ends-with",
            ConditionOperator::DoesNotEndWith => "not-end-with",
            ConditionOperator::Contains => "contains",
            ConditionOperator::DoesNotContain => "not-contain",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not-in",
            ConditionOperator::Between => "between",
            ConditionOperator::NotBetween => "not-between",
            ConditionOperator::Null => "null",
            ConditionOperator::NotNull => "not-null",
        }
    }
}

/// A leaf comparison: attribute, operator, comparison values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionExpression {
    pub attribute_name: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

impl ConditionExpression {
    pub fn new(
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        values: Vec<AttributeValue>,
    ) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            operator,
            values,
        }
    }

    /// Create an equality condition
    pub fn eq(attribute_name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::new(attribute_name, ConditionOperator::Equal, vec![value.into()])
    }

    /// Create a single-value condition with any binary operator
    pub fn compare(
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self::new(attribute_name, operator, vec![value.into()])
    }

    /// Create a null check
    pub fn is_null(attribute_name: impl Into<String>) -> Self {
        Self::new(attribute_name, ConditionOperator::Null, Vec::new())
    }

    /// Create a not-null check
    pub fn not_null(attribute_name: impl Into<String>) -> Self {
        Self::new(attribute_name, ConditionOperator::NotNull, Vec::new())
    }
}

/// Logical combinator of a filter group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// A group of conditions and nested groups
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterExpression {
    #[serde(default)]
    pub filter_operator: LogicalOperator,
    #[serde(default)]
    pub conditions: Vec<ConditionExpression>,
    #[serde(default)]
    pub filters: Vec<FilterExpression>,
}

impl FilterExpression {
    /// Creates an empty group with the given combinator
    pub fn new(filter_operator: LogicalOperator) -> Self {
        Self {
            filter_operator,
            conditions: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Creates an empty AND group
    pub fn and() -> Self {
        Self::new(LogicalOperator::And)
    }

    /// Creates an empty OR group
    pub fn or() -> Self {
        Self::new(LogicalOperator::Or)
    }

    /// Adds a leaf condition
    pub fn with_condition(mut self, condition: ConditionExpression) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds a nested group
    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn add_condition(&mut self, condition: ConditionExpression) {
        self.conditions.push(condition);
    }

    /// True when the group has no conditions at any depth
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.filters.iter().all(FilterExpression::is_empty)
    }

    /// Visits every leaf condition, depth first
    pub fn for_each_condition<'a>(&'a self, f: &mut impl FnMut(&'a ConditionExpression)) {
        for condition in &self.conditions {
            f(condition);
        }
        for filter in &self.filters {
            filter.for_each_condition(f);
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    Ascending,
    Descending,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Ascending => "asc",
            OrderType::Descending => "desc",
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExpression {
    pub attribute_name: String,
    #[serde(default)]
    pub order_type: OrderType,
}

impl OrderExpression {
    pub fn asc(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            order_type: OrderType::Ascending,
        }
    }

    pub fn desc(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            order_type: OrderType::Descending,
        }
    }
}
