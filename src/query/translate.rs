//! Request translation and validation
//!
//! Every request shape is normalized into a [`QueryExpression`] before
//! execution:
//! 1. Query expressions are used as-is
//! 2. Query-by-attribute becomes one equality condition per pair (AND)
//! 3. Fetch expressions go through the host's front-end, if any
//!
//! The normalized expression is then validated. Validation only rejects
//! descriptions the engine cannot execute at all.

use std::collections::HashSet;

use super::ast::{Arity, ConditionExpression, FilterExpression};
use super::errors::{QueryError, QueryResult};
use super::expression::{
    ColumnSet, FetchExpression, QueryByAttribute, QueryExpression, QueryRequest,
};

/// Front-end that parses the external hierarchical query language.
///
/// Implemented by the host; the engine ships none.
pub trait FetchTranslator {
    fn translate(&self, fetch: &FetchExpression) -> QueryResult<QueryExpression>;
}

/// Normalizes requests into validated query expressions
pub struct QueryTranslator<'a> {
    fetch_translator: Option<&'a dyn FetchTranslator>,
}

impl<'a> QueryTranslator<'a> {
    /// Creates a translator with no fetch front-end
    pub fn new() -> Self {
        Self {
            fetch_translator: None,
        }
    }

    /// Creates a translator that delegates fetch expressions to `translator`
    pub fn with_fetch_translator(translator: &'a dyn FetchTranslator) -> Self {
        Self {
            fetch_translator: Some(translator),
        }
    }

    /// Translates and validates a request
    pub fn translate(&self, request: &QueryRequest) -> QueryResult<QueryExpression> {
        let query = match request {
            QueryRequest::Expression(query) => query.clone(),
            QueryRequest::ByAttribute(query) => Self::from_by_attribute(query)?,
            QueryRequest::Fetch(fetch) => match self.fetch_translator {
                Some(translator) => translator.translate(fetch)?,
                None => {
                    return Err(QueryError::unsupported_shape(
                        "Fetch expressions require a front-end translator",
                    ))
                }
            },
        };

        validate(&query)?;
        Ok(query)
    }

    fn from_by_attribute(query: &QueryByAttribute) -> QueryResult<QueryExpression> {
        if query.attributes.is_empty() {
            return Err(QueryError::invalid(
                "Query by attribute needs at least one attribute",
            ));
        }
        if query.attributes.len() != query.values.len() {
            return Err(QueryError::invalid(format!(
                "Query by attribute has {} attributes but {} values",
                query.attributes.len(),
                query.values.len()
            )));
        }

        let mut criteria = FilterExpression::and();
        for (attribute, value) in query.attributes.iter().zip(&query.values) {
            criteria.add_condition(ConditionExpression::eq(attribute.clone(), value.clone()));
        }

        Ok(QueryExpression {
            entity_name: query.entity_name.clone(),
            column_set: query.column_set.clone(),
            criteria,
            orders: query.orders.clone(),
            top_count: query.top_count,
            distinct: false,
            page_info: query.page_info.clone(),
            aggregate: None,
        })
    }
}

impl Default for QueryTranslator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates a query expression.
///
/// Page size and page number of zero are not errors: they mean "default".
pub fn validate(query: &QueryExpression) -> QueryResult<()> {
    if query.entity_name.trim().is_empty() {
        return Err(QueryError::invalid("Entity name must not be empty"));
    }

    if let ColumnSet::Columns(columns) = &query.column_set {
        if columns.iter().any(|c| c.is_empty()) {
            return Err(QueryError::invalid("Column set contains an empty name"));
        }
    }

    if query.orders.iter().any(|o| o.attribute_name.is_empty()) {
        return Err(QueryError::invalid("Order has an empty attribute name"));
    }

    validate_filter(&query.criteria)?;

    if let Some(aggregate) = &query.aggregate {
        if aggregate.group_by.is_empty() && aggregate.aggregates.is_empty() {
            return Err(QueryError::invalid(
                "Aggregation needs group-by keys or aggregate columns",
            ));
        }
        if aggregate.group_by.iter().any(|g| g.is_empty()) {
            return Err(QueryError::invalid("Group-by key must not be empty"));
        }

        let mut aliases = HashSet::new();
        for column in &aggregate.aggregates {
            if column.attribute.is_empty() {
                return Err(QueryError::invalid(
                    "Aggregate column has an empty attribute name",
                ));
            }
            if column.alias.is_empty() {
                return Err(QueryError::invalid_attribute(
                    &column.attribute,
                    "aggregate alias must not be empty",
                ));
            }
            if !aliases.insert(column.alias.as_str()) {
                return Err(QueryError::invalid_attribute(
                    &column.attribute,
                    format!("duplicate aggregate alias '{}'", column.alias),
                ));
            }
        }
    }

    Ok(())
}

fn validate_filter(filter: &FilterExpression) -> QueryResult<()> {
    let mut result = Ok(());
    filter.for_each_condition(&mut |condition| {
        if result.is_ok() {
            result = validate_condition(condition);
        }
    });
    result
}

fn validate_condition(condition: &ConditionExpression) -> QueryResult<()> {
    if condition.attribute_name.is_empty() {
        return Err(QueryError::invalid("Condition has an empty attribute name"));
    }

    let count = condition.values.len();
    let ok = match condition.operator.arity() {
        Arity::None => count == 0,
        Arity::One => count == 1,
        Arity::Two => count == 2,
        Arity::Many => count >= 1,
    };

    if ok {
        Ok(())
    } else {
        Err(QueryError::invalid_attribute(
            &condition.attribute_name,
            format!(
                "operator '{}' does not accept {} value(s)",
                condition.operator.op_name(),
                count
            ),
        ))
    }
}
