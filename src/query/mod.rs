//! Query descriptions
//!
//! Condition trees, query expressions and the translation of every request
//! shape into a single validated [`QueryExpression`].

mod ast;
mod errors;
mod expression;
mod translate;

pub use ast::{
    Arity, ConditionExpression, ConditionOperator, FilterExpression, LogicalOperator,
    OrderExpression, OrderType,
};
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity};
pub use expression::{
    AggregateColumn, AggregateFunction, AggregateSpec, ColumnSet, FetchExpression, PagingInfo,
    QueryByAttribute, QueryExpression, QueryRequest,
};
pub use translate::{validate, FetchTranslator, QueryTranslator};
