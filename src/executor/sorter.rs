//! Result ordering
//!
//! Multi-key, stable and deterministic. Missing values sort before present
//! ones. Values are first ordered by type class (boolean, numeric, text,
//! date, id) so mixed-type columns still get a total order; option codes
//! sort with the numbers.

use std::borrow::Borrow;
use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::query::{OrderExpression, OrderType};
use crate::record::{AttributeValue, Numeric, Record};

/// Sorts records by a list of order expressions
pub struct RecordSorter;

impl RecordSorter {
    /// Sorts in place. Works on owned records and on references.
    pub fn sort<R: Borrow<Record>>(records: &mut [R], orders: &[OrderExpression]) {
        if orders.is_empty() {
            return;
        }

        records.sort_by(|a, b| Self::compare_records(a.borrow(), b.borrow(), orders));
    }

    /// Compares two records key by key
    pub fn compare_records(a: &Record, b: &Record, orders: &[OrderExpression]) -> Ordering {
        for order in orders {
            let ordering = Self::compare_values(
                a.get(&order.attribute_name),
                b.get(&order.attribute_name),
            );
            let ordering = match order.order_type {
                OrderType::Ascending => ordering,
                OrderType::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn compare_values(a: Option<&AttributeValue>, b: Option<&AttributeValue>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => {
                let (x, y) = (x.unaliased(), y.unaliased());
                Self::class_rank(x)
                    .cmp(&Self::class_rank(y))
                    .then_with(|| Self::compare_in_class(x, y))
            }
        }
    }

    fn class_rank(value: &AttributeValue) -> u8 {
        match value {
            AttributeValue::Null => 0,
            AttributeValue::Boolean(_) => 1,
            AttributeValue::Integer(_)
            | AttributeValue::Double(_)
            | AttributeValue::Decimal(_)
            | AttributeValue::Money(_)
            | AttributeValue::OptionSet(_) => 2,
            AttributeValue::String(_) => 3,
            AttributeValue::DateTime(_) => 4,
            AttributeValue::Guid(_) | AttributeValue::EntityReference(_) => 5,
            AttributeValue::Aliased(_) => 6,
        }
    }

    fn compare_in_class(x: &AttributeValue, y: &AttributeValue) -> Ordering {
        if Self::class_rank(x) == 2 {
            // Non-finite doubles sort last
            let finite = |v: &AttributeValue| Self::numeric_key(v).filter(|n| n.is_finite());
            return match (finite(x), finite(y)) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
        }
        x.compare(y).unwrap_or(Ordering::Equal)
    }

    fn numeric_key(value: &AttributeValue) -> Option<Numeric> {
        match value {
            AttributeValue::OptionSet(option) => {
                Some(Numeric::Exact(Decimal::from(option.value)))
            }
            other => other.as_numeric(),
        }
    }
}
