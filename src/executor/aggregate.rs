//! Aggregation
//!
//! Groups matched records by the tuple of group-key values and computes one
//! synthetic record per group. Missing and null keys share a single bucket.
//! Groups keep the order in which their first member was seen.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::query::{AggregateColumn, AggregateFunction, AggregateSpec};
use crate::record::{AliasedValue, AttributeValue, Money, Numeric, Record, RecordOrigin};

/// Normalized form of one group-key value.
///
/// Values that compare equal map to the same part: numbers and option
/// codes by numeric value, references by id, text ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Boolean(bool),
    Number(Decimal),
    Float(u64),
    Text(String),
    DateTime(DateTime<Utc>),
    Id(Uuid),
}

impl KeyPart {
    fn of(value: Option<&AttributeValue>) -> Self {
        let Some(value) = value else {
            return KeyPart::Null;
        };
        match value.distinct_projection() {
            AttributeValue::Boolean(b) => KeyPart::Boolean(b),
            AttributeValue::String(s) => KeyPart::Text(s.to_lowercase()),
            AttributeValue::DateTime(d) => KeyPart::DateTime(d),
            AttributeValue::Guid(id) => KeyPart::Id(id),
            other => match other.as_numeric() {
                Some(Numeric::Exact(d)) => KeyPart::Number(d.normalize()),
                Some(Numeric::Float(f)) if f.is_nan() => KeyPart::Float(f64::NAN.to_bits()),
                Some(Numeric::Float(f)) => KeyPart::Float(f.to_bits()),
                None => KeyPart::Null,
            },
        }
    }
}

/// Group-key values as first seen, with the records sharing them
struct Group<'r> {
    values: Vec<Option<AttributeValue>>,
    members: Vec<&'r Record>,
}

/// Computes grouped aggregates
pub struct Aggregator;

impl Aggregator {
    /// Aggregates `records` into one record per group.
    ///
    /// Output records carry only the group keys and the aggregate aliases,
    /// have no identity and are marked [`RecordOrigin::Aggregate`].
    pub fn aggregate<R: Borrow<Record>>(
        entity_name: &str,
        records: &[R],
        spec: &AggregateSpec,
    ) -> Vec<Record> {
        let groups = Self::group(records, &spec.group_by);

        groups
            .into_iter()
            .map(|Group { values, members }| {
                let mut record = Record::new(entity_name);
                record.origin = RecordOrigin::Aggregate;

                for (name, value) in spec.group_by.iter().zip(values) {
                    if let Some(value) = value {
                        record.set(name.clone(), value);
                    }
                }

                for column in &spec.aggregates {
                    if let Some(value) = Self::compute(column, &members) {
                        record.set(
                            column.alias.clone(),
                            AliasedValue::new(
                                Some(entity_name.to_string()),
                                column.attribute.clone(),
                                value,
                            ),
                        );
                    }
                }

                record
            })
            .collect()
    }

    fn group<'r, R: Borrow<Record>>(records: &'r [R], group_by: &[String]) -> Vec<Group<'r>> {
        let mut groups: Vec<Group<'r>> = Vec::new();
        let mut index: HashMap<Vec<KeyPart>, usize> = HashMap::new();

        for record in records {
            let record = record.borrow();
            let values: Vec<Option<&AttributeValue>> = group_by
                .iter()
                .map(|name| record.get(name).map(AttributeValue::unaliased))
                .collect();
            let key = values.iter().map(|v| KeyPart::of(*v)).collect();

            match index.entry(key) {
                Entry::Occupied(slot) => groups[*slot.get()].members.push(record),
                Entry::Vacant(slot) => {
                    slot.insert(groups.len());
                    groups.push(Group {
                        values: values.into_iter().map(|v| v.cloned()).collect(),
                        members: vec![record],
                    });
                }
            }
        }

        // Without grouping keys there is always exactly one (possibly empty) group.
        if group_by.is_empty() && groups.is_empty() {
            groups.push(Group {
                values: Vec::new(),
                members: Vec::new(),
            });
        }

        groups
    }

    /// Computes one aggregate column over a group; `None` means null
    fn compute(column: &AggregateColumn, members: &[&Record]) -> Option<AttributeValue> {
        let values: Vec<&AttributeValue> = members
            .iter()
            .filter_map(|r| r.get(&column.attribute))
            .map(AttributeValue::unaliased)
            .collect();

        match column.function {
            AggregateFunction::Count => Some(AttributeValue::Integer(members.len() as i64)),
            AggregateFunction::CountColumn => Some(AttributeValue::Integer(values.len() as i64)),
            AggregateFunction::Sum => {
                let (sum, _, is_money) = Self::numeric_sum(&values);
                Some(Self::numeric(sum, is_money))
            }
            AggregateFunction::Avg => {
                let (sum, count, is_money) = Self::numeric_sum(&values);
                if count == 0 {
                    return None;
                }
                Some(Self::numeric(sum.divide_by(count), is_money))
            }
            AggregateFunction::Min => Self::extreme(&values, Ordering::Less),
            AggregateFunction::Max => Self::extreme(&values, Ordering::Greater),
        }
    }

    /// Sum, count of numeric values and whether any input was money.
    ///
    /// The sum stays exact until a double beyond the decimal range or a
    /// decimal overflow widens it to a float.
    fn numeric_sum(values: &[&AttributeValue]) -> (Numeric, usize, bool) {
        let mut sum = Numeric::Exact(Decimal::ZERO);
        let mut count = 0;
        let mut is_money = false;

        for value in values {
            if let Some(amount) = value.as_numeric() {
                sum = sum.widening_add(amount);
                count += 1;
                is_money |= matches!(value, AttributeValue::Money(_));
            }
        }

        (sum, count, is_money)
    }

    fn numeric(amount: Numeric, is_money: bool) -> AttributeValue {
        match amount {
            Numeric::Exact(d) if is_money => AttributeValue::Money(Money::new(d)),
            Numeric::Exact(d) => AttributeValue::Decimal(d),
            Numeric::Float(f) => AttributeValue::Double(f),
        }
    }

    /// Smallest (`Less`) or largest (`Greater`) comparable value
    fn extreme(values: &[&AttributeValue], wanted: Ordering) -> Option<AttributeValue> {
        let mut best: Option<&AttributeValue> = None;
        for &value in values {
            best = match best {
                None => Some(value),
                Some(current) => match value.compare(current) {
                    Some(ordering) if ordering == wanted => Some(value),
                    _ => Some(current),
                },
            };
        }
        best.cloned()
    }
}
