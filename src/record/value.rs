//! Typed attribute values
//!
//! Every value a record can hold is one variant of [`AttributeValue`].
//! Code that needs to treat option sets, money, lookups or aliased values
//! differently matches on the variant instead of inspecting types at run time.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A decimal amount of money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
}

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Self { amount }
    }
}

/// An enumerated option value.
///
/// `label` is the display name of the option when the producer knows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionSetValue {
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl OptionSetValue {
    /// Creates an option value without a known label
    pub fn new(value: i32) -> Self {
        Self { value, label: None }
    }

    /// Creates an option value carrying its display name
    pub fn labeled(value: i32, label: impl Into<String>) -> Self {
        Self {
            value,
            label: Some(label.into()),
        }
    }
}

/// A lookup pointing at another record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    pub logical_name: String,
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityReference {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            name: None,
        }
    }
}

/// A value taken from a related record and exposed under an alias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasedValue {
    /// Logical name of the record the value came from
    pub entity_logical_name: Option<String>,
    /// Attribute the value was read from
    pub attribute_logical_name: String,
    pub value: Box<AttributeValue>,
}

impl AliasedValue {
    pub fn new(
        entity_logical_name: Option<String>,
        attribute_logical_name: impl Into<String>,
        value: AttributeValue,
    ) -> Self {
        Self {
            entity_logical_name,
            attribute_logical_name: attribute_logical_name.into(),
            value: Box::new(value),
        }
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    Money(Money),
    OptionSet(OptionSetValue),
    EntityReference(EntityReference),
    Aliased(AliasedValue),
}

impl AttributeValue {
    /// Returns true for `Null` and for an aliased `Null`
    pub fn is_null(&self) -> bool {
        matches!(self.unaliased(), AttributeValue::Null)
    }

    /// Strips any number of alias wrappers
    pub fn unaliased(&self) -> &AttributeValue {
        match self {
            AttributeValue::Aliased(aliased) => aliased.value.unaliased(),
            other => other,
        }
    }

    /// Numeric view of the value.
    ///
    /// Integers, doubles, decimals and money amounts are numeric. Option
    /// codes are not: they only compare against integers explicitly.
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self.unaliased() {
            AttributeValue::Integer(i) => Some(Numeric::Exact(Decimal::from(*i))),
            AttributeValue::Double(d) => Some(Numeric::from_f64(*d)),
            AttributeValue::Decimal(d) => Some(Numeric::Exact(*d)),
            AttributeValue::Money(m) => Some(Numeric::Exact(m.amount)),
            _ => None,
        }
    }

    /// Exact numeric view; `None` for doubles outside the decimal range
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self.as_numeric()? {
            Numeric::Exact(d) => Some(d),
            Numeric::Float(_) => None,
        }
    }

    /// Value used when deciding whether two records carry the same content.
    ///
    /// Aliased values compare by their inner value, money by its amount,
    /// option sets by their code and lookups by the target id.
    pub fn distinct_projection(&self) -> AttributeValue {
        match self {
            AttributeValue::Aliased(aliased) => aliased.value.distinct_projection(),
            AttributeValue::Money(m) => AttributeValue::Decimal(m.amount),
            AttributeValue::OptionSet(o) => AttributeValue::Integer(i64::from(o.value)),
            AttributeValue::EntityReference(r) => AttributeValue::Guid(r.id),
            other => other.clone(),
        }
    }

    /// Total-enough ordering used by sorting and min/max aggregation.
    ///
    /// Returns `None` when the two values cannot be compared.
    pub fn compare(&self, other: &AttributeValue) -> Option<Ordering> {
        let (a, b) = (self.unaliased(), other.unaliased());

        if let (Some(x), Some(y)) = (a.as_numeric(), b.as_numeric()) {
            return x.partial_cmp(&y);
        }

        match (a, b) {
            (AttributeValue::Null, AttributeValue::Null) => Some(Ordering::Equal),
            (AttributeValue::Boolean(x), AttributeValue::Boolean(y)) => Some(x.cmp(y)),
            (AttributeValue::String(x), AttributeValue::String(y)) => {
                Some(x.to_lowercase().cmp(&y.to_lowercase()))
            }
            (AttributeValue::DateTime(x), AttributeValue::DateTime(y)) => Some(x.cmp(y)),
            (AttributeValue::Guid(x), AttributeValue::Guid(y)) => Some(x.cmp(y)),
            (AttributeValue::OptionSet(x), AttributeValue::OptionSet(y)) => {
                Some(x.value.cmp(&y.value))
            }
            (AttributeValue::OptionSet(x), AttributeValue::Integer(y)) => {
                Some(i64::from(x.value).cmp(y))
            }
            (AttributeValue::Integer(x), AttributeValue::OptionSet(y)) => {
                Some(x.cmp(&i64::from(y.value)))
            }
            (AttributeValue::EntityReference(x), AttributeValue::EntityReference(y)) => {
                Some(x.id.cmp(&y.id))
            }
            (AttributeValue::EntityReference(x), AttributeValue::Guid(y)) => Some(x.id.cmp(y)),
            (AttributeValue::Guid(x), AttributeValue::EntityReference(y)) => Some(x.cmp(&y.id)),
            _ => None,
        }
    }
}

/// A number that is exact while it fits a decimal.
///
/// Doubles beyond the decimal range, non-finite doubles and sums that
/// overflow the decimal range are carried as floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Exact(Decimal),
    Float(f64),
}

impl Numeric {
    /// Exact when the double converts to a decimal
    pub fn from_f64(value: f64) -> Self {
        match Decimal::try_from(value) {
            Ok(d) => Numeric::Exact(d),
            Err(_) => Numeric::Float(value),
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Numeric::Exact(d) => d.to_f64().unwrap_or_default(),
            Numeric::Float(f) => f,
        }
    }

    pub fn is_finite(self) -> bool {
        match self {
            Numeric::Exact(_) => true,
            Numeric::Float(f) => f.is_finite(),
        }
    }

    /// Adds exactly, widening to a float once either side is one or the
    /// decimal sum overflows
    pub fn widening_add(self, other: Numeric) -> Numeric {
        if let (Numeric::Exact(a), Numeric::Exact(b)) = (self, other) {
            if let Some(sum) = a.checked_add(b) {
                return Numeric::Exact(sum);
            }
        }
        Numeric::Float(self.to_f64() + other.to_f64())
    }

    /// Divides by a non-zero count, widening like [`Numeric::widening_add`]
    pub fn divide_by(self, count: usize) -> Numeric {
        if let Numeric::Exact(d) = self {
            if let Some(quotient) = d.checked_div(Decimal::from(count)) {
                return Numeric::Exact(quotient);
            }
        }
        Numeric::Float(self.to_f64() / count as f64)
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Exact(a), Numeric::Exact(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Double(d) => write!(f, "{}", d),
            AttributeValue::Decimal(d) => write!(f, "{}", d),
            AttributeValue::String(s) => write!(f, "{}", s),
            AttributeValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            AttributeValue::Guid(g) => write!(f, "{}", g),
            AttributeValue::Money(m) => write!(f, "{}", m.amount),
            AttributeValue::OptionSet(o) => write!(f, "{}", o.value),
            AttributeValue::EntityReference(r) => write!(f, "{}", r.id),
            AttributeValue::Aliased(a) => write!(f, "{}", a.value),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Boolean(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Integer(i64::from(v))
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl From<Decimal> for AttributeValue {
    fn from(v: Decimal) -> Self {
        AttributeValue::Decimal(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(v: DateTime<Utc>) -> Self {
        AttributeValue::DateTime(v)
    }
}

impl From<Uuid> for AttributeValue {
    fn from(v: Uuid) -> Self {
        AttributeValue::Guid(v)
    }
}

impl From<Money> for AttributeValue {
    fn from(v: Money) -> Self {
        AttributeValue::Money(v)
    }
}

impl From<OptionSetValue> for AttributeValue {
    fn from(v: OptionSetValue) -> Self {
        AttributeValue::OptionSet(v)
    }
}

impl From<EntityReference> for AttributeValue {
    fn from(v: EntityReference) -> Self {
        AttributeValue::EntityReference(v)
    }
}

impl From<AliasedValue> for AttributeValue {
    fn from(v: AliasedValue) -> Self {
        AttributeValue::Aliased(v)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttributeValue::Null, Into::into)
    }
}
