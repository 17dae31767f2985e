//! Condition tree evaluation
//!
//! Evaluation is total: a missing attribute behaves as null, and a
//! comparison between values of incompatible types is simply false.
//! LIKE patterns are compiled once per filter tree, not once per record.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use crate::query::{ConditionExpression, ConditionOperator, FilterExpression, LogicalOperator};
use crate::record::{AttributeValue, Record};

/// A filter tree prepared for evaluation against many records
pub struct CompiledFilter<'q> {
    operator: LogicalOperator,
    empty: bool,
    conditions: Vec<CompiledCondition<'q>>,
    groups: Vec<CompiledFilter<'q>>,
}

impl<'q> CompiledFilter<'q> {
    pub fn new(filter: &'q FilterExpression) -> Self {
        Self {
            operator: filter.filter_operator,
            empty: filter.is_empty(),
            conditions: filter
                .conditions
                .iter()
                .map(|condition| CompiledCondition {
                    condition,
                    like: LikePattern::for_condition(condition),
                })
                .collect(),
            groups: filter
                .filters
                .iter()
                .filter(|f| !f.is_empty())
                .map(CompiledFilter::new)
                .collect(),
        }
    }

    /// Checks if a record satisfies the group.
    ///
    /// Empty groups match everything, at any depth.
    pub fn matches(&self, record: &Record) -> bool {
        let mut conditions = self.conditions.iter().map(|c| {
            ConditionEvaluator::evaluate(record, c.condition, &c.like)
        });
        let mut groups = self.groups.iter().map(|g| g.matches(record));

        match self.operator {
            LogicalOperator::And => conditions.all(|m| m) && groups.all(|m| m),
            LogicalOperator::Or => self.empty || conditions.any(|m| m) || groups.any(|m| m),
        }
    }
}

struct CompiledCondition<'q> {
    condition: &'q ConditionExpression,
    like: LikePattern,
}

/// LIKE pattern of a condition, with `%` (any run) and `_` (one character)
/// wildcards
enum LikePattern {
    /// Not a LIKE condition, or the pattern is not text
    Absent,
    Invalid,
    Compiled(Regex),
}

impl LikePattern {
    fn for_condition(condition: &ConditionExpression) -> Self {
        if !matches!(
            condition.operator,
            ConditionOperator::Like | ConditionOperator::NotLike
        ) {
            return LikePattern::Absent;
        }
        match condition.values.first().map(AttributeValue::unaliased) {
            Some(AttributeValue::String(pattern)) => Self::compile(pattern),
            _ => LikePattern::Absent,
        }
    }

    fn compile(pattern: &str) -> Self {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        for c in pattern.chars() {
            match c {
                '%' => expr.push_str(".*"),
                '_' => expr.push('.'),
                c => expr.push_str(&regex::escape(&c.to_string())),
            }
        }
        expr.push('$');

        match RegexBuilder::new(&expr)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(re) => LikePattern::Compiled(re),
            Err(_) => LikePattern::Invalid,
        }
    }

    /// `Some(matched)` for a string value; non-strings never match
    fn test(&self, value: &AttributeValue) -> Option<bool> {
        match (self, value) {
            (LikePattern::Compiled(re), AttributeValue::String(actual)) => {
                Some(re.is_match(actual))
            }
            (LikePattern::Invalid, AttributeValue::String(_)) => Some(false),
            _ => None,
        }
    }
}

/// Evaluates condition trees against records
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Checks if a record satisfies a filter group.
    ///
    /// Compiles the tree on every call; use [`CompiledFilter`] when the same
    /// filter runs over many records.
    pub fn matches(record: &Record, filter: &FilterExpression) -> bool {
        CompiledFilter::new(filter).matches(record)
    }

    /// Checks a single leaf condition
    pub fn matches_condition(record: &Record, condition: &ConditionExpression) -> bool {
        Self::evaluate(record, condition, &LikePattern::for_condition(condition))
    }

    fn evaluate(record: &Record, condition: &ConditionExpression, like: &LikePattern) -> bool {
        let value = match record.get(&condition.attribute_name) {
            Some(v) => v.unaliased(),
            None => return condition.operator == ConditionOperator::Null,
        };
        let values = &condition.values;

        match condition.operator {
            ConditionOperator::Null => false,
            ConditionOperator::NotNull => true,
            ConditionOperator::Equal => Self::first_is(value, values, |o| o == Ordering::Equal),
            ConditionOperator::NotEqual => Self::first_is(value, values, |o| o != Ordering::Equal),
            ConditionOperator::GreaterThan => {
                Self::first_is(value, values, |o| o == Ordering::Greater)
            }
            ConditionOperator::GreaterEqual => {
                Self::first_is(value, values, |o| o != Ordering::Less)
            }
            ConditionOperator::LessThan => Self::first_is(value, values, |o| o == Ordering::Less),
            ConditionOperator::LessEqual => {
                Self::first_is(value, values, |o| o != Ordering::Greater)
            }
            ConditionOperator::In => values
                .iter()
                .any(|e| value.compare(e) == Some(Ordering::Equal)),
            ConditionOperator::NotIn => {
                !values.is_empty()
                    && values
                        .iter()
                        .all(|e| matches!(value.compare(e), Some(o) if o != Ordering::Equal))
            }
            ConditionOperator::Between => Self::between(value, values).unwrap_or(false),
            ConditionOperator::NotBetween => Self::between(value, values).is_some_and(|b| !b),
            ConditionOperator::Like => like.test(value).unwrap_or(false),
            ConditionOperator::NotLike => like.test(value).is_some_and(|m| !m),
            ConditionOperator::BeginsWith => Self::text(value, values, |a, p| a.starts_with(p)),
            ConditionOperator::DoesNotBeginWith => {
                Self::text(value, values, |a, p| !a.starts_with(p))
            }
            ConditionOperator::EndsWith => Self::text(value, values, |a, p| a.ends_with(p)),
            ConditionOperator::DoesNotEndWith => {
                Self::text(value, values, |a, p| !a.ends_with(p))
            }
            ConditionOperator::Contains => Self::text(value, values, |a, p| a.contains(p)),
            ConditionOperator::DoesNotContain => {
                Self::text(value, values, |a, p| !a.contains(p))
            }
        }
    }

    /// Compares against the first condition value; incomparable is false
    fn first_is(
        value: &AttributeValue,
        values: &[AttributeValue],
        accept: impl Fn(Ordering) -> bool,
    ) -> bool {
        values
            .first()
            .and_then(|expected| value.compare(expected))
            .is_some_and(accept)
    }

    /// `Some(in_range)` when both bounds are comparable with the value
    fn between(value: &AttributeValue, values: &[AttributeValue]) -> Option<bool> {
        let [low, high] = values else {
            return None;
        };
        let above_low = value.compare(low)? != Ordering::Less;
        let below_high = value.compare(high)? != Ordering::Greater;
        Some(above_low && below_high)
    }

    /// Applies a case-insensitive string predicate; non-strings never match
    fn text(
        value: &AttributeValue,
        values: &[AttributeValue],
        predicate: impl Fn(&str, &str) -> bool,
    ) -> bool {
        match (value, values.first().map(AttributeValue::unaliased)) {
            (AttributeValue::String(actual), Some(AttributeValue::String(pattern))) => {
                predicate(&actual.to_lowercase(), &pattern.to_lowercase())
            }
            _ => false,
        }
    }
}
