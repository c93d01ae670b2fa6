//! Comparison methods and their attribute table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::LookupOp;
use crate::schema::field_def::ValueType;

/// Operator a comparator applies to its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonMethod {
    /// Value equals the argument
    Equals,
    /// Value differs from the argument
    NotEquals,
    /// Value contains the argument(s)
    Contains,
    /// Value does not contain the argument
    NotContains,
    /// Value lies within `[min, max]`
    Range,
    /// Value lies outside `[min, max]`
    NotInRange,
    /// Value is at least the argument
    GreaterThan,
    /// Value is at most the argument
    LessThan,
    /// Value is (or is not) missing
    IsNull,
}

/// Number of arguments a method takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many
    Exactly(usize),
    /// This many or more
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments satisfy the arity
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Semantic kind of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Equality,
    NegatedEquality,
    Containment,
    NegatedContainment,
    Range,
    NegatedRange,
    GreaterOrEqual,
    LessOrEqual,
    IsNull,
}

/// Static attributes of a comparison method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodAttributes {
    /// Argument count on single-valued fields
    pub arity: Arity,
    /// Semantic kind
    pub kind: OperatorKind,
    /// Lookup applied to the stored value
    pub op: LookupOp,
    /// Whether the lookup is wrapped in a negation
    pub negated: bool,
    /// Value types the method is legal against
    pub supported_types: &'static [ValueType],
}

const EQUALITY_TYPES: &[ValueType] = &[
    ValueType::Integer,
    ValueType::Decimal,
    ValueType::SelectOne,
    ValueType::String,
    ValueType::Boolean,
];
const CONTAINMENT_TYPES: &[ValueType] = &[ValueType::SelectMany, ValueType::String];
const ORDERED_TYPES: &[ValueType] = &[ValueType::Integer, ValueType::Decimal, ValueType::Date];
const NULLABLE_TYPES: &[ValueType] = &[
    ValueType::Decimal,
    ValueType::Date,
    ValueType::String,
    ValueType::Boolean,
    ValueType::SelectOne,
];

impl ComparisonMethod {
    /// Every method, in declaration order
    pub const ALL: [Self; 9] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::Range,
        Self::NotInRange,
        Self::GreaterThan,
        Self::LessThan,
        Self::IsNull,
    ];

    /// Attribute table entry for the method
    #[must_use]
    pub const fn attributes(self) -> MethodAttributes {
        let (arity, kind, op, negated, supported_types) = match self {
            Self::Equals => (1, OperatorKind::Equality, LookupOp::Exact, false, EQUALITY_TYPES),
            Self::NotEquals => (1, OperatorKind::NegatedEquality, LookupOp::Exact, true, EQUALITY_TYPES),
            Self::Contains => (1, OperatorKind::Containment, LookupOp::IContains, false, CONTAINMENT_TYPES),
            Self::NotContains => (1, OperatorKind::NegatedContainment, LookupOp::IContains, true, CONTAINMENT_TYPES),
            Self::Range => (2, OperatorKind::Range, LookupOp::Range, false, ORDERED_TYPES),
            Self::NotInRange => (2, OperatorKind::NegatedRange, LookupOp::Range, true, ORDERED_TYPES),
            Self::GreaterThan => (1, OperatorKind::GreaterOrEqual, LookupOp::Gte, false, ORDERED_TYPES),
            Self::LessThan => (1, OperatorKind::LessOrEqual, LookupOp::Lte, false, ORDERED_TYPES),
            Self::IsNull => (1, OperatorKind::IsNull, LookupOp::IsNull, false, NULLABLE_TYPES),
        };
        MethodAttributes {
            arity: Arity::Exactly(arity),
            kind,
            op,
            negated,
            supported_types,
        }
    }

    /// Arity once the field's value type is known
    ///
    /// Multi-choice fields accept any non-empty argument list.
    #[must_use]
    pub const fn arity_for(self, value_type: ValueType) -> Arity {
        match value_type {
            ValueType::SelectMany => Arity::AtLeast(1),
            _ => self.attributes().arity,
        }
    }

    /// Whether the method is legal against a value type
    #[must_use]
    pub fn supports(self, value_type: ValueType) -> bool {
        self.attributes().supported_types.contains(&value_type)
    }

    /// Name used in definitions and criteria strings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::Range => "RANGE",
            Self::NotInRange => "NOT_IN_RANGE",
            Self::GreaterThan => "GREATER_THAN",
            Self::LessThan => "LESS_THAN",
            Self::IsNull => "IS_NULL",
        }
    }
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
