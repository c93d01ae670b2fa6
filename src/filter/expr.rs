//! Expression-based predicates over households and individuals
//!
//! This module provides the predicate tree the targeting compiler produces
//! and a household store consumes. A predicate is plain data: it is built
//! once, can be combined with `&`, `|` and `!`, and is never executed here.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::field_def::Association;

/// Storage location of a value on a household or individual record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldPath {
    /// Fixed schema attribute, possibly a relation path such as `admin1__p_code`
    Core(String),

    /// Flexible attribute stored under the record's flex fields
    Flex(String),

    /// Value recorded for one round of a periodic flexible attribute
    Periodic {
        /// Flexible attribute name
        name: String,
        /// One-based collection round
        round: u32,
    },
}

impl FieldPath {
    /// Core attribute path
    pub fn core(path: impl Into<String>) -> Self {
        Self::Core(path.into())
    }

    /// Flexible attribute path
    pub fn flex(name: impl Into<String>) -> Self {
        Self::Flex(name.into())
    }

    /// Periodic attribute path for a given round
    pub fn periodic(name: impl Into<String>, round: u32) -> Self {
        Self::Periodic {
            name: name.into(),
            round,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(path) => write!(f, "{path}"),
            Self::Flex(name) => write!(f, "flex_fields__{name}"),
            Self::Periodic { name, round } => write!(f, "flex_fields__{name}__{round}__value"),
        }
    }
}

/// Represents a literal value that can be used in lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// Boolean value
    Boolean(bool),

    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// String value, including ISO formatted dates
    String(String),

    /// Ordered list of values (ranges, sets)
    List(Vec<LiteralValue>),

    /// Null value
    Null,
}

impl LiteralValue {
    /// Convert a raw JSON value without any type coercion
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => Self::String(value.to_string()),
        }
    }

    /// Numeric view of the value, if it has one
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view of the value, if it is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is the null literal
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "'{s}'"),
            Self::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Self::Null => write!(f, "null"),
        }
    }
}

/// Comparison applied by a lookup, named after its query suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupOp {
    /// Exact equality
    Exact,
    /// Case-insensitive substring containment
    IContains,
    /// Multi-value field holds the given element
    SetContains,
    /// Inclusive range over a two element list
    Range,
    /// Greater than or equal
    Gte,
    /// Less than or equal
    Lte,
    /// Null test, the value is the expected nullness
    IsNull,
    /// Membership in a list of values
    In,
}

impl LookupOp {
    /// Query suffix appended to the lookup path
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Exact => "",
            Self::IContains => "__icontains",
            Self::SetContains => "__contains",
            Self::Range => "__range",
            Self::Gte => "__gte",
            Self::Lte => "__lte",
            Self::IsNull => "__isnull",
            Self::In => "__in",
        }
    }
}

/// A single `(path)(suffix) == value` test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    /// Where the value lives
    pub path: FieldPath,
    /// How it is compared
    pub op: LookupOp,
    /// What it is compared against
    pub value: LiteralValue,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}={}", self.path, self.op.suffix(), self.value)
    }
}

/// One free-text term handed to a full-text search backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchTerm {
    /// Field the term is matched against
    pub field: String,
    /// Free text to match
    pub text: String,
}

/// Represents a boolean predicate over households or individuals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches everything
    AlwaysTrue,

    /// Matches nothing
    AlwaysFalse,

    /// Field comparison
    Lookup(Lookup),

    /// Logical AND of predicates
    And(Vec<Predicate>),

    /// Logical OR of predicates
    Or(Vec<Predicate>),

    /// Logical NOT of a predicate
    Not(Box<Predicate>),

    /// Household has at least one member matching the individual predicate
    AnyMember(Box<Predicate>),

    /// Household has at least one collector matching the individual predicate
    AnyCollector(Box<Predicate>),

    /// Individual has an open adjudication ticket in one of the categories
    OpenTicket {
        /// Ticket categories that count
        categories: Vec<String>,
    },

    /// Full-text search, every term must match
    TextSearch {
        /// Entity level searched
        entity: Association,
        /// Terms combined with AND
        terms: Vec<SearchTerm>,
    },
}

impl Predicate {
    /// Field comparison predicate
    #[must_use]
    pub fn lookup(path: FieldPath, op: LookupOp, value: LiteralValue) -> Self {
        Self::Lookup(Lookup { path, op, value })
    }

    /// AND of all parts, flattened and with identities removed
    ///
    /// An empty input yields `AlwaysTrue`.
    pub fn and<I: IntoIterator<Item = Predicate>>(parts: I) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            if !collect_operands(part, true, &mut flat) {
                return Self::AlwaysFalse;
            }
        }
        match flat.len() {
            0 => Self::AlwaysTrue,
            1 => flat.pop().unwrap_or(Self::AlwaysTrue),
            _ => Self::And(flat),
        }
    }

    /// OR of all parts, flattened and with identities removed
    ///
    /// An empty input yields `AlwaysFalse`.
    pub fn or<I: IntoIterator<Item = Predicate>>(parts: I) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            if !collect_operands(part, false, &mut flat) {
                return Self::AlwaysTrue;
            }
        }
        match flat.len() {
            0 => Self::AlwaysFalse,
            1 => flat.pop().unwrap_or(Self::AlwaysFalse),
            _ => Self::Or(flat),
        }
    }

    /// Logical negation
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::AlwaysTrue => Self::AlwaysFalse,
            Self::AlwaysFalse => Self::AlwaysTrue,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Project an individual predicate to "household has such a member"
    #[must_use]
    pub fn any_member(individual: Predicate) -> Self {
        match individual {
            Self::AlwaysFalse => Self::AlwaysFalse,
            other => Self::AnyMember(Box::new(other)),
        }
    }

    /// Project an individual predicate to "household has such a collector"
    #[must_use]
    pub fn any_collector(individual: Predicate) -> Self {
        match individual {
            Self::AlwaysFalse => Self::AlwaysFalse,
            other => Self::AnyCollector(Box::new(other)),
        }
    }

    /// Rebuild the tree through the simplifying constructors
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Self::And(parts) => Self::and(parts.into_iter().map(Self::simplify)),
            Self::Or(parts) => Self::or(parts.into_iter().map(Self::simplify)),
            Self::Not(inner) => inner.simplify().negate(),
            Self::AnyMember(inner) => Self::any_member(inner.simplify()),
            Self::AnyCollector(inner) => Self::any_collector(inner.simplify()),
            other => other,
        }
    }

    /// Whether the predicate trivially matches everything
    #[must_use]
    pub fn is_always_true(&self) -> bool {
        matches!(self, Self::AlwaysTrue)
    }

    /// Whether the predicate trivially matches nothing
    #[must_use]
    pub fn is_always_false(&self) -> bool {
        matches!(self, Self::AlwaysFalse)
    }

    /// Returns every field path referenced by this predicate
    #[must_use]
    pub fn required_fields(&self) -> FxHashSet<FieldPath> {
        let mut fields = FxHashSet::default();
        self.collect_required_fields(&mut fields);
        fields
    }

    fn collect_required_fields(&self, fields: &mut FxHashSet<FieldPath>) {
        match self {
            Self::Lookup(lookup) => {
                fields.insert(lookup.path.clone());
            }
            Self::And(parts) | Self::Or(parts) => {
                for part in parts {
                    part.collect_required_fields(fields);
                }
            }
            Self::Not(inner) | Self::AnyMember(inner) | Self::AnyCollector(inner) => {
                inner.collect_required_fields(fields);
            }
            Self::TextSearch { terms, .. } => {
                for term in terms {
                    fields.insert(FieldPath::Core(term.field.clone()));
                }
            }
            Self::AlwaysTrue | Self::AlwaysFalse | Self::OpenTicket { .. } => {}
        }
    }
}

/// Push `part` into `flat`, splicing nested nodes of the same kind.
/// Returns false when the annihilator of the connective was found.
fn collect_operands(part: Predicate, conjunction: bool, flat: &mut Vec<Predicate>) -> bool {
    match (part, conjunction) {
        (Predicate::AlwaysTrue, true) | (Predicate::AlwaysFalse, false) => true,
        (Predicate::AlwaysFalse, true) | (Predicate::AlwaysTrue, false) => false,
        (Predicate::And(inner), true) | (Predicate::Or(inner), false) => inner
            .into_iter()
            .all(|nested| collect_operands(nested, conjunction, flat)),
        (other, _) => {
            flat.push(other);
            true
        }
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        Predicate::and([self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        Predicate::or([self, rhs])
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysTrue => write!(f, "TRUE"),
            Self::AlwaysFalse => write!(f, "FALSE"),
            Self::Lookup(lookup) => write!(f, "{lookup}"),
            Self::And(parts) => write!(f, "({})", parts.iter().join(" AND ")),
            Self::Or(parts) => write!(f, "({})", parts.iter().join(" OR ")),
            Self::Not(inner) => write!(f, "NOT {inner}"),
            Self::AnyMember(inner) => write!(f, "ANY_MEMBER({inner})"),
            Self::AnyCollector(inner) => write!(f, "ANY_COLLECTOR({inner})"),
            Self::OpenTicket { categories } => {
                write!(f, "OPEN_TICKET[{}]", categories.iter().join(","))
            }
            Self::TextSearch { entity, terms } => write!(
                f,
                "SEARCH<{entity}>[{}]",
                terms
                    .iter()
                    .map(|term| format!("{}:'{}'", term.field, term.text))
                    .join(" AND ")
            ),
        }
    }
}
