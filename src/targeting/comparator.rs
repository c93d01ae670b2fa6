//! Field comparator
//!
//! The leaf of a criteria: one field, one comparison method, raw arguments.
//! A comparator may be built invalid; it only fails when evaluated.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::CompileError;
use crate::filter::{FieldPath, LiteralValue, LookupOp, Predicate};
use crate::schema::field_def::{
    Association, FieldClassification, FieldInfo, FieldRef, QueryLookup, ValueType,
};
use crate::targeting::age::CustomQuery;
use crate::targeting::{Compiler, ComparisonMethod};

type Arguments = SmallVec<[LiteralValue; 2]>;

/// One `field method (arguments)` comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparator {
    /// Field name as authored
    pub field_name: String,
    /// Comparison method
    pub comparison_method: ComparisonMethod,
    /// Raw arguments, coerced at evaluation time
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Registry the field is resolved through
    #[serde(default)]
    pub flex_field_classification: FieldClassification,
    /// One-based round for periodic fields
    #[serde(default)]
    pub round_number: Option<u32>,
}

impl Comparator {
    /// Comparator on a core field
    pub fn new(
        field_name: impl Into<String>,
        comparison_method: ComparisonMethod,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            comparison_method,
            arguments,
            flex_field_classification: FieldClassification::NotFlexField,
            round_number: None,
        }
    }

    /// Comparator on a flexible field
    pub fn flex(
        field_name: impl Into<String>,
        comparison_method: ComparisonMethod,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            flex_field_classification: FieldClassification::FlexField,
            ..Self::new(field_name, comparison_method, arguments)
        }
    }

    /// Comparator on one round of a periodic field
    pub fn periodic(
        field_name: impl Into<String>,
        round_number: Option<u32>,
        comparison_method: ComparisonMethod,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            flex_field_classification: FieldClassification::FlexFieldPdu,
            round_number,
            ..Self::new(field_name, comparison_method, arguments)
        }
    }

    /// The field this comparator targets
    #[must_use]
    pub fn field_ref(&self) -> FieldRef<'_> {
        FieldRef {
            name: &self.field_name,
            classification: self.flex_field_classification,
            round: self.round_number,
        }
    }

    /// Build the predicate for this comparison at an entity level
    ///
    /// # Errors
    /// Any resolution, type, arity or coercion error; nothing partial is
    /// returned.
    pub fn evaluate(
        &self,
        compiler: &Compiler<'_>,
        association: Association,
    ) -> Result<Predicate, CompileError> {
        let info = compiler.resolver().resolve(
            &self.field_ref(),
            association,
            compiler.scope().program.as_deref(),
        )?;
        log::trace!("compiling {} against {} field", self, info.value_type);

        let method = self.comparison_method;
        if !method.supports(info.value_type) {
            return Err(CompileError::UnsupportedComparisonForType {
                field: self.field_name.clone(),
                method,
                value_type: info.value_type,
            });
        }

        let arity = method.arity_for(info.value_type);
        if !arity.accepts(self.arguments.len()) {
            return Err(CompileError::ArgumentCount {
                field: self.field_name.clone(),
                method,
                expected: arity.to_string(),
                actual: self.arguments.len(),
            });
        }

        match &info.lookup {
            Some(QueryLookup::Custom(builder)) => builder(&CustomQuery {
                field: &self.field_name,
                method,
                arguments: &self.arguments,
                reference_date: compiler.scope().reference_date,
            }),
            Some(QueryLookup::Path(path)) => self.build(&info, path),
            None => Err(CompileError::UnsupportedQuery {
                name: self.field_name.clone(),
            }),
        }
    }

    fn build(&self, info: &FieldInfo, path: &FieldPath) -> Result<Predicate, CompileError> {
        let attributes = self.comparison_method.attributes();

        let positive = if attributes.op == LookupOp::IsNull {
            let flag = self.null_flag()?;
            Predicate::lookup(path.clone(), LookupOp::IsNull, LiteralValue::Boolean(flag))
        } else {
            let arguments = self
                .arguments
                .iter()
                .map(|raw| self.coerce(info, raw))
                .collect::<Result<Arguments, _>>()?;

            if info.value_type == ValueType::SelectMany && attributes.op == LookupOp::IContains {
                multi_choice_containment(path, &self.arguments, arguments)
            } else {
                Predicate::lookup(path.clone(), attributes.op, lookup_value(attributes.op, arguments))
            }
        };

        let predicate = if attributes.negated {
            !positive
        } else {
            positive
        };

        // A round without a recorded value never satisfies a comparison.
        if info.is_periodic() && attributes.op != LookupOp::IsNull {
            let recorded =
                Predicate::lookup(path.clone(), LookupOp::IsNull, LiteralValue::Boolean(false));
            return Ok(predicate & recorded);
        }
        Ok(predicate)
    }

    fn null_flag(&self) -> Result<bool, CompileError> {
        match self.arguments.first() {
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(CompileError::InvalidArgument {
                field: self.field_name.clone(),
                value: other.map_or_else(|| "null".to_string(), Value::to_string),
                expected: ValueType::Boolean,
            }),
        }
    }

    fn coerce(&self, info: &FieldInfo, raw: &Value) -> Result<LiteralValue, CompileError> {
        if info.is_periodic() && raw.is_null() {
            return Ok(LiteralValue::Null);
        }

        let coerced = match info.value_type {
            ValueType::Decimal => as_decimal(raw).map(LiteralValue::Float),
            ValueType::Integer => as_integer(raw).map(LiteralValue::Int),
            ValueType::Date => as_iso_date(raw).map(LiteralValue::String),
            _ => Some(LiteralValue::from_json(raw)),
        };
        coerced.ok_or_else(|| CompileError::InvalidArgument {
            field: self.field_name.clone(),
            value: raw.to_string(),
            expected: info.value_type,
        })
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {} ({})}}",
            self.field_name,
            self.comparison_method,
            self.arguments.iter().map(argument_text).join(",")
        )
    }
}

/// Multi-choice containment: one scalar argument tests set membership,
/// anything else requires every value to appear (case-insensitively).
fn multi_choice_containment(path: &FieldPath, raw: &[Value], arguments: Arguments) -> Predicate {
    if let [single] = raw {
        if !single.is_array() {
            let value = arguments
                .into_iter()
                .next()
                .unwrap_or(LiteralValue::Null);
            return Predicate::lookup(path.clone(), LookupOp::SetContains, value);
        }
    }

    let values = arguments.into_iter().flat_map(|argument| match argument {
        LiteralValue::List(items) => items,
        other => vec![other],
    });
    Predicate::and(values.map(|value| Predicate::lookup(path.clone(), LookupOp::IContains, value)))
}

fn lookup_value(op: LookupOp, mut arguments: Arguments) -> LiteralValue {
    match op {
        LookupOp::Range | LookupOp::In => LiteralValue::List(arguments.into_vec()),
        _ if arguments.len() == 1 => arguments.pop().unwrap_or(LiteralValue::Null),
        _ => LiteralValue::List(arguments.into_vec()),
    }
}

fn as_decimal(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn as_iso_date(raw: &Value) -> Option<String> {
    let Value::String(s) = raw else {
        return None;
    };
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Argument as shown in criteria strings: strings unquoted, JSON otherwise
pub(crate) fn argument_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
