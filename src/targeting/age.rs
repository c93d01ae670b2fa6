//! Age comparisons
//!
//! Age is not stored; it is derived from the birth date. Comparisons on age
//! are rewritten into birth date ranges relative to the compile reference
//! date, so an age of `a` covers birth dates in
//! `(reference - (a + 1) years, reference - a years]`.

use chrono::{Days, Months, NaiveDate};
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::CompileError;
use crate::filter::{FieldPath, LiteralValue, LookupOp, Predicate};
use crate::schema::field_def::ValueType;
use crate::targeting::ComparisonMethod;

/// Input handed to a custom query builder
#[derive(Debug, Clone, Copy)]
pub struct CustomQuery<'a> {
    /// Field name as authored
    pub field: &'a str,
    /// Comparison method
    pub method: ComparisonMethod,
    /// Raw, uncoerced arguments
    pub arguments: &'a [Value],
    /// Date age-like fields are computed against
    pub reference_date: NaiveDate,
}

const BIRTH_DATE: &str = "birth_date";

/// Custom builder for the `age` field
pub fn age_to_birth_date_query(query: &CustomQuery<'_>) -> Result<Predicate, CompileError> {
    let expected = match query.method {
        ComparisonMethod::Range | ComparisonMethod::NotInRange => 2,
        ComparisonMethod::Equals
        | ComparisonMethod::NotEquals
        | ComparisonMethod::GreaterThan
        | ComparisonMethod::LessThan => 1,
        method => {
            return Err(CompileError::UnsupportedCustomComparison {
                field: query.field.to_string(),
                method,
            });
        }
    };
    if query.arguments.len() != expected {
        return Err(CompileError::ArgumentCount {
            field: query.field.to_string(),
            method: query.method,
            expected: expected.to_string(),
            actual: query.arguments.len(),
        });
    }

    let ages = query
        .arguments
        .iter()
        .map(|raw| parse_age(query.field, raw))
        .collect::<Result<SmallVec<[u32; 2]>, _>>()?;
    let today = query.reference_date;

    let predicate = match query.method {
        ComparisonMethod::Range => birth_date_range(today, Some(ages[0]), Some(ages[1])),
        ComparisonMethod::NotInRange => !birth_date_range(today, Some(ages[0]), Some(ages[1])),
        ComparisonMethod::Equals => birth_date_range(today, Some(ages[0]), Some(ages[0])),
        ComparisonMethod::NotEquals => !birth_date_range(today, Some(ages[0]), Some(ages[0])),
        ComparisonMethod::GreaterThan => birth_date_range(today, Some(ages[0]), None),
        _ => birth_date_range(today, None, Some(ages[0])),
    };
    Ok(predicate)
}

/// Birth dates of people aged within `[min_age, max_age]` on `today`
fn birth_date_range(today: NaiveDate, min_age: Option<u32>, max_age: Option<u32>) -> Predicate {
    let mut parts = SmallVec::<[Predicate; 2]>::new();
    if let Some(min_age) = min_age {
        parts.push(birth_date_bound(LookupOp::Lte, years_before(today, min_age)));
    }
    if let Some(max_age) = max_age {
        let too_old = years_before(today, max_age.saturating_add(1));
        let earliest = too_old.checked_add_days(Days::new(1)).unwrap_or(too_old);
        parts.push(birth_date_bound(LookupOp::Gte, earliest));
    }
    Predicate::and(parts)
}

fn birth_date_bound(op: LookupOp, date: NaiveDate) -> Predicate {
    Predicate::lookup(
        FieldPath::core(BIRTH_DATE),
        op,
        LiteralValue::String(date.format("%Y-%m-%d").to_string()),
    )
}

/// Calendar-aware subtraction; 29 February falls back to the 28th
fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

fn parse_age(field: &str, raw: &Value) -> Result<u32, CompileError> {
    let age = match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    age.and_then(|age| u32::try_from(age).ok())
        .ok_or_else(|| CompileError::InvalidArgument {
            field: field.to_string(),
            value: raw.to_string(),
            expected: ValueType::Integer,
        })
}
