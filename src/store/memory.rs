//! In-memory reference store
//!
//! Evaluates predicates directly over household and individual records with
//! two-valued logic: a missing value fails every lookup except `IsNull`.
//! Households are evaluated in parallel.

use std::cmp::Ordering;
use std::time::Instant;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::StoreError;
use crate::filter::{Lookup, LiteralValue, LookupOp, Predicate, SearchTerm};
use crate::models::{Household, Individual, Record};
use crate::schema::field_def::Association;
use crate::store::HouseholdStore;
use crate::utils::logging::log_store_selection;

/// Households and individuals held in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    households: Vec<Household>,
    individuals: Vec<Individual>,
    household_index: FxHashMap<String, usize>,
    individual_index: FxHashMap<String, usize>,
    members: FxHashMap<String, Vec<usize>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a household; IDs must be unique
    pub fn add_household(&mut self, household: Household) -> Result<(), StoreError> {
        if self.household_index.contains_key(&household.unicef_id) {
            return Err(StoreError::DuplicateId {
                entity: Association::Household,
                id: household.unicef_id,
            });
        }
        self.household_index
            .insert(household.unicef_id.clone(), self.households.len());
        self.households.push(household);
        Ok(())
    }

    /// Add an individual; IDs must be unique
    ///
    /// The member's household does not have to be stored yet.
    pub fn add_individual(&mut self, individual: Individual) -> Result<(), StoreError> {
        if self.individual_index.contains_key(&individual.unicef_id) {
            return Err(StoreError::DuplicateId {
                entity: Association::Individual,
                id: individual.unicef_id,
            });
        }
        let position = self.individuals.len();
        if let Some(household_id) = &individual.household_id {
            self.members
                .entry(household_id.clone())
                .or_default()
                .push(position);
        }
        self.individual_index
            .insert(individual.unicef_id.clone(), position);
        self.individuals.push(individual);
        Ok(())
    }

    pub fn households(&self) -> &[Household] {
        &self.households
    }

    pub fn household(&self, unicef_id: &str) -> Option<&Household> {
        self.household_index
            .get(unicef_id)
            .map(|&position| &self.households[position])
    }

    pub fn individual(&self, unicef_id: &str) -> Option<&Individual> {
        self.individual_index
            .get(unicef_id)
            .map(|&position| &self.individuals[position])
    }

    /// Members of a household, in insertion order
    pub fn members_of<'a>(&'a self, household_id: &str) -> impl Iterator<Item = &'a Individual> {
        self.members
            .get(household_id)
            .into_iter()
            .flatten()
            .map(|&position| &self.individuals[position])
    }

    /// Collectors of a household, wherever they are registered
    pub fn collectors_of<'a>(
        &'a self,
        household: &'a Household,
    ) -> impl Iterator<Item = &'a Individual> {
        household
            .collectors
            .iter()
            .filter_map(|collector| self.individual(&collector.individual_id))
    }

    fn household_matches(
        &self,
        household: &Household,
        predicate: &Predicate,
    ) -> Result<bool, StoreError> {
        match predicate {
            Predicate::AnyMember(inner) => {
                for member in self.members_of(&household.unicef_id) {
                    if individual_matches(member, inner)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::AnyCollector(inner) => {
                for collector in self.collectors_of(household) {
                    if individual_matches(collector, inner)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::OpenTicket { .. } => Err(misplaced(predicate, Association::Household)),
            other => evaluate_common(household, other, Association::Household, |nested| {
                self.household_matches(household, nested)
            }),
        }
    }
}

impl HouseholdStore for InMemoryStore {
    type Error = StoreError;

    fn select(&self, predicate: &Predicate) -> Result<Vec<&Household>, StoreError> {
        let started = Instant::now();
        let selected = self
            .households
            .par_iter()
            .map(|household| {
                self.household_matches(household, predicate)
                    .map(|matched| matched.then_some(household))
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        log_store_selection(selected.len(), self.households.len(), Some(started.elapsed()));
        Ok(selected)
    }
}

fn individual_matches(individual: &Individual, predicate: &Predicate) -> Result<bool, StoreError> {
    match predicate {
        Predicate::OpenTicket { categories } => Ok(individual.has_open_ticket(categories)),
        Predicate::AnyMember(_) | Predicate::AnyCollector(_) => {
            Err(misplaced(predicate, Association::Individual))
        }
        other => evaluate_common(individual, other, Association::Individual, |nested| {
            individual_matches(individual, nested)
        }),
    }
}

/// Connectives, lookups and text search, which mean the same at both levels
fn evaluate_common<R, F>(
    record: &R,
    predicate: &Predicate,
    level: Association,
    recurse: F,
) -> Result<bool, StoreError>
where
    R: Record,
    F: Fn(&Predicate) -> Result<bool, StoreError>,
{
    match predicate {
        Predicate::AlwaysTrue => Ok(true),
        Predicate::AlwaysFalse => Ok(false),
        Predicate::Lookup(lookup) => Ok(lookup_matches(record, lookup)),
        Predicate::And(parts) => {
            for part in parts {
                if !recurse(part)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or(parts) => {
            for part in parts {
                if recurse(part)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Not(inner) => Ok(!recurse(inner)?),
        Predicate::TextSearch { entity, terms } if *entity == level => {
            Ok(terms.iter().all(|term| term_matches(record, term)))
        }
        other => Err(misplaced(other, level)),
    }
}

fn misplaced(predicate: &Predicate, level: Association) -> StoreError {
    StoreError::MisplacedPredicate {
        predicate: predicate.to_string(),
        level,
    }
}

fn lookup_matches<R: Record>(record: &R, lookup: &Lookup) -> bool {
    let value = record.value_at(&lookup.path);

    if lookup.op == LookupOp::IsNull {
        let expect_null = matches!(lookup.value, LiteralValue::Boolean(true));
        return value.is_none() == expect_null;
    }
    let Some(value) = value else {
        return false;
    };

    match lookup.op {
        LookupOp::Exact => compare(&value, &lookup.value) == Some(Ordering::Equal),
        LookupOp::IContains => lookup
            .value
            .as_str()
            .is_some_and(|needle| text_of(&value).to_lowercase().contains(&needle.to_lowercase())),
        LookupOp::SetContains => match &value {
            Value::Array(items) => items
                .iter()
                .any(|item| compare(item, &lookup.value) == Some(Ordering::Equal)),
            scalar => compare(scalar, &lookup.value) == Some(Ordering::Equal),
        },
        LookupOp::Range => match &lookup.value {
            LiteralValue::List(bounds) if bounds.len() == 2 => {
                matches!(
                    compare(&value, &bounds[0]),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    compare(&value, &bounds[1]),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            _ => false,
        },
        LookupOp::Gte => matches!(
            compare(&value, &lookup.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        LookupOp::Lte => matches!(
            compare(&value, &lookup.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        LookupOp::In => match &lookup.value {
            LiteralValue::List(candidates) => candidates
                .iter()
                .any(|candidate| compare(&value, candidate) == Some(Ordering::Equal)),
            _ => false,
        },
        LookupOp::IsNull => false,
    }
}

/// Order a stored value against a literal; `None` when they are not comparable
fn compare(value: &Value, literal: &LiteralValue) -> Option<Ordering> {
    match (value, literal) {
        (Value::Bool(a), LiteralValue::Boolean(b)) => Some(a.cmp(b)),
        (Value::String(a), LiteralValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Number(a), literal) => a.as_f64()?.partial_cmp(&literal.as_f64()?),
        (Value::String(a), LiteralValue::Int(_) | LiteralValue::Float(_)) => {
            a.trim().parse::<f64>().ok()?.partial_cmp(&literal.as_f64()?)
        }
        _ => None,
    }
}

/// Searchable text of a value; list items are joined with spaces
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(text_of).collect::<Vec<_>>().join(" "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Every whitespace token of the term occurs in the field text
fn term_matches<R: Record>(record: &R, term: &SearchTerm) -> bool {
    let Some(value) = record.core_value(&term.field) else {
        return false;
    };
    let haystack = text_of(&value).to_lowercase();
    term.text
        .split_whitespace()
        .all(|token| haystack.contains(&token.to_lowercase()))
}
