//! Filter blocks
//!
//! A [`FilterBlock`] ANDs household comparators. An [`IndividualFilterBlock`]
//! ANDs individual comparators and projects the result to "the household has
//! at least one such member".

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CompileError;
use crate::filter::{FieldPath, LiteralValue, LookupOp, Predicate, SearchTerm};
use crate::schema::field_def::{Association, FieldClassification};
use crate::targeting::comparator::argument_text;
use crate::targeting::{Comparator, Compiler};

/// Relationship value marking the head of household
pub const HEAD_OF_HOUSEHOLD: &str = "HEAD";

/// Comparators ANDed together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterBlock {
    pub comparators: Vec<Comparator>,
}

impl FilterBlock {
    pub fn new(comparators: Vec<Comparator>) -> Self {
        Self { comparators }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comparators.is_empty()
    }

    /// AND of every comparator, evaluated in list order
    ///
    /// The first failing comparator aborts the block.
    pub fn evaluate(
        &self,
        compiler: &Compiler<'_>,
        association: Association,
    ) -> Result<Predicate, CompileError> {
        let parts = self
            .comparators
            .iter()
            .map(|comparator| comparator.evaluate(compiler, association))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Predicate::and(parts))
    }

    /// `c1 AND c2 ...`
    #[must_use]
    pub fn criteria_string(&self) -> String {
        self.comparators.iter().join(" AND ")
    }
}

/// Individual-level comparators plus the head-of-household restriction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualFilterBlock {
    #[serde(default)]
    pub individual_block_filters: FilterBlock,
    #[serde(default)]
    pub target_only_hoh: bool,
}

impl IndividualFilterBlock {
    pub fn new(comparators: Vec<Comparator>) -> Self {
        Self {
            individual_block_filters: FilterBlock::new(comparators),
            target_only_hoh: false,
        }
    }

    /// Only heads of household may satisfy the block
    #[must_use]
    pub fn heads_only(mut self) -> Self {
        self.target_only_hoh = true;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individual_block_filters.is_empty()
    }

    /// Household-level predicate: some current member satisfies every
    /// comparator of the block
    ///
    /// Full-text fields are not compared; their arguments become search
    /// terms handed to the compiler's search backend.
    pub fn evaluate(&self, compiler: &Compiler<'_>) -> Result<Predicate, CompileError> {
        if self.is_empty() {
            return Ok(Predicate::AlwaysTrue);
        }

        let config = compiler.config();
        let (searched, compared): (Vec<&Comparator>, Vec<&Comparator>) = self
            .individual_block_filters
            .comparators
            .iter()
            .partition(|comparator| {
                comparator.flex_field_classification == FieldClassification::NotFlexField
                    && config.is_full_text_field(&comparator.field_name)
            });

        let mut parts = vec![
            flag_is_false("duplicate"),
            flag_is_false("withdrawn"),
        ];
        for comparator in compared {
            parts.push(comparator.evaluate(compiler, Association::Individual)?);
        }

        let terms = searched
            .into_iter()
            .fold(Vec::new(), |terms, comparator| fold_search_terms(terms, comparator));
        if !terms.is_empty() {
            log::trace!("individual block searches {} term(s)", terms.len());
            parts.push(compiler.search().search(Association::Individual, terms));
        }

        if self.target_only_hoh {
            parts.push(Predicate::lookup(
                FieldPath::core("relationship"),
                LookupOp::Exact,
                LiteralValue::String(HEAD_OF_HOUSEHOLD.to_string()),
            ));
        }

        Ok(Predicate::any_member(Predicate::and(parts)))
    }

    /// `(c1 AND c2 ...)`
    #[must_use]
    pub fn criteria_string(&self) -> String {
        format!("({})", self.individual_block_filters.criteria_string())
    }
}

fn flag_is_false(name: &str) -> Predicate {
    Predicate::lookup(FieldPath::core(name), LookupOp::Exact, LiteralValue::Boolean(false))
}

fn fold_search_terms(mut terms: Vec<SearchTerm>, comparator: &Comparator) -> Vec<SearchTerm> {
    let values = comparator.arguments.iter().flat_map(|argument| match argument {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    });
    for value in values.filter(|value| !value.is_null()) {
        terms.push(SearchTerm {
            field: comparator.field_name.clone(),
            text: argument_text(&value),
        });
    }
    terms
}
