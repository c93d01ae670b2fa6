//! One OR-branch of a criteria

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::filter::Predicate;
use crate::schema::field_def::Association;
use crate::targeting::{Comparator, Compiler, FilterBlock, IndividualFilterBlock};

/// Household comparators ANDed with every individual block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub filters: FilterBlock,
    #[serde(default)]
    pub individuals_filters_blocks: Vec<IndividualFilterBlock>,
}

impl Rule {
    pub fn new(filters: Vec<Comparator>) -> Self {
        Self {
            filters: FilterBlock::new(filters),
            individuals_filters_blocks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_individual_block(mut self, block: IndividualFilterBlock) -> Self {
        self.individuals_filters_blocks.push(block);
        self
    }

    /// No household comparator and no individual block
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.individuals_filters_blocks.is_empty()
    }

    /// Household predicate of this rule
    pub fn evaluate(&self, compiler: &Compiler<'_>) -> Result<Predicate, CompileError> {
        let mut parts = Vec::with_capacity(1 + self.individuals_filters_blocks.len());
        parts.push(self.filters.evaluate(compiler, Association::Household)?);
        for block in &self.individuals_filters_blocks {
            parts.push(block.evaluate(compiler)?);
        }
        Ok(Predicate::and(parts))
    }

    /// Diagnostic form `H(...) AND I(...)`
    #[must_use]
    pub fn criteria_string(&self) -> String {
        let mut segments = Vec::with_capacity(2);
        if !self.filters.is_empty() {
            segments.push(format!("H({})", self.filters.criteria_string()));
        }
        if !self.individuals_filters_blocks.is_empty() {
            segments.push(format!(
                "I({})",
                self.individuals_filters_blocks
                    .iter()
                    .map(IndividualFilterBlock::criteria_string)
                    .join(" AND ")
            ));
        }
        segments.join(" AND ")
    }
}
