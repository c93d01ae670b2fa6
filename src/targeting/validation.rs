//! Authoring-time checks on a criteria definition

use crate::error::ValidationError;
use crate::targeting::{Compiler, Criteria, IdList};

/// Validates criteria before they are stored or run
#[derive(Debug)]
pub struct CriteriaValidator<'a> {
    compiler: &'a Compiler<'a>,
}

impl<'a> CriteriaValidator<'a> {
    pub fn new(compiler: &'a Compiler<'a>) -> Self {
        Self { compiler }
    }

    /// Structural checks first, then a full compile so every field error
    /// surfaces against the rule that caused it
    pub fn validate(&self, criteria: &Criteria) -> Result<(), ValidationError> {
        if criteria.rules.is_empty() && !criteria.has_id_filters() {
            return Err(ValidationError::EmptyCriteria);
        }

        if let Some(index) = criteria.rules.iter().position(|rule| rule.is_empty()) {
            return Err(ValidationError::EmptyRule { index });
        }

        let config = self.compiler.config();
        check_prefix(&criteria.household_ids, &config.household_id_prefix)?;
        check_prefix(&criteria.individual_ids, &config.individual_id_prefix)?;

        for (rule, definition) in criteria.rules.iter().enumerate() {
            definition
                .evaluate(self.compiler)
                .map_err(|source| ValidationError::Compile { rule, source })?;
        }
        Ok(())
    }
}

fn check_prefix(ids: &IdList, prefix: &str) -> Result<(), ValidationError> {
    match ids.iter().find(|id| !id.starts_with(prefix)) {
        Some(id) => Err(ValidationError::InvalidIdentifier {
            id: id.to_string(),
            expected_prefix: prefix.to_string(),
        }),
        None => Ok(()),
    }
}
