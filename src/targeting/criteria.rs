//! Top-level targeting criteria
//!
//! Rules are ORed, then the base filters, exclusion flags and explicit ID
//! allow-lists are ANDed on top:
//!
//! ```text
//! withdrawn = false
//!   AND NOT unicef_id IN excluded_household_ids
//!   AND (rule_1 OR rule_2 ...)
//!   AND [no open adjudication ticket on members or collectors]
//!   AND [no confirmed sanction-list match on members or collectors]
//!   AND [unicef_id IN household_ids OR ANY_MEMBER(unicef_id IN individual_ids)]
//!   AND [size >= 1 once the target population is approved]
//! ```

use std::time::Instant;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::EmptyCriteriaPolicy;
use crate::error::{CompileError, Result};
use crate::filter::{FieldPath, LiteralValue, LookupOp, Predicate};
use crate::targeting::{Compiler, IdList, Rule};
use crate::utils::logging::log_compile_complete;

/// A complete targeting definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub exclude_if_active_adjudication_ticket: bool,
    #[serde(default)]
    pub exclude_if_on_sanction_list: bool,
    #[serde(default)]
    pub household_ids: IdList,
    #[serde(default)]
    pub individual_ids: IdList,
    #[serde(default)]
    pub excluded_household_ids: Vec<String>,
}

impl Criteria {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Parse an editor definition
    pub fn from_json(definition: &str) -> Result<Self> {
        Ok(serde_json::from_str(definition)?)
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_household_ids(mut self, ids: &str) -> Self {
        self.household_ids = IdList::parse(ids);
        self
    }

    #[must_use]
    pub fn with_individual_ids(mut self, ids: &str) -> Self {
        self.individual_ids = IdList::parse(ids);
        self
    }

    #[must_use]
    pub fn excluding_households<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_household_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn exclude_active_adjudication(mut self, exclude: bool) -> Self {
        self.exclude_if_active_adjudication_ticket = exclude;
        self
    }

    #[must_use]
    pub fn exclude_sanctioned(mut self, exclude: bool) -> Self {
        self.exclude_if_on_sanction_list = exclude;
        self
    }

    /// Whether either explicit ID list is set
    #[must_use]
    pub fn has_id_filters(&self) -> bool {
        !self.household_ids.is_empty() || !self.individual_ids.is_empty()
    }

    /// Rule strings joined with ` OR `
    #[must_use]
    pub fn criteria_string(&self) -> String {
        self.rules.iter().map(Rule::criteria_string).join(" OR ")
    }

    /// Household predicate of the whole criteria
    ///
    /// The first failing comparator aborts the build.
    pub fn evaluate(&self, compiler: &Compiler<'_>) -> Result<Predicate, CompileError> {
        let started = Instant::now();
        let config = compiler.config();
        let mut parts = vec![core_lookup("withdrawn", LookupOp::Exact, LiteralValue::Boolean(false))];

        if !self.excluded_household_ids.is_empty() {
            parts.push(!core_lookup("unicef_id", LookupOp::In, id_values(&self.excluded_household_ids)));
        }

        parts.push(self.rules_predicate(compiler)?);

        if self.exclude_if_active_adjudication_ticket {
            let open_ticket = Predicate::OpenTicket {
                categories: config.adjudication_categories.clone(),
            };
            parts.push(!on_member_or_collector(open_ticket));
        }

        if self.exclude_if_on_sanction_list {
            let sanctioned = core_lookup(
                "sanction_list_confirmed_match",
                LookupOp::Exact,
                LiteralValue::Boolean(true),
            );
            parts.push(!on_member_or_collector(sanctioned));
        }

        if self.has_id_filters() {
            parts.push(self.id_predicate());
        }

        let requires_members = compiler
            .scope()
            .population
            .as_ref()
            .is_some_and(|population| population.requires_members());
        if requires_members {
            parts.push(core_lookup("size", LookupOp::Gte, LiteralValue::Int(1)));
        }

        let predicate = Predicate::and(parts);
        log::debug!("compiled criteria [{}] to {}", self.criteria_string(), predicate);
        log_compile_complete(self.rules.len(), started.elapsed());
        Ok(predicate)
    }

    fn rules_predicate(&self, compiler: &Compiler<'_>) -> Result<Predicate, CompileError> {
        if self.rules.is_empty() {
            if self.has_id_filters() {
                return Ok(Predicate::AlwaysTrue);
            }
            let policy = compiler.config().empty_criteria_policy;
            log::warn!("criteria has no rules and no ID lists, applying {policy:?}");
            return Ok(match policy {
                EmptyCriteriaPolicy::MatchNone => Predicate::AlwaysFalse,
                EmptyCriteriaPolicy::MatchAll => Predicate::AlwaysTrue,
            });
        }

        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let predicate = rule.evaluate(compiler)?;
                log::debug!("rule {index}: {predicate}");
                Ok(predicate)
            })
            .collect::<Result<Vec<_>, CompileError>>()?;
        Ok(Predicate::or(rules))
    }

    fn id_predicate(&self) -> Predicate {
        let mut alternatives = Vec::with_capacity(2);
        if !self.household_ids.is_empty() {
            alternatives.push(core_lookup(
                "unicef_id",
                LookupOp::In,
                id_values(self.household_ids.as_slice()),
            ));
        }
        if !self.individual_ids.is_empty() {
            alternatives.push(Predicate::any_member(core_lookup(
                "unicef_id",
                LookupOp::In,
                id_values(self.individual_ids.as_slice()),
            )));
        }
        Predicate::or(alternatives)
    }
}

fn core_lookup(name: &str, op: LookupOp, value: LiteralValue) -> Predicate {
    Predicate::lookup(FieldPath::core(name), op, value)
}

fn id_values(ids: &[String]) -> LiteralValue {
    LiteralValue::List(ids.iter().cloned().map(LiteralValue::String).collect())
}

fn on_member_or_collector(individual: Predicate) -> Predicate {
    Predicate::any_member(individual.clone()) | Predicate::any_collector(individual)
}
