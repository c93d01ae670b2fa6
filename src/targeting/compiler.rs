//! Compilation context
//!
//! Everything a definition needs to become a predicate: where fields are
//! resolved, how text is searched, the configuration and the scope of the
//! evaluation (program, reference date, target population state).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::TargetingConfig;
use crate::error::CompileError;
use crate::filter::Predicate;
use crate::schema::FieldResolver;
use crate::targeting::search::{NativeSearch, SearchBackend};
use crate::targeting::Criteria;

static NATIVE_SEARCH: NativeSearch = NativeSearch;

/// Lifecycle status of a target population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PopulationStatus {
    Open,
    Locked,
    Processing,
    ReadyForPayment,
    Accepted,
}

/// Target population the criteria is evaluated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationState {
    /// Current status
    pub status: PopulationStatus,
    /// Program the population belongs to
    pub program: Option<String>,
}

impl PopulationState {
    /// Once approved within a program, only households with members qualify
    #[must_use]
    pub fn requires_members(&self) -> bool {
        self.status != PopulationStatus::Open && self.program.is_some()
    }
}

/// Scope a criteria is compiled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileScope {
    /// Program flexible fields are resolved in
    pub program: Option<String>,
    /// Date age-based comparisons are computed against
    pub reference_date: NaiveDate,
    /// Target population being (re)built, if any
    pub population: Option<PopulationState>,
}

impl CompileScope {
    /// Scope with no program and no population
    #[must_use]
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            program: None,
            reference_date,
            population: None,
        }
    }

    /// Scope dated today (local time)
    #[must_use]
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Resolve flexible fields within a program
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Evaluate for a target population
    #[must_use]
    pub fn with_population(mut self, population: PopulationState) -> Self {
        self.population = Some(population);
        self
    }
}

/// Builds predicates from criteria definitions
///
/// Holds only shared references and an immutable scope, so one compiler can
/// serve any number of concurrent evaluations.
pub struct Compiler<'a> {
    resolver: &'a dyn FieldResolver,
    search: &'a dyn SearchBackend,
    config: &'a TargetingConfig,
    scope: CompileScope,
}

impl<'a> Compiler<'a> {
    /// Create a compiler using native full-text search
    #[must_use]
    pub fn new(resolver: &'a dyn FieldResolver, config: &'a TargetingConfig, scope: CompileScope) -> Self {
        Self {
            resolver,
            search: &NATIVE_SEARCH,
            config,
            scope,
        }
    }

    /// Use a different full-text search backend
    #[must_use]
    pub fn with_search(mut self, search: &'a dyn SearchBackend) -> Self {
        self.search = search;
        self
    }

    /// Field resolver
    #[must_use]
    pub fn resolver(&self) -> &dyn FieldResolver {
        self.resolver
    }

    /// Full-text search backend
    #[must_use]
    pub fn search(&self) -> &dyn SearchBackend {
        self.search
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &TargetingConfig {
        self.config
    }

    /// Compile scope
    #[must_use]
    pub fn scope(&self) -> &CompileScope {
        &self.scope
    }

    /// Compile a criteria into its household predicate
    pub fn compile(&self, criteria: &Criteria) -> Result<Predicate, CompileError> {
        criteria.evaluate(self)
    }
}

impl std::fmt::Debug for Compiler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("config", &self.config)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
