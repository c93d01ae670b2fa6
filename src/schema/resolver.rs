//! Field resolution
//!
//! A single capability turns a comparator's field reference into a typed
//! [`FieldInfo`], whichever registry the field lives in.

use crate::error::CompileError;
use crate::filter::FieldPath;
use crate::schema::field_def::{
    Association, CoreFieldRegistry, FieldClassification, FieldInfo, FieldRef,
    FlexFieldRegistry, QueryLookup,
};

/// Resolves field references for the compiler
pub trait FieldResolver: Send + Sync {
    /// Resolve a field at an entity level, within an optional program
    ///
    /// # Errors
    /// `UnknownField`, `UnsupportedQuery`, `MissingRoundNumber` or
    /// `RoundOutOfRange` when the reference cannot be resolved.
    fn resolve(
        &self,
        field: &FieldRef<'_>,
        association: Association,
        program: Option<&str>,
    ) -> Result<FieldInfo, CompileError>;
}

/// Core and flexible registries behind one resolver
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    core: CoreFieldRegistry,
    flex: FlexFieldRegistry,
}

impl FieldCatalog {
    /// Create a catalog from both registries
    #[must_use]
    pub fn new(core: CoreFieldRegistry, flex: FlexFieldRegistry) -> Self {
        Self { core, flex }
    }

    /// Catalog with the standard core fields and no flexible fields
    #[must_use]
    pub fn standard() -> Self {
        Self::new(CoreFieldRegistry::standard(), FlexFieldRegistry::new())
    }

    /// Replace the flexible registry
    #[must_use]
    pub fn with_flex_fields(mut self, flex: FlexFieldRegistry) -> Self {
        self.flex = flex;
        self
    }

    /// The core registry
    #[must_use]
    pub fn core(&self) -> &CoreFieldRegistry {
        &self.core
    }

    /// The flexible registry
    #[must_use]
    pub fn flex(&self) -> &FlexFieldRegistry {
        &self.flex
    }

    fn resolve_core(&self, name: &str, association: Association) -> Result<FieldInfo, CompileError> {
        let info = self
            .core
            .get(name, association)
            .ok_or_else(|| unknown(name, association))?;
        if info.lookup.is_none() {
            return Err(CompileError::UnsupportedQuery {
                name: name.to_string(),
            });
        }
        Ok(info.clone())
    }

    fn resolve_flex(
        &self,
        name: &str,
        association: Association,
        program: Option<&str>,
    ) -> Result<FieldInfo, CompileError> {
        self.flex
            .get(name, program)
            .filter(|definition| definition.associated_with == association)
            .map(|definition| definition.to_field_info())
            .ok_or_else(|| unknown(name, association))
    }

    fn resolve_periodic(
        &self,
        field: &FieldRef<'_>,
        association: Association,
        program: Option<&str>,
    ) -> Result<FieldInfo, CompileError> {
        let definition = self
            .flex
            .get_periodic(field.name, program)
            .filter(|definition| definition.associated_with == association)
            .ok_or_else(|| unknown(field.name, association))?;

        let round = field.round.ok_or_else(|| CompileError::MissingRoundNumber {
            field: field.name.to_string(),
        })?;
        let rounds = definition.number_of_rounds.unwrap_or(0);
        if round == 0 || round > rounds {
            return Err(CompileError::RoundOutOfRange {
                field: field.name.to_string(),
                round,
                rounds,
            });
        }

        let mut info = definition.to_field_info();
        info.lookup = Some(QueryLookup::Path(FieldPath::periodic(field.name, round)));
        Ok(info)
    }
}

impl FieldResolver for FieldCatalog {
    fn resolve(
        &self,
        field: &FieldRef<'_>,
        association: Association,
        program: Option<&str>,
    ) -> Result<FieldInfo, CompileError> {
        match field.classification {
            FieldClassification::NotFlexField => self.resolve_core(field.name, association),
            FieldClassification::FlexField => self.resolve_flex(field.name, association, program),
            FieldClassification::FlexFieldPdu => {
                self.resolve_periodic(field, association, program)
            }
        }
    }
}

fn unknown(name: &str, scope: Association) -> CompileError {
    CompileError::UnknownField {
        name: name.to_string(),
        scope,
    }
}
