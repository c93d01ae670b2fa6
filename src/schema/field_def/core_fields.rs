//! Core field registry
//!
//! The fixed-schema fields a criteria can target, keyed by entity level and
//! name.

use rustc_hash::FxHashMap;

use super::field::{Association, FieldInfo, ValueType};
use crate::targeting::age::age_to_birth_date_query;

/// Registry of fixed-schema fields
#[derive(Debug, Clone, Default)]
pub struct CoreFieldRegistry {
    fields: FxHashMap<(Association, String), FieldInfo>,
}

impl CoreFieldRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard household and individual fields
    #[must_use]
    pub fn standard() -> Self {
        use Association::{Household, Individual};
        use ValueType::{Boolean, Date, Decimal, Integer, SelectMany, SelectOne, String as Text};

        let fields = [
            FieldInfo::new("size", "Household size", Integer, Household),
            FieldInfo::new("residence_status", "Residence status", SelectOne, Household),
            FieldInfo::new("admin1", "Household resides in which admin area 1?", SelectOne, Household)
                .with_lookup("admin1__p_code"),
            FieldInfo::new("admin2", "Household resides in which admin area 2?", SelectOne, Household)
                .with_lookup("admin2__p_code"),
            FieldInfo::new("country", "Country", SelectOne, Household),
            FieldInfo::new("village", "Village", Text, Household),
            FieldInfo::new("unicef_id", "Household ID", Text, Household),
            FieldInfo::new("child_hoh", "Child is head of household", Boolean, Household),
            FieldInfo::new("fchild_hoh", "Female child is head of household", Boolean, Household),
            FieldInfo::new("first_registration_date", "First registration date", Date, Household),
            FieldInfo::new("total_cash_received", "Total cash received", Decimal, Household),
            FieldInfo::new("female_age_group_0_5_count", "Females aged 0-5", Integer, Household),
            FieldInfo::new("male_age_group_0_5_count", "Males aged 0-5", Integer, Household),
            FieldInfo::new("pregnant_count", "Pregnant members", Integer, Household),
            FieldInfo::new("returnee", "Returnee household", Boolean, Household),
            FieldInfo::new("age", "Age (calculated)", Integer, Individual)
                .with_custom_query(age_to_birth_date_query),
            FieldInfo::new("birth_date", "Birth date", Date, Individual),
            FieldInfo::new("sex", "Gender", SelectOne, Individual),
            FieldInfo::new("marital_status", "Marital status", SelectOne, Individual),
            FieldInfo::new("relationship", "Relationship to head of household", SelectOne, Individual),
            FieldInfo::new("observed_disability", "Observed disabilities", SelectMany, Individual),
            FieldInfo::new("full_name", "Full name", Text, Individual),
            FieldInfo::new("disability", "Individual is disabled", SelectOne, Individual),
            FieldInfo::new("pregnant", "Is pregnant", Boolean, Individual),
            FieldInfo::new("work_status", "Works", SelectOne, Individual),
            FieldInfo::new("comms_disability", "Communication difficulty", SelectOne, Individual),
            FieldInfo::new("phone_no_valid", "Phone number is valid", Boolean, Individual),
            FieldInfo::new("unicef_id", "Individual ID", Text, Individual),
        ];

        fields
            .into_iter()
            .fold(Self::new(), |registry, field| registry.with_field(field))
    }

    /// Add a field, replacing any field of the same name and level
    #[must_use]
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.register(field);
        self
    }

    /// Add a field, replacing any field of the same name and level
    pub fn register(&mut self, field: FieldInfo) {
        self.fields
            .insert((field.association, field.name.clone()), field);
    }

    /// Look up a field by name at an entity level
    #[must_use]
    pub fn get(&self, name: &str, association: Association) -> Option<&FieldInfo> {
        self.fields.get(&(association, name.to_string()))
    }

    /// Number of registered fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
