use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use targeting_criteria::{
    Association, CompileScope, Compiler, Criteria, FieldCatalog, FlexFieldDefinition,
    FlexFieldRegistry, Household, HouseholdStore, InMemoryStore, Individual, Predicate,
    Result, TargetingConfig, ValueType,
};

/// Program the flexible test fields belong to
pub const PROGRAM: &str = "cash-2024";

/// Seed for generated households
pub const SEED: u64 = 0x7a26_e7ed;

/// Fixed date all age comparisons are computed against
#[must_use]
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

/// Compile scope at the reference date, inside the test program
#[must_use]
pub fn scope() -> CompileScope {
    CompileScope::new(reference_date()).with_program(PROGRAM)
}

/// Standard core fields plus a few flexible ones
#[must_use]
pub fn catalog() -> FieldCatalog {
    let flex = FlexFieldRegistry::new()
        .with_definition(FlexFieldDefinition::new(
            "assistance_type",
            ValueType::SelectMany,
            Association::Household,
        ))
        .with_definition(
            FlexFieldDefinition::new("water_source", ValueType::SelectOne, Association::Household)
                .for_program(PROGRAM),
        )
        .with_definition(
            FlexFieldDefinition::new("food_score", ValueType::Decimal, Association::Household)
                .for_program(PROGRAM)
                .periodic(3),
        )
        .with_definition(FlexFieldDefinition::new(
            "school_enrolled",
            ValueType::Boolean,
            Association::Individual,
        ));
    FieldCatalog::standard().with_flex_fields(flex)
}

/// Compile `criteria` with the default configuration
pub fn compile(criteria: &Criteria) -> Result<Predicate> {
    compile_with(criteria, &TargetingConfig::default())
}

/// Compile `criteria` with an explicit configuration
pub fn compile_with(criteria: &Criteria, config: &TargetingConfig) -> Result<Predicate> {
    let catalog = catalog();
    let compiler = Compiler::new(&catalog, config, scope());
    Ok(compiler.compile(criteria)?)
}

/// Compile and run `criteria`, returning the selected household IDs sorted
pub fn select(store: &InMemoryStore, criteria: &Criteria) -> Result<Vec<String>> {
    let predicate = compile(criteria)?;
    select_predicate(store, &predicate)
}

/// Run a compiled predicate, returning the selected household IDs sorted
pub fn select_predicate(store: &InMemoryStore, predicate: &Predicate) -> Result<Vec<String>> {
    let mut ids: Vec<String> = store
        .select(predicate)?
        .into_iter()
        .map(|household| household.unicef_id.clone())
        .collect();
    ids.sort();
    Ok(ids)
}

/// Birth date of someone who turns `age` on `days_after` days past the
/// reference date (negative values: had the birthday that many days ago)
#[must_use]
pub fn born_aged(age: u32, days_after: i64) -> NaiveDate {
    let birthday = reference_date()
        .checked_sub_months(chrono::Months::new(age * 12))
        .expect("valid date");
    birthday + chrono::Duration::days(days_after)
}

/// Household with a head of household of the given age
pub fn add_household(store: &mut InMemoryStore, household: Household, head_age: u32) {
    let id = household.unicef_id.clone();
    store.add_household(household).expect("unique household");
    store
        .add_individual(
            Individual::new(format!("IND-{}-1", id.trim_start_matches("HH-")))
                .member_of(&id)
                .with_relationship("HEAD")
                .born(born_aged(head_age, -10)),
        )
        .expect("unique individual");
}

/// Store with `count` generated households of varied size and status
#[must_use]
pub fn generated_store(count: usize) -> InMemoryStore {
    let mut rng = StdRng::seed_from_u64(SEED);
    let statuses = ["REFUGEE", "IDP", "HOST", "RETURNEE"];
    let mut store = InMemoryStore::new();

    for n in 0..count {
        let status = statuses[rng.random_range(0..statuses.len())];
        let mut household = Household::new(format!("HH-{n}"))
            .with_size(rng.random_range(1..=8))
            .with_attribute("residence_status", json!(status))
            .with_attribute("total_cash_received", json!(rng.random_range(0.0..500.0)));
        if rng.random_bool(0.1) {
            household = household.withdrawn();
        }
        let head_age = rng.random_range(15..=80);
        add_household(&mut store, household, head_age);
    }
    store
}
