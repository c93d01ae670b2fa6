use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use targeting_criteria::{
    AdjudicationTicket, Association, CollectorRole, Comparator, ComparisonMethod, Compiler, Criteria,
    EmptyCriteriaPolicy, FilterBlock, Household, HouseholdStore, InMemoryStore, Individual,
    IndividualFilterBlock, Predicate, Rule, TargetingConfig, TicketStatus,
};

use crate::utils::{
    SEED, add_household, born_aged, catalog, compile_with, generated_store, scope, select,
    select_predicate,
};

fn size_rule(method: ComparisonMethod, arguments: Vec<serde_json::Value>) -> Criteria {
    Criteria::new(vec![Rule::new(vec![Comparator::new("size", method, arguments)])])
}

fn active_households(store: &InMemoryStore) -> Vec<String> {
    let mut ids: Vec<String> = store
        .households()
        .iter()
        .filter(|household| !household.withdrawn)
        .map(|household| household.unicef_id.clone())
        .collect();
    ids.sort();
    ids
}

/// Empty blocks are the identity of AND
#[test]
fn test_empty_block_matches_everything() {
    let store = generated_store(50);
    let catalog = catalog();
    let config = TargetingConfig::default();
    let compiler = Compiler::new(&catalog, &config, scope());

    let household_block = FilterBlock::default()
        .evaluate(&compiler, Association::Household)
        .expect("compiles");
    let individual_block = IndividualFilterBlock::default()
        .heads_only()
        .evaluate(&compiler)
        .expect("compiles");

    for predicate in [household_block, individual_block] {
        assert_eq!(predicate, Predicate::AlwaysTrue);
        assert_eq!(store.select(&predicate).expect("runs").len(), 50);
    }

    // an empty rule only keeps the base filter
    let criteria = Criteria::new(vec![Rule::default()]);
    assert_eq!(select(&store, &criteria).expect("runs"), active_households(&store));
}

/// Zero rules and no ID lists select nothing unless configured otherwise
#[test]
fn test_zero_rules_policy() {
    let store = generated_store(30);

    let predicate = compile_with(&Criteria::default(), &TargetingConfig::default()).expect("compiles");
    assert!(select_predicate(&store, &predicate).expect("runs").is_empty());

    let config = TargetingConfig {
        empty_criteria_policy: EmptyCriteriaPolicy::MatchAll,
        ..TargetingConfig::default()
    };
    let predicate = compile_with(&Criteria::default(), &config).expect("compiles");
    assert_eq!(select_predicate(&store, &predicate).expect("runs"), active_households(&store));
}

/// NOT_EQUALS selects exactly the active households EQUALS does not
#[test]
fn test_negation_is_complement() {
    let store = generated_store(120);
    let active = active_households(&store);
    let mut rng = StdRng::seed_from_u64(SEED ^ 4);

    for _ in 0..10 {
        let size = rng.random_range(1..=8);
        let equal = select(&store, &size_rule(ComparisonMethod::Equals, vec![json!(size)])).expect("runs");
        let not_equal =
            select(&store, &size_rule(ComparisonMethod::NotEquals, vec![json!(size)])).expect("runs");

        assert!(equal.iter().all(|id| !not_equal.contains(id)), "size {size}");
        let mut union = [equal, not_equal].concat();
        union.sort();
        assert_eq!(union, active, "size {size}");
    }
}

/// RANGE is inclusive at both ends
#[test]
fn test_range_is_inclusive() {
    let mut store = InMemoryStore::new();
    for size in 1..=6 {
        add_household(&mut store, Household::new(format!("HH-{size}")).with_size(size), 40);
    }
    let selected = select(&store, &size_rule(ComparisonMethod::Range, vec![json!(2), json!(5)])).expect("runs");
    assert_eq!(selected, ["HH-2", "HH-3", "HH-4", "HH-5"]);

    let outside =
        select(&store, &size_rule(ComparisonMethod::NotInRange, vec![json!(2), json!(5)])).expect("runs");
    assert_eq!(outside, ["HH-1", "HH-6"]);

    let store = generated_store(150);
    let mut rng = StdRng::seed_from_u64(SEED ^ 5);
    for _ in 0..10 {
        let low = rng.random_range(1..=8_i64);
        let high = rng.random_range(low..=8);
        let selected =
            select(&store, &size_rule(ComparisonMethod::Range, vec![json!(low), json!(high)])).expect("runs");
        let expected: Vec<String> = active_households(&store)
            .into_iter()
            .filter(|id| {
                let size = store.household(id).and_then(|household| household.size).unwrap_or(0);
                (low..=high).contains(&size)
            })
            .collect();
        assert_eq!(selected, expected, "range [{low}, {high}]");
    }
}

/// A periodic comparison never matches a missing round value
#[test]
fn test_periodic_value_must_be_recorded() {
    let mut store = InMemoryStore::new();
    store
        .add_household(Household::new("HH-1").with_round_value("food_score", 2, json!(0.0)))
        .expect("unique");
    store
        .add_household(Household::new("HH-2").with_round_value("food_score", 1, json!(0.0)))
        .expect("unique");

    // "not in [1, 10]" is vacuously true for a missing value without the guard
    let criteria = Criteria::new(vec![Rule::new(vec![Comparator::periodic(
        "food_score",
        Some(2),
        ComparisonMethod::NotInRange,
        vec![json!(1), json!(10)],
    )])]);
    assert_eq!(select(&store, &criteria).expect("runs"), ["HH-1"]);
}

/// Household and individual ID lists are ORed
#[test]
fn test_id_lists_are_ored() {
    let mut store = InMemoryStore::new();
    for id in ["HH-1", "HH-2", "HH-3", "HH-5"] {
        store.add_household(Household::new(id).with_size(1)).expect("unique");
    }
    store.add_individual(Individual::new("IND-9").member_of("HH-5")).expect("unique");
    store.add_individual(Individual::new("IND-3").member_of("HH-3")).expect("unique");

    let criteria = Criteria::default()
        .with_household_ids("HH-1, HH-2")
        .with_individual_ids("IND-9");
    assert_eq!(select(&store, &criteria).expect("runs"), ["HH-1", "HH-2", "HH-5"]);

    // the allow-list is intersected with the rules
    let criteria = size_rule(ComparisonMethod::GreaterThan, vec![json!(1)])
        .with_household_ids("HH-1, HH-2")
        .with_individual_ids("IND-9");
    assert_eq!(select(&store, &criteria).expect("runs"), ["HH-1", "HH-2", "HH-5"]);

    let criteria = size_rule(ComparisonMethod::GreaterThan, vec![json!(2)]).with_individual_ids("IND-9");
    assert!(select(&store, &criteria).expect("runs").is_empty());
}

/// The two exclusion flags act independently
#[test]
fn test_exclusion_flags_are_independent() {
    let mut store = InMemoryStore::new();
    for id in ["HH-ADJ", "HH-SAN", "HH-BOTH", "HH-NONE"] {
        store.add_household(Household::new(id).with_size(2)).expect("unique");
    }
    let ticket = || AdjudicationTicket::new("duplicate", TicketStatus::New);
    store
        .add_individual(Individual::new("IND-1").member_of("HH-ADJ").with_ticket(ticket()))
        .expect("unique");
    store
        .add_individual(Individual::new("IND-2").member_of("HH-SAN").sanctioned())
        .expect("unique");
    store
        .add_individual(Individual::new("IND-3").member_of("HH-BOTH").with_ticket(ticket()).sanctioned())
        .expect("unique");
    store.add_individual(Individual::new("IND-4").member_of("HH-NONE")).expect("unique");

    let cases = [
        (false, false, vec!["HH-ADJ", "HH-BOTH", "HH-NONE", "HH-SAN"]),
        (true, false, vec!["HH-NONE", "HH-SAN"]),
        (false, true, vec!["HH-ADJ", "HH-NONE"]),
        (true, true, vec!["HH-NONE"]),
    ];
    for (adjudication, sanction, expected) in cases {
        let criteria = size_rule(ComparisonMethod::Equals, vec![json!(2)])
            .exclude_active_adjudication(adjudication)
            .exclude_sanctioned(sanction);
        assert_eq!(
            select(&store, &criteria).expect("runs"),
            expected,
            "adjudication={adjudication} sanction={sanction}"
        );
    }
}

/// Both exclusion flags reach collectors registered in another household
#[test]
fn test_exclusion_flags_reach_foreign_collectors() {
    let mut store = InMemoryStore::new();
    store
        .add_household(
            Household::new("HH-ADJ").with_size(1).with_collector("IND-9", CollectorRole::Primary),
        )
        .expect("unique");
    store
        .add_household(
            Household::new("HH-SAN").with_size(1).with_collector("IND-8", CollectorRole::Alternate),
        )
        .expect("unique");
    store.add_household(Household::new("HH-NONE").with_size(1)).expect("unique");
    store.add_household(Household::new("HH-OTHER").with_size(2)).expect("unique");

    for (id, household) in [("IND-1", "HH-ADJ"), ("IND-2", "HH-SAN"), ("IND-3", "HH-NONE")] {
        store.add_individual(Individual::new(id).member_of(household)).expect("unique");
    }
    // flagged individuals belong to a household the rule never selects
    store
        .add_individual(
            Individual::new("IND-9")
                .member_of("HH-OTHER")
                .with_ticket(AdjudicationTicket::new("golden_record", TicketStatus::Assigned)),
        )
        .expect("unique");
    store
        .add_individual(Individual::new("IND-8").member_of("HH-OTHER").sanctioned())
        .expect("unique");

    let cases = [
        (false, false, vec!["HH-ADJ", "HH-NONE", "HH-SAN"]),
        (true, false, vec!["HH-NONE", "HH-SAN"]),
        (false, true, vec!["HH-ADJ", "HH-NONE"]),
        (true, true, vec!["HH-NONE"]),
    ];
    for (adjudication, sanction, expected) in cases {
        let criteria = size_rule(ComparisonMethod::Equals, vec![json!(1)])
            .exclude_active_adjudication(adjudication)
            .exclude_sanctioned(sanction);
        assert_eq!(
            select(&store, &criteria).expect("runs"),
            expected,
            "adjudication={adjudication} sanction={sanction}"
        );
    }
}

/// With target_only_hoh only the head of household can satisfy a block
#[test]
fn test_target_only_head_of_household() {
    let mut store = InMemoryStore::new();
    store.add_household(Household::new("HH-1").with_size(2)).expect("unique");
    store.add_household(Household::new("HH-2").with_size(1)).expect("unique");

    let members = [
        ("IND-11", "HH-1", "HEAD", "MALE"),
        ("IND-12", "HH-1", "WIFE_HUSBAND", "FEMALE"),
        ("IND-21", "HH-2", "HEAD", "FEMALE"),
    ];
    for (id, household, relationship, sex) in members {
        store
            .add_individual(
                Individual::new(id)
                    .member_of(household)
                    .with_relationship(relationship)
                    .born(born_aged(35, -30))
                    .with_attribute("sex", json!(sex)),
            )
            .expect("unique");
    }

    let female = || Comparator::new("sex", ComparisonMethod::Equals, vec![json!("FEMALE")]);
    let any_member = Criteria::new(vec![
        Rule::default().with_individual_block(IndividualFilterBlock::new(vec![female()])),
    ]);
    let heads_only = Criteria::new(vec![
        Rule::default().with_individual_block(IndividualFilterBlock::new(vec![female()]).heads_only()),
    ]);

    assert_eq!(select(&store, &any_member).expect("runs"), ["HH-1", "HH-2"]);
    assert_eq!(select(&store, &heads_only).expect("runs"), ["HH-2"]);
}
