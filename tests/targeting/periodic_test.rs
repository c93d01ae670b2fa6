use serde_json::{Value, json};

use targeting_criteria::{
    Association, Comparator, ComparisonMethod, CompileError, CompileScope, Compiler, Criteria,
    Household, InMemoryStore, Predicate, Rule, TargetingConfig,
};

use crate::utils::{catalog, reference_date, scope, select};

fn evaluate_in(scope: CompileScope, comparator: &Comparator) -> Result<Predicate, CompileError> {
    let catalog = catalog();
    let config = TargetingConfig::default();
    let compiler = Compiler::new(&catalog, &config, scope);
    comparator.evaluate(&compiler, Association::Household)
}

fn food_score(round: Option<u32>, method: ComparisonMethod, arguments: Vec<Value>) -> Comparator {
    Comparator::periodic("food_score", round, method, arguments)
}

/// Rounds are one-based and bounded by the declared round count
#[test]
fn test_round_validation() {
    let err = evaluate_in(scope(), &food_score(None, ComparisonMethod::Equals, vec![json!(1)])).unwrap_err();
    assert_eq!(err, CompileError::MissingRoundNumber { field: "food_score".to_string() });

    for round in [0, 4] {
        let err = evaluate_in(scope(), &food_score(Some(round), ComparisonMethod::Equals, vec![json!(1)]))
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::RoundOutOfRange {
                field: "food_score".to_string(),
                round,
                rounds: 3,
            }
        );
    }

    assert!(evaluate_in(scope(), &food_score(Some(3), ComparisonMethod::Equals, vec![json!(1)])).is_ok());
}

/// Periodic fields only resolve inside their program
#[test]
fn test_periodic_field_requires_program() {
    let comparator = food_score(Some(1), ComparisonMethod::Equals, vec![json!(1)]);
    let err = evaluate_in(CompileScope::new(reference_date()), &comparator).unwrap_err();
    assert!(matches!(err, CompileError::UnknownField { .. }));

    let err = evaluate_in(CompileScope::new(reference_date()).with_program("other"), &comparator)
        .unwrap_err();
    assert!(matches!(err, CompileError::UnknownField { .. }));
}

/// Every method but IS_NULL carries a "has a value" guard
#[test]
fn test_periodic_null_guard_shape() {
    let predicate = evaluate_in(
        scope(),
        &food_score(Some(2), ComparisonMethod::NotEquals, vec![json!(7)]),
    )
    .expect("compiles");
    assert_eq!(
        predicate.to_string(),
        "(NOT flex_fields__food_score__2__value=7 AND flex_fields__food_score__2__value__isnull=false)"
    );

    let predicate = evaluate_in(
        scope(),
        &food_score(Some(2), ComparisonMethod::IsNull, vec![json!(true)]),
    )
    .expect("compiles");
    assert_eq!(predicate.to_string(), "flex_fields__food_score__2__value__isnull=true");
}

/// A null argument on a periodic field is kept as null
#[test]
fn test_periodic_null_argument_is_not_coerced() {
    let predicate = evaluate_in(
        scope(),
        &food_score(Some(1), ComparisonMethod::Equals, vec![Value::Null]),
    )
    .expect("compiles");
    assert_eq!(
        predicate.to_string(),
        "(flex_fields__food_score__1__value=null AND flex_fields__food_score__1__value__isnull=false)"
    );
}

/// Households without a value for the round never satisfy a comparison
#[test]
fn test_missing_round_never_matches() {
    let mut store = InMemoryStore::new();
    store
        .add_household(Household::new("HH-1").with_size(2).with_round_value("food_score", 1, json!(4.0)))
        .expect("unique");
    store
        .add_household(Household::new("HH-2").with_size(2).with_round_value("food_score", 2, json!(4.0)))
        .expect("unique");
    store
        .add_household(Household::new("HH-3").with_size(2).with_round_value("food_score", 1, Value::Null))
        .expect("unique");
    store.add_household(Household::new("HH-4").with_size(2)).expect("unique");

    let criteria = |method, arguments| {
        Criteria::new(vec![Rule::new(vec![food_score(Some(1), method, arguments)])])
    };

    let not_equals = criteria(ComparisonMethod::NotEquals, vec![json!(9)]);
    assert_eq!(select(&store, &not_equals).expect("runs"), ["HH-1"]);

    let below = criteria(ComparisonMethod::LessThan, vec![json!(5)]);
    assert_eq!(select(&store, &below).expect("runs"), ["HH-1"]);

    let outside = criteria(ComparisonMethod::NotInRange, vec![json!(10), json!(20)]);
    assert_eq!(select(&store, &outside).expect("runs"), ["HH-1"]);

    let missing = criteria(ComparisonMethod::IsNull, vec![json!(true)]);
    assert_eq!(select(&store, &missing).expect("runs"), ["HH-2", "HH-3", "HH-4"]);
}
