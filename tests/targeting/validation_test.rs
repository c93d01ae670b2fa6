use serde_json::json;

use targeting_criteria::{
    Comparator, ComparisonMethod, CompileError, Compiler, Criteria, CriteriaValidator,
    IndividualFilterBlock, Rule, TargetingConfig, ValidationError,
};

use crate::utils::{catalog, scope};

fn validate(criteria: &Criteria, config: &TargetingConfig) -> Result<(), ValidationError> {
    let catalog = catalog();
    let compiler = Compiler::new(&catalog, config, scope());
    CriteriaValidator::new(&compiler).validate(criteria)
}

/// A well-formed criteria passes
#[test]
fn test_valid_criteria() {
    let criteria = Criteria::new(vec![
        Rule::new(vec![Comparator::new("size", ComparisonMethod::GreaterThan, vec![json!(2)])])
            .with_individual_block(
                IndividualFilterBlock::new(vec![Comparator::new(
                    "age",
                    ComparisonMethod::Range,
                    vec![json!(18), json!(59)],
                )])
                .heads_only(),
            ),
    ])
    .with_household_ids("HH-1")
    .with_individual_ids("IND-7");

    assert_eq!(validate(&criteria, &TargetingConfig::default()), Ok(()));
}

/// ID prefixes come from the configuration
#[test]
fn test_custom_id_prefix() {
    let config = TargetingConfig {
        household_id_prefix: "HOUSE-".to_string(),
        ..TargetingConfig::default()
    };
    let criteria = Criteria::default().with_household_ids("HOUSE-1, HH-2");

    assert_eq!(
        validate(&criteria, &config),
        Err(ValidationError::InvalidIdentifier {
            id: "HH-2".to_string(),
            expected_prefix: "HOUSE-".to_string(),
        })
    );
}

/// Compile errors surface with the index of their rule
#[test]
fn test_compile_error_is_reported_per_rule() {
    let criteria = Criteria::new(vec![Rule::new(vec![Comparator::periodic(
        "food_score",
        None,
        ComparisonMethod::Equals,
        vec![json!(1)],
    )])]);

    let err = validate(&criteria, &TargetingConfig::default()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::Compile {
            rule: 0,
            source: CompileError::MissingRoundNumber { field: "food_score".to_string() },
        }
    );
    assert_eq!(err.to_string(), "rule 0: periodic field 'food_score' requires a round number");
}
