//! Integration tests for the compiler: identity memoization, interpreter
//! parity, fallback handling, and cache hygiene.

mod common;

use common::{account_schema, init_logging, sample_account};
use datashape::{
    CompiledValidator, Refined, UnknownKeys, ValidationRuntime, array, boolean, discriminated_union,
    intersection, literal, number, object, object_with, record, string, tuple, union,
};
use serde_json::json;

#[test]
fn compiling_the_same_descriptor_returns_the_same_closure() {
    init_logging();
    let runtime = ValidationRuntime::new();
    let schema = account_schema();

    let first = runtime.compile(&schema);
    let second = runtime.compile(&schema);
    assert!(CompiledValidator::same_validator(&first, &second));
}

#[test]
fn clones_of_a_descriptor_share_a_compiled_closure() {
    let runtime = ValidationRuntime::new();
    let schema = string();
    let clone = schema.clone();

    let first = runtime.compile(&schema);
    let second = runtime.compile(&clone);
    assert!(CompiledValidator::same_validator(&first, &second));
}

#[test]
fn structurally_equal_descriptors_compile_separately() {
    let runtime = ValidationRuntime::new();
    let first = runtime.compile(&string());
    let second = runtime.compile(&string());
    assert!(!CompiledValidator::same_validator(&first, &second));
}

#[test]
fn compiled_validator_matches_interpreter_on_success() {
    let runtime = ValidationRuntime::new();
    let schema = account_schema();
    let validator = runtime.compile(&schema);
    let input = sample_account();

    assert_eq!(validator.validate(&input), schema.parse(&input));
}

#[test]
fn compiled_validator_matches_interpreter_on_failure() {
    let runtime = ValidationRuntime::new();
    let schema = account_schema();
    let validator = runtime.compile(&schema);
    let input = json!({
        "userName": "ab",
        "active": "yes",
        "emails": [{"value": 1}],
        "externalId": true
    });

    assert_eq!(validator.validate(&input), schema.parse(&input));
}

#[test]
fn compiled_strict_and_passthrough_policies_match_interpreter() {
    let runtime = ValidationRuntime::new();
    let input = json!({"name": "a", "extra": 1});

    for policy in [UnknownKeys::Strip, UnknownKeys::Passthrough, UnknownKeys::Strict] {
        let schema = object_with([("name", string())], policy);
        let validator = runtime.compile(&schema);
        assert_eq!(validator.validate(&input), schema.parse(&input));
    }
}

#[test]
fn compiled_union_and_intersection_match_interpreter() {
    let runtime = ValidationRuntime::new();

    let choice = union([string(), number(), boolean()]);
    let compiled_choice = runtime.compile(&choice);
    for input in [json!("x"), json!(1), json!(true), json!([1])] {
        assert_eq!(compiled_choice.validate(&input), choice.parse(&input));
    }

    let both = intersection([object([("a", number())]), object([("b", string())])]);
    let compiled_both = runtime.compile(&both);
    for input in [
        json!({"a": 1, "b": "x"}),
        json!({"a": "bad", "b": 2}),
        json!(7),
    ] {
        assert_eq!(compiled_both.validate(&input), both.parse(&input));
    }
}

#[test]
fn literal_and_array_fast_paths_match_interpreter() {
    let runtime = ValidationRuntime::new();

    let tag = literal("v1");
    let compiled_tag = runtime.compile(&tag);
    assert_eq!(compiled_tag.validate(&json!("v1")), tag.parse(&json!("v1")));
    assert_eq!(compiled_tag.validate(&json!("v2")), tag.parse(&json!("v2")));

    let numbers = array(number());
    let compiled_numbers = runtime.compile(&numbers);
    assert_eq!(
        compiled_numbers.validate(&json!([1, "2", 3])),
        numbers.parse(&json!([1, "2", 3]))
    );
}

#[test]
fn wrapper_kinds_fall_back_to_the_descriptor_parse() {
    let runtime = ValidationRuntime::new();
    let schema = number().refine(|value| {
        if value.as_f64().unwrap_or(0.0) >= 0.0 {
            Refined::Pass
        } else {
            Refined::Fail
        }
    });
    let validator = runtime.compile(&schema);

    // The refinement survives compilation: fallback delegates to parse.
    assert!(validator.validate(&json!(1)).is_ok());
    assert!(validator.validate(&json!(-1)).is_err());
}

#[test]
fn fallback_closures_are_cached_by_identity_too() {
    let runtime = ValidationRuntime::new();
    let tuple_schema = tuple([string(), number()]);
    let record_schema = record(boolean());
    let tagged = discriminated_union("t", [("a", object([("t", literal("a"))]))]);

    for schema in [&tuple_schema, &record_schema, &tagged] {
        let first = runtime.compile(schema);
        let second = runtime.compile(schema);
        assert!(CompiledValidator::same_validator(&first, &second));
        assert_eq!(
            first.validate(&json!({"t": "a"})),
            schema.parse(&json!({"t": "a"}))
        );
    }
}

#[test]
fn child_closures_are_shared_across_repeat_compilations() {
    let runtime = ValidationRuntime::new();
    let item = string();
    let list = array(item.clone());

    // Compiling the child first and the composite afterwards reuses the
    // child's closure.
    let child = runtime.compile(&item);
    let _list_validator = runtime.compile(&list);
    let child_again = runtime.compile(&item);
    assert!(CompiledValidator::same_validator(&child, &child_again));
}

#[test]
fn clear_compiler_cache_is_idempotent_and_recompiles() {
    let runtime = ValidationRuntime::new();
    let schema = string();

    let before = runtime.compile(&schema);
    assert!(runtime.compiler_cache_size() >= 1);

    runtime.clear_compiler_cache();
    runtime.clear_compiler_cache();
    assert_eq!(runtime.compiler_cache_size(), 0);

    let after = runtime.compile(&schema);
    assert!(!CompiledValidator::same_validator(&before, &after));
    // Both closures remain fully usable.
    assert!(before.validate(&json!("x")).is_ok());
    assert!(after.validate(&json!("x")).is_ok());
}

#[test]
fn cache_entries_die_with_their_validators() {
    let runtime = ValidationRuntime::new();
    let schema = account_schema();

    let validator = runtime.compile(&schema);
    assert!(runtime.compiler_cache_size() >= 1);

    drop(validator);
    // The cache holds weak references only; dropping every handle releases
    // the associations.
    assert_eq!(runtime.compiler_cache_size(), 0);
}

#[test]
fn compiled_validator_reports_its_source_schema() {
    let runtime = ValidationRuntime::new();
    let schema = string();
    let validator = runtime.compile(&schema);
    assert!(datashape::Schema::same_schema(validator.schema(), &schema));
}
