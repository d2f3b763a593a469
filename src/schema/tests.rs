//! Tests for schema construction, combinators, and the interpreter.
//!
//! Covers primitive constraints, the unknown-keys policies, collect-all
//! issue aggregation with exact paths, and the wrapper combinators.

use super::build::*;
use super::extend::{merge, omit, partial, pick, required};
use super::types::{NumberConfig, Refined, Schema, Shape, StringConfig, UnknownKeys};
use crate::issue::{Issue, PathSegment, code};
use regex::Regex;
use serde_json::{Value, json};

fn shape_of(entries: Vec<(&str, Schema)>) -> Shape {
    entries
        .into_iter()
        .map(|(key, schema)| (key.to_string(), schema))
        .collect()
}

#[test]
fn string_accepts_strings() {
    assert_eq!(string().parse(&json!("hello")), Ok(json!("hello")));
}

#[test]
fn string_rejects_other_types() {
    let error = string().parse(&json!(42)).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(error.issues[0].code.as_deref(), Some(code::INVALID_TYPE));
    assert_eq!(error.issues[0].expected.as_deref(), Some("string"));
    assert_eq!(error.issues[0].received.as_deref(), Some("integer"));
}

#[test]
fn string_length_bounds() {
    let schema = string_with(StringConfig {
        min: Some(2),
        max: Some(4),
        ..StringConfig::default()
    });
    assert!(schema.parse(&json!("ab")).is_ok());
    assert!(schema.parse(&json!("abcd")).is_ok());

    let too_short = schema.parse(&json!("a")).unwrap_err();
    assert_eq!(too_short.issues[0].code.as_deref(), Some(code::TOO_SMALL));
    assert_eq!(too_short.issues[0].minimum, Some(2.0));

    let too_long = schema.parse(&json!("abcde")).unwrap_err();
    assert_eq!(too_long.issues[0].code.as_deref(), Some(code::TOO_BIG));
    assert_eq!(too_long.issues[0].maximum, Some(4.0));
}

#[test]
fn string_pattern_constraint() {
    let schema = string_with(StringConfig {
        pattern: Some(Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid pattern")),
        ..StringConfig::default()
    });
    assert!(schema.parse(&json!("2024-01-01")).is_ok());

    let error = schema.parse(&json!("yesterday")).unwrap_err();
    assert_eq!(error.issues[0].code.as_deref(), Some(code::INVALID_STRING));
    assert_eq!(
        error.issues[0].pattern.as_deref(),
        Some(r"^\d{4}-\d{2}-\d{2}$")
    );
}

#[test]
fn string_custom_type_message() {
    let schema = string_with(StringConfig {
        message: Some("userName must be text".to_string()),
        ..StringConfig::default()
    });
    let error = schema.parse(&json!(false)).unwrap_err();
    assert_eq!(error.issues[0].message, "userName must be text");
}

#[test]
fn number_bounds_and_integrality() {
    let schema = number_with(NumberConfig {
        min: Some(0.0),
        max: Some(10.0),
        integer: true,
        ..NumberConfig::default()
    });
    assert!(schema.parse(&json!(5)).is_ok());

    let fractional = schema.parse(&json!(2.5)).unwrap_err();
    assert_eq!(fractional.issues[0].message, "Expected an integer");

    let below = schema.parse(&json!(-1)).unwrap_err();
    assert_eq!(below.issues[0].code.as_deref(), Some(code::TOO_SMALL));

    let above = schema.parse(&json!(11)).unwrap_err();
    assert_eq!(above.issues[0].code.as_deref(), Some(code::TOO_BIG));
    assert_eq!(above.issues[0].maximum, Some(10.0));
}

#[test]
fn boolean_rejects_strings() {
    assert!(boolean().parse(&json!(true)).is_ok());
    assert!(boolean().parse(&json!("true")).is_err());
}

#[test]
fn literal_matches_exactly() {
    let schema = literal("active");
    assert_eq!(schema.parse(&json!("active")), Ok(json!("active")));

    let error = schema.parse(&json!("inactive")).unwrap_err();
    assert_eq!(error.issues[0].code.as_deref(), Some(code::INVALID_LITERAL));
}

#[test]
fn object_strip_drops_unknown_keys() {
    let schema = object([("name", string())]);
    let parsed = schema.parse(&json!({"name": "a", "extra": 1}));
    assert_eq!(parsed, Ok(json!({"name": "a"})));
}

#[test]
fn object_passthrough_copies_unknown_keys() {
    let schema = object_with([("name", string())], UnknownKeys::Passthrough);
    let parsed = schema.parse(&json!({"name": "a", "extra": 1}));
    assert_eq!(parsed, Ok(json!({"name": "a", "extra": 1})));
}

#[test]
fn object_strict_reports_unknown_keys() {
    let schema = object_with([("name", string())], UnknownKeys::Strict);
    let error = schema
        .parse(&json!({"name": "a", "extra": 1, "more": 2}))
        .unwrap_err();

    let unknown: Vec<&Issue> = error
        .issues
        .iter()
        .filter(|issue| issue.code.as_deref() == Some(code::UNRECOGNIZED_KEY))
        .collect();
    assert_eq!(unknown.len(), 2);
    assert!(unknown.iter().any(|issue| issue.path == vec![PathSegment::Key("extra".into())]));
}

#[test]
fn object_rejects_non_objects() {
    let schema = object([("name", string())]);
    assert!(schema.parse(&json!("not an object")).is_err());
    assert!(schema.parse(&json!(null)).is_err());
}

#[test]
fn object_collects_every_field_issue() {
    let schema = object([("name", string()), ("age", number()), ("on", boolean())]);
    let error = schema
        .parse(&json!({"name": 1, "age": "old", "on": true}))
        .unwrap_err();

    assert_eq!(error.issues.len(), 2);
    assert!(error.issues.iter().any(|issue| issue.path == vec![PathSegment::Key("name".into())]));
    assert!(error.issues.iter().any(|issue| issue.path == vec![PathSegment::Key("age".into())]));
}

#[test]
fn missing_required_field_reports_nothing_received() {
    let schema = object([("name", string())]);
    let error = schema.parse(&json!({})).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(error.issues[0].received.as_deref(), Some("nothing"));
    assert_eq!(error.issues[0].path, vec![PathSegment::Key("name".into())]);
}

#[test]
fn nested_issue_paths_reflect_true_depth() {
    let schema = object([(
        "profile",
        object([("emails", array(object([("value", string())])))]),
    )]);
    let input = json!({
        "profile": {"emails": [{"value": "a@b.c"}, {"value": 7}]}
    });
    let error = schema.parse(&input).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(
        error.issues[0].path,
        vec![
            PathSegment::Key("profile".into()),
            PathSegment::Key("emails".into()),
            PathSegment::Index(1),
            PathSegment::Key("value".into()),
        ]
    );
}

#[test]
fn array_reports_one_issue_per_bad_element() {
    let schema = array(number());
    let error = schema.parse(&json!([1, "2", 3])).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(error.issues[0].path, vec![PathSegment::Index(1)]);
}

#[test]
fn array_rejects_non_arrays() {
    let error = array(number()).parse(&json!({"0": 1})).unwrap_err();
    assert_eq!(error.issues[0].expected.as_deref(), Some("array"));
}

#[test]
fn union_returns_first_success_in_declaration_order() {
    // Both members accept the input; the first syntactically valid branch
    // wins, not the best match.
    let schema = union([
        object_with([("a", number())], UnknownKeys::Passthrough),
        object([("b", number())]),
    ]);
    let parsed = schema.parse(&json!({"a": 1, "b": 2}));
    assert_eq!(parsed, Ok(json!({"a": 1, "b": 2})));
}

#[test]
fn union_failure_aggregates_member_issues() {
    let schema = union([string(), number()]);
    let error = schema.parse(&json!(true)).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(error.issues[0].code.as_deref(), Some(code::INVALID_UNION));
    assert_eq!(error.issues[0].union_issues.len(), 2);
}

#[test]
fn intersection_merges_member_outputs() {
    let schema = intersection([
        object([("a", number())]),
        object([("b", string())]),
    ]);
    let parsed = schema.parse(&json!({"a": 1, "b": "x", "c": true}));
    assert_eq!(parsed, Ok(json!({"a": 1, "b": "x"})));
}

#[test]
fn intersection_members_see_the_same_raw_input() {
    // The second member validates the raw input, not the first member's
    // stripped output.
    let schema = intersection([
        object([("a", number())]),
        object([("b", string())]),
    ]);
    assert!(schema.parse(&json!({"a": 1, "b": "x"})).is_ok());
}

#[test]
fn intersection_aggregates_issues_from_every_failing_member() {
    let schema = intersection([
        object([("a", number())]),
        object([("b", string())]),
    ]);
    let error = schema.parse(&json!({"a": "bad", "b": 2})).unwrap_err();
    assert_eq!(error.issues.len(), 2);
}

#[test]
fn intersection_rejects_non_object_input() {
    let schema = intersection([object([("a", number())])]);
    let error = schema.parse(&json!([1])).unwrap_err();
    assert_eq!(
        error.issues[0].message,
        "Expected an object for intersection, but received array"
    );
}

#[test]
fn tuple_checks_arity_before_elements() {
    let schema = tuple([string(), number()]);
    let error = schema.parse(&json!(["a", 1, true])).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(error.issues[0].code.as_deref(), Some(code::INVALID_ARITY));
}

#[test]
fn tuple_validates_by_position() {
    let schema = tuple([string(), number()]);
    assert_eq!(schema.parse(&json!(["a", 1])), Ok(json!(["a", 1])));

    let error = schema.parse(&json!([1, "a"])).unwrap_err();
    assert_eq!(error.issues.len(), 2);
    assert_eq!(error.issues[0].path, vec![PathSegment::Index(0)]);
    assert_eq!(error.issues[1].path, vec![PathSegment::Index(1)]);
}

#[test]
fn record_validates_every_value() {
    let schema = record(number());
    assert_eq!(
        schema.parse(&json!({"a": 1, "b": 2})),
        Ok(json!({"a": 1, "b": 2}))
    );

    let error = schema.parse(&json!({"a": 1, "b": "x"})).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(error.issues[0].path, vec![PathSegment::Key("b".into())]);
}

#[test]
fn discriminated_union_dispatches_on_tag() {
    let schema = discriminated_union(
        "type",
        [
            ("click", object([("type", literal("click")), ("x", number())])),
            ("key", object([("type", literal("key")), ("code", number())])),
        ],
    );
    assert!(schema.parse(&json!({"type": "click", "x": 1})).is_ok());

    // Only the matching variant runs: a key event with a bad "x" field is
    // fine because the click variant is never consulted.
    assert!(schema.parse(&json!({"type": "key", "code": 13, "x": "ignored"})).is_ok());
}

#[test]
fn discriminated_union_missing_tag_has_dedicated_code() {
    let schema = discriminated_union("type", [("a", object([("type", literal("a"))]))]);
    let error = schema.parse(&json!({"x": 1})).unwrap_err();
    assert_eq!(
        error.issues[0].code.as_deref(),
        Some(code::INVALID_DISCRIMINATOR)
    );
    assert_eq!(error.issues[0].path, vec![PathSegment::Key("type".into())]);
}

#[test]
fn discriminated_union_unknown_tag_has_dedicated_code() {
    let schema = discriminated_union("type", [("a", object([("type", literal("a"))]))]);
    let error = schema.parse(&json!({"type": "b"})).unwrap_err();
    assert_eq!(
        error.issues[0].code.as_deref(),
        Some(code::INVALID_DISCRIMINATOR)
    );
    assert_eq!(error.issues[0].received.as_deref(), Some("b"));
}

#[test]
fn optional_accepts_absence_but_not_null() {
    let schema = string().optional();
    assert_eq!(schema.parse_opt(None), Ok(None));
    assert!(schema.parse_opt(Some(&json!(null))).is_err());
    assert_eq!(schema.parse_opt(Some(&json!("x"))), Ok(Some(json!("x"))));
}

#[test]
fn optional_field_is_omitted_from_object_output() {
    let schema = object([("name", string()), ("age", number().optional())]);
    assert_eq!(
        schema.parse(&json!({"name": "a"})),
        Ok(json!({"name": "a"}))
    );
}

#[test]
fn default_substitutes_for_absent_and_null() {
    let schema = object([("role", string().default_value("user"))]);
    assert_eq!(schema.parse(&json!({})), Ok(json!({"role": "user"})));
    assert_eq!(
        schema.parse(&json!({"role": null})),
        Ok(json!({"role": "user"}))
    );
    assert_eq!(
        schema.parse(&json!({"role": "admin"})),
        Ok(json!({"role": "admin"}))
    );
}

#[test]
fn default_factory_is_reevaluated_per_call() {
    let schema = array(number()).default_with(|| json!([]));
    let first = schema.parse(&json!(null)).expect("default applies");
    let second = schema.parse(&json!(null)).expect("default applies");
    assert_eq!(first, json!([]));
    assert_eq!(second, json!([]));
}

#[test]
fn transform_applies_on_success() {
    let schema = string().transform(|value| {
        let text = value.as_str().unwrap_or_default().to_uppercase();
        Ok(Value::String(text))
    });
    assert_eq!(schema.parse(&json!("ada")), Ok(json!("ADA")));
}

#[test]
fn transform_error_becomes_a_single_issue() {
    let schema = number().transform(|_| Err("cannot derive label".into()));
    let error = schema.parse(&json!(1)).unwrap_err();
    assert_eq!(error.issues.len(), 1);
    assert_eq!(error.issues[0].message, "cannot derive label");
}

#[test]
fn transform_passes_failures_through_untouched() {
    let schema = number().transform(|value| Ok(value));
    let error = schema.parse(&json!("nan")).unwrap_err();
    assert_eq!(error.issues[0].code.as_deref(), Some(code::INVALID_TYPE));
}

#[test]
fn refine_outcomes_map_to_issues() {
    let fail = number().refine(|_| Refined::Fail);
    assert_eq!(
        fail.parse(&json!(1)).unwrap_err().issues[0].message,
        "Refinement failed"
    );

    let message = number().refine(|_| Refined::Message("must be even".into()));
    assert_eq!(
        message.parse(&json!(1)).unwrap_err().issues[0].message,
        "must be even"
    );

    let verbatim = number().refine(|_| {
        Refined::Issues(vec![Issue::new("first"), Issue::new("second")])
    });
    assert_eq!(verbatim.parse(&json!(1)).unwrap_err().issues.len(), 2);
}

#[test]
fn refine_pass_keeps_success() {
    let schema = number().refine(|value| {
        if value.as_f64().unwrap_or(1.0) % 2.0 == 0.0 {
            Refined::Pass
        } else {
            Refined::Fail
        }
    });
    assert!(schema.parse(&json!(4)).is_ok());
    assert!(schema.parse(&json!(3)).is_err());
}

#[test]
fn refine_runs_only_after_successful_parse() {
    let schema = string().refine(|_| Refined::Fail);
    let error = schema.parse(&json!(1)).unwrap_err();
    // The type issue surfaces, not the refinement.
    assert_eq!(error.issues[0].code.as_deref(), Some(code::INVALID_TYPE));
}

#[test]
fn metadata_combinators_have_no_behavioral_effect() {
    let plain = string();
    let decorated = plain
        .describe("a person's name")
        .examples([json!("Ada")])
        .rename("personName");

    assert_eq!(decorated.meta().description.as_deref(), Some("a person's name"));
    assert_eq!(decorated.meta().name.as_deref(), Some("personName"));
    assert_eq!(decorated.parse(&json!("x")), plain.parse(&json!("x")));
    assert_eq!(
        decorated.parse(&json!(1)).unwrap_err(),
        plain.parse(&json!(1)).unwrap_err()
    );
}

#[test]
fn combinators_never_mutate_the_original() {
    let base = string();
    let _wrapped = base.optional().refine(|_| Refined::Fail);
    // The original still rejects absence and accepts plain strings.
    assert!(base.parse_opt(None).is_err());
    assert!(base.parse(&json!("x")).is_ok());
}

#[test]
fn lazy_supports_self_referential_schemas() {
    fn tree() -> Schema {
        object([
            ("value", number()),
            ("children", array(lazy(tree)).optional()),
        ])
    }

    let schema = tree();
    let input = json!({
        "value": 1,
        "children": [
            {"value": 2},
            {"value": 3, "children": [{"value": 4}]}
        ]
    });
    assert!(schema.parse(&input).is_ok());

    let bad = json!({"value": 1, "children": [{"value": "x"}]});
    let error = schema.parse(&bad).unwrap_err();
    assert_eq!(
        error.issues[0].path,
        vec![
            PathSegment::Key("children".into()),
            PathSegment::Index(0),
            PathSegment::Key("value".into()),
        ]
    );
}

#[test]
fn conditional_selects_schema_per_input() {
    let schema = conditional(|input| {
        if input.is_string() {
            Some(string())
        } else if input.is_number() {
            Some(number())
        } else {
            None
        }
    });
    assert!(schema.parse(&json!("x")).is_ok());
    assert!(schema.parse(&json!(1)).is_ok());

    let error = schema.parse(&json!(true)).unwrap_err();
    assert_eq!(error.issues[0].message, "No matching schema for condition");
}

#[test]
fn conditional_with_custom_message() {
    let schema = conditional_with(|_| None, "unsupported payload");
    let error = schema.parse(&json!(1)).unwrap_err();
    assert_eq!(error.issues[0].message, "unsupported payload");
}

#[test]
fn custom_schema_uses_caller_parser() {
    let schema = custom("even", |value| match value.as_i64() {
        Some(n) if n % 2 == 0 => Ok(value.clone()),
        _ => Err(vec![Issue::new("expected an even integer")]),
    });
    assert!(schema.parse(&json!(2)).is_ok());
    assert!(schema.parse(&json!(3)).is_err());
    assert_eq!(schema.kind_name(), "even");
}

#[test]
fn merge_combines_shapes_with_second_winning() {
    let first = shape_of(vec![("a", number()), ("shared", number())]);
    let second = shape_of(vec![("b", string()), ("shared", string())]);
    let schema = merge(&first, &second);

    assert!(schema.parse(&json!({"a": 1, "b": "x", "shared": "s"})).is_ok());
    assert!(schema.parse(&json!({"a": 1, "b": "x", "shared": 2})).is_err());
}

#[test]
fn pick_keeps_only_named_keys() {
    let shape = shape_of(vec![("a", number()), ("b", string()), ("c", boolean())]);
    let schema = pick(&shape, &["a", "c"]);
    assert_eq!(
        schema.parse(&json!({"a": 1, "b": "x", "c": true})),
        Ok(json!({"a": 1, "c": true}))
    );
}

#[test]
fn omit_drops_named_keys() {
    let shape = shape_of(vec![("a", number()), ("b", string())]);
    let schema = omit(&shape, &["b"]);
    assert_eq!(schema.parse(&json!({"a": 1})), Ok(json!({"a": 1})));
}

#[test]
fn partial_makes_every_field_optional() {
    let shape = shape_of(vec![("a", number()), ("b", string())]);
    let schema = partial(&shape);
    assert_eq!(schema.parse(&json!({})), Ok(json!({})));
    assert!(schema.parse(&json!({"a": "bad"})).is_err());
}

#[test]
fn required_strips_optional_wrappers() {
    let shape = shape_of(vec![("a", number().optional()), ("b", string())]);
    let schema = required(&shape);
    let error = schema.parse(&json!({"b": "x"})).unwrap_err();
    assert_eq!(error.issues[0].path, vec![PathSegment::Key("a".into())]);
}

#[test]
fn schema_clones_share_identity() {
    let schema = string();
    let clone = schema.clone();
    assert!(Schema::same_schema(&schema, &clone));
    assert!(!Schema::same_schema(&schema, &string()));
}
