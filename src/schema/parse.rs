//! The schema interpreter.
//!
//! [`Schema::parse`] walks the descriptor tree with a single exhaustive
//! match over [`SchemaKind`]. Absence is threaded explicitly: `Ok(None)`
//! means "omitted", which is how `optional` fields disappear from object
//! output while `default` still distinguishes absent-or-null input.
//!
//! The primitive checks at the bottom of this module are shared with the
//! compiler so the two execution tiers cannot drift apart on constraint
//! semantics.

use super::types::{
    NumberConfig, Refined, Schema, SchemaKind, Shape, StringConfig, Transformer, UnknownKeys,
};
use crate::error::{ParseOutcome, ValidationError};
use crate::issue::{Issue, PathSegment, code, prefix_issues};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Internal parse result: `Ok(None)` is an omitted (absent) value.
pub(crate) type RawOutcome = Result<Option<Value>, Vec<Issue>>;

impl Schema {
    /// Validate `input` against this schema.
    ///
    /// Returns the (possibly rewritten) output value on success, or every
    /// issue collected during the walk on failure. Validation failures are
    /// always reported this way; the engine never panics on bad input.
    ///
    /// ```
    /// use datashape::{number, object, string};
    ///
    /// let user = object([
    ///     ("name", string()),
    ///     ("age", number().optional()),
    /// ]);
    /// let parsed = user.parse(&serde_json::json!({"name": "Ada", "extra": true}));
    /// assert_eq!(parsed.unwrap(), serde_json::json!({"name": "Ada"}));
    /// ```
    pub fn parse(&self, input: &Value) -> ParseOutcome {
        match self.run(Some(input)) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(Value::Null),
            Err(issues) => Err(ValidationError::new(issues)),
        }
    }

    /// Validate a possibly absent input.
    ///
    /// `None` models a value that was never provided, as distinct from an
    /// explicit null. `Ok(None)` in the result means the output is omitted,
    /// which is how optional fields vanish from object output.
    pub fn parse_opt(&self, input: Option<&Value>) -> Result<Option<Value>, ValidationError> {
        self.run(input).map_err(ValidationError::new)
    }

    /// Validate `input`, running any async refinements on the way.
    ///
    /// Suspension happens only inside async refinement predicates; every
    /// other kind validates synchronously.
    pub fn parse_async<'a>(
        &'a self,
        input: &'a Value,
    ) -> Pin<Box<dyn Future<Output = ParseOutcome> + Send + 'a>> {
        Box::pin(async move {
            match self.run_async(Some(input)).await {
                Ok(Some(value)) => Ok(value),
                Ok(None) => Ok(Value::Null),
                Err(issues) => Err(ValidationError::new(issues)),
            }
        })
    }

    pub(crate) fn run(&self, input: Option<&Value>) -> RawOutcome {
        match &self.node.kind {
            SchemaKind::String(config) => check_string(config, input).map(Some),
            SchemaKind::Number(config) => check_number(config, input).map(Some),
            SchemaKind::Boolean => check_boolean(input).map(Some),
            SchemaKind::Literal(expected) => check_literal(expected, input).map(Some),
            SchemaKind::Object {
                shape,
                unknown_keys,
            } => run_object(shape, *unknown_keys, input).map(Some),
            SchemaKind::Array { item } => run_array(item, input).map(Some),
            SchemaKind::Tuple { items } => run_tuple(items, input).map(Some),
            SchemaKind::Record { value } => run_record(value, input).map(Some),
            SchemaKind::Union { members } => run_union(members, input),
            SchemaKind::DiscriminatedUnion { key, mapping, .. } => {
                run_discriminated(key, mapping, input)
            }
            SchemaKind::Intersection { members } => run_intersection(members, input).map(Some),
            SchemaKind::Optional { inner } => match input {
                None => Ok(None),
                Some(_) => inner.run(input),
            },
            SchemaKind::DefaultTo { inner, source } => match input {
                None | Some(Value::Null) => Ok(Some(source.produce())),
                Some(_) => inner.run(input),
            },
            SchemaKind::Transform { inner, apply } => match inner.run(input)? {
                Some(value) => apply_transform(apply, value).map(Some),
                None => Ok(None),
            },
            SchemaKind::Refine { inner, check } => match inner.run(input)? {
                Some(value) => {
                    let issues = refined_issues(check(&value));
                    if issues.is_empty() {
                        Ok(Some(value))
                    } else {
                        Err(issues)
                    }
                }
                None => Ok(None),
            },
            // The synchronous path validates everything but the async
            // predicate itself.
            SchemaKind::AsyncRefine { inner, .. } => inner.run(input),
            SchemaKind::Lazy(node) => node.force().run(input),
            SchemaKind::Conditional { choose, message } => {
                let Some(value) = input else {
                    return Err(vec![no_match_issue(message.as_deref())]);
                };
                match choose(value) {
                    Some(schema) => schema.run(input),
                    None => Err(vec![no_match_issue(message.as_deref())]),
                }
            }
            SchemaKind::Cached {
                inner,
                cache,
                key_fn,
            } => {
                let Some(value) = input else {
                    return inner.run(input);
                };
                let key = key_fn(value);
                if let Some(outcome) = cache.get(&key) {
                    return match outcome {
                        Ok(data) => Ok(Some(data)),
                        Err(error) => Err(error.issues),
                    };
                }
                let outcome = inner.run(Some(value));
                let stored: ParseOutcome = match &outcome {
                    Ok(Some(data)) => Ok(data.clone()),
                    Ok(None) => Ok(Value::Null),
                    Err(issues) => Err(ValidationError::new(issues.clone())),
                };
                cache.set(key, stored);
                outcome
            }
            SchemaKind::Custom { name, parser } => {
                let Some(value) = input else {
                    return Err(vec![
                        Issue::new(format!("Expected {name}, but received nothing"))
                            .with_code(code::INVALID_TYPE),
                    ]);
                };
                parser(value).map(Some)
            }
        }
    }

    pub(crate) fn run_async<'a>(
        &'a self,
        input: Option<&'a Value>,
    ) -> Pin<Box<dyn Future<Output = RawOutcome> + Send + 'a>> {
        Box::pin(async move {
            match &self.node.kind {
                SchemaKind::AsyncRefine { inner, check } => {
                    match inner.run_async(input).await? {
                        Some(value) => {
                            let issues = refined_issues(check(value.clone()).await);
                            if issues.is_empty() {
                                Ok(Some(value))
                            } else {
                                Err(issues)
                            }
                        }
                        None => Ok(None),
                    }
                }
                SchemaKind::Refine { inner, check } => match inner.run_async(input).await? {
                    Some(value) => {
                        let issues = refined_issues(check(&value));
                        if issues.is_empty() {
                            Ok(Some(value))
                        } else {
                            Err(issues)
                        }
                    }
                    None => Ok(None),
                },
                SchemaKind::Transform { inner, apply } => match inner.run_async(input).await? {
                    Some(value) => apply_transform(apply, value).map(Some),
                    None => Ok(None),
                },
                SchemaKind::Optional { inner } => match input {
                    None => Ok(None),
                    Some(_) => inner.run_async(input).await,
                },
                SchemaKind::DefaultTo { inner, source } => match input {
                    None | Some(Value::Null) => Ok(Some(source.produce())),
                    Some(_) => inner.run_async(input).await,
                },
                SchemaKind::Lazy(node) => node.force().run_async(input).await,
                _ => self.run(input),
            }
        })
    }
}

fn run_object(shape: &Shape, unknown_keys: UnknownKeys, input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::Object(record)) = input else {
        return Err(vec![type_issue("object", "an object", input, None)]);
    };

    let mut issues = Vec::new();
    let mut output = serde_json::Map::new();

    if unknown_keys != UnknownKeys::Strip {
        for (key, value) in record {
            if !shape.contains_key(key) {
                match unknown_keys {
                    UnknownKeys::Strict => issues.push(Issue {
                        code: Some(code::UNRECOGNIZED_KEY.to_string()),
                        message: format!("Unknown key: {key}"),
                        path: vec![PathSegment::Key(key.clone())],
                        ..Issue::default()
                    }),
                    UnknownKeys::Passthrough => {
                        output.insert(key.clone(), value.clone());
                    }
                    UnknownKeys::Strip => unreachable!(),
                }
            }
        }
    }

    // Every shape key is validated even after earlier failures; issues
    // aggregate with the key prepended to their paths.
    for (key, child) in shape {
        match child.run(record.get(key)) {
            Ok(Some(value)) => {
                output.insert(key.clone(), value);
            }
            Ok(None) => {}
            Err(child_issues) => issues.extend(prefix_issues(child_issues, key.as_str())),
        }
    }

    if issues.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(issues)
    }
}

fn run_array(item: &Schema, input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::Array(elements)) = input else {
        return Err(vec![type_issue("array", "an array", input, None)]);
    };

    let mut issues = Vec::new();
    let mut output = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        match item.run(Some(element)) {
            Ok(Some(value)) => output.push(value),
            Ok(None) => output.push(Value::Null),
            Err(element_issues) => issues.extend(prefix_issues(element_issues, index)),
        }
    }

    if issues.is_empty() {
        Ok(Value::Array(output))
    } else {
        Err(issues)
    }
}

fn run_tuple(items: &[Schema], input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::Array(elements)) = input else {
        return Err(vec![type_issue("array", "an array", input, None)]);
    };

    // Exact arity first; element validation only happens on a correctly
    // sized tuple.
    if elements.len() != items.len() {
        return Err(vec![Issue {
            code: Some(code::INVALID_ARITY.to_string()),
            message: format!(
                "Expected {} element(s), but received {}",
                items.len(),
                elements.len()
            ),
            ..Issue::default()
        }]);
    }

    let mut issues = Vec::new();
    let mut output = Vec::with_capacity(items.len());

    for (index, (schema, element)) in items.iter().zip(elements).enumerate() {
        match schema.run(Some(element)) {
            Ok(Some(value)) => output.push(value),
            Ok(None) => output.push(Value::Null),
            Err(element_issues) => issues.extend(prefix_issues(element_issues, index)),
        }
    }

    if issues.is_empty() {
        Ok(Value::Array(output))
    } else {
        Err(issues)
    }
}

fn run_record(value_schema: &Schema, input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::Object(record)) = input else {
        return Err(vec![type_issue("object", "an object", input, None)]);
    };

    let mut issues = Vec::new();
    let mut output = serde_json::Map::new();

    for (key, value) in record {
        match value_schema.run(Some(value)) {
            Ok(Some(parsed)) => {
                output.insert(key.clone(), parsed);
            }
            Ok(None) => {}
            Err(value_issues) => issues.extend(prefix_issues(value_issues, key.as_str())),
        }
    }

    if issues.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(issues)
    }
}

fn run_union(members: &[Schema], input: Option<&Value>) -> RawOutcome {
    let mut collected = Vec::new();
    for member in members {
        match member.run(input) {
            Ok(value) => return Ok(value),
            Err(member_issues) => collected.extend(member_issues),
        }
    }
    Err(vec![Issue {
        code: Some(code::INVALID_UNION.to_string()),
        message: "No union member matched".to_string(),
        union_issues: collected,
        ..Issue::default()
    }])
}

fn run_discriminated(
    key: &str,
    mapping: &HashMap<String, Schema>,
    input: Option<&Value>,
) -> RawOutcome {
    let Some(Value::Object(record)) = input else {
        return Err(vec![type_issue("object", "an object", input, None)]);
    };

    match record.get(key) {
        Some(Value::String(tag)) => match mapping.get(tag) {
            Some(variant) => variant.run(input),
            None => Err(vec![Issue {
                code: Some(code::INVALID_DISCRIMINATOR.to_string()),
                message: format!("Unrecognized discriminator value '{tag}' for key '{key}'"),
                path: vec![PathSegment::Key(key.to_string())],
                received: Some(tag.clone()),
                ..Issue::default()
            }]),
        },
        _ => Err(vec![Issue {
            code: Some(code::INVALID_DISCRIMINATOR.to_string()),
            message: format!("Missing discriminator key '{key}'"),
            path: vec![PathSegment::Key(key.to_string())],
            ..Issue::default()
        }]),
    }
}

fn run_intersection(members: &[Schema], input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::Object(_)) = input else {
        return Err(vec![type_issue(
            "object",
            "an object for intersection",
            input,
            None,
        )]);
    };

    let mut issues = Vec::new();
    let mut output = serde_json::Map::new();

    // Every member sees the same raw input, never a partially merged value,
    // and every failing member contributes its issues before the parse
    // fails.
    for member in members {
        match member.run(input) {
            Ok(Some(Value::Object(fields))) => {
                for (key, value) in fields {
                    output.insert(key, value);
                }
            }
            // Non-object member outputs do not participate in the merge.
            Ok(_) => {}
            Err(member_issues) => issues.extend(member_issues),
        }
    }

    if issues.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(issues)
    }
}

pub(crate) fn apply_transform(apply: &Transformer, value: Value) -> Result<Value, Vec<Issue>> {
    apply(value).map_err(|error| vec![Issue::new(error.to_string())])
}

pub(crate) fn refined_issues(outcome: Refined) -> Vec<Issue> {
    match outcome {
        Refined::Pass => Vec::new(),
        Refined::Fail => vec![Issue::new("Refinement failed").with_code(code::CUSTOM)],
        Refined::Message(message) => vec![Issue::new(message).with_code(code::CUSTOM)],
        Refined::Issue(issue) => vec![issue],
        Refined::Issues(issues) => issues,
    }
}

fn no_match_issue(message: Option<&str>) -> Issue {
    Issue::new(message.unwrap_or("No matching schema for condition")).with_code(code::CUSTOM)
}

/// Type name of a JSON value for error reporting.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "decimal",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn received_name(input: Option<&Value>) -> &'static str {
    input.map_or("nothing", value_type_name)
}

pub(crate) fn type_issue(
    expected: &'static str,
    phrase: &str,
    input: Option<&Value>,
    message: Option<&String>,
) -> Issue {
    let received = received_name(input);
    Issue {
        code: Some(code::INVALID_TYPE.to_string()),
        message: message
            .cloned()
            .unwrap_or_else(|| format!("Expected {phrase}, but received {received}")),
        expected: Some(expected.to_string()),
        received: Some(received.to_string()),
        ..Issue::default()
    }
}

pub(crate) fn check_string(config: &StringConfig, input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::String(text)) = input else {
        return Err(vec![type_issue(
            "string",
            "a string",
            input,
            config.message.as_ref(),
        )]);
    };

    let length = text.chars().count();
    if let Some(min) = config.min {
        if length < min {
            return Err(vec![Issue {
                code: Some(code::TOO_SMALL.to_string()),
                message: format!("String must contain at least {min} character(s)"),
                minimum: Some(min as f64),
                ..Issue::default()
            }]);
        }
    }
    if let Some(max) = config.max {
        if length > max {
            return Err(vec![Issue {
                code: Some(code::TOO_BIG.to_string()),
                message: format!("String must contain at most {max} character(s)"),
                maximum: Some(max as f64),
                ..Issue::default()
            }]);
        }
    }
    if let Some(pattern) = &config.pattern {
        if !pattern.is_match(text) {
            return Err(vec![Issue {
                code: Some(code::INVALID_STRING.to_string()),
                message: format!("String must match pattern {}", pattern.as_str()),
                pattern: Some(pattern.as_str().to_string()),
                ..Issue::default()
            }]);
        }
    }

    Ok(Value::String(text.clone()))
}

pub(crate) fn check_number(config: &NumberConfig, input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::Number(number)) = input else {
        return Err(vec![type_issue(
            "number",
            "a number",
            input,
            config.message.as_ref(),
        )]);
    };
    let Some(x) = number.as_f64() else {
        return Err(vec![type_issue(
            "number",
            "a number",
            input,
            config.message.as_ref(),
        )]);
    };

    if config.integer && x.fract() != 0.0 {
        return Err(vec![Issue {
            code: Some(code::INVALID_TYPE.to_string()),
            message: "Expected an integer".to_string(),
            expected: Some("integer".to_string()),
            received: Some("decimal".to_string()),
            ..Issue::default()
        }]);
    }
    if let Some(min) = config.min {
        if x < min {
            return Err(vec![Issue {
                code: Some(code::TOO_SMALL.to_string()),
                message: format!("Number must be at least {min}"),
                minimum: Some(min),
                ..Issue::default()
            }]);
        }
    }
    if let Some(max) = config.max {
        if x > max {
            return Err(vec![Issue {
                code: Some(code::TOO_BIG.to_string()),
                message: format!("Number must be at most {max}"),
                maximum: Some(max),
                ..Issue::default()
            }]);
        }
    }

    Ok(Value::Number(number.clone()))
}

pub(crate) fn check_boolean(input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    match input {
        Some(Value::Bool(flag)) => Ok(Value::Bool(*flag)),
        _ => Err(vec![type_issue("boolean", "a boolean", input, None)]),
    }
}

pub(crate) fn check_literal(expected: &Value, input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    match input {
        Some(value) if value == expected => Ok(expected.clone()),
        _ => {
            let received = match input {
                Some(value) => value.to_string(),
                None => "nothing".to_string(),
            };
            Err(vec![Issue {
                code: Some(code::INVALID_LITERAL.to_string()),
                message: format!("Expected literal {expected}, but received {received}"),
                expected: Some(expected.to_string()),
                received: Some(received),
                ..Issue::default()
            }])
        }
    }
}
