//! Lowering schemas into specialized validation closures.
//!
//! For the closed set of recognized kinds (string, number, boolean, object,
//! array, literal, union, intersection) the compiler emits a closure that
//! re-runs the validation from primitive config captured once at compile
//! time - no descriptor indirection on the hot path. Children of composite
//! kinds are compiled recursively through the runtime's identity cache, so
//! repeat compilations share child closures. Every other kind falls back to
//! a closure delegating to the descriptor's own parse - correctness over
//! speed at extension points - and the fallback is cached by identity too.

use crate::error::{ParseOutcome, ValidationError};
use crate::issue::{Issue, PathSegment, code, prefix_issues};
use crate::runtime::ValidationRuntime;
use crate::schema::parse::{
    RawOutcome, check_boolean, check_literal, check_number, check_string, type_issue,
};
use crate::schema::types::{Schema, SchemaKind, UnknownKeys};
use log::trace;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

pub(crate) type CompiledFn = dyn Fn(Option<&Value>) -> RawOutcome + Send + Sync;

/// A schema lowered into a specialized validation closure.
///
/// A compiled validator is a pure function of the descriptor it was
/// compiled from. Handles are cheap to clone; [`CompiledValidator::same_validator`]
/// tells whether two handles share one underlying closure, which holds
/// exactly when they were compiled from the same descriptor instance
/// through the same runtime.
#[derive(Clone)]
pub struct CompiledValidator {
    schema: Schema,
    run: Arc<CompiledFn>,
}

impl CompiledValidator {
    pub(crate) fn new(schema: Schema, run: Arc<CompiledFn>) -> Self {
        CompiledValidator { schema, run }
    }

    /// Validate `input` with the specialized closure.
    pub fn validate(&self, input: &Value) -> ParseOutcome {
        match (self.run)(Some(input)) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(Value::Null),
            Err(issues) => Err(ValidationError::new(issues)),
        }
    }

    /// Validate a possibly absent input, mirroring
    /// [`Schema::parse_opt`](crate::Schema::parse_opt).
    pub fn validate_opt(&self, input: Option<&Value>) -> Result<Option<Value>, ValidationError> {
        (self.run)(input).map_err(ValidationError::new)
    }

    /// The descriptor this validator was compiled from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether two handles share the same underlying closure.
    pub fn same_validator(a: &CompiledValidator, b: &CompiledValidator) -> bool {
        Arc::ptr_eq(&a.run, &b.run)
    }

    pub(crate) fn run_raw(&self, input: Option<&Value>) -> RawOutcome {
        (self.run)(input)
    }

    pub(crate) fn raw(&self) -> &Arc<CompiledFn> {
        &self.run
    }
}

impl std::fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("kind", &self.schema.kind_name())
            .finish_non_exhaustive()
    }
}

pub(crate) fn build_validator(runtime: &ValidationRuntime, schema: &Schema) -> Arc<CompiledFn> {
    match &schema.node.kind {
        SchemaKind::String(config) => {
            let config = config.clone();
            Arc::new(move |input| check_string(&config, input).map(Some))
        }
        SchemaKind::Number(config) => {
            let config = config.clone();
            Arc::new(move |input| check_number(&config, input).map(Some))
        }
        SchemaKind::Boolean => Arc::new(|input| check_boolean(input).map(Some)),
        SchemaKind::Literal(value) => {
            let expected = value.clone();
            Arc::new(move |input| check_literal(&expected, input).map(Some))
        }
        SchemaKind::Object {
            shape,
            unknown_keys,
        } => {
            let fields: Vec<(String, CompiledValidator)> = shape
                .iter()
                .map(|(key, child)| (key.clone(), runtime.compile(child)))
                .collect();
            let known: HashSet<String> = shape.keys().cloned().collect();
            let unknown_keys = *unknown_keys;
            Arc::new(move |input| compiled_object(&fields, &known, unknown_keys, input).map(Some))
        }
        SchemaKind::Array { item } => {
            let item = runtime.compile(item);
            Arc::new(move |input| compiled_array(&item, input).map(Some))
        }
        SchemaKind::Union { members } => {
            let members: Vec<CompiledValidator> =
                members.iter().map(|member| runtime.compile(member)).collect();
            Arc::new(move |input| compiled_union(&members, input))
        }
        SchemaKind::Intersection { members } => {
            let members: Vec<CompiledValidator> =
                members.iter().map(|member| runtime.compile(member)).collect();
            Arc::new(move |input| compiled_intersection(&members, input).map(Some))
        }
        // Wrapper, composite-without-fast-path, and custom kinds delegate to
        // the descriptor's own parse.
        _ => {
            trace!("no fast path for {} schema, delegating to parse", schema.kind_name());
            let fallback = schema.clone();
            Arc::new(move |input| fallback.run(input))
        }
    }
}

fn compiled_object(
    fields: &[(String, CompiledValidator)],
    known: &HashSet<String>,
    unknown_keys: UnknownKeys,
    input: Option<&Value>,
) -> Result<Value, Vec<Issue>> {
    let Some(Value::Object(record)) = input else {
        return Err(vec![type_issue("object", "an object", input, None)]);
    };

    let mut issues = Vec::new();
    let mut output = serde_json::Map::new();

    if unknown_keys != UnknownKeys::Strip {
        for (key, value) in record {
            if !known.contains(key) {
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

    for (key, validator) in fields {
        match validator.run_raw(record.get(key)) {
            Ok(Some(value)) => {
                output.insert(key.clone(), value);
            }
            Ok(None) => {}
            Err(field_issues) => issues.extend(prefix_issues(field_issues, key.as_str())),
        }
    }

    if issues.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(issues)
    }
}

fn compiled_array(item: &CompiledValidator, input: Option<&Value>) -> Result<Value, Vec<Issue>> {
    let Some(Value::Array(elements)) = input else {
        return Err(vec![type_issue("array", "an array", input, None)]);
    };

    let mut issues = Vec::new();
    let mut output = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        match item.run_raw(Some(element)) {
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

fn compiled_union(members: &[CompiledValidator], input: Option<&Value>) -> RawOutcome {
    let mut collected = Vec::new();
    for member in members {
        match member.run_raw(input) {
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

fn compiled_intersection(
    members: &[CompiledValidator],
    input: Option<&Value>,
) -> Result<Value, Vec<Issue>> {
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

    for member in members {
        match member.run_raw(input) {
            Ok(Some(Value::Object(fields))) => {
                for (key, value) in fields {
                    output.insert(key, value);
                }
            }
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
