//! Per-kind mock synthesis.
//!
//! The generator dispatches over the same closed kind set as the compiler.
//! Primitive and composite kinds synthesize directly from their config;
//! wrapper kinds generate a candidate from the schema they decorate and
//! re-validate it through the full parse, so a refinement or transform is
//! honored when it can be and reported as unfulfillable when it cannot.

use super::rng::MockRng;
use super::{MockOptions, MockStrategy};
use crate::error::MockError;
use crate::schema::types::{NumberConfig, Schema, SchemaKind, StringConfig};
use serde_json::Value;

// Recognized patterns are inverted exactly; anything else falls back to
// random text with no guarantee of a match.
const CANNED_PATTERNS: &[(&str, &str)] = &[
    (r"^[^\s@]+@[^\s@]+\.[^\s@]+$", "test@example.com"),
    (r"^\d{3}-\d{3}-\d{4}$", "123-456-7890"),
    (r"^\d{4}-\d{2}-\d{2}$", "2024-01-01"),
];

pub(crate) fn generate(
    schema: &Schema,
    options: &MockOptions,
    rng: &mut MockRng,
    depth: usize,
) -> Result<Value, MockError> {
    if depth > options.depth {
        return Err(MockError::MaxDepthExceeded { depth });
    }

    if options.strategy == MockStrategy::Realistic && !schema.meta().examples.is_empty() {
        let examples = &schema.meta().examples;
        return Ok(examples[rng.index(examples.len())].clone());
    }

    match &schema.node.kind {
        SchemaKind::String(config) => Ok(Value::String(mock_string(config, options, rng))),
        SchemaKind::Number(config) => Ok(mock_number(config, options, rng)),
        SchemaKind::Boolean => Ok(Value::Bool(rng.flip())),
        SchemaKind::Literal(value) => Ok(value.clone()),
        SchemaKind::Object { shape, .. } => {
            let mut output = serde_json::Map::new();
            for (key, child) in shape {
                output.insert(key.clone(), generate(child, options, rng, depth + 1)?);
            }
            Ok(Value::Object(output))
        }
        SchemaKind::Array { item } => {
            let length = rng.length(1, 5);
            let mut output = Vec::with_capacity(length);
            for _ in 0..length {
                output.push(generate(item, options, rng, depth + 1)?);
            }
            Ok(Value::Array(output))
        }
        SchemaKind::Tuple { items } => {
            let mut output = Vec::with_capacity(items.len());
            for item in items {
                output.push(generate(item, options, rng, depth + 1)?);
            }
            Ok(Value::Array(output))
        }
        SchemaKind::Record { value } => {
            let count = rng.length(1, 3);
            let mut output = serde_json::Map::new();
            for _ in 0..count {
                let key = rng.alphanumeric(8);
                output.insert(key, generate(value, options, rng, depth + 1)?);
            }
            Ok(Value::Object(output))
        }
        SchemaKind::Union { members } => {
            if members.is_empty() {
                return Ok(Value::Null);
            }
            let pick = rng.index(members.len());
            generate(&members[pick], options, rng, depth + 1)
        }
        SchemaKind::DiscriminatedUnion { order, mapping, .. } => {
            if order.is_empty() {
                return Err(MockError::CannotGenerate {
                    kind: schema.kind_name(),
                });
            }
            let tag = &order[rng.index(order.len())];
            match mapping.get(tag) {
                Some(variant) => generate(variant, options, rng, depth + 1),
                None => Err(MockError::CannotGenerate {
                    kind: schema.kind_name(),
                }),
            }
        }
        SchemaKind::Intersection { members } => {
            let mut output = serde_json::Map::new();
            for member in members {
                if let Value::Object(fields) = generate(member, options, rng, depth + 1)? {
                    for (key, value) in fields {
                        output.insert(key, value);
                    }
                }
            }
            Ok(Value::Object(output))
        }
        SchemaKind::Optional { inner }
        | SchemaKind::DefaultTo { inner, .. }
        | SchemaKind::Transform { inner, .. }
        | SchemaKind::Refine { inner, .. }
        | SchemaKind::AsyncRefine { inner, .. } => {
            let candidate = generate(inner, options, rng, depth + 1)?;
            revalidate(schema, candidate)
        }
        SchemaKind::Lazy(node) => generate(node.force(), options, rng, depth + 1),
        // Transparent for generation purposes.
        SchemaKind::Cached { inner, .. } => generate(inner, options, rng, depth),
        SchemaKind::Conditional { .. } | SchemaKind::Custom { .. } => {
            let candidate = fallback_primitive(rng);
            revalidate(schema, candidate)
        }
    }
}

// A candidate is only as good as the schema's own parse says it is; there
// is no guaranteed synthesis path for arbitrary custom descriptors.
fn revalidate(schema: &Schema, candidate: Value) -> Result<Value, MockError> {
    schema.parse(&candidate).map_err(|_| MockError::CannotGenerate {
        kind: schema.kind_name(),
    })
}

fn fallback_primitive(rng: &mut MockRng) -> Value {
    let roll = rng.next_f64();
    if roll < 0.25 {
        let length = rng.length(1, 20);
        Value::String(rng.alphanumeric(length))
    } else if roll < 0.5 {
        Value::from((rng.next_f64() * 1000.0) as i64)
    } else if roll < 0.75 {
        Value::Bool(rng.flip())
    } else {
        let length = rng.length(1, 5);
        Value::Array((0..length).map(|_| fallback_primitive(rng)).collect())
    }
}

fn mock_string(config: &StringConfig, options: &MockOptions, rng: &mut MockRng) -> String {
    if let Some(pattern) = &config.pattern {
        for (known, canned) in CANNED_PATTERNS {
            if pattern.as_str().contains(known) {
                return (*canned).to_string();
            }
        }
        return rng.alphanumeric(10);
    }

    let min = config.min.unwrap_or(1);
    let max = config.max.unwrap_or(50).max(min);
    let length = match options.strategy {
        MockStrategy::EdgeCases => {
            if rng.flip() {
                min
            } else {
                max
            }
        }
        _ => rng.length(min, max),
    };
    rng.alphanumeric(length)
}

fn mock_number(config: &NumberConfig, options: &MockOptions, rng: &mut MockRng) -> Value {
    let min = config.min.unwrap_or(0.0);
    let max = config.max.unwrap_or(100.0).max(min);

    let x = match options.strategy {
        MockStrategy::EdgeCases => {
            if rng.flip() {
                min
            } else {
                max
            }
        }
        _ => min + rng.next_f64() * (max - min),
    };

    if config.integer {
        Value::from(x.floor() as i64)
    } else {
        let rounded = (x * 100.0).round() / 100.0;
        serde_json::Number::from_f64(rounded)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}
