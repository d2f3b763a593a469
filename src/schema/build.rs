//! Schema constructors.
//!
//! Each function builds one kind of descriptor. Composite constructors take
//! child schemas by value; since a [`Schema`] is a cheap reference-counted
//! handle, sharing a child between several composites is free.

use super::types::{
    LazyNode, NumberConfig, Schema, SchemaKind, Shape, StringConfig, UnknownKeys,
};
use crate::issue::Issue;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// An unconstrained string schema.
pub fn string() -> Schema {
    string_with(StringConfig::default())
}

/// A string schema with length and pattern constraints.
///
/// ```
/// use datashape::{string_with, StringConfig};
///
/// let username = string_with(StringConfig {
///     min: Some(3),
///     max: Some(32),
///     ..StringConfig::default()
/// });
/// assert!(username.parse(&serde_json::json!("ada")).is_ok());
/// assert!(username.parse(&serde_json::json!("ab")).is_err());
/// ```
pub fn string_with(config: StringConfig) -> Schema {
    Schema::named(SchemaKind::String(config), "string")
}

/// An unconstrained number schema.
pub fn number() -> Schema {
    number_with(NumberConfig::default())
}

/// A number schema with range and integrality constraints.
pub fn number_with(config: NumberConfig) -> Schema {
    Schema::named(SchemaKind::Number(config), "number")
}

/// A boolean schema.
pub fn boolean() -> Schema {
    Schema::named(SchemaKind::Boolean, "boolean")
}

/// A schema accepting exactly one value.
pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::named(SchemaKind::Literal(value.into()), "literal")
}

/// An object schema with the default strip policy: keys absent from the
/// shape are dropped from the output silently.
pub fn object<K, I>(shape: I) -> Schema
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Schema)>,
{
    object_with(shape, UnknownKeys::Strip)
}

/// An object schema with an explicit unknown-keys policy.
///
/// Every shape key is validated regardless of earlier failures; all per-key
/// issues are collected with the key prepended to their paths.
pub fn object_with<K, I>(shape: I, unknown_keys: UnknownKeys) -> Schema
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Schema)>,
{
    let shape: Shape = shape
        .into_iter()
        .map(|(key, schema)| (key.into(), schema))
        .collect();
    Schema::named(
        SchemaKind::Object {
            shape,
            unknown_keys,
        },
        "object",
    )
}

/// An array schema validating every element against `item`.
pub fn array(item: Schema) -> Schema {
    Schema::named(SchemaKind::Array { item }, "array")
}

/// A fixed-arity tuple schema; position `i` is validated against schema `i`.
pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::named(
        SchemaKind::Tuple {
            items: items.into_iter().collect(),
        },
        "tuple",
    )
}

/// A record schema: every value in the object is validated against
/// `value`; the key set itself is unconstrained.
pub fn record(value: Schema) -> Schema {
    Schema::named(SchemaKind::Record { value }, "record")
}

/// A union schema trying members in declaration order and returning the
/// first success. On total failure the single reported issue aggregates
/// every member's issues under `union_issues`.
pub fn union(members: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::named(
        SchemaKind::Union {
            members: members.into_iter().collect(),
        },
        "union",
    )
}

/// A discriminated union dispatching on `input[key]`.
///
/// A recognized discriminator value validates the input against only the
/// matching variant. A missing or unrecognized discriminator is reported
/// with its own issue code, distinct from generic union failure.
///
/// ```
/// use datashape::{discriminated_union, literal, number, object};
///
/// let event = discriminated_union("type", [
///     ("click", object([
///         ("type", literal("click")),
///         ("x", number()),
///     ])),
///     ("key", object([
///         ("type", literal("key")),
///         ("code", number()),
///     ])),
/// ]);
/// let input = serde_json::json!({"type": "click", "x": 3.0});
/// assert!(event.parse(&input).is_ok());
/// ```
pub fn discriminated_union<K, V, I>(key: K, variants: I) -> Schema
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (V, Schema)>,
{
    let mut order = Vec::new();
    let mut mapping = HashMap::new();
    for (tag, schema) in variants {
        let tag = tag.into();
        if !mapping.contains_key(&tag) {
            order.push(tag.clone());
        }
        mapping.insert(tag, schema);
    }
    Schema::named(
        SchemaKind::DiscriminatedUnion {
            key: key.into(),
            order,
            mapping,
        },
        "discriminated_union",
    )
}

/// An intersection schema: every member is validated against the same raw
/// input, successful outputs are shallow-merged, and issues from every
/// failing member are aggregated before the parse fails.
pub fn intersection(members: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::named(
        SchemaKind::Intersection {
            members: members.into_iter().collect(),
        },
        "intersection",
    )
}

/// A lazily constructed schema; `thunk` runs once, on first parse.
///
/// This is the vehicle for self-referential schemas. Mock generation on a
/// cyclic lazy schema fails with a depth error rather than looping.
pub fn lazy(thunk: impl Fn() -> Schema + Send + Sync + 'static) -> Schema {
    Schema::named(SchemaKind::Lazy(LazyNode::new(Arc::new(thunk))), "lazy")
}

/// A schema selected per input value. `choose` returning `None` is its own
/// validation failure.
pub fn conditional(choose: impl Fn(&Value) -> Option<Schema> + Send + Sync + 'static) -> Schema {
    Schema::named(
        SchemaKind::Conditional {
            choose: Arc::new(choose),
            message: None,
        },
        "conditional",
    )
}

/// Like [`conditional`], with a custom no-match message.
pub fn conditional_with(
    choose: impl Fn(&Value) -> Option<Schema> + Send + Sync + 'static,
    message: impl Into<String>,
) -> Schema {
    Schema::named(
        SchemaKind::Conditional {
            choose: Arc::new(choose),
            message: Some(message.into()),
        },
        "conditional",
    )
}

/// An extension-point schema with a caller-supplied parse function.
///
/// The compiler and the mock generator treat custom schemas as opaque: the
/// compiler falls back to this parse function, and mock generation succeeds
/// only if a best-effort candidate happens to validate.
pub fn custom(
    name: &'static str,
    parser: impl Fn(&Value) -> Result<Value, Vec<Issue>> + Send + Sync + 'static,
) -> Schema {
    Schema::named(
        SchemaKind::Custom {
            name,
            parser: Arc::new(parser),
        },
        name,
    )
}
