//! Shape algebra: derive new object schemas from existing shapes.
//!
//! These helpers mirror the usual object-composition operations. Each one
//! produces an ordinary strip-policy object schema over a derived shape, so
//! the result composes with every other combinator.

use super::build::object;
use super::types::{Schema, SchemaKind, Shape};

/// Combine two shapes into one object schema. On key conflicts the second
/// shape wins.
pub fn merge(first: &Shape, second: &Shape) -> Schema {
    let mut combined = first.clone();
    for (key, schema) in second {
        combined.insert(key.clone(), schema.clone());
    }
    object(combined)
}

/// An object schema over only the named keys of `shape`. Keys absent from
/// the shape are ignored.
pub fn pick(shape: &Shape, keys: &[&str]) -> Schema {
    let picked: Shape = keys
        .iter()
        .filter_map(|key| {
            shape
                .get(*key)
                .map(|schema| ((*key).to_string(), schema.clone()))
        })
        .collect();
    object(picked)
}

/// An object schema over `shape` without the named keys.
pub fn omit(shape: &Shape, keys: &[&str]) -> Schema {
    let omitted: Shape = shape
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, schema)| (key.clone(), schema.clone()))
        .collect();
    object(omitted)
}

/// An object schema where every field of `shape` is optional.
pub fn partial(shape: &Shape) -> Schema {
    let relaxed: Shape = shape
        .iter()
        .map(|(key, schema)| (key.clone(), schema.optional()))
        .collect();
    object(relaxed)
}

/// An object schema where every field of `shape` is mandatory: optional
/// wrappers are stripped down to the schema they decorate.
pub fn required(shape: &Shape) -> Schema {
    let tightened: Shape = shape
        .iter()
        .map(|(key, schema)| (key.clone(), unwrap_optional(schema)))
        .collect();
    object(tightened)
}

fn unwrap_optional(schema: &Schema) -> Schema {
    let mut current = schema.clone();
    while let SchemaKind::Optional { inner } = &current.node.kind {
        let inner = inner.clone();
        current = inner;
    }
    current
}
