//! Shared fixtures for integration tests.

#![allow(dead_code)]

use datashape::{
    NumberConfig, Schema, StringConfig, UnknownKeys, array, boolean, number, number_with, object,
    object_with, string, string_with, union,
};
use serde_json::{Value, json};

/// Initialize test logging once; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A representative account schema exercising most composite kinds.
pub fn account_schema() -> Schema {
    object([
        (
            "userName",
            string_with(StringConfig {
                min: Some(3),
                max: Some(64),
                ..StringConfig::default()
            }),
        ),
        ("active", boolean()),
        (
            "age",
            number_with(NumberConfig {
                min: Some(0.0),
                max: Some(150.0),
                integer: true,
                ..NumberConfig::default()
            })
            .optional(),
        ),
        ("emails", array(object([("value", string())]))),
        ("externalId", union([string(), number()])),
    ])
}

/// A strict variant of the account schema.
pub fn strict_account_schema() -> Schema {
    object_with(
        [("userName", string()), ("active", boolean())],
        UnknownKeys::Strict,
    )
}

/// A value [`account_schema`] accepts.
pub fn sample_account() -> Value {
    json!({
        "userName": "ada.lovelace",
        "active": true,
        "age": 36,
        "emails": [{"value": "ada@example.com"}],
        "externalId": 1815
    })
}
