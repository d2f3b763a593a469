//! Declarative schema validation and compilation for untyped JSON.
//!
//! Build an immutable description of an expected data shape from composable
//! constructors and combinators, then validate arbitrary
//! [`serde_json::Value`] input against it. Failures are reported as
//! structured [`Issue`]s with exact paths; nothing panics on bad data.
//!
//! # Core components
//!
//! - [`Schema`] - immutable descriptor built from constructors like
//!   [`string`], [`object`], [`union`] and refined with combinators like
//!   [`Schema::optional`] and [`Schema::refine`]
//! - [`ValidationRuntime`] - owns the compiler cache and the result cache;
//!   lowers schemas into specialized [`CompiledValidator`] closures and
//!   memoizes whole parse results by fingerprint
//! - [`mock`](mock()) - inverts a schema into sample data it accepts,
//!   deterministically from a seed
//!
//! # Quick start
//!
//! ```rust
//! use datashape::{number, object, string, union};
//! use serde_json::json;
//!
//! let user = object([
//!     ("name", string()),
//!     ("age", number().optional()),
//!     ("id", union([string(), number()])),
//! ]);
//!
//! let parsed = user.parse(&json!({"name": "Ada", "id": 7, "extra": true}));
//! assert_eq!(parsed.unwrap(), json!({"name": "Ada", "id": 7}));
//!
//! let failed = user.parse(&json!({"name": 1, "id": 7}));
//! let error = failed.unwrap_err();
//! assert_eq!(error.issues.len(), 1);
//! ```
//!
//! For the fast path, compile the schema once and reuse the closure:
//!
//! ```rust
//! use datashape::{ValidationRuntime, number, object};
//! use serde_json::json;
//!
//! let runtime = ValidationRuntime::new();
//! let schema = object([("count", number())]);
//! let validator = runtime.compile(&schema);
//! assert!(validator.validate(&json!({"count": 3})).is_ok());
//! ```

pub mod cache;
pub mod compile;
pub mod error;
pub mod fingerprint;
pub mod issue;
pub mod mock;
pub mod runtime;
pub mod schema;

// Re-export commonly used types for convenience
pub use cache::CacheConfig;
pub use compile::CompiledValidator;
pub use error::{MockError, ParseOutcome, ValidationError};
pub use issue::{Issue, PathSegment, code, format_issues, format_path};
pub use runtime::ValidationRuntime;
pub use schema::{
    Metadata, NumberConfig, Refined, Schema, Shape, StringConfig, UnknownKeys, array, boolean,
    conditional, conditional_with, custom, discriminated_union, intersection, lazy, literal,
    merge, number, number_with, object, object_with, omit, partial, pick, record, required,
    string, string_with, tuple, union,
};

// Mock generation entry points
pub use mock::{MockOptions, MockRng, MockStrategy, mock_edge_cases, mock_many};

/// Generate one value the schema accepts. See [`mock::mock`].
pub use mock::mock;
