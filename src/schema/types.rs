//! Core descriptor types: the immutable [`Schema`] handle, the closed
//! [`SchemaKind`] tag, and the per-kind configuration it carries.
//!
//! A schema is an immutable description of an expected data shape. Every
//! combinator returns a new schema wrapping the original; nothing is ever
//! mutated in place. The kind tag is a closed enum so that the interpreter,
//! the compiler, and the mock generator all dispatch over the same
//! exhaustiveness-checked set of variants.

use crate::cache::ResultCache;
use crate::issue::Issue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

/// Outcome of a refinement predicate.
///
/// Mirrors the full range a refinement may report: a plain pass/fail, a
/// custom message, or one or more fully formed issues used verbatim.
#[derive(Debug, Clone)]
pub enum Refined {
    /// The value is acceptable.
    Pass,
    /// Rejected with the generic "Refinement failed" issue.
    Fail,
    /// Rejected with a custom message.
    Message(String),
    /// Rejected with a fully formed issue.
    Issue(Issue),
    /// Rejected with several issues at once.
    Issues(Vec<Issue>),
}

/// User-supplied output transformation. A returned error is caught at the
/// combinator boundary and converted into a single issue carrying its
/// message; it never propagates as a panic.
pub type Transformer =
    Arc<dyn Fn(Value) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// User-supplied synchronous refinement predicate.
pub type Refinement = Arc<dyn Fn(&Value) -> Refined + Send + Sync>;

/// User-supplied asynchronous refinement predicate. Runs only on the
/// [`Schema::parse_async`] path.
pub type AsyncRefinement =
    Arc<dyn Fn(Value) -> Pin<Box<dyn Future<Output = Refined> + Send>> + Send + Sync>;

/// Selects a schema for an input value, or `None` when nothing matches.
pub type SchemaChooser = Arc<dyn Fn(&Value) -> Option<Schema> + Send + Sync>;

/// Extension-point parser for kinds the engine does not know.
pub type CustomParser = Arc<dyn Fn(&Value) -> Result<Value, Vec<Issue>> + Send + Sync>;

/// Deferred schema constructor used by lazy schemas.
pub type SchemaThunk = Arc<dyn Fn() -> Schema + Send + Sync>;

/// Derives a cache fingerprint from an input value.
pub type KeyFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Factory for default values, re-evaluated per call so defaults are never
/// shared mutable state.
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// An object shape: field name to field schema, in deterministic order.
pub type Shape = BTreeMap<String, Schema>;

/// Constraints for string schemas.
#[derive(Debug, Clone, Default)]
pub struct StringConfig {
    /// Minimum length in characters.
    pub min: Option<usize>,
    /// Maximum length in characters.
    pub max: Option<usize>,
    /// Pattern the string must match.
    pub pattern: Option<Regex>,
    /// Overrides the type-mismatch message.
    pub message: Option<String>,
}

/// Constraints for number schemas.
#[derive(Debug, Clone, Default)]
pub struct NumberConfig {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Require an integral value.
    pub integer: bool,
    /// Overrides the type-mismatch message.
    pub message: Option<String>,
}

/// Policy for object keys absent from the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownKeys {
    /// Drop unknown keys from the output silently.
    #[default]
    Strip,
    /// Copy unknown keys to the output verbatim.
    Passthrough,
    /// Report each unknown key as an issue.
    Strict,
}

/// Descriptive metadata attached to a schema. Attachment has zero effect on
/// parsing.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Kind or user-assigned name.
    pub name: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Example values.
    pub examples: Vec<Value>,
    /// Default applied for absent or null input, when one was configured.
    pub default: Option<Value>,
    /// Free-form custom fields.
    pub custom: serde_json::Map<String, Value>,
}

/// Source of a configured default value.
#[derive(Clone)]
pub(crate) enum DefaultSource {
    Value(Value),
    Factory(DefaultFactory),
}

impl DefaultSource {
    pub(crate) fn produce(&self) -> Value {
        match self {
            DefaultSource::Value(value) => value.clone(),
            DefaultSource::Factory(factory) => factory(),
        }
    }
}

/// Lazily constructed schema; the thunk runs once, on first use.
#[derive(Clone)]
pub(crate) struct LazyNode {
    thunk: SchemaThunk,
    cell: OnceLock<Schema>,
}

impl LazyNode {
    pub(crate) fn new(thunk: SchemaThunk) -> Self {
        LazyNode {
            thunk,
            cell: OnceLock::new(),
        }
    }

    pub(crate) fn force(&self) -> &Schema {
        self.cell.get_or_init(|| (self.thunk)())
    }
}

/// The closed set of schema kinds.
///
/// Primitive and composite kinds carry their validation config and child
/// schemas directly; wrapper kinds hold the schema they decorate. The enum
/// is deliberately crate-private: the interpreter, compiler, and mock
/// generator match it exhaustively, and a new kind must teach all three.
#[derive(Clone)]
pub(crate) enum SchemaKind {
    String(StringConfig),
    Number(NumberConfig),
    Boolean,
    Literal(Value),
    Object {
        shape: Shape,
        unknown_keys: UnknownKeys,
    },
    Array {
        item: Schema,
    },
    Tuple {
        items: Vec<Schema>,
    },
    Record {
        value: Schema,
    },
    Union {
        members: Vec<Schema>,
    },
    DiscriminatedUnion {
        key: String,
        // Tag order as declared, for deterministic traversal; the map gives
        // O(1) dispatch.
        order: Vec<String>,
        mapping: HashMap<String, Schema>,
    },
    Intersection {
        members: Vec<Schema>,
    },
    Optional {
        inner: Schema,
    },
    DefaultTo {
        inner: Schema,
        source: DefaultSource,
    },
    Transform {
        inner: Schema,
        apply: Transformer,
    },
    Refine {
        inner: Schema,
        check: Refinement,
    },
    AsyncRefine {
        inner: Schema,
        check: AsyncRefinement,
    },
    Lazy(LazyNode),
    Conditional {
        choose: SchemaChooser,
        message: Option<String>,
    },
    Cached {
        inner: Schema,
        cache: Arc<ResultCache>,
        key_fn: KeyFn,
    },
    Custom {
        name: &'static str,
        parser: CustomParser,
    },
}

pub(crate) struct SchemaNode {
    pub(crate) kind: SchemaKind,
    pub(crate) metadata: Metadata,
}

/// An immutable schema descriptor.
///
/// Cloning is cheap (a reference-count bump) and clones share identity:
/// the compiler memoizes per descriptor instance, so two clones of the same
/// schema compile to the same validator.
#[derive(Clone)]
pub struct Schema {
    pub(crate) node: Arc<SchemaNode>,
}

impl Schema {
    pub(crate) fn with_kind(kind: SchemaKind, metadata: Metadata) -> Self {
        Schema {
            node: Arc::new(SchemaNode { kind, metadata }),
        }
    }

    pub(crate) fn named(kind: SchemaKind, name: &str) -> Self {
        Schema::with_kind(
            kind,
            Metadata {
                name: Some(name.to_string()),
                ..Metadata::default()
            },
        )
    }

    /// Descriptive metadata attached to this schema.
    pub fn meta(&self) -> &Metadata {
        &self.node.metadata
    }

    /// The kind tag, as a stable lowercase name. Useful for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.node.kind {
            SchemaKind::String(_) => "string",
            SchemaKind::Number(_) => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Literal(_) => "literal",
            SchemaKind::Object { .. } => "object",
            SchemaKind::Array { .. } => "array",
            SchemaKind::Tuple { .. } => "tuple",
            SchemaKind::Record { .. } => "record",
            SchemaKind::Union { .. } => "union",
            SchemaKind::DiscriminatedUnion { .. } => "discriminated_union",
            SchemaKind::Intersection { .. } => "intersection",
            SchemaKind::Optional { .. } => "optional",
            SchemaKind::DefaultTo { .. } => "default",
            SchemaKind::Transform { .. } => "transform",
            SchemaKind::Refine { .. } => "refine",
            SchemaKind::AsyncRefine { .. } => "async_refine",
            SchemaKind::Lazy(_) => "lazy",
            SchemaKind::Conditional { .. } => "conditional",
            SchemaKind::Cached { .. } => "cached",
            SchemaKind::Custom { name, .. } => name,
        }
    }

    /// Whether two handles refer to the same descriptor instance.
    pub fn same_schema(a: &Schema, b: &Schema) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }

    /// Identity key for the compiler cache.
    pub(crate) fn ptr_key(&self) -> usize {
        Arc::as_ptr(&self.node) as usize
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Schema");
        dbg.field("kind", &self.kind_name());
        if let Some(name) = &self.node.metadata.name {
            dbg.field("name", name);
        }
        dbg.finish_non_exhaustive()
    }
}
