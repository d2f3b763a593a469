//! Wrapper combinators on [`Schema`].
//!
//! Each method returns a new descriptor around the original; the wrapped
//! schema is untouched and can keep being used independently. Metadata
//! carries over to the wrapper, matching the behavior of the metadata-only
//! combinators at the bottom of this module.

use super::types::{
    AsyncRefinement, DefaultSource, Metadata, Refined, Schema, SchemaKind,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

impl Schema {
    fn wrap(&self, kind: SchemaKind) -> Schema {
        Schema::with_kind(kind, self.node.metadata.clone())
    }

    fn with_meta(&self, metadata: Metadata) -> Schema {
        Schema::with_kind(self.node.kind.clone(), metadata)
    }

    /// Accept absent input, short-circuiting to an omitted success.
    ///
    /// Absence is distinct from null: a missing object key satisfies an
    /// optional field, while an explicit `null` is still handed to the
    /// wrapped schema.
    pub fn optional(&self) -> Schema {
        self.wrap(SchemaKind::Optional {
            inner: self.clone(),
        })
    }

    /// Substitute `value` when the raw input is absent or null.
    pub fn default_value(&self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        let mut metadata = self.node.metadata.clone();
        metadata.default = Some(value.clone());
        Schema::with_kind(
            SchemaKind::DefaultTo {
                inner: self.clone(),
                source: DefaultSource::Value(value),
            },
            metadata,
        )
    }

    /// Substitute a factory-produced value when the raw input is absent or
    /// null. The factory is re-evaluated per call, so callers never share a
    /// mutable default.
    pub fn default_with(&self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Schema {
        self.wrap(SchemaKind::DefaultTo {
            inner: self.clone(),
            source: DefaultSource::Factory(Arc::new(factory)),
        })
    }

    /// Apply `apply` to the parsed output on success.
    ///
    /// An error returned by the transformation is converted into a single
    /// issue carrying its message; a failed parse passes through untouched.
    /// The transformation applies symmetrically on the async path.
    pub fn transform(
        &self,
        apply: impl Fn(Value) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>
        + Send
        + Sync
        + 'static,
    ) -> Schema {
        self.wrap(SchemaKind::Transform {
            inner: self.clone(),
            apply: Arc::new(apply),
        })
    }

    /// Re-check the parsed output with a predicate.
    ///
    /// Any reported issues convert the success into a failure; see
    /// [`Refined`] for the outcomes a predicate may produce.
    pub fn refine(&self, check: impl Fn(&Value) -> Refined + Send + Sync + 'static) -> Schema {
        self.wrap(SchemaKind::Refine {
            inner: self.clone(),
            check: Arc::new(check),
        })
    }

    /// Re-check the parsed output with an async predicate.
    ///
    /// The predicate runs only on [`Schema::parse_async`]; the synchronous
    /// [`Schema::parse`] path validates everything else and skips it.
    pub fn async_refine<F, Fut>(&self, check: F) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Refined> + Send + 'static,
    {
        let check: AsyncRefinement = Arc::new(move |value| Box::pin(check(value)));
        self.wrap(SchemaKind::AsyncRefine {
            inner: self.clone(),
            check,
        })
    }

    /// Attach a description. No behavioral effect on parsing.
    pub fn describe(&self, description: impl Into<String>) -> Schema {
        let mut metadata = self.node.metadata.clone();
        metadata.description = Some(description.into());
        self.with_meta(metadata)
    }

    /// Attach example values. No behavioral effect on parsing.
    pub fn examples(&self, examples: impl IntoIterator<Item = Value>) -> Schema {
        let mut metadata = self.node.metadata.clone();
        metadata.examples = examples.into_iter().collect();
        self.with_meta(metadata)
    }

    /// Merge free-form fields into the metadata bag. No behavioral effect
    /// on parsing.
    pub fn metadata(&self, custom: serde_json::Map<String, Value>) -> Schema {
        let mut metadata = self.node.metadata.clone();
        metadata.custom.extend(custom);
        self.with_meta(metadata)
    }

    /// Override the schema name used in diagnostics and metadata.
    pub fn rename(&self, name: impl Into<String>) -> Schema {
        let mut metadata = self.node.metadata.clone();
        metadata.name = Some(name.into());
        self.with_meta(metadata)
    }
}
