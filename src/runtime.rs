//! The validation runtime: one value owning the engine's two caches.
//!
//! Rather than ambient process-wide state, callers construct a
//! [`ValidationRuntime`] and pass it by reference. This makes
//! reset-between-tests and per-tenant isolation straightforward: drop the
//! runtime and every memoized validator and result goes with it.
//!
//! Both caches are guarded by mutexes, so a runtime can be shared across
//! threads. No lock is held while user callbacks run or while child schemas
//! compile.

use crate::cache::{CacheConfig, ResultCache};
use crate::compile::{CompiledFn, CompiledValidator, build_validator};
use crate::error::ParseOutcome;
use crate::schema::types::{Schema, SchemaKind};
use log::{debug, trace};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Identity-keyed memo of compiled validators.
///
/// Entries are weak: the cache never keeps a validator (or, through the
/// closures it captures, a descriptor) alive. A live entry implies some
/// [`CompiledValidator`] still pins its source schema, so a recycled node
/// address can never alias a stale entry.
struct CompilerCache {
    entries: Mutex<HashMap<usize, Weak<CompiledFn>>>,
}

impl CompilerCache {
    fn new() -> Self {
        CompilerCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, schema: &Schema) -> Option<Arc<CompiledFn>> {
        let mut entries = self.entries.lock().expect("compiler cache lock poisoned");
        let key = schema.ptr_key();
        match entries.get(&key).and_then(Weak::upgrade) {
            Some(run) => Some(run),
            None => {
                entries.remove(&key);
                None
            }
        }
    }

    fn insert(&self, schema: &Schema, run: &Arc<CompiledFn>) {
        self.entries
            .lock()
            .expect("compiler cache lock poisoned")
            .insert(schema.ptr_key(), Arc::downgrade(run));
    }

    fn clear(&self) {
        self.entries
            .lock()
            .expect("compiler cache lock poisoned")
            .clear();
    }

    /// Number of live entries; dead weak references are swept on the way.
    fn live_len(&self) -> usize {
        let mut entries = self.entries.lock().expect("compiler cache lock poisoned");
        entries.retain(|_, run| run.upgrade().is_some());
        entries.len()
    }
}

/// Owns the compiler cache and the result cache.
///
/// ```
/// use datashape::{CompiledValidator, ValidationRuntime, number, object};
///
/// let runtime = ValidationRuntime::new();
/// let schema = object([("count", number())]);
///
/// let first = runtime.compile(&schema);
/// let second = runtime.compile(&schema);
/// assert!(CompiledValidator::same_validator(&first, &second));
/// ```
pub struct ValidationRuntime {
    compiler: CompilerCache,
    results: Arc<ResultCache>,
}

impl ValidationRuntime {
    /// A runtime with the default result-cache configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// A runtime with an explicit result-cache configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        ValidationRuntime {
            compiler: CompilerCache::new(),
            results: Arc::new(ResultCache::new(config)),
        }
    }

    /// Lower a schema into a specialized validator, memoized by descriptor
    /// identity.
    ///
    /// Compiling the same descriptor instance twice returns the same
    /// underlying closure, so callers can detect recompilation with
    /// [`CompiledValidator::same_validator`]. Children of composite kinds
    /// are compiled through this same cache and shared across repeat
    /// compilations.
    pub fn compile(&self, schema: &Schema) -> CompiledValidator {
        if let Some(run) = self.compiler.get(schema) {
            trace!("compiler cache hit for {} schema", schema.kind_name());
            return CompiledValidator::new(schema.clone(), run);
        }
        debug!("compiling {} schema", schema.kind_name());
        let validator = CompiledValidator::new(schema.clone(), build_validator(self, schema));
        self.compiler.insert(schema, validator.raw());
        validator
    }

    /// Drop every compiled-validator association. Idempotent.
    pub fn clear_compiler_cache(&self) {
        self.compiler.clear();
    }

    /// Number of live compiled-validator associations.
    pub fn compiler_cache_size(&self) -> usize {
        self.compiler.live_len()
    }

    /// Look up a memoized parse result by fingerprint. Entries older than
    /// the configured TTL are treated as absent.
    pub fn cache_get(&self, key: &str) -> Option<ParseOutcome> {
        self.results.get(key)
    }

    /// Memoize a parse result under a fingerprint. Both success and failure
    /// results are cacheable.
    pub fn cache_set(&self, key: impl Into<String>, result: ParseOutcome) {
        self.results.set(key, result);
    }

    /// Drop every memoized parse result. Idempotent.
    pub fn clear_cache(&self) {
        self.results.clear();
    }

    /// Number of resident memoized results.
    pub fn cache_size(&self) -> usize {
        self.results.len()
    }

    /// Proactively sweep expired memoized results.
    pub fn cleanup_cache(&self) {
        self.results.cleanup();
    }

    /// Wrap a schema so repeated parses memoize through this runtime's
    /// result cache.
    ///
    /// `key_fn` derives a fingerprint from the raw input; parses whose
    /// fingerprints collide return the cached result verbatim. Callers must
    /// treat returned data as potentially aliased across calls, not freshly
    /// allocated. See [`crate::fingerprint::content_fingerprint`] for a
    /// ready-made key function.
    pub fn with_cache(
        &self,
        schema: &Schema,
        key_fn: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Schema {
        Schema::with_kind(
            SchemaKind::Cached {
                inner: schema.clone(),
                cache: Arc::clone(&self.results),
                key_fn: Arc::new(key_fn),
            },
            schema.meta().clone(),
        )
    }
}

impl Default for ValidationRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidationRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRuntime")
            .field("compiled", &self.compiler.live_len())
            .field("results", &self.results.len())
            .finish()
    }
}
