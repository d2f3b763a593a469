//! Content fingerprints for cache keys.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Derive an opaque fingerprint from a value's content.
///
/// Equal values always produce equal fingerprints (object keys serialize in
/// a canonical order), so this is a drop-in key function for
/// [`ValidationRuntime::with_cache`](crate::ValidationRuntime::with_cache).
///
/// ```
/// use datashape::fingerprint::content_fingerprint;
/// use serde_json::json;
///
/// let a = content_fingerprint(&json!({"id": 1, "name": "ada"}));
/// let b = content_fingerprint(&json!({"name": "ada", "id": 1}));
/// assert_eq!(a, b);
/// ```
pub fn content_fingerprint(value: &Value) -> String {
    let canonical = serde_json::to_vec(value).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    BASE64.encode(hasher.finalize())
}
