//! Deterministic JSON rendering.
//!
//! Pretty output uses a fixed 2-space indent; minified output has no
//! extraneous whitespace. Key order is preserved from the merged document,
//! so identical inputs always serialize to identical bytes (required for
//! content-hash stability).

use serde_json::Value;

/// Render the final document to text under the resolved minify policy.
pub fn render(value: &Value, minify: bool) -> serde_json::Result<String> {
    if minify {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}
