//! Output name resolution for destination templates.
//!
//! A destination may embed a content-hash token:
//!
//! ```text
//! merged.json                    → merged.json (verbatim)
//! merged.[contenthash].json      → merged.3f9a2c1b.json
//! merged.[contenthash:4].json    → merged.3f9a.json
//! ```
//!
//! `[hash]` is accepted as an alias. The digest is computed over the
//! serialized bytes with the host's hash settings (salt mixed in before
//! the content) and truncated to the token's length, falling back to the
//! host-wide digest length.

use std::sync::LazyLock;

use regex::Regex;

use crate::host::{AssetInfo, HashSettings};

static TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?:contenthash|hash)(?::(\d+))?\]").unwrap());

/// Check whether a destination template contains a hash token.
pub fn is_templated(template: &str) -> bool {
    TEMPLATE_RE.is_match(template)
}

/// Resolve a destination template into a concrete asset name.
///
/// Returns the name and the interpolation metadata; hash-templated names
/// are marked immutable and carry their content hash.
pub fn interpolate(template: &str, source: &[u8], settings: &HashSettings) -> (String, AssetInfo) {
    if !is_templated(template) {
        return (template.to_string(), AssetInfo::default());
    }

    let content_hash = settings.digest(source);

    let name = TEMPLATE_RE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match caps.get(1).and_then(|len| len.as_str().parse().ok()) {
                Some(length) => settings.digest_truncated(source, length),
                None => content_hash.clone(),
            }
        })
        .into_owned();

    let info = AssetInfo {
        minimized: false,
        immutable: true,
        content_hash: Some(content_hash),
    };

    (name, info)
}
