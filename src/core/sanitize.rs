//! Secret redaction for entry env blocks.
//!
//! Compiled manifests are meant to be committed and shared; literal secrets
//! must not survive compilation. Every env value not already a `${VAR}`
//! placeholder is replaced with a placeholder named after its own key, and
//! the original literal is discarded.

use crate::core::manifest::Manifest;

/// True if the value is exactly a `${...}` placeholder reference.
pub fn is_placeholder(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}')
}

/// Rewrite every literal env value in the manifest to `${KEY}`.
pub fn sanitize_manifest(manifest: &mut Manifest) {
    for entry in manifest.servers.values_mut() {
        let Some(env) = entry.env.as_mut() else {
            continue;
        };
        for (key, value) in env.iter_mut() {
            if !is_placeholder(value) {
                *value = format!("${{{}}}", key);
            }
        }
    }
}
