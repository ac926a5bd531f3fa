//! Typed model of an MCP server-launch manifest.
//!
//! A manifest is a JSON object whose `mcpServers` field maps server names to
//! launch entries. Every top-level field this tool does not understand is
//! captured verbatim and written back on save, so compiling a manifest never
//! destroys host-specific configuration riding alongside the server table.

use crate::core::error::ForgeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Well-known field holding the server-entry mapping.
pub const SERVERS_FIELD: &str = "mcpServers";

/// One launch entry: a command, its arguments, and an optional env block.
///
/// Before compilation `command` is typically a package runner (`npx`, `uvx`);
/// after compilation it is a filesystem path to a local executable. Fields
/// beyond the three this tool rewrites are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A full manifest: the server table plus any unrecognized top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "mcpServers")]
    pub servers: BTreeMap<String, ServerEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    /// Load a manifest from disk.
    ///
    /// A missing file is `NotFound`; malformed JSON is `ParseError`. An
    /// absent `mcpServers` field deserializes to an empty table rather than
    /// failing.
    pub fn load(path: &Path) -> Result<Manifest, ForgeError> {
        if !path.exists() {
            return Err(ForgeError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path).map_err(ForgeError::IoError)?;
        serde_json::from_str(&content)
            .map_err(|e| ForgeError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Serialize and write the manifest in one shot.
    ///
    /// The file is only ever written from a fully materialized string, so a
    /// failed pipeline upstream of this call leaves no partial output.
    pub fn save(&self, path: &Path) -> Result<(), ForgeError> {
        let rendered = serde_json::to_string_pretty(self)
            .map_err(|e| ForgeError::ParseError(e.to_string()))?;
        fs::write(path, rendered + "\n").map_err(ForgeError::IoError)
    }
}
