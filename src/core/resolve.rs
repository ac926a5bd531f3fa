//! Binary resolution for installed packages.
//!
//! Prefers the package's own installed metadata over naming heuristics: a
//! Node package declares its executables in `package.json`'s `bin` field,
//! and a Python console script is probed in the venv scripts directory under
//! its distribution name and the `-`→`_` variant. A missing or unreadable
//! descriptor degrades silently to the heuristic; only a path that does not
//! exist at all is reported, as a warning, never an abort — the best-guess
//! path still lands in the compiled manifest for the operator to adjust.

use crate::core::ecosystem::{Ecosystem, EnvRoots};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    /// Whether the resolved path exists on disk right now.
    pub exists: bool,
}

/// Executable name declared by an installed Node package, if its descriptor
/// is present and readable.
fn node_declared_executable(roots: &EnvRoots, bare_name: &str) -> Option<String> {
    let descriptor = roots.node_descriptor_path(bare_name);
    let content = std::fs::read_to_string(descriptor).ok()?;
    let meta: serde_json::Value = serde_json::from_str(&content).ok()?;

    match meta.get("bin") {
        // A string bin names the entry point, not the executable; the shim
        // in .bin/ is named after the unscoped package.
        Some(serde_json::Value::String(_)) => {
            Some(bare_name.rsplit('/').next().unwrap_or(bare_name).to_string())
        }
        Some(serde_json::Value::Object(bins)) if !bins.is_empty() => {
            bins.keys().next().cloned()
        }
        _ => None,
    }
}

fn resolve_node(roots: &EnvRoots, specifier: &str) -> ResolvedBinary {
    let bare = Ecosystem::Node.bare_package_name(specifier);
    let name = node_declared_executable(roots, &bare)
        .unwrap_or_else(|| Ecosystem::Node.heuristic_executable(specifier));
    let path = roots
        .bin_dir(Ecosystem::Node)
        .join(Ecosystem::Node.executable_file_name(&name));
    let exists = path.exists();
    ResolvedBinary { path, exists }
}

fn resolve_python(roots: &EnvRoots, specifier: &str) -> ResolvedBinary {
    let bare = Ecosystem::Python.bare_package_name(specifier);
    let bin_dir = roots.bin_dir(Ecosystem::Python);

    let candidates = [bare.clone(), bare.replace('-', "_")];
    for candidate in &candidates {
        let path = bin_dir.join(Ecosystem::Python.executable_file_name(candidate));
        if path.exists() {
            return ResolvedBinary { path, exists: true };
        }
    }

    let path = bin_dir.join(Ecosystem::Python.executable_file_name(&bare));
    ResolvedBinary {
        path,
        exists: false,
    }
}

/// Compute the local executable path for an installed package.
pub fn resolve_binary(roots: &EnvRoots, eco: Ecosystem, specifier: &str) -> ResolvedBinary {
    match eco {
        Ecosystem::Node => resolve_node(roots, specifier),
        Ecosystem::Python => resolve_python(roots, specifier),
    }
}
