//! Ecosystem adapters and the shared install-root handle.
//!
//! The compiler supports two package ecosystems with independent install
//! trees and binary-naming conventions. Everything ecosystem-specific lives
//! behind [`Ecosystem`]: runner recognition, bare-name derivation, init and
//! install invocations, and executable layout. Adding a third ecosystem means
//! adding one more variant, not touching the pipeline.

use regex::Regex;
use std::path::{Path, PathBuf};

/// Auto-confirm flag `npx` requires before the package specifier.
pub const NPX_AUTO_CONFIRM: &str = "-y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Node,
    Python,
}

impl Ecosystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::Node => "node",
            Ecosystem::Python => "python",
        }
    }

    /// Launch-time runner this ecosystem's uncompiled entries invoke.
    pub fn runner(self) -> &'static str {
        match self {
            Ecosystem::Node => "npx",
            Ecosystem::Python => "uvx",
        }
    }

    /// File whose presence marks a root as already initialized.
    pub fn init_marker(self) -> &'static str {
        match self {
            // npm init -y writes package.json; python -m venv writes pyvenv.cfg
            Ecosystem::Node => "package.json",
            Ecosystem::Python => "pyvenv.cfg",
        }
    }

    /// Strip version pins, extras, and constraint suffixes from a specifier.
    ///
    /// Node: `pkg@1.2.3` and `@scope/pkg@next` keep their (possibly scoped)
    /// name. Python: `pkg[extra]>=1.0` reduces to `pkg`.
    pub fn bare_package_name(self, specifier: &str) -> String {
        match self {
            Ecosystem::Node => {
                let re = Regex::new(r"^(@[^/]+/[^@]+|[^@]+)(?:@.+)?$").unwrap();
                re.captures(specifier)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| specifier.to_string())
            }
            Ecosystem::Python => {
                let base = specifier.split('[').next().unwrap_or(specifier);
                let re = Regex::new(r"[<>=!~]").unwrap();
                re.splitn(base, 2).next().unwrap_or(base).to_string()
            }
        }
    }

    /// Default executable name for a package with no usable descriptor.
    ///
    /// Node drops the `@scope/` prefix; Python uses the bare name as-is.
    pub fn heuristic_executable(self, specifier: &str) -> String {
        let bare = self.bare_package_name(specifier);
        match self {
            Ecosystem::Node => bare.rsplit('/').next().unwrap_or(&bare).to_string(),
            Ecosystem::Python => bare,
        }
    }

    /// Apply the platform executable suffix to a bare executable name.
    pub fn executable_file_name(self, name: &str) -> String {
        if cfg!(windows) {
            match self {
                Ecosystem::Node => format!("{}.cmd", name),
                Ecosystem::Python => format!("{}.exe", name),
            }
        } else {
            name.to_string()
        }
    }
}

/// Handle to the isolated install roots, threaded explicitly through the
/// bootstrap, install, and resolve stages.
///
/// Layout: `<root>/node/` holds an npm prefix tree, `<root>/python/` a
/// virtualenv. The roots are created once and reused across compiler runs;
/// this tool never deletes them.
#[derive(Debug, Clone)]
pub struct EnvRoots {
    pub root: PathBuf,
}

impl EnvRoots {
    pub fn new(root: PathBuf) -> Self {
        EnvRoots { root }
    }

    pub fn ecosystem_dir(&self, eco: Ecosystem) -> PathBuf {
        self.root.join(eco.as_str())
    }

    pub fn marker_path(&self, eco: Ecosystem) -> PathBuf {
        self.ecosystem_dir(eco).join(eco.init_marker())
    }

    /// Directory where installed executables land.
    pub fn bin_dir(&self, eco: Ecosystem) -> PathBuf {
        match eco {
            Ecosystem::Node => self
                .ecosystem_dir(eco)
                .join("node_modules")
                .join(".bin"),
            Ecosystem::Python => {
                let scripts = if cfg!(windows) { "Scripts" } else { "bin" };
                self.ecosystem_dir(eco).join(scripts)
            }
        }
    }

    /// Per-package descriptor file inside the Node install tree.
    ///
    /// Scoped names keep their `@scope/` path segment under `node_modules`.
    pub fn node_descriptor_path(&self, bare_name: &str) -> PathBuf {
        let mut p = self.ecosystem_dir(Ecosystem::Node).join("node_modules");
        for seg in bare_name.split('/') {
            p = p.join(seg);
        }
        p.join("package.json")
    }

    /// The venv's own pip, used for installs into the Python root.
    pub fn pip_path(&self) -> PathBuf {
        self.bin_dir(Ecosystem::Python)
            .join(Ecosystem::Python.executable_file_name("pip"))
    }

    /// Append-only audit log of external tool invocations.
    pub fn events_path(&self) -> PathBuf {
        self.root.join("compiler.events.jsonl")
    }

    /// Absolutize a configured root against a base directory.
    pub fn resolve(env_dir: &Path, base: &Path) -> Self {
        let root = if env_dir.is_absolute() {
            env_dir.to_path_buf()
        } else {
            base.join(env_dir)
        };
        EnvRoots::new(root)
    }
}
