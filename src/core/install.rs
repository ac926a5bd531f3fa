//! Environment bootstrap and batched package installation.
//!
//! Bootstrap is idempotent: an ecosystem root carrying its init marker is
//! left alone, and only ecosystems with discovered specifiers are prepared
//! at all. Installation is non-partial: the first failed specifier aborts
//! the run before any command rewrite can observe a half-populated root.

use crate::core::classify::DependencySet;
use crate::core::config::CompilerConfig;
use crate::core::ecosystem::{Ecosystem, EnvRoots};
use crate::core::error::ForgeError;
use crate::core::output;
use crate::core::runner;
use colored::Colorize;
use std::fs;

#[derive(Debug, Default)]
pub struct InstallSummary {
    pub node: usize,
    pub python: usize,
}

/// Ensure the install root for one ecosystem exists and is initialized.
fn bootstrap_ecosystem(
    roots: &EnvRoots,
    config: &CompilerConfig,
    eco: Ecosystem,
) -> Result<(), ForgeError> {
    let dir = roots.ecosystem_dir(eco);
    fs::create_dir_all(&dir).map_err(ForgeError::IoError)?;

    if roots.marker_path(eco).exists() {
        return Ok(());
    }

    let (bin, args) = match eco {
        Ecosystem::Node => (
            config.npm_bin.clone(),
            vec!["init".to_string(), "-y".to_string()],
        ),
        Ecosystem::Python => (
            config.python_bin.clone(),
            vec![
                "-m".to_string(),
                "venv".to_string(),
                dir.to_string_lossy().to_string(),
            ],
        ),
    };

    let output = runner::execute(roots, eco, "bootstrap.init", &bin, &args, &dir)
        .map_err(|e| ForgeError::BootstrapFailed {
            ecosystem: eco.as_str().to_string(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ForgeError::BootstrapFailed {
            ecosystem: eco.as_str().to_string(),
            detail: output::compact_line(&String::from_utf8_lossy(&output.stderr), 240),
        });
    }
    Ok(())
}

/// Prepare the install roots that this run actually needs.
pub fn bootstrap(
    roots: &EnvRoots,
    config: &CompilerConfig,
    deps: &DependencySet,
) -> Result<(), ForgeError> {
    if deps.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(&roots.root).map_err(ForgeError::IoError)?;
    println!(
        "{} Bootstrapping isolated environments under {}",
        "▸".bright_cyan(),
        roots.root.display()
    );

    for eco in [Ecosystem::Node, Ecosystem::Python] {
        if !deps.for_ecosystem(eco).is_empty() {
            bootstrap_ecosystem(roots, config, eco)?;
        }
    }
    Ok(())
}

fn install_one(
    roots: &EnvRoots,
    config: &CompilerConfig,
    eco: Ecosystem,
    specifier: &str,
) -> Result<(), ForgeError> {
    let dir = roots.ecosystem_dir(eco);
    let (bin, args) = match eco {
        Ecosystem::Node => (
            config.npm_bin.clone(),
            vec![
                "install".to_string(),
                "--prefix".to_string(),
                dir.to_string_lossy().to_string(),
                specifier.to_string(),
            ],
        ),
        Ecosystem::Python => (
            roots.pip_path().to_string_lossy().to_string(),
            vec![
                "install".to_string(),
                "--upgrade".to_string(),
                specifier.to_string(),
            ],
        ),
    };

    let failed = |detail: String| ForgeError::InstallFailed {
        specifier: specifier.to_string(),
        ecosystem: eco.as_str().to_string(),
        detail,
    };

    let output = runner::execute(roots, eco, "install", &bin, &args, &dir)
        .map_err(|e| failed(e.to_string()))?;
    if !output.status.success() {
        return Err(failed(output::compact_line(
            &String::from_utf8_lossy(&output.stderr),
            240,
        )));
    }
    Ok(())
}

fn install_ecosystem(
    roots: &EnvRoots,
    config: &CompilerConfig,
    eco: Ecosystem,
    deps: &DependencySet,
) -> Result<usize, ForgeError> {
    let specs = deps.for_ecosystem(eco);
    if specs.is_empty() {
        return Ok(0);
    }
    println!(
        "{} Installing {} {} package(s)",
        "▸".bright_cyan(),
        specs.len(),
        eco.as_str()
    );
    for specifier in specs.keys() {
        install_one(roots, config, eco, specifier)?;
    }
    Ok(specs.len())
}

/// Install every discovered specifier, one batch per ecosystem.
///
/// The two batches run concurrently: each mutates only its own root, and
/// bootstrap has already completed for both. Within one ecosystem installs
/// stay sequential, since npm and pip each share a single tree per root.
pub fn install_all(
    roots: &EnvRoots,
    config: &CompilerConfig,
    deps: &DependencySet,
    skip_install: bool,
) -> Result<InstallSummary, ForgeError> {
    if skip_install || deps.is_empty() {
        return Ok(InstallSummary::default());
    }

    let (node, python) = rayon::join(
        || install_ecosystem(roots, config, Ecosystem::Node, deps),
        || install_ecosystem(roots, config, Ecosystem::Python, deps),
    );

    Ok(InstallSummary {
        node: node?,
        python: python?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::classify_manifest;
    use crate::core::manifest::Manifest;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn deps_with_node() -> DependencySet {
        let raw = r#"{"mcpServers": {"a": {"command": "npx", "args": ["-y", "pkg-x"]}}}"#;
        let manifest: Manifest = serde_json::from_str(raw).unwrap();
        classify_manifest(&manifest).1
    }

    #[test]
    fn bootstrap_skips_when_no_dependencies() {
        let tmp = tempdir().unwrap();
        let roots = EnvRoots::new(tmp.path().join("env"));
        let config = CompilerConfig {
            npm_bin: "/nonexistent/npm".to_string(),
            python_bin: "/nonexistent/python".to_string(),
            ..CompilerConfig::default()
        };
        bootstrap(&roots, &config, &DependencySet::default()).unwrap();
        assert!(!roots.root.exists());
    }

    #[test]
    fn bootstrap_is_idempotent_with_markers_present() {
        let tmp = tempdir().unwrap();
        let roots = EnvRoots::new(tmp.path().join("env"));
        let node_dir = roots.ecosystem_dir(Ecosystem::Node);
        std::fs::create_dir_all(&node_dir).unwrap();
        std::fs::write(roots.marker_path(Ecosystem::Node), "{}").unwrap();

        // Tool binaries are unreachable on purpose: the marker must
        // short-circuit before any subprocess is attempted.
        let config = CompilerConfig {
            npm_bin: "/nonexistent/npm".to_string(),
            python_bin: "/nonexistent/python".to_string(),
            ..CompilerConfig::default()
        };
        let deps = deps_with_node();
        bootstrap(&roots, &config, &deps).unwrap();
        bootstrap(&roots, &config, &deps).unwrap();
        assert_eq!(
            std::fs::read_to_string(roots.marker_path(Ecosystem::Node)).unwrap(),
            "{}"
        );
    }

    #[test]
    fn skip_install_is_a_no_op() {
        let roots = EnvRoots::new(PathBuf::from("/nonexistent/env"));
        let config = CompilerConfig::default();
        let summary = install_all(&roots, &config, &deps_with_node(), true).unwrap();
        assert_eq!(summary.node, 0);
        assert_eq!(summary.python, 0);
    }

    #[test]
    fn unreachable_installer_is_install_failed() {
        let tmp = tempdir().unwrap();
        let roots = EnvRoots::new(tmp.path().join("env"));
        std::fs::create_dir_all(roots.ecosystem_dir(Ecosystem::Node)).unwrap();
        let config = CompilerConfig {
            npm_bin: "/nonexistent/definitely-missing-npm".to_string(),
            ..CompilerConfig::default()
        };
        let err = install_all(&roots, &config, &deps_with_node(), false).unwrap_err();
        match err {
            ForgeError::InstallFailed {
                specifier,
                ecosystem,
                ..
            } => {
                assert_eq!(specifier, "pkg-x");
                assert_eq!(ecosystem, "node");
            }
            other => panic!("expected InstallFailed, got {:?}", other),
        }
    }
}
