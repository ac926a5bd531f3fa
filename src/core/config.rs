//! Optional compiler configuration.
//!
//! `mcpforge.toml` next to the input manifest can override the install root,
//! the env file consulted by strict validation, the ecosystem tool binaries,
//! and the strict-mode placeholder signatures. Absent or unreadable config
//! silently falls back to defaults; a present-but-invalid file is also
//! treated as defaults rather than aborting a compile over tuning knobs.

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "mcpforge.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Isolated install root. Relative paths resolve against the manifest's
    /// directory.
    pub env_dir: PathBuf,
    /// Env file overlaid under the ambient environment in strict validation.
    pub env_file: PathBuf,
    /// npm binary used for Node init and installs.
    pub npm_bin: String,
    /// Python interpreter used to create the virtualenv.
    pub python_bin: String,
    /// Extra placeholder signatures appended to the built-in strict-mode set.
    pub placeholder_patterns: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            env_dir: PathBuf::from(".mcp_env"),
            env_file: PathBuf::from(".env"),
            npm_bin: default_npm_bin(),
            python_bin: default_python_bin(),
            placeholder_patterns: Vec::new(),
        }
    }
}

fn default_npm_bin() -> String {
    if cfg!(windows) { "npm.cmd" } else { "npm" }.to_string()
}

fn default_python_bin() -> String {
    if cfg!(windows) { "python" } else { "python3" }.to_string()
}

/// Load `mcpforge.toml` from `dir`, defaulting on any failure.
pub fn load_config(dir: &Path) -> CompilerConfig {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return CompilerConfig::default();
    }
    let Ok(content) = std::fs::read_to_string(&path) else {
        return CompilerConfig::default();
    };
    toml::from_str(&content).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_defaults() {
        let tmp = tempdir().unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.env_dir, PathBuf::from(".mcp_env"));
        assert_eq!(cfg.env_file, PathBuf::from(".env"));
        assert!(cfg.placeholder_patterns.is_empty());
    }

    #[test]
    fn partial_config_overrides_only_named_keys() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "env_dir = \"build/env\"\nplaceholder_patterns = [\"CHANGEME\"]\n",
        )
        .unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.env_dir, PathBuf::from("build/env"));
        assert_eq!(cfg.placeholder_patterns, vec!["CHANGEME".to_string()]);
        assert_eq!(cfg.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "env_dir = [not toml").unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.env_dir, PathBuf::from(".mcp_env"));
    }
}
