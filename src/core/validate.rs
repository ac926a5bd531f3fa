//! Env-var validation for manifest placeholders.
//!
//! Two modes over the same `${VAR}` references:
//!
//! - **Warn** runs after compilation against the compiled manifest; unset
//!   variables are summarized and the compile still succeeds.
//! - **Strict** is a standalone pre-flight over the input manifest: a
//!   referenced variable that is unset, or still carries a template
//!   signature value, fails the check. Offenses are itemized per
//!   `(server, VAR, reason)` and the process exits nonzero if any exist.
//!
//! Strict mode overlays an optional env file beneath the ambient process
//! environment (ambient wins). The loader is best-effort: a missing or
//! unreadable file just means the ambient environment stands alone.

use crate::core::config::{self, CompilerConfig};
use crate::core::error::ForgeError;
use crate::core::manifest::Manifest;
use crate::core::sanitize::is_placeholder;
use colored::Colorize;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Values that indicate a variable has not been filled in from the template.
pub const PLACEHOLDER_PATTERNS: &[&str] = &[
    "REPLACE_ME",
    "sbp_REPLACE_ME",
    "tvly-REPLACE_ME",
    "m0-REPLACE_ME",
    "github_pat_REPLACE_ME",
    "xoxb-REPLACE_ME",
    "T0REPLACE_ME",
];

/// Extract `VAR` from a value of the exact form `${VAR}`.
pub fn placeholder_var(value: &str) -> Option<&str> {
    if is_placeholder(value) {
        Some(&value[2..value.len() - 1])
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "value")]
pub enum OffenseReason {
    Missing,
    PlaceholderValue(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Offense {
    pub server: String,
    pub var: String,
    #[serde(flatten)]
    pub reason: OffenseReason,
}

/// Placeholder variables referenced by the manifest that are unset (or
/// empty) in `env`. Deduplicated, sorted.
pub fn missing_in(manifest: &Manifest, env: &BTreeMap<String, String>) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut missing = Vec::new();
    for entry in manifest.servers.values() {
        let Some(block) = &entry.env else { continue };
        for value in block.values() {
            let Some(var) = placeholder_var(value) else {
                continue;
            };
            if env.get(var).is_none_or(|v| v.is_empty()) && seen.insert(var) {
                missing.push(var.to_string());
            }
        }
    }
    missing.sort();
    missing
}

/// Strict pre-flight offenses for every placeholder in the input manifest.
pub fn strict_offenses(
    manifest: &Manifest,
    env: &BTreeMap<String, String>,
    extra_patterns: &[String],
) -> Vec<Offense> {
    let mut offenses = Vec::new();
    for (server, entry) in &manifest.servers {
        let Some(block) = &entry.env else { continue };
        for value in block.values() {
            let Some(var) = placeholder_var(value) else {
                continue;
            };
            match env.get(var).filter(|v| !v.is_empty()) {
                None => offenses.push(Offense {
                    server: server.clone(),
                    var: var.to_string(),
                    reason: OffenseReason::Missing,
                }),
                Some(actual) => {
                    let is_template = PLACEHOLDER_PATTERNS
                        .iter()
                        .any(|p| actual.contains(p))
                        || extra_patterns.iter().any(|p| actual.contains(p.as_str()));
                    if is_template {
                        offenses.push(Offense {
                            server: server.clone(),
                            var: var.to_string(),
                            reason: OffenseReason::PlaceholderValue(actual.clone()),
                        });
                    }
                }
            }
        }
    }
    offenses
}

/// Best-effort `KEY=VALUE` env-file parser.
///
/// Blank lines and `#` comments are skipped; optional surrounding quotes on
/// the value are stripped. Any read failure yields an empty map.
pub fn load_env_file(path: &Path) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let Ok(content) = std::fs::read_to_string(path) else {
        return vars;
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_start_matches("export ").trim();
        let mut value = value.trim();
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            vars.insert(key.to_string(), value.to_string());
        }
    }
    vars
}

/// Snapshot of the ambient process environment.
pub fn ambient_env() -> BTreeMap<String, String> {
    std::env::vars().collect()
}

/// Ambient environment overlaid on the optional env file (ambient wins).
pub fn effective_env(env_file: &Path) -> BTreeMap<String, String> {
    let mut env = load_env_file(env_file);
    for (k, v) in ambient_env() {
        env.insert(k, v);
    }
    env
}

/// Standalone strict validation entry point. Does not compile anything.
pub fn run_strict(input: &Path, format: &str) -> Result<(), ForgeError> {
    let base = input.parent().unwrap_or(Path::new(".")).to_path_buf();
    let config: CompilerConfig = config::load_config(&base);
    let manifest = Manifest::load(input)?;

    let env_file = if config.env_file.is_absolute() {
        config.env_file.clone()
    } else {
        base.join(&config.env_file)
    };
    let env = effective_env(&env_file);

    let offenses = strict_offenses(&manifest, &env, &config.placeholder_patterns);

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&offenses)
                .map_err(|e| ForgeError::ValidationError(e.to_string()))?
        );
    } else {
        if env_file.exists() {
            println!(
                "{} Loaded env file {}",
                "▸".bright_cyan(),
                env_file.display()
            );
        }
        if offenses.is_empty() {
            println!(
                "{} validate-env passed: all {} server env vars are set and non-placeholder",
                "✓".bright_green(),
                manifest.servers.len()
            );
        } else {
            println!(
                "{} validate-env failed with {} issue(s):",
                "✗".bright_red(),
                offenses.len()
            );
            for offense in &offenses {
                match &offense.reason {
                    OffenseReason::Missing => println!(
                        "    [{}] {} {}",
                        offense.server.bright_white(),
                        offense.var,
                        "not set".bright_red()
                    ),
                    OffenseReason::PlaceholderValue(value) => println!(
                        "    [{}] {} {} ({:?})",
                        offense.server.bright_white(),
                        offense.var,
                        "still a placeholder".bright_yellow(),
                        value
                    ),
                }
            }
            println!("\n    Fill in all values in your env file and re-run.");
        }
    }

    if offenses.is_empty() {
        return Ok(());
    }
    Err(ForgeError::ValidationError(format!(
        "{} env validation issue(s)",
        offenses.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with_env(pairs: &[(&str, &str)]) -> Manifest {
        let env: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let raw = serde_json::json!({
            "mcpServers": {"srv": {"command": "x", "env": env}}
        });
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn placeholder_var_requires_exact_form() {
        assert_eq!(placeholder_var("${TOKEN}"), Some("TOKEN"));
        assert_eq!(placeholder_var("TOKEN"), None);
        assert_eq!(placeholder_var("${TOKEN} "), None);
    }

    #[test]
    fn missing_in_dedupes_and_sorts() {
        let raw = serde_json::json!({
            "mcpServers": {
                "a": {"command": "x", "env": {"T1": "${ZED}", "T2": "${ALPHA}"}},
                "b": {"command": "x", "env": {"T3": "${ZED}"}}
            }
        });
        let manifest: Manifest = serde_json::from_value(raw).unwrap();
        let env = BTreeMap::new();
        assert_eq!(missing_in(&manifest, &env), vec!["ALPHA", "ZED"]);
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let manifest = manifest_with_env(&[("KEY", "${TOKEN}")]);
        let mut env = BTreeMap::new();
        env.insert("TOKEN".to_string(), String::new());
        assert_eq!(missing_in(&manifest, &env), vec!["TOKEN"]);
    }

    #[test]
    fn strict_flags_missing_and_template_values() {
        let manifest = manifest_with_env(&[("A", "${SET_OK}"), ("B", "${TEMPLATED}"), ("C", "${ABSENT}")]);
        let mut env = BTreeMap::new();
        env.insert("SET_OK".to_string(), "real-value".to_string());
        env.insert("TEMPLATED".to_string(), "github_pat_REPLACE_ME".to_string());

        let offenses = strict_offenses(&manifest, &env, &[]);
        assert_eq!(offenses.len(), 2);
        assert!(offenses.iter().any(
            |o| o.var == "ABSENT" && o.reason == OffenseReason::Missing
        ));
        assert!(offenses.iter().any(|o| o.var == "TEMPLATED"
            && matches!(o.reason, OffenseReason::PlaceholderValue(_))));
    }

    #[test]
    fn strict_ignores_literal_values_in_manifest() {
        // Only exact ${VAR} references are checked; literals are the
        // sanitizer's problem, not the validator's.
        let manifest = manifest_with_env(&[("A", "literal-secret")]);
        let offenses = strict_offenses(&manifest, &BTreeMap::new(), &[]);
        assert!(offenses.is_empty());
    }

    #[test]
    fn extra_patterns_extend_the_builtin_set() {
        let manifest = manifest_with_env(&[("A", "${VAR}")]);
        let mut env = BTreeMap::new();
        env.insert("VAR".to_string(), "CHANGEME-later".to_string());

        assert!(strict_offenses(&manifest, &env, &[]).is_empty());
        let offenses = strict_offenses(&manifest, &env, &["CHANGEME".to_string()]);
        assert_eq!(offenses.len(), 1);
    }

    #[test]
    fn env_file_parser_is_forgiving() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(
            &path,
            "# comment\n\nTOKEN=abc123\nexport REGION = \"us-east-1\"\nQUOTED='v'\nmalformed line\n",
        )
        .unwrap();
        let vars = load_env_file(&path);
        assert_eq!(vars["TOKEN"], "abc123");
        assert_eq!(vars["REGION"], "us-east-1");
        assert_eq!(vars["QUOTED"], "v");
        assert_eq!(vars.len(), 3);

        assert!(load_env_file(&tmp.path().join("absent")).is_empty());
    }
}
