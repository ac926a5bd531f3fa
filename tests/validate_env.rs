use mcpforge::core::config::CONFIG_FILE;
use mcpforge::core::error::ForgeError;
use mcpforge::core::validate::run_strict;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_manifest(dir: &Path, value: serde_json::Value) -> PathBuf {
    let path = dir.join("mcp-servers.json");
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

#[test]
fn missing_manifest_is_not_found() {
    let tmp = tempdir().unwrap();
    match run_strict(&tmp.path().join("absent.json"), "text") {
        Err(ForgeError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn unset_variable_fails_strict_validation() {
    let tmp = tempdir().unwrap();
    // Variable name is fixture-unique so the ambient test environment
    // cannot satisfy it by accident.
    let input = write_manifest(
        tmp.path(),
        json!({
            "mcpServers": {
                "srv": {"command": "x", "env": {"K": "${MCPFORGE_TEST_SURELY_UNSET_84F2}"}}
            }
        }),
    );
    match run_strict(&input, "text") {
        Err(ForgeError::ValidationError(msg)) => assert!(msg.contains("1")),
        other => panic!("expected ValidationError, got {:?}", other),
    }
}

#[test]
fn env_file_satisfies_placeholders() {
    let tmp = tempdir().unwrap();
    let input = write_manifest(
        tmp.path(),
        json!({
            "mcpServers": {
                "srv": {"command": "x", "env": {"K": "${MCPFORGE_TEST_FILE_VAR_84F2}"}}
            }
        }),
    );
    fs::write(
        tmp.path().join(".env"),
        "MCPFORGE_TEST_FILE_VAR_84F2=a-real-value\n",
    )
    .unwrap();
    run_strict(&input, "text").unwrap();
}

#[test]
fn template_value_in_env_file_fails_strict_validation() {
    let tmp = tempdir().unwrap();
    let input = write_manifest(
        tmp.path(),
        json!({
            "mcpServers": {
                "srv": {"command": "x", "env": {"K": "${MCPFORGE_TEST_TEMPLATE_84F2}"}}
            }
        }),
    );
    fs::write(
        tmp.path().join(".env"),
        "MCPFORGE_TEST_TEMPLATE_84F2=tvly-REPLACE_ME\n",
    )
    .unwrap();
    assert!(run_strict(&input, "text").is_err());
}

#[test]
fn configured_patterns_extend_strict_checks() {
    let tmp = tempdir().unwrap();
    let input = write_manifest(
        tmp.path(),
        json!({
            "mcpServers": {
                "srv": {"command": "x", "env": {"K": "${MCPFORGE_TEST_CUSTOM_84F2}"}}
            }
        }),
    );
    fs::write(
        tmp.path().join(".env"),
        "MCPFORGE_TEST_CUSTOM_84F2=FILL-ME-IN-later\n",
    )
    .unwrap();

    // Passes with the built-in signature set alone.
    run_strict(&input, "text").unwrap();

    fs::write(
        tmp.path().join(CONFIG_FILE),
        "placeholder_patterns = [\"FILL-ME-IN\"]\n",
    )
    .unwrap();
    assert!(run_strict(&input, "text").is_err());
}

#[test]
fn manifest_without_placeholders_passes() {
    let tmp = tempdir().unwrap();
    let input = write_manifest(
        tmp.path(),
        json!({
            "mcpServers": {
                "srv": {"command": "x", "env": {"K": "a-literal"}},
                "bare": {"command": "y"}
            }
        }),
    );
    run_strict(&input, "text").unwrap();
}
