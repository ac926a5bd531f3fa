//! Subprocess execution with an append-only audit trail.
//!
//! Every external tool invocation (npm init, venv creation, installs) is
//! echoed to the terminal and recorded as one JSONL event under the install
//! root. Audit-log write failures never fail the run.

use crate::core::ecosystem::{Ecosystem, EnvRoots};
use crate::core::error::ForgeError;
use crate::core::output;
use colored::Colorize;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use ulid::Ulid;

#[derive(Debug, Serialize)]
struct ToolEvent {
    ts: String,
    event_id: String,
    ecosystem: String,
    scope: String,
    command: String,
    args: Vec<String>,
    cwd: String,
    status: String,
    exit_code: Option<i32>,
    stderr_preview: String,
}

/// Returns unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

fn log_event(roots: &EnvRoots, event: &ToolEvent) {
    let Ok(mut f) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(roots.events_path())
    else {
        return;
    };
    if let Ok(line) = serde_json::to_string(event) {
        let _ = writeln!(f, "{}", line);
    }
}

/// Run an ecosystem tool, capture its output, and record the invocation.
///
/// Spawn failures surface as `IoError`; a nonzero exit is returned to the
/// caller inside `Output` for stage-specific error wrapping.
pub fn execute(
    roots: &EnvRoots,
    ecosystem: Ecosystem,
    scope: &str,
    command: &str,
    args: &[String],
    cwd: &Path,
) -> Result<Output, ForgeError> {
    println!(
        "    {} {} {}",
        "$".bright_black(),
        command,
        args.join(" ").bright_black()
    );

    let spawned = Command::new(command)
        .args(args)
        .current_dir(cwd)
        .output();

    let output = match spawned {
        Ok(out) => out,
        Err(e) => {
            log_event(
                roots,
                &ToolEvent {
                    ts: now_epoch_z(),
                    event_id: Ulid::new().to_string(),
                    ecosystem: ecosystem.as_str().to_string(),
                    scope: scope.to_string(),
                    command: command.to_string(),
                    args: args.to_vec(),
                    cwd: cwd.to_string_lossy().to_string(),
                    status: "spawn_error".to_string(),
                    exit_code: None,
                    stderr_preview: e.to_string(),
                },
            );
            return Err(ForgeError::IoError(e));
        }
    };

    let event = ToolEvent {
        ts: now_epoch_z(),
        event_id: Ulid::new().to_string(),
        ecosystem: ecosystem.as_str().to_string(),
        scope: scope.to_string(),
        command: command.to_string(),
        args: args.to_vec(),
        cwd: cwd.to_string_lossy().to_string(),
        status: if output.status.success() {
            "success".to_string()
        } else {
            "error".to_string()
        },
        exit_code: output.status.code(),
        stderr_preview: output::compact_line(&String::from_utf8_lossy(&output.stderr), 240),
    };
    log_event(roots, &event);

    Ok(output)
}
