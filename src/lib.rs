//! mcpforge: Ahead-Of-Time compiler for MCP server manifests
//!
//! **mcpforge turns launch-time package resolution into compile-time work.**
//!
//! An uncompiled manifest starts servers through ecosystem runners (`npx -y
//! <pkg>`, `uvx <pkg>`), paying npm/PyPI resolution and download latency on
//! every launch. Compiling pre-installs every referenced package into an
//! isolated root and rewrites each entry to invoke the local binary
//! directly, so servers start fast and deterministically without touching a
//! registry at runtime.
//!
//! # Pipeline
//!
//! 1. Load the manifest (`mcpServers` table; unknown fields pass through)
//! 2. Sanitize env blocks: literal secrets become `${VAR}` placeholders
//! 3. Classify entries and collect the distinct package specifiers
//! 4. Bootstrap the isolated install roots (idempotent, marker-gated)
//! 5. Install every specifier, batched per ecosystem (fatal on any failure)
//! 6. Rewrite classified entries to resolved local binary paths
//! 7. Warn about unset placeholder variables, then write the output
//!
//! A standalone strict pre-flight (`validate-env`) checks that every
//! placeholder variable is set and not still a template value, without
//! compiling anything.
//!
//! # Examples
//!
//! ```bash
//! # Compile a manifest into locally-launchable form
//! mcpforge compile --input mcp-servers.json --output mcp-compiled.json
//!
//! # Recompile quickly after a one-time install
//! mcpforge compile --skip-install
//!
//! # Pre-deployment check of env-var placeholders
//! mcpforge validate-env --input mcp-servers.json
//! ```
//!
//! # Crate Structure
//!
//! - [`core::manifest`]: typed manifest model with round-trip fidelity
//! - [`core::classify`]: runner recognition and specifier collection
//! - [`core::install`]: idempotent bootstrap + batched installs
//! - [`core::resolve`]: descriptor-first binary resolution
//! - [`core::validate`]: warn and strict placeholder validation

pub mod core;

use crate::core::compile::{self, CompileOptions};
use crate::core::error::ForgeError;
use crate::core::validate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "mcpforge",
    version = env!("CARGO_PKG_VERSION"),
    about = "AOT compiler for MCP server manifests"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct CompileCli {
    /// Source manifest.
    #[clap(long, default_value = "mcp-servers.json")]
    input: PathBuf,
    /// Compiled output.
    #[clap(long, default_value = "mcp-compiled.json")]
    output: PathBuf,
    /// Skip install steps and only rewrite commands into local binary paths.
    #[clap(long)]
    skip_install: bool,
}

#[derive(clap::Args, Debug)]
struct ValidateEnvCli {
    /// Manifest whose placeholders are checked.
    #[clap(long, default_value = "mcp-servers.json")]
    input: PathBuf,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    format: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a manifest: pre-install packages, rewrite commands, redact secrets
    #[clap(name = "compile", visible_alias = "c")]
    Compile(CompileCli),

    /// Strict pre-flight check of ${VAR} placeholders (does not compile)
    #[clap(name = "validate-env", visible_alias = "v")]
    ValidateEnv(ValidateEnvCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}

pub fn run() -> Result<(), ForgeError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::ValidateEnv(validate_cli) => {
            validate::run_strict(&validate_cli.input, &validate_cli.format)
        }
        Command::Compile(compile_cli) => {
            let opts = CompileOptions {
                skip_install: compile_cli.skip_install,
            };
            let report = compile::compile(&compile_cli.input, &compile_cli.output, &opts)?;

            println!();
            println!(
                "{} Compiled {} server(s) → {}",
                "✓".bright_green(),
                report.servers,
                report.output.display()
            );
            if report.node_installed + report.python_installed > 0 {
                println!(
                    "    {} node and {} python package(s) installed",
                    report.node_installed, report.python_installed
                );
            }
            println!("    Point your MCP host at the compiled manifest to launch.");
            Ok(())
        }
    }
}
