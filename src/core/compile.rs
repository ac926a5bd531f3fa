//! The compile pipeline.
//!
//! Stage order matters: sanitize and classify work on the loaded manifest,
//! bootstrap prepares only the roots that are needed, installation must
//! fully succeed (or be explicitly skipped) before any command is rewritten,
//! and the output file is written only after the whole pipeline has run.
//! Fatal errors therefore never leave a half-compiled manifest on disk.

use crate::core::classify::{self, EntryPlan};
use crate::core::config::{self, CompilerConfig};
use crate::core::ecosystem::EnvRoots;
use crate::core::error::ForgeError;
use crate::core::install;
use crate::core::manifest::Manifest;
use crate::core::output;
use crate::core::resolve;
use crate::core::sanitize;
use crate::core::validate;
use colored::Colorize;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Skip install steps; the resolver assumes packages are already present.
    pub skip_install: bool,
}

/// What a compile run did, for the final summary and for tests.
#[derive(Debug)]
pub struct CompileReport {
    pub servers: usize,
    pub node_installed: usize,
    pub python_installed: usize,
    /// Specifiers whose resolved path does not exist on disk.
    pub unresolved: Vec<String>,
    /// Placeholder variables unset in the ambient environment.
    pub missing_env: Vec<String>,
    pub output: PathBuf,
}

fn rewrite_commands(
    manifest: &mut Manifest,
    plans: &[EntryPlan],
    roots: &EnvRoots,
) -> Vec<String> {
    let mut unresolved = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for plan in plans {
        let Some(c) = &plan.classified else { continue };
        let resolved = resolve::resolve_binary(roots, c.ecosystem, &c.specifier);
        if !resolved.exists && seen.insert(c.specifier.clone()) {
            unresolved.push(c.specifier.clone());
        }
        if let Some(entry) = manifest.servers.get_mut(&plan.server) {
            entry.command = resolved.path.to_string_lossy().into_owned();
            entry.args = c.residual_args.clone();
        }
    }

    unresolved.sort();
    unresolved
}

/// Compile `input` into `output`.
pub fn compile(
    input: &Path,
    output: &Path,
    opts: &CompileOptions,
) -> Result<CompileReport, ForgeError> {
    let base = input.parent().unwrap_or(Path::new(".")).to_path_buf();
    let config: CompilerConfig = config::load_config(&base);

    println!("{} Reading manifest {}", "▸".bright_cyan(), input.display());
    let mut manifest = Manifest::load(input)?;

    sanitize::sanitize_manifest(&mut manifest);
    let (plans, deps) = classify::classify_manifest(&manifest);

    let roots = EnvRoots::resolve(&config.env_dir, &base);
    install::bootstrap(&roots, &config, &deps)?;
    let summary = install::install_all(&roots, &config, &deps, opts.skip_install)?;
    if opts.skip_install && !deps.is_empty() {
        println!(
            "{} Skipping install of {} specifier(s); assuming packages are present",
            "▸".bright_cyan(),
            deps.distinct_count()
        );
    }

    let unresolved = rewrite_commands(&mut manifest, &plans, &roots);
    if !unresolved.is_empty() {
        println!(
            "{} {} package binar{} not found on disk: {}",
            "⚠".bright_yellow(),
            unresolved.len(),
            if unresolved.len() == 1 { "y" } else { "ies" },
            output::preview_messages(&unresolved, 5, 60)
        );
        println!("    Best-guess paths were written; adjust them manually if needed.");
    }

    let missing_env = validate::missing_in(&manifest, &validate::ambient_env());
    if !missing_env.is_empty() {
        println!(
            "{} {} environment variable(s) are not set; set them before deploying:",
            "⚠".bright_yellow(),
            missing_env.len()
        );
        for var in &missing_env {
            println!("    {} {}", "-".bright_yellow(), var);
        }
    }

    manifest.save(output)?;

    Ok(CompileReport {
        servers: manifest.servers.len(),
        node_installed: summary.node,
        python_installed: summary.python,
        unresolved,
        missing_env,
        output: output.to_path_buf(),
    })
}
