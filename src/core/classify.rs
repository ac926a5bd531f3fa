//! Dependency classification for manifest entries.
//!
//! Inspects each entry's launch command and extracts the package specifier it
//! would resolve at runtime. Classification never mutates the manifest: each
//! entry gets an explicit [`EntryPlan`] record, and the command rewrite is
//! applied later from those records, after installation has succeeded.

use crate::core::ecosystem::{Ecosystem, NPX_AUTO_CONFIRM};
use crate::core::manifest::Manifest;
use std::collections::BTreeMap;

/// Classification result for one entry that invokes a package runner.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub ecosystem: Ecosystem,
    pub specifier: String,
    /// Arguments left after stripping the runner prefix; these become the
    /// entry's final `args`.
    pub residual_args: Vec<String>,
}

/// Per-entry plan record: the server name plus its classification, if any.
///
/// Unclassified entries (direct binary invocations, unrecognized launchers)
/// pass through the pipeline untouched.
#[derive(Debug, Clone)]
pub struct EntryPlan {
    pub server: String,
    pub classified: Option<Classified>,
}

/// Distinct specifiers requested per ecosystem, with the servers that asked
/// for each. Multiple servers requesting one specifier install it once.
#[derive(Debug, Default)]
pub struct DependencySet {
    pub node: BTreeMap<String, Vec<String>>,
    pub python: BTreeMap<String, Vec<String>>,
}

impl DependencySet {
    fn record(&mut self, eco: Ecosystem, specifier: &str, server: &str) {
        let map = match eco {
            Ecosystem::Node => &mut self.node,
            Ecosystem::Python => &mut self.python,
        };
        map.entry(specifier.to_string())
            .or_default()
            .push(server.to_string());
    }

    pub fn for_ecosystem(&self, eco: Ecosystem) -> &BTreeMap<String, Vec<String>> {
        match eco {
            Ecosystem::Node => &self.node,
            Ecosystem::Python => &self.python,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty() && self.python.is_empty()
    }

    pub fn distinct_count(&self) -> usize {
        self.node.len() + self.python.len()
    }
}

/// Classify a single entry's command line.
pub fn classify_command(command: &str, args: &[String]) -> Option<Classified> {
    if command == Ecosystem::Node.runner()
        && args.len() >= 2
        && args[0] == NPX_AUTO_CONFIRM
    {
        return Some(Classified {
            ecosystem: Ecosystem::Node,
            specifier: args[1].clone(),
            residual_args: args[2..].to_vec(),
        });
    }
    if command == Ecosystem::Python.runner() && !args.is_empty() {
        return Some(Classified {
            ecosystem: Ecosystem::Python,
            specifier: args[0].clone(),
            residual_args: args[1..].to_vec(),
        });
    }
    None
}

/// Walk the manifest and produce plan records plus the deduplicated
/// specifier sets.
pub fn classify_manifest(manifest: &Manifest) -> (Vec<EntryPlan>, DependencySet) {
    let mut plans = Vec::with_capacity(manifest.servers.len());
    let mut deps = DependencySet::default();

    for (name, entry) in &manifest.servers {
        let classified = classify_command(&entry.command, &entry.args);
        if let Some(c) = &classified {
            deps.record(c.ecosystem, &c.specifier, name);
        }
        plans.push(EntryPlan {
            server: name.clone(),
            classified,
        });
    }

    (plans, deps)
}
