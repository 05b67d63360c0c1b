//! Build a roster from a request file.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context as _, Result};
use armybuilder_core::{Roster, Selections};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

use super::Context;
use crate::report;

/// Build a roster from a request file
#[derive(Parser, Debug)]
pub struct Build {
    /// JSON request: `{name, faction, points?, units: [{unit, selections, combined?}]}`
    pub request: PathBuf,

    /// Override the request's points limit
    #[arg(long)]
    pub points: Option<u32>,

    /// Persist the resulting roster in the save directory
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
struct BuildRequest {
    name: String,
    faction: String,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    units: Vec<UnitRequest>,
}

#[derive(Debug, Deserialize)]
struct UnitRequest {
    unit: String,
    #[serde(default)]
    selections: Selections,
    #[serde(default)]
    combined: bool,
}

impl Build {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let content = fs::read_to_string(&self.request)
            .with_context(|| format!("failed to read {}", self.request.display()))?;
        let request: BuildRequest = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.request.display()))?;

        let catalog = ctx.loader.load_faction(&request.faction)?;
        let ruleset = ctx.config.ruleset_for(&catalog.game);
        let points = self
            .points
            .or(request.points)
            .unwrap_or(ctx.config.default_points);
        let mut roster = Roster::for_catalog(&catalog, request.name, points);

        let mut rejected = 0usize;
        for unit in &request.units {
            let Some(template) = catalog.entry(&unit.unit) else {
                warn!(unit = %unit.unit, "unknown unit, skipped");
                println!("! {}: unknown unit", unit.unit);
                rejected += 1;
                continue;
            };

            let candidate = match Roster::build_entry(template, &unit.selections, unit.combined) {
                Ok(candidate) => candidate,
                Err(err) => {
                    warn!(%err, "selection rejected");
                    println!("! {err}");
                    rejected += 1;
                    continue;
                }
            };

            let blocking: Vec<_> = roster
                .check_addition(&candidate, &ruleset)
                .into_iter()
                .filter(|violation| violation.is_blocking())
                .collect();
            if !blocking.is_empty() {
                for violation in &blocking {
                    println!("! {}: {violation}", candidate.name);
                }
                rejected += 1;
                continue;
            }

            roster.add(template, &unit.selections, unit.combined)?;
        }

        print!("{}", report::render_roster(&roster));
        let violations = roster.validate(&ruleset);
        print!("{}", report::render_violations(&violations));

        if self.save {
            let entry = ctx.saves.save(&roster)?;
            info!(path = %entry.path.display(), "roster exported");
            println!("Saved to {}", entry.path.display());
        }

        if rejected > 0 || !violations.is_empty() {
            bail!(
                "{} entries rejected, {} violation(s)",
                rejected,
                violations.len()
            );
        }
        Ok(())
    }
}
