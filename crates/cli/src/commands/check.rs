//! Re-validate a saved roster against the configured ruleset.

use std::path::PathBuf;

use anyhow::{bail, Result};
use armybuilder_core::{save::read_export, Roster};
use clap::Parser;
use tracing::info;

use super::Context;
use crate::report;

/// Re-validate a saved roster
#[derive(Parser, Debug)]
pub struct Check {
    /// Path to a roster export
    pub path: PathBuf,

    /// Validate against this points limit instead of the saved one
    #[arg(long)]
    pub points: Option<u32>,
}

impl Check {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let mut roster = Roster::from_export(read_export(&self.path)?);
        if let Some(points) = self.points {
            roster.points = points;
        }
        let ruleset = ctx.config.ruleset_for(&roster.game);
        info!(name = %roster.name, game = %roster.game, points = roster.points, "checking roster");

        print!("{}", report::render_roster(&roster));
        let violations = roster.validate(&ruleset);
        print!("{}", report::render_violations(&violations));

        if !violations.is_empty() {
            bail!("{} has {} violation(s)", roster.name, violations.len());
        }
        Ok(())
    }
}
