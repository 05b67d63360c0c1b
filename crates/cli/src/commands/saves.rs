//! List saved rosters.

use anyhow::Result;
use clap::Parser;

use super::Context;

/// List saved rosters, newest first
#[derive(Parser, Debug)]
pub struct Saves {
    /// Only show the most recent save
    #[arg(long)]
    pub latest: bool,
}

impl Saves {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let entries = if self.latest {
            ctx.saves.latest()?.into_iter().collect()
        } else {
            ctx.saves.entries()?
        };

        if entries.is_empty() {
            println!("No saved rosters in {}", ctx.saves.root().display());
            return Ok(());
        }

        for entry in entries {
            println!(
                "{}  {} ({} · {}) {}/{} pts  {}",
                entry.updated_at.format("%Y-%m-%d %H:%M"),
                entry.name,
                entry.game,
                entry.faction,
                entry.total_cost,
                entry.points,
                entry.path.display()
            );
        }
        Ok(())
    }
}
