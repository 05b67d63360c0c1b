//! Show the templates of one faction.

use anyhow::Result;
use clap::Parser;

use super::Context;
use crate::report;

/// Show the unit templates of a faction
#[derive(Parser, Debug)]
pub struct Units {
    /// Faction name (case-insensitive)
    pub faction: String,

    /// Also print the faction's rule and spell legend
    #[arg(long)]
    pub legend: bool,
}

impl Units {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let catalog = ctx.loader.load_faction(&self.faction)?;

        for template in &catalog.units {
            print!("{}", report::render_template(template));
        }
        if self.legend {
            print!("{}", report::render_legend(&catalog));
        }
        Ok(())
    }
}
