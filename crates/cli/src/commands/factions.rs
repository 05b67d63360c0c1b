//! List faction catalogs found in the catalog directory.

use anyhow::Result;
use clap::Parser;

use super::Context;

/// List discovered faction catalogs
#[derive(Parser, Debug)]
pub struct Factions {
    /// Only show catalogs whose game or faction contains this text
    #[arg(long, short)]
    pub query: Option<String>,
}

impl Factions {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let catalogs = ctx
            .loader
            .catalogs_matching(self.query.as_deref().unwrap_or_default())?;

        if catalogs.is_empty() {
            println!(
                "No catalogs found in {}",
                ctx.loader.root_path().display()
            );
            return Ok(());
        }

        for summary in catalogs {
            println!(
                "{} ({} units) {}",
                summary.display_name(),
                summary.unit_count,
                summary.path.display()
            );
        }
        Ok(())
    }
}
