//! Subcommand implementations.

mod build;
mod check;
mod factions;
mod saves;
mod units;

pub use build::Build;
pub use check::Check;
pub use factions::Factions;
pub use saves::Saves;
pub use units::Units;

use armybuilder_core::{AppConfig, CatalogLoader, SaveManager};

/// Shared state handed to every command.
pub struct Context {
    pub config: AppConfig,
    pub loader: CatalogLoader,
    pub saves: SaveManager,
}

impl Context {
    pub fn new(config: AppConfig) -> Self {
        let loader = CatalogLoader::new(config.catalog_dir.clone());
        let saves = SaveManager::new(config.save_dir.clone());
        Self {
            config,
            loader,
            saves,
        }
    }
}
