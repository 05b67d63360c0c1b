//! Application configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` in the user's
//! config directory, then `ARMYBUILDER__*` environment variables.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{models::Ruleset, save::SaveManager};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "armybuilder";

/// Ruleset key used when a game has no ruleset of its own.
pub const DEFAULT_RULESET: &str = "default";

const DEFAULT_CONFIG: &str = r#"# Army builder configuration.

# Points limit used when a list does not specify one.
default_points = 1000

# Directory scanned for faction catalogs (*.json).
# catalog_dir = "/path/to/catalogs"

# Directory saved lists are written to.
# save_dir = "/path/to/saves"

[rulesets.default]
hero_point_threshold = 375
copy_point_threshold = 750
max_cost_ratio = 0.35
unit_point_threshold = 150
"#;

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory scanned for faction catalogs.
    pub catalog_dir: PathBuf,
    /// Directory saved lists are written to.
    pub save_dir: PathBuf,
    /// Points limit used when a list does not specify one.
    pub default_points: u32,
    /// Rulesets keyed by game name, plus `default`.
    #[serde(default)]
    pub rulesets: BTreeMap<String, Ruleset>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_root = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            catalog_dir: data_root.join(APP_DIR).join("catalogs"),
            save_dir: SaveManager::default_root(),
            default_points: 1000,
            rulesets: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Path of the user configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load configuration from the default locations.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration using `path` as the config file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default(
                "catalog_dir",
                defaults.catalog_dir.to_string_lossy().to_string(),
            )?
            .set_default("save_dir", defaults.save_dir.to_string_lossy().to_string())?
            .set_default("default_points", i64::from(defaults.default_points))?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("ARMYBUILDER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Ruleset for `game`, falling back to `default`, then to built-in values.
    ///
    /// Game names are compared case-insensitively.
    pub fn ruleset_for(&self, game: &str) -> Ruleset {
        let lookup = |name: &str| {
            self.rulesets
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, ruleset)| *ruleset)
        };
        lookup(game)
            .or_else(|| lookup(DEFAULT_RULESET))
            .unwrap_or_default()
    }
}

/// Write the default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "default configuration written");
    Ok(())
}
