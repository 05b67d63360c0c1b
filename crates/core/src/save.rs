//! Roster export persistence.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{models::RosterEntry, roster::Roster};

/// Directory under the platform data directory used for saved lists.
pub const DEFAULT_SAVE_DIR: &str = "armybuilder/saves";

/// Metadata describing a persisted roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEntry {
    /// Absolute path to the export file on disk.
    pub path: PathBuf,
    /// List name.
    pub name: String,
    /// Game system of the list.
    pub game: String,
    /// Faction of the list.
    pub faction: String,
    /// Points limit.
    pub points: u32,
    /// Total cost when saved.
    pub total_cost: u32,
    /// Timestamp of the export.
    pub updated_at: DateTime<Utc>,
}

/// Serialized roster, the document written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterExport {
    /// List name.
    pub name: String,
    /// Game system.
    #[serde(default)]
    pub game: String,
    /// Faction.
    #[serde(default)]
    pub faction: String,
    /// Points limit.
    pub points: u32,
    /// Sum of entry costs.
    pub total_cost: u32,
    /// Entries in list order.
    #[serde(default)]
    pub army_list: Vec<RosterEntry>,
    /// Export timestamp.
    pub date: DateTime<Utc>,
}

impl RosterExport {
    fn entry(&self, path: PathBuf) -> SaveEntry {
        SaveEntry {
            path,
            name: self.name.clone(),
            game: self.game.clone(),
            faction: self.faction.clone(),
            points: self.points,
            total_cost: self.total_cost,
            updated_at: self.date,
        }
    }
}

/// Manager responsible for loading and writing roster exports.
pub struct SaveManager {
    root: PathBuf,
}

impl SaveManager {
    /// Create a new manager rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location under the user's data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SAVE_DIR)
    }

    /// Directory the manager writes to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return all known saves sorted by timestamp (most recent first).
    pub fn entries(&self) -> Result<Vec<SaveEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).context("failed to read save directory")? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match read_export(entry.path()) {
                Ok(export) => entries.push(export.entry(entry.path())),
                Err(err) => {
                    warn!("Failed to read save {:?}: {err}", entry.path());
                }
            }
        }

        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    /// Export `roster` to a new file and return the resulting entry.
    pub fn save(&self, roster: &Roster) -> Result<SaveEntry> {
        let export = roster.export();
        let file_name = format!(
            "{}_{}.json",
            sanitize_component(&export.name),
            export.date.format("%Y%m%d%H%M%S%3f")
        );
        let path = self.root.join(file_name);
        write_export(&path, &export)?;
        info!(name = %export.name, path = %path.display(), "roster saved");
        Ok(export.entry(path))
    }

    /// Overwrite an existing save with the current state of `roster`.
    pub fn update(&self, entry: &SaveEntry, roster: &Roster) -> Result<SaveEntry> {
        let export = roster.export();
        write_export(&entry.path, &export)?;
        Ok(export.entry(entry.path.clone()))
    }

    /// Load the export behind `entry`.
    pub fn load(&self, entry: &SaveEntry) -> Result<RosterExport> {
        read_export(&entry.path)
    }

    /// Load most recent save entry, if any.
    pub fn latest(&self) -> Result<Option<SaveEntry>> {
        let entries = self.entries()?;
        Ok(entries.into_iter().next())
    }

    /// Delete the file behind `entry`.
    pub fn delete(&self, entry: &SaveEntry) -> Result<()> {
        fs::remove_file(&entry.path)
            .with_context(|| format!("failed to delete {}", entry.path.display()))
    }
}

/// Read an export document from any path.
pub fn read_export(path: impl AsRef<Path>) -> Result<RosterExport> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let export = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(export)
}

fn write_export(path: &Path, export: &RosterExport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialised = serde_json::to_vec_pretty(export)?;
    fs::write(path, serialised).with_context(|| format!("failed to write {}", path.display()))
}

fn sanitize_component(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
            result.push(ch);
        }
    }
    if result.is_empty() {
        "roster".to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::Selections, models::Catalog};
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_roster() -> Result<Roster> {
        let catalog: Catalog = serde_json::from_value(json!({
            "game": "Grimdark Future",
            "faction": "Orques",
            "units": [{
                "name": "Boyz",
                "type": "unit",
                "base_cost": 60,
                "quality": 5,
                "defense": 5,
                "size": 10,
                "special_rules": ["Furieux"],
                "weapons": [{"name": "Kikoup", "attacks": 1}]
            }]
        }))?;
        let mut roster = Roster::for_catalog(&catalog, "Waaagh!", 750);
        roster.add_from_catalog(&catalog, "Boyz", &Selections::new(), false)?;
        Ok(roster)
    }

    #[test]
    fn save_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let manager = SaveManager::new(dir.path().join("saves"));
        let roster = sample_roster()?;

        let entry = manager.save(&roster)?;
        assert!(entry.path.exists());
        assert_eq!(entry.total_cost, 60);

        let entries = manager.entries()?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].faction, "Orques");
        assert_eq!(entries[0].name, "Waaagh!");

        let export = manager.load(&entries[0])?;
        assert_eq!(export.army_list.len(), 1);
        assert_eq!(Roster::from_export(export), roster);

        let mut bigger = roster.clone();
        bigger.points = 1000;
        let updated = manager.update(&entries[0], &bigger)?;
        assert!(updated.updated_at >= entries[0].updated_at);
        assert_eq!(manager.load(&updated)?.points, 1000);

        let latest = manager.latest()?.expect("expected latest entry");
        assert_eq!(latest.path, entry.path);

        manager.delete(&latest)?;
        assert!(manager.entries()?.is_empty());
        Ok(())
    }

    #[test]
    fn export_shape_matches_list_format() -> Result<()> {
        let export = sample_roster()?.export();
        let value = serde_json::to_value(&export)?;
        for key in ["name", "game", "faction", "points", "total_cost", "army_list", "date"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        let unit = &value["army_list"][0];
        assert_eq!(unit["type"], json!("unit"));
        assert_eq!(unit["cost"], json!(60));
        assert_eq!(unit["special_rules"], json!(["Furieux"]));
        assert!(unit.get("coriace").is_none());
        Ok(())
    }

    #[test]
    fn unreadable_files_are_skipped() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("broken.json"), "{ not json")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;
        let manager = SaveManager::new(dir.path());
        assert!(manager.entries()?.is_empty());
        Ok(())
    }

    #[test]
    fn sanitize_creates_safe_filenames() {
        let name = sanitize_component("Hello World!* 18??");
        assert_eq!(name, "HelloWorld18");
        assert_eq!(sanitize_component("!!!"), "roster");
    }
}
