use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use parking_lot::RwLock;
use serde::{de::IgnoredAny, Deserialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::models::{Catalog, CatalogSummary};

/// Thread-safe loader that discovers faction catalogs in a directory tree.
#[derive(Clone)]
pub struct CatalogLoader {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    root_path: PathBuf,
    summaries: Vec<CatalogSummary>,
    loaded: HashMap<PathBuf, Arc<Catalog>>,
}

impl CatalogLoader {
    /// Build a new loader rooted at the given catalog directory.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                root_path: root_path.into(),
                summaries: Vec::new(),
                loaded: HashMap::new(),
            })),
        }
    }

    /// Root directory being scanned.
    pub fn root_path(&self) -> PathBuf {
        self.inner.read().root_path.clone()
    }

    /// Point the loader at a new directory and drop every cached catalog.
    pub fn refresh(&self, root_path: impl Into<PathBuf>) {
        let mut inner = self.inner.write();
        inner.root_path = root_path.into();
        inner.summaries.clear();
        inner.loaded.clear();
    }

    /// Return all known catalogs, populating the cache on first use.
    pub fn catalogs(&self) -> Result<Vec<CatalogSummary>> {
        let mut inner = self.inner.write();
        if inner.summaries.is_empty() {
            inner.summaries = discover_catalogs(&inner.root_path)?;
        }
        Ok(inner.summaries.clone())
    }

    /// Filter catalogs using a case-insensitive substring search.
    pub fn catalogs_matching(&self, query: &str) -> Result<Vec<CatalogSummary>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.catalogs();
        }

        let catalogs = self.catalogs()?;
        Ok(catalogs
            .into_iter()
            .filter(|summary| {
                summary.faction.to_lowercase().contains(&needle)
                    || summary.game.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Find a catalog by faction name, ignoring case.
    pub fn find(&self, faction: &str) -> Result<Option<CatalogSummary>> {
        let wanted = faction.trim().to_lowercase();
        Ok(self
            .catalogs()?
            .into_iter()
            .find(|summary| summary.faction.to_lowercase() == wanted))
    }

    /// Parse (or return the cached) catalog behind `summary`.
    pub fn load(&self, summary: &CatalogSummary) -> Result<Arc<Catalog>> {
        if let Some(catalog) = self.inner.read().loaded.get(&summary.path) {
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(read_catalog(&summary.path)?);
        debug!(faction = %catalog.faction, units = catalog.units.len(), "catalog parsed");
        self.inner
            .write()
            .loaded
            .insert(summary.path.clone(), Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Find and load a catalog by faction name.
    pub fn load_faction(&self, faction: &str) -> Result<Arc<Catalog>> {
        let summary = self.find(faction)?.ok_or_else(|| {
            anyhow!(
                "no catalog for faction '{faction}' in {}",
                self.root_path().display()
            )
        })?;
        self.load(&summary)
    }
}

/// Public helper used by tests and tooling.
pub struct CatalogDiscovery;

impl CatalogDiscovery {
    /// Enumerate catalogs beneath `root_path`, sorted by game then faction.
    pub fn discover(root_path: impl AsRef<Path>) -> Result<Vec<CatalogSummary>> {
        discover_catalogs(root_path.as_ref())
    }
}

/// Read and parse one catalog file.
pub fn read_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut catalog: Catalog = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    if catalog.faction.trim().is_empty() {
        catalog.faction = file_stem(path);
    }
    Ok(catalog)
}

#[derive(Deserialize)]
struct CatalogHeader {
    #[serde(default)]
    game: String,
    #[serde(default)]
    faction: Option<String>,
    #[serde(default)]
    units: Vec<IgnoredAny>,
}

fn discover_catalogs(root: &Path) -> Result<Vec<CatalogSummary>> {
    if !root.is_dir() {
        warn!("Catalog directory {} does not exist", root.display());
        return Ok(Vec::new());
    }

    let mut catalogs = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        match build_summary(path) {
            Ok(summary) => catalogs.push(summary),
            Err(err) => warn!("Skipping {}: {err:#}", path.display()),
        }
    }

    catalogs.sort_by(|a, b| (&a.game, &a.faction).cmp(&(&b.game, &b.faction)));
    Ok(catalogs)
}

fn build_summary(path: &Path) -> Result<CatalogSummary> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let header: CatalogHeader =
        serde_json::from_str(&content).context("not a faction catalog")?;

    Ok(CatalogSummary {
        game: header.game.trim().to_string(),
        faction: header
            .faction
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| file_stem(path)),
        path: path.to_path_buf(),
        unit_count: header.units.len(),
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}
