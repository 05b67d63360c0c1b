#![warn(clippy::all, missing_docs)]

//! Core domain logic for the army list builder.
//!
//! This crate hosts the catalog and roster data models, the rules engine
//! (part resolution, costing, rule aggregation, roster validation),
//! configuration handling, catalog discovery, and roster persistence used
//! by the command-line frontend.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod roster;
pub mod save;

pub use catalog::CatalogLoader;
pub use config::AppConfig;
pub use engine::{
    aggregate_rules, cost, resolve, validate, AggregatedRules, ResolvedParts, Selections,
    Violation,
};
pub use error::{EngineError, MalformedCoriaceRule};
pub use models::{
    Catalog, CatalogEntry, CatalogSummary, GroupKind, Mount, RosterEntry, Ruleset, UnitKind,
    UpgradeGroup, UpgradeOption, Weapon, WeaponMode,
};
pub use roster::Roster;
pub use save::{RosterExport, SaveEntry, SaveManager};
