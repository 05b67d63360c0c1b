//! The roster value: an ordered list of resolved entries under a points limit.

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    engine::{self, Selections, Violation},
    error::EngineError,
    models::{Catalog, CatalogEntry, RosterEntry, Ruleset},
    save::RosterExport,
};

/// A player's army list.
///
/// Entries are only created through [`Roster::add`] (or its catalog lookup
/// variant) and never edited afterwards; they can be reordered or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    /// List name.
    pub name: String,
    /// Game system.
    pub game: String,
    /// Faction the list is built from.
    pub faction: String,
    /// Points limit.
    pub points: u32,
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Empty roster.
    pub fn new(
        name: impl Into<String>,
        game: impl Into<String>,
        faction: impl Into<String>,
        points: u32,
    ) -> Self {
        Self {
            name: name.into(),
            game: game.into(),
            faction: faction.into(),
            points,
            entries: Vec::new(),
        }
    }

    /// Empty roster for the faction described by `catalog`.
    pub fn for_catalog(catalog: &Catalog, name: impl Into<String>, points: u32) -> Self {
        Self::new(name, catalog.game.clone(), catalog.faction.clone(), points)
    }

    /// Entries in list order.
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the roster has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of entry costs, saturating at `u32::MAX`.
    pub fn total_cost(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.final_cost))
    }

    /// Resolve, cost and aggregate `template` into a roster entry without
    /// touching any roster.
    pub fn build_entry(
        template: &CatalogEntry,
        selections: &Selections,
        combined: bool,
    ) -> Result<RosterEntry, EngineError> {
        let parts = engine::resolve(template, selections, combined)?;
        let final_cost = engine::cost(template, &parts, combined);
        let aggregated = engine::aggregate_rules(template, &parts);

        Ok(RosterEntry {
            name: template.name.clone(),
            kind: template.kind,
            final_cost,
            quality: template.quality,
            defense: template.defense,
            size: engine::size(template, parts.combined),
            rules: aggregated.rules,
            mount_rules: aggregated.mount_rules,
            selected_options: parts.options,
            mount: parts.mount,
            weapons: parts.weapons,
            coriace: aggregated.coriace,
            combined: parts.combined,
            unit_detail: template.unit_detail.clone(),
        })
    }

    /// Add `template` with `selections`. On error the roster is unchanged.
    pub fn add(
        &mut self,
        template: &CatalogEntry,
        selections: &Selections,
        combined: bool,
    ) -> Result<&RosterEntry, EngineError> {
        let entry = Self::build_entry(template, selections, combined)?;
        info!(unit = %entry.name, cost = entry.final_cost, "entry added");
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Look `unit` up in `catalog` and add it.
    pub fn add_from_catalog(
        &mut self,
        catalog: &Catalog,
        unit: &str,
        selections: &Selections,
        combined: bool,
    ) -> Result<&RosterEntry, EngineError> {
        let template = catalog
            .entry(unit)
            .ok_or_else(|| EngineError::UnknownUnit(unit.to_string()))?;
        self.add(template, selections, combined)
    }

    /// Remove the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Option<RosterEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        info!(unit = %entry.name, "entry removed");
        Some(entry)
    }

    /// Move the entry at `from` to position `to`.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        debug!(from, to, "entry moved");
        true
    }

    /// Violations of the roster as it stands.
    pub fn validate(&self, ruleset: &Ruleset) -> Vec<Violation> {
        engine::validate(&self.entries, self.points, ruleset, None)
    }

    /// Violations the roster would have once `candidate` is appended.
    pub fn check_addition(&self, candidate: &RosterEntry, ruleset: &Ruleset) -> Vec<Violation> {
        let mut prospective = self.entries.clone();
        prospective.push(candidate.clone());
        engine::validate(&prospective, self.points, ruleset, None)
    }

    /// Entries with heroes first, list order kept otherwise.
    pub fn display_order(&self) -> Vec<&RosterEntry> {
        let mut ordered: Vec<_> = self.entries.iter().collect();
        ordered.sort_by_key(|entry| !entry.is_hero());
        ordered
    }

    /// Snapshot for persistence.
    pub fn export(&self) -> RosterExport {
        RosterExport {
            name: self.name.clone(),
            game: self.game.clone(),
            faction: self.faction.clone(),
            points: self.points,
            total_cost: self.total_cost(),
            army_list: self.entries.clone(),
            date: Utc::now(),
        }
    }

    /// Rebuild a roster from a persisted export.
    ///
    /// Entries are taken as saved; they are not re-resolved against the catalog.
    pub fn from_export(export: RosterExport) -> Self {
        Self {
            name: export.name,
            game: export.game,
            faction: export.faction,
            points: export.points,
            entries: export.army_list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;
    use serde_json::json;

    fn catalog() -> Catalog {
        serde_json::from_value(json!({
            "game": "Age of Fantasy",
            "faction": "Royaume",
            "units": [
                {
                    "name": "Seigneur",
                    "type": "hero",
                    "base_cost": 70,
                    "quality": 3,
                    "defense": 3,
                    "special_rules": ["Héros", "Coriace(3)"],
                    "weapons": [{"name": "Épée", "attacks": 4}],
                    "upgrade_groups": [
                        {"group": "Monture", "type": "mount", "options": [
                            {"name": "Destrier", "cost": 25,
                             "mount": {"special_rules": ["Rapide", "Coriace(+1)"]}}
                        ]}
                    ]
                },
                {
                    "name": "Chevaliers",
                    "type": "unit",
                    "base_cost": 50,
                    "quality": 3,
                    "defense": 2,
                    "size": 5,
                    "special_rules": ["Impact(1)"],
                    "weapons": [{"name": "Lance", "attacks": 1, "special_rules": ["Impact(1)"]}],
                    "upgrade_groups": [
                        {"group": "Weapon", "type": "weapon", "options": [
                            {"name": "Masses", "cost": 10,
                             "weapon": {"name": "Masse", "attacks": 2}}
                        ]},
                        {"group": "Améliorations", "type": "multiple", "options": [
                            {"name": "Bannière", "cost": 5, "special_rules": ["Bannière"]}
                        ]}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn add_snapshots_resolved_values() {
        let catalog = catalog();
        let mut roster = Roster::for_catalog(&catalog, "Test", 1000);

        let selections = Selections::new()
            .choose("Weapon", "Masses")
            .choose("Améliorations", "Bannière");
        let entry = roster
            .add_from_catalog(&catalog, "Chevaliers", &selections, true)
            .unwrap()
            .clone();

        assert_eq!(entry.final_cost, (50 + 10) * 2 + 5);
        assert_eq!(entry.size, 10);
        assert!(entry.combined);
        assert_eq!(entry.weapons[0].name, "Masse");
        assert_eq!(entry.rules, ["Bannière", "Impact(1)"]);
        assert_eq!(roster.total_cost(), entry.final_cost);
    }

    #[test]
    fn hero_mount_rules_stay_separate() {
        let catalog = catalog();
        let mut roster = Roster::for_catalog(&catalog, "Test", 1000);
        let selections = Selections::new().choose("Monture", "Destrier");
        let entry = roster
            .add_from_catalog(&catalog, "Seigneur", &selections, true)
            .unwrap();

        assert_eq!(entry.kind, UnitKind::Hero);
        assert_eq!(entry.final_cost, 95);
        assert_eq!(entry.size, 1);
        assert!(!entry.combined);
        assert_eq!(entry.rules, ["Coriace(3)", "Héros"]);
        assert_eq!(entry.mount_rules, ["Coriace(+1)", "Rapide"]);
        assert_eq!(entry.coriace, Some(4));
    }

    #[test]
    fn unknown_option_leaves_roster_untouched() {
        let catalog = catalog();
        let mut roster = Roster::for_catalog(&catalog, "Test", 1000);
        roster
            .add_from_catalog(&catalog, "Seigneur", &Selections::new(), false)
            .unwrap();
        let before = roster.clone();

        let selections = Selections::new().choose("Weapon", "Nonexistent");
        let err = roster
            .add_from_catalog(&catalog, "Chevaliers", &selections, false)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownOption { .. }));
        assert_eq!(roster, before);

        let err = roster
            .add_from_catalog(&catalog, "Dragon", &Selections::new(), false)
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownUnit("Dragon".into()));
        assert_eq!(roster, before);
    }

    #[test]
    fn remove_and_reorder() {
        let catalog = catalog();
        let mut roster = Roster::for_catalog(&catalog, "Test", 1000);
        roster
            .add_from_catalog(&catalog, "Chevaliers", &Selections::new(), false)
            .unwrap();
        roster
            .add_from_catalog(&catalog, "Seigneur", &Selections::new(), false)
            .unwrap();

        let order: Vec<_> = roster
            .display_order()
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(order, ["Seigneur", "Chevaliers"]);

        assert!(roster.move_entry(1, 0));
        assert_eq!(roster.entries()[0].name, "Seigneur");
        assert!(!roster.move_entry(0, 5));

        let removed = roster.remove(0).unwrap();
        assert_eq!(removed.name, "Seigneur");
        assert_eq!(roster.len(), 1);
        assert!(roster.remove(3).is_none());
    }

    #[test]
    fn check_addition_counts_the_candidate() {
        let catalog = catalog();
        let mut roster = Roster::for_catalog(&catalog, "Test", 300);
        let template = catalog.entry("Seigneur").unwrap();
        roster.add(template, &Selections::new(), false).unwrap();

        let candidate = Roster::build_entry(template, &Selections::new(), false).unwrap();
        let violations = roster.check_addition(&candidate, &Ruleset::default());
        assert!(violations.contains(&Violation::TooManyHeroes { count: 2, max: 0 }));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn oversized_entries_saturate_the_total() {
        let mut catalog = catalog();
        catalog.units[1].base_cost = 3_000_000_000;
        let mut roster = Roster::for_catalog(&catalog, "Test", 1000);
        for _ in 0..2 {
            roster
                .add_from_catalog(&catalog, "Chevaliers", &Selections::new(), true)
                .unwrap();
        }
        assert_eq!(roster.entries()[0].final_cost, u32::MAX);
        assert_eq!(roster.total_cost(), u32::MAX);
        let violations = roster.validate(&Ruleset::default());
        assert!(violations.contains(&Violation::BudgetExceeded {
            total: 2 * u64::from(u32::MAX),
            limit: 1000
        }));
    }

    #[test]
    fn export_round_trip_keeps_entries() {
        let catalog = catalog();
        let mut roster = Roster::for_catalog(&catalog, "Test", 1000);
        roster
            .add_from_catalog(&catalog, "Chevaliers", &Selections::new(), false)
            .unwrap();

        let export = roster.export();
        assert_eq!(export.total_cost, 50);
        assert_eq!(export.faction, "Royaume");
        assert_eq!(Roster::from_export(export), roster);
    }
}
