//! Part resolution: turns group selections into weapons, mount and options.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{
    error::EngineError,
    models::{CatalogEntry, GroupKind, Mount, UpgradeGroup, UpgradeOption, Weapon, WeaponMode},
};

/// Chosen option names per upgrade group.
///
/// Deserializes from `{"group": "option"}` or `{"group": ["a", "b"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selections(BTreeMap<String, Vec<String>>);

impl Selections {
    /// Empty selection: base loadout, no upgrades.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one option to a group's choices.
    pub fn choose(mut self, group: impl Into<String>, option: impl Into<String>) -> Self {
        self.0.entry(group.into()).or_default().push(option.into());
        self
    }

    /// Groups and the names chosen in each.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// True when no group has a choice.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|names| names.is_empty())
    }
}

impl<'de> Deserialize<'de> for Selections {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Choice {
            Many(Vec<String>),
            One(String),
        }

        let raw: BTreeMap<String, Option<Choice>> = BTreeMap::deserialize(deserializer)?;
        Ok(Selections(
            raw.into_iter()
                .map(|(group, choice)| {
                    let names = match choice {
                        Some(Choice::Many(names)) => names,
                        Some(Choice::One(name)) => vec![name],
                        None => Vec::new(),
                    };
                    (group, names)
                })
                .collect(),
        ))
    }
}

/// Everything a selection resolves to, before costing and rule aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParts {
    /// Weapons after applying the weapon group, followed by role weapons.
    pub weapons: Vec<Weapon>,
    /// Selected mount, if any.
    pub mount: Option<Mount>,
    /// Selected options per group, mount group excluded.
    pub options: BTreeMap<String, Vec<UpgradeOption>>,
    /// Cost of the weapon group choice.
    pub weapon_cost: u32,
    /// Cost of the mount choice.
    pub mount_cost: u32,
    /// Cost of every other selected option.
    pub upgrades_cost: u32,
    /// Combined mode after discarding it for heroes.
    pub combined: bool,
}

impl ResolvedParts {
    /// `weapon + mount + upgrades`, saturating.
    pub fn extra_cost(&self) -> u32 {
        self.weapon_cost
            .saturating_add(self.mount_cost)
            .saturating_add(self.upgrades_cost)
    }
}

/// Resolve `selections` against `entry`.
///
/// Fails without side effects on the first selection that names an unknown
/// group or option, or that picks several options in a single-choice group.
pub fn resolve(
    entry: &CatalogEntry,
    selections: &Selections,
    combined: bool,
) -> Result<ResolvedParts, EngineError> {
    let mut parts = ResolvedParts {
        weapons: entry.weapons.clone(),
        combined: combined && !entry.is_hero(),
        ..ResolvedParts::default()
    };
    if combined && entry.is_hero() {
        debug!(unit = %entry.name, "combined mode ignored for hero");
    }
    // Role weapons go after the loadout so a weapon group never replaces them.
    let mut role_weapons: Vec<Weapon> = Vec::new();

    for (group_name, names) in selections.iter() {
        let group = entry
            .group(group_name)
            .ok_or_else(|| EngineError::UnknownGroup {
                unit: entry.name.clone(),
                group: group_name.clone(),
            })?;
        let chosen = pick_options(entry, group, names)?;
        let Some(first) = chosen.first() else {
            continue;
        };

        match group.kind {
            GroupKind::Weapon => {
                parts.weapon_cost = parts.weapon_cost.saturating_add(first.cost);
                if !first.weapon.is_empty() {
                    match entry.weapon_mode {
                        WeaponMode::Replace => parts.weapons = first.weapon.clone(),
                        WeaponMode::Append => parts.weapons.extend(first.weapon.iter().cloned()),
                    }
                }
                parts
                    .options
                    .insert(group.name.clone(), vec![(*first).clone()]);
            }
            GroupKind::Mount => {
                parts.mount_cost = parts.mount_cost.saturating_add(first.cost);
                parts.mount = Some(mount_from_option(first));
            }
            GroupKind::Multiple | GroupKind::Single => {
                parts.upgrades_cost = chosen
                    .iter()
                    .fold(parts.upgrades_cost, |total, option| {
                        total.saturating_add(option.cost)
                    });
                for role in chosen.iter().filter(|option| !option.weapon.is_empty()) {
                    debug!(unit = %entry.name, role = %role.name, "role weapons added");
                    role_weapons.extend(role.weapon.iter().cloned());
                }
                parts.options.insert(
                    group.name.clone(),
                    chosen.iter().map(|option| (*option).clone()).collect(),
                );
            }
        }
    }

    parts.weapons.extend(role_weapons);

    debug!(
        unit = %entry.name,
        weapon_cost = parts.weapon_cost,
        mount_cost = parts.mount_cost,
        upgrades_cost = parts.upgrades_cost,
        "selections resolved"
    );
    Ok(parts)
}

/// Validate the names chosen in one group and return the options in catalog order.
fn pick_options<'a>(
    entry: &CatalogEntry,
    group: &'a UpgradeGroup,
    names: &[String],
) -> Result<Vec<&'a UpgradeOption>, EngineError> {
    let mut distinct: Vec<&str> = Vec::new();
    for name in names.iter().map(|name| name.trim()) {
        if name.is_empty() || distinct.contains(&name) {
            continue;
        }
        if group.option(name).is_none() {
            return Err(EngineError::UnknownOption {
                unit: entry.name.clone(),
                group: group.name.clone(),
                option: name.to_string(),
            });
        }
        distinct.push(name);
    }

    if group.kind != GroupKind::Multiple && distinct.len() > 1 {
        return Err(EngineError::ConflictingSelection {
            unit: entry.name.clone(),
            group: group.name.clone(),
            options: distinct.iter().map(|name| name.to_string()).collect(),
        });
    }

    let mut chosen: Vec<&UpgradeOption> = Vec::new();
    for option in &group.options {
        let already = chosen.iter().any(|picked| picked.name == option.name);
        if !already && distinct.contains(&option.name.as_str()) {
            chosen.push(option);
        }
    }
    Ok(chosen)
}

fn mount_from_option(option: &UpgradeOption) -> Mount {
    let mut mount = option.mount.clone().unwrap_or_default();
    if mount.name.is_empty() {
        mount.name = option.name.clone();
    }
    mount.cost = option.cost;
    for rule in &option.special_rules {
        if !mount.special_rules.contains(rule) {
            mount.special_rules.push(rule.clone());
        }
    }
    mount
}
