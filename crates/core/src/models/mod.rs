//! Shared domain models.
//!
//! Catalog types mirror the faction JSON files; roster types are the resolved
//! snapshots produced by the engine and written to exports.

use std::{collections::BTreeMap, path::PathBuf};

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::engine::rules::display_key;

/// Catalog file located on disk, without its unit list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSummary {
    /// Game system the faction belongs to (e.g. `Age of Fantasy`).
    pub game: String,
    /// Faction name.
    pub faction: String,
    /// Path of the JSON file.
    pub path: PathBuf,
    /// Number of unit templates in the file.
    pub unit_count: usize,
}

impl CatalogSummary {
    /// Returns a user-facing label combining game and faction.
    pub fn display_name(&self) -> String {
        if self.game.is_empty() {
            self.faction.clone()
        } else {
            format!("{} · {}", self.game, self.faction)
        }
    }
}

/// A faction catalog: the read-only reference data units are built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Game system name.
    #[serde(default)]
    pub game: String,
    /// Faction name; the file stem when the catalog omits it.
    #[serde(default)]
    pub faction: String,
    /// Unit templates.
    #[serde(default)]
    pub units: Vec<CatalogEntry>,
    /// Faction rule glossary.
    #[serde(default, deserialize_with = "rule_descriptions")]
    pub special_rules_descriptions: BTreeMap<String, String>,
    /// Faction spells keyed by name.
    #[serde(default)]
    pub spells: BTreeMap<String, Spell>,
}

impl Catalog {
    /// Look up a template by exact name.
    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.units.iter().find(|unit| unit.name == name)
    }

    /// Rule descriptions sorted for display.
    pub fn rule_legend(&self) -> Vec<(&str, &str)> {
        let mut legend: Vec<_> = self
            .special_rules_descriptions
            .iter()
            .map(|(name, description)| (name.as_str(), description.as_str()))
            .collect();
        legend.sort_by_cached_key(|(name, _)| (display_key(name), name.to_string()));
        legend
    }

    /// Spells sorted for display.
    pub fn spell_legend(&self) -> Vec<(&str, &Spell)> {
        let mut spells: Vec<_> = self
            .spells
            .iter()
            .map(|(name, spell)| (name.as_str(), spell))
            .collect();
        spells.sort_by_cached_key(|(name, _)| (display_key(name), name.to_string()));
        spells
    }
}

/// Spell entry from the faction legend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Spell {
    /// Casting cost, when the catalog specifies one.
    #[serde(default)]
    pub cost: Option<u32>,
    /// Rules text.
    #[serde(default)]
    pub description: String,
}

/// Whether a template is a character or a regular unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Single-model character; never doubled, always size 1.
    Hero,
    /// Anything else.
    #[default]
    #[serde(other)]
    Unit,
}

/// How a weapon-group choice combines with the template's base weapons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponMode {
    /// The chosen option's weapons replace the base weapons.
    #[default]
    Replace,
    /// The chosen option's weapons are added next to the base weapons.
    Append,
}

/// Unit template from a faction catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Template name, also the identity used by copy limits.
    pub name: String,
    /// Hero or unit.
    #[serde(rename = "type", default)]
    pub kind: UnitKind,
    /// Cost before any upgrade.
    #[serde(default)]
    pub base_cost: u32,
    /// Quality target number.
    #[serde(default)]
    pub quality: u8,
    /// Defense target number.
    #[serde(default)]
    pub defense: u8,
    /// Model count; absent for most heroes.
    #[serde(default)]
    pub size: Option<u32>,
    /// Innate special rules.
    #[serde(default)]
    pub special_rules: Vec<String>,
    /// Base weapon loadout.
    #[serde(default, alias = "weapon", deserialize_with = "one_or_many")]
    pub weapons: Vec<Weapon>,
    /// Upgrade groups offered by the template.
    #[serde(default)]
    pub upgrade_groups: Vec<UpgradeGroup>,
    /// Finer-grained category used for labels (`named_hero`, `vehicle`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_detail: Option<String>,
    /// Weapon group semantics for this template.
    #[serde(default)]
    pub weapon_mode: WeaponMode,
}

impl CatalogEntry {
    /// True for hero-kind templates.
    pub fn is_hero(&self) -> bool {
        self.kind == UnitKind::Hero
    }

    /// Find an upgrade group by name.
    pub fn group(&self, name: &str) -> Option<&UpgradeGroup> {
        self.upgrade_groups.iter().find(|group| group.name == name)
    }

    /// Display label for the template's category.
    pub fn type_label(&self) -> &'static str {
        type_label(self.kind, self.unit_detail.as_deref())
    }
}

/// Weapon profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Weapon name.
    pub name: String,
    /// Range; `None`, `-` and `Mêlée` all mean melee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Attack count.
    #[serde(default, deserialize_with = "lenient_number")]
    pub attacks: u32,
    /// Armor piercing value; 0 when the weapon has none.
    #[serde(default, deserialize_with = "lenient_number")]
    pub armor_piercing: u32,
    /// Weapon special rules.
    #[serde(default)]
    pub special_rules: Vec<String>,
}

impl Weapon {
    /// One-line profile, e.g. `24 | A2 | PA1 | Perforant`.
    pub fn profile(&self) -> String {
        let range = match self.range.as_deref().map(str::trim) {
            None | Some("") | Some("-") => "Mêlée".to_string(),
            Some(range) if range.to_lowercase() == "mêlée" => "Mêlée".to_string(),
            Some(range) => range.replace(['"', '\''], ""),
        };

        let mut profile = format!("{range} | A{}", self.attacks);
        if self.armor_piercing > 0 {
            profile.push_str(&format!(" | PA{}", self.armor_piercing));
        }
        if !self.special_rules.is_empty() {
            profile.push_str(" | ");
            profile.push_str(&self.special_rules.join(", "));
        }
        profile
    }
}

/// Kind of an upgrade group, which decides how many options may be chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Weapon swap, at most one option.
    Weapon,
    /// Mount, at most one option.
    Mount,
    /// Independent upgrades, any subset.
    Multiple,
    /// Any other group, at most one option.
    #[default]
    #[serde(other)]
    Single,
}

/// Named set of options attached to a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeGroup {
    /// Group name, used as the key of a selection.
    #[serde(rename = "group")]
    pub name: String,
    /// Selection semantics.
    #[serde(rename = "type", default)]
    pub kind: GroupKind,
    /// Available options.
    #[serde(default)]
    pub options: Vec<UpgradeOption>,
}

impl UpgradeGroup {
    /// Find an option by exact name.
    pub fn option(&self, name: &str) -> Option<&UpgradeOption> {
        self.options.iter().find(|option| option.name == name)
    }
}

/// One choosable option of an upgrade group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOption {
    /// Option name.
    pub name: String,
    /// Points added when selected.
    #[serde(default)]
    pub cost: u32,
    /// Weapons granted by the option.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub weapon: Vec<Weapon>,
    /// Mount granted by the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<Mount>,
    /// Rules granted by the option.
    #[serde(default)]
    pub special_rules: Vec<String>,
}

/// Canonical mount record.
///
/// Catalogs store mounts either flat or wrapped in a `mount` key; both shapes
/// deserialize into this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MountPayload")]
pub struct Mount {
    /// Mount name.
    pub name: String,
    /// Points cost; the owning option's cost takes precedence during resolution.
    pub cost: u32,
    /// Quality override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    /// Defense override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<u8>,
    /// Rules the mount contributes.
    pub special_rules: Vec<String>,
    /// Weapons carried by the mount.
    pub weapons: Vec<Weapon>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MountPayload {
    Nested {
        mount: MountBody,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        cost: Option<u32>,
    },
    Flat(MountBody),
}

#[derive(Deserialize)]
struct MountBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cost: Option<u32>,
    #[serde(default)]
    quality: Option<u8>,
    #[serde(default)]
    defense: Option<u8>,
    #[serde(default)]
    special_rules: Vec<String>,
    #[serde(default, alias = "weapon", deserialize_with = "one_or_many")]
    weapons: Vec<Weapon>,
}

impl From<MountPayload> for Mount {
    fn from(payload: MountPayload) -> Self {
        let (body, outer_name, outer_cost) = match payload {
            MountPayload::Nested { mount, name, cost } => (mount, name, cost),
            MountPayload::Flat(body) => (body, None, None),
        };
        Mount {
            name: outer_name.or(body.name).unwrap_or_default(),
            cost: outer_cost.or(body.cost).unwrap_or_default(),
            quality: body.quality,
            defense: body.defense,
            special_rules: body.special_rules,
            weapons: body.weapons,
        }
    }
}

/// Composition thresholds of a game system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// One hero allowed per this many points.
    pub hero_point_threshold: u32,
    /// One extra copy of a unit allowed per this many points.
    pub copy_point_threshold: u32,
    /// Largest share of the limit a single entry may cost.
    pub max_cost_ratio: f64,
    /// One entry allowed per this many points.
    pub unit_point_threshold: u32,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            hero_point_threshold: 375,
            copy_point_threshold: 750,
            max_cost_ratio: 0.35,
            unit_point_threshold: 150,
        }
    }
}

/// Resolved roster entry, a snapshot taken when the unit was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Template name.
    pub name: String,
    /// Hero or unit.
    #[serde(rename = "type", default)]
    pub kind: UnitKind,
    /// Final points cost.
    #[serde(rename = "cost")]
    pub final_cost: u32,
    /// Quality target number.
    pub quality: u8,
    /// Defense target number.
    pub defense: u8,
    /// Model count after combined-mode doubling.
    pub size: u32,
    /// Merged special rules, weapon-owned rules excluded, sorted for display.
    #[serde(rename = "special_rules", default)]
    pub rules: Vec<String>,
    /// Rules contributed by the mount, kept apart from `rules`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mount_rules: Vec<String>,
    /// Selected options per group.
    #[serde(rename = "options", default)]
    pub selected_options: BTreeMap<String, Vec<UpgradeOption>>,
    /// Selected mount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<Mount>,
    /// Resolved weapons.
    #[serde(rename = "weapon", default, deserialize_with = "one_or_many")]
    pub weapons: Vec<Weapon>,
    /// Total Coriace, present only when positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coriace: Option<u32>,
    /// Whether the entry was doubled.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub combined: bool,
    /// Category carried over from the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_detail: Option<String>,
}

impl RosterEntry {
    /// True for hero-kind entries.
    pub fn is_hero(&self) -> bool {
        self.kind == UnitKind::Hero
    }

    /// Display label for the entry's category.
    pub fn type_label(&self) -> &'static str {
        type_label(self.kind, self.unit_detail.as_deref())
    }

    /// Selected options that grant weapons, in group order.
    pub fn roles(&self) -> impl Iterator<Item = &UpgradeOption> {
        self.selected_options
            .values()
            .flatten()
            .filter(|option| !option.weapon.is_empty())
    }

    /// Selected options without weapons, in group order.
    pub fn upgrades(&self) -> impl Iterator<Item = &UpgradeOption> {
        self.selected_options
            .values()
            .flatten()
            .filter(|option| option.weapon.is_empty())
    }
}

impl UpgradeOption {
    /// Option rules not already carried by one of its own weapons.
    pub fn own_rules(&self) -> Vec<&str> {
        self.special_rules
            .iter()
            .filter(|rule| {
                !self
                    .weapon
                    .iter()
                    .any(|weapon| weapon.special_rules.contains(*rule))
            })
            .map(String::as_str)
            .collect()
    }
}

fn type_label(kind: UnitKind, detail: Option<&str>) -> &'static str {
    if kind == UnitKind::Hero {
        return "Héros";
    }
    match detail.unwrap_or("unit") {
        "hero" => "Héros",
        "named_hero" => "Héros nommé",
        "unit" => "Unité de base",
        "light_vehicle" => "Véhicule léger",
        "vehicle" => "Véhicule/Monstre",
        "titan" => "Titan",
        _ => "Unité",
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Number(value)) => Ok(value),
        Some(Raw::Text(text)) => {
            let text = text.trim();
            if text.is_empty() || text == "-" {
                return Ok(0);
            }
            text.trim_start_matches('+')
                .parse::<u32>()
                .map_err(|_| de::Error::custom(format!("invalid numeric value '{text}'")))
        }
    }
}

fn rule_descriptions<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Described {
        name: String,
        #[serde(default)]
        description: String,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Map(BTreeMap<String, String>),
        List(Vec<Described>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => BTreeMap::new(),
        Some(Raw::Map(map)) => map,
        Some(Raw::List(list)) => list
            .into_iter()
            .map(|rule| (rule.name, rule.description))
            .collect(),
    })
}
