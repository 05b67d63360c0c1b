//! Special rule merging and Coriace extraction.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    engine::resolve::ResolvedParts,
    error::MalformedCoriaceRule,
    models::{CatalogEntry, Weapon},
};

static CORIACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Coriace\s*\(?\s*\+?\s*(\d+)\s*\)?").expect("failed to compile Coriace regex")
});

/// Rules of a resolved entry, split by heading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRules {
    /// Entry and option rules, weapon-owned rules removed, sorted for display.
    pub rules: Vec<String>,
    /// Mount rules, sorted for display.
    pub mount_rules: Vec<String>,
    /// Total Coriace from every source; `None` unless positive.
    pub coriace: Option<u32>,
}

/// Merge the rules of `entry` and its resolved parts.
pub fn aggregate_rules(entry: &CatalogEntry, parts: &ResolvedParts) -> AggregatedRules {
    let weapon_keys = weapon_rule_keys(&parts.weapons);

    let mut merged = RuleSet::default();
    for rule in &entry.special_rules {
        if !weapon_keys.contains(&normalize_rule(rule)) {
            merged.insert(rule);
        }
    }
    for option in parts.options.values().flatten() {
        let own_weapon_keys = weapon_rule_keys(&option.weapon);
        for rule in &option.special_rules {
            let key = normalize_rule(rule);
            if weapon_keys.contains(&key) || own_weapon_keys.contains(&key) {
                continue;
            }
            merged.insert(rule);
        }
    }

    let mut mount_rules = RuleSet::default();
    if let Some(mount) = &parts.mount {
        for rule in &mount.special_rules {
            mount_rules.insert(rule);
        }
    }

    // Role weapons are part of `parts.weapons`, so their rules are scanned here.
    let base = sum_coriace(&entry.special_rules);
    let mut total = if parts.combined {
        base.saturating_mul(2)
    } else {
        base
    };
    total = total.saturating_add(sum_coriace(
        parts
            .options
            .values()
            .flatten()
            .flat_map(|option| &option.special_rules),
    ));
    if let Some(mount) = &parts.mount {
        total = total.saturating_add(sum_coriace(&mount.special_rules));
    }
    total = total.saturating_add(sum_coriace(
        parts.weapons.iter().flat_map(|weapon| &weapon.special_rules),
    ));

    AggregatedRules {
        rules: merged.into_sorted(),
        mount_rules: mount_rules.into_sorted(),
        coriace: (total > 0).then_some(total),
    }
}

/// Coriace carried by one rule string; every match in the string counts.
///
/// A rule naming Coriace without a readable value, or with a value too large
/// for `u32`, is malformed.
pub fn coriace_value(rule: &str) -> Result<u32, MalformedCoriaceRule> {
    let malformed = || MalformedCoriaceRule {
        rule: rule.to_string(),
    };
    if !rule.contains("Coriace") {
        return Ok(0);
    }
    let mut found = false;
    let mut total = 0u32;
    for caps in CORIACE_RE.captures_iter(rule) {
        found = true;
        let value = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(malformed)?;
        total = total.saturating_add(value);
    }
    if found {
        Ok(total)
    } else {
        Err(malformed())
    }
}

/// Sum the Coriace of several rules, counting malformed ones as zero.
pub fn sum_coriace<'a>(rules: impl IntoIterator<Item = &'a String>) -> u32 {
    rules
        .into_iter()
        .map(|rule| {
            coriace_value(rule).unwrap_or_else(|err| {
                debug!(%err, "skipping Coriace rule");
                0
            })
        })
        .fold(0u32, u32::saturating_add)
}

/// Comparison form of a rule: whitespace collapsed and removed around parentheses.
pub fn normalize_rule(rule: &str) -> String {
    rule.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" (", "(")
        .replace("( ", "(")
        .replace(" )", ")")
}

/// Sort key for display: lower case with French accents folded.
pub fn display_key(text: &str) -> String {
    text.to_lowercase().chars().map(fold_accent).collect()
}

fn fold_accent(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn weapon_rule_keys(weapons: &[Weapon]) -> HashSet<String> {
    weapons
        .iter()
        .flat_map(|weapon| &weapon.special_rules)
        .map(|rule| normalize_rule(rule))
        .collect()
}

/// Insertion-ordered rule set keyed by the normalized form.
#[derive(Default)]
struct RuleSet {
    keys: HashSet<String>,
    rules: Vec<String>,
}

impl RuleSet {
    fn insert(&mut self, rule: &str) {
        if self.keys.insert(normalize_rule(rule)) {
            self.rules.push(rule.to_string());
        }
    }

    fn into_sorted(mut self) -> Vec<String> {
        self.rules.sort_by_cached_key(|rule| (display_key(rule), rule.clone()));
        self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mount, UpgradeOption};

    fn entry(rules: &[&str]) -> CatalogEntry {
        serde_json::from_value(serde_json::json!({
            "name": "Ogres",
            "type": "unit",
            "base_cost": 100,
            "quality": 4,
            "defense": 4,
            "size": 3,
            "special_rules": rules,
        }))
        .unwrap()
    }

    fn weapon(rules: &[&str]) -> Weapon {
        Weapon {
            name: "Massue".into(),
            range: None,
            attacks: 3,
            armor_piercing: 1,
            special_rules: rules.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn option(name: &str, rules: &[&str]) -> UpgradeOption {
        UpgradeOption {
            name: name.into(),
            cost: 5,
            weapon: Vec::new(),
            mount: None,
            special_rules: rules.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn weapon_owned_rules_are_suppressed() {
        let entry = entry(&["Furieux"]);
        let mut parts = ResolvedParts {
            weapons: vec![weapon(&["Furieux"])],
            ..ResolvedParts::default()
        };
        parts
            .options
            .insert("Améliorations".into(), vec![option("Rage", &["Furieux", "Brutal"])]);

        let aggregated = aggregate_rules(&entry, &parts);
        assert_eq!(aggregated.rules, ["Brutal"]);
        assert_eq!(aggregated.coriace, None);
    }

    #[test]
    fn option_weapon_rules_are_suppressed_for_that_option() {
        let entry = entry(&[]);
        let mut role = option("Porte-étendard", &["Perforant", "Inspirant"]);
        role.weapon = vec![weapon(&["Perforant"])];
        let mut parts = ResolvedParts::default();
        parts.options.insert("Rôle".into(), vec![role]);

        let aggregated = aggregate_rules(&entry, &parts);
        assert_eq!(aggregated.rules, ["Inspirant"]);
    }

    #[test]
    fn whitespace_variants_deduplicate_and_keep_first_spelling() {
        let entry = entry(&["Coriace (1)"]);
        let mut parts = ResolvedParts::default();
        parts
            .options
            .insert("Améliorations".into(), vec![option("Peaux", &["Coriace(1)"])]);

        let aggregated = aggregate_rules(&entry, &parts);
        assert_eq!(aggregated.rules, ["Coriace (1)"]);
        // Deduplication is for display only, both sources still add up.
        assert_eq!(aggregated.coriace, Some(2));
    }

    #[test]
    fn coriace_sums_every_source() {
        let entry = entry(&["Coriace(3)"]);
        let mut parts = ResolvedParts {
            weapons: vec![weapon(&["Coriace(+1)"])],
            mount: Some(Mount {
                name: "Sanglier".into(),
                special_rules: vec!["Coriace(+2)".into(), "Impact(3)".into()],
                ..Mount::default()
            }),
            ..ResolvedParts::default()
        };
        parts
            .options
            .insert("Améliorations".into(), vec![option("Armure", &["Coriace +1"])]);

        let aggregated = aggregate_rules(&entry, &parts);
        assert_eq!(aggregated.coriace, Some(3 + 1 + 2 + 1));
        assert_eq!(aggregated.mount_rules, ["Coriace(+2)", "Impact(3)"]);
        assert!(!aggregated.rules.iter().any(|r| r.starts_with("Impact")));
    }

    #[test]
    fn combined_mode_doubles_base_coriace_only() {
        let entry = entry(&["Coriace(3)"]);
        let mut parts = ResolvedParts {
            combined: true,
            ..ResolvedParts::default()
        };
        parts
            .options
            .insert("Améliorations".into(), vec![option("Armure", &["Coriace(+1)"])]);

        assert_eq!(aggregate_rules(&entry, &parts).coriace, Some(3 * 2 + 1));
    }

    #[test]
    fn multiple_matches_in_one_rule_are_summed() {
        assert_eq!(coriace_value("Coriace(2), Coriace(+1)"), Ok(3));
        assert_eq!(coriace_value("Coriace 4"), Ok(4));
        assert_eq!(coriace_value("Furieux"), Ok(0));
    }

    #[test]
    fn malformed_coriace_contributes_zero() {
        assert_eq!(
            coriace_value("Coriace(X)"),
            Err(MalformedCoriaceRule {
                rule: "Coriace(X)".into()
            })
        );
        let rules = vec!["Coriace(X)".to_string(), "Coriace(2)".to_string()];
        assert_eq!(sum_coriace(&rules), 2);
    }

    #[test]
    fn out_of_range_coriace_is_malformed() {
        let rule = "Coriace(99999999999)";
        assert_eq!(
            coriace_value(rule),
            Err(MalformedCoriaceRule { rule: rule.into() })
        );
        let rules = vec![rule.to_string(), "Coriace(1)".to_string()];
        assert_eq!(sum_coriace(&rules), 1);
    }

    #[test]
    fn huge_coriace_saturates() {
        let entry = entry(&["Coriace(3000000000)"]);
        let mut parts = ResolvedParts {
            combined: true,
            weapons: vec![weapon(&["Coriace(3000000000)"])],
            ..ResolvedParts::default()
        };
        parts
            .options
            .insert("Améliorations".into(), vec![option("Armure", &["Coriace(4000000000)"])]);

        assert_eq!(aggregate_rules(&entry, &parts).coriace, Some(u32::MAX));
        assert_eq!(
            coriace_value("Coriace(4000000000), Coriace(4000000000)"),
            Ok(u32::MAX)
        );
    }

    #[test]
    fn role_weapon_coriace_counts_once_resolved() {
        let entry: CatalogEntry = serde_json::from_value(serde_json::json!({
            "name": "Capitaine",
            "type": "hero",
            "base_cost": 60,
            "quality": 3,
            "defense": 3,
            "special_rules": ["Héros"],
            "weapons": [{"name": "Épée", "attacks": 3}],
            "upgrade_groups": [{"group": "Rôle", "type": "upgrades", "options": [
                {"name": "Champion", "cost": 15, "special_rules": ["Inspirant"],
                 "weapon": {"name": "Lame du champion", "attacks": 2,
                            "special_rules": ["Coriace(+1)"]}}
            ]}]
        }))
        .unwrap();
        let selections = crate::engine::Selections::new().choose("Rôle", "Champion");
        let parts = crate::engine::resolve(&entry, &selections, false).unwrap();

        let names: Vec<_> = parts.weapons.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["Épée", "Lame du champion"]);
        let aggregated = aggregate_rules(&entry, &parts);
        assert_eq!(aggregated.coriace, Some(1));
        assert_eq!(aggregated.rules, ["Héros", "Inspirant"]);
    }

    #[test]
    fn zero_total_is_absent() {
        let entry = entry(&["Coriace(0)", "Peur"]);
        let aggregated = aggregate_rules(&entry, &ResolvedParts::default());
        assert_eq!(aggregated.coriace, None);
        assert_eq!(aggregated.rules, ["Coriace(0)", "Peur"]);
    }

    #[test]
    fn rules_sort_with_accents_folded() {
        let entry = entry(&["Vol", "éclaireur", "Embuscade", "Agile"]);
        let aggregated = aggregate_rules(&entry, &ResolvedParts::default());
        assert_eq!(aggregated.rules, ["Agile", "éclaireur", "Embuscade", "Vol"]);
    }

    #[test]
    fn normalization_collapses_whitespace() {
        assert_eq!(normalize_rule("  Coriace ( +1 ) "), "Coriace(+1)");
        assert_eq!(normalize_rule("Impact  (3)"), "Impact(3)");
        assert_eq!(display_key("Éclaireur"), "eclaireur");
    }
}
