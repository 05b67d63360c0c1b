//! Plain-text rendering of catalogs, rosters and violations.

use std::fmt::Write as _;

use armybuilder_core::{Catalog, CatalogEntry, GroupKind, Roster, RosterEntry, Violation};

/// One template with its profile and upgrade groups.
pub fn render_template(template: &CatalogEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} [{}] {} pts  Q{}+ D{}+",
        template.name,
        template.type_label(),
        template.base_cost,
        template.quality,
        template.defense
    );
    for weapon in &template.weapons {
        let _ = writeln!(out, "    {}: {}", weapon.name, weapon.profile());
    }
    if !template.special_rules.is_empty() {
        let _ = writeln!(out, "    Règles: {}", template.special_rules.join(", "));
    }
    for group in &template.upgrade_groups {
        let _ = writeln!(out, "    {} ({})", group.name, group_label(group.kind));
        for option in &group.options {
            let _ = writeln!(out, "      - {} +{} pts", option.name, option.cost);
        }
    }
    out
}

/// Rule descriptions and spells of a faction.
pub fn render_legend(catalog: &Catalog) -> String {
    let mut out = String::new();
    let rules = catalog.rule_legend();
    if !rules.is_empty() {
        out.push_str("\nRègles spéciales\n");
        for (name, description) in rules {
            let _ = writeln!(out, "  {name}: {description}");
        }
    }
    let spells = catalog.spell_legend();
    if !spells.is_empty() {
        out.push_str("\nSorts\n");
        for (name, spell) in spells {
            match spell.cost {
                Some(cost) => {
                    let _ = writeln!(out, "  {name} ({cost}): {}", spell.description);
                }
                None => {
                    let _ = writeln!(out, "  {name}: {}", spell.description);
                }
            }
        }
    }
    out
}

/// Roster header followed by every entry, heroes first.
pub fn render_roster(roster: &Roster) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} · {}) {}/{} pts",
        roster.name,
        roster.game,
        roster.faction,
        roster.total_cost(),
        roster.points
    );
    for entry in roster.display_order() {
        render_entry(&mut out, entry);
    }
    out
}

fn render_entry(out: &mut String, entry: &RosterEntry) {
    let _ = write!(out, "\n{} [{}]", entry.name, entry.size);
    if entry.combined {
        out.push_str(" (combinée)");
    }
    let _ = writeln!(
        out,
        " - {} - {} pts  Q{}+ D{}+",
        entry.type_label(),
        entry.final_cost,
        entry.quality,
        entry.defense
    );
    if let Some(coriace) = entry.coriace {
        let _ = writeln!(out, "  Coriace: {coriace}");
    }
    for weapon in &entry.weapons {
        let _ = writeln!(out, "  {}: {}", weapon.name, weapon.profile());
    }
    for role in entry.roles() {
        let _ = writeln!(out, "  Rôle: {}", role.name);
        for weapon in &role.weapon {
            let _ = writeln!(out, "    {}: {}", weapon.name, weapon.profile());
        }
        let rules = role.own_rules();
        if !rules.is_empty() {
            let _ = writeln!(out, "    Règles du rôle: {}", rules.join(", "));
        }
    }
    if !entry.rules.is_empty() {
        let _ = writeln!(out, "  Règles: {}", entry.rules.join(", "));
    }
    if let Some(mount) = &entry.mount {
        let _ = writeln!(out, "  Monture: {}", mount.name);
        let stats: Vec<_> = [
            mount.quality.map(|q| format!("Qualité {q}+")),
            mount.defense.map(|d| format!("Défense {d}+")),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !stats.is_empty() {
            let _ = writeln!(out, "    {}", stats.join(", "));
        }
        if !entry.mount_rules.is_empty() {
            let _ = writeln!(out, "    Règles: {}", entry.mount_rules.join(", "));
        }
        for weapon in &mount.weapons {
            let _ = writeln!(out, "    {}: {}", weapon.name, weapon.profile());
        }
    }
    // Roles are listed above.
    for (group, options) in &entry.selected_options {
        let names: Vec<_> = options
            .iter()
            .filter(|option| option.weapon.is_empty())
            .map(|option| option.name.as_str())
            .collect();
        if !names.is_empty() {
            let _ = writeln!(out, "  {group}: {}", names.join(", "));
        }
    }
}

/// Violation list, or a confirmation when there is none.
pub fn render_violations(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "\nListe valide.\n".to_string();
    }
    let mut out = String::from("\nViolations:\n");
    for violation in violations {
        let _ = writeln!(out, "  - {violation}");
    }
    out
}

fn group_label(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Weapon => "arme",
        GroupKind::Mount => "monture",
        GroupKind::Multiple => "multiple",
        GroupKind::Single => "unique",
    }
}
