//! Roster composition checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{RosterEntry, Ruleset};

/// A broken composition rule. Returned as data so every problem can be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// More heroes than the limit allows.
    #[error("too many heroes: {count} (max {max})")]
    TooManyHeroes {
        /// Heroes in the roster.
        count: usize,
        /// Heroes allowed.
        max: usize,
    },

    /// Too many entries share a name.
    #[error("too many copies of {name}: {count} (max {max})")]
    TooManyCopies {
        /// Entry name.
        name: String,
        /// Copies in the roster.
        count: usize,
        /// Copies allowed.
        max: usize,
    },

    /// A single entry costs more than the per-entry cap.
    #[error("{} costs {cost} pts, above the {cap} pts cap", .name.as_deref().unwrap_or("new entry"))]
    ItemExceedsCostCap {
        /// Offending roster entry, `None` for a prospective one.
        name: Option<String>,
        /// Its cost.
        cost: u32,
        /// Largest cost allowed.
        cap: u32,
    },

    /// More entries than the limit allows.
    #[error("too many entries: {count} (max {max})")]
    TooManyItems {
        /// Entries in the roster.
        count: usize,
        /// Entries allowed.
        max: usize,
    },

    /// Total cost over the points limit.
    #[error("{total} pts exceeds the {limit} pts limit")]
    BudgetExceeded {
        /// Total cost, prospective entry included.
        total: u64,
        /// Points limit.
        limit: u32,
    },
}

impl Violation {
    /// Budget overruns always block an addition, whatever the ruleset.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Violation::BudgetExceeded { .. })
    }
}

/// Check `roster` against `ruleset` for a game of `limit` points.
///
/// `prospective_cost` is the cost of an entry about to be added; it is
/// checked against the per-entry cap and counted in the total. All checks
/// run; an empty result means the roster is valid. A threshold of zero
/// disables its check.
pub fn validate(
    roster: &[RosterEntry],
    limit: u32,
    ruleset: &Ruleset,
    prospective_cost: Option<u32>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(max) = per_threshold(limit, ruleset.hero_point_threshold) {
        let count = roster.iter().filter(|entry| entry.is_hero()).count();
        if count > max {
            violations.push(Violation::TooManyHeroes { count, max });
        }
    }

    if let Some(extra) = per_threshold(limit, ruleset.copy_point_threshold) {
        let max = 1 + extra;
        for (name, count) in copy_counts(roster) {
            if count > max {
                violations.push(Violation::TooManyCopies {
                    name: name.to_string(),
                    count,
                    max,
                });
            }
        }
    }

    let cap = cost_cap(limit, ruleset.max_cost_ratio);
    for entry in roster {
        if entry.final_cost > cap {
            violations.push(Violation::ItemExceedsCostCap {
                name: Some(entry.name.clone()),
                cost: entry.final_cost,
                cap,
            });
        }
    }
    if let Some(cost) = prospective_cost.filter(|cost| *cost > cap) {
        violations.push(Violation::ItemExceedsCostCap {
            name: None,
            cost,
            cap,
        });
    }

    if let Some(max) = per_threshold(limit, ruleset.unit_point_threshold) {
        let count = roster.len();
        if count > max {
            violations.push(Violation::TooManyItems { count, max });
        }
    }

    let total = roster
        .iter()
        .map(|entry| u64::from(entry.final_cost))
        .sum::<u64>()
        + u64::from(prospective_cost.unwrap_or(0));
    if total > u64::from(limit) {
        violations.push(Violation::BudgetExceeded { total, limit });
    }

    violations
}

/// Largest whole cost allowed for a single entry.
pub fn cost_cap(limit: u32, ratio: f64) -> u32 {
    // Tolerance absorbs binary rounding of ratios such as 0.35.
    (f64::from(limit) * ratio + 1e-9).floor().max(0.0) as u32
}

fn per_threshold(limit: u32, threshold: u32) -> Option<usize> {
    (threshold > 0).then(|| (limit / threshold) as usize)
}

fn copy_counts(roster: &[RosterEntry]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for entry in roster {
        match counts.iter_mut().find(|(name, _)| *name == entry.name) {
            Some((_, count)) => *count += 1,
            None => counts.push((entry.name.as_str(), 1)),
        }
    }
    counts
}
