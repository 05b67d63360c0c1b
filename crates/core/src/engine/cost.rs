//! Point cost and model count of a resolved entry.

use crate::{engine::resolve::ResolvedParts, models::CatalogEntry};

/// Model count used when a non-hero template omits `size`.
pub const DEFAULT_UNIT_SIZE: u32 = 10;

/// Final cost of `entry` with `parts` selected.
///
/// Combined mode doubles the body and its weapon choice only; mount and
/// upgrades are paid once. Heroes are never doubled. Saturates at `u32::MAX`.
pub fn cost(entry: &CatalogEntry, parts: &ResolvedParts, combined: bool) -> u32 {
    if combined && !entry.is_hero() {
        entry
            .base_cost
            .saturating_add(parts.weapon_cost)
            .saturating_mul(2)
            .saturating_add(parts.mount_cost)
            .saturating_add(parts.upgrades_cost)
    } else {
        entry.base_cost.saturating_add(parts.extra_cost())
    }
}

/// Model count of the entry. Heroes are always 1.
pub fn size(entry: &CatalogEntry, combined: bool) -> u32 {
    if entry.is_hero() {
        return 1;
    }
    let base = entry.size.unwrap_or(DEFAULT_UNIT_SIZE);
    if combined {
        base.saturating_mul(2)
    } else {
        base
    }
}
