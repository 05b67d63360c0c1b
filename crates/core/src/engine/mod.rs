//! Rules engine: resolve selections, cost them, merge rules, validate rosters.
//!
//! Everything here is a pure function of its inputs. The roster value that
//! strings these together lives in [`crate::roster`].

pub mod cost;
pub mod resolve;
pub mod rules;
pub mod validate;

pub use cost::{cost, size};
pub use resolve::{resolve, ResolvedParts, Selections};
pub use rules::{aggregate_rules, AggregatedRules};
pub use validate::{validate, Violation};
