//! Errors raised while turning a template and selections into a roster entry.

use thiserror::Error;

/// Selection errors. Any of these rejects the whole add-to-roster action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A selection names an option the group does not offer.
    #[error("unknown option '{option}' in group '{group}' of {unit}")]
    UnknownOption {
        /// Template name.
        unit: String,
        /// Group the selection targeted.
        group: String,
        /// Option name that was not found.
        option: String,
    },

    /// A selection names a group the template does not have.
    #[error("{unit} has no upgrade group named '{group}'")]
    UnknownGroup {
        /// Template name.
        unit: String,
        /// Group name that was not found.
        group: String,
    },

    /// More than one distinct option was chosen in a single-choice group.
    #[error("group '{group}' of {unit} accepts one option, got {}", .options.join(", "))]
    ConflictingSelection {
        /// Template name.
        unit: String,
        /// Group name.
        group: String,
        /// The distinct options that were requested.
        options: Vec<String>,
    },

    /// The catalog has no template with this name.
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
}

/// A rule mentions Coriace without a readable value.
///
/// Never propagated: the rule contributes zero and aggregation continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed Coriace rule: '{rule}'")]
pub struct MalformedCoriaceRule {
    /// The offending rule text.
    pub rule: String,
}
