//! Targeting - The `scope:quantity[:method[:param]]` rule language
//!
//! - [`TargetSpec`]: a parsed rule
//! - [`select_targets`]: resolves a rule against a roster
//! - [`Targetable`]: what the resolver needs to know about a combatant

mod rule;
mod select;

pub use rule::{Method, Quantity, Scope, TargetParseError, TargetSpec};
pub use select::{select_targets, Targetable};
