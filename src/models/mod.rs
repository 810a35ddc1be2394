//! Core data models for match-history analysis.

mod comparison;
mod game_record;
mod metric;
mod reference;
mod stats;
mod surrender;

pub use comparison::*;
pub use game_record::*;
pub use metric::*;
pub use reference::*;
pub use stats::*;
pub use surrender::*;

#[cfg(test)]
pub(crate) use game_record::fixtures;
