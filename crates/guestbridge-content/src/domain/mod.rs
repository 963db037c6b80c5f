//! Domain layer for the content context.

pub mod aggregates;
pub mod commands;
pub mod editing;
pub mod events;
pub mod state;
