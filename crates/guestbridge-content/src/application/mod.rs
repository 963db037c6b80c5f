//! Application layer for the content context.

pub mod authoring;
pub mod context;
pub mod inbound;
pub mod navigation;
pub mod persistence;
pub mod query_handlers;
