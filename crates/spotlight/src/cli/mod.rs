//! CLI command implementations.

pub mod annotate;
pub mod assistant;
pub mod config;
pub mod tools;
