//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the agent.
//! Independent of specific frameworks (mostly), serving as the contract for other layers.

pub mod config;
pub mod error;
pub mod paths;
pub mod schema;
pub mod traits;
pub mod types;
