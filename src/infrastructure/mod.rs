//! # Infrastructure Layer
//!
//! Handles interactions with external systems: the provider HTTP APIs and the
//! local filesystem/shell. Implements the traits defined in the Domain layer.

pub mod llm;
pub mod tools;
