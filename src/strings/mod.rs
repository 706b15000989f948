//! # Strings Module
//!
//! Centralizes prompt text and log messages.

pub mod logs;
pub mod prompts;
