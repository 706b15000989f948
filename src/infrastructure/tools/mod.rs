//! # Tools Module
//!
//! In-process execution of plan actions (filesystem and shell).

pub mod executor;
