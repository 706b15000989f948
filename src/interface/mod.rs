//! # Interface Layer
//!
//! The request boundary: exposes the orchestrator over HTTP.

pub mod http;
