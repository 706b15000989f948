//! # LLM Infrastructure
//!
//! HTTP clients for the planning providers (OpenAI, Anthropic) behind the
//! [`PlanProvider`](crate::domain::traits::PlanProvider) trait.

mod client;
pub mod providers;
mod types;

pub use client::Client;

pub use types::{Context, Error, MessageRole, Provider, Response, TokenUsage};
