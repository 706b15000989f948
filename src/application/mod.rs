//! # Application Layer
//!
//! Contains the orchestration of the agent: planning, validation and sequential
//! execution of actions, plus process-wide logging setup.

pub mod logging;
pub mod planner;

#[cfg(test)]
pub(crate) mod test_support;
