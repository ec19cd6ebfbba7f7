//! Common configuration and shared test cases for the homos workspace.
//!
//! This crate provides the search configuration consumed by `homos_subgraph`
//! and the graph fixtures its tests run against.

mod config;
mod test_cases;

pub use crate::config::*;
pub use crate::test_cases::*;
