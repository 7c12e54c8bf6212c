//! CLI command implementations.

pub mod resolve;
