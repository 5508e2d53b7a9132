//! # binmeta
//!
//! Library half of the binmeta tool: command implementations and
//! configuration, exposed for integration tests.

pub mod cli;
pub mod config;
