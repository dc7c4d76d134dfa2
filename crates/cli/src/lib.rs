//! sdiag CLI library
//!
//! This module exports the CLI components for use by the binary and tests.

pub mod app;
pub mod commands;
pub mod input;
pub mod outcome;
pub mod output;
pub mod session;
pub mod workspace;

#[cfg(test)]
mod testing;
