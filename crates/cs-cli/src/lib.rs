//! # cs-cli
//!
//! Command-line tooling for cached-state tokens.
//!
//! This crate provides:
//! - Protection key generation and listing
//! - Encoding and decoding of state tokens against a memory or Redis backend
//! - Size comparison between cached and full-payload tokens
//! - Configuration file management

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
