//! SoulBrowser actor harness
//!
//! Configuration loading, logging bootstrap and the `soulbrowser-actor` CLI
//! over the actor crates.

pub mod cli;
pub mod config;

pub use cli::run_fixture_action;
pub use config::{load_config, ActorConfig, ConfigError, LoadedConfig};
