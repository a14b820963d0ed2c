//! Configuration loading
//!
//! Layers, lowest first: built-in defaults, an optional YAML file, then
//! `SOUL_ACTOR_*` environment overrides (`__` separates nested keys).

use std::path::{Path, PathBuf};

use action_primitives::ToolTimings;
use config::{Config, Environment, File, FileFormat};
use page_stability::StabilityConfig;
use serde::{Deserialize, Serialize};
use soulbrowser_core_types::SoulError;
use soulbrowser_scheduler::DispatcherConfig;
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_PREFIX: &str = "SOUL_ACTOR";
const LOCAL_CONFIG: &str = "config/actor.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl From<ConfigError> for SoulError {
    fn from(err: ConfigError) -> Self {
        SoulError::new(err.to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub stability: StabilityConfig,
    pub tools: ToolTimings,
}

impl ActorConfig {
    pub fn normalized(self) -> Self {
        Self {
            stability: self.stability.normalized(),
            tools: self.tools,
        }
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            stability: self.stability.clone(),
            tools: self.tools.clone(),
        }
    }
}

/// Effective configuration and the file it came from, if any.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: ActorConfig,
    pub path: Option<PathBuf>,
}

/// Picks the file to read: an explicit path, else `config/actor.yaml`, else the
/// user config directory. Only an explicit path is required to exist.
fn config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join("soulbrowser").join("actor.yaml"))
        .filter(|path| path.exists()))
}

pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = config_path(explicit)?;

    let mut builder = Config::builder().add_source(Config::try_from(&ActorConfig::default())?);
    if let Some(path) = &path {
        builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Yaml));
        info!("Loading configuration from: {}", path.display());
    } else {
        debug!("No config file found, using defaults");
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config: ActorConfig = builder.build()?.try_deserialize()?;
    Ok(LoadedConfig {
        config: config.normalized(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn defaults_without_file() {
        let loaded = load_config(None).unwrap();
        assert_eq!(loaded.config.stability.global_timeout_ms, 10_000);
        assert_eq!(loaded.config.tools.type_observation_delay_ms, 250);
    }

    #[test]
    #[serial]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "stability:\n  global_timeout_ms: 4000\ntools:\n  smooth_scroll_delay_ms: 50"
        )
        .unwrap();

        let loaded = load_config(Some(file.path())).unwrap();
        assert_eq!(loaded.config.stability.global_timeout_ms, 4000);
        assert_eq!(loaded.config.stability.main_thread_timeout_ms, 4000);
        assert_eq!(loaded.config.tools.smooth_scroll_delay_ms, 50);
        assert_eq!(loaded.config.tools.type_observation_delay_ms, 250);
        assert_eq!(loaded.path.as_deref(), Some(file.path()));
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        std::env::set_var("SOUL_ACTOR_STABILITY__MAIN_THREAD_TIMEOUT_MS", "1500");
        let loaded = load_config(None);
        std::env::remove_var("SOUL_ACTOR_STABILITY__MAIN_THREAD_TIMEOUT_MS");

        assert_eq!(loaded.unwrap().config.stability.main_thread_timeout_ms, 1500);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/actor.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn dispatcher_config_carries_both_sections() {
        let config = ActorConfig::default();
        let dispatcher = config.dispatcher_config();
        assert_eq!(dispatcher.stability, config.stability);
        assert_eq!(dispatcher.tools, config.tools);
    }
}
