use std::path::{Path, PathBuf};

use crate::config::ActorConfig;

pub struct CliContext {
    config: ActorConfig,
    config_path: Option<PathBuf>,
}

impl CliContext {
    pub fn new(config: ActorConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    /// File the configuration was read from; `None` when only defaults and
    /// environment overrides applied.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
