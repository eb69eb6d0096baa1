//! CLI command handlers.

use std::path::PathBuf;

use anyhow::Result;
use runiq_config::LoadedConfig;

pub mod serve;
pub mod token;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, bypassing discovery.
    pub config_path: Option<PathBuf>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load the explicit config file, or discover and layer the default ones.
    ///
    /// Warnings (unreadable layers, plaintext secrets) go to stderr.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let loaded = match &self.config_path {
            Some(path) => LoadedConfig::from_file(path)?,
            None => LoadedConfig::discover(),
        };

        for warning in &loaded.warnings {
            eprintln!("warning: {}", warning);
        }
        if self.verbose {
            for path in &loaded.files {
                tracing::debug!(path = %path.display(), "Loaded config");
            }
        }

        Ok(loaded)
    }
}
