//! Config file discovery.
//!
//! Two optional layers, later overriding earlier:
//! 1. `<config dir>/runiq/config.toml`, or `$RUNIQ_CONFIG_DIR/config.toml`
//! 2. `./runiq.toml`
//!
//! CLI flags and environment variables are applied on top by the binary.

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, RuniqConfig};

const PROJECT_CONFIG_FILE: &str = "runiq.toml";
const USER_CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "RUNIQ_CONFIG_DIR";

/// A merged configuration plus anything worth telling the user about it.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: RuniqConfig,
    /// Files that were read and merged, lowest precedence first.
    pub files: Vec<PathBuf>,
    /// Broken layers and plaintext secrets.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Load one explicit file. Unlike discovery, a broken file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut loaded = Self {
            config: read_config_file(path)?,
            files: vec![path.to_path_buf()],
            warnings: Vec::new(),
        };
        loaded.warn_on_plaintext_secret();
        Ok(loaded)
    }

    /// Discover layers in the user config dir and the current directory.
    pub fn discover() -> Self {
        Self::discover_in(Path::new("."), user_config_dir().as_deref())
    }

    /// Discover layers in explicit directories.
    ///
    /// Missing files are skipped and unreadable ones become warnings.
    pub fn discover_in(project_dir: &Path, user_dir: Option<&Path>) -> Self {
        let mut loaded = Self::default();

        let candidates = user_dir
            .map(|dir| dir.join(USER_CONFIG_FILE))
            .into_iter()
            .chain(std::iter::once(project_dir.join(PROJECT_CONFIG_FILE)));

        for path in candidates.filter(|p| p.is_file()) {
            match read_config_file(&path) {
                Ok(layer) => {
                    loaded.config.merge(layer);
                    loaded.files.push(path);
                }
                Err(e) => loaded.warnings.push(format!("Skipped {}: {}", path.display(), e)),
            }
        }

        loaded.warn_on_plaintext_secret();
        loaded
    }

    fn warn_on_plaintext_secret(&mut self) {
        if self
            .config
            .strava
            .as_ref()
            .is_some_and(|strava| strava.has_plaintext_secret())
        {
            self.warnings.push(
                "[strava] client_secret is stored in plain text; \
                 prefer the STRAVA_CLIENT_SECRET environment variable"
                    .to_string(),
            );
        }
    }
}

/// Read and parse a single config file.
pub fn read_config_file(path: &Path) -> Result<RuniqConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    RuniqConfig::from_toml(&contents)
}

/// Directory holding the user-level `config.toml`.
///
/// `RUNIQ_CONFIG_DIR` wins over the platform config directory.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("runiq")),
    }
}
