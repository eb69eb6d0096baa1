//! Configuration for the RunIQ dev tools.
//!
//! TOML files are discovered and layered (user config, then project-local
//! `runiq.toml`). Every setting is optional; the CLI applies its own flags on
//! top and fills the rest from crate defaults.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{LoadedConfig, read_config_file, user_config_dir};
pub use error::{ConfigError, Result};
pub use types::{RuniqConfig, ServerSection, StravaSection};
