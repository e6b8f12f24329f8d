//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::defaults::*;
use super::{Config, CONFIG_FILE_NAME};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `TPLFOLD_` and use double underscores
    /// for nested values. For example:
    /// - `TPLFOLD_REWRITE__TRANSFORM=identity`
    /// - `TPLFOLD_FILES__EXTENSIONS=ts,tsx`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for missing sections
        let builder = set_config_default(builder, "rewrite.property_name", default_property_name())?;
        let builder = set_config_default(builder, "rewrite.quote_style", "double")?;
        let builder = set_config_default(builder, "rewrite.transform", "minify")?;
        let builder = set_config_default(builder, "files.extensions", default_extensions())?;
        let mut builder =
            set_config_default(builder, "files.ignore_patterns", default_ignore_patterns())?;

        // Add the config file if it exists
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("files.extensions")
                .with_list_parse_key("files.ignore_patterns")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (./tplfold.toml or custom --config path)
    /// 3. Environment variables (TPLFOLD_*)
    ///
    /// An explicitly requested config file must exist.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)
            }
            None => Self::from_file(Path::new(CONFIG_FILE_NAME)),
        }
    }
}
