//! # Configuration
//!
//! Module configuration is managed by [`confique`], which handles layered
//! loading from environment variables and TOML files.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `GFXFILTER_TEMP_NAME_PREFIX`,
//!    `GFXFILTER_DEFAULT_FILTER_NAME`
//! 2. **Config file**: a `gfxfilter.toml` passed to [`FilterModuleConfig::load`]
//! 3. **Compiled defaults**: via `#[config(default = ...)]`
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `temp_name_prefix` | `temp` | Prefix of generated names (`temp1`, `temp2`, ...) |
//! | `default_filter_name` | `default` | Name of the module's default filter |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FilterError, Result};

/// Configuration for a graphics filter module.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FilterModuleConfig {
    /// Prefix of the names given to filters created without one.
    #[config(default = "temp", env = "GFXFILTER_TEMP_NAME_PREFIX")]
    pub temp_name_prefix: String,

    /// Name under which the default visibility filter is registered.
    #[config(default = "default", env = "GFXFILTER_DEFAULT_FILTER_NAME")]
    pub default_filter_name: String,
}

impl Default for FilterModuleConfig {
    fn default() -> Self {
        Self {
            temp_name_prefix: "temp".to_string(),
            default_filter_name: "default".to_string(),
        }
    }
}

impl FilterModuleConfig {
    /// Load from the environment, then `path` (if it exists), then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        let config = builder
            .load()
            .map_err(|e| FilterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.temp_name_prefix.is_empty()
            || self.temp_name_prefix.contains(char::is_whitespace)
        {
            return Err(FilterError::Config(format!(
                "temp_name_prefix '{}' cannot be used in filter names",
                self.temp_name_prefix
            )));
        }
        crate::validation::validate_filter_name(&self.default_filter_name)
            .map_err(|e| FilterError::Config(e.to_string()))
    }
}
