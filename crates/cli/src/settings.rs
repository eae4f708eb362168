//! Layered configuration: optional file, then `UNIRES_*` environment.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use unires_universal_resolver::{ClientConfig, ResolverConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolver: ResolverConfig,
    pub client: ClientConfig,
}

impl Settings {
    /// Environment keys use `__` between sections, for example
    /// `UNIRES_RESOLVER__REVERSE_SUFFIX` or `UNIRES_CLIENT__MAX_LOOKUPS`.
    /// Gateway lists are comma separated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("UNIRES")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("resolver.batch_gateway_urls")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
