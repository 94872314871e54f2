//! Configuration module for cloudlog.
//!
//! Loads configuration from optional YAML/TOML files and environment
//! variables. The project id is read once at startup; request-scoped
//! loggers qualify trace ids with it.

use std::env;

use ::config::{Config as ConfigLoader, Environment, File, Map};
use serde::Deserialize;

use crate::error::LogResult;

/// Environment variable holding the Google Cloud project id.
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// Cloud project used to qualify trace ids. Tracing is off without it.
    #[serde(default)]
    project_id: Option<String>,
    /// Filter directives for the tracing bridge when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            filter: default_filter(),
        }
    }
}

impl LogConfig {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. `GOOGLE_CLOUD_PROJECT` (project id only)
    /// 2. Environment variables (`CLOUDLOG__*`)
    /// 3. config/local (if exists)
    /// 4. config/default (if exists)
    pub fn load() -> LogResult<Self> {
        Self::build(true, None)
    }

    /// Load configuration from the environment only.
    ///
    /// Never fails; an unreadable environment falls back to defaults.
    pub fn from_env() -> Self {
        Self::build(false, None).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default logging configuration");
            Self::default()
        })
    }

    fn build(with_files: bool, vars: Option<Map<String, String>>) -> LogResult<Self> {
        let project = match &vars {
            Some(vars) => vars.get(PROJECT_ENV).cloned(),
            None => env::var(PROJECT_ENV).ok(),
        }
        .filter(|p| !p.is_empty());

        let mut builder = ConfigLoader::builder();
        if with_files {
            builder = builder
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config/local").required(false));
        }
        let loaded: Self = builder
            .add_source(
                Environment::with_prefix("CLOUDLOG")
                    .separator("__")
                    .source(vars),
            )
            .set_override_option("project_id", project)?
            .build()?
            .try_deserialize()?;

        tracing::debug!(
            project_id = loaded.project_id().unwrap_or("-"),
            filter = %loaded.filter,
            "Logging configuration loaded"
        );
        Ok(loaded)
    }

    /// The project id, if one is configured and non-empty.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref().filter(|p| !p.is_empty())
    }

    /// Default filter directives for the tracing bridge.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Set the project id.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the default filter directives.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}
