//! Configuration management for hudcheck.
//!
//! Loads settings from `$XDG_CONFIG_HOME/hudcheck/config.toml` (or an explicit
//! path) and falls back to built-in defaults. Every field is optional.

use crate::probe::registry::{EndpointRegistry, DEFAULT_API_BASE};
use crate::{HudcheckError, ProbeDefinition, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment override for the config path
pub const CONFIG_ENV: &str = "HUDCHECK_CONFIG";

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("hudcheck/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// API key troubleshooter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Base URL of the Guild Wars 2 API
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

/// Report header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_title")]
    pub title: String,

    #[serde(default = "default_report_link")]
    pub link: String,
}

fn default_report_title() -> String {
    "Network Health Check Report".to_string()
}

fn default_report_link() -> String {
    "https://blishhud.com/docs/user/tools/network-troubleshooting".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_report_title(),
            link: default_report_link(),
        }
    }
}

/// Network health check settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Replaces the built-in resource list when non-empty
    #[serde(default)]
    pub resources: Vec<ProbeDefinition>,
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HudcheckConfig {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub credential: CredentialConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    /// Where this config was read from, if anywhere
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl HudcheckConfig {
    /// Default location under the user's config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hudcheck").join("config.toml"))
    }

    /// Load from `explicit` (must exist) or the default path (may be absent)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| HudcheckError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::parse(&content).map_err(|e| match e {
            HudcheckError::Config { message, .. } => HudcheckError::Config {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        config.source = Some(path.to_path_buf());

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse TOML text and validate it
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| HudcheckError::Config {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.connectivity_registry()?;
        Ok(config)
    }

    pub fn credential_registry(&self) -> EndpointRegistry {
        EndpointRegistry::credential(&self.credential.api_base)
    }

    pub fn connectivity_registry(&self) -> Result<EndpointRegistry> {
        if self.connectivity.resources.is_empty() {
            Ok(EndpointRegistry::connectivity())
        } else {
            EndpointRegistry::from_definitions(self.connectivity.resources.clone())
        }
    }
}
