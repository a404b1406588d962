//! Endpoint registry - ordered, immutable probe definitions

use super::context::Secret;
use crate::{HudcheckError, ProbeDefinition, ResourceKind, Result};
use reqwest::Url;
use tracing::debug;

/// Placeholder replaced by the run's secret
pub const SECRET_PLACEHOLDER: &str = "{key}";

/// Default Guild Wars 2 API base
pub const DEFAULT_API_BASE: &str = "https://api.guildwars2.com/v2";

/// Credential chain ids, in cascade order
pub const TOKENINFO: &str = "tokeninfo";
pub const ACCOUNT: &str = "account";
pub const CHARACTERS: &str = "characters";

/// Ordered registry of probe definitions
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    probes: Vec<ProbeDefinition>,
}

impl EndpointRegistry {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate ids
    pub fn from_definitions(probes: Vec<ProbeDefinition>) -> Result<Self> {
        let mut registry = Self::new();
        for probe in probes {
            if registry.get(&probe.id).is_some() {
                return Err(HudcheckError::Config {
                    path: Default::default(),
                    message: format!("duplicate probe id '{}'", probe.id),
                });
            }
            registry.probes.push(probe);
        }
        Ok(registry)
    }

    /// API key checks: tokeninfo -> account -> characters
    pub fn credential(api_base: &str) -> Self {
        let base = api_base.trim_end_matches('/');
        Self {
            probes: vec![
                ProbeDefinition::new(
                    TOKENINFO,
                    "/tokeninfo",
                    format!("{}/tokeninfo?access_token={}", base, SECRET_PLACEHOLDER),
                    ResourceKind::Json,
                ),
                ProbeDefinition::new(
                    ACCOUNT,
                    "/account",
                    format!("{}/account?access_token={}", base, SECRET_PLACEHOLDER),
                    ResourceKind::Json,
                ),
                ProbeDefinition::new(
                    CHARACTERS,
                    "/characters?ids=all",
                    format!(
                        "{}/characters?ids=all&access_token={}",
                        base, SECRET_PLACEHOLDER
                    ),
                    ResourceKind::Json,
                ),
            ],
        }
    }

    /// Asset CDN, module repository and update check endpoints
    pub fn connectivity() -> Self {
        let probe = |id: &str, name: &str, url: &str, kind| ProbeDefinition::new(id, name, url, kind);
        Self {
            probes: vec![
                probe(
                    "img_1",
                    "Example Asset 1 (456011)",
                    "https://assets.gw2dat.com/456011.png",
                    ResourceKind::Image,
                ),
                probe(
                    "img_2",
                    "Example Asset 2 (1822111)",
                    "https://assets.gw2dat.com/1822111.png",
                    ResourceKind::Image,
                ),
                probe(
                    "img_3",
                    "Example Asset 3 (1822021)",
                    "https://assets.gw2dat.com/1822021.png",
                    ResourceKind::Image,
                ),
                probe(
                    "img_4",
                    "Example Asset 4 (63328)",
                    "https://assets.gw2dat.com/63328.png",
                    ResourceKind::Image,
                ),
                probe(
                    "cdn_meta",
                    "Asset CDN Metadata",
                    "https://assets.gw2dat.com/metadata.gz",
                    ResourceKind::Binary,
                ),
                probe(
                    "repo_live",
                    "Module Repo Listing",
                    "https://pkgs.blishhud.com/packages.gz",
                    ResourceKind::Binary,
                ),
                probe(
                    "repo_prev",
                    "Module Repo Prerelease",
                    "https://pkgs.blishhud.com/preview-packages.gz",
                    ResourceKind::Binary,
                ),
                probe(
                    "ver_check",
                    "Update Check",
                    "https://versions.blishhud.com/all.json",
                    ResourceKind::Json,
                ),
            ],
        }
    }

    /// Get probe by ID
    pub fn get(&self, id: &str) -> Option<&ProbeDefinition> {
        self.probes.iter().find(|p| p.id == id)
    }

    /// All probes in registry order
    pub fn definitions(&self) -> &[ProbeDefinition] {
        &self.probes
    }

    pub fn count(&self) -> usize {
        self.probes.len()
    }
}

/// Whether the probe's URL embeds the run secret
pub fn needs_secret(probe: &ProbeDefinition) -> bool {
    probe.url_template.contains(SECRET_PLACEHOLDER)
}

/// Final URL for one dispatch; the secret is URL-escaped into its query value
pub fn resolve_url(probe: &ProbeDefinition, secret: Option<&Secret>) -> Result<Url> {
    let mut url = Url::parse(&probe.url_template).map_err(|e| HudcheckError::InvalidUrl {
        probe: probe.id.clone(),
        message: e.to_string(),
    })?;

    if !needs_secret(probe) {
        return Ok(url);
    }

    let secret = secret.ok_or_else(|| HudcheckError::MissingSecret {
        probe: probe.id.clone(),
    })?;

    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if v == SECRET_PLACEHOLDER {
                replaced = true;
                (k.into_owned(), secret.expose().to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    if !replaced {
        return Err(HudcheckError::InvalidUrl {
            probe: probe.id.clone(),
            message: format!("{} must be a query value", SECRET_PLACEHOLDER),
        });
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    debug!("Resolved URL for probe {}", probe.id);
    Ok(url)
}
