//! Per-run context: the secret interpolated into probe URLs

/// A credential that is never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Trim surrounding whitespace; `None` when nothing is left
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw value, for URL interpolation only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Inputs of a single orchestrator run
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub secret: Option<Secret>,
}

impl RunContext {
    /// Context for probes with static URLs
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_secret(secret: Secret) -> Self {
        Self {
            secret: Some(secret),
        }
    }

    /// Context for the credential flow; rejects a key that is blank after trimming
    pub fn with_api_key(raw: &str) -> crate::Result<Self> {
        Secret::new(raw)
            .map(Self::with_secret)
            .ok_or(crate::HudcheckError::EmptyApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_trims() {
        let secret = Secret::new("  ABCD-1234 \n").unwrap();
        assert_eq!(secret.expose(), "ABCD-1234");
        assert!(Secret::new("   ").is_none());
    }

    #[test]
    fn test_secret_never_printed() {
        let ctx = RunContext::with_api_key("SUPER-SECRET-KEY").unwrap();
        let debug = format!("{:?}", ctx);
        assert!(!debug.contains("SUPER-SECRET-KEY"));
        assert!(debug.contains("***"));
        assert_eq!(ctx.secret.unwrap().to_string(), "***");
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let err = RunContext::with_api_key(" \t ").unwrap_err();
        assert!(matches!(err, crate::HudcheckError::EmptyApiKey));
    }
}
