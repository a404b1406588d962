//! API key cascade: tokeninfo -> account -> characters
//!
//! Each link only means something if the previous one succeeded, so the first
//! failing link decides the verdict. Earlier links always win over later ones,
//! and a recognised status code wins over the generic branch of the same link.

use crate::probe::registry::{ACCOUNT, CHARACTERS, TOKENINFO};
use crate::{OutcomeSet, ProbeBody, ProbeOutcome, Severity, Verdict};

const RETRY_LATER: &str =
    "Retry; if it persists, it may be a transient API issue that you'll need to wait until it resolves.";
const CHECK_DETAILS: &str = "Check the error details shown below.";

/// Classify a credential outcome set (pure, deterministic)
pub fn classify(outcomes: &OutcomeSet) -> Verdict {
    let idle = ProbeOutcome::Idle;
    let t = outcomes.get(TOKENINFO).unwrap_or(&idle);
    let a = outcomes.get(ACCOUNT).unwrap_or(&idle);
    let c = outcomes.get(CHARACTERS).unwrap_or(&idle);
    let chain = [t, a, c];

    if chain.iter().all(|o| o.is_idle()) {
        return Verdict::new(
            Severity::Info,
            "Run the checks",
            &["Paste a key and click Run checks."],
        );
    }

    if chain.iter().any(|o| o.is_loading()) {
        return Verdict::new(Severity::Info, "Checking…", &["Waiting for responses."]);
    }

    if t.is_error() {
        return tokeninfo_failed(t.status());
    }

    if t.is_success() && a.is_error() {
        return account_failed(a.status());
    }

    if a.is_success() && c.is_error() {
        return characters_failed(c.status());
    }

    if let ProbeOutcome::Success { body, .. } = c {
        if t.is_success() && a.is_success() {
            return healthy(body);
        }
    }

    Verdict::new(
        Severity::Info,
        "Mixed results",
        &["Some calls succeeded and some failed—use the per-endpoint details below."],
    )
}

fn tokeninfo_failed(status: Option<u16>) -> Verdict {
    match status {
        Some(401) | Some(403) => Verdict::new(
            Severity::Error,
            "The API key is not accepted",
            &[
                "This usually means the key is wrong, revoked, or expired.",
                "Double-check you pasted the full key (no extra spaces).",
                "Generate a new key and try again.",
            ],
        ),
        _ => Verdict::new(
            Severity::Error,
            "Token validation failed",
            &[
                "The tokeninfo endpoint didn’t return a valid response.",
                "If this is a network/CORS issue, try another browser or disable blocking extensions.",
                "If the Guild Wars 2 API is down, retry later.",
            ],
        ),
    }
}

fn account_failed(status: Option<u16>) -> Verdict {
    match status {
        Some(401) | Some(403) | Some(500) => Verdict::new(
            Severity::Warning,
            "Key is valid, but can’t access /account",
            &["Key looks real (tokeninfo succeeded), but /account didn't load correctly."],
        ),
        _ => Verdict::new(
            Severity::Warning,
            "Key is valid, but /account errored",
            &[
                "Token is accepted, but /account request failed for another reason.",
                CHECK_DETAILS,
                RETRY_LATER,
            ],
        ),
    }
}

fn characters_failed(status: Option<u16>) -> Verdict {
    match status {
        Some(401) | Some(403) => Verdict::new(
            Severity::Warning,
            "Account works, but characters are forbidden",
            &[
                "Your key can read /account but not /characters.",
                "Most common cause: missing 'characters' permission on the key.",
                "Fix: re-create the key and enable the characters permission.",
                RETRY_LATER,
            ],
        ),
        _ => Verdict::new(
            Severity::Warning,
            "Account works, but /characters errored",
            &[
                "Key is valid and can read /account, but /characters request failed.",
                CHECK_DETAILS,
                RETRY_LATER,
            ],
        ),
    }
}

fn healthy(characters: &ProbeBody) -> Verdict {
    let count = match characters {
        ProbeBody::Json(serde_json::Value::Array(items)) => Some(items.len()),
        _ => None,
    };

    let detail = match count {
        Some(n) => format!("Characters returned: {}", n),
        None => "Characters returned successfully.".to_string(),
    };

    Verdict {
        severity: Severity::Success,
        title: "API key looks healthy".to_string(),
        remediation: vec![
            "tokeninfo, account, and characters all succeeded.".to_string(),
            detail,
        ],
    }
}
