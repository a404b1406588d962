//! Cascade tests for the API key classifier.
//!
//! Tests verify:
//! - Earlier chain links always decide the verdict
//! - Status codes pick the specific branch of a link
//! - Classification is a pure function (same input = same verdict)

use hudcheck_common::classify::classify;
use hudcheck_common::probe::registry::{ACCOUNT, CHARACTERS, TOKENINFO};
use hudcheck_common::{OutcomeSet, ProbeBody, ProbeOutcome, Severity};
use serde_json::json;

fn ok(body: ProbeBody) -> ProbeOutcome {
    ProbeOutcome::Success {
        status: 200,
        elapsed_ms: 35,
        body,
    }
}

fn http_error(status: u16) -> ProbeOutcome {
    ProbeOutcome::Error {
        status: Some(status),
        message: "Invalid access token".to_string(),
        elapsed_ms: 41,
        details: Some(json!({"text": "Invalid access token"})),
    }
}

fn transport_error() -> ProbeOutcome {
    ProbeOutcome::Error {
        status: None,
        message: "error sending request".to_string(),
        elapsed_ms: 2,
        details: None,
    }
}

fn outcomes(t: ProbeOutcome, a: ProbeOutcome, c: ProbeOutcome) -> OutcomeSet {
    vec![
        (TOKENINFO.to_string(), t),
        (ACCOUNT.to_string(), a),
        (CHARACTERS.to_string(), c),
    ]
    .into_iter()
    .collect()
}

/// Every state a single probe can be in, for exhaustive later-link sweeps
fn every_state() -> Vec<ProbeOutcome> {
    vec![
        ProbeOutcome::Idle,
        ok(ProbeBody::Empty),
        ok(ProbeBody::Json(json!(["a"]))),
        http_error(401),
        http_error(403),
        http_error(500),
        http_error(503),
        transport_error(),
    ]
}

#[test]
fn test_all_succeeded_counts_characters() {
    let characters = json!(["Zojja", "Rytlock", "Caithe", "Logan", "Eir"]);
    let verdict = classify(&outcomes(
        ok(ProbeBody::Json(json!({"id": "key", "permissions": ["account", "characters"]}))),
        ok(ProbeBody::Json(json!({"name": "Player.1234"}))),
        ok(ProbeBody::Json(characters)),
    ));

    assert_eq!(verdict.severity, Severity::Success);
    assert_eq!(verdict.title, "API key looks healthy");
    assert!(verdict
        .remediation
        .iter()
        .any(|b| b == "Characters returned: 5"));
}

#[test]
fn test_unauthorized_key_regardless_of_later_links() {
    for a in every_state() {
        for c in every_state() {
            let verdict = classify(&outcomes(http_error(401), a.clone(), c.clone()));
            assert_eq!(verdict.severity, Severity::Error);
            assert_eq!(verdict.title, "The API key is not accepted");
        }
    }
}

#[test]
fn test_forbidden_key_regardless_of_later_links() {
    for a in every_state() {
        for c in every_state() {
            let verdict = classify(&outcomes(http_error(403), a.clone(), c.clone()));
            assert_eq!(verdict.severity, Severity::Error);
            assert_eq!(verdict.title, "The API key is not accepted");
            assert_eq!(verdict.remediation.len(), 3);
        }
    }
}

#[test]
fn test_pending_link_outranks_rejected_key() {
    for rejected in [http_error(401), http_error(403)] {
        let cases = [
            outcomes(rejected.clone(), ProbeOutcome::Loading, ok(ProbeBody::Empty)),
            outcomes(rejected.clone(), http_error(500), ProbeOutcome::Loading),
            outcomes(ProbeOutcome::Loading, rejected.clone(), rejected.clone()),
        ];
        for set in &cases {
            let verdict = classify(set);
            assert_eq!(verdict.severity, Severity::Info);
            assert_eq!(verdict.title, "Checking…");
        }
    }
}

#[test]
fn test_missing_characters_permission() {
    let verdict = classify(&outcomes(
        ok(ProbeBody::Empty),
        ok(ProbeBody::Json(json!({"name": "Player.1234"}))),
        http_error(403),
    ));

    assert_eq!(verdict.severity, Severity::Warning);
    assert_eq!(verdict.title, "Account works, but characters are forbidden");
    assert!(verdict
        .remediation
        .iter()
        .any(|b| b.contains("missing 'characters' permission")));
}

#[test]
fn test_account_link_beats_characters_link() {
    let verdict = classify(&outcomes(ok(ProbeBody::Empty), http_error(403), http_error(403)));
    assert_eq!(verdict.title, "Key is valid, but can’t access /account");
}

#[test]
fn test_transport_failure_on_tokeninfo() {
    let verdict = classify(&outcomes(transport_error(), ok(ProbeBody::Empty), ok(ProbeBody::Empty)));
    assert_eq!(verdict.severity, Severity::Error);
    assert_eq!(verdict.title, "Token validation failed");
}

#[test]
fn test_classify_is_idempotent() {
    for t in every_state() {
        for a in every_state() {
            for c in every_state() {
                let set = outcomes(t.clone(), a.clone(), c.clone());
                assert_eq!(classify(&set), classify(&set));
            }
        }
    }
}
