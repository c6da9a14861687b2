//! End-to-end checks of the verifier against issued grants.

use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use grantseal::core::crypto::base64url_encode;
use grantseal::core::CoreError;
use grantseal::policy::ViolationReason;
use grantseal::remote::{FetchError, MemorySource};
use grantseal::{
    ip_hash, summarize_poi, Decision, GrantError, Rejection, RequestContext, RevocationManifest,
    Value, Verifier, VerifierConfig,
};
use grantseal_testkit::{multi_issuer_fixtures, TestFixture};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn verifier_for(fixture: &TestFixture) -> Verifier {
    Verifier::new(fixture.public_key(), VerifierConfig::new().with_now(fixture.now))
        .with_revocations(Arc::clone(&fixture.revocations))
}

#[test]
fn embedded_seal_round_trip() -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);

    let grant = fixture.seal(fixture.grant("g-embedded", Duration::minutes(10)));
    assert!(verifier.verify_embedded(&grant)?);

    let document = serde_json::to_vec(&grant)?;
    assert!(verifier.verify_embedded_json(&document)?);
    let opened = verifier.open_embedded(&document)?;
    assert_eq!(opened, grant);
    Ok(())
}

#[test]
fn embedded_seal_survives_full_precision_numbers() -> Result<()> {
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let grant = fixture.seal(
        fixture
            .grant("g-float", Duration::minutes(10))
            .with_resource(Value::object().with("n", 2.1082247869750922e101)),
    );
    assert!(verifier.verify_embedded(&grant)?);

    let document = serde_json::to_vec(&grant)?;
    assert!(verifier.verify_embedded_json(&document)?);
    assert_eq!(verifier.open_embedded(&document)?, grant);
    Ok(())
}

#[test]
fn embedded_seal_detects_tampering() -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let grant = fixture.seal(fixture.grant("g-tamper", Duration::minutes(10)));

    let mut doc: serde_json::Value = serde_json::to_value(&grant)?;
    doc["sub"] = "user:mallory".into();
    let tampered = serde_json::to_vec(&doc)?;
    assert!(!verifier.verify_embedded_json(&tampered)?);
    assert!(matches!(
        verifier.open_embedded(&tampered),
        Err(GrantError::InvalidSeal { grant_id }) if grant_id == "g-tamper"
    ));
    Ok(())
}

#[test]
fn embedded_seal_false_not_error() -> Result<()> {
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let grant = fixture.seal(fixture.grant("g", Duration::minutes(10)));

    let mut wrong_kind = grant.clone();
    wrong_kind.kind = "access.grant.v0".into();
    assert!(!verifier.verify_embedded(&wrong_kind)?);

    let mut unsealed = grant.clone();
    unsealed.seal = None;
    assert!(!verifier.verify_embedded(&unsealed)?);

    let mut short_sig = grant.clone();
    if let Some(seal) = short_sig.seal.as_mut() {
        seal.sig = "AAAA".into();
    }
    assert!(!verifier.verify_embedded(&short_sig)?);

    let mut bad_b64 = grant;
    if let Some(seal) = bad_b64.seal.as_mut() {
        seal.sig = "not base64!".into();
    }
    assert!(matches!(
        verifier.verify_embedded(&bad_b64),
        Err(GrantError::Core(CoreError::MalformedEncoding(_)))
    ));
    Ok(())
}

#[test]
fn embedded_seal_rejects_other_issuer() -> Result<()> {
    let issuers = multi_issuer_fixtures(2);
    let grant = issuers[0].seal(issuers[0].grant("g", Duration::minutes(1)));
    assert!(!verifier_for(&issuers[1]).verify_embedded(&grant)?);
    Ok(())
}

#[test]
fn compact_token_round_trip() -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let grant = fixture.grant("g-compact", Duration::minutes(10));

    let token = fixture.compact(&grant);
    assert!(token.starts_with("v4.public."));
    assert_eq!(verifier.decode_compact(&token)?, grant);
    assert_eq!(verifier.open_compact(&token)?.grant_id, "g-compact");
    Ok(())
}

#[test]
fn compact_token_framing_errors() {
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let token = fixture.compact(&fixture.grant("g", Duration::minutes(10)));

    let wrong_prefix = token.replacen("v4.public.", "v3.public.", 1);
    assert!(matches!(
        verifier.decode_compact(&wrong_prefix),
        Err(GrantError::Core(CoreError::InvalidPrefix))
    ));

    let short = format!("v4.public.{}", base64url_encode(&[7u8; 63]));
    assert!(matches!(
        verifier.decode_compact(&short),
        Err(GrantError::Core(CoreError::InvalidBody(63)))
    ));

    assert!(matches!(
        verifier.decode_compact("v4.public.***"),
        Err(GrantError::Core(CoreError::MalformedEncoding(_)))
    ));

    let other = multi_issuer_fixtures(1).remove(0);
    assert!(matches!(
        verifier_for(&other).decode_compact(&token),
        Err(GrantError::Core(CoreError::SignatureVerificationFailed))
    ));
}

#[test]
fn expiry_boundary() -> Result<()> {
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);

    let at_now = fixture.grant("g", Duration::zero());
    assert!(matches!(
        verifier.validate(&at_now),
        Err(GrantError::Rejected(Rejection::Expired { .. }))
    ));

    let one_ms = fixture.grant("g", Duration::milliseconds(1));
    verifier.validate(&one_ms)?;

    let token = fixture.compact(&at_now);
    assert!(verifier.decode_compact(&token).is_ok());
    assert!(matches!(
        verifier.open_compact(&token),
        Err(GrantError::Rejected(Rejection::Expired { .. }))
    ));
    Ok(())
}

#[test]
fn required_kid() -> Result<()> {
    let fixture = TestFixture::new().with_kid("issuer-a");
    let grant = fixture.seal(fixture.grant("g", Duration::minutes(5)));
    let document = serde_json::to_vec(&grant)?;

    let pinned = Verifier::new(
        fixture.public_key(),
        VerifierConfig::new().with_now(fixture.now).with_required_kid("issuer-a"),
    );
    pinned.open_embedded(&document)?;

    let other = Verifier::new(
        fixture.public_key(),
        VerifierConfig::new().with_now(fixture.now).with_required_kid("issuer-b"),
    );
    assert!(matches!(
        other.open_embedded(&document),
        Err(GrantError::Rejected(Rejection::KidMismatch { .. }))
    ));

    // Compact payloads carry no seal, so a pinned key id cannot match.
    let token = fixture.compact(&grant);
    assert!(matches!(
        pinned.open_compact(&token),
        Err(GrantError::Rejected(Rejection::KidMismatch { actual: None, .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn revocation_refresh() -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let revoked = fixture.compact(&fixture.grant("g1", Duration::minutes(5)));
    let fine = fixture.compact(&fixture.grant("g2", Duration::minutes(5)));

    let source = MemorySource::serving(&RevocationManifest::new(fixture.at(Duration::zero()), ["g1"]))?;
    assert_eq!(verifier.refresh_revocations(&source).await?, 1);
    assert!(matches!(
        verifier.open_compact(&revoked),
        Err(GrantError::Rejected(Rejection::Revoked(id))) if id == "g1"
    ));
    verifier.open_compact(&fine)?;

    // Shared cache: the fixture sees the same manifest.
    assert!(fixture.revocations.is_revoked("g1"));

    let failing = MemorySource::new();
    failing.push(500, "").await;
    assert!(matches!(
        verifier.refresh_revocations(&failing).await,
        Err(GrantError::Fetch(FetchError::Status(500)))
    ));
    assert!(verifier.revocations().is_revoked("g1"));

    let garbled = MemorySource::new();
    garbled.push(200, "not json").await;
    assert!(matches!(
        verifier.refresh_revocations(&garbled).await,
        Err(GrantError::Fetch(FetchError::Manifest(_)))
    ));
    assert!(verifier.revocations().is_revoked("g1"));
    Ok(())
}

#[test]
fn byte_range_decision() -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let grant = fixture.grant_with_constraints(
        "g-range",
        Duration::minutes(5),
        Value::object().with("byte_range_max", 100u64),
    );
    let token = fixture.compact(&grant);

    let ok = verifier.check_compact(&token, &RequestContext::new().with_range("bytes=0-99"))?;
    assert_eq!(ok, Decision::Allow);

    let ask = verifier.check_compact(&token, &RequestContext::new().with_range("bytes=0-100"))?;
    let poi = ask.poi().expect("ask carries a poi");
    assert_eq!(poi.reason.as_deref(), Some(ViolationReason::ByteRangeExceedsLimit.as_str()));
    assert_eq!(poi.hints, vec!["request <= 100 bytes (e.g., bytes=0-99)".to_string()]);
    Ok(())
}

#[test]
fn configured_byte_cap_is_a_fallback() -> Result<()> {
    let fixture = TestFixture::new();
    let verifier = Verifier::new(
        fixture.public_key(),
        VerifierConfig::new().with_now(fixture.now).with_byte_range_max(10),
    );
    let request = RequestContext::new().with_range("bytes=0-49");

    let uncapped = fixture.grant("g", Duration::minutes(5));
    assert!(!verifier.decide(&uncapped, &request).is_allow());

    let capped = fixture.grant_with_constraints(
        "g",
        Duration::minutes(5),
        Value::object().with("byte_range_max", 50u64),
    );
    assert!(verifier.decide(&capped, &request).is_allow());
    Ok(())
}

#[test]
fn ip_binding_decision() -> Result<()> {
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let grant = fixture.seal(fixture.grant_with_constraints(
        "g-ip",
        Duration::minutes(5),
        Value::object().with("ip_hash", ip_hash("198.51.100.4")),
    ));
    let document = serde_json::to_vec(&grant)?;

    let here = RequestContext::new().with_client_ip("198.51.100.4");
    assert!(verifier.check_embedded(&document, &here)?.is_allow());

    let elsewhere = RequestContext::new().with_client_ip("198.51.100.5");
    let decision = verifier.check_embedded(&document, &elsewhere)?;
    let poi = decision.poi().expect("ask carries a poi");
    assert_eq!(poi.violations, vec!["ip_hash_mismatch".to_string()]);
    assert_eq!(poi.hints, vec!["use X-Client-IP or request a new grant for this IP".to_string()]);
    Ok(())
}

#[test]
fn ip_binding_without_observed_ip_asks() -> Result<()> {
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let grant = fixture.grant_with_constraints(
        "g-ip",
        Duration::minutes(5),
        Value::object().with("ip_hash", ip_hash("198.51.100.4")),
    );
    let token = fixture.compact(&grant);

    let decision = verifier.check_compact(&token, &RequestContext::new())?;
    let poi = decision.poi().expect("ask carries a poi");
    assert_eq!(poi.violations, vec!["ip_hash_mismatch".to_string()]);
    Ok(())
}

#[test]
fn decision_lists_policy_before_constraints() -> Result<()> {
    let fixture = TestFixture::new();
    fixture.revoke(&["g-bad"]);
    let verifier = verifier_for(&fixture);
    let grant = fixture.grant_with_constraints(
        "g-bad",
        Duration::minutes(-1),
        Value::object().with("byte_range_max", 1u64),
    );

    let decision = verifier.decide(&grant, &RequestContext::new().with_range("bytes=0-1"));
    let poi = decision.poi().expect("ask carries a poi");
    assert_eq!(poi.reason.as_deref(), Some("expired"));
    assert_eq!(
        poi.violations,
        vec!["expired", "revoked", "byte_range_exceeds_limit"]
    );
    assert_eq!(poi.hints.len(), 1);

    // What the server sends is what the client reads back.
    let wire = serde_json::to_value(&decision)?;
    assert_eq!(summarize_poi(&wire), decision);
    Ok(())
}

#[test]
fn bad_seal_is_an_error_not_a_decision() -> Result<()> {
    let fixture = TestFixture::new();
    let verifier = verifier_for(&fixture);
    let mut grant = fixture.seal(fixture.grant("g", Duration::minutes(5)));
    grant.nonce.push('!');
    let document = serde_json::to_vec(&grant)?;
    assert!(matches!(
        verifier.check_embedded(&document, &RequestContext::new()),
        Err(GrantError::InvalidSeal { .. })
    ));
    Ok(())
}
