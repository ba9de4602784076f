//! Developer token construction and signing
//!
//! Builds the ES256-signed JWT proving this application's identity to
//! the Apple Music API. The header carries the signing key id, the
//! payload carries the team id as issuer plus a fixed 24-hour validity
//! window. A fresh token is minted per call; with the 24-hour window,
//! once per process invocation is enough.

use std::time::{SystemTime, UNIX_EPOCH};

use common::Secret;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::credentials::DeveloperCredentials;
use crate::error::{Error, Result};

/// Fixed developer token validity in seconds (24 hours, not configurable).
pub const TOKEN_VALIDITY_SECS: u64 = 24 * 60 * 60;

/// Registered claims of the developer token payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

/// Mint a fresh developer token valid for the next 24 hours.
pub fn sign(credentials: &DeveloperCredentials) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    sign_at(credentials, now)
}

/// Mint a developer token with an explicit `iat` (unix seconds).
///
/// Identity lengths are measured in Unicode code points, not bytes;
/// Apple-assigned ids are ASCII in practice so the two agree. The key
/// bytes are re-read from disk on every call and zeroed after use.
pub fn sign_at(credentials: &DeveloperCredentials, now: u64) -> Result<String> {
    let team_chars = credentials.team_id.chars().count();
    if team_chars != 10 {
        return Err(Error::InvalidTeamId(team_chars));
    }
    let key_chars = credentials.key_id.chars().count();
    if key_chars != 10 {
        return Err(Error::InvalidKeyId(key_chars));
    }

    let pem = Secret::new(std::fs::read(&credentials.private_key_path).map_err(
        |e| Error::KeyUnreadable(format!("{}: {e}", credentials.private_key_path.display())),
    )?);
    let key =
        EncodingKey::from_ec_pem(pem.expose()).map_err(|e| Error::KeyInvalid(e.to_string()))?;

    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(credentials.key_id.clone());

    let claims = Claims {
        iss: credentials.team_id.clone(),
        iat: now,
        exp: now + TOKEN_VALIDITY_SECS,
    };

    jsonwebtoken::encode(&header, &claims, &key).map_err(|e| Error::KeyInvalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{DecodingKey, Validation};

    const TEST_TEAM_ID: &str = "TEAM000001";
    const TEST_KEY_ID: &str = "KEY0000001";

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
    }

    fn test_credentials() -> DeveloperCredentials {
        DeveloperCredentials::new(TEST_TEAM_ID, TEST_KEY_ID, fixture("test_private_key.p8"))
    }

    /// Decode the payload segment without verifying the signature.
    fn unverified_payload(token: &str) -> serde_json::Value {
        let segment = token.split('.').nth(1).expect("payload segment");
        let bytes = URL_SAFE_NO_PAD.decode(segment).expect("base64url payload");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[test]
    fn produces_three_segment_compact_jws() {
        let token = sign(&test_credentials()).unwrap();
        assert_eq!(token.matches('.').count(), 2, "header.payload.signature");
    }

    #[test]
    fn header_carries_es256_and_key_id() {
        let token = sign(&test_credentials()).unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::ES256);
        assert_eq!(header.kid.as_deref(), Some(TEST_KEY_ID));
    }

    #[test]
    fn payload_claims_span_exactly_24_hours() {
        let token = sign_at(&test_credentials(), 1_700_000_000).unwrap();
        let payload = unverified_payload(&token);
        assert_eq!(payload["iss"], TEST_TEAM_ID);
        assert_eq!(payload["iat"], 1_700_000_000u64);
        assert_eq!(payload["exp"], 1_700_000_000u64 + 86_400);
    }

    #[test]
    fn signature_verifies_with_matching_public_key() {
        let token = sign(&test_credentials()).unwrap();
        let pem = std::fs::read(fixture("test_public_key.pem")).unwrap();
        let key = DecodingKey::from_ec_pem(&pem).unwrap();
        let decoded =
            jsonwebtoken::decode::<Claims>(&token, &key, &Validation::new(Algorithm::ES256))
                .unwrap();
        assert_eq!(decoded.claims.iss, TEST_TEAM_ID);
        assert_eq!(decoded.claims.exp, decoded.claims.iat + 86_400);
    }

    #[test]
    fn signature_rejected_by_other_public_key() {
        let token = sign(&test_credentials()).unwrap();
        let pem = std::fs::read(fixture("other_public_key.pem")).unwrap();
        let key = DecodingKey::from_ec_pem(&pem).unwrap();
        let result =
            jsonwebtoken::decode::<Claims>(&token, &key, &Validation::new(Algorithm::ES256));
        assert!(result.is_err(), "wrong public key must fail verification");
    }

    #[test]
    fn short_team_id_rejected_before_signing() {
        let credentials =
            DeveloperCredentials::new("SHORT", TEST_KEY_ID, fixture("test_private_key.p8"));
        match sign(&credentials) {
            Err(Error::InvalidTeamId(5)) => {}
            other => panic!("expected InvalidTeamId(5), got {other:?}"),
        }
    }

    #[test]
    fn short_key_id_rejected_before_signing() {
        let credentials =
            DeveloperCredentials::new(TEST_TEAM_ID, "SHORT", fixture("test_private_key.p8"));
        match sign(&credentials) {
            Err(Error::InvalidKeyId(5)) => {}
            other => panic!("expected InvalidKeyId(5), got {other:?}"),
        }
    }

    #[test]
    fn identity_length_counts_code_points_not_bytes() {
        // 10 code points, 20 bytes: passes the length check and signs.
        let credentials =
            DeveloperCredentials::new("ÅÅÅÅÅÅÅÅÅÅ", TEST_KEY_ID, fixture("test_private_key.p8"));
        assert!(sign(&credentials).is_ok());
    }

    #[test]
    fn missing_key_file_is_key_unreadable() {
        let credentials =
            DeveloperCredentials::new(TEST_TEAM_ID, TEST_KEY_ID, "/nonexistent/key.p8");
        match sign(&credentials) {
            Err(Error::KeyUnreadable(_)) => {}
            other => panic!("expected KeyUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn garbage_key_file_is_key_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_key.p8");
        std::fs::write(&path, "this is not pem").unwrap();

        let credentials = DeveloperCredentials::new(TEST_TEAM_ID, TEST_KEY_ID, path);
        match sign(&credentials) {
            Err(Error::KeyInvalid(_)) => {}
            other => panic!("expected KeyInvalid, got {other:?}"),
        }
    }
}
