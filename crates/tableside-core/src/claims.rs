//! Unverified role-claim decoding.
//!
//! Extracts the role claim from an access token without verifying its
//! signature. The token is treated as opaque except for its claims
//! segment: dot-separated, with the second segment carrying unpadded
//! base64url-encoded JSON.
//!
//! # This is not a security boundary
//!
//! No cryptographic verification happens here; trust is delegated to the
//! issuing authority, which validated the token before redirecting it to
//! us. The decoded role steers navigation and presentation only.
//! Authorization decisions MUST NOT be based on this value without
//! server-side verification; the server re-checks the token on every
//! authenticated call.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use tableside_proto::Role;

use crate::error::ClaimError;

/// Claims we read out of the token payload. Everything else in the token
/// is opaque to the client.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    role: Role,
}

/// Decode the role claim from an access token.
///
/// Pure and synchronous; no network. Fails with [`ClaimError`] when the
/// token cannot be parsed into its claim structure. Callers treat that
/// as fatal to the current bootstrap attempt, not as retryable.
pub fn decode_role(access_token: &str) -> Result<Role, ClaimError> {
    let claims_segment = access_token.split('.').nth(1).ok_or(ClaimError::Structure)?;

    let payload = URL_SAFE_NO_PAD
        .decode(claims_segment)
        .map_err(|e| ClaimError::Encoding(e.to_string()))?;

    let claims: TokenClaims =
        serde_json::from_slice(&payload).map_err(|e| ClaimError::Claims(e.to_string()))?;

    Ok(claims.role)
}
