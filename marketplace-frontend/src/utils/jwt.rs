use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl AccessTokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decode JWT claims without validation.
///
/// The client only reads `exp` to schedule refreshes; the backend remains
/// the one validating signatures.
pub fn decode_jwt_claims(token: &str) -> Result<AccessTokenClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: AccessTokenClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    Ok(claims)
}

/// True when `token` expires within `leeway` of `now`. Opaque tokens and
/// tokens without `exp` never report as expiring. A leeway reaching past
/// the representable range counts as expiring.
pub fn expires_within(token: &str, leeway: chrono::Duration, now: DateTime<Utc>) -> bool {
    match decode_jwt_claims(token) {
        Ok(claims) => claims.expires_at().is_some_and(|expires_at| {
            expires_at
                .checked_sub_signed(leeway)
                .is_none_or(|threshold| threshold <= now)
        }),
        Err(_) => false,
    }
}
