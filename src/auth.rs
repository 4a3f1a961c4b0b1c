//! Session tokens.
//!
//! The gateway issues an HS256 token at sign-in. `sub` is the session key the
//! admin profile is stored under and `role` the role slug it was issued for.
//!
//! Sign-in itself is authorised by the access token the portal API issued,
//! signed with the same shared secret and carrying the resolved admin profile.

use hyper::http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Auth as AuthConfig;
use crate::error::{Error, Result};
use crate::profile::AdminProfile;

const MIN_SECRET_LENGTH: usize = 32;

fn validate_secret(config: &AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(Error::Configuration(format!(
            "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Session key.
    pub sub: String,
    /// Role slug at sign-in.
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Claims of a portal API access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalClaims {
    /// Session key the profile is stored under.
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    /// The admin profile the portal API resolved for `sub`.
    pub profile: AdminProfile,
}

/// Create a session token.
pub fn create_token(config: &AuthConfig, sub: &str, role: &str) -> Result<String> {
    validate_secret(config)?;
    let now = jiff::Timestamp::now();
    let hours = i64::from(config.token_expiry_days) * 24;
    let exp = now + jiff::Span::new().hours(hours);

    let claims = Claims {
        sub: sub.to_string(),
        role: role.to_string(),
        exp: exp.as_second(),
        iat: now.as_second(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token creation failed: {e}")))
}

/// Verify and decode a session token.
///
/// Expired tokens give `TokenExpired`; every other failure is `Unauthorized`.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    decode_claims(config, token)
}

/// Verify a portal API access token presented at sign-in.
///
/// Fails like [`verify_token`]. A gateway session token is not a portal token.
pub fn verify_portal_token(config: &AuthConfig, token: &str) -> Result<PortalClaims> {
    decode_claims(config, token)
}

fn decode_claims<T: DeserializeOwned>(config: &AuthConfig, token: &str) -> Result<T> {
    validate_secret(config)?;
    let token_data = decode::<T>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::Unauthorized,
    })?;

    Ok(token_data.claims)
}

/// Read the claims from an `Authorization: Bearer <token>` header.
pub fn extract_claims(headers: &HeaderMap, config: &AuthConfig) -> Result<Claims> {
    let auth_header = headers
        .get(hyper::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(Error::Unauthorized)?;

    let token = auth_header
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("bearer "))
        .map(|_| auth_header[7..].trim())
        .filter(|t| !t.is_empty())
        .ok_or(Error::Unauthorized)?;

    verify_token(config, token)
}
