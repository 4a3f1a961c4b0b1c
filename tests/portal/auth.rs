//! Session token handling.

use koliwada::auth;
use koliwada::config::Auth as AuthConfig;

fn config(secret: &str) -> AuthConfig {
    AuthConfig {
        jwt_secret: secret.to_string(),
        token_expiry_days: 1,
    }
}

#[test]
fn short_and_empty_secrets_are_rejected() {
    for secret in ["", "x", "thirty-one-bytes-of-secret-text"] {
        assert!(
            auth::create_token(&config(secret), "7", "gram_sevak").is_err(),
            "{secret:?}"
        );
    }
}

/// `Validation::default()` restricts tokens to HS256, so a token forged
/// with `"alg":"none"` is rejected.
#[test]
fn rejects_none_algorithm_token() {
    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = engine.encode(
        serde_json::json!({
            "sub": "7",
            "role": "super_admin",
            "exp": 9999999999i64,
            "iat": 1700000000
        })
        .to_string(),
    );
    let forged = format!("{header}.{payload}.");

    let config = config("real_secret_that_is_at_least_32b!");
    assert!(auth::verify_token(&config, &forged).is_err());
}

#[test]
fn expired_token_is_reported_as_expired() {
    let config = config("expiry_secret_that_is_at_least_32");
    let claims = auth::Claims {
        sub: "7".into(),
        role: "gram_sevak".into(),
        exp: 1_600_000_000,
        iat: 1_599_990_000,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap();
    assert!(matches!(
        auth::verify_token(&config, &token),
        Err(koliwada::Error::TokenExpired)
    ));
}

#[test]
fn key_rotation_invalidates_old_tokens() {
    let old = config("old_secret_key_production_32byte!");
    let new = config("new_secret_key_production_32byte!");
    let token = auth::create_token(&old, "7", "gram_sevak").unwrap();
    assert!(auth::verify_token(&new, &token).is_err());
}

#[test]
fn role_travels_in_the_token() {
    let config = config("role_secret_that_is_at_least_32b!");
    let token = auth::create_token(&config, "sachiv@koliwada.test", "gram_sevak").unwrap();

    let mut headers = hyper::http::HeaderMap::new();
    headers.insert("authorization", format!("bearer {token}").parse().unwrap());
    let claims = auth::extract_claims(&headers, &config).unwrap();
    assert_eq!(claims.sub, "sachiv@koliwada.test");
    assert_eq!(claims.role, "gram_sevak");
}
