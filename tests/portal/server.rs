//! Gateway end to end: a real server, raw TCP traffic, observable behavior.

use std::net::SocketAddr;
use std::sync::Arc;

use koliwada::config::{Auth, Config, Server as ServerConfig};
use koliwada::store::MemoryStore;
use koliwada::{Router, api, module, server};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

const ALLOWED_ORIGIN: &str = "https://admin.koliwada.test";
const SECRET: &str = "test-secret-that-is-at-least-32b!";

async fn start_test_server() -> server::Server {
    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![ALLOWED_ORIGIN.to_string()],
        },
        auth: Auth {
            jwt_secret: SECRET.to_string(),
            token_expiry_days: 1,
        },
        ..Default::default()
    };

    let mut router = Router::new();
    module::register(&mut router, &api::modules());

    server::start(config, Arc::new(MemoryStore::new()), router.into_handle())
        .await
        .expect("failed to start test server")
}

/// Send a raw HTTP/1.1 request with `Connection: close` and read the full response.
async fn raw_request(addr: SocketAddr, payload: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("failed to connect");
    stream.write_all(payload).await.expect("failed to write");

    let mut buf = Vec::new();
    let _ = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        stream.read_to_end(&mut buf),
    )
    .await;
    String::from_utf8_lossy(&buf).into_owned()
}

struct Reply {
    status: u16,
    head: String,
    body: Value,
}

async fn call(
    addr: SocketAddr,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut request = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    if let Some(token) = token {
        request.push_str(&format!("Authorization: Bearer {token}\r\n"));
    }
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    if !body.is_empty() {
        request.push_str("Content-Type: application/json\r\n");
    }
    request.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));

    let raw = raw_request(addr, request.as_bytes()).await;
    let (head, body) = raw.split_once("\r\n\r\n").expect("malformed response");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("missing status");
    Reply {
        status,
        head: head.to_ascii_lowercase(),
        body: serde_json::from_str(body).unwrap_or(Value::Null),
    }
}

fn profile(email: &str, slug: &str, permissions: Value) -> Value {
    json!({
        "email": email,
        "responsibility": { "role": { "slug": slug } },
        "role": { "permissions": permissions }
    })
}

/// An access token as the portal API would issue it.
fn portal_token(secret: &str, sub: &str, profile: Value) -> String {
    let now = jiff::Timestamp::now().as_second();
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": sub, "iat": now, "exp": now + 3600, "profile": profile }),
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn sign_in_body(email: &str, slug: &str, permissions: Value) -> Value {
    json!({ "accessToken": portal_token(SECRET, email, profile(email, slug, permissions)) })
}

async fn sign_in(addr: SocketAddr, email: &str, slug: &str, permissions: Value) -> String {
    let reply = call(
        addr,
        "POST",
        "/api/session",
        None,
        Some(sign_in_body(email, slug, permissions)),
    )
    .await;
    assert_eq!(reply.status, 201, "{:?}", reply.body);
    reply.body["accessToken"]
        .as_str()
        .expect("missing accessToken")
        .to_string()
}

// ---------------------------------------------------------------------------
// Session and ability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_in_returns_token_rules_and_home_route() {
    let server = start_test_server().await;
    let addr = server.addr();

    let reply = call(
        addr,
        "POST",
        "/api/session",
        None,
        Some(sign_in_body(
            "sachiv@koliwada.test",
            "gram_sevak",
            json!([{ "subject": "Invitation", "actions": ["read"] }]),
        )),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(reply.status, 201);
    assert!(reply.body["accessToken"].is_string());
    assert_eq!(reply.body["role"], "gram_sevak");
    assert_eq!(reply.body["homeRoute"], "/home");
    assert_eq!(reply.body["unrestricted"], false);
    assert_eq!(reply.body["rules"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn profile_without_permissions_cannot_sign_in() {
    let server = start_test_server().await;
    let addr = server.addr();

    let reply = call(
        addr,
        "POST",
        "/api/session",
        None,
        Some(json!({
            "accessToken": portal_token(
                SECRET,
                "sachiv@koliwada.test",
                json!({
                    "email": "sachiv@koliwada.test",
                    "responsibility": { "role": { "slug": "gram_sevak" } }
                }),
            )
        })),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(reply.status, 422);
}

#[tokio::test]
async fn sign_in_requires_a_portal_token() {
    let server = start_test_server().await;
    let addr = server.addr();
    let admin = profile("intruder@koliwada.test", "super_admin", json!([]));

    let bare = call(addr, "POST", "/api/session", None, Some(admin.clone())).await;
    let forged = call(
        addr,
        "POST",
        "/api/session",
        None,
        Some(json!({
            "accessToken": portal_token(
                "some-other-secret-of-32-bytes!!!!",
                "intruder@koliwada.test",
                admin,
            )
        })),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(bare.status, 400);
    assert!(bare.body.get("accessToken").is_none());
    assert_eq!(forged.status, 401);
    assert!(forged.body.get("accessToken").is_none());
}

#[tokio::test]
async fn sign_in_cannot_replace_another_admins_profile() {
    let server = start_test_server().await;
    let addr = server.addr();
    let victim = sign_in(addr, "sachiv@koliwada.test", "gram_sevak", json!([])).await;

    // A valid portal token for one admin wrapping another admin's email.
    let takeover = call(
        addr,
        "POST",
        "/api/session",
        None,
        Some(json!({
            "accessToken": portal_token(
                SECRET,
                "intruder@koliwada.test",
                profile("sachiv@koliwada.test", "super_admin", json!([])),
            )
        })),
    )
    .await;
    let intruder = sign_in(addr, "intruder@koliwada.test", "gram_sevak", json!([])).await;
    let victim_session = call(addr, "GET", "/api/session", Some(&victim), None).await;
    let intruder_session = call(addr, "GET", "/api/session", Some(&intruder), None).await;
    server.shutdown().await.unwrap();

    assert_eq!(takeover.status, 401);
    assert_eq!(victim_session.status, 200);
    assert_eq!(victim_session.body["role"], "gram_sevak");
    assert_eq!(victim_session.body["unrestricted"], false);
    assert_eq!(intruder_session.body["role"], "gram_sevak");
}

#[tokio::test]
async fn ability_check_and_sign_out() {
    let server = start_test_server().await;
    let addr = server.addr();
    let token = sign_in(
        addr,
        "sachiv@koliwada.test",
        "gram_sevak",
        json!([{ "subject": "Gallery", "actions": ["read", "delete"] }]),
    )
    .await;

    let named = call(
        addr,
        "POST",
        "/api/ability/check",
        Some(&token),
        Some(json!({ "action": "delete", "subject": "gallery" })),
    )
    .await;
    let typed = call(
        addr,
        "POST",
        "/api/ability/check",
        Some(&token),
        Some(json!({ "action": "update", "subject": { "kind": "Gallery", "payload": { "id": 3 } } })),
    )
    .await;
    let session = call(addr, "GET", "/api/session", Some(&token), None).await;
    let signed_out = call(addr, "DELETE", "/api/session", Some(&token), None).await;
    let after = call(addr, "GET", "/api/ability", Some(&token), None).await;
    server.shutdown().await.unwrap();

    assert_eq!(named.body["allowed"], true);
    assert_eq!(typed.body["allowed"], false);
    assert_eq!(session.status, 200);
    assert_eq!(session.body["role"], "gram_sevak");
    assert_eq!(signed_out.status, 204);
    assert_eq!(after.status, 401);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let server = start_test_server().await;
    let addr = server.addr();

    let ability = call(addr, "GET", "/api/ability", None, None).await;
    let forged = call(addr, "GET", "/api/navigation", Some("not.a.token"), None).await;
    server.shutdown().await.unwrap();

    assert_eq!(ability.status, 401);
    assert_eq!(forged.status, 401);
}

#[tokio::test]
async fn navigation_is_filtered_by_ability() {
    let server = start_test_server().await;
    let addr = server.addr();
    let token = sign_in(
        addr,
        "sachiv@koliwada.test",
        "gram_sevak",
        json!([{ "subject": "Event", "actions": ["read"] }]),
    )
    .await;

    let reply = call(addr, "GET", "/api/navigation", Some(&token), None).await;
    server.shutdown().await.unwrap();

    let titles: Vec<&str> = reply
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Home", "Settings"]);
    assert_eq!(reply.body[1]["children"][0]["title"], "Event");
}

#[tokio::test]
async fn guard_verdicts() {
    let server = start_test_server().await;
    let addr = server.addr();
    let token = sign_in(addr, "sachiv@koliwada.test", "gram_sevak", json!([])).await;

    let root = call(addr, "POST", "/api/guard", Some(&token), Some(json!({ "path": "/" }))).await;
    let signed_out = call(
        addr,
        "POST",
        "/api/guard",
        None,
        Some(json!({ "path": "/user", "acl": { "action": "read", "subject": "User" } })),
    )
    .await;
    let login = call(
        addr,
        "POST",
        "/api/guard",
        None,
        Some(json!({ "path": "/login", "guestGuard": true })),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(root.body, json!({ "verdict": "redirect", "location": "/home" }));
    assert_eq!(signed_out.body, json!({ "verdict": "not_authorized" }));
    assert_eq!(login.body, json!({ "verdict": "render" }));
}

// ---------------------------------------------------------------------------
// Matrix editing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn matrix_endpoints_require_responsibility_abilities() {
    let server = start_test_server().await;
    let addr = server.addr();
    let token = sign_in(
        addr,
        "sachiv@koliwada.test",
        "gram_sevak",
        json!([{ "subject": "Responsibility", "actions": ["read"] }]),
    )
    .await;

    let seeded = call(
        addr,
        "POST",
        "/api/permissions/seed",
        Some(&token),
        Some(json!({ "catalog": [{ "id": 1, "name": "User" }] })),
    )
    .await;
    let toggled = call(
        addr,
        "POST",
        "/api/permissions/toggle",
        Some(&token),
        Some(json!({ "entries": [], "action": "read", "subject": "User" })),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(seeded.status, 200);
    assert_eq!(seeded.body["rows"], json!([{ "subject": "User", "cells": [false, false, false, false] }]));
    assert_eq!(toggled.status, 403);
    assert!(toggled.body["error"].as_str().unwrap().contains("update Responsibility"));
}

#[tokio::test]
async fn super_admin_edits_a_matrix() {
    let server = start_test_server().await;
    let addr = server.addr();
    let token = sign_in(addr, "admin@koliwada.test", "super_admin", json!([])).await;

    let seeded = call(
        addr,
        "POST",
        "/api/permissions/seed",
        Some(&token),
        Some(json!({
            "catalog": [{ "id": 1, "name": "User" }, { "id": 2, "name": "Invitation" }],
            "saved": [
                { "subject": "User", "actions": ["read"] },
                { "subject": "Tehsil", "actions": ["read"] }
            ]
        })),
    )
    .await;
    let toggled = call(
        addr,
        "POST",
        "/api/permissions/toggle",
        Some(&token),
        Some(json!({
            "entries": seeded.body["entries"].clone(),
            "action": "create",
            "subject": "invitation"
        })),
    )
    .await;
    let manage = call(
        addr,
        "POST",
        "/api/permissions/toggle",
        Some(&token),
        Some(json!({ "entries": [], "action": "manage", "subject": "User" })),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(seeded.body["permissions"], json!([{ "subject": "User", "actions": ["read"] }]));
    assert_eq!(
        toggled.body["permissions"],
        json!([
            { "subject": "User", "actions": ["read"] },
            { "subject": "Invitation", "actions": ["create"] }
        ])
    );
    assert_eq!(manage.status, 400);
}

#[tokio::test]
async fn role_draft_is_validated() {
    let server = start_test_server().await;
    let addr = server.addr();
    let token = sign_in(
        addr,
        "sachiv@koliwada.test",
        "gram_sevak",
        json!([{ "subject": "Role", "actions": ["create"] }]),
    )
    .await;

    let ok = call(
        addr,
        "POST",
        "/api/roles/draft",
        Some(&token),
        Some(json!({ "name": "gram sevak", "nameNative": "ग्राम सेवक" })),
    )
    .await;
    let bad = call(
        addr,
        "POST",
        "/api/roles/draft",
        Some(&token),
        Some(json!({ "name": "Sevak", "nameNative": "Sevak" })),
    )
    .await;
    server.shutdown().await.unwrap();

    assert_eq!(ok.status, 200);
    assert_eq!(ok.body["name"], "Gram Sevak");
    assert_eq!(ok.body["slug"], "gram_sevak");
    assert_eq!(bad.status, 422);
    assert!(bad.body["error"].as_str().unwrap().contains("marathi"));
}

// ---------------------------------------------------------------------------
// Transport protections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn security_headers_on_every_response() {
    let server = start_test_server().await;
    let addr = server.addr();

    let missing = call(addr, "GET", "/nope", None, None).await;
    let method = call(addr, "PUT", "/api/session", None, None).await;
    server.shutdown().await.unwrap();

    assert_eq!(missing.status, 404);
    assert_eq!(method.status, 405);
    for reply in [&missing, &method] {
        assert!(reply.head.contains("x-content-type-options: nosniff"));
        assert!(reply.head.contains("x-frame-options: deny"));
        assert!(reply.head.contains("cache-control: no-store"));
    }
}

#[tokio::test]
async fn cors_only_for_allowlisted_origins() {
    let server = start_test_server().await;
    let addr = server.addr();

    let allowed = raw_request(
        addr,
        format!(
            "OPTIONS /api/session HTTP/1.1\r\nHost: localhost\r\nOrigin: {ALLOWED_ORIGIN}\r\nConnection: close\r\n\r\n"
        )
        .as_bytes(),
    )
    .await
    .to_ascii_lowercase();
    let denied = raw_request(
        addr,
        b"GET /api/ability HTTP/1.1\r\nHost: localhost\r\nOrigin: https://evil.test\r\nConnection: close\r\n\r\n",
    )
    .await
    .to_ascii_lowercase();
    server.shutdown().await.unwrap();

    assert!(allowed.starts_with("http/1.1 204"), "{allowed}");
    assert!(allowed.contains("access-control-allow-origin: https://admin.koliwada.test"));
    assert!(allowed.contains("access-control-allow-headers"));
    assert!(!denied.contains("access-control-allow-origin"));
}

#[tokio::test]
async fn server_rejects_oversized_body() {
    let server = start_test_server().await;
    let addr = server.addr();

    let response = raw_request(
        addr,
        b"POST /api/session HTTP/1.1\r\nHost: localhost\r\nContent-Length: 10485760\r\nConnection: close\r\n\r\n",
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(
        response.contains("413"),
        "Expected 413 Payload Too Large, got:\n{response}"
    );
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let server = start_test_server().await;
    let addr = server.addr();

    let body = "email=a";
    let response = raw_request(
        addr,
        format!(
            "POST /api/session HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .as_bytes(),
    )
    .await;
    server.shutdown().await.unwrap();

    assert!(response.starts_with("HTTP/1.1 415"), "{response}");
}
