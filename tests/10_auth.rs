mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use slate_api::auth::decode_token;
use slate_api::models::Role;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_issues_token_whose_claims_match_the_stored_user() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.login("admin@acme.test", "password").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;

    // Response carries user and tenant context for the client
    assert_eq!(body["user"]["email"], "admin@acme.test");
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["tenant"]["slug"], "acme");
    assert_eq!(body["tenant"]["plan"], "free");

    // Decoded claims agree with the stored user exactly
    let claims = decode_token(body["token"].as_str().unwrap(), common::JWT_SECRET)?;
    assert_eq!(claims.email, "admin@acme.test");
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(
        claims.tenant_id.to_string(),
        body["user"]["tenantId"].as_str().unwrap()
    );
    Ok(())
}

#[tokio::test]
async fn unknown_email_and_wrong_password_share_one_error_shape() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let unknown = server.login("nobody@acme.test", "password").await?;
    let unknown_status = unknown.status();
    let unknown_body: Value = unknown.json().await?;

    let wrong = server.login("admin@acme.test", "wrong-password").await?;
    let wrong_status = wrong.status();
    let wrong_body: Value = wrong.json().await?;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body, json!({ "error": "invalid_credentials" }));
    Ok(())
}

#[tokio::test]
async fn login_without_credentials_is_rejected() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "admin@acme.test" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "missing_credentials");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    // No Authorization header at all
    let res = server.client.get(server.url("/notes")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "missing_token");

    // Wrong scheme
    let res = server
        .client
        .get(server.url("/notes"))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "missing_token");

    // Well-formed header, garbage token
    let res = server
        .client
        .get(server.url("/notes"))
        .bearer_auth("not.a.real.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "invalid_token");
    Ok(())
}

#[tokio::test]
async fn tampered_token_is_rejected() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.token_for("user@acme.test").await?;

    // Flip a character in the signature segment
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let res = server
        .client
        .get(server.url("/notes"))
        .bearer_auth(&tampered)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "invalid_token");
    Ok(())
}
