use serde_json::{Value, json};

use crate::helpers::{TestApp, error_code, token_of};

#[tokio::test]
async fn sign_in_returns_a_token_with_its_expiry() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@school.edu").await;

    let response = app.sign_in("ada@school.edu", "correct-horse-battery").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert!(body["expiryTime"].as_str().is_some());
}

#[tokio::test]
async fn wrong_password_returns_401() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@school.edu").await;

    let response = app.sign_in("ada@school.edu", "not-the-password").await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, 1006);
}

#[tokio::test]
async fn unknown_email_returns_404() {
    let app = TestApp::spawn().await;

    let response = app.sign_in("nobody@school.edu", "whatever-password").await;

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(error_code(response).await, 1005);
}

#[tokio::test]
async fn introspect_rejects_garbage_without_failing() {
    let app = TestApp::spawn().await;

    assert!(!app.introspect("not-a-token").await);
    assert!(!app.introspect("").await);
}

#[tokio::test]
async fn full_lifecycle_rotates_and_revokes() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@school.edu").await;

    let first = app.token_for("ada@school.edu").await;
    assert!(app.introspect(&first).await);

    let response = app
        .post_json("/auth/refresh", &json!({ "token": first }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let second = token_of(response).await;
    assert_ne!(first, second);
    assert!(!app.introspect(&first).await);
    assert!(app.introspect(&second).await);

    let response = app
        .post_json("/auth/logout", &json!({ "token": second }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(!app.introspect(&second).await);
}

#[tokio::test]
async fn refreshed_token_cannot_be_replayed() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@school.edu").await;
    let token = app.token_for("ada@school.edu").await;

    let first = app
        .post_json("/auth/refresh", &json!({ "token": token }))
        .await;
    assert_eq!(first.status().as_u16(), 200);

    let replay = app
        .post_json("/auth/refresh", &json!({ "token": token }))
        .await;
    assert_eq!(replay.status().as_u16(), 401);
    assert_eq!(error_code(replay).await, 1006);
}

#[tokio::test]
async fn logout_is_idempotent_and_ignores_bad_tokens() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@school.edu").await;
    let token = app.token_for("ada@school.edu").await;

    for body in [
        json!({ "token": token }),
        json!({ "token": token }),
        json!({ "token": "garbage" }),
    ] {
        let response = app.post_json("/auth/logout", &body).await;
        assert_eq!(response.status().as_u16(), 200);
    }
    assert!(!app.introspect(&token).await);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/auth/introspect", &json!({ "token": "x" }))
        .await;

    assert!(response.headers().get("x-request-id").is_some());
}
