use serde_json::json;

use crate::helpers::{PASSWORD, TestApp, error_code};

#[tokio::test]
async fn unverified_account_cannot_sign_in() {
    let app = TestApp::spawn().await;
    app.register("ada@school.edu").await;

    let response = app.sign_in("ada@school.edu", PASSWORD).await;

    assert_eq!(response.status().as_u16(), 403);
    assert_eq!(error_code(response).await, 1017);
}

#[tokio::test]
async fn following_the_mailed_link_verifies_the_account() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@school.edu").await;

    let response = app.sign_in("ada@school.edu", PASSWORD).await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn verification_link_is_single_use() {
    let app = TestApp::spawn().await;
    app.register("ada@school.edu").await;
    let token = app.emails.verification_token("ada@school.edu").unwrap();
    assert_eq!(app.verify(&token).await.status().as_u16(), 200);

    let response = app.verify(&token).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, 1018);
}

#[tokio::test]
async fn missing_verification_token_is_invalid_input() {
    let app = TestApp::spawn().await;

    let response = app.get("/auth/email-verification").await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, 1001);
}

#[tokio::test]
async fn resend_replaces_the_outstanding_link() {
    let app = TestApp::spawn().await;
    app.register("ada@school.edu").await;
    let first = app.emails.verification_token("ada@school.edu").unwrap();

    let body = json!({ "email": "ada@school.edu" });
    let response = app.post_json("/auth/resend-verification", &body).await;
    assert_eq!(response.status().as_u16(), 200);
    let second = app.emails.verification_token("ada@school.edu").unwrap();

    assert_ne!(first, second);
    assert_eq!(app.verify(&first).await.status().as_u16(), 400);
    assert_eq!(app.verify(&second).await.status().as_u16(), 200);
}

#[tokio::test]
async fn resend_for_an_unknown_email_returns_404() {
    let app = TestApp::spawn().await;

    let body = json!({ "email": "nobody@school.edu" });
    let response = app.post_json("/auth/resend-verification", &body).await;

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(error_code(response).await, 1005);
}

#[tokio::test]
async fn resend_for_a_verified_account_sends_nothing() {
    let app = TestApp::spawn().await;
    app.register_verified("ada@school.edu").await;
    let before = app.emails.sent_to("ada@school.edu").len();

    let body = json!({ "email": "ada@school.edu" });
    let response = app.post_json("/auth/resend-verification", &body).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.emails.sent_to("ada@school.edu").len(), before);
}
