use serde_json::{Value, json};

use crate::helpers::{TestApp, error_code};

#[tokio::test]
async fn register_returns_201_with_an_unverified_account() {
    let app = TestApp::spawn().await;

    let response = app.register("ada@school.edu").await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "ada@school.edu");
    assert_eq!(body["displayName"], "Test User");
    assert_eq!(body["emailVerified"], false);
    assert!(app.emails.verification_token("ada@school.edu").is_some());
}

#[tokio::test]
async fn register_with_a_taken_email_returns_409() {
    let app = TestApp::spawn().await;
    app.register("grace@school.edu").await;

    let response = app.register("Grace@School.edu").await;

    assert_eq!(response.status().as_u16(), 409);
    assert_eq!(error_code(response).await, 1002);
}

#[tokio::test]
async fn register_with_a_short_password_returns_400() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/auth/register",
            &json!({ "email": "linus@school.edu", "password": "short" }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, 1004);
}

#[tokio::test]
async fn register_with_a_malformed_email_returns_400() {
    let app = TestApp::spawn().await;
    let body = json!({ "email": "not-an-email", "password": "long-enough" });

    let response = app.post_json("/auth/register", &body).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(error_code(response).await, 1009);
}

#[tokio::test]
async fn malformed_bodies_return_400_with_the_invalid_input_code() {
    let app = TestApp::spawn().await;
    let cases = [
        ("/auth/register", json!({ "password": "long-enough" })),
        ("/auth/token", json!({ "email": "a@school.edu" })),
        ("/auth/refresh", json!({})),
        ("/auth/google", json!({ "email": "a@school.edu" })),
    ];

    for (path, body) in cases {
        let response = app.post_json(path, &body).await;
        assert_eq!(response.status().as_u16(), 400, "{path}");
        assert_eq!(error_code(response).await, 1001, "{path}");
    }
}
