use serde_json::{Value, json};

use crate::helpers::{TestApp, error_code, token_of};

fn google_identity(google_id: &str, email: &str) -> Value {
    json!({
        "googleId": google_id,
        "email": email,
        "name": "Ada Lovelace",
        "picture": "https://example.com/ada.png"
    })
}

#[tokio::test]
async fn first_google_sign_in_creates_a_usable_session() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/auth/google", &google_identity("g-1", "ada@school.edu"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let token = token_of(response).await;
    assert!(app.introspect(&token).await);
}

#[tokio::test]
async fn google_sign_in_links_an_existing_unverified_account() {
    let app = TestApp::spawn().await;
    app.register("ada@school.edu").await;

    let response = app
        .post_json("/auth/google", &google_identity("g-1", "ada@school.edu"))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    // The provider vouched for the address, so the password now works too.
    let response = app
        .sign_in("ada@school.edu", crate::helpers::PASSWORD)
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let again = app
        .post_json(
            "/auth/register",
            &json!({ "email": "ada@school.edu", "password": "another-password" }),
        )
        .await;
    assert_eq!(again.status().as_u16(), 409);
}

#[tokio::test]
async fn google_sign_in_with_a_bad_email_returns_401() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/auth/google", &google_identity("g-1", "not-an-email"))
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, 1019);
}

#[tokio::test]
async fn google_sign_in_without_an_id_returns_401() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/auth/google", &google_identity("  ", "ada@school.edu"))
        .await;

    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(error_code(response).await, 1019);
}
