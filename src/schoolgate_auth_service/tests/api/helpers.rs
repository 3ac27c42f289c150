use std::sync::{Arc, Mutex};

use reqwest::Response;
use schoolgate_adapters::{
    BcryptCredentialVerifier, HashMapAccountStore, HashMapRevocationStore, JwtConfig, JwtTokenCodec,
    SystemClock, config::test,
};
use schoolgate_application::{
    AuthenticationCoordinator, Notifier, VerificationPolicy, notifications::VERIFICATION_SUBJECT,
};
use schoolgate_auth_service::AuthService;
use schoolgate_core::{Email, EmailClient};
use secrecy::{ExposeSecret, Secret};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const PASSWORD: &str = "correct-horse-battery";

#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub recipient: String,
    pub subject: String,
    pub content: String,
}

/// Email client that keeps every message for inspection.
#[derive(Default, Clone)]
pub struct CapturingEmailClient {
    sent: Arc<Mutex<Vec<CapturedEmail>>>,
}

impl CapturingEmailClient {
    pub fn sent_to(&self, recipient: &str) -> Vec<CapturedEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|email| email.recipient == recipient)
            .cloned()
            .collect()
    }

    /// Token from the newest verification link mailed to `recipient`.
    pub fn verification_token(&self, recipient: &str) -> Option<String> {
        self.sent_to(recipient)
            .iter()
            .rev()
            .find(|email| email.subject == VERIFICATION_SUBJECT)
            .and_then(|email| {
                let start = email.content.find("token=")? + "token=".len();
                email.content[start..]
                    .split_whitespace()
                    .next()
                    .map(str::to_owned)
            })
    }
}

#[async_trait::async_trait]
impl EmailClient for CapturingEmailClient {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String> {
        self.sent.lock().unwrap().push(CapturedEmail {
            recipient: recipient.as_ref().expose_secret().clone(),
            subject: subject.to_owned(),
            content: content.to_owned(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub http_client: reqwest::Client,
    pub emails: CapturingEmailClient,
}

impl TestApp {
    /// Serve the full router over in-memory stores on a random local port.
    pub async fn spawn() -> Self {
        let emails = CapturingEmailClient::default();
        let coordinator = AuthenticationCoordinator::new(
            HashMapAccountStore::new(),
            HashMapRevocationStore::new(),
            JwtTokenCodec::new(&JwtConfig {
                signer_key: Secret::new(test::JWT_SIGNER_KEY.to_owned()),
                issuer: "school.edu".to_owned(),
                valid_duration_secs: 3_600,
                refreshable_duration_secs: 36_000,
            }),
            BcryptCredentialVerifier::with_cost(4),
            Notifier::new(emails.clone(), "http://localhost:3000"),
            SystemClock,
            VerificationPolicy::default(),
        );

        let listener = TcpListener::bind(test::APP_ADDRESS).await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let service = AuthService::new(Arc::new(coordinator));
        tokio::spawn(service.run_standalone(listener, None));

        Self {
            address,
            http_client: reqwest::Client::new(),
            emails,
        }
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.http_client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.http_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn register(&self, email: &str) -> Response {
        self.post_json(
            "/auth/register",
            &json!({ "email": email, "password": PASSWORD, "displayName": "Test User" }),
        )
        .await
    }

    pub async fn verify(&self, token: &str) -> Response {
        self.get(&format!("/auth/email-verification?token={token}"))
            .await
    }

    /// Register `email` and follow the mailed verification link.
    pub async fn register_verified(&self, email: &str) {
        assert_eq!(self.register(email).await.status().as_u16(), 201);
        let token = self.emails.verification_token(email).unwrap();
        assert_eq!(self.verify(&token).await.status().as_u16(), 200);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Response {
        let body = json!({ "email": email, "password": password });
        self.post_json("/auth/token", &body).await
    }

    /// Sign in and return the issued token.
    pub async fn token_for(&self, email: &str) -> String {
        let response = self.sign_in(email, PASSWORD).await;
        assert_eq!(response.status().as_u16(), 200);
        token_of(response).await
    }

    pub async fn introspect(&self, token: &str) -> bool {
        let body: Value = self
            .post_json("/auth/introspect", &json!({ "token": token }))
            .await
            .json()
            .await
            .unwrap();
        body["valid"].as_bool().unwrap()
    }
}

pub async fn token_of(response: Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_owned()
}

pub async fn error_code(response: Response) -> u64 {
    let body: Value = response.json().await.unwrap();
    body["code"].as_u64().unwrap()
}
