use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use schoolgate_application::{AuthError, Authenticator};
use secrecy::Secret;
use serde::Deserialize;

use super::Message;
use crate::error::{ApiError, ApiJson};

#[derive(Deserialize)]
pub struct VerificationQuery {
    pub token: Secret<String>,
}

#[tracing::instrument(name = "Verify email", skip_all)]
pub async fn email_verification(
    State(authenticator): State<Arc<dyn Authenticator>>,
    query: Result<Query<VerificationQuery>, QueryRejection>,
) -> Result<Json<Message>, ApiError> {
    let Query(query) = query.map_err(|rejection| AuthError::InvalidInput(rejection.body_text()))?;
    authenticator.verify_email(query.token).await?;
    Ok(Json(Message::new("email verified")))
}

#[derive(Deserialize)]
pub struct ResendRequest {
    pub email: Secret<String>,
}

#[tracing::instrument(name = "Resend verification email", skip_all)]
pub async fn resend_verification(
    State(authenticator): State<Arc<dyn Authenticator>>,
    ApiJson(request): ApiJson<ResendRequest>,
) -> Result<Json<Message>, ApiError> {
    authenticator.resend_verification(request.email).await?;
    Ok(Json(Message::new("Verification email sent")))
}
