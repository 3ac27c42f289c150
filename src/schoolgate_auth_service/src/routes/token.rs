use std::sync::Arc;

use axum::{Json, extract::State};
use schoolgate_application::{AuthenticationResponse, Authenticator};
use secrecy::Secret;
use serde::Deserialize;

use crate::error::{ApiError, ApiJson};

#[derive(Deserialize)]
pub struct TokenRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

#[tracing::instrument(name = "Issue token", skip_all)]
pub async fn token(
    State(authenticator): State<Arc<dyn Authenticator>>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> Result<Json<AuthenticationResponse>, ApiError> {
    let response = authenticator
        .authenticate(request.email, request.password)
        .await?;
    Ok(Json(response))
}
