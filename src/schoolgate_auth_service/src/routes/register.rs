use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use schoolgate_application::{Authenticator, RegisteredAccount, Registration};
use secrecy::Secret;
use serde::Deserialize;

use crate::error::{ApiError, ApiJson};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[tracing::instrument(name = "Register", skip_all)]
pub async fn register(
    State(authenticator): State<Arc<dyn Authenticator>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredAccount>), ApiError> {
    let account = authenticator
        .register(Registration {
            email: request.email,
            password: request.password,
            display_name: request.display_name,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}
