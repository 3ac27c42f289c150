use std::sync::Arc;

use axum::{Json, extract::State};
use schoolgate_application::{AuthenticationResponse, Authenticator};

use super::TokenBody;
use crate::error::{ApiError, ApiJson};

#[tracing::instrument(name = "Refresh token", skip_all)]
pub async fn refresh(
    State(authenticator): State<Arc<dyn Authenticator>>,
    ApiJson(body): ApiJson<TokenBody>,
) -> Result<Json<AuthenticationResponse>, ApiError> {
    Ok(Json(authenticator.refresh(body.token).await?))
}
