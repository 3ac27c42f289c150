use std::sync::Arc;

use axum::{Json, extract::State};
use schoolgate_application::{Authenticator, IntrospectResponse};

use super::TokenBody;
use crate::error::{ApiError, ApiJson};

#[tracing::instrument(name = "Introspect", skip_all)]
pub async fn introspect(
    State(authenticator): State<Arc<dyn Authenticator>>,
    ApiJson(body): ApiJson<TokenBody>,
) -> Result<Json<IntrospectResponse>, ApiError> {
    Ok(Json(authenticator.introspect(body.token).await))
}
