use std::sync::Arc;

use axum::{Json, extract::State};
use schoolgate_application::Authenticator;

use super::{Message, TokenBody};
use crate::error::{ApiError, ApiJson};

#[tracing::instrument(name = "Logout", skip_all)]
pub async fn logout(
    State(authenticator): State<Arc<dyn Authenticator>>,
    ApiJson(body): ApiJson<TokenBody>,
) -> Result<Json<Message>, ApiError> {
    authenticator.logout(body.token).await?;
    Ok(Json(Message::new("logged out")))
}
