use std::sync::Arc;

use axum::{Json, extract::State};
use schoolgate_application::{AuthenticationResponse, Authenticator};
use schoolgate_core::ExternalIdentity;
use serde::Deserialize;

use crate::error::{ApiError, ApiJson};

/// Identity asserted by Google once the OAuth exchange has completed upstream.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInRequest {
    pub google_id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<GoogleSignInRequest> for ExternalIdentity {
    fn from(request: GoogleSignInRequest) -> Self {
        Self {
            external_id: request.google_id,
            email: request.email,
            display_name: request.name,
            avatar_url: request.picture,
        }
    }
}

#[tracing::instrument(name = "Google sign-in", skip_all)]
pub async fn google(
    State(authenticator): State<Arc<dyn Authenticator>>,
    ApiJson(request): ApiJson<GoogleSignInRequest>,
) -> Result<Json<AuthenticationResponse>, ApiError> {
    let response = authenticator
        .authenticate_with_external_identity(request.into())
        .await?;
    Ok(Json(response))
}
