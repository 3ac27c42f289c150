use std::sync::Arc;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
        request,
    },
    routing::{get, post},
};
use schoolgate_adapters::AllowedOrigins;
use schoolgate_application::Authenticator;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    routes,
    tracing::{make_span_with_request_id, on_request, on_response},
};

/// HTTP front of the authentication operations, mounted under `/auth`.
pub struct AuthService {
    router: Router,
}

impl AuthService {
    /// Build the routes over any [`Authenticator`]. Handlers only see the trait object.
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        let auth_routes = Router::new()
            .route("/token", post(routes::token))
            .route("/introspect", post(routes::introspect))
            .route("/refresh", post(routes::refresh))
            .route("/logout", post(routes::logout))
            .route("/register", post(routes::register))
            .route("/google", post(routes::google))
            .route("/resend-verification", post(routes::resend_verification))
            .route("/email-verification", get(routes::email_verification))
            .with_state(authenticator);

        Self {
            router: Router::new().nest("/auth", auth_routes),
        }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(make_span_with_request_id)
                    .on_request(on_request)
                    .on_response(on_response),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Convert the AuthService into a router that can be served or merged into another
    /// application. Cross-origin requests are allowed only from `allowed_origins`.
    pub fn as_nested_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        origin
                            .to_str()
                            .map(|origin| allowed_origins.contains(origin))
                            .unwrap_or(false)
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run the auth service as a standalone server on `listener`.
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_nested_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum_server::Server::<std::net::SocketAddr>::from_listener(listener)
            .serve(router.into_make_service())
            .await
    }
}
