pub mod handlers;
pub mod types;

use crate::account::AccountService;
use crate::config::CorsConfig;
use axum::http::{HeaderValue, Method};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<AccountService>,
}

/// Build the gateway router with CORS, panic catching and request tracing.
pub fn router(state: ApiState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/signup", post(handlers::sign_up))
        .route("/users", get(handlers::list_users))
        .route("/users/:id", delete(handlers::delete_user))
        .route("/verify", get(handlers::verify_email))
        .route("/health", get(handlers::health))
        .layer(cors_layer(cors))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the front-end. A `"*"` origin mirrors the caller's origin,
/// which is what browsers require when credentials are allowed.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials)
}

pub struct ApiServer {
    app: Router,
    bind_addr: String,
}

impl ApiServer {
    pub fn new(state: ApiState, cors: &CorsConfig, bind: &str, port: u16) -> Self {
        Self {
            app: router(state, cors),
            bind_addr: format!("{}:{}", bind, port),
        }
    }

    pub async fn start<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;

        info!("🌐 API server listening on {}", self.bind_addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
