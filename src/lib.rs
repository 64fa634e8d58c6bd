pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::UploadConfig;
use crate::services::file_helper::FileHelper;
use crate::services::notifier::{ProgressNotifier, SocketHub};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::get,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::routes::list_files,
        api::handlers::routes::upload_files,
    ),
    components(
        schemas(
            models::FileRecord,
            models::ProgressEvent,
            models::UploadResponse,
        )
    ),
    tags(
        (name = "files", description = "Upload and listing endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: UploadConfig,
    pub hub: Arc<SocketHub>,
    pub notifier: Arc<dyn ProgressNotifier>,
    pub file_helper: FileHelper,
}

impl AppState {
    /// Progress is pushed through `hub`, the same registry the socket route fills.
    pub fn new(config: UploadConfig, hub: Arc<SocketHub>) -> Self {
        Self {
            file_helper: FileHelper::new(config.owner.clone()),
            notifier: hub.clone(),
            hub,
            config,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ProgressNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/socket",
            get(api::handlers::socket::socket_handler).fallback(api::handlers::routes::handler),
        )
        .fallback(api::handlers::routes::handler)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(DefaultBodyLimit::max(state.config.max_body_size)),
        )
        .with_state(state)
}
