pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::{AppConfig, STATIC_MOUNT};
use crate::services::edit_service::EditService;
use crate::services::executor::LocalExecutor;
use crate::services::image_store::{ImageStore, SeaOrmImageStore};
use crate::services::operations::OperationRegistry;
use crate::services::storage::StorageService;
use axum::{Router, middleware::from_fn, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::images::list_image_records,
        api::handlers::images::get_image_record,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            models::ImageRecord,
        )
    ),
    tags(
        (name = "system", description = "Service status"),
        (name = "images", description = "Processed image metadata")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn ImageStore>,
    pub edit_service: Arc<EditService>,
    pub operations: Arc<OperationRegistry>,
    pub config: AppConfig,
}

impl AppState {
    /// Wires the default executor and the database backed store
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        let executor = Arc::new(LocalExecutor::from_config(&config));
        let operations = Arc::new(executor.registry().clone());
        let store: Arc<dyn ImageStore> = Arc::new(SeaOrmImageStore::new(db.clone()));
        let edit_service = Arc::new(EditService::new(
            storage,
            executor,
            store.clone(),
            config.clone(),
        ));

        Self {
            db,
            store,
            edit_service,
            operations,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.public_dir);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/", get(api::handlers::pages::index))
        .route("/about", get(api::handlers::pages::about))
        .route(
            "/edit",
            get(api::handlers::edit::edit_form).post(api::handlers::edit::edit_image),
        )
        .route("/images", get(api::handlers::images::list_images))
        .route("/images/:id", get(api::handlers::images::view_image))
        .route(
            "/api/images",
            get(api::handlers::images::list_image_records),
        )
        .route(
            "/api/images/:id",
            get(api::handlers::images::get_image_record),
        )
        .nest_service(&format!("/{}", STATIC_MOUNT), static_files)
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_file_size + 1024 * 1024, // Room for multipart overhead
        ))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
