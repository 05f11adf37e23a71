use crate::AppState;
use crate::api::error::AppError;
use crate::api::views::{self, Notice};
use crate::models::ImageRecord;
use crate::services::image_store::ImageStore;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use futures::TryStreamExt;
use serde::Deserialize;
use tracing::{error, info};

/// Where unknown ids are sent
pub const NOT_FOUND_REDIRECT: &str = "/images?notice=not-found";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub notice: Option<String>,
}

async fn collect_records(store: &dyn ImageStore) -> anyhow::Result<Vec<ImageRecord>> {
    store.list_all().await?.try_collect().await
}

pub async fn list_images(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    // Only known keys map to text, nothing from the query string is echoed
    let notices = match query.notice.as_deref() {
        Some("not-found") => vec![Notice::error("Image not found")],
        _ => Vec::new(),
    };

    match collect_records(state.store.as_ref()).await {
        Ok(records) => Html(views::images_page(&records, &notices)).into_response(),
        Err(e) => {
            error!("Failed to list images: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(views::images_page(&[], &[Notice::error("Could not load images.")])),
            )
                .into_response()
        }
    }
}

pub async fn view_image(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.find_by_id(&id).await {
        Ok(Some(record)) => Html(views::image_page(&record)).into_response(),
        Ok(None) => {
            info!("Image {} not found, redirecting to list", id);
            Redirect::to(NOT_FOUND_REDIRECT).into_response()
        }
        Err(e) => {
            error!("Failed to load image {}: {:?}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(views::images_page(&[], &[Notice::error("Could not load image.")])),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/images",
    responses(
        (status = 200, description = "Every processed image", body = [ImageRecord])
    ),
    tag = "images"
)]
pub async fn list_image_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageRecord>>, AppError> {
    Ok(Json(collect_records(state.store.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/images/{id}",
    params(
        ("id" = String, Path, description = "Image record id")
    ),
    responses(
        (status = 200, description = "The image record", body = ImageRecord),
        (status = 404, description = "No record with this id")
    ),
    tag = "images"
)]
pub async fn get_image_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageRecord>, AppError> {
    state
        .store
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", id)))
}
