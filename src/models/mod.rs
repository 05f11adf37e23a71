use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::image_records;

/// Metadata kept for every successfully processed upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageRecord {
    pub id: String,
    pub original_filename: String,
    /// Public path of the output, e.g. `static/photo_gray.jpg`
    pub processed_filename: String,
    pub operation: String,
    pub created_at: DateTime<Utc>,
}

/// An ImageRecord before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImageRecord {
    pub original_filename: String,
    pub processed_filename: String,
    pub operation: String,
}

impl From<image_records::Model> for ImageRecord {
    fn from(model: image_records::Model) -> Self {
        Self {
            id: model.id,
            original_filename: model.original_filename,
            processed_filename: model.processed_filename,
            operation: model.operation,
            created_at: model.created_at,
        }
    }
}
