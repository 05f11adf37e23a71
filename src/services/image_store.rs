use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{BoxStream, StreamExt};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::{image_records, prelude::*};
use crate::models::{ImageRecord, NewImageRecord};

/// Append-only collection of processed image metadata
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the record and returns it with its assigned id
    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord>;

    /// Every record, oldest first. The stream is single use.
    async fn list_all<'a>(&'a self) -> Result<BoxStream<'a, Result<ImageRecord>>>;

    /// `None` for unknown and malformed ids alike
    async fn find_by_id(&self, id: &str) -> Result<Option<ImageRecord>>;
}

pub struct SeaOrmImageStore {
    db: DatabaseConnection,
}

impl SeaOrmImageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImageStore for SeaOrmImageStore {
    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord> {
        let model = image_records::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            original_filename: Set(record.original_filename),
            processed_filename: Set(record.processed_filename),
            operation: Set(record.operation),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        Ok(model.into())
    }

    async fn list_all<'a>(&'a self) -> Result<BoxStream<'a, Result<ImageRecord>>> {
        let rows = ImageRecords::find()
            .order_by_asc(image_records::Column::CreatedAt)
            .stream(&self.db)
            .await?;

        Ok(rows
            .map(|row| row.map(ImageRecord::from).map_err(anyhow::Error::from))
            .boxed())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ImageRecord>> {
        if Uuid::parse_str(id).is_err() {
            return Ok(None);
        }

        let found = ImageRecords::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(found.map(ImageRecord::from))
    }
}
