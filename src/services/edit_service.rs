use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{AppConfig, STATIC_MOUNT};
use crate::models::{ImageRecord, NewImageRecord};
use crate::services::executor::{ImageExecutor, ProcessedImage};
use crate::services::image_store::ImageStore;
use crate::services::operations::ProcessError;
use crate::services::storage::StorageService;
use crate::utils::validation::{ValidationError, validate_file_size, validate_filename};

/// The `file` part of an edit form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A parsed edit form submission
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    /// `None` when the form carried no file part at all
    pub file: Option<UploadedFile>,
    pub operation: String,
}

#[derive(Debug, Error)]
pub enum EditError {
    /// Upload refused before anything was written
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// Empty or unknown operation, refused before anything was written
    #[error(transparent)]
    Operation(ProcessError),

    /// The executor could not produce an output
    #[error("Error processing the image.")]
    Processing(#[source] ProcessError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Upload & dispatch: validates, stores the raw upload, runs the executor
/// and records the result.
pub struct EditService {
    storage: Arc<dyn StorageService>,
    executor: Arc<dyn ImageExecutor>,
    store: Arc<dyn ImageStore>,
    config: AppConfig,
}

impl EditService {
    pub fn new(
        storage: Arc<dyn StorageService>,
        executor: Arc<dyn ImageExecutor>,
        store: Arc<dyn ImageStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            storage,
            executor,
            store,
            config,
        }
    }

    pub async fn process(&self, request: EditRequest) -> Result<ImageRecord, EditError> {
        let file = request.file.ok_or(ValidationError::NoFilePart)?;

        let filename = validate_filename(&file.filename, &self.config.allowed_extensions)
            .inspect_err(|e| warn!("Rejected upload '{}': {}", file.filename, e))?;
        validate_file_size(file.data.len(), self.config.max_file_size)?;

        self.executor
            .check_operation(&request.operation)
            .map_err(|e| {
                warn!("Rejected operation '{}': {}", request.operation, e);
                EditError::Operation(e)
            })?;

        let source = self.storage.save_upload(&filename, &file.data).await?;
        info!(
            "📥 Stored upload {} ({} bytes) for {}",
            source.display(),
            file.data.len(),
            request.operation
        );

        let output = self.run_executor(source, request.operation.clone()).await?;

        let record = self
            .store
            .insert(NewImageRecord {
                original_filename: filename,
                processed_filename: format!("{}/{}", STATIC_MOUNT, output.file_name),
                operation: request.operation,
            })
            .await?;

        info!(
            "✅ Processed {} -> {} [{}]",
            record.original_filename, record.processed_filename, record.id
        );
        Ok(record)
    }

    async fn run_executor(
        &self,
        source: PathBuf,
        operation: String,
    ) -> Result<ProcessedImage, EditError> {
        let executor = self.executor.clone();
        let result = tokio::task::spawn_blocking(move || executor.run(&source, &operation))
            .await
            .map_err(|e| EditError::Internal(anyhow::anyhow!("executor task failed: {}", e)))?;

        result.map_err(|e| {
            error!("Image processing failed: {}", e);
            EditError::Processing(e)
        })
    }
}
