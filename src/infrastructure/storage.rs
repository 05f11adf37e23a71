use crate::config::AppConfig;
use crate::services::storage::LocalStorageService;
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Creates the upload and public directories and the upload store
pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<LocalStorageService>> {
    for dir in [&config.upload_dir, &config.public_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    }

    info!(
        "💾 Storage: uploads in {}, outputs in {}",
        config.upload_dir.display(),
        config.public_dir.display()
    );

    Ok(Arc::new(LocalStorageService::new(config.upload_dir.clone())))
}
