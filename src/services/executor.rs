use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{AppConfig, OutputNaming};
use crate::services::operations::{OperationRegistry, ProcessError};

/// Quality of every JPEG output
pub const JPEG_QUALITY: u8 = 95;

/// A file written by the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// Location on disk
    pub path: PathBuf,
    /// Bare file name inside the public directory
    pub file_name: String,
}

/// Runs exactly one transformation per call
pub trait ImageExecutor: Send + Sync {
    /// Fails when `operation` would be rejected by `run`, without touching the disk
    fn check_operation(&self, operation: &str) -> Result<(), ProcessError>;

    fn run(&self, source: &Path, operation: &str) -> Result<ProcessedImage, ProcessError>;
}

/// Executor backed by the `image` crate, writing into the public directory
pub struct LocalExecutor {
    registry: OperationRegistry,
    public_dir: PathBuf,
    naming: OutputNaming,
}

impl LocalExecutor {
    pub fn new(registry: OperationRegistry, public_dir: PathBuf, naming: OutputNaming) -> Self {
        Self {
            registry,
            public_dir,
            naming,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            OperationRegistry::builtin(),
            config.public_dir.clone(),
            config.output_naming,
        )
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    fn load(source: &Path) -> Result<DynamicImage, ProcessError> {
        // Sniff the content rather than trusting the extension
        let img = ImageReader::open(source)?.with_guessed_format()?.decode()?;
        // Alpha is dropped, transforms work on three channels
        Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
    }
}

/// Encodes `img` in memory. JPEG output uses [`JPEG_QUALITY`].
pub fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ProcessError> {
    let mut encoded = Vec::new();
    let result = match format {
        ImageFormat::Jpeg => img.write_with_encoder(JpegEncoder::new_with_quality(
            &mut encoded,
            JPEG_QUALITY,
        )),
        _ => img.write_to(&mut Cursor::new(&mut encoded), format),
    };
    result.map_err(|e| ProcessError::Encode(e.to_string()))?;
    Ok(encoded)
}

/// Input file name up to its first dot
pub fn base_name(source: &Path) -> String {
    source
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default()
        .to_string()
}

impl ImageExecutor for LocalExecutor {
    fn check_operation(&self, operation: &str) -> Result<(), ProcessError> {
        self.registry.resolve(operation).map(|_| ())
    }

    fn run(&self, source: &Path, operation: &str) -> Result<ProcessedImage, ProcessError> {
        let op = self.registry.resolve(operation)?;
        debug!("Running {} on {}", op.id, source.display());

        let img = Self::load(source)?;
        let processed = (op.transform)(&img)?;

        let base = match self.naming {
            OutputNaming::Source => base_name(source),
            OutputNaming::Unique => format!("{}_{}", Uuid::new_v4(), base_name(source)),
        };
        let file_name = op.output_name(&base);
        let path = self.public_dir.join(&file_name);

        // Encode fully before writing so a failed encode leaves nothing behind
        let encoded = encode(&processed, op.format)?;
        std::fs::write(&path, encoded)?;

        info!("{} wrote {}", op.id, path.display());
        Ok(ProcessedImage { path, file_name })
    }
}
