use std::env;
use std::path::{Path, PathBuf};

/// Extensions accepted by the upload form
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg", "gif"];

/// URL prefix under which the public directory is served
pub const STATIC_MOUNT: &str = "static";

/// How the executor names its output files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    /// `<base><suffix>`, derived from the uploaded file name
    Source,
    /// `<uuid>_<base><suffix>`, never collides between requests
    Unique,
}

/// Application configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string (default: "sqlite://images.db?mode=rwc")
    pub database_url: String,

    /// Private directory for raw uploads (default: "uploads")
    pub upload_dir: PathBuf,

    /// Public directory for processed outputs (default: "static")
    pub public_dir: PathBuf,

    /// Maximum upload size in bytes (default: 16 MB)
    pub max_file_size: usize,

    /// Lowercase extensions accepted by the upload form
    pub allowed_extensions: Vec<String>,

    pub output_naming: OutputNaming,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://images.db?mode=rwc".to_string(),
            upload_dir: PathBuf::from("uploads"),
            public_dir: PathBuf::from(STATIC_MOUNT),
            max_file_size: 16 * 1024 * 1024, // 16 MB
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            output_naming: OutputNaming::Source,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.public_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .ok()
                .map(|v| parse_extensions(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or(default.allowed_extensions),

            output_naming: env::var("UNIQUE_OUTPUT_NAMES")
                .map(|v| {
                    if v.to_lowercase() == "true" || v == "1" {
                        OutputNaming::Unique
                    } else {
                        OutputNaming::Source
                    }
                })
                .unwrap_or(default.output_naming),
        }
    }

    /// Config rooted at the given directories, backed by an in-memory database
    pub fn for_dirs(upload_dir: impl AsRef<Path>, public_dir: impl AsRef<Path>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            upload_dir: upload_dir.as_ref().to_path_buf(),
            public_dir: public_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_dir, PathBuf::from("static"));
        assert_eq!(config.max_file_size, 16 * 1024 * 1024);
        assert_eq!(
            config.allowed_extensions,
            vec!["png", "webp", "jpg", "jpeg", "gif"]
        );
        assert_eq!(config.output_naming, OutputNaming::Source);
    }

    #[test]
    fn test_for_dirs_config() {
        let config = AppConfig::for_dirs("/tmp/in", "/tmp/out");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/in"));
        assert_eq!(config.public_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions("PNG, .jpg,,gif "), vec!["png", "jpg", "gif"]);
        assert!(parse_extensions(" , ").is_empty());
    }
}
