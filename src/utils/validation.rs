use thiserror::Error;

/// Reasons an upload is turned away before anything touches the disk.
/// The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    EmptyFilename,

    #[error("File type not allowed: '{0}'")]
    ExtensionNotAllowed(String),

    #[error("Invalid filename")]
    InvalidFilename,

    #[error("File size {size} bytes exceeds maximum allowed {max} bytes ({} MB)", .max / 1024 / 1024)]
    FileTooLarge { size: usize, max: usize },
}

/// Lowercased text after the last dot, if any
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// True when the filename carries one of the allowed extensions
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    extension_of(filename).is_some_and(|ext| allowed.iter().any(|a| *a == ext))
}

/// Reduces a client supplied filename to a safe flat name.
///
/// Only the last path component survives. Runs of whitespace become `_`,
/// anything outside ASCII letters, digits, `.`, `_` and `-` is dropped
/// without transliteration (`café` becomes `caf`), and leading or trailing
/// dots and underscores are stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("");

    if name.len() != filename.len() {
        tracing::warn!("Path components stripped from upload name: {}", filename);
    }

    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Validates an uploaded filename and returns its sanitized form
pub fn validate_filename(filename: &str, allowed: &[String]) -> Result<String, ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if !allowed_file(filename, allowed) {
        return Err(ValidationError::ExtensionNotAllowed(
            extension_of(filename).unwrap_or_default(),
        ));
    }

    let sanitized = secure_filename(filename);

    // Sanitizing may eat the whole stem or the extension of non-ASCII names
    if sanitized.is_empty() || !allowed_file(&sanitized, allowed) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ValidationError> {
    if size > max_size {
        return Err(ValidationError::FileTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}
