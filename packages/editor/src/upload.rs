//! Image upload validation and data-URL encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

pub const ACCEPTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    #[error("Unsupported file type: {0}. Please choose a JPEG, PNG, GIF or WebP image.")]
    UnsupportedType(String),

    #[error("File is too large ({size_mb:.1} MB). Maximum size is {limit_mb} MB.")]
    TooLarge { size_mb: f64, limit_mb: f64 },
}

/// File chosen in a picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    pub accepted: Vec<String>,
    pub max_size_mb: f64,
}

impl UploadPolicy {
    pub fn images(max_size_mb: f64) -> Self {
        Self {
            accepted: ACCEPTED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
            max_size_mb,
        }
    }

    pub fn validate(&self, file: &UploadedFile) -> Result<(), UploadError> {
        let mime = file.mime_type.trim().to_ascii_lowercase();
        if !self.accepted.iter().any(|accepted| *accepted == mime) {
            return Err(UploadError::UnsupportedType(file.mime_type.clone()));
        }

        let size_mb = file.size_mb();
        if size_mb > self.max_size_mb {
            return Err(UploadError::TooLarge {
                size_mb,
                limit_mb: self.max_size_mb,
            });
        }
        Ok(())
    }

    /// Validate, then encode the file as a data URL
    pub fn read_as_data_url(&self, file: &UploadedFile) -> Result<String, UploadError> {
        self.validate(file)?;
        Ok(data_url(&file.mime_type, &file.bytes))
    }
}

pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type.trim().to_ascii_lowercase(),
        STANDARD.encode(bytes)
    )
}
