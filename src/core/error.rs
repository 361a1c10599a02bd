use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),
    #[error("Unsupported video container: {}", .0.display())]
    UnsupportedContainer(PathBuf),
    #[error("Probe failed: {0}")]
    Probe(String),
    #[error("Frame extraction failed ({status}): {stderr}")]
    Extraction { status: String, stderr: String },
    #[error("OCR failed for language {lang}: {message}")]
    Ocr { lang: String, message: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Missing language data files for: {}", .0.join(", "))]
    LanguageDataMissing(Vec<String>),
}

impl PipelineError {
    /// Startup errors abort the whole run; everything else is scoped to one video.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            PipelineError::Config(_) | PipelineError::LanguageDataMissing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
