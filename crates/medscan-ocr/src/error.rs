use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("variant image {path} could not be loaded: {message}")]
    ImageLoad { path: PathBuf, message: String },
    #[error("backend error: {message}")]
    Backend { message: String },
}

impl OcrError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
