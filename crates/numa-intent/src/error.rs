//! Errors raised by the Financial Intent Motor (spec §7).

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum FimError {
    #[error("audio yielded no usable text")]
    UnintelligibleAudio,

    #[error("provider error: {0}")]
    ProviderError(String),

    #[error("deadline exceeded")]
    Timeout,

    #[error("document analyzer returned no usable data: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, FimError>;
