//! Error types for the Batata Istio integration
//!
//! Resource generation itself is infallible; errors only arise at the edges:
//! loading configuration and decoding wire messages.

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum IstioError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("unexpected type url '{actual}', expected '{expected}'")]
    TypeMismatch { expected: String, actual: String },
}

/// Result alias used across the Istio crates
pub type Result<T> = std::result::Result<T, IstioError>;
