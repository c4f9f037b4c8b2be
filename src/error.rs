//! Error types for pdfchunk.

use std::path::PathBuf;

/// Errors that can occur while loading a document or chunking it.
///
/// Every failure is returned as a value; nothing in the crate aborts the
/// calling process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The document could not be opened or its text could not be read.
    #[error("document error: {0}")]
    Document(String),

    /// No algorithm is registered under the requested name.
    #[error("algorithm '{requested}' not found. Available: {available:?}")]
    UnknownAlgorithm {
        /// The name that was looked up.
        requested: String,
        /// Every registered name, in registry order.
        available: Vec<String>,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The fastembed backend requires the `semantic` feature.
    #[error("fastembed embeddings require the 'semantic' feature")]
    SemanticFeatureRequired,

    /// Embedding model error.
    #[error("embedding error during {stage}: {message}")]
    Embedding {
        /// The pipeline stage that failed (e.g. "load model").
        stage: &'static str,
        /// The underlying error message.
        message: String,
    },

    /// Clustering could not run on the given input.
    #[error("clustering error: {0}")]
    Clustering(String),

    /// Configuration or response (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn embedding(stage: &'static str, message: impl ToString) -> Self {
        Self::Embedding {
            stage,
            message: message.to_string(),
        }
    }
}

/// Result type for pdfchunk operations.
pub type Result<T> = std::result::Result<T, Error>;
