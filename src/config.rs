//! Chunker configuration.
//!
//! ## The Knobs
//!
//! | Field | Default | Used by |
//! |-------|---------|---------|
//! | `semantic_threshold` | 0.5 | [`SemanticChunker`] |
//! | `percentile_threshold` | 90 | [`PercentileChunker`] |
//! | `window_size` | 1 | [`PercentileChunker`] |
//! | `num_topics` | 5 | [`TopicChunker`] |
//! | `kmeans_seed` | 42 | [`TopicChunker`] |
//! | `kmeans_n_init` | 10 (minimum) | [`TopicChunker`] |
//! | `backend` | fastembed `all-MiniLM-L6-v2` with the `semantic` feature, else hashing | all model-backed chunkers |
//!
//! Every field is optional in serialized form; missing fields take their
//! defaults.
//!
//! [`SemanticChunker`]: crate::SemanticChunker
//! [`PercentileChunker`]: crate::PercentileChunker
//! [`TopicChunker`]: crate::TopicChunker

use serde::{Deserialize, Serialize};

use crate::{EmbeddingBackend, Error, KMeans, PercentileChunker, Result, SemanticChunker, TopicChunker};

/// Settings for every registered strategy.
///
/// # Examples
///
/// ```rust
/// use pdfchunk::ChunkerConfig;
///
/// let config = ChunkerConfig::from_json(r#"{"num_topics": 3}"#).unwrap();
/// assert_eq!(config.num_topics, 3);
/// assert_eq!(config.semantic_threshold, 0.5);
///
/// assert!(ChunkerConfig::from_json(r#"{"percentile_threshold": 120}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Minimum centroid similarity for a sentence to join the running chunk.
    pub semantic_threshold: f32,
    /// Percentile of adjacent window distances used as the split threshold.
    pub percentile_threshold: f32,
    /// Sentences on each side of a sentence in its context window.
    pub window_size: usize,
    /// Number of k-means topics.
    pub num_topics: usize,
    /// k-means RNG seed.
    pub kmeans_seed: u64,
    /// k-means restarts. At least 10; fewer makes topic assignments depend
    /// more on the seed.
    pub kmeans_n_init: usize,
    /// Embedding model.
    pub backend: EmbeddingBackend,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: SemanticChunker::DEFAULT_THRESHOLD,
            percentile_threshold: PercentileChunker::DEFAULT_PERCENTILE,
            window_size: PercentileChunker::DEFAULT_WINDOW,
            num_topics: TopicChunker::DEFAULT_TOPICS,
            kmeans_seed: KMeans::DEFAULT_SEED,
            kmeans_n_init: KMeans::DEFAULT_N_INIT,
            backend: EmbeddingBackend::default(),
        }
    }
}

impl ChunkerConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON and
    /// [`Error::InvalidConfig`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if !self.semantic_threshold.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "semantic_threshold must be finite (got {})",
                self.semantic_threshold
            )));
        }
        if !(0.0..=100.0).contains(&self.percentile_threshold) {
            return Err(Error::InvalidConfig(format!(
                "percentile_threshold must be in [0, 100] (got {})",
                self.percentile_threshold
            )));
        }
        if self.num_topics == 0 {
            return Err(Error::InvalidConfig("num_topics must be > 0".to_string()));
        }
        if self.kmeans_n_init < KMeans::DEFAULT_N_INIT {
            return Err(Error::InvalidConfig(format!(
                "kmeans_n_init must be >= {} (got {})",
                KMeans::DEFAULT_N_INIT,
                self.kmeans_n_init
            )));
        }
        if let EmbeddingBackend::Hashing { dimensions: 0 } = self.backend {
            return Err(Error::InvalidConfig(
                "hashing backend dimensions must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChunkerConfig::default();
        assert_eq!(config.semantic_threshold, 0.5);
        assert_eq!(config.percentile_threshold, 90.0);
        assert_eq!(config.window_size, 1);
        assert_eq!(config.num_topics, 5);
        assert_eq!(config.kmeans_seed, 42);
        assert_eq!(config.kmeans_n_init, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(ChunkerConfig::from_json("{}").unwrap(), ChunkerConfig::default());
    }

    #[test]
    fn test_backend_from_json() {
        let config =
            ChunkerConfig::from_json(r#"{"backend": {"kind": "hashing", "dimensions": 32}}"#)
                .unwrap();
        assert_eq!(config.backend, EmbeddingBackend::Hashing { dimensions: 32 });

        let config = ChunkerConfig::from_json(
            r#"{"backend": {"kind": "fast_embed", "model": "bge-small-en-v1.5"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.backend,
            EmbeddingBackend::FastEmbed {
                model: "bge-small-en-v1.5".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        for json in [
            r#"{"percentile_threshold": -1}"#,
            r#"{"num_topics": 0}"#,
            r#"{"kmeans_n_init": 0}"#,
            r#"{"kmeans_n_init": 9}"#,
            r#"{"backend": {"kind": "hashing", "dimensions": 0}}"#,
        ] {
            assert!(
                matches!(ChunkerConfig::from_json(json), Err(Error::InvalidConfig(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ChunkerConfig::from_json("{not json"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_non_finite_threshold() {
        let config = ChunkerConfig {
            semantic_threshold: f32::NAN,
            ..ChunkerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
