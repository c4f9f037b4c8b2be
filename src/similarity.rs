//! Embeddings and vector similarity.
//!
//! Model-backed chunkers share one [`SimilarityProvider`]. The provider owns
//! a backend description and builds the [`Embedder`] on first use, so the
//! cost of loading a model is paid once per provider, and only if a
//! model-backed strategy actually runs.
//!
//! ## Initialisation Contract
//!
//! [`SimilarityProvider::ensure_initialized`] loads the model. [`embed`]
//! calls it implicitly. A failed load is not cached: the next call tries
//! again. Callers serialize chunking requests; there is no teardown or
//! reload, so a different model needs a different provider.
//!
//! [`embed`]: SimilarityProvider::embed

use std::hash::{Hash, Hasher};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A text embedding model: text in, fixed-length vector out.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] if the model fails.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Human-readable model name.
    fn model_name(&self) -> &str;
}

/// Which embedding model a provider loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// A fastembed model (requires the `semantic` feature).
    FastEmbed {
        /// Model name, e.g. `all-MiniLM-L6-v2`.
        model: String,
    },
    /// Deterministic feature hashing over lowercased words.
    Hashing {
        /// Output dimensionality.
        dimensions: usize,
    },
}

/// Default fastembed model name.
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

impl Default for EmbeddingBackend {
    fn default() -> Self {
        if cfg!(feature = "semantic") {
            Self::FastEmbed {
                model: DEFAULT_MODEL.to_string(),
            }
        } else {
            Self::Hashing { dimensions: 256 }
        }
    }
}

impl EmbeddingBackend {
    /// The model name this backend reports.
    #[must_use]
    pub fn model_name(&self) -> String {
        match self {
            Self::FastEmbed { model } => model.clone(),
            Self::Hashing { dimensions } => format!("hashing-{dimensions}"),
        }
    }

    fn load(&self) -> Result<Box<dyn Embedder>> {
        match self {
            Self::Hashing { dimensions } => Ok(Box::new(HashingEmbedder::new(*dimensions)?)),
            #[cfg(feature = "semantic")]
            Self::FastEmbed { model } => Ok(Box::new(crate::embedding::FastEmbedder::load(model)?)),
            #[cfg(not(feature = "semantic"))]
            Self::FastEmbed { .. } => Err(Error::SemanticFeatureRequired),
        }
    }
}

enum Source {
    Backend(EmbeddingBackend),
    Ready,
}

/// Lazily initialised embedding model plus similarity helpers.
pub struct SimilarityProvider {
    source: Source,
    name: String,
    model: OnceCell<Box<dyn Embedder>>,
}

impl SimilarityProvider {
    /// Create a provider that loads `backend` on first use.
    #[must_use]
    pub fn new(backend: EmbeddingBackend) -> Self {
        Self {
            name: backend.model_name(),
            source: Source::Backend(backend),
            model: OnceCell::new(),
        }
    }

    /// Wrap an already constructed embedder.
    #[must_use]
    pub fn from_embedder(embedder: Box<dyn Embedder>) -> Self {
        let name = embedder.model_name().to_string();
        Self {
            source: Source::Ready,
            name,
            model: OnceCell::with_value(embedder),
        }
    }

    /// Name of the model this provider serves.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.name
    }

    /// Whether the model has been loaded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.model.get().is_some()
    }

    /// Load the model if it has not been loaded yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] (stage `load model`) or
    /// [`Error::SemanticFeatureRequired`] if the model cannot be built.
    pub fn ensure_initialized(&self) -> Result<&dyn Embedder> {
        let model = self.model.get_or_try_init(|| match &self.source {
            Source::Backend(backend) => {
                tracing::info!(model = %self.name, "loading embedding model");
                backend.load()
            }
            Source::Ready => Err(Error::embedding("load model", "embedder missing")),
        })?;
        Ok(model.as_ref())
    }

    /// Embed `texts`, one vector per text, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded, fails, or returns the
    /// wrong number of vectors.
    pub fn embed(&self, texts: &[String], stage: &'static str) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.ensure_initialized()?;
        tracing::debug!(count = texts.len(), stage, "generating embeddings");

        let vectors = model.embed(texts).map_err(|e| match e {
            Error::Embedding { message, .. } => Error::Embedding { stage, message },
            other => other,
        })?;
        if vectors.len() != texts.len() {
            return Err(Error::embedding(
                stage,
                format!("expected {} vectors, got {}", texts.len(), vectors.len()),
            ));
        }
        Ok(vectors)
    }

    /// Cosine similarity, clamped to `[-1, 1]`.
    #[must_use]
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }
}

impl std::fmt::Debug for SimilarityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityProvider")
            .field("model", &self.name)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Compute cosine similarity between two embeddings.
///
/// Clamped to `[-1, 1]` to absorb rounding drift. Returns 0 when either
/// vector has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a > 0.0 && norm_b > 0.0 {
        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// `1 - cosine_similarity`, floored at 0.
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).max(0.0)
}

/// Elementwise mean of the vectors at `indices`.
///
/// Returns an empty vector when `indices` is empty.
///
/// # Panics
///
/// Panics if any index is out of range for `vectors`.
#[must_use]
pub fn centroid(vectors: &[Vec<f32>], indices: &[usize]) -> Vec<f32> {
    let Some(&first) = indices.first() else {
        return Vec::new();
    };

    let mut result = vec![0.0; vectors[first].len()];
    for &i in indices {
        for (acc, &v) in result.iter_mut().zip(&vectors[i]) {
            *acc += v;
        }
    }

    let count = indices.len() as f32;
    for v in &mut result {
        *v /= count;
    }
    result
}

/// The `p`-th percentile of `values` (linear interpolation between ranks).
///
/// `p` is in `[0, 100]`. Returns `None` for an empty slice.
///
/// ```rust
/// use pdfchunk::percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile(&values, 0.0), Some(1.0));
/// assert_eq!(percentile(&values, 50.0), Some(2.5));
/// assert_eq!(percentile(&values, 100.0), Some(4.0));
/// ```
#[must_use]
pub fn percentile(values: &[f32], p: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f32;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Bag-of-words embedder using the hashing trick.
///
/// Each lowercased alphanumeric word increments one of `dimensions` buckets
/// (sign chosen by a second hash bit); the result is L2-normalised. Texts
/// that share vocabulary point in similar directions. Deterministic and
/// model-free, which makes it suitable for tests and offline use.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    name: String,
}

impl HashingEmbedder {
    /// Create a hashing embedder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `dimensions == 0`.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::InvalidConfig(
                "hashing embedder dimensions must be > 0".to_string(),
            ));
        }
        Ok(Self {
            dimensions,
            name: format!("hashing-{dimensions}"),
        })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = Fnv1a::default();
            word.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-9 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// FNV-1a, used instead of `DefaultHasher` so vectors are stable across
/// Rust releases.
struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_cosine_identical_and_opposite() {
        let a = [1.0, 2.0, 3.0];
        let b = [-1.0, -2.0, -3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &a) <= 1.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_distance_never_negative() {
        let a = [0.3, 0.4, 0.5];
        assert!(cosine_distance(&a, &a) >= 0.0);
    }

    #[test]
    fn test_centroid() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![5.0, 5.0]];
        assert_eq!(centroid(&vectors, &[0, 1]), vec![0.5, 0.5]);
        assert!(centroid(&vectors, &[]).is_empty());
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        let p90 = percentile(&values, 90.0).unwrap();
        assert!((p90 - 3.7).abs() < 1e-5, "p90 = {p90}");
        assert_eq!(percentile(&[7.0], 90.0), Some(7.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_hashing_shared_vocabulary_is_closer() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let v = embedder
            .embed(&[
                "Neural networks learn patterns".to_string(),
                "Networks of neurons learn patterns".to_string(),
                "Castle walls stopped sieges".to_string(),
            ])
            .unwrap();
        assert!(cosine_similarity(&v[0], &v[1]) > cosine_similarity(&v[0], &v[2]));
    }

    #[test]
    fn test_hashing_zero_dimensions_rejected() {
        assert!(matches!(HashingEmbedder::new(0), Err(Error::InvalidConfig(_))));
    }

    struct CountingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    impl Embedder for CountingEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_provider_lazy_load() {
        let provider = SimilarityProvider::new(EmbeddingBackend::Hashing { dimensions: 8 });
        assert!(!provider.is_initialized());
        assert_eq!(provider.model_name(), "hashing-8");

        let out = provider.embed(&["a b".to_string()], "test").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 8);
        assert!(provider.is_initialized());
    }

    #[test]
    fn test_provider_empty_input_skips_load() {
        let provider = SimilarityProvider::new(EmbeddingBackend::Hashing { dimensions: 8 });
        assert!(provider.embed(&[], "test").unwrap().is_empty());
        assert!(!provider.is_initialized());
    }

    #[test]
    fn test_provider_from_embedder() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = SimilarityProvider::from_embedder(Box::new(CountingEmbedder {
            calls: Arc::clone(&calls),
        }));
        assert!(provider.is_initialized());
        provider.embed(&["x".to_string()], "test").unwrap();
        provider.embed(&["y".to_string()], "test").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Returns one vector fewer than it was given texts.
    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "short"
        }
    }

    #[test]
    fn test_provider_rejects_wrong_vector_count() {
        let provider = SimilarityProvider::from_embedder(Box::new(ShortEmbedder));
        let result = provider.embed(&["a".to_string(), "b".to_string(), "c".to_string()], "test");
        match result {
            Err(Error::Embedding { stage, message }) => {
                assert_eq!(stage, "test");
                assert!(message.contains("expected 3 vectors, got 2"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(not(feature = "semantic"))]
    #[test]
    fn test_fastembed_needs_feature() {
        let provider = SimilarityProvider::new(EmbeddingBackend::FastEmbed {
            model: DEFAULT_MODEL.to_string(),
        });
        assert!(matches!(
            provider.ensure_initialized(),
            Err(Error::SemanticFeatureRequired)
        ));
        assert!(!provider.is_initialized());
    }
}
