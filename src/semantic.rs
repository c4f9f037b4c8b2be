//! Semantic chunking using embedding similarity.
//!
//! Merges consecutive sentence units while they stay on topic, detected by
//! embedding similarity. Two boundary policies are provided.
//!
//! ## Running Mean ([`SemanticChunker`])
//!
//! Keep a running chunk. Compare each next sentence with the *centroid* of
//! the sentences already in the chunk, not just the previous sentence:
//!
//! ```text
//! Running chunk: [S1, S2, S3]     centroid C = mean(E1, E2, E3)
//! Next:          S4               sim(C, E4) = 0.62 >= 0.5  -> append
//! Next:          S5               sim(C', E5) = 0.21 < 0.5  -> close chunk, start [S5]
//! ```
//!
//! Comparing against the centroid means one off-topic aside does not drag
//! the chunk along with it. Cost is one embedding per sentence and one
//! similarity per sentence; the centroid is kept as a running sum, so a long
//! chunk costs no more per step than a short one.
//!
//! ## Percentile ([`PercentileChunker`])
//!
//! A fixed threshold means different things in different documents: a dense
//! technical paper has uniformly high similarity, a newsletter uniformly low.
//! The percentile policy derives the threshold from the document itself:
//!
//! ```text
//! 1. Window:    W_i = join(S_{i-w} .. S_{i+w})   (clamped to the document)
//! 2. Distances: d_i = 1 - sim(E(W_i), E(W_{i+1}))
//! 3. Threshold: t = percentile(d, p)             (p = 90 by default)
//! 4. Split after i wherever d_i > t
//! ```
//!
//! Embedding windows instead of bare sentences gives short fragments
//! (bullets, headings) enough context to embed meaningfully.
//!
//! | Percentile | Effect |
//! |------------|--------|
//! | 50 | Splits at half of all gaps |
//! | 90 | Only the sharpest 10% of shifts (recommended) |
//! | 100 | Never splits |

use std::sync::Arc;

use serde_json::Value;

use crate::assemble::{assemble_indices, assemble_run};
use crate::extract::extract_sentences;
use crate::similarity::{cosine_distance, percentile};
use crate::{Chunk, Chunker, DocumentSource, Error, Result, SimilarityProvider};

/// Running-mean semantic chunker with a fixed similarity threshold.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use pdfchunk::{Chunker, Document, EmbeddingBackend, SemanticChunker, SimilarityProvider};
///
/// let provider = Arc::new(SimilarityProvider::new(EmbeddingBackend::Hashing { dimensions: 64 }));
/// let chunker = SemanticChunker::new(provider).with_threshold(0.5);
///
/// let doc = Document::from_plain_text(&["Cats purr.\nCats purr loudly.\nTaxes are due."]);
/// let chunks = chunker.chunk(&doc).unwrap();
///
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].text, "Cats purr. Cats purr loudly.");
/// ```
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    provider: Arc<SimilarityProvider>,
    threshold: f32,
}

impl SemanticChunker {
    /// Registry key.
    pub const NAME: &'static str = "Semantic Chunker";
    /// Default similarity threshold.
    pub const DEFAULT_THRESHOLD: f32 = 0.5;

    /// Create a chunker using `provider` for embeddings.
    #[must_use]
    pub fn new(provider: Arc<SimilarityProvider>) -> Self {
        Self {
            provider,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Set the similarity a sentence needs to join the running chunk.
    ///
    /// Values above 1 never merge; values below -1 always merge.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// The similarity threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Chunker for SemanticChunker {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        format!(
            "Expands chunks based on semantic similarity (Model: {}, Threshold: {}).",
            self.provider.model_name(),
            self.threshold
        )
    }

    fn chunk(&self, doc: &dyn DocumentSource) -> Result<Vec<Chunk>> {
        let units = extract_sentences(doc)?;
        if units.is_empty() {
            return Ok(vec![]);
        }

        let texts: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
        let embeddings = self.provider.embed(&texts, "embed sentences")?;

        let mut chunks = Vec::new();
        let mut current = vec![0];
        let mut running = RunningMean::new(&embeddings[0]);

        for i in 1..units.len() {
            let sim = self.provider.similarity(&running.mean(), &embeddings[i]);

            if sim >= self.threshold {
                current.push(i);
                running.push(&embeddings[i]);
            } else {
                chunks.push(assemble_indices(&units, &current));
                current = vec![i];
                running = RunningMean::new(&embeddings[i]);
            }
        }
        chunks.push(assemble_indices(&units, &current));

        tracing::debug!(
            sentences = units.len(),
            chunks = chunks.len(),
            threshold = self.threshold,
            "semantic chunking complete"
        );
        Ok(chunks)
    }
}

/// Elementwise sum and count of the vectors in the running chunk.
///
/// Same accumulation order as [`centroid`](crate::centroid), so the mean is
/// bit-identical to recomputing it, at O(d) per step.
struct RunningMean {
    sum: Vec<f32>,
    count: usize,
}

impl RunningMean {
    fn new(first: &[f32]) -> Self {
        Self {
            sum: first.to_vec(),
            count: 1,
        }
    }

    fn push(&mut self, vector: &[f32]) {
        for (acc, &v) in self.sum.iter_mut().zip(vector) {
            *acc += v;
        }
        self.count += 1;
    }

    fn mean(&self) -> Vec<f32> {
        let count = self.count as f32;
        self.sum.iter().map(|v| v / count).collect()
    }
}

/// Windowed semantic chunker with a document-relative threshold.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use pdfchunk::{Chunker, Document, EmbeddingBackend, PercentileChunker, SimilarityProvider};
///
/// let provider = Arc::new(SimilarityProvider::new(EmbeddingBackend::Hashing { dimensions: 64 }));
/// let chunker = PercentileChunker::new(provider).with_percentile(100.0).unwrap();
///
/// let doc = Document::from_plain_text(&["One.\nTwo.\nThree."]);
/// let chunks = chunker.chunk(&doc).unwrap();
///
/// // Nothing exceeds the maximum distance, so nothing splits.
/// assert_eq!(chunks.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PercentileChunker {
    provider: Arc<SimilarityProvider>,
    percentile: f32,
    window_size: usize,
}

impl PercentileChunker {
    /// Registry key.
    pub const NAME: &'static str = "Percentile Semantic Chunker";
    /// Default split percentile.
    pub const DEFAULT_PERCENTILE: f32 = 90.0;
    /// Default context window (sentences on each side).
    pub const DEFAULT_WINDOW: usize = 1;

    /// Create a chunker using `provider` for embeddings.
    #[must_use]
    pub fn new(provider: Arc<SimilarityProvider>) -> Self {
        Self {
            provider,
            percentile: Self::DEFAULT_PERCENTILE,
            window_size: Self::DEFAULT_WINDOW,
        }
    }

    /// Set the percentile of adjacent distances used as the split threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] unless `0 <= percentile <= 100`.
    pub fn with_percentile(mut self, percentile: f32) -> Result<Self> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(Error::InvalidConfig(format!(
                "percentile must be in [0, 100] (got {percentile})"
            )));
        }
        self.percentile = percentile;
        Ok(self)
    }

    /// Set how many sentences on each side join a sentence's context window.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// The split percentile.
    #[must_use]
    pub fn percentile(&self) -> f32 {
        self.percentile
    }

    /// The context window size.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    fn windows(&self, texts: &[&str]) -> Vec<String> {
        let n = texts.len();
        (0..n)
            .map(|i| {
                let start = i.saturating_sub(self.window_size);
                let end = (i + self.window_size + 1).min(n);
                texts[start..end].join(" ")
            })
            .collect()
    }
}

impl Chunker for PercentileChunker {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        format!(
            "Splits where the distance between adjacent context windows exceeds the document's \
             {}th percentile (Model: {}, Window: {}).",
            self.percentile,
            self.provider.model_name(),
            self.window_size
        )
    }

    fn chunk(&self, doc: &dyn DocumentSource) -> Result<Vec<Chunk>> {
        let units = extract_sentences(doc)?;
        if units.is_empty() {
            return Ok(vec![]);
        }
        if units.len() < 2 {
            return Ok(vec![assemble_run(&units, 0..units.len())]);
        }

        let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
        let windows = self.windows(&texts);
        let embeddings = self.provider.embed(&windows, "embed windows")?;

        let distances: Vec<f32> = embeddings
            .windows(2)
            .map(|pair| cosine_distance(&pair[0], &pair[1]))
            .collect();
        let threshold = percentile(&distances, self.percentile).unwrap_or(f32::INFINITY);

        let mut chunks = Vec::new();
        let mut start = 0;
        for (i, &d) in distances.iter().enumerate() {
            if d > threshold {
                let mut chunk = assemble_run(&units, start..i + 1);
                chunk
                    .metadata
                    .insert("split_distance".to_string(), Value::from(d));
                chunks.push(chunk);
                start = i + 1;
            }
        }
        chunks.push(assemble_run(&units, start..units.len()));

        for chunk in &mut chunks {
            chunk
                .metadata
                .insert("threshold".to_string(), Value::from(threshold));
        }

        tracing::debug!(
            sentences = units.len(),
            chunks = chunks.len(),
            percentile = self.percentile,
            threshold,
            "percentile chunking complete"
        );
        Ok(chunks)
    }
}
