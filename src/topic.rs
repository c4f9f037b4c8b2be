//! Topic chunking: k-means over sentence embeddings.
//!
//! Unlike every other strategy, topic chunks are not contiguous. Sentences
//! about the same subject are pulled together from wherever they occur:
//!
//! ```text
//! Sentences: S1(ml) S2(ml) S3(weather) S4(ml) S5(weather)
//! Labels:      0      0        1         0        1
//!
//! Chunk "TOPIC 1": S1 --- S2 --- S4
//! Chunk "TOPIC 2": S3 --- S5
//! ```
//!
//! Within a topic, sentences keep document order. Topics are emitted in
//! label order, so the chunk list as a whole is not in reading order; every
//! chunk says so with `sequential: false` in its metadata.

use std::sync::Arc;

use serde_json::Value;

use crate::assemble::{Assembled, SPACE};
use crate::extract::extract_sentences;
use crate::{Chunk, Chunker, DocumentSource, Error, KMeans, Metadata, Result, SimilarityProvider};

/// Marker placed between sentences drawn from different document locations.
pub const TOPIC_SEPARATOR: &str = "\n\n---\n\n";

const FALLBACK_LABEL: &str = "Full Document (Too few sentences for topic modeling)";

/// k-means topic chunker.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use pdfchunk::{Chunker, Document, EmbeddingBackend, SimilarityProvider, TopicChunker};
///
/// let provider = Arc::new(SimilarityProvider::new(EmbeddingBackend::Hashing { dimensions: 64 }));
/// let chunker = TopicChunker::new(provider, 2).unwrap();
///
/// let doc = Document::from_plain_text(&["Cats purr.\nTaxes are due.\nCats nap."]);
/// let chunks = chunker.chunk(&doc).unwrap();
///
/// assert!(chunks.len() <= 2);
/// assert!(chunks.iter().all(|c| c.text.starts_with("TOPIC ")));
/// ```
#[derive(Debug, Clone)]
pub struct TopicChunker {
    provider: Arc<SimilarityProvider>,
    kmeans: KMeans,
    name: String,
}

impl TopicChunker {
    /// Default number of topics.
    pub const DEFAULT_TOPICS: usize = 5;

    /// Create a chunker that clusters into `num_topics` topics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `num_topics == 0`.
    pub fn new(provider: Arc<SimilarityProvider>, num_topics: usize) -> Result<Self> {
        if num_topics == 0 {
            return Err(Error::InvalidConfig("num_topics must be > 0".to_string()));
        }
        Ok(Self {
            provider,
            kmeans: KMeans::new(num_topics),
            name: Self::registry_name(num_topics),
        })
    }

    /// Registry key for a given topic count.
    #[must_use]
    pub fn registry_name(num_topics: usize) -> String {
        format!("Topic Chunker (K-Means k={num_topics})")
    }

    /// Set the k-means seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.kmeans = self.kmeans.with_seed(seed);
        self
    }

    /// Set the number of k-means restarts.
    ///
    /// [`ChunkerConfig`](crate::ChunkerConfig) requires at least 10; lower
    /// values are accepted here for tests and benchmarks.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.kmeans = self.kmeans.with_n_init(n_init);
        self
    }

    /// Number of topics.
    #[must_use]
    pub fn num_topics(&self) -> usize {
        self.kmeans.k()
    }
}

impl Chunker for TopicChunker {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!(
            "Groups text into {} topics using K-Means clustering on embeddings (Model: {}). \
             Chunks are non-sequential.",
            self.num_topics(),
            self.provider.model_name()
        )
    }

    fn chunk(&self, doc: &dyn DocumentSource) -> Result<Vec<Chunk>> {
        let units = extract_sentences(doc)?;
        if units.is_empty() {
            return Ok(vec![]);
        }

        let k = self.num_topics();
        if units.len() < k {
            tracing::warn!(
                sentences = units.len(),
                topics = k,
                "too few sentences for topic modeling, returning whole document"
            );
            let whole = Assembled::join(&units, SPACE);
            let text = format!("{FALLBACK_LABEL}\n{}", whole.text);
            let mut metadata = Metadata::new();
            metadata.insert("fallback".to_string(), Value::from(true));
            metadata.insert(
                "sentence_count".to_string(),
                Value::from(whole.sentence_count),
            );
            return Ok(vec![Chunk::new(text, whole.bboxes, metadata)]);
        }

        let texts: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
        let embeddings = self.provider.embed(&texts, "embed sentences")?;

        tracing::debug!(topics = k, sentences = units.len(), "clustering");
        let fit = self.kmeans.fit(&embeddings)?;

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
        for (i, &label) in fit.labels.iter().enumerate() {
            members[label].push(i);
        }

        let chunks: Vec<Chunk> = members
            .iter()
            .enumerate()
            .filter(|(_, indices)| !indices.is_empty())
            .map(|(label, indices)| {
                let joined = Assembled::join(indices.iter().map(|&i| &units[i]), TOPIC_SEPARATOR);
                let text = format!("TOPIC {}:\n{}", label + 1, joined.text);
                let mut metadata = Metadata::new();
                metadata.insert("topic_id".to_string(), Value::from(label));
                metadata.insert("sequential".to_string(), Value::from(false));
                Assembled { text, ..joined }.into_chunk(metadata)
            })
            .collect();

        tracing::debug!(
            topics = k,
            non_empty = chunks.len(),
            inertia = fit.inertia,
            "topic chunking complete"
        );
        Ok(chunks)
    }
}
