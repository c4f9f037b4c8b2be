//! # pdfchunk
//!
//! Segmenting PDF text into chunks that stay anchored to the page.
//!
//! ## The Problem
//!
//! A PDF does not contain sentences. It contains positioned runs of glyphs:
//! spans, grouped into lines and blocks by whatever produced the file. To
//! chunk a PDF for retrieval, and still be able to highlight where each
//! chunk came from, we need to:
//!
//! - reassemble spans into sentence-like units without losing their boxes,
//! - group those units into chunks by some notion of topic,
//! - carry every source box through to the output.
//!
//! ```text
//! Document ──► spans ──► sentence units ──► strategy ──► chunks
//!              (page, block, line)          word | sentence | semantic | topic
//!                                           each chunk: text + boxes + metadata
//! ```
//!
//! ## Chunking Strategies
//!
//! ### Word
//!
//! One chunk per word, one box per chunk. For checking that boxes line up.
//!
//! ### Sentence
//!
//! One chunk per sentence unit. Sentence ends are naive: a span ending in
//! `.`, `!` or `?`, or the end of a block.
//!
//! ### Semantic (running mean)
//!
//! Embed every sentence; append the next sentence to the running chunk while
//! its similarity to the chunk centroid stays above a threshold.
//!
//! ### Semantic (percentile)
//!
//! Embed each sentence together with its neighbours; split at the gaps whose
//! distance exceeds a percentile of all gaps in the document.
//!
//! ### Topic
//!
//! k-means over sentence embeddings. Chunks gather sentences from anywhere in
//! the document and are emitted in topic order, not reading order.
//!
//! ## Quick Start
//!
//! ```rust
//! use pdfchunk::{Chunker, Document, SentenceChunker, WordChunker};
//!
//! let doc = Document::from_plain_text(&[
//!     "Chunking splits text.\nEach chunk keeps its boxes.",
//!     "Second page.",
//! ]);
//!
//! let words = WordChunker::new().chunk(&doc).unwrap();
//! assert_eq!(words.len(), 10);
//!
//! let sentences = SentenceChunker::new().chunk(&doc).unwrap();
//! assert_eq!(sentences.len(), 3);
//! assert_eq!(sentences[2].bboxes[0].page(), 1);
//! ```
//!
//! ## By Name
//!
//! ```rust
//! use pdfchunk::{ChunkerConfig, Document, Registry};
//!
//! let registry = Registry::new(&ChunkerConfig::default()).unwrap();
//! let doc = Document::from_plain_text(&["Hello world."]);
//!
//! let chunks = registry.run(&doc, "Sentence Chunker").unwrap();
//! assert_eq!(chunks[0].text, "Hello world.");
//!
//! assert!(registry.run(&doc, "Nope").is_err());
//! ```
//!
//! ## Features
//!
//! | Feature | Adds |
//! |---------|------|
//! | `semantic` | fastembed models (default `all-MiniLM-L6-v2`) |
//! | `pdf` | [`PdfiumLoader`] for reading PDF files |
//!
//! Without `semantic`, model-backed strategies use [`HashingEmbedder`].
//!
//! ## Performance Considerations
//!
//! | Strategy | Embeddings | Other |
//! |----------|------------|-------|
//! | Word | 0 | O(words) |
//! | Sentence | 0 | O(spans) |
//! | Semantic | n | O(n × d) |
//! | Percentile | n windows | O(n log n) for the percentile |
//! | Topic | n | O(n_init × iters × n × k × d) |
//!
//! Where n = sentence units, d = embedding dimension, k = topics.
//!
//! ## Concurrency
//!
//! Everything runs synchronously on the calling thread. A model-backed
//! strategy loads its model on first use; callers should serialize chunking
//! requests (or call [`SimilarityProvider::ensure_initialized`] up front).

mod assemble;
mod chunk;
mod config;
mod document;
mod error;
mod extract;
mod fixed;
mod kmeans;
mod registry;
mod semantic;
mod sentence;
mod similarity;
mod topic;

#[cfg(feature = "semantic")]
mod embedding;

#[cfg(feature = "pdf")]
mod pdfium;

pub use chunk::{BoundingBox, Chunk, Metadata};
pub use config::ChunkerConfig;
pub use document::{
    Block, Document, DocumentLoader, DocumentSource, Line, Page, PageSize, PlainTextLoader, Rect,
    Span, Word,
};
pub use error::{Error, Result};
pub use fixed::WordChunker;
pub use kmeans::{KMeans, KMeansFit};
pub use registry::{AlgorithmInfo, DocumentResponse, ErrorResponse, PageInfo, Registry};
pub use semantic::{PercentileChunker, SemanticChunker};
pub use sentence::SentenceChunker;
pub use similarity::{
    centroid, cosine_distance, cosine_similarity, percentile, Embedder, EmbeddingBackend,
    HashingEmbedder, SimilarityProvider, DEFAULT_MODEL,
};
pub use topic::{TopicChunker, TOPIC_SEPARATOR};

#[cfg(feature = "semantic")]
pub use embedding::FastEmbedder;

#[cfg(feature = "pdf")]
pub use pdfium::PdfiumLoader;

/// A chunking strategy.
///
/// All strategies implement this trait, enabling polymorphic usage:
///
/// ```rust
/// use pdfchunk::{Chunk, Chunker, Document, SentenceChunker, WordChunker};
///
/// fn chunk_document(chunker: &dyn Chunker, doc: &Document) -> Vec<Chunk> {
///     chunker.chunk(doc).unwrap()
/// }
///
/// let doc = Document::from_plain_text(&["Hello world. This is a test."]);
/// let words = chunk_document(&WordChunker::new(), &doc);
/// let sentences = chunk_document(&SentenceChunker::new(), &doc);
/// assert!(words.len() > sentences.len());
/// ```
pub trait Chunker: Send + Sync {
    /// Registry key, unique within a [`Registry`].
    fn name(&self) -> &str;

    /// Human-readable description, including live parameters.
    fn description(&self) -> String;

    /// Split a document into chunks.
    ///
    /// A document with no text yields no chunks, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or a model-backed step
    /// fails. Failures are all-or-nothing: no partial chunk list is returned.
    fn chunk(&self, doc: &dyn DocumentSource) -> Result<Vec<Chunk>>;
}
