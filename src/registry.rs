//! Algorithm registry: lookup by name and whole-document responses.
//!
//! The registry is what a viewer talks to. It lists the strategies, runs
//! one by name, and wraps the result with page geometry so the viewer can
//! draw chunk boxes over rendered pages:
//!
//! ```json
//! {
//!   "page_count": 2,
//!   "pages": [{"page": 0, "width": 612.0, "height": 792.0}, ...],
//!   "chunks": [{"id": "...", "text": "...", "bboxes": [...], "metadata": {...}}, ...]
//! }
//! ```
//!
//! Failures serialize as `{"error": "..."}` through [`Registry::process_json`].

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::{
    Chunk, Chunker, ChunkerConfig, DocumentLoader, DocumentSource, Error, PercentileChunker,
    Result, SemanticChunker, SentenceChunker, SimilarityProvider, TopicChunker, WordChunker,
};

/// Name and description of a registered strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    /// Registry key.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

/// Dimensions of one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageInfo {
    /// Zero-based page index.
    pub page: usize,
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
}

/// A chunked document, as sent to the viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResponse {
    /// Number of pages.
    pub page_count: usize,
    /// Per-page dimensions.
    pub pages: Vec<PageInfo>,
    /// The chunks.
    pub chunks: Vec<Chunk>,
}

/// A failed request, as sent to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// The set of available strategies, in display order.
///
/// ## Example
///
/// ```rust
/// use pdfchunk::{ChunkerConfig, Document, Registry};
///
/// let registry = Registry::new(&ChunkerConfig::default()).unwrap();
/// let names: Vec<String> = registry.list_algorithms().into_iter().map(|a| a.name).collect();
/// assert_eq!(names[0], "Basic Word Chunker");
///
/// let doc = Document::from_plain_text(&["Hello there. General Kenobi."]);
/// let chunks = registry.run(&doc, "Sentence Chunker").unwrap();
/// assert_eq!(chunks.len(), 1); // one span, so one unit
/// ```
pub struct Registry {
    chunkers: Vec<Box<dyn Chunker>>,
    provider: Arc<SimilarityProvider>,
}

impl Registry {
    /// Build every strategy from `config`, sharing one embedding provider.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    pub fn new(config: &ChunkerConfig) -> Result<Self> {
        let provider = Arc::new(SimilarityProvider::new(config.backend.clone()));
        Self::with_provider(config, provider)
    }

    /// Build every strategy from `config` around an existing provider.
    ///
    /// The `backend` field of `config` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    pub fn with_provider(config: &ChunkerConfig, provider: Arc<SimilarityProvider>) -> Result<Self> {
        config.validate()?;

        let chunkers: Vec<Box<dyn Chunker>> = vec![
            Box::new(WordChunker::new()),
            Box::new(SentenceChunker::new()),
            Box::new(
                SemanticChunker::new(Arc::clone(&provider))
                    .with_threshold(config.semantic_threshold),
            ),
            Box::new(
                PercentileChunker::new(Arc::clone(&provider))
                    .with_percentile(config.percentile_threshold)?
                    .with_window_size(config.window_size),
            ),
            Box::new(
                TopicChunker::new(Arc::clone(&provider), config.num_topics)?
                    .with_seed(config.kmeans_seed)
                    .with_n_init(config.kmeans_n_init),
            ),
        ];

        Ok(Self { chunkers, provider })
    }

    /// The shared embedding provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<SimilarityProvider> {
        &self.provider
    }

    /// Names and descriptions of every strategy.
    #[must_use]
    pub fn list_algorithms(&self) -> Vec<AlgorithmInfo> {
        self.chunkers
            .iter()
            .map(|c| AlgorithmInfo {
                name: c.name().to_string(),
                description: c.description(),
            })
            .collect()
    }

    /// Look up a strategy by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAlgorithm`] listing the valid names.
    pub fn get(&self, name: &str) -> Result<&dyn Chunker> {
        self.chunkers
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c)
            .ok_or_else(|| Error::UnknownAlgorithm {
                requested: name.to_string(),
                available: self.chunkers.iter().map(|c| c.name().to_string()).collect(),
            })
    }

    /// Run the named strategy over `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAlgorithm`] for an unknown name, otherwise
    /// whatever the strategy returns. No partial chunk list is ever returned.
    pub fn run(&self, doc: &dyn DocumentSource, name: &str) -> Result<Vec<Chunk>> {
        let chunker = self.get(name)?;
        if doc.page_count() == 0 {
            tracing::warn!(algorithm = name, "document has no pages");
        }
        let chunks = chunker.chunk(doc)?;
        tracing::info!(algorithm = name, chunks = chunks.len(), "chunking complete");
        Ok(chunks)
    }

    /// Open `path` with `loader`, run the named strategy, and attach page
    /// geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if `path` does not exist, and
    /// otherwise propagates loader and strategy errors.
    pub fn process(
        &self,
        path: &Path,
        name: &str,
        loader: &dyn DocumentLoader,
    ) -> Result<DocumentResponse> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        // Fail the lookup before paying for the load.
        self.get(name)?;

        let doc = loader.open(path)?;
        let pages = (0..doc.page_count())
            .map(|page| {
                let size = doc.page_size(page)?;
                Ok(PageInfo {
                    page,
                    width: size.width,
                    height: size.height,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let chunks = self.run(doc.as_ref(), name)?;
        Ok(DocumentResponse {
            page_count: pages.len(),
            pages,
            chunks,
        })
    }

    /// [`process`](Self::process), serialized: the response JSON on success,
    /// `{"error": "..."}` on any failure.
    #[must_use]
    pub fn process_json(
        &self,
        path: &Path,
        name: &str,
        loader: &dyn DocumentLoader,
    ) -> serde_json::Value {
        let result = self
            .process(path, name, loader)
            .and_then(|response| Ok(serde_json::to_value(response)?));

        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %path.display(), algorithm = name, error = %e, "request failed");
                serde_json::to_value(ErrorResponse::from(&e)).unwrap_or_default()
            }
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "chunkers",
                &self.chunkers.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("provider", &self.provider)
            .finish()
    }
}
