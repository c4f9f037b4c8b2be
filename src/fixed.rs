//! One chunk per word.
//!
//! The finest-grained strategy. Each word on each page becomes its own chunk
//! with exactly one bounding box, so rendering the chunks over the page shows
//! every word box the extractor produced. Mostly useful for checking that
//! boxes line up with the rendered text.
//!
//! ```text
//! Page 0, block 1, line 0: "Chunking splits text"
//!
//! Chunk 0: "Chunking"  [x0=72 .. x1=120]   {block: 1, line: 0}
//! Chunk 1: "splits"    [x0=126 .. x1=162]  {block: 1, line: 0}
//! Chunk 2: "text"      [x0=168 .. x1=192]  {block: 1, line: 0}
//! ```
//!
//! Words come straight from [`DocumentSource::words`], not from sentence
//! units: sentence reassembly would lose the per-word boxes.

use serde_json::Value;

use crate::{BoundingBox, Chunk, Chunker, DocumentSource, Metadata, Result};

/// Word-per-chunk strategy.
///
/// ## Example
///
/// ```rust
/// use pdfchunk::{Chunker, Document, WordChunker};
///
/// let doc = Document::from_plain_text(&["Hello world.\n\nBye."]);
/// let chunks = WordChunker::new().chunk(&doc).unwrap();
///
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[2].text, "Bye.");
/// assert_eq!(chunks[2].metadata["block"], 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WordChunker;

impl WordChunker {
    /// Registry key.
    pub const NAME: &'static str = "Basic Word Chunker";

    /// Create a word chunker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for WordChunker {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Chunks text by words (useful for debugging bounding boxes).".to_string()
    }

    fn chunk(&self, doc: &dyn DocumentSource) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        for page in 0..doc.page_count() {
            for word in doc.words(page)?.iter() {
                let mut metadata = Metadata::new();
                metadata.insert("block".to_string(), Value::from(word.block));
                metadata.insert("line".to_string(), Value::from(word.line));

                chunks.push(Chunk::new(
                    word.text.clone(),
                    vec![BoundingBox::from_rect(page, word.rect)],
                    metadata,
                ));
            }
        }

        Ok(chunks)
    }
}
