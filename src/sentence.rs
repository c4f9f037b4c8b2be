//! One chunk per sentence unit.
//!
//! Runs the span extractor and emits every sentence unit unchanged. The
//! result shows exactly where the naive sentence detection draws its lines:
//!
//! ```text
//! "Dr. Smith arrived at 3.30 p.m. and left."
//!     ^                           ^
//! Only span ends count. Whether "Dr." splits depends on whether the PDF
//! happened to end a span there.
//! ```

use crate::assemble::assemble_run;
use crate::extract::extract_sentences;
use crate::{Chunk, Chunker, DocumentSource, Result};

/// Sentence-per-chunk strategy.
///
/// ## Example
///
/// ```rust
/// use pdfchunk::{Chunker, Document, SentenceChunker};
///
/// let doc = Document::from_plain_text(&["First sentence.\nSecond sentence.\n\nHeading"]);
/// let chunks = SentenceChunker::new().chunk(&doc).unwrap();
///
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[0].text, "First sentence.");
/// assert_eq!(chunks[2].text, "Heading");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SentenceChunker;

impl SentenceChunker {
    /// Registry key.
    pub const NAME: &'static str = "Sentence Chunker";

    /// Create a sentence chunker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for SentenceChunker {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Chunks text by sentences (approximate).".to_string()
    }

    fn chunk(&self, doc: &dyn DocumentSource) -> Result<Vec<Chunk>> {
        let units = extract_sentences(doc)?;
        Ok((0..units.len())
            .map(|i| assemble_run(&units, i..i + 1))
            .collect())
    }
}
