//! The output types: a chunk of text anchored to boxes on the page.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::document::Rect;

/// Free-form chunk metadata (`sentence_count`, `topic_id`, ...).
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A rectangle on a specific page, in page-space coordinates.
///
/// Coordinates are normalised on construction so that `x0 <= x1` and
/// `y0 <= y1`. The box is immutable afterwards.
///
/// ```rust
/// use pdfchunk::BoundingBox;
///
/// let bbox = BoundingBox::new(2, 100.0, 40.0, 10.0, 20.0);
/// assert_eq!(bbox.page(), 2);
/// assert_eq!((bbox.x0(), bbox.x1()), (10.0, 100.0));
/// assert_eq!((bbox.y0(), bbox.y1()), (20.0, 40.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    page: usize,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl BoundingBox {
    /// Create a bounding box on `page`.
    #[must_use]
    pub fn new(page: usize, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            page,
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Anchor a page-local rectangle to `page`.
    #[must_use]
    pub fn from_rect(page: usize, rect: Rect) -> Self {
        Self::new(page, rect.x0, rect.y0, rect.x1, rect.y1)
    }

    /// Zero-based page index.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Left edge.
    #[must_use]
    pub fn x0(&self) -> f32 {
        self.x0
    }

    /// Top edge.
    #[must_use]
    pub fn y0(&self) -> f32 {
        self.y0
    }

    /// Right edge.
    #[must_use]
    pub fn x1(&self) -> f32 {
        self.x1
    }

    /// Bottom edge.
    #[must_use]
    pub fn y1(&self) -> f32 {
        self.y1
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A chunk of document text with the boxes it was read from.
///
/// A chunk may span several lines, blocks, or pages, so it carries an
/// ordered list of boxes rather than a single one. The serialized shape
/// is the contract with the viewer:
///
/// ```json
/// {"id": "...", "text": "...", "bboxes": [{"page": 0, "x0": 72.0, ...}], "metadata": {}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// The chunk text.
    pub text: String,
    /// Source boxes, in extraction order.
    pub bboxes: Vec<BoundingBox>,
    /// Strategy-specific metadata.
    pub metadata: Metadata,
}

impl Chunk {
    /// Create a chunk with a fresh identifier.
    #[must_use]
    pub fn new(text: impl Into<String>, bboxes: Vec<BoundingBox>, metadata: Metadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            bboxes,
            metadata,
        }
    }

    /// The length of the chunk text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the chunk text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The distinct pages this chunk touches, ascending.
    #[must_use]
    pub fn pages(&self) -> Vec<usize> {
        let mut pages: Vec<usize> = self.bboxes.iter().map(BoundingBox::page).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ id: {}, len: {}, boxes: {}, pages: {:?} }}",
            self.id,
            self.len(),
            self.bboxes.len(),
            self.pages()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_serializes_flat() {
        let bbox = BoundingBox::new(1, 1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_value(bbox).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"page": 1, "x0": 1.0, "y0": 2.0, "x1": 3.0, "y1": 4.0})
        );
    }

    #[test]
    fn test_chunk_ids_are_unique() {
        let a = Chunk::new("a", vec![], Metadata::new());
        let b = Chunk::new("a", vec![], Metadata::new());
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_pages_deduplicated() {
        let chunk = Chunk::new(
            "x",
            vec![
                BoundingBox::new(3, 0.0, 0.0, 1.0, 1.0),
                BoundingBox::new(1, 0.0, 0.0, 1.0, 1.0),
                BoundingBox::new(3, 0.0, 2.0, 1.0, 3.0),
            ],
            Metadata::new(),
        );
        assert_eq!(chunk.pages(), vec![1, 3]);
    }
}
