//! Reassembling spans into sentence units.
//!
//! ## The Approach
//!
//! PDF text arrives as spans: fragments of a line sharing one font and one
//! rectangle. A sentence may cover many spans, and a span may end mid-word or
//! mid-sentence. We walk spans in reading order and accumulate text until a
//! span ends with terminal punctuation:
//!
//! ```text
//! Block:  ["Chunking splits", "text into pieces.", "Each piece", "has boxes."]
//!                                            ^                          ^
//!                                      close unit 0               close unit 1
//!
//! Unit 0: "Chunking splits text into pieces."  boxes: [span0, span1]
//! Unit 1: "Each piece has boxes."              boxes: [span2, span3]
//! ```
//!
//! Blocks are hard boundaries. Whatever is left at the end of a block
//! (headings, bullets, captions) becomes a unit of its own.
//!
//! ## Known Approximation
//!
//! Terminal detection is naive: `.`, `!` or `?` at the end of a span. An
//! abbreviation or decimal number that happens to end a span closes the unit
//! early. Quotes after the punctuation (`"Stop!"`) keep it open.

use crate::{BoundingBox, DocumentSource, Result};

/// Text accumulated from consecutive spans, with their boxes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SentenceUnit {
    pub(crate) text: String,
    pub(crate) bboxes: Vec<BoundingBox>,
}

const TERMINALS: [char; 3] = ['.', '!', '?'];

#[derive(Default)]
struct Accumulator {
    text: String,
    bboxes: Vec<BoundingBox>,
}

impl Accumulator {
    fn push(&mut self, text: &str, bbox: BoundingBox) {
        if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
            self.text.push(' ');
        }
        self.text.push_str(text);
        self.bboxes.push(bbox);
    }

    /// Close the current unit if it holds any visible text, and reset.
    fn flush(&mut self, out: &mut Vec<SentenceUnit>) {
        let text = self.text.trim();
        if !text.is_empty() {
            out.push(SentenceUnit {
                text: text.to_string(),
                bboxes: std::mem::take(&mut self.bboxes),
            });
        }
        self.text.clear();
        self.bboxes.clear();
    }
}

/// Extract sentence units from every page, in reading order.
///
/// # Errors
///
/// Propagates any error from the document source.
pub(crate) fn extract_sentences(doc: &dyn DocumentSource) -> Result<Vec<SentenceUnit>> {
    let mut units = Vec::new();

    for page in 0..doc.page_count() {
        for block in doc.blocks(page)?.iter() {
            if block.is_image() {
                continue;
            }

            let mut acc = Accumulator::default();
            for span in block.lines.iter().flat_map(|line| &line.spans) {
                acc.push(&span.text, BoundingBox::from_rect(page, span.rect));
                if span.text.trim().ends_with(TERMINALS) {
                    acc.flush(&mut units);
                }
            }
            acc.flush(&mut units);
        }
    }

    tracing::debug!(
        pages = doc.page_count(),
        sentences = units.len(),
        "extracted sentence units"
    );
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Line, Page, PageSize, Rect, Span};
    use crate::Document;

    fn span(text: &str, x: f32) -> Span {
        Span::new(text, Rect::new(x, 0.0, x + 10.0, 10.0))
    }

    fn doc_of(blocks: Vec<Block>) -> Document {
        Document::new(vec![Page::new(PageSize::LETTER, blocks)])
    }

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let doc = doc_of(vec![Block::text(vec![
            Line {
                spans: vec![span("Chunking splits", 0.0), span("text into pieces.", 10.0)],
            },
            Line {
                spans: vec![span("Each piece", 0.0), span("has boxes!", 10.0)],
            },
        ])]);
        let units = extract_sentences(&doc).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "Chunking splits text into pieces.");
        assert_eq!(units[0].bboxes.len(), 2);
        assert_eq!(units[1].text, "Each piece has boxes!");
    }

    #[test]
    fn test_block_end_closes_fragment() {
        let doc = doc_of(vec![
            Block::text(vec![Line {
                spans: vec![span("Heading without period", 0.0)],
            }]),
            Block::text(vec![Line {
                spans: vec![span("Body?", 0.0)],
            }]),
        ]);
        let units = extract_sentences(&doc).unwrap();
        let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["Heading without period", "Body?"]);
    }

    #[test]
    fn test_no_double_space_after_trailing_whitespace() {
        let doc = doc_of(vec![Block::text(vec![Line {
            spans: vec![span("ends with space ", 0.0), span("next.", 10.0)],
        }])]);
        let units = extract_sentences(&doc).unwrap();
        assert_eq!(units[0].text, "ends with space next.");
    }

    #[test]
    fn test_image_blocks_skipped() {
        let doc = doc_of(vec![
            Block::image(),
            Block::text(vec![Line {
                spans: vec![span("Caption", 0.0)],
            }]),
        ]);
        let units = extract_sentences(&doc).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "Caption");
    }

    #[test]
    fn test_whitespace_only_tail_dropped() {
        let doc = doc_of(vec![Block::text(vec![Line {
            spans: vec![span("Done.", 0.0), span("   ", 10.0)],
        }])]);
        let units = extract_sentences(&doc).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].bboxes.len(), 1);
    }

    #[test]
    fn test_abbreviation_closes_early() {
        let doc = doc_of(vec![Block::text(vec![Line {
            spans: vec![span("Dr.", 0.0), span("Smith arrived.", 10.0)],
        }])]);
        let units = extract_sentences(&doc).unwrap();
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_pages_in_order() {
        let doc = Document::from_plain_text(&["First page.", "Second page."]);
        let units = extract_sentences(&doc).unwrap();
        assert_eq!(units[0].bboxes[0].page(), 0);
        assert_eq!(units[1].bboxes[0].page(), 1);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::default();
        assert!(extract_sentences(&doc).unwrap().is_empty());
    }
}
