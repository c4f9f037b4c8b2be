//! Positioned text: the structural view of a document that chunkers read.
//!
//! A page is a sequence of blocks, a block a sequence of lines, a line a
//! sequence of spans. Each span carries its rectangle in page space (origin
//! top-left, y growing downward). Pages also expose a flat word list, which
//! the word chunker needs at a finer grain than spans.
//!
//! ```text
//! Page 0
//! ├── Block 0 ── Line 0 ── Span "Introduction"
//! ├── Block 1 ── Line 0 ── Span "Chunking splits text into"
//! │           └─ Line 1 ── Span "pieces. Each piece has boxes."
//! └── Block 2 (image, no lines)
//! ```
//!
//! [`Document`] is the owned, in-memory implementation. Anything else that
//! can produce this structure (a PDF backend, a test fixture) implements
//! [`DocumentSource`] directly.

use std::borrow::Cow;
use std::path::Path;

use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, Result};

/// Rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge.
    pub x1: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A run of text sharing one rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Raw span text, untrimmed.
    pub text: String,
    /// Where the span sits on the page.
    pub rect: Rect,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }
}

/// One visual line of a block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    /// Spans in reading order.
    pub spans: Vec<Span>,
}

/// A structural block. Blocks without lines are images and carry no text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    /// Lines in reading order.
    pub lines: Vec<Line>,
}

impl Block {
    /// A text block.
    #[must_use]
    pub fn text(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// An image block (no text).
    #[must_use]
    pub fn image() -> Self {
        Self { lines: Vec::new() }
    }

    /// Whether this block has no lines.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A whitespace-delimited word with its own rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// The word text.
    pub text: String,
    /// Where the word sits on the page.
    pub rect: Rect,
    /// Index of the block the word came from.
    pub block: usize,
    /// Index of the line within that block.
    pub line: usize,
    /// Index of the word within that line.
    pub word: usize,
}

/// Page dimensions in page-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
}

impl PageSize {
    /// US Letter in points.
    pub const LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
    };
}

/// Source of positioned text, one page at a time.
///
/// Pages are indexed from zero. Implementations may compute each page lazily;
/// chunkers visit pages in ascending order and never revisit one.
pub trait DocumentSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Dimensions of `page`.
    fn page_size(&self, page: usize) -> Result<PageSize>;

    /// Structural blocks of `page`, in reading order.
    fn blocks(&self, page: usize) -> Result<Cow<'_, [Block]>>;

    /// Words of `page`, in reading order.
    fn words(&self, page: usize) -> Result<Cow<'_, [Word]>>;
}

/// Opens a file into a [`DocumentSource`].
pub trait DocumentLoader {
    /// Open the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the file cannot be parsed.
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentSource>>;
}

/// A fully extracted page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page dimensions.
    pub size: PageSize,
    /// Structural blocks.
    pub blocks: Vec<Block>,
    /// Word list.
    pub words: Vec<Word>,
}

impl Page {
    /// Create a page and derive its word list from the block spans.
    ///
    /// Word rectangles are interpolated across the span width in proportion
    /// to grapheme count, which is exact for monospaced layouts and close
    /// enough for proportional fonts. Use [`Page::with_words`] when exact
    /// word boxes are known.
    #[must_use]
    pub fn new(size: PageSize, blocks: Vec<Block>) -> Self {
        let words = derive_words(&blocks);
        Self {
            size,
            blocks,
            words,
        }
    }

    /// Create a page with an explicit word list.
    #[must_use]
    pub fn with_words(size: PageSize, blocks: Vec<Block>, words: Vec<Word>) -> Self {
        Self {
            size,
            blocks,
            words,
        }
    }
}

/// An owned, in-memory document.
///
/// ## Example
///
/// ```rust
/// use pdfchunk::{Document, DocumentSource};
///
/// let doc = Document::from_plain_text(&["Title\n\nFirst line of text.\nSecond line."]);
/// assert_eq!(doc.page_count(), 1);
/// assert_eq!(doc.blocks(0).unwrap().len(), 2);
/// assert_eq!(doc.words(0).unwrap().len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pages: Vec<Page>,
}

const MARGIN: f32 = 72.0;
const GLYPH_WIDTH: f32 = 6.0;
const GLYPH_HEIGHT: f32 = 12.0;
const LEADING: f32 = 14.0;

impl Document {
    /// Create a document from extracted pages.
    #[must_use]
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Lay out plain text, one string per page.
    ///
    /// Blank lines separate blocks; every other line becomes one line with a
    /// single span. Geometry is synthetic: a US Letter page, one-inch
    /// margins, fixed-width glyphs.
    #[must_use]
    pub fn from_plain_text(pages: &[&str]) -> Self {
        Self::new(pages.iter().map(|text| layout_page(text)).collect())
    }

    /// The extracted pages.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn page(&self, index: usize) -> Result<&Page> {
        self.pages.get(index).ok_or_else(|| {
            Error::Document(format!(
                "page {index} out of range (document has {} pages)",
                self.pages.len()
            ))
        })
    }
}

impl DocumentSource for Document {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        Ok(self.page(page)?.size)
    }

    fn blocks(&self, page: usize) -> Result<Cow<'_, [Block]>> {
        Ok(Cow::Borrowed(&self.page(page)?.blocks))
    }

    fn words(&self, page: usize) -> Result<Cow<'_, [Word]>> {
        Ok(Cow::Borrowed(&self.page(page)?.words))
    }
}

/// Loads UTF-8 text files, using form feeds (`\x0C`) as page breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextLoader;

impl DocumentLoader for PlainTextLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentSource>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Document(format!("{}: {e}", path.display())))?;
        let pages: Vec<&str> = text.split('\u{000C}').collect();
        Ok(Box::new(Document::from_plain_text(&pages)))
    }
}

fn layout_page(text: &str) -> Page {
    let mut blocks = Vec::new();
    let mut lines = Vec::new();
    let mut y = MARGIN;

    for raw in text.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if !lines.is_empty() {
                blocks.push(Block::text(std::mem::take(&mut lines)));
                y += LEADING;
            }
            continue;
        }

        let width = trimmed.graphemes(true).count() as f32 * GLYPH_WIDTH;
        let rect = Rect::new(MARGIN, y, MARGIN + width, y + GLYPH_HEIGHT);
        lines.push(Line {
            spans: vec![Span::new(trimmed, rect)],
        });
        y += LEADING;
    }

    if !lines.is_empty() {
        blocks.push(Block::text(lines));
    }

    Page::new(PageSize::LETTER, blocks)
}

fn derive_words(blocks: &[Block]) -> Vec<Word> {
    let mut words = Vec::new();

    for (block_idx, block) in blocks.iter().enumerate() {
        for (line_idx, line) in block.lines.iter().enumerate() {
            let mut word_idx = 0;
            for span in &line.spans {
                for (text, rect) in split_span(span) {
                    words.push(Word {
                        text,
                        rect,
                        block: block_idx,
                        line: line_idx,
                        word: word_idx,
                    });
                    word_idx += 1;
                }
            }
        }
    }

    words
}

/// Split a span into whitespace-delimited words with interpolated boxes.
fn split_span(span: &Span) -> Vec<(String, Rect)> {
    let graphemes: Vec<&str> = span.text.graphemes(true).collect();
    if graphemes.is_empty() {
        return Vec::new();
    }

    let step = span.rect.width() / graphemes.len() as f32;
    let mut out = Vec::new();
    let mut start: Option<usize> = None;

    // Sentinel whitespace closes a trailing word.
    for (i, g) in graphemes.iter().copied().chain(std::iter::once(" ")).enumerate() {
        let is_space = g.chars().all(char::is_whitespace);
        match (start, is_space) {
            (None, false) => start = Some(i),
            (Some(s), true) => {
                let rect = Rect::new(
                    span.rect.x0 + s as f32 * step,
                    span.rect.y0,
                    span.rect.x0 + i as f32 * step,
                    span.rect.y1,
                );
                out.push((graphemes[s..i].concat(), rect));
                start = None;
            }
            _ => {}
        }
    }

    out
}
