//! PDF loading through pdfium.
//!
//! pdfium exposes text as a flat list of segments (runs sharing a baseline
//! and font) plus per-character boxes. We rebuild the block/line/span
//! structure from geometry:
//!
//! - a segment becomes a span;
//! - consecutive segments whose vertical centres fall inside the current
//!   line's band share a line;
//! - a gap below the previous line larger than one line height, or a jump
//!   back up the page (a new column), starts a new block.
//!
//! Words are rebuilt from character boxes within each segment, split on
//! whitespace. pdfium's origin is bottom-left; everything here is flipped to
//! top-left so boxes line up with rendered page images.

use std::path::Path;

use pdfium_render::prelude::*;

use crate::document::{Block, Line, Page, PageSize, Rect, Span, Word};
use crate::{Document, DocumentLoader, DocumentSource, Error, Result};

/// Loads PDFs with pdfium.
///
/// Binds `./libpdfium` first and falls back to the system library.
pub struct PdfiumLoader {
    pdfium: Pdfium,
}

impl PdfiumLoader {
    /// Bind the pdfium library.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if no pdfium library can be bound.
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Error::Document(format!("failed to bind pdfium library: {e}")))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Extract every page of the PDF at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if the file cannot be parsed.
    pub fn load(&self, path: &Path) -> Result<Document> {
        let pdf = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| Error::Document(format!("failed to load {}: {e}", path.display())))?;

        let mut pages = Vec::new();
        for (index, page) in pdf.pages().iter().enumerate() {
            tracing::debug!(page = index, "extracting page text");
            pages.push(extract_page(&page)?);
        }
        Ok(Document::new(pages))
    }
}

impl DocumentLoader for PdfiumLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentSource>> {
        Ok(Box::new(self.load(path)?))
    }
}

impl std::fmt::Debug for PdfiumLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumLoader").finish_non_exhaustive()
    }
}

fn flip(bounds: &PdfRect, page_height: f32) -> Rect {
    Rect::new(
        bounds.left().value,
        page_height - bounds.top().value,
        bounds.right().value,
        page_height - bounds.bottom().value,
    )
}

fn extract_page(page: &PdfPage) -> Result<Page> {
    let size = PageSize {
        width: page.width().value,
        height: page.height().value,
    };
    let text = page
        .text()
        .map_err(|e| Error::Document(format!("failed to get page text: {e}")))?;

    let mut layout = Layout::default();
    for segment in text.segments().iter() {
        let rect = flip(&segment.bounds(), size.height);
        let (block, line) = layout.place(Span::new(segment.text(), rect));

        // Character boxes are best-effort: a segment without them still
        // contributes its span.
        if let Ok(chars) = segment.chars() {
            layout.push_words(
                chars.iter().filter_map(|ch| {
                    let c = ch.unicode_char()?;
                    let bounds = ch.loose_bounds().ok()?;
                    Some((c, flip(&bounds, size.height)))
                }),
                block,
                line,
            );
        }
    }

    let (blocks, words) = layout.finish();
    Ok(Page::with_words(size, blocks, words))
}

/// Incremental block/line builder.
#[derive(Default)]
struct Layout {
    blocks: Vec<Block>,
    lines: Vec<Line>,
    spans: Vec<Span>,
    band: Option<Rect>,
    words: Vec<Word>,
    word_in_line: usize,
}

impl Layout {
    /// Add a span, returning the (block, line) indices it landed in.
    fn place(&mut self, span: Span) -> (usize, usize) {
        let rect = span.rect;
        let centre = (rect.y0 + rect.y1) / 2.0;

        match self.band {
            Some(band) if centre >= band.y0 && centre <= band.y1 => {
                self.band = Some(Rect::new(
                    band.x0.min(rect.x0),
                    band.y0.min(rect.y0),
                    band.x1.max(rect.x1),
                    band.y1.max(rect.y1),
                ));
            }
            Some(band) => {
                self.close_line();
                let gap = rect.y0 - band.y1;
                if gap > band.height().max(rect.height()) || rect.y1 < band.y0 {
                    self.close_block();
                }
                self.band = Some(rect);
            }
            None => self.band = Some(rect),
        }

        self.spans.push(span);
        (self.blocks.len(), self.lines.len())
    }

    fn push_words(
        &mut self,
        chars: impl Iterator<Item = (char, Rect)>,
        block: usize,
        line: usize,
    ) {
        let mut text = String::new();
        let mut rect: Option<Rect> = None;

        for (c, bounds) in chars.chain(std::iter::once((' ', Rect::default()))) {
            if c.is_whitespace() {
                if let Some(r) = rect.take() {
                    self.words.push(Word {
                        text: std::mem::take(&mut text),
                        rect: r,
                        block,
                        line,
                        word: self.word_in_line,
                    });
                    self.word_in_line += 1;
                }
                continue;
            }

            text.push(c);
            rect = Some(match rect {
                Some(r) => Rect::new(
                    r.x0.min(bounds.x0),
                    r.y0.min(bounds.y0),
                    r.x1.max(bounds.x1),
                    r.y1.max(bounds.y1),
                ),
                None => bounds,
            });
        }
    }

    fn close_line(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line {
                spans: std::mem::take(&mut self.spans),
            });
        }
        self.word_in_line = 0;
    }

    fn close_block(&mut self) {
        self.close_line();
        if !self.lines.is_empty() {
            self.blocks
                .push(Block::text(std::mem::take(&mut self.lines)));
        }
    }

    fn finish(mut self) -> (Vec<Block>, Vec<Word>) {
        self.close_block();
        (self.blocks, self.words)
    }
}
