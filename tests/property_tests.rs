//! Property-based tests for document chunking.
//!
//! These tests verify that chunking strategies maintain key invariants:
//! - Coverage: every word ends up in exactly one chunk
//! - Boxes: word chunks carry exactly one box each
//! - Determinism: identical input gives identical boundaries
//! - Percentile: split count tracks the computed threshold
//! - Topics: clusters partition the sentence units

use std::sync::Arc;

use proptest::prelude::*;
use pdfchunk::{
    cosine_distance, percentile, Chunk, Chunker, Document, Embedder, EmbeddingBackend,
    HashingEmbedder, PercentileChunker, SemanticChunker, SentenceChunker, SimilarityProvider,
    TopicChunker, WordChunker, TOPIC_SEPARATOR,
};

// =============================================================================
// Test Generators
// =============================================================================

/// A word, sometimes carrying sentence-terminal punctuation.
fn word() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,8}",
        prop_oneof![6 => Just(""), 2 => Just("."), 1 => Just("!"), 1 => Just("?")],
    )
        .prop_map(|(w, p)| format!("{w}{p}"))
}

fn line() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..6).prop_map(|words| words.join(" "))
}

fn block() -> impl Strategy<Value = String> {
    prop::collection::vec(line(), 1..4).prop_map(|lines| lines.join("\n"))
}

fn page() -> impl Strategy<Value = String> {
    prop::collection::vec(block(), 0..4).prop_map(|blocks| blocks.join("\n\n"))
}

/// Plain-text pages for `Document::from_plain_text`.
fn pages() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(page(), 0..3)
}

fn document(pages: &[String]) -> Document {
    let refs: Vec<&str> = pages.iter().map(String::as_str).collect();
    Document::from_plain_text(&refs)
}

fn all_words(pages: &[String]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.split_whitespace())
        .map(str::to_string)
        .collect()
}

fn hashing() -> Arc<SimilarityProvider> {
    Arc::new(SimilarityProvider::new(EmbeddingBackend::Hashing { dimensions: 32 }))
}

fn texts(chunks: &[Chunk]) -> Vec<String> {
    chunks.iter().map(|c| c.text.clone()).collect()
}

fn sentence_texts(doc: &Document) -> Vec<String> {
    texts(&SentenceChunker::new().chunk(doc).unwrap())
}

// =============================================================================
// Word and sentence coverage
// =============================================================================

proptest! {
    #[test]
    fn word_chunk_per_word(pages in pages()) {
        let doc = document(&pages);
        let chunks = WordChunker::new().chunk(&doc).unwrap();

        prop_assert_eq!(chunks.len(), all_words(&pages).len());
        for chunk in &chunks {
            prop_assert_eq!(chunk.bboxes.len(), 1);
        }
        prop_assert_eq!(texts(&chunks), all_words(&pages));
    }

    #[test]
    fn sentence_units_reproduce_words(pages in pages()) {
        let doc = document(&pages);
        let sentences = sentence_texts(&doc);

        for s in &sentences {
            prop_assert!(!s.trim().is_empty());
        }
        let rejoined = sentences.join(" ");
        let words: Vec<&str> = rejoined.split_whitespace().collect();
        prop_assert_eq!(words, all_words(&pages));
    }

    #[test]
    fn sentence_boxes_follow_reading_order(pages in pages()) {
        let doc = document(&pages);
        let chunks = SentenceChunker::new().chunk(&doc).unwrap();

        let boxes: Vec<(usize, f32)> = chunks
            .iter()
            .flat_map(|c| c.bboxes.iter().map(|b| (b.page(), b.y0())))
            .collect();
        for pair in boxes.windows(2) {
            prop_assert!(pair[0] <= pair[1], "out of order: {:?}", pair);
        }
    }
}

// =============================================================================
// Semantic chunkers
// =============================================================================

proptest! {
    #[test]
    fn semantic_is_deterministic(pages in pages(), threshold in -1.0f32..1.0) {
        let doc = document(&pages);
        let chunker = SemanticChunker::new(hashing()).with_threshold(threshold);

        let first = texts(&chunker.chunk(&doc).unwrap());
        let second = texts(&chunker.chunk(&doc).unwrap());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn semantic_preserves_sentences(pages in pages(), threshold in -1.0f32..1.0) {
        let doc = document(&pages);
        let chunks = SemanticChunker::new(hashing())
            .with_threshold(threshold)
            .chunk(&doc)
            .unwrap();

        prop_assert_eq!(texts(&chunks).join(" "), sentence_texts(&doc).join(" "));
        for chunk in &chunks {
            prop_assert!(!chunk.bboxes.is_empty());
        }
    }

    #[test]
    fn percentile_splits_match_threshold(pages in pages(), p in 0.0f32..=100.0, window in 0usize..3) {
        let doc = document(&pages);
        let sentences = sentence_texts(&doc);
        let chunks = PercentileChunker::new(hashing())
            .with_percentile(p)
            .unwrap()
            .with_window_size(window)
            .chunk(&doc)
            .unwrap();

        if sentences.len() < 2 {
            prop_assert_eq!(chunks.len(), sentences.len().min(1));
            return Ok(());
        }

        let n = sentences.len();
        let windows: Vec<String> = (0..n)
            .map(|i| {
                let start = i.saturating_sub(window);
                let end = (i + window + 1).min(n);
                sentences[start..end].join(" ")
            })
            .collect();
        let embeddings = HashingEmbedder::new(32).unwrap().embed(&windows).unwrap();
        let distances: Vec<f32> = embeddings
            .windows(2)
            .map(|pair| cosine_distance(&pair[0], &pair[1]))
            .collect();
        let threshold = percentile(&distances, p).unwrap();
        let expected_splits = distances.iter().filter(|&&d| d > threshold).count();

        prop_assert_eq!(chunks.len(), expected_splits + 1);
        prop_assert_eq!(texts(&chunks).join(" "), sentences.join(" "));
    }

    #[test]
    fn percentile_monotonic(pages in pages(), low in 0.0f32..=100.0, high in 0.0f32..=100.0) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let doc = document(&pages);
        let provider = hashing();

        let count = |p: f32| {
            PercentileChunker::new(Arc::clone(&provider))
                .with_percentile(p)
                .unwrap()
                .chunk(&doc)
                .unwrap()
                .len()
        };
        prop_assert!(count(high) <= count(low));
    }
}

// =============================================================================
// Topic chunker
// =============================================================================

/// Strip the topic label and split a topic chunk back into sentences.
fn topic_members(chunk: &Chunk) -> Vec<String> {
    let body = chunk
        .text
        .split_once(":\n")
        .map_or(chunk.text.as_str(), |(_, body)| body);
    body.split(TOPIC_SEPARATOR).map(str::to_string).collect()
}

proptest! {
    #[test]
    fn topics_partition_sentences(pages in pages(), k in 1usize..5) {
        let doc = document(&pages);
        let mut sentences = sentence_texts(&doc);
        let chunks = TopicChunker::new(hashing(), k)
            .unwrap()
            .with_n_init(2)
            .chunk(&doc)
            .unwrap();

        if sentences.is_empty() {
            prop_assert!(chunks.is_empty());
            return Ok(());
        }
        if sentences.len() < k {
            prop_assert_eq!(chunks.len(), 1);
            prop_assert_eq!(chunks[0].metadata["fallback"].as_bool(), Some(true));
            return Ok(());
        }

        prop_assert!(chunks.len() <= k);
        let mut members: Vec<String> = chunks.iter().flat_map(topic_members).collect();
        members.sort();
        sentences.sort();
        prop_assert_eq!(members, sentences);
    }
}
