//! Integration tests against a real fastembed model.
//!
//! These download `all-MiniLM-L6-v2` on first run, so they are ignored by
//! default: `cargo test --features semantic -- --ignored`.

#![cfg(feature = "semantic")]

use std::sync::Arc;

use pdfchunk::{
    Chunker, Document, EmbeddingBackend, SemanticChunker, SimilarityProvider, TopicChunker,
    DEFAULT_MODEL,
};

fn provider() -> Arc<SimilarityProvider> {
    Arc::new(SimilarityProvider::new(EmbeddingBackend::FastEmbed {
        model: DEFAULT_MODEL.to_string(),
    }))
}

fn two_topics() -> Document {
    Document::from_plain_text(&["Quantum computers use qubits instead of bits.\n\
         Superposition lets a qubit hold several states.\n\
         Entanglement links the states of distant qubits.\n\
         Medieval castles were built for defence.\n\
         Stone walls protected them against siege engines.\n\
         Moats made the walls harder to reach."])
}

#[test]
#[ignore] // Requires fastembed model download
fn model_loads_once() {
    let provider = provider();
    assert!(!provider.is_initialized());

    let embedder = provider.ensure_initialized().unwrap();
    assert_eq!(embedder.dimensions(), 384);
    assert!(provider.is_initialized());
}

#[test]
#[ignore] // Requires fastembed model download
fn related_sentences_are_closer() {
    let provider = provider();
    let texts = [
        "The cat sat on the mat.".to_string(),
        "A kitten rested on the rug.".to_string(),
        "Interest rates rose again this quarter.".to_string(),
    ];
    let embeddings = provider.embed(&texts, "test").unwrap();

    let related = provider.similarity(&embeddings[0], &embeddings[1]);
    let unrelated = provider.similarity(&embeddings[0], &embeddings[2]);
    assert!(related > unrelated, "{related} <= {unrelated}");
}

#[test]
#[ignore] // Requires fastembed model download
fn semantic_chunker_detects_topic_shift() {
    let chunks = SemanticChunker::new(provider())
        .with_threshold(0.3)
        .chunk(&two_topics())
        .unwrap();

    assert!(chunks.len() >= 2, "expected a split, got {}", chunks.len());
    assert!(chunks[0].text.starts_with("Quantum"));
}

#[test]
#[ignore] // Requires fastembed model download
fn topic_chunker_separates_subjects() {
    let chunks = TopicChunker::new(provider(), 2)
        .unwrap()
        .chunk(&two_topics())
        .unwrap();

    assert_eq!(chunks.len(), 2);
    let quantum = chunks.iter().find(|c| c.text.contains("Quantum")).unwrap();
    assert!(quantum.text.contains("Entanglement"));
    assert!(!quantum.text.contains("castles"));
}
