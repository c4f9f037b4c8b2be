//! Basic Document Chunking
//!
//! The minimal example: run every registered strategy over a small
//! two-page document and print the chunks with their boxes.
//!
//! ```bash
//! cargo run --example 01_basic_chunking
//! ```

use pdfchunk::{ChunkerConfig, Document, EmbeddingBackend, Registry};

fn main() -> pdfchunk::Result<()> {
    let doc = Document::from_plain_text(&[
        "Machine learning models learn patterns from data.\n\
         They generalize these patterns to make predictions.\n\n\
         Deep learning extends this with multiple hidden layers.\n\
         Each layer learns increasingly abstract representations.",
        "Medieval castles were built for defence.\n\
         Stone walls protected them against siege engines.",
    ]);

    // Hashing embeddings keep the example offline.
    let config = ChunkerConfig {
        backend: EmbeddingBackend::Hashing { dimensions: 256 },
        num_topics: 2,
        ..ChunkerConfig::default()
    };
    let registry = Registry::new(&config)?;

    for algorithm in registry.list_algorithms() {
        let chunks = registry.run(&doc, &algorithm.name)?;
        println!("== {} ({} chunks)", algorithm.name, chunks.len());
        println!("   {}\n", algorithm.description);

        for chunk in chunks.iter().take(4) {
            let first = &chunk.bboxes[0];
            println!(
                "   page {} ({:.0}, {:.0}) +{} boxes: {:?}",
                first.page(),
                first.x0(),
                first.y0(),
                chunk.bboxes.len() - 1,
                chunk.text
            );
        }
        println!();
    }

    Ok(())
}
