//! Chunk a PDF and print the viewer response.
//!
//! ```bash
//! cargo run --example chunk_pdf --features pdf -- paper.pdf "Sentence Chunker"
//! RUST_LOG=pdfchunk=debug cargo run --example chunk_pdf --features pdf,semantic -- paper.pdf
//! ```
//!
//! Needs a pdfium library in the working directory or on the system path.

use std::path::PathBuf;

use pdfchunk::{ChunkerConfig, PdfiumLoader, Registry};
use tracing_subscriber::EnvFilter;

fn main() -> pdfchunk::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdfchunk=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: chunk_pdf <file.pdf> [algorithm]");
        std::process::exit(2);
    };

    let config = match std::env::var("PDFCHUNK_CONFIG") {
        Ok(json) => ChunkerConfig::from_json(&json)?,
        Err(_) => ChunkerConfig::default(),
    };
    let registry = Registry::new(&config)?;

    let Some(algorithm) = args.next() else {
        for info in registry.list_algorithms() {
            println!("{:<32} {}", info.name, info.description);
        }
        return Ok(());
    };

    let loader = PdfiumLoader::new()?;
    let response = registry.process_json(&path, &algorithm, &loader);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
