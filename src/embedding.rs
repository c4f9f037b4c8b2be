//! fastembed-backed [`Embedder`].

use fastembed::{InitOptions, TextEmbedding};

use crate::similarity::Embedder;
use crate::{Error, Result};

/// A fastembed ONNX model.
pub struct FastEmbedder {
    model: TextEmbedding,
    name: String,
    dimensions: usize,
}

impl FastEmbedder {
    /// Load a model by name.
    ///
    /// Accepts the short sentence-transformers names (`all-MiniLM-L6-v2`,
    /// `bge-small-en-v1.5`, ...) as well as the full Hugging Face ids fastembed
    /// reports.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] if the name is unknown or the model fails
    /// to load.
    pub fn load(name: &str) -> Result<Self> {
        let info = TextEmbedding::list_supported_models()
            .into_iter()
            .find(|info| {
                info.model_code == name
                    || info
                        .model_code
                        .rsplit('/')
                        .next()
                        .map(|short| short.trim_end_matches("-onnx"))
                        .is_some_and(|short| short.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| Error::embedding("load model", format!("unknown model '{name}'")))?;

        let model = TextEmbedding::try_new(InitOptions::new(info.model.clone()))
            .map_err(|e| Error::embedding("load model", e))?;

        Ok(Self {
            model,
            name: name.to_string(),
            dimensions: info.dim,
        })
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::embedding("embed", e))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model", &self.name)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}
