//! Merging a run of sentence units into one chunk.

use serde_json::Value;

use crate::extract::SentenceUnit;
use crate::{BoundingBox, Chunk, Metadata};

/// Separator between sentences of one contiguous run.
pub(crate) const SPACE: &str = " ";

/// Concatenated text and unioned boxes of a group of sentence units.
#[derive(Debug, Default)]
pub(crate) struct Assembled {
    pub(crate) text: String,
    pub(crate) bboxes: Vec<BoundingBox>,
    pub(crate) sentence_count: usize,
}

impl Assembled {
    /// Join `members` with `separator`, keeping their boxes in member order.
    pub(crate) fn join<'a, I>(members: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = &'a SentenceUnit>,
    {
        let mut out = Self::default();
        for unit in members {
            if out.sentence_count > 0 {
                out.text.push_str(separator);
            }
            out.text.push_str(&unit.text);
            out.bboxes.extend_from_slice(&unit.bboxes);
            out.sentence_count += 1;
        }
        out
    }

    /// Finish as a chunk, recording `sentence_count` next to `metadata`.
    pub(crate) fn into_chunk(self, mut metadata: Metadata) -> Chunk {
        metadata.insert(
            "sentence_count".to_string(),
            Value::from(self.sentence_count),
        );
        Chunk::new(self.text, self.bboxes, metadata)
    }
}

/// Assemble the contiguous run `units[range]` into a chunk.
pub(crate) fn assemble_run(units: &[SentenceUnit], range: std::ops::Range<usize>) -> Chunk {
    Assembled::join(&units[range], SPACE).into_chunk(Metadata::new())
}

/// Assemble the units at `indices` into a chunk.
pub(crate) fn assemble_indices(units: &[SentenceUnit], indices: &[usize]) -> Chunk {
    Assembled::join(indices.iter().map(|&i| &units[i]), SPACE).into_chunk(Metadata::new())
}
