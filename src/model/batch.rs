use crate::core::{Level, PipelineError};
use crate::data::Example;

/// A batch of examples fed through one forward pass. Batches must be
/// monomorphic in level; `level()` enforces this before any dispatch.
#[derive(Debug, Clone)]
pub struct Batch {
    pub examples: Vec<Example>,
}

impl Batch {
    pub fn new(examples: Vec<Example>) -> Self {
        Self { examples }
    }

    /// Inference-side batch: sources only, empty targets.
    pub fn from_sources<S: AsRef<str>>(sources: &[S], level: Level) -> Self {
        Self {
            examples: sources
                .iter()
                .map(|src| Example {
                    src: src.as_ref().to_string(),
                    tgt: String::new(),
                    level,
                })
                .collect(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.examples.len()
    }

    pub fn sources(&self) -> Vec<String> {
        self.examples.iter().map(|ex| ex.src.clone()).collect()
    }

    pub fn targets(&self) -> Vec<String> {
        self.examples.iter().map(|ex| ex.tgt.clone()).collect()
    }

    /// The single level shared by every example in the batch. A batch that
    /// is empty or mixes levels fails with `MixedLevelBatch`.
    pub fn level(&self) -> Result<Level, PipelineError> {
        let mut distinct: Vec<Level> = Vec::new();
        for example in &self.examples {
            if !distinct.contains(&example.level) {
                distinct.push(example.level);
            }
        }
        match distinct.as_slice() {
            [level] => Ok(*level),
            _ => Err(PipelineError::MixedLevelBatch(distinct)),
        }
    }
}
