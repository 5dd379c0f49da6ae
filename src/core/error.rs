use std::path::PathBuf;

use thiserror::Error;

use crate::core::Level;

/// Fatal pipeline errors. No component retries; every one of these aborts the
/// enclosing run, leaving already-completed per-level outputs on disk.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("aligned corpus for level {level} has mismatched line counts: {left} vs {right}")]
    MisalignedCorpus {
        level: Level,
        left: usize,
        right: usize,
    },

    #[error("no decoder or shard registered for level {0}")]
    UnknownLevel(Level),

    #[error("batch mixes examples from levels {0:?}")]
    MixedLevelBatch(Vec<Level>),

    #[error("external scorer `{tool}` failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    #[error("empty or missing corpus file: {}", .0.display())]
    EmptyCorpus(PathBuf),
}
