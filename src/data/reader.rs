use std::path::Path;

use anyhow::Context;

use crate::core::Result;
use crate::data::Example;

/// Separator between a token and its attached features: `word￨feat1￨feat2`.
pub const FEATURE_SEP: char = '￨';

pub fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

/// The surface token, with any `￨`-delimited features stripped.
pub fn strip_features(token: &str) -> &str {
    token.split(FEATURE_SEP).next().unwrap_or(token)
}

pub fn token_count(line: &str) -> usize {
    tokens(line).count()
}

/// Number of features attached to the tokens of a corpus file, probed from
/// the first token of the first line. A bare token yields 0.
pub fn count_features<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("counting features in {}", path.display()))?;
    let first_tok = content
        .lines()
        .next()
        .and_then(|line| tokens(line).next())
        .unwrap_or_default();
    Ok(first_tok.split(FEATURE_SEP).count().saturating_sub(1))
}

/// Sort key for text shards: source length first, target length second.
/// Sorting by length keeps batches of similar size together.
pub fn text_sort_key(example: &Example) -> (usize, usize) {
    (token_count(&example.src), token_count(&example.tgt))
}

/// Length-based filtering policy. The source bound applies only for text
/// modalities (`use_src_len`); the target bound always applies.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    pub use_src_len: bool,
    pub max_src_len: usize,
    pub max_tgt_len: usize,
}

impl FilterPolicy {
    pub fn keep(&self, example: &Example) -> bool {
        let src_ok = !self.use_src_len || token_count(&example.src) <= self.max_src_len;
        src_ok && token_count(&example.tgt) <= self.max_tgt_len
    }
}
