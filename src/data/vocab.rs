use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::data::reader::{strip_features, tokens};
use crate::data::Shard;

#[derive(Debug, Clone)]
pub struct VocabOptions {
    pub share_vocab: bool,
    pub min_frequency: usize,
    pub max_size: usize,
}

impl Default for VocabOptions {
    fn default() -> Self {
        Self {
            share_vocab: false,
            min_frequency: 0,
            max_size: 50_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocab {
    pub tokens: Vec<String>,
}

impl Vocab {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

/// Source and target vocabularies built from train shards. With
/// `share_vocab` both sides refer to one merged token list.
#[derive(Debug, Serialize, Deserialize)]
pub struct Fields {
    pub src: Vocab,
    pub tgt: Vocab,
}

impl Fields {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("creating vocab {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("serializing vocab {}", path.display()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Fields> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("opening vocab {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing vocab {}", path.display()))
    }
}

/// Build vocabularies from train shard files, loading one shard at a time.
/// Token frequencies are counted on the feature-stripped surface forms.
pub fn build_vocab(shard_paths: &[PathBuf], options: &VocabOptions) -> Result<Fields> {
    let mut src_counts: HashMap<String, usize> = HashMap::new();
    let mut tgt_counts: HashMap<String, usize> = HashMap::new();

    for path in shard_paths {
        let shard = Shard::load(path)?;
        for example in &shard.examples {
            count_line(&example.src, &mut src_counts);
            count_line(&example.tgt, &mut tgt_counts);
        }
    }

    let fields = if options.share_vocab {
        for (token, count) in tgt_counts {
            *src_counts.entry(token).or_insert(0) += count;
        }
        let shared = into_vocab(src_counts, options);
        Fields {
            src: shared.clone(),
            tgt: shared,
        }
    } else {
        Fields {
            src: into_vocab(src_counts, options),
            tgt: into_vocab(tgt_counts, options),
        }
    };

    tracing::info!(
        "built vocabulary: {} source / {} target tokens",
        fields.src.len(),
        fields.tgt.len()
    );
    Ok(fields)
}

fn count_line(line: &str, counts: &mut HashMap<String, usize>) {
    for token in tokens(line) {
        *counts.entry(strip_features(token).to_string()).or_insert(0) += 1;
    }
}

fn into_vocab(counts: HashMap<String, usize>, options: &VocabOptions) -> Vocab {
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= options.min_frequency.max(1))
        .collect();
    // frequency descending, token ascending for a deterministic order
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(options.max_size);
    Vocab {
        tokens: entries.into_iter().map(|(token, _)| token).collect(),
    }
}
