use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{level_path, prefixed, Level, PipelineError, Result, TRAIN_PREFIX, VALID_PREFIX};
use crate::data::reader::{text_sort_key, FilterPolicy};
use crate::utils::textio::read_lines;

/// One aligned sentence pair, annotated with the level of the shard it was
/// built from. Immutable once the shard is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub src: String,
    pub tgt: String,
    pub level: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusType {
    Train,
    Valid,
}

impl CorpusType {
    pub fn prefix(self) -> &'static str {
        match self {
            CorpusType::Train => TRAIN_PREFIX,
            CorpusType::Valid => VALID_PREFIX,
        }
    }
}

impl fmt::Display for CorpusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusType::Train => write!(f, "train"),
            CorpusType::Valid => write!(f, "valid"),
        }
    }
}

/// A filtered, sorted collection of examples for one (corpus-type, level)
/// pair. Shards are persisted independently and never merged at storage time.
#[derive(Debug, Serialize, Deserialize)]
pub struct Shard {
    pub corpus_type: CorpusType,
    pub level: Level,
    pub examples: Vec<Example>,
}

impl Shard {
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("creating shard {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("serializing shard {}", path.display()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Shard> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("opening shard {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing shard {}", path.display()))
    }
}

/// Builds one shard per level from the post-split corpus files, one level at
/// a time. The examples for a level are dropped before the next level is
/// read, so peak memory stays bounded to a single shard.
pub struct LevelShardBuilder {
    src_base: PathBuf,
    tgt_base: PathBuf,
    save_data: PathBuf,
    filter: FilterPolicy,
    filter_valid: bool,
}

impl LevelShardBuilder {
    pub fn new<P: Into<PathBuf>>(
        src_base: P,
        tgt_base: P,
        save_data: P,
        filter: FilterPolicy,
        filter_valid: bool,
    ) -> Self {
        Self {
            src_base: src_base.into(),
            tgt_base: tgt_base.into(),
            save_data: save_data.into(),
            filter,
            filter_valid,
        }
    }

    pub fn shard_path(&self, corpus_type: CorpusType, level: Level) -> PathBuf {
        let mut path = self.save_data.as_os_str().to_os_string();
        path.push(format!(".{}.{}.json", corpus_type, level));
        PathBuf::from(path)
    }

    /// Build and persist one shard per level, returning the shard paths in
    /// level order. An empty corpus file for a level is an error, never a
    /// silently-skipped level.
    pub fn build_all(&self, corpus_type: CorpusType, levels: &[Level]) -> Result<Vec<PathBuf>> {
        let src_base = prefixed(&self.src_base, corpus_type.prefix());
        let tgt_base = prefixed(&self.tgt_base, corpus_type.prefix());

        let mut shard_paths = Vec::with_capacity(levels.len());
        for &level in levels {
            let src_path = level_path(&src_base, level);
            let tgt_path = level_path(&tgt_base, level);
            tracing::info!(
                "reading source and target files {} {} of level {}",
                src_path.display(),
                tgt_path.display(),
                level
            );

            let shard = self.build_one(corpus_type, level, &src_path, &tgt_path)?;
            let out_path = self.shard_path(corpus_type, level);
            tracing::info!(
                "saving level {} {} shard ({} examples) to {}",
                level,
                corpus_type,
                shard.len(),
                out_path.display()
            );
            shard.save(&out_path)?;
            shard_paths.push(out_path);
            // shard (and its example vector) is dropped here, before the
            // next level's lines are read
        }
        Ok(shard_paths)
    }

    fn build_one(
        &self,
        corpus_type: CorpusType,
        level: Level,
        src_path: &Path,
        tgt_path: &Path,
    ) -> Result<Shard> {
        let src_lines = read_lines(src_path)?;
        let tgt_lines = read_lines(tgt_path)?;
        if src_lines.is_empty() {
            return Err(PipelineError::EmptyCorpus(src_path.to_path_buf()).into());
        }
        if tgt_lines.is_empty() {
            return Err(PipelineError::EmptyCorpus(tgt_path.to_path_buf()).into());
        }
        if src_lines.len() != tgt_lines.len() {
            return Err(PipelineError::MisalignedCorpus {
                level,
                left: src_lines.len(),
                right: tgt_lines.len(),
            }
            .into());
        }

        let mut examples: Vec<Example> = src_lines
            .into_iter()
            .zip(tgt_lines)
            .map(|(src, tgt)| Example { src, tgt, level })
            .collect();

        if corpus_type == CorpusType::Train || self.filter_valid {
            examples.retain(|ex| self.filter.keep(ex));
        }
        examples.sort_by_key(text_sort_key);

        Ok(Shard {
            corpus_type,
            level,
            examples,
        })
    }
}
