use std::path::PathBuf;

use crate::core::{level_path, prefixed, Level, PipelineError, Result, TRAIN_PREFIX, VALID_PREFIX};
use crate::utils::textio::{read_lines, write_lines};

/// Splits each level's aligned src/tgt corpus into train and valid partitions
/// by a fixed fraction. The split is positional (no shuffling), so running it
/// twice on the same inputs produces byte-identical partitions.
pub struct CorpusSplitter {
    src_base: PathBuf,
    tgt_base: PathBuf,
    train_fraction: f64,
}

impl CorpusSplitter {
    pub fn new<P: Into<PathBuf>>(src_base: P, tgt_base: P, train_fraction: f64) -> Self {
        Self {
            src_base: src_base.into(),
            tgt_base: tgt_base.into(),
            train_fraction,
        }
    }

    /// Write `train.`/`valid.`-prefixed partitions for every level. Lines
    /// `[0, k)` with `k = floor(fraction * N)` go to train, `[k, N)` to valid.
    pub fn split(&self, levels: &[Level]) -> Result<()> {
        for &level in levels {
            let src_path = level_path(&self.src_base, level);
            let tgt_path = level_path(&self.tgt_base, level);

            let src_lines = read_lines(&src_path)?;
            let tgt_lines = read_lines(&tgt_path)?;
            if src_lines.len() != tgt_lines.len() {
                return Err(PipelineError::MisalignedCorpus {
                    level,
                    left: src_lines.len(),
                    right: tgt_lines.len(),
                }
                .into());
            }

            let total_lines = tgt_lines.len();
            let train_size = (self.train_fraction * src_lines.len() as f64) as usize;
            for (side_path, lines) in [(src_path, src_lines), (tgt_path, tgt_lines)] {
                write_lines(prefixed(&side_path, TRAIN_PREFIX), &lines[..train_size])?;
                write_lines(prefixed(&side_path, VALID_PREFIX), &lines[train_size..])?;
            }

            tracing::info!(
                "split level {}: {} train / {} valid lines",
                level,
                train_size,
                total_lines - train_size
            );
        }
        Ok(())
    }
}
