use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use serde_json::{json, Value};

use crate::core::{level_path, Level, PipelineError, Result};
use crate::utils::textio::{read_lines, write_lines};

pub const SRC_UNIFIED: &str = "src.unified";
pub const TGT_UNIFIED: &str = "tgt.unified";
pub const PRED_UNIFIED: &str = "pred.unified";
pub const SRC_TGT_PRED_UNIFIED: &str = "src_tgt_pred.unified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEntry {
    pub tgt: String,
    pub pred: String,
}

/// Per-source-sentence aggregation of target/prediction pairs across levels.
/// Repeated (source, level) occurrences overwrite the earlier entry; entries
/// for other levels of the same source are preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedRecord {
    pub src: String,
    pub levels: BTreeMap<Level, LevelEntry>,
}

/// The merged cross-level view: three concatenated corpora (never
/// deduplicated) plus the keyed records ranked by descending level-count.
#[derive(Debug)]
pub struct UnifiedCorpora {
    pub src: Vec<String>,
    pub tgt: Vec<String>,
    pub pred: Vec<String>,
    pub records: Vec<UnifiedRecord>,
}

impl UnifiedCorpora {
    /// Nested keyed document: source sentence -> level -> {target,
    /// prediction}, in ranked record order.
    pub fn to_document(&self) -> Value {
        let mut root = serde_json::Map::new();
        for record in &self.records {
            let mut by_level = serde_json::Map::new();
            for (level, entry) in &record.levels {
                by_level.insert(
                    level.to_string(),
                    json!({ "target": entry.tgt, "prediction": entry.pred }),
                );
            }
            root.insert(record.src.clone(), Value::Object(by_level));
        }
        Value::Object(root)
    }

    /// Write the three text artifacts and the keyed document into `dir`.
    pub fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        write_lines(dir.join(SRC_UNIFIED), &self.src)?;
        write_lines(dir.join(TGT_UNIFIED), &self.tgt)?;
        write_lines(dir.join(PRED_UNIFIED), &self.pred)?;

        let doc_path = dir.join(SRC_TGT_PRED_UNIFIED);
        let doc = serde_json::to_string_pretty(&self.to_document())?;
        std::fs::write(&doc_path, doc)
            .with_context(|| format!("writing {}", doc_path.display()))?;

        tracing::info!(
            "unified {} sentences over {} records into {}",
            self.src.len(),
            self.records.len(),
            dir.display()
        );
        Ok(())
    }
}

/// Merge per-level (src, tgt, pred) triples, iterating levels in the given
/// order. Sources simplified at more levels rank first in the records; ties
/// keep their first-seen order.
pub fn unify(
    levels: &[Level],
    src_base: &Path,
    tgt_base: &Path,
    pred_base: &Path,
) -> Result<UnifiedCorpora> {
    let mut src_unified = Vec::new();
    let mut tgt_unified = Vec::new();
    let mut pred_unified = Vec::new();
    let mut records: Vec<UnifiedRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for &level in levels {
        let src_lines = read_lines(level_path(src_base, level))?;
        let tgt_lines = read_lines(level_path(tgt_base, level))?;
        let pred_lines = read_lines(level_path(pred_base, level))?;
        for (name, lines) in [("target", &tgt_lines), ("prediction", &pred_lines)] {
            if lines.len() != src_lines.len() {
                tracing::error!("level {} {} stream is misaligned", level, name);
                return Err(PipelineError::MisalignedCorpus {
                    level,
                    left: src_lines.len(),
                    right: lines.len(),
                }
                .into());
            }
        }

        for ((src, tgt), pred) in src_lines.iter().zip(&tgt_lines).zip(&pred_lines) {
            let slot = *index.entry(src.clone()).or_insert_with(|| {
                records.push(UnifiedRecord {
                    src: src.clone(),
                    levels: BTreeMap::new(),
                });
                records.len() - 1
            });
            // last write wins at (source, level) granularity
            records[slot].levels.insert(
                level,
                LevelEntry {
                    tgt: tgt.clone(),
                    pred: pred.clone(),
                },
            );
        }

        src_unified.extend(src_lines);
        tgt_unified.extend(tgt_lines);
        pred_unified.extend(pred_lines);
    }

    records.sort_by(|a, b| b.levels.len().cmp(&a.levels.len()));

    Ok(UnifiedCorpora {
        src: src_unified,
        tgt: tgt_unified,
        pred: pred_unified,
        records,
    })
}
