use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::core::{level_path, Level, Result};
use crate::utils::textio::{read_lines, write_lines};

/// Target grade levels present in the Newsela release.
pub const NEWSELA_LEVELS: std::ops::RangeInclusive<u32> = 2..=11;

#[derive(Debug, Deserialize)]
struct NewselaSubject {
    articles: Vec<NewselaArticle>,
}

#[derive(Debug, Deserialize)]
struct NewselaArticle {
    grade_level: GradeLevel,
}

/// The corpus stores grade levels as strings in some releases and numbers in
/// others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GradeLevel {
    Num(i64),
    Text(String),
}

impl GradeLevel {
    fn value(&self) -> Result<u32> {
        match self {
            GradeLevel::Num(n) => Ok(*n as u32),
            GradeLevel::Text(s) => s
                .trim()
                .parse()
                .with_context(|| format!("parsing grade level {:?}", s)),
        }
    }
}

/// Builds per-level `src.L`/`tgt.L` pairs from the Newsela article-versions
/// JSON and the tab-separated aligned-sentence file. Each sentence pair is
/// bucketed by its *target* grade level.
pub struct NewselaExtractor {
    pub versions_json: PathBuf,
    pub aligned_sents: PathBuf,
    pub out_dir: PathBuf,
}

impl NewselaExtractor {
    /// Returns the number of sentence pairs written per target grade level.
    pub fn extract(&self) -> Result<BTreeMap<Level, usize>> {
        let doc_grade_levels = self.load_grade_levels()?;
        let entries = read_lines(&self.aligned_sents)?;

        let mut sides: BTreeMap<Level, (Vec<String>, Vec<String>)> = NEWSELA_LEVELS
            .map(|l| (Level(l), (Vec::new(), Vec::new())))
            .collect();

        for (line_no, raw) in entries.iter().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = raw.split('\t').collect();
            if fields.len() < 5 {
                bail!(
                    "{}:{}: expected 5 tab-separated fields, got {}",
                    self.aligned_sents.display(),
                    line_no + 1,
                    fields.len()
                );
            }

            let doc = version_digit(fields[0])?
                .checked_sub(1)
                .with_context(|| format!("document label {:?} is not 1-based", fields[0]))?;
            let src_version = version_digit(fields[1])?;
            let tgt_version = version_digit(fields[2])?;
            let grades = doc_grade_levels
                .get(doc)
                .with_context(|| format!("no grade levels for document {}", doc))?;
            if grades.get(src_version).is_none() {
                bail!("document {} has no version {}", doc, src_version);
            }
            let tgt_grade = *grades
                .get(tgt_version)
                .with_context(|| format!("document {} has no version {}", doc, tgt_version))?;

            // only the target grade selects the bucket
            let level = Level(tgt_grade);
            let (src_sents, tgt_sents) = sides
                .get_mut(&level)
                .with_context(|| format!("grade level {} outside the Newsela range", level))?;
            src_sents.push(fields[3].trim().to_string());
            tgt_sents.push(fields[4].trim().to_string());
        }

        let mut counts = BTreeMap::new();
        for (level, (src_sents, tgt_sents)) in &sides {
            write_lines(level_path(self.out_dir.join("src."), *level), src_sents)?;
            write_lines(level_path(self.out_dir.join("tgt."), *level), tgt_sents)?;
            counts.insert(*level, src_sents.len());
        }
        tracing::info!("sentences per target grade level: {:?}", counts);
        Ok(counts)
    }

    /// Per-document grade-level lists, sorted descending so version indices
    /// map from the original article down to the simplest rewrite.
    fn load_grade_levels(&self) -> Result<Vec<Vec<u32>>> {
        let file = File::open(&self.versions_json)
            .with_context(|| format!("opening {}", self.versions_json.display()))?;
        let subjects: Vec<NewselaSubject> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", self.versions_json.display()))?;

        subjects
            .iter()
            .map(|subject| {
                let mut grades = subject
                    .articles
                    .iter()
                    .map(|article| article.grade_level.value())
                    .collect::<Result<Vec<u32>>>()?;
                grades.sort_unstable_by(|a, b| b.cmp(a));
                Ok(grades)
            })
            .collect()
    }
}

/// The trailing digit of a version label like `doc3.en.2`.
fn version_digit(label: &str) -> Result<usize> {
    label
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as usize)
        .with_context(|| format!("version label {:?} does not end in a digit", label))
}
