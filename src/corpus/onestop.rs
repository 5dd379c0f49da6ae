use std::path::PathBuf;

use crate::core::{level_path, Level, Result};
use crate::utils::textio::{read_lines, write_lines};

/// Builds per-level `src.L`/`tgt.L` pairs from OneStopEnglish alignment
/// files. Each file holds three-line groups: source sentence, target
/// sentence, separator.
pub struct OneStopExtractor {
    pub base_dir: PathBuf,
    pub sources: Vec<(Level, String)>,
}

impl OneStopExtractor {
    /// The two standard pairings: advanced→elementary and
    /// advanced→intermediate.
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            sources: vec![
                (Level(1), "ADV-ELE.txt".to_string()),
                (Level(2), "ADV-INT.txt".to_string()),
            ],
        }
    }

    pub fn extract(&self) -> Result<()> {
        for (level, file_name) in &self.sources {
            let lines = read_lines(self.base_dir.join(file_name))?;

            let mut src_sents = Vec::new();
            let mut tgt_sents = Vec::new();
            for group in lines.chunks(3) {
                if group.len() < 2 {
                    break;
                }
                src_sents.push(group[0].clone());
                tgt_sents.push(group[1].clone());
            }

            write_lines(level_path(self.base_dir.join("src."), *level), &src_sents)?;
            write_lines(level_path(self.base_dir.join("tgt."), *level), &tgt_sents)?;
            tracing::info!(
                "extracted {} pairs for level {} from {}",
                src_sents.len(),
                level,
                file_name
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_takes_first_two_lines_of_each_group() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ADV-ELE.txt"),
            "advanced one\nsimple one\n***\nadvanced two\nsimple two\n***\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ADV-INT.txt"),
            "advanced one\nmedium one\n***\n",
        )
        .unwrap();

        OneStopExtractor::new(dir.path()).extract().unwrap();

        assert_eq!(
            read_lines(dir.path().join("src.1")).unwrap(),
            ["advanced one", "advanced two"]
        );
        assert_eq!(
            read_lines(dir.path().join("tgt.1")).unwrap(),
            ["simple one", "simple two"]
        );
        assert_eq!(read_lines(dir.path().join("tgt.2")).unwrap(), ["medium one"]);
    }

    #[test]
    fn test_missing_alignment_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OneStopExtractor::new(dir.path()).extract().is_err());
    }
}
