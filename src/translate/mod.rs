use std::path::{Path, PathBuf};

use crate::core::{level_path, Level, PipelineError, Result};
use crate::model::{Batch, LevelRoutedModel};
use crate::utils::textio::{read_lines, write_lines};

/// Drives the routed model in inference mode for one level at a time,
/// producing one hypothesis per source line in input order.
pub struct Translator {
    model: LevelRoutedModel,
    output_base: Option<PathBuf>,
}

impl Translator {
    pub fn new(model: LevelRoutedModel) -> Self {
        Self {
            model,
            output_base: None,
        }
    }

    /// Also write each level's hypotheses to `level_path(base, level)`.
    pub fn with_output<P: Into<PathBuf>>(mut self, base: P) -> Self {
        self.output_base = Some(base.into());
        self
    }

    pub fn output_path(&self, level: Level) -> Option<PathBuf> {
        self.output_base.as_ref().map(|base| level_path(base, level))
    }

    /// Translate the source file of one level. When a target path is given,
    /// its line count is checked against the source before any decoding.
    /// Hypotheses come back in original line order, in memory and (when an
    /// output base is configured) on disk.
    pub fn translate(
        &mut self,
        src_path: &Path,
        tgt_path: Option<&Path>,
        level: Level,
        batch_size: usize,
    ) -> Result<Vec<String>> {
        self.model.set_level(level)?;

        let src_lines = read_lines(src_path)?;
        if let Some(tgt_path) = tgt_path {
            let tgt_lines = read_lines(tgt_path)?;
            if src_lines.len() != tgt_lines.len() {
                return Err(PipelineError::MisalignedCorpus {
                    level,
                    left: src_lines.len(),
                    right: tgt_lines.len(),
                }
                .into());
            }
        }

        tracing::info!(
            "translating level {}: {} sentences from {}",
            level,
            src_lines.len(),
            src_path.display()
        );

        let mut hypotheses = Vec::with_capacity(src_lines.len());
        for chunk in src_lines.chunks(batch_size.max(1)) {
            let batch = Batch::from_sources(chunk, level);
            hypotheses.extend(self.model.generate(&batch)?);
        }

        if let Some(out_path) = self.output_path(level) {
            write_lines(&out_path, &hypotheses)?;
            tracing::info!("wrote level {} hypotheses to {}", level, out_path.display());
        }
        Ok(hypotheses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::copy_model;

    #[test]
    fn test_hypotheses_preserve_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let src_path = dir.path().join("src.2");
        let lines: Vec<String> = (0..5).map(|i| format!("sentence {}", i)).collect();
        write_lines(&src_path, &lines).unwrap();

        let mut translator = Translator::new(copy_model(&[Level(2)]));
        let hyps = translator
            .translate(&src_path, None, Level(2), 2)
            .unwrap();
        assert_eq!(hyps, lines);
    }

    #[test]
    fn test_output_file_matches_hypotheses() {
        let dir = tempfile::tempdir().unwrap();
        let src_path = dir.path().join("src.3");
        write_lines(&src_path, &["one", "two"]).unwrap();

        let out_base = dir.path().join("pred.");
        let mut translator =
            Translator::new(copy_model(&[Level(3)])).with_output(&out_base);
        let hyps = translator
            .translate(&src_path, None, Level(3), 30)
            .unwrap();

        let written = read_lines(dir.path().join("pred.3")).unwrap();
        assert_eq!(written, hyps);
    }

    #[test]
    fn test_misaligned_target_aborts_translation() {
        let dir = tempfile::tempdir().unwrap();
        let src_path = dir.path().join("src.2");
        let tgt_path = dir.path().join("tgt.2");
        write_lines(&src_path, &["a", "b"]).unwrap();
        write_lines(&tgt_path, &["x"]).unwrap();

        let mut translator = Translator::new(copy_model(&[Level(2)]));
        let err = translator
            .translate(&src_path, Some(&tgt_path), Level(2), 1)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MisalignedCorpus { .. })
        ));
    }

    #[test]
    fn test_unknown_level_aborts_before_reading() {
        let mut translator = Translator::new(copy_model(&[Level(2)]));
        let err = translator
            .translate(Path::new("missing.src.9"), None, Level(9), 1)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnknownLevel(Level(9)))
        ));
    }
}
