pub mod scorer;

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::core::Result;
use crate::unify::{PRED_UNIFIED, SRC_UNIFIED, TGT_UNIFIED};

pub use scorer::{ProcessRunner, ScorerRunner};

/// Which metrics to report. Each flag maps to one external scorer; metrics
/// are independent and run in a fixed order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricFlags {
    pub rouge: bool,
    pub bleu: bool,
    pub sari: bool,
    pub flesch_reading_ease: bool,
    pub flesch_kincaid_grade_level: bool,
}

impl MetricFlags {
    pub fn all() -> Self {
        Self {
            rouge: true,
            bleu: true,
            sari: true,
            flesch_reading_ease: true,
            flesch_kincaid_grade_level: true,
        }
    }

    pub fn any(&self) -> bool {
        self.rouge
            || self.bleu
            || self.sari
            || self.flesch_reading_ease
            || self.flesch_kincaid_grade_level
    }
}

/// Orchestrates the external scorers over one (src, tgt, pred) corpus. A
/// scorer failure is not caught here; it aborts the evaluation run.
pub struct Evaluator {
    flags: MetricFlags,
    tools_dir: PathBuf,
    unified_dir: Option<PathBuf>,
    runner: Box<dyn ScorerRunner>,
}

impl Evaluator {
    pub fn new<P: Into<PathBuf>>(flags: MetricFlags, tools_dir: P) -> Self {
        Self {
            flags,
            tools_dir: tools_dir.into(),
            unified_dir: None,
            runner: Box::new(ProcessRunner),
        }
    }

    /// Bind the no-argument `evaluate_unified` variant to a run directory
    /// holding the unified artifacts.
    pub fn with_unified_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.unified_dir = Some(dir.into());
        self
    }

    pub fn with_runner(mut self, runner: Box<dyn ScorerRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Score one corpus, logging and returning each enabled metric's report.
    pub fn evaluate(
        &self,
        src_path: &Path,
        tgt_path: &Path,
        pred_path: &Path,
    ) -> Result<Vec<String>> {
        let pred_text = std::fs::read_to_string(pred_path)
            .with_context(|| format!("reading predictions {}", pred_path.display()))?;

        let mut reports = Vec::new();
        if self.flags.rouge {
            reports.push(self.report_rouge(tgt_path, &pred_text)?);
        }
        if self.flags.bleu {
            reports.push(self.report_bleu(tgt_path, &pred_text)?);
        }
        if self.flags.sari {
            reports.push(self.report_sari(src_path, tgt_path, &pred_text)?);
        }
        if self.flags.flesch_reading_ease {
            reports.push(self.report_readability("Flesch Reading Ease", &pred_text)?);
        }
        if self.flags.flesch_kincaid_grade_level {
            reports.push(self.report_readability("Flesch-Kincaid Grade Level", &pred_text)?);
        }

        for report in &reports {
            tracing::info!("{}", report);
        }
        Ok(reports)
    }

    /// Score the unified corpora at their fixed paths in the bound run
    /// directory.
    pub fn evaluate_unified(&self) -> Result<Vec<String>> {
        let dir = self
            .unified_dir
            .as_ref()
            .context("evaluator has no unified directory bound")?;
        self.evaluate(
            &dir.join(SRC_UNIFIED),
            &dir.join(TGT_UNIFIED),
            &dir.join(PRED_UNIFIED),
        )
    }

    fn tool(&self, name: &str) -> String {
        self.tools_dir.join(name).to_string_lossy().into_owned()
    }

    fn report_rouge(&self, tgt_path: &Path, pred_text: &str) -> Result<String> {
        let args = vec![
            self.tool("test_rouge.py"),
            "-r".to_string(),
            tgt_path.to_string_lossy().into_owned(),
            "-c".to_string(),
            "STDIN".to_string(),
        ];
        self.runner.run("python", &args, pred_text)
    }

    fn report_bleu(&self, tgt_path: &Path, pred_text: &str) -> Result<String> {
        let args = vec![
            self.tool("multi-bleu.perl"),
            tgt_path.to_string_lossy().into_owned(),
        ];
        let report = self.runner.run("perl", &args, pred_text)?;
        Ok(format!(">> {}", report.trim()))
    }

    fn report_sari(&self, src_path: &Path, tgt_path: &Path, pred_text: &str) -> Result<String> {
        let args = vec![
            self.tool("sari.py"),
            src_path.to_string_lossy().into_owned(),
            tgt_path.to_string_lossy().into_owned(),
        ];
        let report = self.runner.run("python", &args, pred_text)?;
        Ok(format!(">> {}", report.trim()))
    }

    fn report_readability(&self, metric: &str, pred_text: &str) -> Result<String> {
        let args = vec![self.tool("readability.py"), metric.to_string()];
        let report = self.runner.run("python", &args, pred_text)?;
        Ok(format!(">> {}", report.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineError;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<(String, Vec<String>, String)>>>;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Calls,
    }

    impl RecordingRunner {
        fn shared() -> (Self, Calls) {
            let calls: Calls = Calls::default();
            (
                Self {
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl ScorerRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[String], stdin: &str) -> Result<String> {
            self.calls.borrow_mut().push((
                program.to_string(),
                args.to_vec(),
                stdin.to_string(),
            ));
            Ok(format!("report {}", self.calls.borrow().len()))
        }
    }

    struct FailingRunner;

    impl ScorerRunner for FailingRunner {
        fn run(&self, program: &str, _args: &[String], _stdin: &str) -> Result<String> {
            Err(PipelineError::ExternalTool {
                tool: program.to_string(),
                detail: "boom".to_string(),
            }
            .into())
        }
    }

    fn corpus(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        let src = dir.join("src.unified");
        let tgt = dir.join("tgt.unified");
        let pred = dir.join("pred.unified");
        std::fs::write(&src, "a source\n").unwrap();
        std::fs::write(&tgt, "a target\n").unwrap();
        std::fs::write(&pred, "a prediction\n").unwrap();
        (src, tgt, pred)
    }

    #[test]
    fn test_argument_shapes_and_framing() {
        let dir = tempfile::tempdir().unwrap();
        let (src, tgt, pred) = corpus(dir.path());

        let evaluator = Evaluator::new(MetricFlags::all(), "tools")
            .with_runner(Box::new(RecordingRunner::default()));
        let reports = evaluator.evaluate(&src, &tgt, &pred).unwrap();

        // ROUGE reports verbatim; the rest carry the ">> " frame
        assert_eq!(reports[0], "report 1");
        assert!(reports[1..].iter().all(|r| r.starts_with(">> ")));
        assert_eq!(reports.len(), 5);
    }

    #[test]
    fn test_scorers_receive_predictions_on_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let (src, tgt, pred) = corpus(dir.path());

        let (runner, calls) = RecordingRunner::shared();
        let evaluator = Evaluator::new(
            MetricFlags {
                bleu: true,
                sari: true,
                ..MetricFlags::default()
            },
            "tools",
        )
        .with_runner(Box::new(runner));
        evaluator.evaluate(&src, &tgt, &pred).unwrap();

        let calls = calls.borrow();
        let (program, args, stdin) = &calls[0];
        assert_eq!(program, "perl");
        assert!(args[0].ends_with("multi-bleu.perl"));
        assert!(args[1].ends_with("tgt.unified"));
        assert_eq!(stdin, "a prediction\n");

        let (program, args, _) = &calls[1];
        assert_eq!(program, "python");
        assert!(args[0].ends_with("sari.py"));
        assert!(args[1].ends_with("src.unified"));
        assert!(args[2].ends_with("tgt.unified"));
    }

    #[test]
    fn test_scorer_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let (src, tgt, pred) = corpus(dir.path());

        let evaluator = Evaluator::new(MetricFlags::all(), "tools")
            .with_runner(Box::new(FailingRunner));
        let err = evaluator.evaluate(&src, &tgt, &pred).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::ExternalTool { .. })
        ));
    }

    #[test]
    fn test_unified_variant_uses_fixed_paths() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path());

        let evaluator = Evaluator::new(
            MetricFlags {
                bleu: true,
                ..MetricFlags::default()
            },
            "tools",
        )
        .with_unified_dir(dir.path())
        .with_runner(Box::new(RecordingRunner::default()));
        let reports = evaluator.evaluate_unified().unwrap();
        assert_eq!(reports.len(), 1);
    }
}
