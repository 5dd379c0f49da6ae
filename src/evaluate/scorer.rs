use std::io::Write;
use std::process::{Command, Stdio};

use crate::core::{PipelineError, Result};

/// Subprocess boundary for external scorers: run a program with the given
/// arguments, feeding `stdin` to it, and return trimmed standard output.
pub trait ScorerRunner {
    fn run(&self, program: &str, args: &[String], stdin: &str) -> Result<String>;
}

/// Production adapter: blocking `std::process::Command` invocation. No
/// timeout is applied; a hung scorer hangs the run.
pub struct ProcessRunner;

impl ScorerRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String], stdin: &str) -> Result<String> {
        let tool_error = |detail: String| PipelineError::ExternalTool {
            tool: program.to_string(),
            detail,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| tool_error(e.to_string()))?;

        child
            .stdin
            .take()
            .ok_or_else(|| tool_error("stdin pipe unavailable".to_string()))?
            .write_all(stdin.as_bytes())
            .map_err(|e| tool_error(e.to_string()))?;

        let output = child
            .wait_with_output()
            .map_err(|e| tool_error(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(tool_error(format!(
                "exit status {}: {}",
                output.status,
                stderr.trim()
            ))
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
