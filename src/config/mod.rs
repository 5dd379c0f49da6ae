use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::{Level, Result};

/// Preprocessing options: corpus bases, split fraction, filtering bounds and
/// vocabulary knobs. Mirrors the `preprocess` CLI flags; also loadable from
/// a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub src: PathBuf,
    pub tgt: PathBuf,
    pub levels: Vec<Level>,
    pub save_data: PathBuf,
    #[serde(default = "default_train_valid_split")]
    pub train_valid_split: f64,
    #[serde(default = "default_seq_length")]
    pub src_seq_length: usize,
    #[serde(default = "default_seq_length")]
    pub tgt_seq_length: usize,
    #[serde(default)]
    pub filter_valid: bool,
    #[serde(default)]
    pub share_vocab: bool,
    #[serde(default)]
    pub words_min_frequency: usize,
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    pub src: PathBuf,
    pub tgt: Option<PathBuf>,
    pub levels: Vec<Level>,
    pub output: PathBuf,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub src: PathBuf,
    pub tgt: PathBuf,
    pub pred: PathBuf,
    pub levels: Vec<Level>,
    pub tools_dir: PathBuf,
    #[serde(default)]
    pub unified: bool,
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    #[serde(default = "default_experiment")]
    pub experiment: String,
    #[serde(default)]
    pub report_rouge: bool,
    #[serde(default)]
    pub report_bleu: bool,
    #[serde(default)]
    pub report_sari: bool,
    #[serde(default)]
    pub report_flesch_reading_ease: bool,
    #[serde(default)]
    pub report_flesch_kincaid_grade_level: bool,
}

fn default_train_valid_split() -> f64 {
    0.8
}

fn default_seq_length() -> usize {
    50
}

fn default_vocab_size() -> usize {
    50_000
}

fn default_batch_size() -> usize {
    30
}

fn default_output_root() -> PathBuf {
    PathBuf::from("runs")
}

fn default_experiment() -> String {
    "default".to_string()
}

/// Load any of the option structs from a YAML file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Per-run output directory: `output_root/experiment/<Mon-DD_HH-MM-SS>`.
pub fn run_dir(output_root: &Path, experiment: &str) -> PathBuf {
    let stamp = Local::now().format("%b-%d_%H-%M-%S").to_string();
    output_root.join(experiment).join(stamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preprocess.yaml");
        std::fs::write(
            &path,
            "src: data/src.\ntgt: data/tgt.\nlevels: [2, 3]\nsave_data: data/demo\n",
        )
        .unwrap();

        let config: PreprocessConfig = load(&path).unwrap();
        assert_eq!(config.levels, [Level(2), Level(3)]);
        assert_eq!(config.train_valid_split, 0.8);
        assert_eq!(config.src_seq_length, 50);
        assert!(!config.filter_valid);
    }

    #[test]
    fn test_run_dir_shape() {
        let dir = run_dir(Path::new("runs"), "newsela");
        let stamp = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(dir.starts_with("runs/newsela"));
        // Mon-DD_HH-MM-SS
        assert_eq!(stamp.len(), "Jan-01_00-00-00".len());
        assert_eq!(stamp.matches('-').count(), 3);
        assert_eq!(stamp.matches('_').count(), 1);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "src: [not, a, path\n").unwrap();
        assert!(load::<PreprocessConfig>(&path).is_err());
    }
}
