use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use levsim::config::{self, EvaluateConfig, PreprocessConfig, TranslateConfig};
use levsim::data::vocab::VocabOptions;
use levsim::evaluate::{Evaluator, MetricFlags};
use levsim::model::copy_model;
use levsim::translate::Translator;
use levsim::{
    build_vocab, count_features, level_path, unify, CorpusSplitter, CorpusType, FilterPolicy,
    Level, LevelShardBuilder, Result,
};

#[derive(Parser)]
#[command(name = "levsim")]
#[command(version = "0.1.0")]
#[command(about = "Multi-level text simplification pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split corpora, build per-level shards and the vocabulary
    Preprocess {
        /// YAML config file; replaces the individual flags
        #[arg(long)]
        config: Option<PathBuf>,
        /// Source corpus base path, e.g. data/src.
        #[arg(long, required_unless_present = "config")]
        src: Option<PathBuf>,
        /// Target corpus base path, e.g. data/tgt.
        #[arg(long, required_unless_present = "config")]
        tgt: Option<PathBuf>,
        #[arg(long, value_delimiter = ',', required_unless_present = "config")]
        levels: Vec<Level>,
        /// Base path for shard and vocabulary output
        #[arg(long, required_unless_present = "config")]
        save_data: Option<PathBuf>,
        #[arg(long, default_value_t = 0.8)]
        train_valid_split: f64,
        #[arg(long, default_value_t = 50)]
        src_seq_length: usize,
        #[arg(long, default_value_t = 50)]
        tgt_seq_length: usize,
        #[arg(long)]
        filter_valid: bool,
        #[arg(long)]
        share_vocab: bool,
        #[arg(long, default_value_t = 0)]
        words_min_frequency: usize,
        #[arg(long, default_value_t = 50_000)]
        vocab_size: usize,
    },
    /// Translate each level's source corpus with the copy baseline model
    Translate {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, required_unless_present = "config")]
        src: Option<PathBuf>,
        /// Optional gold target base path, checked for alignment
        #[arg(long)]
        tgt: Option<PathBuf>,
        #[arg(long, value_delimiter = ',', required_unless_present = "config")]
        levels: Vec<Level>,
        /// Hypothesis output base path, e.g. out/pred.
        #[arg(long, required_unless_present = "config")]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 30)]
        batch_size: usize,
    },
    /// Score per-level and unified corpora with the external scorers
    Evaluate {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, required_unless_present = "config")]
        src: Option<PathBuf>,
        #[arg(long, required_unless_present = "config")]
        tgt: Option<PathBuf>,
        #[arg(long, required_unless_present = "config")]
        pred: Option<PathBuf>,
        #[arg(long, value_delimiter = ',', required_unless_present = "config")]
        levels: Vec<Level>,
        /// Directory holding the scorer scripts
        #[arg(long, required_unless_present = "config")]
        tools_dir: Option<PathBuf>,
        /// Also merge all levels and score the unified corpora
        #[arg(long)]
        unified: bool,
        #[arg(long, default_value = "runs")]
        output_root: PathBuf,
        #[arg(long, default_value = "default")]
        experiment: String,
        #[arg(long)]
        report_rouge: bool,
        #[arg(long)]
        report_bleu: bool,
        #[arg(long)]
        report_sari: bool,
        #[arg(long)]
        report_flesch_reading_ease: bool,
        #[arg(long)]
        report_flesch_kincaid_grade_level: bool,
    },
    /// Build per-level src/tgt corpora from a raw dataset release
    Extract {
        #[command(subcommand)]
        dataset: ExtractCommands,
    },
}

#[derive(Subcommand)]
enum ExtractCommands {
    /// Newsela: article-versions JSON plus aligned-sentence TSV
    Newsela {
        #[arg(long)]
        versions_json: PathBuf,
        #[arg(long)]
        aligned_sents: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// OneStopEnglish: ADV-ELE / ADV-INT alignment files
    Onestop {
        #[arg(long)]
        base_dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("levsim=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Preprocess {
            config,
            src,
            tgt,
            levels,
            save_data,
            train_valid_split,
            src_seq_length,
            tgt_seq_length,
            filter_valid,
            share_vocab,
            words_min_frequency,
            vocab_size,
        } => {
            let config = match config {
                Some(path) => config::load(&path)?,
                None => PreprocessConfig {
                    src: src.context("--src is required")?,
                    tgt: tgt.context("--tgt is required")?,
                    levels,
                    save_data: save_data.context("--save-data is required")?,
                    train_valid_split,
                    src_seq_length,
                    tgt_seq_length,
                    filter_valid,
                    share_vocab,
                    words_min_frequency,
                    vocab_size,
                },
            };
            preprocess(&config)
        }
        Commands::Translate {
            config,
            src,
            tgt,
            levels,
            output,
            batch_size,
        } => {
            let config = match config {
                Some(path) => config::load(&path)?,
                None => TranslateConfig {
                    src: src.context("--src is required")?,
                    tgt,
                    levels,
                    output: output.context("--output is required")?,
                    batch_size,
                },
            };
            translate(&config)
        }
        Commands::Evaluate {
            config,
            src,
            tgt,
            pred,
            levels,
            tools_dir,
            unified,
            output_root,
            experiment,
            report_rouge,
            report_bleu,
            report_sari,
            report_flesch_reading_ease,
            report_flesch_kincaid_grade_level,
        } => {
            let config = match config {
                Some(path) => config::load(&path)?,
                None => EvaluateConfig {
                    src: src.context("--src is required")?,
                    tgt: tgt.context("--tgt is required")?,
                    pred: pred.context("--pred is required")?,
                    levels,
                    tools_dir: tools_dir.context("--tools-dir is required")?,
                    unified,
                    output_root,
                    experiment,
                    report_rouge,
                    report_bleu,
                    report_sari,
                    report_flesch_reading_ease,
                    report_flesch_kincaid_grade_level,
                },
            };
            evaluate(&config)
        }
        Commands::Extract { dataset } => match dataset {
            ExtractCommands::Newsela {
                versions_json,
                aligned_sents,
                out_dir,
            } => {
                std::fs::create_dir_all(&out_dir)
                    .with_context(|| format!("creating {}", out_dir.display()))?;
                let counts = levsim::NewselaExtractor {
                    versions_json,
                    aligned_sents,
                    out_dir,
                }
                .extract()?;
                println!("number of sentences per target grade level: {:?}", counts);
                Ok(())
            }
            ExtractCommands::Onestop { base_dir } => {
                levsim::OneStopExtractor::new(base_dir).extract()
            }
        },
    }
}

fn vocab_path(save_data: &std::path::Path) -> PathBuf {
    let mut path = save_data.as_os_str().to_os_string();
    path.push(".vocab.json");
    PathBuf::from(path)
}

fn preprocess(config: &PreprocessConfig) -> Result<()> {
    let filter = FilterPolicy {
        use_src_len: true,
        max_src_len: config.src_seq_length,
        max_tgt_len: config.tgt_seq_length,
    };
    let builder = LevelShardBuilder::new(
        config.src.clone(),
        config.tgt.clone(),
        config.save_data.clone(),
        filter,
        config.filter_valid,
    );

    // refuse to clobber shards or vocabulary from an earlier run
    for corpus_type in [CorpusType::Train, CorpusType::Valid] {
        for &level in &config.levels {
            let path = builder.shard_path(corpus_type, level);
            if path.exists() {
                bail!(
                    "please backup the existing shard file {} to avoid overwriting it",
                    path.display()
                );
            }
        }
    }
    if vocab_path(&config.save_data).exists() {
        bail!(
            "please backup the existing vocabulary file {} to avoid overwriting it",
            vocab_path(&config.save_data).display()
        );
    }

    CorpusSplitter::new(
        config.src.clone(),
        config.tgt.clone(),
        config.train_valid_split,
    )
    .split(&config.levels)?;

    let first = *config
        .levels
        .first()
        .context("at least one level is required")?;
    tracing::info!(
        "number of source features: {}",
        count_features(level_path(&config.src, first))?
    );
    tracing::info!(
        "number of target features: {}",
        count_features(level_path(&config.tgt, first))?
    );

    tracing::info!("building and saving training data");
    let train_shards = builder.build_all(CorpusType::Train, &config.levels)?;
    tracing::info!("building and saving validation data");
    builder.build_all(CorpusType::Valid, &config.levels)?;

    tracing::info!("building and saving vocabulary");
    let fields = build_vocab(
        &train_shards,
        &VocabOptions {
            share_vocab: config.share_vocab,
            min_frequency: config.words_min_frequency,
            max_size: config.vocab_size,
        },
    )?;
    fields.save(vocab_path(&config.save_data))
}

fn translate(config: &TranslateConfig) -> Result<()> {
    let mut translator =
        Translator::new(copy_model(&config.levels)).with_output(config.output.clone());

    for &level in &config.levels {
        let src_path = level_path(&config.src, level);
        let tgt_path = config.tgt.as_ref().map(|tgt| level_path(tgt, level));
        translator.translate(&src_path, tgt_path.as_deref(), level, config.batch_size)?;
    }
    Ok(())
}

fn evaluate(config: &EvaluateConfig) -> Result<()> {
    let flags = MetricFlags {
        rouge: config.report_rouge,
        bleu: config.report_bleu,
        sari: config.report_sari,
        flesch_reading_ease: config.report_flesch_reading_ease,
        flesch_kincaid_grade_level: config.report_flesch_kincaid_grade_level,
    };
    if !flags.any() {
        bail!("no metrics enabled; pass at least one --report-* flag");
    }

    let mut evaluator = Evaluator::new(flags, config.tools_dir.clone());

    for &level in &config.levels {
        tracing::info!("evaluating level {}", level);
        evaluator.evaluate(
            &level_path(&config.src, level),
            &level_path(&config.tgt, level),
            &level_path(&config.pred, level),
        )?;
    }

    if config.unified {
        let run_dir = config::run_dir(&config.output_root, &config.experiment);
        let corpora = unify(&config.levels, &config.src, &config.tgt, &config.pred)?;
        corpora.write(&run_dir)?;

        evaluator = evaluator.with_unified_dir(&run_dir);
        tracing::info!("evaluating unified corpora in {}", run_dir.display());
        evaluator.evaluate_unified()?;
    }
    Ok(())
}
