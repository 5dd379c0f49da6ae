pub mod config;
pub mod core;
pub mod corpus;
pub mod data;
pub mod evaluate;
pub mod model;
pub mod translate;
pub mod unify;
pub mod utils;

pub use self::core::{level_path, prefixed, Level, PipelineError, Result};

pub use data::{
    build_vocab, count_features, CorpusSplitter, CorpusType, Example, Fields, FilterPolicy,
    LevelShardBuilder, Shard, Vocab, VocabOptions,
};

pub use model::{
    copy_model, Batch, Decoder, DecoderOutput, Encoder, EncoderState, LevelRoutedModel,
};

pub use translate::Translator;

pub use unify::{unify, UnifiedCorpora, UnifiedRecord};

pub use evaluate::{Evaluator, MetricFlags, ProcessRunner, ScorerRunner};

pub use corpus::{NewselaExtractor, OneStopExtractor};
