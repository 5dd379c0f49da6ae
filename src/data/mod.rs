pub mod reader;
pub mod shard;
pub mod split;
pub mod vocab;

pub use reader::{count_features, FilterPolicy};
pub use shard::{CorpusType, Example, LevelShardBuilder, Shard};
pub use split::CorpusSplitter;
pub use vocab::{build_vocab, Fields, Vocab, VocabOptions};
