pub mod error;
pub mod level;

pub use error::PipelineError;
pub use level::{level_path, prefixed, Level, TRAIN_PREFIX, VALID_PREFIX};

pub type Result<T> = anyhow::Result<T>;
