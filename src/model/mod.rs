pub mod baseline;
pub mod batch;
pub mod routed;
pub mod traits;

pub use baseline::{copy_model, BagEncoder, CopyDecoder};
pub use batch::Batch;
pub use routed::LevelRoutedModel;
pub use traits::{Decoder, DecoderOutput, Encoder, EncoderState};
