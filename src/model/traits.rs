use crate::core::Result;
use crate::model::Batch;

/// Encoder memory for one batch. Carries the raw source sentences alongside
/// the numeric memory so decoders with copy/attention mechanisms can reach
/// back to the surface forms.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderState {
    pub memory: Vec<Vec<f32>>,
    pub lengths: Vec<usize>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoderOutput {
    pub logits: Vec<Vec<f32>>,
}

/// The shared sentence encoder. One instance serves every level; its output
/// for a given batch is independent of which decoder is active.
pub trait Encoder {
    fn encode(&self, batch: &Batch) -> Result<EncoderState>;
}

/// A level-specific decoding head. `decode` is the teacher-forced training
/// pass, `generate` the inference pass producing one hypothesis per source.
pub trait Decoder {
    fn decode(&self, state: &EncoderState, tgt: &[String]) -> Result<DecoderOutput>;

    fn generate(&self, state: &EncoderState) -> Result<Vec<String>>;
}
