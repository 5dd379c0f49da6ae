use std::collections::BTreeMap;

use crate::core::{Level, Result};
use crate::model::{
    Batch, Decoder, DecoderOutput, Encoder, EncoderState, LevelRoutedModel,
};

/// Bag-of-lengths encoder: memory is the token count per sentence. Stands in
/// for the neural encoder when exercising the pipeline without a trained
/// checkpoint.
pub struct BagEncoder;

impl Encoder for BagEncoder {
    fn encode(&self, batch: &Batch) -> Result<EncoderState> {
        let sources = batch.sources();
        let lengths: Vec<usize> = sources
            .iter()
            .map(|src| src.split_whitespace().count())
            .collect();
        Ok(EncoderState {
            memory: lengths.iter().map(|&n| vec![n as f32]).collect(),
            lengths,
            sources,
        })
    }
}

/// Pass-through decoder: every hypothesis is the source sentence unchanged.
/// The standard no-simplification baseline for sanity-checking the pipeline.
pub struct CopyDecoder;

impl Decoder for CopyDecoder {
    fn decode(&self, state: &EncoderState, _tgt: &[String]) -> Result<DecoderOutput> {
        Ok(DecoderOutput {
            logits: state.memory.clone(),
        })
    }

    fn generate(&self, state: &EncoderState) -> Result<Vec<String>> {
        Ok(state.sources.clone())
    }
}

/// A copy-through routed model with one `CopyDecoder` per level.
pub fn copy_model(levels: &[Level]) -> LevelRoutedModel {
    let mut decoders: BTreeMap<Level, Box<dyn Decoder>> = BTreeMap::new();
    for &level in levels {
        decoders.insert(level, Box::new(CopyDecoder));
    }
    LevelRoutedModel::new(Box::new(BagEncoder), decoders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_model_echoes_sources() {
        let model = copy_model(&[Level(1)]);
        let hyps = model
            .generate(&Batch::from_sources(&["the cat sat", "a dog"], Level(1)))
            .unwrap();
        assert_eq!(hyps, ["the cat sat", "a dog"]);
    }
}
