use std::collections::BTreeMap;

use crate::core::{Level, PipelineError, Result};
use crate::model::{Batch, Decoder, DecoderOutput, Encoder, EncoderState};

/// One shared encoder paired with a bank of level-specific decoders.
///
/// Dispatch is an explicit table lookup keyed by the level of the current
/// batch; `active` records the current selection and starts out unset.
/// Switching decoders is a pure assignment with no effect on the encoder or
/// on the inactive decoders.
pub struct LevelRoutedModel {
    encoder: Box<dyn Encoder>,
    decoders: BTreeMap<Level, Box<dyn Decoder>>,
    active: Option<Level>,
}

impl LevelRoutedModel {
    pub fn new(encoder: Box<dyn Encoder>, decoders: BTreeMap<Level, Box<dyn Decoder>>) -> Self {
        Self {
            encoder,
            decoders,
            active: None,
        }
    }

    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.decoders.keys().copied()
    }

    pub fn active_level(&self) -> Option<Level> {
        self.active
    }

    /// Explicit transition for inference-time control outside the batch path.
    pub fn set_level(&mut self, level: Level) -> Result<()> {
        if !self.decoders.contains_key(&level) {
            return Err(PipelineError::UnknownLevel(level).into());
        }
        self.active = Some(level);
        Ok(())
    }

    fn decoder_for(&self, level: Level) -> Result<&dyn Decoder> {
        self.decoders
            .get(&level)
            .map(|decoder| decoder.as_ref())
            .ok_or_else(|| PipelineError::UnknownLevel(level).into())
    }

    /// Shared encoding pass; identical for the same batch regardless of the
    /// active decoder.
    pub fn encode(&self, batch: &Batch) -> Result<EncoderState> {
        self.encoder.encode(batch)
    }

    /// Training forward pass: verify the batch is monomorphic, route to that
    /// level's decoder, then encode and decode.
    pub fn forward(&mut self, batch: &Batch) -> Result<DecoderOutput> {
        let level = batch.level()?;
        self.set_level(level)?;
        let state = self.encoder.encode(batch)?;
        self.decoder_for(level)?.decode(&state, &batch.targets())
    }

    /// Inference pass: one hypothesis per source, routed the same way as
    /// `forward`.
    pub fn generate(&self, batch: &Batch) -> Result<Vec<String>> {
        let level = batch.level()?;
        let state = self.encoder.encode(batch)?;
        self.decoder_for(level)?.generate(&state)
    }
}
