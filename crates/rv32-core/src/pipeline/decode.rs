//! Decode stage: classify the fetched word.

use crate::inst::DecodedInstruction;

/// Turns the fetched 32-bit word into a [`DecodedInstruction`].
#[derive(Debug)]
pub struct DecodeStage {
    fetched: u32,
    decoded: DecodedInstruction,
}

impl DecodeStage {
    pub fn new() -> Self {
        Self {
            fetched: 0,
            decoded: DecodedInstruction::Invalid { raw: 0 },
        }
    }

    /// Latch the word to decode.
    pub fn set_fetched_instruction(&mut self, word: u32) {
        self.fetched = word;
    }

    /// Classify the latched word. Decoding is total; unrecognized words
    /// come out as `Invalid` and fault in the execute stage.
    pub fn process(&mut self) {
        self.decoded = DecodedInstruction::decode(self.fetched);
    }

    /// The instruction decoded by the last `process` call.
    pub fn decoded_instruction(&self) -> DecodedInstruction {
        self.decoded
    }
}

impl Default for DecodeStage {
    fn default() -> Self {
        Self::new()
    }
}
