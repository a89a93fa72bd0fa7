//! Fetch stage: read the next instruction word through the MMU.

use crate::exception::Exception;
use crate::mmu::Mmu;
use crate::reg::RegisterBank;

/// Reads the 32-bit word at the current program counter with an
/// Execute-class access. Any MMU fault propagates to the driver and ends
/// the cycle.
#[derive(Debug, Default)]
pub struct FetchStage {
    fetched: u32,
}

impl FetchStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the word at `regs.pc()`.
    pub fn process(&mut self, mmu: &Mmu, regs: &RegisterBank) -> Result<(), Exception> {
        self.fetched = mmu.fetch_word(regs.pc())?;
        Ok(())
    }

    /// The word fetched by the last `process` call.
    pub fn fetched_instruction(&self) -> u32 {
        self.fetched
    }
}
