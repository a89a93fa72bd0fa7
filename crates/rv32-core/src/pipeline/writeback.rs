//! Write-back stage: commit results to the register bank.

use crate::inst::DecodedInstruction;
use crate::pipeline::{ExecutionResult, MemoryAccessResult};
use crate::reg::RegisterBank;

/// Writes the ALU result (or, for loads, the loaded data) into rd when the
/// instruction defines a destination. Stores and branches commit nothing;
/// x0 writes are discarded by the register bank itself.
#[derive(Debug)]
pub struct WriteBackStage {
    decoded: DecodedInstruction,
    exec: ExecutionResult,
    mem: MemoryAccessResult,
}

impl WriteBackStage {
    pub fn new() -> Self {
        Self {
            decoded: DecodedInstruction::Invalid { raw: 0 },
            exec: ExecutionResult::default(),
            mem: MemoryAccessResult::default(),
        }
    }

    /// Latch the decoded instruction.
    pub fn set_decoded_instruction(&mut self, inst: DecodedInstruction) {
        self.decoded = inst;
    }

    /// Latch the execute-stage output.
    pub fn set_execution_result(&mut self, exec: ExecutionResult) {
        self.exec = exec;
    }

    /// Latch the memory-stage output.
    pub fn set_memory_access_result(&mut self, mem: MemoryAccessResult) {
        self.mem = mem;
    }

    /// Commit the register file write, if this instruction defines one.
    pub fn process(&mut self, regs: &mut RegisterBank) {
        let Some(rd) = self.decoded.destination() else {
            return;
        };
        if self.decoded.is_load() {
            if let Some(data) = self.mem.load_data {
                regs.write(rd, data);
            }
        } else {
            regs.write(rd, self.exec.alu_result);
        }
    }
}

impl Default for WriteBackStage {
    fn default() -> Self {
        Self::new()
    }
}
