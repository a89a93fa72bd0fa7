//! Memory-access stage: loads and stores through the MMU.

use crate::exception::Exception;
use crate::mmu::Mmu;
use crate::pipeline::{ExecutionResult, LoadKind, MemoryAccessResult, MemoryOp, StoreKind};
use crate::reg::RegisterBank;

/// Runs the memory operation decided by execute, if any, using the ALU
/// result as the virtual address. Instructions without a memory op pass
/// through untouched.
#[derive(Debug, Default)]
pub struct MemoryAccessStage {
    exec: ExecutionResult,
    result: MemoryAccessResult,
}

impl MemoryAccessStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the execute-stage output.
    pub fn set_execution_result(&mut self, exec: ExecutionResult) {
        self.exec = exec;
    }

    /// Perform the latched memory operation. Loads fill `load_data`,
    /// extended to 32 bits; stores write the low bytes of `r[rs2]`.
    pub fn process(&mut self, mmu: &mut Mmu, regs: &RegisterBank) -> Result<(), Exception> {
        self.result = MemoryAccessResult::default();
        let Some(op) = self.exec.memory_op else {
            return Ok(());
        };
        let addr = self.exec.alu_result;

        match op {
            MemoryOp::Load { kind, .. } => {
                let data = match kind {
                    LoadKind::Lb => mmu.read(addr)? as i8 as i32 as u32,
                    LoadKind::Lbu => mmu.read(addr)? as u32,
                    LoadKind::Lh => read_half(mmu, addr)? as i16 as i32 as u32,
                    LoadKind::Lhu => read_half(mmu, addr)? as u32,
                    LoadKind::Lw => mmu.read_word(addr)?,
                };
                self.result.load_data = Some(data);
            }
            MemoryOp::Store { kind, rs2 } => {
                let value = regs.read(rs2);
                match kind {
                    StoreKind::Sb => mmu.write(addr, value as u8)?,
                    StoreKind::Sh => write_half(mmu, addr, value as u16)?,
                    StoreKind::Sw => mmu.write_word(addr, value)?,
                }
            }
        }
        Ok(())
    }

    /// The result produced by the last `process` call.
    pub fn result(&self) -> MemoryAccessResult {
        self.result
    }
}

/// Halfword loads assemble two byte translations little-endian and must be
/// 2-byte aligned.
fn read_half(mmu: &Mmu, addr: u32) -> Result<u16, Exception> {
    if addr % 2 != 0 {
        return Err(Exception::MisalignedAccess { addr, width: 2 });
    }
    let lo = mmu.read(addr)? as u16;
    let hi = mmu.read(addr.wrapping_add(1))? as u16;
    Ok(lo | (hi << 8))
}

fn write_half(mmu: &mut Mmu, addr: u32, value: u16) -> Result<(), Exception> {
    if addr % 2 != 0 {
        return Err(Exception::MisalignedAccess { addr, width: 2 });
    }
    mmu.write(addr, value as u8)?;
    mmu.write(addr.wrapping_add(1), (value >> 8) as u8)
}
