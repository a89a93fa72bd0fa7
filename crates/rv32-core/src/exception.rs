//! Fault taxonomy shared by the MMU, the decoder, and the cycle driver.

use crate::mmu::AccessType;
use thiserror::Error;

/// A typed, non-recoverable condition raised somewhere in the pipeline.
///
/// Faults are never handled inside a stage; they unwind through `?` to the
/// cycle driver, which stops the loop and surfaces the fault to the
/// embedder. There is no trap vector and no delegation in this model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Exception {
    /// No page table entry maps the virtual address, or the entry's V bit
    /// is clear.
    #[error("page fault at virtual address {0:#010x}")]
    PageFault(u32),

    /// The mapping exists but denies this access kind, or the current
    /// privilege mode may not use the page at all.
    #[error("{access:?} access violation at virtual address {addr:#010x}")]
    AccessViolation { addr: u32, access: AccessType },

    /// A word or halfword access that is not naturally aligned.
    #[error("misaligned {width}-byte access at {addr:#010x}")]
    MisalignedAccess { addr: u32, width: u32 },

    /// A physical access past the end of memory.
    #[error("{width}-byte physical access at {addr:#010x} is out of bounds")]
    OutOfBounds { addr: u32, width: u32 },

    /// The word fetched at `pc` could not be classified, or carries an
    /// encoding this core does not implement.
    #[error("illegal instruction {inst:#010x} at pc {pc:#010x}")]
    IllegalInstruction { inst: u32, pc: u32 },

    /// A bounded run gave up before the program halted.
    #[error("cycle budget exhausted after {cycles} cycles")]
    CycleBudgetExhausted { cycles: u64 },
}
