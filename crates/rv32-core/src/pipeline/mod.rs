//! The five pipeline stages and the latches that couple them.
//!
//! The driver steps the stages in order each cycle; every stage reads its
//! input latch, computes, and exposes its output through a getter. One
//! instruction retires per cycle; the stage decomposition exists so each
//! stage can be driven and inspected in isolation.

pub mod decode;
pub mod execute;
pub mod fetch;
pub mod memory;
pub mod writeback;

pub use decode::DecodeStage;
pub use execute::ExecuteStage;
pub use fetch::FetchStage;
pub use memory::MemoryAccessStage;
pub use writeback::WriteBackStage;

/// Width variant of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
}

/// Width variant of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sb,
    Sh,
    Sw,
}

/// The memory operation carried from execute to the memory-access stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOp {
    Load { kind: LoadKind, rd: u8 },
    Store { kind: StoreKind, rs2: u8 },
}

/// Output latch of the execute stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// ALU output: arithmetic result, effective address, or link value.
    pub alu_result: u32,
    /// Whether a branch or jump redirects the program counter.
    pub branch_taken: bool,
    /// The next program counter when `branch_taken`; pc + 4 otherwise.
    pub branch_target: u32,
    /// The memory operation for the memory-access stage, if any.
    pub memory_op: Option<MemoryOp>,
}

/// Output latch of the memory-access stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryAccessResult {
    /// Data returned by a load, extended to 32 bits. `None` for stores and
    /// non-memory instructions.
    pub load_data: Option<u32>,
}
