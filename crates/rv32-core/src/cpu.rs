//! The cycle driver coupling the five stages.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::exception::Exception;
use crate::inst::DecodedInstruction;
use crate::mem::PhysicalMemory;
use crate::mmu::{
    Mmu, PageTable, PageTableEntry, PrivilegeMode, PAGE_SIZE, PTE_EXECUTE, PTE_READ, PTE_USER,
    PTE_VALID, PTE_WRITE,
};
use crate::pipeline::{DecodeStage, ExecuteStage, FetchStage, MemoryAccessStage, WriteBackStage};
use crate::reg::RegisterBank;

/// Outcome of a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction retired; the loop continues.
    Retired,
    /// The halt sentinel (`jal x0, 0`) retired; the loop stops.
    Halted,
}

/// The five-stage in-order RV32I core.
///
/// Per cycle the driver snapshots the pc, steps fetch, decode, execute,
/// memory access, and write-back in order, then advances the pc. The
/// pipeline is functionally equivalent to single-step execution: one
/// instruction retires per cycle.
#[derive(Debug)]
pub struct Cpu {
    /// General-purpose registers and the program counter.
    pub regs: RegisterBank,
    /// Virtual memory subsystem; every architectural access goes through it.
    pub mmu: Mmu,
    fetch: FetchStage,
    decode: DecodeStage,
    execute: ExecuteStage,
    memory: MemoryAccessStage,
    writeback: WriteBackStage,
}

impl Cpu {
    /// Create a core with `memory_size` bytes of physical memory, machine
    /// mode, and pc 0.
    ///
    /// Every physical page is identity-mapped with full permissions so a
    /// freshly loaded flat binary can fetch, load, and store without an OS
    /// building a richer address space first. Embedders that want a
    /// stricter layout rewrite `mmu.page_table`.
    pub fn new(memory_size: usize) -> Self {
        let memory = PhysicalMemory::new(memory_size);
        let mut page_table = PageTable::new();
        let flags = PTE_VALID | PTE_READ | PTE_WRITE | PTE_EXECUTE | PTE_USER;
        let mut page: u64 = 0;
        while page < memory_size as u64 {
            page_table.add_entry(page as u32, PageTableEntry::new(page as u32 | flags));
            page += PAGE_SIZE as u64;
        }

        Cpu {
            regs: RegisterBank::new(),
            mmu: Mmu::new(memory, page_table, PrivilegeMode::Machine),
            fetch: FetchStage::new(),
            decode: DecodeStage::new(),
            execute: ExecuteStage::new(),
            memory: MemoryAccessStage::new(),
            writeback: WriteBackStage::new(),
        }
    }

    /// Load a raw little-endian instruction stream from `path` into
    /// physical memory at address 0 and reset the pc. Returns the number of
    /// bytes loaded.
    pub fn load_program<P: AsRef<Path>>(&mut self, path: P) -> io::Result<usize> {
        let image = fs::read(path.as_ref())?;
        self.load_bytes(&image)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(image.len())
    }

    /// Copy a program image into physical memory at address 0 and reset the
    /// pc. Fails with [`Exception::OutOfBounds`] if the image does not fit.
    pub fn load_bytes(&mut self, image: &[u8]) -> Result<(), Exception> {
        self.mmu.memory.write_bytes(0, image)?;
        self.regs.set_pc(0);
        debug!("loaded {} program bytes at address 0", image.len());
        Ok(())
    }

    /// Run one cycle: fetch, decode, execute, memory access, write-back,
    /// then advance the pc. Any stage fault ends the cycle and unwinds to
    /// the caller.
    pub fn step(&mut self) -> Result<StepOutcome, Exception> {
        let pc = self.regs.pc();

        self.fetch.process(&self.mmu, &self.regs)?;

        self.decode
            .set_fetched_instruction(self.fetch.fetched_instruction());
        self.decode.process();
        let decoded = self.decode.decoded_instruction();

        self.execute.set_decoded_instruction(decoded);
        self.execute.process(&self.regs)?;
        let exec = self.execute.result();

        self.memory.set_execution_result(exec);
        self.memory.process(&mut self.mmu, &self.regs)?;

        self.writeback.set_decoded_instruction(decoded);
        self.writeback.set_execution_result(exec);
        self.writeback.set_memory_access_result(self.memory.result());
        self.writeback.process(&mut self.regs);

        if exec.branch_taken {
            self.regs.set_pc(exec.branch_target);
        } else {
            self.regs.set_pc(pc.wrapping_add(4));
        }

        trace!("retired {:#010x} at pc {:#010x}", decoded.raw(), pc);

        // The canonical end-of-program sentinel is a jump to self with no
        // link: `jal x0, 0`.
        if let DecodedInstruction::J { rd: 0, .. } = decoded {
            if exec.branch_target == pc {
                debug!("halt at pc {:#010x}", pc);
                return Ok(StepOutcome::Halted);
            }
        }

        Ok(StepOutcome::Retired)
    }

    /// Run until the halt sentinel retires or a fault unwinds.
    pub fn run(&mut self) -> Result<(), Exception> {
        loop {
            if self.step()? == StepOutcome::Halted {
                return Ok(());
            }
        }
    }

    /// Like [`run`](Cpu::run), but give up with
    /// [`Exception::CycleBudgetExhausted`] after `max_cycles` cycles
    /// without a halt.
    pub fn run_for(&mut self, max_cycles: u64) -> Result<(), Exception> {
        for _ in 0..max_cycles {
            if self.step()? == StepOutcome::Halted {
                return Ok(());
            }
        }
        Err(Exception::CycleBudgetExhausted { cycles: max_cycles })
    }

    /// Architectural register read (x0..x31).
    pub fn get_register(&self, index: u8) -> u32 {
        self.regs.read(index)
    }

    /// Direct physical-memory word read, bypassing translation. An
    /// introspection path for tests and embedders.
    pub fn read_word_from_memory(&self, addr: u32) -> Result<u32, Exception> {
        self.mmu.memory.read_word(addr)
    }
}
