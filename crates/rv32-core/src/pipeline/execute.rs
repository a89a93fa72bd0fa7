//! Execute stage: ALU operations, branch decisions, and effective
//! addresses.

use crate::exception::Exception;
use crate::inst::DecodedInstruction;
use crate::pipeline::{ExecutionResult, LoadKind, MemoryOp, StoreKind};
use crate::reg::RegisterBank;

/// Computes an [`ExecutionResult`] from the decoded instruction and the
/// register bank. All arithmetic is 32-bit two's-complement; shift amounts
/// are the low 5 bits of their operand.
#[derive(Debug)]
pub struct ExecuteStage {
    decoded: DecodedInstruction,
    result: ExecutionResult,
}

impl ExecuteStage {
    pub fn new() -> Self {
        Self {
            decoded: DecodedInstruction::Invalid { raw: 0 },
            result: ExecutionResult::default(),
        }
    }

    /// Latch the instruction to execute.
    pub fn set_decoded_instruction(&mut self, inst: DecodedInstruction) {
        self.decoded = inst;
    }

    /// Execute the latched instruction against the register bank. The pc
    /// still holds the address of this instruction; the driver advances it
    /// after write-back.
    pub fn process(&mut self, regs: &RegisterBank) -> Result<(), Exception> {
        let pc = regs.pc();
        let mut result = ExecutionResult {
            branch_target: pc.wrapping_add(4),
            ..ExecutionResult::default()
        };

        match self.decoded {
            DecodedInstruction::R {
                raw,
                funct3,
                rs1,
                rs2,
                funct7,
                ..
            } => {
                let lhs = regs.read(rs1);
                let rhs = regs.read(rs2);
                result.alu_result = match (funct3, funct7) {
                    (0x0, 0x00) => lhs.wrapping_add(rhs), // add
                    (0x0, 0x20) => lhs.wrapping_sub(rhs), // sub
                    // "SLL, SRL, and SRA perform logical left, logical
                    // right, and arithmetic right shifts on the value in
                    // register rs1 by the shift amount held in the lower 5
                    // bits of register rs2."
                    (0x1, 0x00) => lhs << (rhs & 0x1f), // sll
                    (0x2, 0x00) => ((lhs as i32) < (rhs as i32)) as u32, // slt
                    (0x3, 0x00) => (lhs < rhs) as u32,  // sltu
                    (0x4, 0x00) => lhs ^ rhs,           // xor
                    (0x5, 0x00) => lhs >> (rhs & 0x1f), // srl
                    (0x5, 0x20) => ((lhs as i32) >> (rhs & 0x1f)) as u32, // sra
                    (0x6, 0x00) => lhs | rhs,           // or
                    (0x7, 0x00) => lhs & rhs,           // and
                    _ => return Err(Exception::IllegalInstruction { inst: raw, pc }),
                };
            }
            DecodedInstruction::I {
                raw,
                opcode,
                rd,
                funct3,
                rs1,
                imm,
            } => {
                let src = regs.read(rs1);
                match opcode {
                    0x13 => {
                        result.alu_result = match funct3 {
                            0x0 => src.wrapping_add(imm as u32), // addi
                            0x1 => {
                                // slli

                                // The shamt is imm[4:0]; imm[11:5] must be
                                // zero in RV32I.
                                if (imm >> 5) & 0x7f != 0 {
                                    return Err(Exception::IllegalInstruction { inst: raw, pc });
                                }
                                src << (imm as u32 & 0x1f)
                            }
                            0x2 => ((src as i32) < imm) as u32, // slti
                            0x3 => (src < imm as u32) as u32,   // sltiu
                            0x4 => src ^ imm as u32,            // xori
                            0x5 => {
                                // srli and srai share funct3 0x5 and are
                                // distinguished by imm[11:5].
                                let shamt = imm as u32 & 0x1f;
                                match (imm >> 5) & 0x7f {
                                    0x00 => src >> shamt,                   // srli
                                    0x20 => ((src as i32) >> shamt) as u32, // srai
                                    _ => {
                                        return Err(Exception::IllegalInstruction {
                                            inst: raw,
                                            pc,
                                        })
                                    }
                                }
                            }
                            0x6 => src | imm as u32, // ori
                            0x7 => src & imm as u32, // andi
                            _ => return Err(Exception::IllegalInstruction { inst: raw, pc }),
                        };
                    }
                    0x03 => {
                        // Loads compute the effective address here; the
                        // memory-access stage performs the access.
                        result.alu_result = src.wrapping_add(imm as u32);
                        let kind = match funct3 {
                            0x0 => LoadKind::Lb,
                            0x1 => LoadKind::Lh,
                            0x2 => LoadKind::Lw,
                            0x4 => LoadKind::Lbu,
                            0x5 => LoadKind::Lhu,
                            _ => return Err(Exception::IllegalInstruction { inst: raw, pc }),
                        };
                        result.memory_op = Some(MemoryOp::Load { kind, rd });
                    }
                    0x67 => {
                        // jalr

                        // "The target address is obtained by adding the
                        // sign-extended 12-bit I-immediate to the register
                        // rs1, then setting the least-significant bit of
                        // the result to zero."
                        result.alu_result = pc.wrapping_add(4);
                        result.branch_taken = true;
                        result.branch_target = src.wrapping_add(imm as u32) & !1;
                    }
                    0x73 => {
                        // ecall and ebreak retire as no-ops: this model has
                        // no trap machinery. The Zicsr encodings are not
                        // implemented.
                        if funct3 != 0 {
                            return Err(Exception::IllegalInstruction { inst: raw, pc });
                        }
                    }
                    _ => return Err(Exception::IllegalInstruction { inst: raw, pc }),
                }
            }
            DecodedInstruction::S {
                raw,
                funct3,
                rs1,
                rs2,
                imm,
            } => {
                result.alu_result = regs.read(rs1).wrapping_add(imm as u32);
                let kind = match funct3 {
                    0x0 => StoreKind::Sb,
                    0x1 => StoreKind::Sh,
                    0x2 => StoreKind::Sw,
                    _ => return Err(Exception::IllegalInstruction { inst: raw, pc }),
                };
                result.memory_op = Some(MemoryOp::Store { kind, rs2 });
            }
            DecodedInstruction::B {
                raw,
                funct3,
                rs1,
                rs2,
                imm,
            } => {
                let lhs = regs.read(rs1);
                let rhs = regs.read(rs2);
                let taken = match funct3 {
                    0x0 => lhs == rhs,                  // beq
                    0x1 => lhs != rhs,                  // bne
                    0x4 => (lhs as i32) < (rhs as i32), // blt
                    0x5 => (lhs as i32) >= (rhs as i32), // bge
                    0x6 => lhs < rhs,                   // bltu
                    0x7 => lhs >= rhs,                  // bgeu
                    _ => return Err(Exception::IllegalInstruction { inst: raw, pc }),
                };
                if taken {
                    result.branch_taken = true;
                    result.branch_target = pc.wrapping_add(imm as u32);
                }
            }
            DecodedInstruction::U {
                raw, opcode, imm, ..
            } => {
                result.alu_result = match opcode {
                    // "LUI places the U-immediate value in the top 20 bits
                    // of the destination register rd, filling in the lowest
                    // 12 bits with zeros."
                    0x37 => imm,                  // lui
                    0x17 => pc.wrapping_add(imm), // auipc
                    _ => return Err(Exception::IllegalInstruction { inst: raw, pc }),
                };
            }
            DecodedInstruction::J { imm, .. } => {
                // jal

                result.alu_result = pc.wrapping_add(4);
                result.branch_taken = true;
                result.branch_target = pc.wrapping_add(imm as u32);
            }
            DecodedInstruction::Invalid { raw } => {
                return Err(Exception::IllegalInstruction { inst: raw, pc });
            }
        }

        self.result = result;
        Ok(())
    }

    /// The result computed by the last `process` call.
    pub fn result(&self) -> ExecutionResult {
        self.result
    }
}

impl Default for ExecuteStage {
    fn default() -> Self {
        Self::new()
    }
}
