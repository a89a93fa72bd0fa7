//! Instruction word classification and field extraction.

/// A classified RV32I instruction with its fields extracted and immediates
/// sign-extended to 32 bits.
///
/// One decoded instruction is produced per cycle; it is consumed by execute,
/// then by the memory-access and write-back stages, then discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedInstruction {
    /// Register-register operations (opcode 0x33).
    R {
        raw: u32,
        rd: u8,
        funct3: u8,
        rs1: u8,
        rs2: u8,
        funct7: u8,
    },
    /// Register-immediate operations, loads, JALR, and SYSTEM
    /// (opcodes 0x13, 0x03, 0x67, 0x73).
    I {
        raw: u32,
        opcode: u8,
        rd: u8,
        funct3: u8,
        rs1: u8,
        imm: i32,
    },
    /// Stores (opcode 0x23).
    S {
        raw: u32,
        funct3: u8,
        rs1: u8,
        rs2: u8,
        imm: i32,
    },
    /// Conditional branches (opcode 0x63). Bit 0 of the immediate is
    /// always zero.
    B {
        raw: u32,
        funct3: u8,
        rs1: u8,
        rs2: u8,
        imm: i32,
    },
    /// LUI and AUIPC (opcodes 0x37, 0x17). The immediate keeps its place in
    /// bits [31:12].
    U { raw: u32, opcode: u8, rd: u8, imm: u32 },
    /// JAL (opcode 0x6F). Bit 0 of the immediate is always zero.
    J { raw: u32, rd: u8, imm: i32 },
    /// Anything the classifier does not recognize, including the all-zero
    /// word.
    Invalid { raw: u32 },
}

impl DecodedInstruction {
    /// Classify a 32-bit instruction word and extract its fields.
    /// Classification is total; unknown opcodes become [`Invalid`] and fault
    /// later, in the execute stage.
    ///
    /// [`Invalid`]: DecodedInstruction::Invalid
    pub fn decode(raw: u32) -> Self {
        let opcode = (raw & 0x7f) as u8;
        let rd = ((raw >> 7) & 0x1f) as u8;
        let funct3 = ((raw >> 12) & 0x07) as u8;
        let rs1 = ((raw >> 15) & 0x1f) as u8;
        let rs2 = ((raw >> 20) & 0x1f) as u8;
        let funct7 = ((raw >> 25) & 0x7f) as u8;

        match opcode {
            0x33 => DecodedInstruction::R {
                raw,
                rd,
                funct3,
                rs1,
                rs2,
                funct7,
            },
            0x03 | 0x13 | 0x67 | 0x73 => {
                // imm[11:0] = inst[31:20]
                let imm = (raw as i32) >> 20;
                DecodedInstruction::I {
                    raw,
                    opcode,
                    rd,
                    funct3,
                    rs1,
                    imm,
                }
            }
            0x23 => {
                // imm[11:5|4:0] = inst[31:25|11:7]
                let imm = (((raw & 0xfe00_0000) as i32) >> 20) | (((raw >> 7) & 0x1f) as i32);
                DecodedInstruction::S {
                    raw,
                    funct3,
                    rs1,
                    rs2,
                    imm,
                }
            }
            0x63 => {
                // imm[12|10:5|4:1|11] = inst[31|30:25|11:8|7]
                let imm = (((raw & 0x8000_0000) as i32) >> 19)
                    | (((raw & 0x80) << 4) as i32) // imm[11]
                    | (((raw >> 20) & 0x7e0) as i32) // imm[10:5]
                    | (((raw >> 7) & 0x1e) as i32); // imm[4:1]
                DecodedInstruction::B {
                    raw,
                    funct3,
                    rs1,
                    rs2,
                    imm,
                }
            }
            0x37 | 0x17 => {
                // imm[31:12] = inst[31:12]
                DecodedInstruction::U {
                    raw,
                    opcode,
                    rd,
                    imm: raw & 0xffff_f000,
                }
            }
            0x6f => {
                // imm[20|10:1|11|19:12] = inst[31|30:21|20|19:12]
                let imm = (((raw & 0x8000_0000) as i32) >> 11)
                    | ((raw & 0xff000) as i32) // imm[19:12]
                    | (((raw >> 9) & 0x800) as i32) // imm[11]
                    | (((raw >> 20) & 0x7fe) as i32); // imm[10:1]
                DecodedInstruction::J { raw, rd, imm }
            }
            _ => DecodedInstruction::Invalid { raw },
        }
    }

    /// The raw instruction word this variant was decoded from.
    pub fn raw(&self) -> u32 {
        match *self {
            DecodedInstruction::R { raw, .. }
            | DecodedInstruction::I { raw, .. }
            | DecodedInstruction::S { raw, .. }
            | DecodedInstruction::B { raw, .. }
            | DecodedInstruction::U { raw, .. }
            | DecodedInstruction::J { raw, .. }
            | DecodedInstruction::Invalid { raw } => raw,
        }
    }

    /// The destination register, for the formats that define one.
    pub fn destination(&self) -> Option<u8> {
        match *self {
            DecodedInstruction::R { rd, .. }
            | DecodedInstruction::I { rd, .. }
            | DecodedInstruction::U { rd, .. }
            | DecodedInstruction::J { rd, .. } => Some(rd),
            DecodedInstruction::S { .. }
            | DecodedInstruction::B { .. }
            | DecodedInstruction::Invalid { .. } => None,
        }
    }

    /// True for the LOAD opcode (0x03).
    pub fn is_load(&self) -> bool {
        matches!(*self, DecodedInstruction::I { opcode: 0x03, .. })
    }

    /// True for the STORE opcode (0x23).
    pub fn is_store(&self) -> bool {
        matches!(*self, DecodedInstruction::S { .. })
    }
}
