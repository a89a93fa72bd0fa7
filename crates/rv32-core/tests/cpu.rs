use rv32_core::cpu::{Cpu, StepOutcome};
use rv32_core::exception::Exception;

/// The canonical end-of-program sentinel: `jal x0, 0`.
const HALT: u32 = 0x0000_006f;

/// Assemble 32-bit instruction words into the little-endian byte stream the
/// loader expects.
fn image(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn two_addis_and_halt() {
    let mut cpu = Cpu::new(1024 * 1024);
    cpu.load_bytes(&image(&[
        0x02a0_0093, // addi x1, x0, 42
        0x03a0_8113, // addi x2, x1, 58
        HALT,
    ]))
    .unwrap();

    cpu.run().unwrap();

    assert_eq!(cpu.get_register(0), 0, "x0 must be 0");
    assert_eq!(cpu.get_register(1), 42);
    assert_eq!(cpu.get_register(2), 100);
}

#[test]
fn invalid_instruction_surfaces_fault() {
    let mut cpu = Cpu::new(1024 * 1024);
    cpu.load_bytes(&image(&[
        0x02a0_0093, // addi x1, x0, 42
        0xffff_ffff, // unclassifiable
    ]))
    .unwrap();

    let fault = cpu.run().unwrap_err();
    assert_eq!(
        fault,
        Exception::IllegalInstruction {
            inst: 0xffff_ffff,
            pc: 4
        }
    );
    // State retired before the fault stays observable.
    assert_eq!(cpu.get_register(1), 42);
}

#[test]
fn pc_advances_by_four_without_a_branch() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[0x0010_0093, HALT])).unwrap(); // addi x1, x0, 1

    assert_eq!(cpu.step().unwrap(), StepOutcome::Retired);
    assert_eq!(cpu.regs.pc(), 4);
}

#[test]
fn taken_branch_skips_an_instruction() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[
        0x0010_0093, // addi x1, x0, 1
        0x0000_0463, // beq x0, x0, 8
        0x0630_0113, // addi x2, x0, 99 (skipped)
        HALT,
    ]))
    .unwrap();

    cpu.run().unwrap();

    assert_eq!(cpu.get_register(1), 1);
    assert_eq!(cpu.get_register(2), 0);
}

#[test]
fn store_load_roundtrip_through_memory() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[
        0x02a0_0093, // addi x1, x0, 42
        0x1010_2023, // sw x1, 0x100(x0)
        0x1000_2103, // lw x2, 0x100(x0)
        HALT,
    ]))
    .unwrap();

    cpu.run().unwrap();

    assert_eq!(cpu.get_register(2), 42);
    assert_eq!(cpu.read_word_from_memory(0x100).unwrap(), 42);
}

#[test]
fn byte_loads_extend_sign_correctly() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[
        0xfff0_0093, // addi x1, x0, -1
        0x2010_0023, // sb x1, 0x200(x0)
        0x2000_0103, // lb x2, 0x200(x0)
        0x2000_4183, // lbu x3, 0x200(x0)
        HALT,
    ]))
    .unwrap();

    cpu.run().unwrap();

    assert_eq!(cpu.get_register(2), 0xffff_ffff);
    assert_eq!(cpu.get_register(3), 0xff);
}

#[test]
fn countdown_loop_accumulates() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[
        0x0050_0093, // addi x1, x0, 5
        0x0000_0113, // addi x2, x0, 0
        0x0011_0133, // add x2, x2, x1
        0xfff0_8093, // addi x1, x1, -1
        0xfe00_9ce3, // bne x1, x0, -8
        HALT,
    ]))
    .unwrap();

    cpu.run().unwrap();

    assert_eq!(cpu.get_register(1), 0);
    assert_eq!(cpu.get_register(2), 15); // 5 + 4 + 3 + 2 + 1
}

#[test]
fn jal_links_the_return_address() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[
        0x0080_00ef, // jal x1, 8
        0x0630_0113, // addi x2, x0, 99 (jumped over)
        HALT,
    ]))
    .unwrap();

    cpu.run().unwrap();

    assert_eq!(cpu.get_register(1), 4);
    assert_eq!(cpu.get_register(2), 0);
}

#[test]
fn ecall_retires_as_a_no_op() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[
        0x02a0_0093, // addi x1, x0, 42
        0x0000_0073, // ecall
        HALT,
    ]))
    .unwrap();

    cpu.run().unwrap();
    assert_eq!(cpu.get_register(1), 42);
}

#[test]
fn zero_word_fetch_is_an_illegal_instruction() {
    let mut cpu = Cpu::new(64 * 1024);
    // No halt sentinel: execution runs off the end of the image into
    // zeroed memory.
    cpu.load_bytes(&image(&[0x02a0_0093])).unwrap();

    let fault = cpu.run().unwrap_err();
    assert_eq!(fault, Exception::IllegalInstruction { inst: 0, pc: 4 });
}

#[test]
fn cycle_budget_stops_runaway_programs() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[
        0x0010_0093, // addi x1, x0, 1
        0xffdf_f06f, // jal x0, -4
    ]))
    .unwrap();

    let fault = cpu.run_for(10).unwrap_err();
    assert_eq!(fault, Exception::CycleBudgetExhausted { cycles: 10 });
}

#[test]
fn bounded_run_still_halts_within_budget() {
    let mut cpu = Cpu::new(64 * 1024);
    cpu.load_bytes(&image(&[0x0010_0093, HALT])).unwrap();

    cpu.run_for(10).unwrap();
    assert_eq!(cpu.get_register(1), 1);
}

#[test]
fn load_program_from_file() {
    let path = std::env::temp_dir().join("rv32-core-load-program-test.bin");
    std::fs::write(&path, image(&[0x02a0_0093, HALT])).unwrap();

    let mut cpu = Cpu::new(64 * 1024);
    let loaded = cpu.load_program(&path).unwrap();
    assert_eq!(loaded, 8);

    cpu.run().unwrap();
    assert_eq!(cpu.get_register(1), 42);

    std::fs::remove_file(&path).ok();
}

#[test]
fn load_program_missing_file_is_an_io_error() {
    let mut cpu = Cpu::new(64 * 1024);
    assert!(cpu
        .load_program("/nonexistent/rv32-core-no-such-file.bin")
        .is_err());
}

#[test]
fn oversized_image_is_rejected() {
    let mut cpu = Cpu::new(16);
    let fault = cpu.load_bytes(&[0u8; 32]).unwrap_err();
    assert_eq!(fault, Exception::OutOfBounds { addr: 0, width: 32 });
}
