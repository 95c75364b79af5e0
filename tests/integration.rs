//! End-to-end tests driving the console through its public API with
//! small hand-assembled NROM images.

use famicore::Nes;
use famicore::cpu::table;
use famicore::ppu::{BYTES_PER_PIXEL, NES_HEIGHT, NES_WIDTH};

const HEADER_LEN: usize = 16;
const PRG_BANK: usize = 16 * 1024;

/// NROM-128 image: `prg` at $8000, (reset, nmi, irq) vectors.
fn nrom(prg: &[u8], vectors: (u16, u16, u16)) -> Vec<u8> {
    let mut rom = vec![0u8; HEADER_LEN];
    rom[0..4].copy_from_slice(b"NES\x1A");
    rom[4] = 1;
    rom[5] = 1;
    rom[8] = 1;
    rom.resize(HEADER_LEN + PRG_BANK + 8 * 1024, 0);
    rom[HEADER_LEN..HEADER_LEN + prg.len()].copy_from_slice(prg);
    let (reset, nmi, irq) = vectors;
    let mut put = |offset: usize, word: u16| {
        rom[HEADER_LEN + offset] = word as u8;
        rom[HEADER_LEN + offset + 1] = (word >> 8) as u8;
    };
    put(0x3FFA, nmi);
    put(0x3FFC, reset);
    put(0x3FFE, irq);
    rom
}

#[test]
fn reset_enters_at_the_reset_vector_and_executes() {
    #[rustfmt::skip]
    let prg = [
        0xA9, 0x42,       // LDA #$42
        0x85, 0x10,       // STA $10
        0x4C, 0x04, 0x80, // JMP $8004 (idle)
    ];
    let rom = nrom(&prg, (0x8000, 0x8004, 0x8004));
    let mut nes = Nes::with_rom(&rom).unwrap();
    assert_eq!(nes.cpu().pc(), 0x8000);
    nes.step();
    nes.step();
    assert_eq!(nes.bus_mut().read(0x0010), 0x42);
}

#[test]
fn instruction_trace_follows_the_program_flow() {
    #[rustfmt::skip]
    let prg = [
        0x4C, 0x05, 0x80, // $8000 JMP $8005
        0xEA, 0xEA,
        0xA2, 0x07,       // $8005 LDX #$07
        0x8A,             // $8007 TXA
        0x48,             // $8008 PHA
        0x4C, 0x09, 0x80, // $8009 JMP $8009 (idle)
    ];
    let rom = nrom(&prg, (0x8000, 0x8009, 0x8009));
    let mut nes = Nes::with_rom(&rom).unwrap();

    let mut trace = Vec::new();
    for _ in 0..4 {
        let pc = nes.cpu().pc();
        let opcode = nes.bus_mut().read(pc);
        trace.push((pc, table::mnemonic(opcode)));
        nes.step();
    }
    assert_eq!(
        trace,
        vec![
            (0x8000, "JMP"),
            (0x8005, "LDX"),
            (0x8007, "TXA"),
            (0x8008, "PHA"),
        ]
    );
    assert_eq!(nes.cpu().state().a, 0x07);
    assert_eq!(nes.cpu().state().x, 0x07);
    assert_eq!(nes.cpu().instructions_retired(), 4);
}

#[test]
fn nmi_fires_once_per_frame_when_enabled() {
    #[rustfmt::skip]
    let prg_main = [
        0xA9, 0x80,       // LDA #$80
        0x8D, 0x00, 0x20, // STA $2000 (enable NMI)
        0x4C, 0x05, 0x80, // JMP $8005 (idle)
    ];
    // NMI handler at $9000: INC $00, RTI.
    let handler = [0xE6, 0x00, 0x40];

    let mut rom = nrom(&prg_main, (0x8000, 0x9000, 0x8005));
    rom[HEADER_LEN + 0x1000..HEADER_LEN + 0x1000 + handler.len()].copy_from_slice(&handler);

    let mut nes = Nes::with_rom(&rom).unwrap();
    for expected in 1..=3u8 {
        assert!(nes.run_frame());
        assert_eq!(nes.bus_mut().read(0x0000), expected);
    }
}

#[test]
fn oam_dma_copies_cpu_memory_into_oam() {
    #[rustfmt::skip]
    let prg = [
        0xA2, 0x00,       // LDX #$00
        0x8A,             // TXA
        0x9D, 0x00, 0x02, // STA $0200,X
        0xE8,             // INX
        0xD0, 0xF9,       // BNE $8002
        0xA9, 0x02,       // LDA #$02
        0x8D, 0x14, 0x40, // STA $4014
        0x4C, 0x0E, 0x80, // JMP $800E (idle)
    ];
    let rom = nrom(&prg, (0x8000, 0x800E, 0x800E));
    let mut nes = Nes::with_rom(&rom).unwrap();
    // The fill loop plus the 513/514-cycle DMA stall fit well within
    // 4000 dispatch passes.
    for _ in 0..4000 {
        nes.step();
    }
    assert_eq!(nes.bus().ppu().oam_byte(0x00), 0x00);
    assert_eq!(nes.bus().ppu().oam_byte(0x05), 0x05);
    assert_eq!(nes.bus().ppu().oam_byte(0xFF), 0xFF);
}

#[test]
fn a_frame_renders_the_full_screen_buffer() {
    let prg = [0x4C, 0x00, 0x80]; // JMP $8000
    let rom = nrom(&prg, (0x8000, 0x8000, 0x8000));
    let mut nes = Nes::with_rom(&rom).unwrap();
    assert!(nes.run_frame());
    assert_eq!(
        nes.framebuffer().len(),
        NES_WIDTH * NES_HEIGHT * BYTES_PER_PIXEL
    );
}

#[test]
fn controller_input_is_visible_to_the_program() {
    #[rustfmt::skip]
    let prg = [
        0xA9, 0x01,       // LDA #$01
        0x8D, 0x16, 0x40, // STA $4016 (strobe high)
        0xA9, 0x00,       // LDA #$00
        0x8D, 0x16, 0x40, // STA $4016 (latch)
        0xAD, 0x16, 0x40, // LDA $4016 (A button)
        0x85, 0x20,       // STA $20
        0x4C, 0x0F, 0x80, // JMP $800F (idle)
    ];
    let rom = nrom(&prg, (0x8000, 0x800F, 0x800F));
    let mut nes = Nes::with_rom(&rom).unwrap();
    nes.set_buttons(0x01); // A held
    for _ in 0..8 {
        nes.step();
    }
    assert_eq!(nes.bus_mut().read(0x0020) & 0x01, 0x01);
}
