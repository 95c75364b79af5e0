/*!
Headless runner: load an iNES ROM (or a built-in demo), emulate a number
of frames, and report the final machine state.
*/

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use famicore::Nes;

#[derive(Parser, Debug)]
#[command(name = "famicore", about = "Headless NES emulation core runner")]
struct Args {
    /// Path to an iNES (.nes) ROM. Runs a built-in demo when omitted.
    rom: Option<PathBuf>,

    /// Number of frames to emulate.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Player 1 button byte held for the whole run
    /// (bit 0 = A .. bit 7 = Right).
    #[arg(long, default_value_t = 0)]
    buttons: u8,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let rom = match &args.rom {
        Some(path) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("cannot read {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => demo_rom(),
    };

    let mut nes = match Nes::with_rom(&rom) {
        Ok(nes) => nes,
        Err(err) => {
            eprintln!("failed to load ROM: {err}");
            return ExitCode::FAILURE;
        }
    };
    nes.set_buttons(args.buttons);

    for frame in 0..args.frames {
        if !nes.run_frame() {
            eprintln!("CPU halted during frame {frame}");
            return ExitCode::FAILURE;
        }
    }

    let state = nes.cpu().state();
    let opaque = nes
        .framebuffer()
        .chunks_exact(4)
        .filter(|px| px[3] != 0)
        .count();
    println!(
        "ran {} frames ({} instructions): pc={:#06X} a={:#04X} x={:#04X} y={:#04X} \
         sp={:#04X} p={:#04X}",
        args.frames,
        nes.cpu().instructions_retired(),
        state.pc,
        state.a,
        state.x,
        state.y,
        state.sp,
        state.status,
    );
    println!("final frame: {opaque} opaque pixels");
    ExitCode::SUCCESS
}

/// A minimal NROM image with CHR RAM: paints one tile into the top-left
/// corner and idles.
fn demo_rom() -> Vec<u8> {
    #[rustfmt::skip]
    let program: &[u8] = &[
        // Palette: $3F00 = $21, $3F01 = $16.
        0xA9, 0x3F, 0x8D, 0x06, 0x20,
        0xA9, 0x00, 0x8D, 0x06, 0x20,
        0xA9, 0x21, 0x8D, 0x07, 0x20,
        0xA9, 0x16, 0x8D, 0x07, 0x20,
        // CHR RAM tile 1, low plane: eight solid rows.
        0xA9, 0x00, 0x8D, 0x06, 0x20,
        0xA9, 0x10, 0x8D, 0x06, 0x20,
        0xA2, 0x08,
        0xA9, 0xFF, 0x8D, 0x07, 0x20,
        0xCA,
        0xD0, 0xFA,
        // Nametable (0,0) = tile 1.
        0xA9, 0x20, 0x8D, 0x06, 0x20,
        0xA9, 0x00, 0x8D, 0x06, 0x20,
        0xA9, 0x01, 0x8D, 0x07, 0x20,
        // Enable background rendering including the left column.
        0xA9, 0x0A, 0x8D, 0x01, 0x20,
        // Idle loop at $803C.
        0x4C, 0x3C, 0x80,
    ];

    let mut rom = vec![0u8; 16];
    rom[0..4].copy_from_slice(b"NES\x1A");
    rom[4] = 1; // one 16K PRG bank
    rom[5] = 0; // CHR RAM
    rom[8] = 1;
    rom.resize(16 + 16 * 1024, 0);
    rom[16..16 + program.len()].copy_from_slice(program);
    // Vectors: NMI and IRQ park on the idle loop, reset enters at $8000.
    rom[16 + 0x3FFA] = 0x3C;
    rom[16 + 0x3FFB] = 0x80;
    rom[16 + 0x3FFC] = 0x00;
    rom[16 + 0x3FFD] = 0x80;
    rom[16 + 0x3FFE] = 0x3C;
    rom[16 + 0x3FFF] = 0x80;
    rom
}
