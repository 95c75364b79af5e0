#![doc = r#"
Famicore library crate.

Cycle-stepped NES emulation core: a 2A03 CPU (6502 without decimal mode)
driving a dot-level 2C02 PPU at the NTSC 3:1 tick ratio.

Modules:
- apu: APU register stub and frame IRQ line
- bus: CPU memory map, tick scheduler, and cycle-accurate OAM DMA
- cartridge: iNES v1 loader with NROM PRG/CHR mapping
- controller: NES controller serial shift register
- cpu: 6502 core (state + addressing + table-driven dispatch + execute)
- nes: owned console object tying a Cpu and Bus together
- ppu: PPU registers, background/sprite pixel pipeline, timing state machine
- ppu_bus: ChrBus trait decoupling the PPU from the cartridge

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod nes;
pub mod ppu;
pub mod ppu_bus;

pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeError, Mirroring};
pub use cpu::Cpu;
pub use nes::Nes;

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
