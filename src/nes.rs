/*!
Console facade: one owned object wiring the CPU to the bus.

`Nes` is the only type most callers need. It owns the CPU and the bus
(which in turn owns the PPU, APU, controllers, and cartridge slot), so
there is exactly one mutable owner of the whole machine and stepping it
never requires shared state.
*/

use crate::bus::Bus;
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::Cpu;

pub struct Nes {
    cpu: Cpu,
    bus: Bus,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    /// A console with nothing in the cartridge slot.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(),
        }
    }

    /// Build a console from an iNES image and run the reset sequence.
    pub fn with_rom(rom: &[u8]) -> Result<Self, CartridgeError> {
        let mut nes = Self::new();
        nes.insert(Cartridge::from_ines_bytes(rom)?);
        Ok(nes)
    }

    /// Insert a cartridge and reset, as a console power cycle would.
    pub fn insert(&mut self, cartridge: Cartridge) {
        self.bus.attach_cartridge(cartridge);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.bus.ppu_mut().reset();
        self.cpu.reset(&mut self.bus);
    }

    /// One CPU dispatch pass (instruction, interrupt, or DMA stall cycle).
    /// Returns the cycles consumed; 0 means the CPU has halted.
    pub fn step(&mut self) -> u32 {
        self.cpu.step(&mut self.bus)
    }

    /// Run until the PPU finishes the current frame. Returns false if the
    /// CPU halted before the frame completed.
    pub fn run_frame(&mut self) -> bool {
        while !self.bus.ppu_mut().take_frame_complete() {
            if self.step() == 0 {
                return false;
            }
        }
        true
    }

    /// RGBA framebuffer of the last rendered frame.
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.ppu().framebuffer()
    }

    /// Player 1 buttons, one bit per `controller::Button`.
    pub fn set_buttons(&mut self, buttons: u8) {
        self.bus.set_buttons(buttons);
    }

    pub fn set_buttons_p2(&mut self, buttons: u8) {
        self.bus.set_buttons_p2(buttons);
    }

    #[inline]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    #[inline]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    #[inline]
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}
