/*!
System bus: CPU address decoding, clock fan-out, and the OAM DMA engine.

The bus owns every device the CPU can see: 2 KiB internal RAM (mirrored
four times below $2000), the PPU register window ($2000-$3FFF, eight
registers mirrored every 8 bytes), the APU/IO block at $4000-$4017, and
the cartridge from $6000 up. Unmapped regions read back $FF (open bus).

`tick` is the single clock entry point: the CPU calls it once per
instruction with the full cycle count, and the bus fans each CPU cycle
out as three PPU dots plus one APU frame-counter step. NMI requests from
the PPU are latched here so the CPU observes them at its next fetch
boundary even though the edge happened mid-instruction.

OAM DMA is a bus-side engine: a $4014 write freezes the CPU and the bus
copies a 256-byte page into PPU OAM one byte per two cycles, plus one or
two alignment cycles depending on write-cycle parity (513 total from an
even cycle, 514 from odd). The write itself lands on the final cycle of
the triggering store, so the engine arms only once that cycle has been
ticked and samples parity there.
*/

use crate::apu::Apu;
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::ppu::Ppu;

const RAM_SIZE: usize = 0x0800;

/// In-flight OAM DMA transfer.
#[derive(Debug, Clone, Copy)]
struct DmaState {
    page: u8,
    /// Alignment cycles still to burn before the first read.
    align: u8,
    /// Next byte index within the page (0..=255).
    index: u16,
    /// Byte fetched on the read half-cycle, pending its write.
    latch: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct Bus {
    ram: [u8; RAM_SIZE],
    pub(crate) ppu: Ppu,
    apu: Apu,
    cartridge: Option<Cartridge>,
    controller1: Controller,
    controller2: Controller,
    dma: Option<DmaState>,
    /// Page requested by a $4014 write whose cycle has not elapsed yet.
    dma_pending: Option<u8>,
    nmi_pending: bool,
    cpu_cycle: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            ppu: Ppu::new(),
            apu: Apu::new(),
            cartridge: None,
            controller1: Controller::new(),
            controller2: Controller::new(),
            dma: None,
            dma_pending: None,
            nmi_pending: false,
            cpu_cycle: 0,
        }
    }

    /// Insert a cartridge and propagate its nametable mirroring to the PPU.
    pub fn attach_cartridge(&mut self, cartridge: Cartridge) {
        self.ppu.set_mirroring(cartridge.mirroring());
        self.cartridge = Some(cartridge);
    }

    #[inline]
    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr as usize) & 0x07FF],
            0x2000..=0x3FFF => self.ppu.read_reg(addr & 0x0007, &self.cartridge),
            0x4015 => self.apu.read_status(),
            0x4016 => self.controller1.read(),
            0x4017 => self.controller2.read(),
            0x4000..=0x4014 => 0,
            0x4018..=0x5FFF => 0xFF,
            0x6000..=0xFFFF => match &self.cartridge {
                Some(cart) => cart.cpu_read(addr),
                None => 0xFF,
            },
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr as usize) & 0x07FF] = value,
            0x2000..=0x3FFF => {
                self.ppu
                    .write_reg(addr & 0x0007, value, &mut self.cartridge);
            }
            0x4014 => self.dma_pending = Some(value),
            // The strobe line is shared: one write latches both ports.
            0x4016 => {
                self.controller1.write_strobe(value);
                self.controller2.write_strobe(value);
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_register(addr, value),
            0x4018..=0x5FFF => {}
            0x6000..=0xFFFF => {
                if let Some(cart) = self.cartridge.as_mut() {
                    cart.cpu_write(addr, value);
                }
            }
        }
    }

    /// Little-endian 16-bit read.
    pub fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Advance the whole machine by `cycles` CPU cycles: each one steps the
    /// DMA engine (if active), runs three PPU dots, latches any NMI edge,
    /// and clocks the APU frame counter.
    pub fn tick(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.cpu_cycle += 1;
            self.dma_cycle();
            for _ in 0..3 {
                self.ppu.tick(&self.cartridge);
            }
            if self.ppu.take_nmi_request() {
                self.nmi_pending = true;
            }
            self.apu.tick(1);
        }
        // A store's write lands on its final cycle, which is the one that
        // was just ticked; the DMA engine arms from that cycle's parity.
        if let Some(page) = self.dma_pending.take() {
            self.begin_dma(page);
        }
    }

    fn begin_dma(&mut self, page: u8) {
        // Parity of the write cycle decides whether one or two alignment
        // cycles precede the transfer.
        let align = 1 + (self.cpu_cycle & 1) as u8;
        self.dma = Some(DmaState {
            page,
            align,
            index: 0,
            latch: None,
        });
        log::trace!(
            "OAM DMA from page {:#04X} at cycle {} ({} stall cycles)",
            page,
            self.cpu_cycle,
            512 + align as u32
        );
    }

    /// One CPU cycle of the DMA engine: burn alignment, then alternate
    /// read and write half-cycles until 256 bytes have landed in OAM.
    fn dma_cycle(&mut self) {
        let Some(mut dma) = self.dma else { return };

        if dma.align > 0 {
            dma.align -= 1;
            self.dma = Some(dma);
            return;
        }

        match dma.latch.take() {
            None => {
                let addr = ((dma.page as u16) << 8) | dma.index;
                dma.latch = Some(self.read(addr));
                self.dma = Some(dma);
            }
            Some(byte) => {
                self.ppu.dma_write(byte);
                dma.index += 1;
                self.dma = if dma.index > 0xFF { None } else { Some(dma) };
            }
        }
    }

    #[inline]
    pub fn dma_active(&self) -> bool {
        self.dma.is_some()
    }

    /// Consume a latched NMI request.
    #[inline]
    pub fn take_nmi_pending(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// Level-sensitive IRQ line (APU frame counter is the only source).
    #[inline]
    pub fn irq_line(&self) -> bool {
        self.apu.irq_asserted()
    }

    #[inline]
    pub fn cpu_cycle(&self) -> u64 {
        self.cpu_cycle
    }

    #[inline]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    #[inline]
    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    /// Player 1 button byte (one bit per `controller::Button`).
    pub fn set_buttons(&mut self, buttons: u8) {
        self.controller1.set_buttons(buttons);
    }

    pub fn set_buttons_p2(&mut self, buttons: u8) {
        self.controller2.set_buttons(buttons);
    }
}
