/*!
CPU-visible register surface ($2000-$2007) and the shared write toggle.

$2005 and $2006 stage into `t` through the two-write latch `w`; only the
second $2006 write copies `t` into the live address `v`. Reading $2002
clears both the vblank flag and `w`, which is why polling loops re-arm
the scroll latch as a side effect.
*/

use crate::ppu::Ppu;
use crate::ppu::{CTRL_NMI_ENABLE, STATUS_VBLANK};
use crate::ppu_bus::ChrBus;

impl Ppu {
    /// Read one of the eight registers (`reg` is the address modulo 8).
    pub fn read_reg<C: ChrBus>(&mut self, reg: u16, chr: &C) -> u8 {
        match reg & 0x0007 {
            // PPUSTATUS: flags in the top bits, stale buffer bits below.
            0x0002 => {
                let value = (self.status & 0xE0) | (self.read_buffer & 0x1F);
                self.status &= !STATUS_VBLANK;
                self.w = false;
                value
            }
            0x0004 => self.oam[self.oam_addr as usize],
            0x0007 => {
                let addr = self.v & 0x3FFF;
                let result = if addr >= 0x3F00 {
                    // Palette reads bypass the buffer; the buffer still
                    // refills from the nametable underneath.
                    self.read_buffer = self.vram_read(addr & 0x2FFF, chr);
                    self.vram_read(addr, chr)
                } else {
                    let stale = self.read_buffer;
                    self.read_buffer = self.vram_read(addr, chr);
                    stale
                };
                self.v = self.v.wrapping_add(self.vram_increment()) & 0x7FFF;
                result
            }
            // Write-only registers read back zero.
            _ => 0,
        }
    }

    /// Write one of the eight registers (`reg` is the address modulo 8).
    pub fn write_reg<C: ChrBus>(&mut self, reg: u16, value: u8, chr: &mut C) {
        match reg & 0x0007 {
            0x0000 => {
                let was_enabled = (self.ctrl & CTRL_NMI_ENABLE) != 0;
                self.ctrl = value;
                self.t = (self.t & !0x0C00) | (((value as u16) & 0x03) << 10);
                // Enabling NMI while vblank is already set fires immediately.
                let now_enabled = (self.ctrl & CTRL_NMI_ENABLE) != 0;
                if !was_enabled && now_enabled && (self.status & STATUS_VBLANK) != 0 {
                    self.nmi_request = true;
                }
            }
            0x0001 => self.mask = value,
            0x0002 => {}
            0x0003 => self.oam_addr = value,
            0x0004 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            0x0005 => {
                if !self.w {
                    self.t = (self.t & !0x001F) | ((value as u16) >> 3);
                    self.fine_x = value & 0x07;
                } else {
                    self.t = (self.t & !0x73E0)
                        | (((value as u16) & 0x07) << 12)
                        | (((value as u16) >> 3) << 5);
                }
                self.w = !self.w;
            }
            0x0006 => {
                if !self.w {
                    self.t = (self.t & 0x00FF) | (((value as u16) & 0x3F) << 8);
                } else {
                    self.t = (self.t & 0x7F00) | (value as u16);
                    self.v = self.t;
                }
                self.w = !self.w;
            }
            0x0007 => {
                self.vram_write(self.v & 0x3FFF, value, chr);
                self.v = self.v.wrapping_add(self.vram_increment()) & 0x7FFF;
            }
            _ => unreachable!(),
        }
    }

    /// OAM DMA port: one byte per DMA write cycle, advancing OAMADDR.
    pub fn dma_write(&mut self, value: u8) {
        self.oam[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use crate::ppu::Ppu;
    use crate::ppu_bus::MockChr;

    #[test]
    fn power_on_status_reads_back_bit_4() {
        let mut ppu = Ppu::new();
        let chr = MockChr::new();
        // Vblank clear, sprite flags clear, open-bus signature below.
        assert_eq!(ppu.read_reg(2, &chr), 0x10);
    }

    #[test]
    fn scroll_writes_compose_t_and_fine_x() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(5, 0x7D, &mut chr); // X = 0b01111_101
        assert_eq!(ppu.vram_t() & 0x001F, 0x0F);
        assert_eq!(ppu.fine_x(), 0x05);
        ppu.write_reg(5, 0x5E, &mut chr); // Y = 0b01011_110
        assert_eq!((ppu.vram_t() >> 5) & 0x001F, 0x0B);
        assert_eq!((ppu.vram_t() >> 12) & 0x0007, 0x06);
    }

    #[test]
    fn addr_writes_load_v_on_second_byte() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(6, 0x21, &mut chr);
        assert_eq!(ppu.vram_v(), 0); // not yet
        ppu.write_reg(6, 0x08, &mut chr);
        assert_eq!(ppu.vram_v(), 0x2108);
    }

    #[test]
    fn status_read_clears_vblank_and_write_toggle() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(6, 0x21, &mut chr); // w now set
        // Force vblank via the timing path.
        for _ in 0..(242 * 341 + 1) {
            ppu.tick(&chr);
        }
        let status = ppu.read_reg(2, &chr);
        assert_ne!(status & 0x80, 0);
        assert!(!ppu.vblank());
        // w was reset, so the next $2006 write is the high byte again.
        ppu.write_reg(6, 0x3F, &mut chr);
        ppu.write_reg(6, 0x00, &mut chr);
        assert_eq!(ppu.vram_v(), 0x3F00);
    }

    #[test]
    fn ctrl_write_sets_nametable_bits_of_t() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(0, 0x03, &mut chr);
        assert_eq!(ppu.vram_t() & 0x0C00, 0x0C00);
        ppu.write_reg(0, 0x01, &mut chr);
        assert_eq!(ppu.vram_t() & 0x0C00, 0x0400);
    }

    #[test]
    fn data_reads_are_buffered_below_palette() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(6, 0x20, &mut chr);
        ppu.write_reg(6, 0x00, &mut chr);
        ppu.write_reg(7, 0xAA, &mut chr);
        ppu.write_reg(7, 0xBB, &mut chr);
        ppu.write_reg(6, 0x20, &mut chr);
        ppu.write_reg(6, 0x00, &mut chr);
        let first = ppu.read_reg(7, &chr); // stale buffer
        let second = ppu.read_reg(7, &chr);
        let third = ppu.read_reg(7, &chr);
        assert_eq!(first, 0x10); // power-up buffer contents
        assert_eq!(second, 0xAA);
        assert_eq!(third, 0xBB);
    }

    #[test]
    fn palette_reads_bypass_the_buffer() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(6, 0x3F, &mut chr);
        ppu.write_reg(6, 0x00, &mut chr);
        ppu.write_reg(7, 0x21, &mut chr);
        ppu.write_reg(6, 0x3F, &mut chr);
        ppu.write_reg(6, 0x00, &mut chr);
        assert_eq!(ppu.read_reg(7, &chr), 0x21);
    }

    #[test]
    fn data_port_increments_by_1_or_32() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(6, 0x20, &mut chr);
        ppu.write_reg(6, 0x00, &mut chr);
        ppu.write_reg(7, 0x00, &mut chr);
        assert_eq!(ppu.vram_v(), 0x2001);

        ppu.write_reg(0, 0x04, &mut chr); // 32-step mode
        ppu.write_reg(6, 0x20, &mut chr);
        ppu.write_reg(6, 0x00, &mut chr);
        ppu.write_reg(7, 0x00, &mut chr);
        assert_eq!(ppu.vram_v(), 0x2020);
    }

    #[test]
    fn oam_data_port_round_trips() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.write_reg(3, 0x20, &mut chr);
        ppu.write_reg(4, 0x55, &mut chr);
        ppu.write_reg(3, 0x20, &mut chr);
        assert_eq!(ppu.read_reg(4, &chr), 0x55);
        assert_eq!(ppu.oam_byte(0x20), 0x55);
    }
}
