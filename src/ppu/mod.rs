/*!
PPU: dot-sequenced pixel pipeline with CPU-visible registers.

Timing model: `tick` advances exactly one dot. A scanline is 341 dots
(0..=340), a frame is 262 scanlines numbered -1 (pre-render) through 260.
VBlank raises at scanline 241 dot 1 (with an NMI request if enabled) and
clears, together with the sprite flags, at pre-render dot 1. There is no
odd-frame dot skip, so every frame is exactly 262 * 341 dots.

Scrolling uses the v/t/fine_x/w register set: `t` is the CPU-staged
address, `v` the live fetch address. Horizontal bits reload from t at
dot 257 of every rendering line; vertical bits reload during pre-render
dots 280-304.

STRUCTURE:
- `registers`: the $2000-$2007 surface and the v/t/w write latches
- `fetch`: the 8-dot background tile fetch microsequence and v increments
- `renderer`: per-batch pixel composition into the RGBA framebuffer
- `oam_eval`: the secondary-OAM sprite evaluation state machine
- `sprite`: sprite pattern fetch, scanline latches, and pixel lookup
- `palette`: master palette colors and palette RAM index folding

The PPU owns its nametable RAM (2 KiB, arranged per cartridge mirroring),
palette RAM, and OAM. Pattern memory is reached through the `ChrBus`
trait so the pipeline never needs the system bus.
*/

use crate::cartridge::Mirroring;
use crate::ppu_bus::ChrBus;

pub(crate) mod fetch;
pub(crate) mod oam_eval;
pub(crate) mod palette;
pub(crate) mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;

use fetch::TileQueue;
use sprite::SpriteLatch;

/// Screen width in pixels.
pub const NES_WIDTH: usize = 256;
/// Screen height in pixels.
pub const NES_HEIGHT: usize = 240;
/// RGBA bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;

const DOTS_PER_SCANLINE: u16 = 341;
const LAST_SCANLINE: i16 = 260;
const PRE_RENDER_SCANLINE: i16 = -1;
const VBLANK_SCANLINE: i16 = 241;

// PPUSTATUS bits.
const STATUS_VBLANK: u8 = 0x80;
const STATUS_SPRITE_ZERO: u8 = 0x40;
const STATUS_OVERFLOW: u8 = 0x20;

// PPUCTRL bits.
const CTRL_NMI_ENABLE: u8 = 0x80;
const CTRL_SPRITE_16: u8 = 0x20;
const CTRL_BG_TABLE: u8 = 0x10;
const CTRL_SPRITE_TABLE: u8 = 0x08;
const CTRL_INCREMENT_32: u8 = 0x04;

// PPUMASK bits.
const MASK_BG_ENABLE: u8 = 0x08;
const MASK_SPRITE_ENABLE: u8 = 0x10;
const MASK_BG_LEFT: u8 = 0x02;
const MASK_SPRITE_LEFT: u8 = 0x04;

#[derive(Debug, Clone)]
pub struct Ppu {
    // CPU-visible registers
    ctrl: u8,
    mask: u8,
    status: u8,
    oam_addr: u8,

    // Scroll/address register set
    v: u16,
    t: u16,
    fine_x: u8,
    w: bool,
    read_buffer: u8,

    // PPU-owned memories
    ciram: [u8; 0x0800],
    palette: [u8; 32],
    oam: [u8; 256],
    mirroring: Mirroring,

    // Timing
    dot: u16,
    scanline: i16,
    frame: u64,
    frame_complete: bool,
    nmi_request: bool,

    // Background fetch latches and the composed-tile queue
    nt_latch: u8,
    at_latch: u8,
    pat_lo_latch: u8,
    tiles: TileQueue,

    // Sprite pipeline
    secondary_oam: [u8; 32],
    eval_count: u8,
    eval_zero: bool,
    pending: [SpriteLatch; 8],
    pending_count: u8,
    scan: [SpriteLatch; 8],
    scan_count: u8,

    framebuffer: Vec<u8>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            ctrl: 0,
            mask: 0,
            status: 0,
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            w: false,
            // Power-up signature: the open-bus low bits of the first
            // $2002 read come back with bit 4 set.
            read_buffer: 0x10,
            ciram: [0; 0x0800],
            palette: [0; 32],
            oam: [0; 256],
            mirroring: Mirroring::Horizontal,
            dot: 0,
            scanline: PRE_RENDER_SCANLINE,
            frame: 0,
            frame_complete: false,
            nmi_request: false,
            nt_latch: 0,
            at_latch: 0,
            pat_lo_latch: 0,
            tiles: TileQueue::new(),
            secondary_oam: [0xFF; 32],
            eval_count: 0,
            eval_zero: false,
            pending: [SpriteLatch::default(); 8],
            pending_count: 0,
            scan: [SpriteLatch::default(); 8],
            scan_count: 0,
            framebuffer: vec![0; NES_WIDTH * NES_HEIGHT * BYTES_PER_PIXEL],
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            mirroring: self.mirroring,
            ..Self::new()
        };
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    /// Advance one dot.
    pub fn tick<C: ChrBus>(&mut self, chr: &C) {
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > LAST_SCANLINE {
                self.scanline = PRE_RENDER_SCANLINE;
                self.frame += 1;
                self.frame_complete = true;
            }
        }

        let rendering = self.rendering_enabled();

        match self.scanline {
            PRE_RENDER_SCANLINE => {
                if self.dot == 1 {
                    self.status &= !(STATUS_VBLANK | STATUS_SPRITE_ZERO | STATUS_OVERFLOW);
                    self.pending_count = 0;
                    self.scan_count = 0;
                }
                if rendering {
                    self.background_dot(chr, false);
                    if (280..=304).contains(&self.dot) {
                        self.copy_vertical();
                    }
                }
            }
            0..=239 => {
                if self.dot == 1 {
                    self.promote_pending_sprites();
                }
                if rendering {
                    self.evaluate_sprites_dot();
                }
                self.background_dot(chr, true);
                if rendering && self.dot == 257 {
                    self.fetch_sprites(chr);
                }
            }
            VBLANK_SCANLINE => {
                if self.dot == 1 {
                    self.status |= STATUS_VBLANK;
                    if (self.ctrl & CTRL_NMI_ENABLE) != 0 {
                        self.nmi_request = true;
                    }
                    log::trace!("vblank start, frame {}", self.frame);
                }
            }
            _ => {}
        }
    }

    /// One dot of the background pipeline: fetch microsequence plus, on
    /// visible lines, pixel emission at the end of each 8-dot batch.
    fn background_dot<C: ChrBus>(&mut self, chr: &C, visible: bool) {
        let rendering = self.rendering_enabled();
        let in_fetch_region =
            (1..=256).contains(&self.dot) || (321..=336).contains(&self.dot);

        if rendering && in_fetch_region {
            self.fetch_step(chr);
        }

        if visible && self.dot >= 8 && self.dot <= 256 && self.dot % 8 == 0 {
            self.emit_batch();
        }

        if rendering && self.dot == 257 {
            self.copy_horizontal();
            self.tiles.clear();
        }
    }

    // ---------------------------------------------------------------
    // PPU address space ($0000-$3FFF as seen through $2006/$2007 and
    // the fetch pipeline)
    // ---------------------------------------------------------------

    pub(crate) fn vram_read<C: ChrBus>(&self, addr: u16, chr: &C) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => chr.chr_read(addr),
            0x2000..=0x3EFF => self.ciram[self.mirror_nametable(addr)],
            0x3F00..=0x3FFF => self.palette[palette::fold_index(addr)],
            _ => unreachable!(),
        }
    }

    pub(crate) fn vram_write<C: ChrBus>(&mut self, addr: u16, value: u8, chr: &mut C) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => chr.chr_write(addr, value),
            0x2000..=0x3EFF => self.ciram[self.mirror_nametable(addr)] = value,
            0x3F00..=0x3FFF => self.palette[palette::fold_index(addr)] = value,
            _ => unreachable!(),
        }
    }

    /// Fold a $2000-$3EFF address into the 2 KiB CIRAM per the cartridge
    /// mirroring arrangement.
    fn mirror_nametable(&self, addr: u16) -> usize {
        let rel = (addr as usize) & 0x0FFF;
        let table = rel / 0x0400;
        let offset = rel & 0x03FF;
        let bank = match self.mirroring {
            Mirroring::Horizontal => [0, 0, 1, 1][table],
            Mirroring::Vertical => [0, 1, 0, 1][table],
            // Four-screen boards carry extra VRAM; with only the internal
            // 2 KiB we fall back to a straight fold.
            Mirroring::FourScreen => table & 1,
        };
        bank * 0x0400 + offset
    }

    // ---------------------------------------------------------------
    // Small derived views of the control registers
    // ---------------------------------------------------------------

    #[inline]
    fn rendering_enabled(&self) -> bool {
        (self.mask & (MASK_BG_ENABLE | MASK_SPRITE_ENABLE)) != 0
    }

    #[inline]
    fn sprite_height(&self) -> u8 {
        if (self.ctrl & CTRL_SPRITE_16) != 0 { 16 } else { 8 }
    }

    #[inline]
    fn bg_pattern_base(&self) -> u16 {
        if (self.ctrl & CTRL_BG_TABLE) != 0 { 0x1000 } else { 0 }
    }

    #[inline]
    fn sprite_pattern_base(&self) -> u16 {
        if (self.ctrl & CTRL_SPRITE_TABLE) != 0 { 0x1000 } else { 0 }
    }

    #[inline]
    fn vram_increment(&self) -> u16 {
        if (self.ctrl & CTRL_INCREMENT_32) != 0 { 32 } else { 1 }
    }

    // ---------------------------------------------------------------
    // External observation points
    // ---------------------------------------------------------------

    /// Read-only RGBA framebuffer. Backdrop-only pixels carry alpha 0,
    /// rendered pixels alpha 0xFF.
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    pub fn take_nmi_request(&mut self) -> bool {
        std::mem::take(&mut self.nmi_request)
    }

    #[inline]
    pub fn dot(&self) -> u16 {
        self.dot
    }

    #[inline]
    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn vblank(&self) -> bool {
        (self.status & STATUS_VBLANK) != 0
    }

    #[inline]
    pub fn sprite_zero_hit(&self) -> bool {
        (self.status & STATUS_SPRITE_ZERO) != 0
    }

    #[inline]
    pub fn sprite_overflow(&self) -> bool {
        (self.status & STATUS_OVERFLOW) != 0
    }

    #[inline]
    pub fn oam_byte(&self, index: u8) -> u8 {
        self.oam[index as usize]
    }

    #[cfg(test)]
    pub(crate) fn vram_v(&self) -> u16 {
        self.v
    }

    #[cfg(test)]
    pub(crate) fn vram_t(&self) -> u16 {
        self.t
    }

    #[cfg(test)]
    pub(crate) fn fine_x(&self) -> u8 {
        self.fine_x
    }

    #[cfg(test)]
    pub(crate) fn set_vram_v(&mut self, v: u16) {
        self.v = v & 0x7FFF;
    }

    #[cfg(test)]
    pub(crate) fn force_attribute_fetch<C: ChrBus>(&mut self, chr: &C) {
        self.dot = 3;
        self.fetch_step(chr);
    }

    #[cfg(test)]
    pub(crate) fn attribute_latch(&self) -> u8 {
        self.at_latch
    }

    #[cfg(test)]
    pub(crate) fn force_scanline(&mut self, line: i16) {
        self.scanline = line;
    }

    #[cfg(test)]
    pub(crate) fn set_ctrl_for_test(&mut self, value: u8) {
        self.ctrl = value;
    }

    #[cfg(test)]
    pub(crate) fn stage_secondary_sprite(&mut self, slot: u8, y: u8, tile: u8, attr: u8, x: u8) {
        let base = slot as usize * 4;
        self.secondary_oam[base] = y;
        self.secondary_oam[base + 1] = tile;
        self.secondary_oam[base + 2] = attr;
        self.secondary_oam[base + 3] = x;
        if slot >= self.eval_count {
            self.eval_count = slot + 1;
        }
        if slot == 0 {
            self.eval_zero = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu_bus::MockChr;

    fn run_dots(ppu: &mut Ppu, chr: &MockChr, n: u64) {
        for _ in 0..n {
            ppu.tick(chr);
        }
    }

    #[test]
    fn scanline_advances_every_341_dots() {
        let mut ppu = Ppu::new();
        let chr = MockChr::new();
        assert_eq!(ppu.scanline(), -1);
        run_dots(&mut ppu, &chr, 341);
        assert_eq!(ppu.scanline(), 0);
        assert_eq!(ppu.dot(), 0);
    }

    #[test]
    fn frame_is_262_scanlines_with_no_dot_skip() {
        let mut ppu = Ppu::new();
        let chr = MockChr::new();
        run_dots(&mut ppu, &chr, 262 * 341 - 1);
        assert!(!ppu.take_frame_complete());
        run_dots(&mut ppu, &chr, 1);
        assert!(ppu.take_frame_complete());
        assert_eq!(ppu.scanline(), -1);
        assert_eq!(ppu.frame(), 1);

        // Second frame is identical in length.
        run_dots(&mut ppu, &chr, 262 * 341);
        assert_eq!(ppu.frame(), 2);
    }

    #[test]
    fn vblank_raises_at_scanline_241_dot_1() {
        let mut ppu = Ppu::new();
        let chr = MockChr::new();
        // Lines -1..=240 plus one dot into 241.
        run_dots(&mut ppu, &chr, 242 * 341);
        assert!(!ppu.vblank());
        run_dots(&mut ppu, &chr, 1);
        assert!(ppu.vblank());
    }

    #[test]
    fn vblank_clears_at_pre_render_dot_1() {
        let mut ppu = Ppu::new();
        let chr = MockChr::new();
        run_dots(&mut ppu, &chr, 242 * 341 + 1);
        assert!(ppu.vblank());
        run_dots(&mut ppu, &chr, 20 * 341); // through line 260 into -1 dot 1
        assert!(!ppu.vblank());
    }

    #[test]
    fn nmi_requested_only_when_enabled() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        run_dots(&mut ppu, &chr, 242 * 341 + 1);
        assert!(!ppu.take_nmi_request());

        let mut ppu = Ppu::new();
        ppu.write_reg(0, 0x80, &mut chr);
        run_dots(&mut ppu, &chr, 242 * 341 + 1);
        assert!(ppu.take_nmi_request());
        assert!(!ppu.take_nmi_request()); // consumed
    }

    #[test]
    fn force_blank_mid_frame_discards_stale_sprite_entries() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        // One vertically-flipped sprite at y=100 through the OAM port.
        ppu.write_reg(3, 0x00, &mut chr);
        for b in [100u8, 0x01, 0x80, 0x20] {
            ppu.write_reg(4, b, &mut chr);
        }
        ppu.write_reg(1, 0x18, &mut chr);

        // Let line 107 evaluate the sprite (its last in-range line),
        // then force-blank after the dot-257 fetch.
        while !(ppu.scanline() == 107 && ppu.dot() == 300) {
            ppu.tick(&chr);
        }
        ppu.write_reg(1, 0x00, &mut chr);

        // Re-enable mid-line, after the dot-65 evaluation reset, so the
        // dot-257 fetch runs against the stale secondary OAM.
        while !(ppu.scanline() == 150 && ppu.dot() == 100) {
            ppu.tick(&chr);
        }
        ppu.write_reg(1, 0x18, &mut chr);
        while !(ppu.scanline() == 151 && ppu.dot() == 2) {
            ppu.tick(&chr);
        }
        assert!(ppu.sprite_pixel(0x22).is_none());
    }

    #[test]
    fn nametable_mirroring_folds_by_arrangement() {
        let mut ppu = Ppu::new();
        ppu.set_mirroring(Mirroring::Horizontal);
        assert_eq!(ppu.mirror_nametable(0x2000), ppu.mirror_nametable(0x2400));
        assert_eq!(ppu.mirror_nametable(0x2800), ppu.mirror_nametable(0x2C00));
        assert_ne!(ppu.mirror_nametable(0x2000), ppu.mirror_nametable(0x2800));

        ppu.set_mirroring(Mirroring::Vertical);
        assert_eq!(ppu.mirror_nametable(0x2000), ppu.mirror_nametable(0x2800));
        assert_eq!(ppu.mirror_nametable(0x2400), ppu.mirror_nametable(0x2C00));
        assert_ne!(ppu.mirror_nametable(0x2000), ppu.mirror_nametable(0x2400));
    }

    #[test]
    fn nametable_region_mirrors_into_3xxx() {
        let mut ppu = Ppu::new();
        let mut chr = MockChr::new();
        ppu.vram_write(0x2005, 0x3C, &mut chr);
        assert_eq!(ppu.vram_read(0x3005, &chr), 0x3C);
    }
}
