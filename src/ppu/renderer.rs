/*!
Pixel composition: background vs sprite priority into the framebuffer.

Pixels are emitted in 8-wide batches at the end of each fetch cycle
(dots 8, 16, .. 256 of visible scanlines), consuming one composed tile
row from the fetch queue. Fine X offsets the read within the row and
spills into the front of the next queued tile, which the prefetch keeps
available.

Composition per pixel: an opaque sprite pixel wins over a transparent
background, a front-priority sprite wins over everything, a
behind-priority sprite loses to opaque background. When both planes are
transparent the backdrop color ($3F00) is written with alpha 0; every
rendered pixel carries alpha 0xFF, so the alpha channel doubles as an
opacity mask.

Sprite zero hit is detected here: an opaque sprite-zero pixel over an
opaque background pixel, both planes enabled, at x < 255.
*/

use crate::ppu::palette::NES_PALETTE;
use crate::ppu::{
    BYTES_PER_PIXEL, MASK_BG_ENABLE, MASK_BG_LEFT, MASK_SPRITE_ENABLE, MASK_SPRITE_LEFT,
    NES_WIDTH, Ppu, STATUS_SPRITE_ZERO,
};

impl Ppu {
    /// Emit the eight pixels of the batch ending at the current dot.
    pub(crate) fn emit_batch(&mut self) {
        let x_base = (self.dot as usize) - 8;
        let y = self.scanline as usize;
        let current = self.tiles.pop();
        let next = self.tiles.peek();
        let bg_on = (self.mask & MASK_BG_ENABLE) != 0;
        let sprites_on = (self.mask & MASK_SPRITE_ENABLE) != 0;

        for i in 0..8 {
            let x = x_base + i;

            let mut bg_pix = 0u8;
            if bg_on && (x >= 8 || (self.mask & MASK_BG_LEFT) != 0) {
                let shifted = i + self.fine_x as usize;
                bg_pix = if shifted < 8 {
                    current[shifted]
                } else {
                    next[shifted - 8]
                };
            }

            let sprite = if sprites_on && (x >= 8 || (self.mask & MASK_SPRITE_LEFT) != 0) {
                self.sprite_pixel(x as u16)
            } else {
                None
            };

            if let Some(s) = &sprite {
                if s.is_zero && bg_pix != 0 && x < 255 && bg_on && sprites_on {
                    self.status |= STATUS_SPRITE_ZERO;
                }
            }

            let (entry, opaque) = match (bg_pix, &sprite) {
                (0, None) => (self.palette[0], false),
                (b, None) => (self.palette[b as usize], true),
                (0, Some(s)) => (self.palette[0x10 + s.palette_offset as usize], true),
                (b, Some(s)) => {
                    if s.behind {
                        (self.palette[b as usize], true)
                    } else {
                        (self.palette[0x10 + s.palette_offset as usize], true)
                    }
                }
            };

            let rgb = NES_PALETTE[(entry & 0x3F) as usize];
            let offset = (y * NES_WIDTH + x) * BYTES_PER_PIXEL;
            self.framebuffer[offset] = rgb[0];
            self.framebuffer[offset + 1] = rgb[1];
            self.framebuffer[offset + 2] = rgb[2];
            self.framebuffer[offset + 3] = if opaque { 0xFF } else { 0x00 };
        }
    }
}
