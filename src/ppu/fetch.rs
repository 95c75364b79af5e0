/*!
Background tile fetch: the 8-dot microsequence and the v increments.

On every rendering scanline (pre-render included) dots 1-256 and 321-336
run the same four-phase fetch against the live address `v`:

  dot%8 == 1  nametable byte        $2000 | (v & $0FFF)
  dot%8 == 3  attribute byte        $23C0 | nametable/quadrant bits of v
  dot%8 == 5  pattern low plane     bg_table + tile*16 + fine_y
  dot%8 == 7  pattern high plane    (+8), then compose the tile row
  dot%8 == 0  increment coarse X (and Y at dot 256)

A composed row is eight 4-bit palette indices (attribute quadrant in the
high two bits, pattern bits below; zero means transparent) pushed onto a
small queue. Dots 321-336 prefetch the first two tiles of the next line,
so the queue is always one tile ahead of the pixels being emitted and
fine-X can spill into the following tile.
*/

use crate::ppu::Ppu;
use crate::ppu_bus::ChrBus;

/// One composed tile row: eight 4-bit palette indices.
pub(crate) type TileRow = [u8; 8];

/// Fixed-capacity FIFO of composed tile rows. Depth never exceeds three
/// in normal operation (two prefetched plus one in-flight).
#[derive(Debug, Clone)]
pub(crate) struct TileQueue {
    rows: [TileRow; 4],
    head: usize,
    len: usize,
}

impl TileQueue {
    pub(crate) fn new() -> Self {
        Self {
            rows: [[0; 8]; 4],
            head: 0,
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, row: TileRow) {
        if self.len == self.rows.len() {
            // Queue overrun only happens if rendering is toggled
            // mid-line; drop the oldest entry.
            self.head = (self.head + 1) % self.rows.len();
            self.len -= 1;
        }
        let tail = (self.head + self.len) % self.rows.len();
        self.rows[tail] = row;
        self.len += 1;
    }

    /// Remove and return the front row, or a transparent row if empty.
    pub(crate) fn pop(&mut self) -> TileRow {
        if self.len == 0 {
            return [0; 8];
        }
        let row = self.rows[self.head];
        self.head = (self.head + 1) % self.rows.len();
        self.len -= 1;
        row
    }

    /// Peek the front row without consuming it.
    pub(crate) fn peek(&self) -> TileRow {
        if self.len == 0 { [0; 8] } else { self.rows[self.head] }
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.head = 0;
    }
}

impl Ppu {
    /// One dot of the fetch microsequence. Only called while rendering is
    /// enabled and the dot lies in a fetch region.
    pub(crate) fn fetch_step<C: ChrBus>(&mut self, chr: &C) {
        match self.dot % 8 {
            1 => {
                self.nt_latch = self.vram_read(0x2000 | (self.v & 0x0FFF), chr);
            }
            3 => {
                let attr_addr = 0x23C0
                    | (self.v & 0x0C00)
                    | ((self.v >> 4) & 0x38)
                    | ((self.v >> 2) & 0x07);
                let attr = self.vram_read(attr_addr, chr);
                // Quadrant select: bit 1 of coarse Y and bit 1 of coarse X.
                let shift = ((self.v >> 4) & 0x04) | (self.v & 0x02);
                self.at_latch = (attr >> shift) & 0x03;
            }
            5 => {
                self.pat_lo_latch = chr.chr_read(self.pattern_row_addr());
            }
            7 => {
                let hi = chr.chr_read(self.pattern_row_addr() + 8);
                let lo = self.pat_lo_latch;
                let quad = self.at_latch << 2;
                let mut row: TileRow = [0; 8];
                for (i, px) in row.iter_mut().enumerate() {
                    let bit = 7 - i;
                    let pix = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
                    *px = if pix == 0 { 0 } else { quad | pix };
                }
                self.tiles.push(row);
            }
            0 => {
                self.increment_coarse_x();
                if self.dot == 256 {
                    self.increment_y();
                }
            }
            _ => {}
        }
    }

    #[inline]
    fn pattern_row_addr(&self) -> u16 {
        let fine_y = (self.v >> 12) & 0x07;
        self.bg_pattern_base() + (self.nt_latch as u16) * 16 + fine_y
    }

    /// Coarse X increment with nametable wrap at column 31.
    pub(crate) fn increment_coarse_x(&mut self) {
        if (self.v & 0x001F) == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Fine/coarse Y increment. Row 29 wraps to 0 and flips the vertical
    /// nametable; rows 30-31 (attribute territory) wrap without flipping.
    pub(crate) fn increment_y(&mut self) {
        if (self.v & 0x7000) != 0x7000 {
            self.v += 0x1000;
        } else {
            self.v &= !0x7000;
            let mut coarse_y = (self.v >> 5) & 0x001F;
            if coarse_y == 29 {
                coarse_y = 0;
                self.v ^= 0x0800;
            } else if coarse_y == 31 {
                coarse_y = 0;
            } else {
                coarse_y += 1;
            }
            self.v = (self.v & !0x03E0) | (coarse_y << 5);
        }
    }

    /// Dot 257: reload the horizontal bits of v from t.
    pub(crate) fn copy_horizontal(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    /// Pre-render dots 280-304: reload the vertical bits of v from t.
    pub(crate) fn copy_vertical(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }
}
