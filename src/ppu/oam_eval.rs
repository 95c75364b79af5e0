/*!
Sprite evaluation: filling secondary OAM for the next scanline.

Runs on visible scanlines while rendering is enabled, interleaved with
the background fetch:

  dots 1-64    clear secondary OAM to $FF, one byte per two dots
  dots 65-256  test one primary OAM entry per two dots against the
               current line; in-range sprites copy into secondary OAM
               until eight slots are full, the ninth sets the overflow
               flag

A sprite is in range when `scanline - Y` falls inside the sprite height,
which is why OAM Y coordinates sit one line above where the sprite
appears: latches filled on line N are displayed on line N+1.
*/

use crate::ppu::{Ppu, STATUS_OVERFLOW};

impl Ppu {
    /// One dot of the evaluation state machine.
    pub(crate) fn evaluate_sprites_dot(&mut self) {
        match self.dot {
            1..=64 => {
                if self.dot % 2 == 0 {
                    self.secondary_oam[(self.dot / 2 - 1) as usize] = 0xFF;
                }
            }
            65 => {
                self.eval_count = 0;
                self.eval_zero = false;
            }
            66..=256 if self.dot % 2 == 0 => {
                let n = ((self.dot - 66) / 2) as usize;
                if n < 64 {
                    self.evaluate_entry(n);
                }
            }
            _ => {}
        }
    }

    fn evaluate_entry(&mut self, n: usize) {
        let y = self.oam[n * 4] as i16;
        let row = self.scanline - y;
        if row < 0 || row >= self.sprite_height() as i16 {
            return;
        }
        if self.eval_count < 8 {
            let slot = self.eval_count as usize;
            self.secondary_oam[slot * 4..slot * 4 + 4]
                .copy_from_slice(&self.oam[n * 4..n * 4 + 4]);
            if n == 0 {
                self.eval_zero = true;
            }
            self.eval_count += 1;
        } else {
            self.status |= STATUS_OVERFLOW;
        }
    }
}
