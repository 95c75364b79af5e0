/*!
ChrBus: the seam between the PPU and cartridge pattern memory.

The PPU owns its nametable RAM, palette RAM, and OAM outright; the only
part of its address space that lives on the cartridge is the pattern table
region ($0000-$1FFF, CHR ROM or RAM). Expressing that one dependency as a
trait keeps the pixel pipeline testable without building a full console,
and keeps the bus out of the PPU's internal address space entirely.

The blanket `Option` impl exists so the bus can hand its possibly-absent
cartridge straight through; with nothing inserted, pattern reads float
to zero and writes are dropped.
*/

/// Pattern-table access as seen from the PPU.
pub trait ChrBus {
    /// Read a byte from the pattern table region ($0000-$1FFF).
    fn chr_read(&self, addr: u16) -> u8;

    /// Write a byte into the pattern table region. Ignored for CHR ROM.
    fn chr_write(&mut self, addr: u16, value: u8);
}

impl<C: ChrBus> ChrBus for Option<C> {
    #[inline]
    fn chr_read(&self, addr: u16) -> u8 {
        self.as_ref().map_or(0, |c| c.chr_read(addr))
    }

    #[inline]
    fn chr_write(&mut self, addr: u16, value: u8) {
        if let Some(c) = self.as_mut() {
            c.chr_write(addr, value);
        }
    }
}

/// Flat 8 KiB pattern memory for PPU unit tests.
#[cfg(test)]
pub(crate) struct MockChr {
    pub pattern: Vec<u8>,
}

#[cfg(test)]
impl MockChr {
    pub(crate) fn new() -> Self {
        Self {
            pattern: vec![0; 0x2000],
        }
    }

    /// Fill one 16-byte tile in pattern table `table` (0 or 1).
    pub(crate) fn set_tile(
        &mut self,
        table: usize,
        tile: usize,
        rows_lo: [u8; 8],
        rows_hi: [u8; 8],
    ) {
        let base = table * 0x1000 + tile * 16;
        self.pattern[base..base + 8].copy_from_slice(&rows_lo);
        self.pattern[base + 8..base + 16].copy_from_slice(&rows_hi);
    }
}

#[cfg(test)]
impl ChrBus for MockChr {
    fn chr_read(&self, addr: u16) -> u8 {
        self.pattern[(addr as usize) & 0x1FFF]
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        self.pattern[(addr as usize) & 0x1FFF] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cartridge_reads_zero_and_drops_writes() {
        let mut none: Option<MockChr> = None;
        assert_eq!(none.chr_read(0x0123), 0);
        none.chr_write(0x0123, 0xAA); // must not panic
    }

    #[test]
    fn option_forwards_to_inner() {
        let mut some = Some(MockChr::new());
        some.chr_write(0x0042, 0x99);
        assert_eq!(some.chr_read(0x0042), 0x99);
    }
}
