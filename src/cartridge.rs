/*!
iNES (v1) cartridge loading and NROM address mapping.

The loader validates the 16-byte header, skips an optional 512-byte
trainer, and slices out PRG ROM / CHR ROM. Only mapper 0 (NROM) is
supported: PRG is 16 KiB (mirrored across $8000-$FFFF) or 32 KiB
(direct), CHR is an 8 KiB ROM bank or, when the image ships none, an
8 KiB CHR RAM allocation. PRG RAM at $6000-$7FFF is sized from header
byte 8 (0 units means the conventional 8 KiB).

All validation failures surface as `CartridgeError` before the console
ever starts; once a `Cartridge` exists the core treats it as a fully
populated, immutable (ROM) or freely writable (RAM) image and never
re-validates.
*/

use std::fmt;

use crate::ppu_bus::ChrBus;

const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;
const PRG_RAM_UNIT: usize = 8 * 1024;

/// Nametable mirroring arrangement from the cartridge header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Discrete load failures, reported before the core initializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    /// Image shorter than a header or missing the NES<EOF> magic.
    BadHeader,
    /// NES 2.0 images are out of scope for this loader.
    Nes2Unsupported,
    /// Only mapper 0 (NROM) is supported.
    UnsupportedMapper(u8),
    /// Header promised more PRG/CHR data than the image contains.
    Truncated { expected: usize, actual: usize },
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::BadHeader => write!(f, "not an iNES image (bad header)"),
            CartridgeError::Nes2Unsupported => write!(f, "NES 2.0 images are not supported"),
            CartridgeError::UnsupportedMapper(n) => {
                write!(f, "unsupported mapper {n} (only NROM/mapper 0)")
            }
            CartridgeError::Truncated { expected, actual } => {
                write!(f, "image truncated: header promises {expected} bytes, found {actual}")
            }
        }
    }
}

impl std::error::Error for CartridgeError {}

/// A validated NROM cartridge: PRG ROM, optional PRG RAM, CHR ROM or RAM.
#[derive(Debug, Clone)]
pub struct Cartridge {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Cartridge {
    /// Parse an iNES v1 image.
    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, CartridgeError> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != b"NES\x1A" {
            return Err(CartridgeError::BadHeader);
        }

        let flags6 = bytes[6];
        let flags7 = bytes[7];
        if (flags7 & 0x0C) == 0x08 {
            return Err(CartridgeError::Nes2Unsupported);
        }

        let mapper = (flags6 >> 4) | (flags7 & 0xF0);
        if mapper != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper));
        }

        let prg_len = bytes[4] as usize * PRG_UNIT;
        let chr_len = bytes[5] as usize * CHR_UNIT;
        let has_trainer = (flags6 & 0x04) != 0;

        let data_start = HEADER_LEN + if has_trainer { TRAINER_LEN } else { 0 };
        let expected = data_start + prg_len + chr_len;
        if bytes.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let prg_rom = bytes[data_start..data_start + prg_len].to_vec();
        let chr_start = data_start + prg_len;
        let (chr, chr_is_ram) = if chr_len > 0 {
            (bytes[chr_start..chr_start + chr_len].to_vec(), false)
        } else {
            // No CHR ROM in the file: the board carries CHR RAM instead.
            (vec![0; CHR_UNIT], true)
        };

        let mirroring = if (flags6 & 0x08) != 0 {
            Mirroring::FourScreen
        } else if (flags6 & 0x01) != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let prg_ram_units = bytes[8].max(1) as usize;
        let prg_ram = vec![0; prg_ram_units * PRG_RAM_UNIT];

        log::info!(
            "loaded NROM cartridge: PRG {}K, CHR {}K ({}), PRG RAM {}K, {:?} mirroring",
            prg_rom.len() / 1024,
            chr.len() / 1024,
            if chr_is_ram { "RAM" } else { "ROM" },
            prg_ram.len() / 1024,
            mirroring,
        );

        Ok(Self {
            prg_rom,
            prg_ram,
            chr,
            chr_is_ram,
            mirroring,
        })
    }

    #[inline]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// CPU-visible read for $6000-$FFFF.
    pub fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                let idx = (addr as usize - 0x6000) % self.prg_ram.len();
                self.prg_ram[idx]
            }
            0x8000..=0xFFFF => {
                if self.prg_rom.is_empty() {
                    return 0xFF;
                }
                let rel = (addr as usize) - 0x8000;
                // NROM-128 mirrors its single bank into $C000-$FFFF.
                self.prg_rom[rel % self.prg_rom.len()]
            }
            _ => 0xFF,
        }
    }

    /// CPU-visible write for $6000-$FFFF. PRG ROM ignores writes.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        if let 0x6000..=0x7FFF = addr {
            let len = self.prg_ram.len();
            self.prg_ram[(addr as usize - 0x6000) % len] = value;
        }
    }
}

impl ChrBus for Cartridge {
    #[inline]
    fn chr_read(&self, addr: u16) -> u8 {
        self.chr[(addr as usize) & 0x1FFF]
    }

    #[inline]
    fn chr_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            self.chr[(addr as usize) & 0x1FFF] = value;
        }
    }
}
