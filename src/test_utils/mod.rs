/*!
Shared builders for in-memory iNES images used across unit tests.
*/

const HEADER_LEN: usize = 16;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;

/// A zero-filled iNES v1 image with the given header fields.
pub fn ines_image(
    prg_units: u8,
    chr_units: u8,
    flags6: u8,
    flags7: u8,
    prg_ram_units: u8,
) -> Vec<u8> {
    let mut rom = vec![0u8; HEADER_LEN];
    rom[0..4].copy_from_slice(b"NES\x1A");
    rom[4] = prg_units;
    rom[5] = chr_units;
    rom[6] = flags6;
    rom[7] = flags7;
    rom[8] = prg_ram_units;
    rom.resize(
        HEADER_LEN + prg_units as usize * PRG_UNIT + chr_units as usize * CHR_UNIT,
        0,
    );
    rom
}

/// NROM-128 image with `prg` placed at $8000 and optional
/// (reset, nmi, irq) vectors.
pub fn nrom_with_prg(prg: &[u8], chr_units: u8, vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(prg.len() <= PRG_UNIT);
    let mut rom = ines_image(1, chr_units, 0x00, 0x00, 1);
    rom[HEADER_LEN..HEADER_LEN + prg.len()].copy_from_slice(prg);
    if let Some((reset, nmi, irq)) = vectors {
        let put = |rom: &mut Vec<u8>, offset: usize, word: u16| {
            rom[HEADER_LEN + offset] = word as u8;
            rom[HEADER_LEN + offset + 1] = (word >> 8) as u8;
        };
        put(&mut rom, 0x3FFA, nmi);
        put(&mut rom, 0x3FFC, reset);
        put(&mut rom, 0x3FFE, irq);
    }
    rom
}
