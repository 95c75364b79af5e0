/*!
Addressing mode resolution.

Every 6502 instruction names its operand through one of the modes below.
`AddrMode::resolve` advances PC past the operand bytes and produces the
effective address plus a page-cross indicator; the dispatch loop decides
whether the cross costs a cycle (the opcode table carries that flag).

Hardware quirks reproduced here:
- Zero Page,X/Y index additions wrap inside page zero.
- (Indirect,X) wraps both the pointer+X addition and the two-byte pointer
  read inside page zero.
- (Indirect),Y reads its pointer from page zero with the same wrap, then
  adds Y to the 16-bit target; the cross compares against the pre-index
  high byte.
- JMP (indirect) with a pointer ending in $FF reads its high byte from the
  start of the same page, not the next one.
*/

use crate::bus::Bus;
use crate::cpu::state::CpuState;

/// The eleven operand addressing modes plus the three operand-free forms
/// (implied, accumulator, relative) the opcode table needs to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

/// A resolved operand location. For Immediate this is the address of the
/// operand byte itself; for Relative it is the branch target.
#[derive(Debug, Clone, Copy)]
pub struct Operand {
    pub addr: u16,
    pub crossed: bool,
}

impl Operand {
    #[inline]
    fn at(addr: u16) -> Self {
        Operand {
            addr,
            crossed: false,
        }
    }
}

#[inline]
fn page_crossed(base: u16, resolved: u16) -> bool {
    (base & 0xFF00) != (resolved & 0xFF00)
}

/// Read a 16-bit pointer from page zero, wrapping at the page boundary.
#[inline]
fn read_word_zp(bus: &mut Bus, addr: u8) -> u16 {
    let lo = bus.read(addr as u16) as u16;
    let hi = bus.read(addr.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

impl AddrMode {
    /// Number of operand bytes the mode consumes after the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            AddrMode::Implied | AddrMode::Accumulator => 0,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::IndirectX
            | AddrMode::IndirectY
            | AddrMode::Relative => 1,
            AddrMode::Absolute | AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::Indirect => {
                2
            }
        }
    }

    /// Resolve the operand at PC, advancing PC past it.
    pub fn resolve(self, cpu: &mut CpuState, bus: &mut Bus) -> Operand {
        match self {
            AddrMode::Implied | AddrMode::Accumulator => Operand::at(0),
            AddrMode::Immediate => {
                let addr = cpu.pc;
                cpu.pc = cpu.pc.wrapping_add(1);
                Operand::at(addr)
            }
            AddrMode::ZeroPage => Operand::at(cpu.fetch_u8(bus) as u16),
            AddrMode::ZeroPageX => {
                let base = cpu.fetch_u8(bus);
                Operand::at(base.wrapping_add(cpu.x) as u16)
            }
            AddrMode::ZeroPageY => {
                let base = cpu.fetch_u8(bus);
                Operand::at(base.wrapping_add(cpu.y) as u16)
            }
            AddrMode::Absolute => Operand::at(cpu.fetch_u16(bus)),
            AddrMode::AbsoluteX => {
                let base = cpu.fetch_u16(bus);
                let addr = base.wrapping_add(cpu.x as u16);
                Operand {
                    addr,
                    crossed: page_crossed(base, addr),
                }
            }
            AddrMode::AbsoluteY => {
                let base = cpu.fetch_u16(bus);
                let addr = base.wrapping_add(cpu.y as u16);
                Operand {
                    addr,
                    crossed: page_crossed(base, addr),
                }
            }
            AddrMode::Indirect => {
                let ptr = cpu.fetch_u16(bus);
                let lo = bus.read(ptr) as u16;
                // High byte wraps within the pointer's page.
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = bus.read(hi_addr) as u16;
                Operand::at((hi << 8) | lo)
            }
            AddrMode::IndirectX => {
                let ptr = cpu.fetch_u8(bus).wrapping_add(cpu.x);
                Operand::at(read_word_zp(bus, ptr))
            }
            AddrMode::IndirectY => {
                let ptr = cpu.fetch_u8(bus);
                let base = read_word_zp(bus, ptr);
                let addr = base.wrapping_add(cpu.y as u16);
                Operand {
                    addr,
                    crossed: page_crossed(base, addr),
                }
            }
            AddrMode::Relative => {
                let offset = cpu.fetch_u8(bus) as i8;
                let base = cpu.pc;
                let addr = base.wrapping_add(offset as u16);
                Operand {
                    addr,
                    crossed: page_crossed(base, addr),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CpuState, Bus) {
        let mut cpu = CpuState::new();
        cpu.pc = 0x0200; // run the operand stream out of RAM
        (cpu, Bus::new())
    }

    fn put(bus: &mut Bus, addr: u16, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            bus.write(addr.wrapping_add(i as u16), *b);
        }
    }

    #[test]
    fn zero_page_indexed_wraps_in_page_zero() {
        let (mut cpu, mut bus) = setup();
        cpu.x = 0x10;
        put(&mut bus, 0x0200, &[0xF8]);
        let op = AddrMode::ZeroPageX.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0x0008);
        assert!(!op.crossed);
    }

    #[test]
    fn absolute_x_reports_page_cross() {
        let (mut cpu, mut bus) = setup();
        cpu.x = 0x01;
        put(&mut bus, 0x0200, &[0xFF, 0x02]); // $02FF + 1 = $0300
        let op = AddrMode::AbsoluteX.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0x0300);
        assert!(op.crossed);

        cpu.pc = 0x0200;
        cpu.x = 0x00;
        let op = AddrMode::AbsoluteX.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0x02FF);
        assert!(!op.crossed);
    }

    #[test]
    fn indirect_y_crosses_on_post_index() {
        let (mut cpu, mut bus) = setup();
        cpu.y = 0x02;
        put(&mut bus, 0x0200, &[0x40]);
        put(&mut bus, 0x0040, &[0xFF, 0x02]); // pointer -> $02FF
        let op = AddrMode::IndirectY.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0x0301);
        assert!(op.crossed);
    }

    #[test]
    fn indirect_x_pointer_read_wraps() {
        let (mut cpu, mut bus) = setup();
        cpu.x = 0x01;
        put(&mut bus, 0x0200, &[0xFE]); // 0xFE + X = 0xFF
        bus.write(0x00FF, 0x34);
        bus.write(0x0000, 0x12); // high byte wraps to $00
        let op = AddrMode::IndirectX.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0x1234);
    }

    #[test]
    fn jmp_indirect_page_wrap_bug() {
        let (mut cpu, mut bus) = setup();
        put(&mut bus, 0x0200, &[0xFF, 0x02]); // pointer at $02FF
        bus.write(0x02FF, 0x78);
        bus.write(0x0200, 0xFF); // already 0xFF; high byte comes from $0200
        let op = AddrMode::Indirect.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0xFF78);
    }

    #[test]
    fn relative_resolves_signed_target_and_cross() {
        let (mut cpu, mut bus) = setup();
        put(&mut bus, 0x0200, &[0x80]); // -128 from $0201
        let op = AddrMode::Relative.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0x0181);
        assert!(op.crossed);

        cpu.pc = 0x0200;
        put(&mut bus, 0x0200, &[0x05]);
        let op = AddrMode::Relative.resolve(&mut cpu, &mut bus);
        assert_eq!(op.addr, 0x0206);
        assert!(!op.crossed);
    }
}
