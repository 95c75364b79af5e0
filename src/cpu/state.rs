/*!
Architectural 6502 register file and the small helpers everything else is
built from.

`CpuState` owns exactly what the programmer-visible machine owns: A, X, Y,
SP, PC, the status byte, and a halted latch for jam opcodes. Decode, timing
and memory routing live in the sibling modules (`table`, `dispatch`, and
the bus).

Status register bit layout:

```text
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C
```

The UNUSED bit (5) always reads as 1. BREAK is only ever 1 in the byte
pushed by PHP/BRK; hardware interrupts push it clear, and PLP/RTI never let
either bit leak into the live register. DECIMAL exists as a flag bit but has
no arithmetic effect on the NES (the 2A03 hardwires BCD off).
*/

use crate::bus::Bus;

/// Processor status flag bit masks.
pub const CARRY: u8 = 0b0000_0001;
pub const ZERO: u8 = 0b0000_0010;
pub const IRQ_DISABLE: u8 = 0b0000_0100;
pub const DECIMAL: u8 = 0b0000_1000; // Togglable but arithmetically inert on the 2A03.
pub const BREAK: u8 = 0b0001_0000;
pub const UNUSED: u8 = 0b0010_0000; // Always set when read.
pub const OVERFLOW: u8 = 0b0100_0000;
pub const NEGATIVE: u8 = 0b1000_0000;

/// Reset and interrupt vector locations.
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Register file for the 2A03 CPU.
///
/// All 8-bit registers wrap mod 256; PC wraps mod 65536; SP wraps freely
/// within the $0100 stack page (the hardware has no overflow notion).
#[derive(Debug, Clone, Copy)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub halted: bool,
}

impl Default for CpuState {
    fn default() -> Self {
        // Power-up: SP=0xFD, IRQs disabled, UNUSED bit set.
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0x0000,
            status: IRQ_DISABLE | UNUSED,
            halted: false,
        }
    }
}

impl CpuState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the register file and load PC from the reset vector.
    pub fn reset(&mut self, bus: &mut Bus) {
        *self = Self::default();
        self.pc = bus.read_word(RESET_VECTOR);
    }

    // ---------------------------------------------------------------------
    // Instruction stream
    // ---------------------------------------------------------------------

    /// Read the byte at PC and advance PC by 1.
    #[inline]
    pub fn fetch_u8(&mut self, bus: &mut Bus) -> u8 {
        let b = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        b
    }

    /// Read a little-endian word at PC and advance PC by 2.
    #[inline]
    pub fn fetch_u16(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.fetch_u8(bus) as u16;
        let hi = self.fetch_u8(bus) as u16;
        (hi << 8) | lo
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------

    #[inline]
    pub fn is_flag_set(&self, mask: u8) -> bool {
        (self.status & mask) != 0
    }

    #[inline]
    pub fn assign_flag(&mut self, mask: u8, value: bool) {
        if value {
            self.status |= mask;
        } else {
            self.status &= !mask;
        }
    }

    /// Update ZERO and NEGATIVE from an 8-bit result.
    #[inline]
    pub fn update_zn(&mut self, result: u8) {
        self.assign_flag(ZERO, result == 0);
        self.assign_flag(NEGATIVE, (result & 0x80) != 0);
    }

    #[inline]
    pub fn update_carry(&mut self, carry: bool) {
        self.assign_flag(CARRY, carry);
    }

    #[inline]
    pub fn update_overflow(&mut self, overflow: bool) {
        self.assign_flag(OVERFLOW, overflow);
    }

    /// Compose the status byte for a stack push. UNUSED is always forced on;
    /// BREAK is set for PHP/BRK pushes and clear for IRQ/NMI pushes.
    #[inline]
    pub fn status_for_push(&self, with_break: bool) -> u8 {
        let base = self.status | UNUSED;
        if with_break { base | BREAK } else { base & !BREAK }
    }

    /// Install a status byte pulled from the stack (PLP/RTI). UNUSED reads
    /// as 1 and BREAK never exists as live state.
    #[inline]
    pub fn set_status_from_pull(&mut self, value: u8) {
        self.status = (value | UNUSED) & !BREAK;
    }

    // ---------------------------------------------------------------------
    // Stack ($0100 page; push post-decrements, pull pre-increments)
    // ---------------------------------------------------------------------

    #[inline]
    pub fn push_u8(&mut self, bus: &mut Bus, value: u8) {
        bus.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    #[inline]
    pub fn pop_u8(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16)
    }

    /// Push a word high byte first, matching JSR/BRK/interrupt order.
    #[inline]
    pub fn push_u16(&mut self, bus: &mut Bus, value: u16) {
        self.push_u8(bus, (value >> 8) as u8);
        self.push_u8(bus, value as u8);
    }

    #[inline]
    pub fn pop_u16(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.pop_u8(bus) as u16;
        let hi = self.pop_u8(bus) as u16;
        (hi << 8) | lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Cartridge;
    use crate::test_utils::nrom_with_prg;

    fn bus_with_reset_vector(target: u16) -> Bus {
        let rom = nrom_with_prg(&[0xEA], 1, Some((target, 0x8000, 0x8000)));
        let cart = Cartridge::from_ines_bytes(&rom).expect("parse cart");
        let mut bus = Bus::new();
        bus.attach_cartridge(cart);
        bus
    }

    #[test]
    fn power_up_defaults() {
        let s = CpuState::new();
        assert_eq!(s.a, 0);
        assert_eq!(s.sp, 0xFD);
        assert!(s.is_flag_set(IRQ_DISABLE));
        assert!(s.is_flag_set(UNUSED));
        assert!(!s.halted);
    }

    #[test]
    fn reset_loads_pc_from_vector() {
        let mut bus = bus_with_reset_vector(0xC123);
        let mut s = CpuState::new();
        s.reset(&mut bus);
        assert_eq!(s.pc, 0xC123);
    }

    #[test]
    fn zn_update() {
        let mut s = CpuState::new();
        s.update_zn(0x00);
        assert!(s.is_flag_set(ZERO));
        assert!(!s.is_flag_set(NEGATIVE));
        s.update_zn(0x80);
        assert!(!s.is_flag_set(ZERO));
        assert!(s.is_flag_set(NEGATIVE));
    }

    #[test]
    fn stack_round_trip_restores_sp() {
        let mut bus = Bus::new();
        let mut s = CpuState::new();
        let sp0 = s.sp;
        s.push_u8(&mut bus, 0xAB);
        s.push_u16(&mut bus, 0x1234);
        assert_eq!(s.pop_u16(&mut bus), 0x1234);
        assert_eq!(s.pop_u8(&mut bus), 0xAB);
        assert_eq!(s.sp, sp0);
    }

    #[test]
    fn stack_pointer_wraps() {
        let mut bus = Bus::new();
        let mut s = CpuState::new();
        s.sp = 0x00;
        s.push_u8(&mut bus, 0x11);
        assert_eq!(s.sp, 0xFF);
        assert_eq!(s.pop_u8(&mut bus), 0x11);
        assert_eq!(s.sp, 0x00);
    }

    #[test]
    fn push_status_forces_reserved_bits() {
        let s = CpuState::new();
        let with_break = s.status_for_push(true);
        let without = s.status_for_push(false);
        assert_ne!(with_break & BREAK, 0);
        assert_eq!(without & BREAK, 0);
        assert_ne!(with_break & UNUSED, 0);
        assert_ne!(without & UNUSED, 0);
    }

    #[test]
    fn pulled_status_masks_break_and_sets_unused() {
        let mut s = CpuState::new();
        s.set_status_from_pull(0xFF);
        assert!(!s.is_flag_set(BREAK));
        assert!(s.is_flag_set(UNUSED));
        s.set_status_from_pull(0x00);
        assert!(s.is_flag_set(UNUSED));
    }
}
