/*!
Instruction semantics.

Each function here implements exactly one 6502 operation as a pure
transformation of register/flag state (plus bus access for the stack and
control-flow group). The opcode table points at these through the
operand-shape enum in `table.rs`, so their signatures come in five flavors:

- value ops: `fn(&mut CpuState, u8)` - loads, arithmetic, compares
- modify ops: `fn(&mut CpuState, u8) -> u8` - shifts/rotates/inc/dec, used
  both against memory (read-modify-write) and the accumulator
- address ops: `fn(&mut CpuState, &mut Bus, u16)` - stores, JMP, JSR
- implied ops: `fn(&mut CpuState, &mut Bus)` - transfers, flags, stack
- branch predicates: `fn(&CpuState) -> bool`

Decimal mode is hardwired off: CLD/SED only toggle the status bit and
ADC/SBC are pure binary, matching the 2A03.

Flag subtleties worth calling out: ADC carry comes from the 9th bit of the
binary sum and overflow from the sign-agreement test; SBC is ADC of the
one's complement; compares perform an unsigned subtraction without writing
the register back; the undocumented combos (SLO/RLA/SRE/RRA/DCP/ISC) apply
their memory half first and feed the result to the accumulator half.
*/

use crate::bus::Bus;
use crate::cpu::state::{CARRY, CpuState, DECIMAL, IRQ_DISABLE, IRQ_VECTOR, NEGATIVE, OVERFLOW, ZERO};

// ---------------------------------------------------------------------
// Value operations
// ---------------------------------------------------------------------

pub(crate) fn lda(cpu: &mut CpuState, v: u8) {
    cpu.a = v;
    cpu.update_zn(v);
}

pub(crate) fn ldx(cpu: &mut CpuState, v: u8) {
    cpu.x = v;
    cpu.update_zn(v);
}

pub(crate) fn ldy(cpu: &mut CpuState, v: u8) {
    cpu.y = v;
    cpu.update_zn(v);
}

pub(crate) fn and(cpu: &mut CpuState, v: u8) {
    cpu.a &= v;
    let a = cpu.a;
    cpu.update_zn(a);
}

pub(crate) fn ora(cpu: &mut CpuState, v: u8) {
    cpu.a |= v;
    let a = cpu.a;
    cpu.update_zn(a);
}

pub(crate) fn eor(cpu: &mut CpuState, v: u8) {
    cpu.a ^= v;
    let a = cpu.a;
    cpu.update_zn(a);
}

pub(crate) fn bit(cpu: &mut CpuState, v: u8) {
    cpu.assign_flag(ZERO, (cpu.a & v) == 0);
    cpu.assign_flag(NEGATIVE, (v & 0x80) != 0);
    cpu.assign_flag(OVERFLOW, (v & 0x40) != 0);
}

pub(crate) fn adc(cpu: &mut CpuState, v: u8) {
    let a = cpu.a;
    let carry_in = cpu.is_flag_set(CARRY) as u16;
    let sum = a as u16 + v as u16 + carry_in;
    let result = sum as u8;
    cpu.update_carry(sum > 0xFF);
    // Overflow: operands agree in sign and the result disagrees.
    cpu.update_overflow(((!(a ^ v)) & (a ^ result) & 0x80) != 0);
    cpu.a = result;
    cpu.update_zn(result);
}

pub(crate) fn sbc(cpu: &mut CpuState, v: u8) {
    adc(cpu, v ^ 0xFF);
}

#[inline]
fn compare(cpu: &mut CpuState, reg: u8, v: u8) {
    cpu.update_carry(reg >= v);
    cpu.update_zn(reg.wrapping_sub(v));
}

pub(crate) fn cmp(cpu: &mut CpuState, v: u8) {
    let a = cpu.a;
    compare(cpu, a, v);
}

pub(crate) fn cpx(cpu: &mut CpuState, v: u8) {
    let x = cpu.x;
    compare(cpu, x, v);
}

pub(crate) fn cpy(cpu: &mut CpuState, v: u8) {
    let y = cpu.y;
    compare(cpu, y, v);
}

// Undocumented value ops.

pub(crate) fn lax(cpu: &mut CpuState, v: u8) {
    cpu.a = v;
    cpu.x = v;
    cpu.update_zn(v);
}

pub(crate) fn anc(cpu: &mut CpuState, v: u8) {
    cpu.a &= v;
    let a = cpu.a;
    cpu.update_zn(a);
    cpu.update_carry((a & 0x80) != 0);
}

pub(crate) fn alr(cpu: &mut CpuState, v: u8) {
    let t = cpu.a & v;
    cpu.update_carry((t & 0x01) != 0);
    cpu.a = t >> 1;
    let a = cpu.a;
    cpu.update_zn(a);
}

pub(crate) fn arr(cpu: &mut CpuState, v: u8) {
    let carry_in = cpu.is_flag_set(CARRY) as u8;
    let t = cpu.a & v;
    let r = (t >> 1) | (carry_in << 7);
    cpu.a = r;
    cpu.update_zn(r);
    // ARR derives C and V from bits 6/5 of the rotated result.
    cpu.update_carry((r & 0x40) != 0);
    cpu.update_overflow((((r >> 6) ^ (r >> 5)) & 1) != 0);
}

pub(crate) fn axs(cpu: &mut CpuState, v: u8) {
    let t = cpu.a & cpu.x;
    cpu.update_carry(t >= v);
    cpu.x = t.wrapping_sub(v);
    let x = cpu.x;
    cpu.update_zn(x);
}

pub(crate) fn las(cpu: &mut CpuState, v: u8) {
    let r = v & cpu.sp;
    cpu.a = r;
    cpu.x = r;
    cpu.sp = r;
    cpu.update_zn(r);
}

// ---------------------------------------------------------------------
// Modify operations (memory read-modify-write and accumulator forms)
// ---------------------------------------------------------------------

pub(crate) fn asl(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.update_carry((v & 0x80) != 0);
    let r = v << 1;
    cpu.update_zn(r);
    r
}

pub(crate) fn lsr(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.update_carry((v & 0x01) != 0);
    let r = v >> 1;
    cpu.update_zn(r);
    r
}

pub(crate) fn rol(cpu: &mut CpuState, v: u8) -> u8 {
    let carry_in = cpu.is_flag_set(CARRY) as u8;
    cpu.update_carry((v & 0x80) != 0);
    let r = (v << 1) | carry_in;
    cpu.update_zn(r);
    r
}

pub(crate) fn ror(cpu: &mut CpuState, v: u8) -> u8 {
    let carry_in = cpu.is_flag_set(CARRY) as u8;
    cpu.update_carry((v & 0x01) != 0);
    let r = (v >> 1) | (carry_in << 7);
    cpu.update_zn(r);
    r
}

pub(crate) fn inc(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_add(1);
    cpu.update_zn(r);
    r
}

pub(crate) fn dec(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_sub(1);
    cpu.update_zn(r);
    r
}

// Undocumented read-modify-write combos. Memory half first, then the
// accumulator half sees the new memory value.

pub(crate) fn slo(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.update_carry((v & 0x80) != 0);
    let m = v << 1;
    cpu.a |= m;
    let a = cpu.a;
    cpu.update_zn(a);
    m
}

pub(crate) fn rla(cpu: &mut CpuState, v: u8) -> u8 {
    let carry_in = cpu.is_flag_set(CARRY) as u8;
    cpu.update_carry((v & 0x80) != 0);
    let m = (v << 1) | carry_in;
    cpu.a &= m;
    let a = cpu.a;
    cpu.update_zn(a);
    m
}

pub(crate) fn sre(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.update_carry((v & 0x01) != 0);
    let m = v >> 1;
    cpu.a ^= m;
    let a = cpu.a;
    cpu.update_zn(a);
    m
}

pub(crate) fn rra(cpu: &mut CpuState, v: u8) -> u8 {
    let carry_in = cpu.is_flag_set(CARRY) as u8;
    cpu.update_carry((v & 0x01) != 0);
    let m = (v >> 1) | (carry_in << 7);
    adc(cpu, m);
    m
}

pub(crate) fn dcp(cpu: &mut CpuState, v: u8) -> u8 {
    let m = v.wrapping_sub(1);
    let a = cpu.a;
    compare(cpu, a, m);
    m
}

pub(crate) fn isc(cpu: &mut CpuState, v: u8) -> u8 {
    let m = v.wrapping_add(1);
    sbc(cpu, m);
    m
}

// ---------------------------------------------------------------------
// Address operations (stores and control flow with a resolved target)
// ---------------------------------------------------------------------

pub(crate) fn sta(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    bus.write(addr, cpu.a);
}

pub(crate) fn stx(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    bus.write(addr, cpu.x);
}

pub(crate) fn sty(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    bus.write(addr, cpu.y);
}

pub(crate) fn sax(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    bus.write(addr, cpu.a & cpu.x);
}

pub(crate) fn jmp(cpu: &mut CpuState, _bus: &mut Bus, addr: u16) {
    cpu.pc = addr;
}

pub(crate) fn jsr(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    // Push the address of the last operand byte; RTS adds one back.
    let ret = cpu.pc.wrapping_sub(1);
    cpu.push_u16(bus, ret);
    cpu.pc = addr;
}

// ---------------------------------------------------------------------
// Implied operations
// ---------------------------------------------------------------------

pub(crate) fn tax(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.x = cpu.a;
    let x = cpu.x;
    cpu.update_zn(x);
}

pub(crate) fn tay(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.y = cpu.a;
    let y = cpu.y;
    cpu.update_zn(y);
}

pub(crate) fn txa(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.a = cpu.x;
    let a = cpu.a;
    cpu.update_zn(a);
}

pub(crate) fn tya(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.a = cpu.y;
    let a = cpu.a;
    cpu.update_zn(a);
}

pub(crate) fn tsx(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.x = cpu.sp;
    let x = cpu.x;
    cpu.update_zn(x);
}

pub(crate) fn txs(cpu: &mut CpuState, _bus: &mut Bus) {
    // No flags.
    cpu.sp = cpu.x;
}

pub(crate) fn inx(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.x = cpu.x.wrapping_add(1);
    let x = cpu.x;
    cpu.update_zn(x);
}

pub(crate) fn iny(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.y = cpu.y.wrapping_add(1);
    let y = cpu.y;
    cpu.update_zn(y);
}

pub(crate) fn dex(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.x = cpu.x.wrapping_sub(1);
    let x = cpu.x;
    cpu.update_zn(x);
}

pub(crate) fn dey(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.y = cpu.y.wrapping_sub(1);
    let y = cpu.y;
    cpu.update_zn(y);
}

pub(crate) fn clc(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.assign_flag(CARRY, false);
}

pub(crate) fn sec(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.assign_flag(CARRY, true);
}

pub(crate) fn cli(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.assign_flag(IRQ_DISABLE, false);
}

pub(crate) fn sei(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.assign_flag(IRQ_DISABLE, true);
}

pub(crate) fn clv(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.assign_flag(OVERFLOW, false);
}

pub(crate) fn cld(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.assign_flag(DECIMAL, false);
}

pub(crate) fn sed(cpu: &mut CpuState, _bus: &mut Bus) {
    cpu.assign_flag(DECIMAL, true);
}

pub(crate) fn pha(cpu: &mut CpuState, bus: &mut Bus) {
    let a = cpu.a;
    cpu.push_u8(bus, a);
}

pub(crate) fn php(cpu: &mut CpuState, bus: &mut Bus) {
    let status = cpu.status_for_push(true);
    cpu.push_u8(bus, status);
}

pub(crate) fn pla(cpu: &mut CpuState, bus: &mut Bus) {
    let v = cpu.pop_u8(bus);
    cpu.a = v;
    cpu.update_zn(v);
}

pub(crate) fn plp(cpu: &mut CpuState, bus: &mut Bus) {
    let v = cpu.pop_u8(bus);
    cpu.set_status_from_pull(v);
}

pub(crate) fn rts(cpu: &mut CpuState, bus: &mut Bus) {
    let ret = cpu.pop_u16(bus);
    cpu.pc = ret.wrapping_add(1);
}

pub(crate) fn rti(cpu: &mut CpuState, bus: &mut Bus) {
    let status = cpu.pop_u8(bus);
    cpu.set_status_from_pull(status);
    cpu.pc = cpu.pop_u16(bus);
}

pub(crate) fn brk(cpu: &mut CpuState, bus: &mut Bus) {
    // BRK pushes PC+2 total: the padding byte after the opcode is skipped.
    let ret = cpu.pc.wrapping_add(1);
    cpu.push_u16(bus, ret);
    let status = cpu.status_for_push(true);
    cpu.push_u8(bus, status);
    cpu.assign_flag(IRQ_DISABLE, true);
    cpu.pc = bus.read_word(IRQ_VECTOR);
}

// ---------------------------------------------------------------------
// Branch predicates
// ---------------------------------------------------------------------

pub(crate) fn bcc(cpu: &CpuState) -> bool {
    !cpu.is_flag_set(CARRY)
}

pub(crate) fn bcs(cpu: &CpuState) -> bool {
    cpu.is_flag_set(CARRY)
}

pub(crate) fn bne(cpu: &CpuState) -> bool {
    !cpu.is_flag_set(ZERO)
}

pub(crate) fn beq(cpu: &CpuState) -> bool {
    cpu.is_flag_set(ZERO)
}

pub(crate) fn bpl(cpu: &CpuState) -> bool {
    !cpu.is_flag_set(NEGATIVE)
}

pub(crate) fn bmi(cpu: &CpuState) -> bool {
    cpu.is_flag_set(NEGATIVE)
}

pub(crate) fn bvc(cpu: &CpuState) -> bool {
    !cpu.is_flag_set(OVERFLOW)
}

pub(crate) fn bvs(cpu: &CpuState) -> bool {
    cpu.is_flag_set(OVERFLOW)
}
