/*!
The 256-entry opcode table.

Every opcode byte maps to an `OpcodeEntry` naming its addressing mode, its
operation tagged by operand shape, its base cycle count, and whether a page
cross on an indexed mode costs an extra cycle. The dispatch loop matches
the shape exhaustively, so there is exactly one calling convention per
shape and no way to invoke an operation with the wrong signature.

Coverage is total: the documented set, the stable undocumented set
(LAX/SAX/DCP/ISC/SLO/RLA/SRE/RRA plus ANC/ALR/ARR/AXS/LAS and the extra
SBC at $EB), the multi-byte no-ops that still consume operands and cycles,
and the twelve jam opcodes that lock the processor. The table is built in
a const block at compile time; a missed byte stays a jam entry, which the
coverage test below flags.
*/

use crate::bus::Bus;
use crate::cpu::addressing::AddrMode;
use crate::cpu::execute as ops;
use crate::cpu::state::CpuState;

pub(crate) type ImpliedFn = fn(&mut CpuState, &mut Bus);
pub(crate) type ValueFn = fn(&mut CpuState, u8);
pub(crate) type ModifyFn = fn(&mut CpuState, u8) -> u8;
pub(crate) type AddressFn = fn(&mut CpuState, &mut Bus, u16);
pub(crate) type BranchFn = fn(&CpuState) -> bool;

/// Operation tagged by operand shape.
#[derive(Clone, Copy)]
pub(crate) enum OpKind {
    /// No operand; operates on registers (and the stack through the bus).
    Implied(ImpliedFn),
    /// Receives the resolved operand byte.
    Value(ValueFn),
    /// Read-modify-write against the resolved memory cell.
    Modify(ModifyFn),
    /// Receives the resolved 16-bit address (stores, JMP, JSR).
    Address(AddressFn),
    /// Modify form applied to the accumulator ("A" addressing).
    Accumulator(ModifyFn),
    /// Relative branch; the predicate decides taken/not-taken.
    Branch(BranchFn),
    /// No operation, but the addressing mode still consumes operand bytes
    /// and the entry still charges cycles.
    Nop,
    /// Processor lock-up. Dispatch halts fatally.
    Jam,
}

#[derive(Clone, Copy)]
pub(crate) struct OpcodeEntry {
    pub mnemonic: &'static str,
    pub mode: AddrMode,
    pub kind: OpKind,
    pub cycles: u8,
    /// Entry pays +1 cycle when the addressing mode reports a page cross.
    pub page_penalty: bool,
}

const fn entry(
    mnemonic: &'static str,
    mode: AddrMode,
    kind: OpKind,
    cycles: u8,
    page_penalty: bool,
) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic,
        mode,
        kind,
        cycles,
        page_penalty,
    }
}

const JAM: OpcodeEntry = entry("JAM", AddrMode::Implied, OpKind::Jam, 2, false);

pub(crate) static OPCODE_TABLE: [OpcodeEntry; 256] = {
    use AddrMode::*;
    use OpKind as K;

    let mut t = [JAM; 256];

    // ----- Loads / stores -----
    t[0xA9] = entry("LDA", Immediate, K::Value(ops::lda), 2, false);
    t[0xA5] = entry("LDA", ZeroPage, K::Value(ops::lda), 3, false);
    t[0xB5] = entry("LDA", ZeroPageX, K::Value(ops::lda), 4, false);
    t[0xAD] = entry("LDA", Absolute, K::Value(ops::lda), 4, false);
    t[0xBD] = entry("LDA", AbsoluteX, K::Value(ops::lda), 4, true);
    t[0xB9] = entry("LDA", AbsoluteY, K::Value(ops::lda), 4, true);
    t[0xA1] = entry("LDA", IndirectX, K::Value(ops::lda), 6, false);
    t[0xB1] = entry("LDA", IndirectY, K::Value(ops::lda), 5, true);

    t[0xA2] = entry("LDX", Immediate, K::Value(ops::ldx), 2, false);
    t[0xA6] = entry("LDX", ZeroPage, K::Value(ops::ldx), 3, false);
    t[0xB6] = entry("LDX", ZeroPageY, K::Value(ops::ldx), 4, false);
    t[0xAE] = entry("LDX", Absolute, K::Value(ops::ldx), 4, false);
    t[0xBE] = entry("LDX", AbsoluteY, K::Value(ops::ldx), 4, true);

    t[0xA0] = entry("LDY", Immediate, K::Value(ops::ldy), 2, false);
    t[0xA4] = entry("LDY", ZeroPage, K::Value(ops::ldy), 3, false);
    t[0xB4] = entry("LDY", ZeroPageX, K::Value(ops::ldy), 4, false);
    t[0xAC] = entry("LDY", Absolute, K::Value(ops::ldy), 4, false);
    t[0xBC] = entry("LDY", AbsoluteX, K::Value(ops::ldy), 4, true);

    t[0x85] = entry("STA", ZeroPage, K::Address(ops::sta), 3, false);
    t[0x95] = entry("STA", ZeroPageX, K::Address(ops::sta), 4, false);
    t[0x8D] = entry("STA", Absolute, K::Address(ops::sta), 4, false);
    t[0x9D] = entry("STA", AbsoluteX, K::Address(ops::sta), 5, false);
    t[0x99] = entry("STA", AbsoluteY, K::Address(ops::sta), 5, false);
    t[0x81] = entry("STA", IndirectX, K::Address(ops::sta), 6, false);
    t[0x91] = entry("STA", IndirectY, K::Address(ops::sta), 6, false);

    t[0x86] = entry("STX", ZeroPage, K::Address(ops::stx), 3, false);
    t[0x96] = entry("STX", ZeroPageY, K::Address(ops::stx), 4, false);
    t[0x8E] = entry("STX", Absolute, K::Address(ops::stx), 4, false);

    t[0x84] = entry("STY", ZeroPage, K::Address(ops::sty), 3, false);
    t[0x94] = entry("STY", ZeroPageX, K::Address(ops::sty), 4, false);
    t[0x8C] = entry("STY", Absolute, K::Address(ops::sty), 4, false);

    // ----- Register transfers -----
    t[0xAA] = entry("TAX", Implied, K::Implied(ops::tax), 2, false);
    t[0xA8] = entry("TAY", Implied, K::Implied(ops::tay), 2, false);
    t[0x8A] = entry("TXA", Implied, K::Implied(ops::txa), 2, false);
    t[0x98] = entry("TYA", Implied, K::Implied(ops::tya), 2, false);
    t[0xBA] = entry("TSX", Implied, K::Implied(ops::tsx), 2, false);
    t[0x9A] = entry("TXS", Implied, K::Implied(ops::txs), 2, false);

    // ----- Logical / arithmetic -----
    t[0x29] = entry("AND", Immediate, K::Value(ops::and), 2, false);
    t[0x25] = entry("AND", ZeroPage, K::Value(ops::and), 3, false);
    t[0x35] = entry("AND", ZeroPageX, K::Value(ops::and), 4, false);
    t[0x2D] = entry("AND", Absolute, K::Value(ops::and), 4, false);
    t[0x3D] = entry("AND", AbsoluteX, K::Value(ops::and), 4, true);
    t[0x39] = entry("AND", AbsoluteY, K::Value(ops::and), 4, true);
    t[0x21] = entry("AND", IndirectX, K::Value(ops::and), 6, false);
    t[0x31] = entry("AND", IndirectY, K::Value(ops::and), 5, true);

    t[0x09] = entry("ORA", Immediate, K::Value(ops::ora), 2, false);
    t[0x05] = entry("ORA", ZeroPage, K::Value(ops::ora), 3, false);
    t[0x15] = entry("ORA", ZeroPageX, K::Value(ops::ora), 4, false);
    t[0x0D] = entry("ORA", Absolute, K::Value(ops::ora), 4, false);
    t[0x1D] = entry("ORA", AbsoluteX, K::Value(ops::ora), 4, true);
    t[0x19] = entry("ORA", AbsoluteY, K::Value(ops::ora), 4, true);
    t[0x01] = entry("ORA", IndirectX, K::Value(ops::ora), 6, false);
    t[0x11] = entry("ORA", IndirectY, K::Value(ops::ora), 5, true);

    t[0x49] = entry("EOR", Immediate, K::Value(ops::eor), 2, false);
    t[0x45] = entry("EOR", ZeroPage, K::Value(ops::eor), 3, false);
    t[0x55] = entry("EOR", ZeroPageX, K::Value(ops::eor), 4, false);
    t[0x4D] = entry("EOR", Absolute, K::Value(ops::eor), 4, false);
    t[0x5D] = entry("EOR", AbsoluteX, K::Value(ops::eor), 4, true);
    t[0x59] = entry("EOR", AbsoluteY, K::Value(ops::eor), 4, true);
    t[0x41] = entry("EOR", IndirectX, K::Value(ops::eor), 6, false);
    t[0x51] = entry("EOR", IndirectY, K::Value(ops::eor), 5, true);

    t[0x24] = entry("BIT", ZeroPage, K::Value(ops::bit), 3, false);
    t[0x2C] = entry("BIT", Absolute, K::Value(ops::bit), 4, false);

    t[0x69] = entry("ADC", Immediate, K::Value(ops::adc), 2, false);
    t[0x65] = entry("ADC", ZeroPage, K::Value(ops::adc), 3, false);
    t[0x75] = entry("ADC", ZeroPageX, K::Value(ops::adc), 4, false);
    t[0x6D] = entry("ADC", Absolute, K::Value(ops::adc), 4, false);
    t[0x7D] = entry("ADC", AbsoluteX, K::Value(ops::adc), 4, true);
    t[0x79] = entry("ADC", AbsoluteY, K::Value(ops::adc), 4, true);
    t[0x61] = entry("ADC", IndirectX, K::Value(ops::adc), 6, false);
    t[0x71] = entry("ADC", IndirectY, K::Value(ops::adc), 5, true);

    t[0xE9] = entry("SBC", Immediate, K::Value(ops::sbc), 2, false);
    t[0xE5] = entry("SBC", ZeroPage, K::Value(ops::sbc), 3, false);
    t[0xF5] = entry("SBC", ZeroPageX, K::Value(ops::sbc), 4, false);
    t[0xED] = entry("SBC", Absolute, K::Value(ops::sbc), 4, false);
    t[0xFD] = entry("SBC", AbsoluteX, K::Value(ops::sbc), 4, true);
    t[0xF9] = entry("SBC", AbsoluteY, K::Value(ops::sbc), 4, true);
    t[0xE1] = entry("SBC", IndirectX, K::Value(ops::sbc), 6, false);
    t[0xF1] = entry("SBC", IndirectY, K::Value(ops::sbc), 5, true);
    t[0xEB] = entry("SBC", Immediate, K::Value(ops::sbc), 2, false); // undocumented alias

    t[0xC9] = entry("CMP", Immediate, K::Value(ops::cmp), 2, false);
    t[0xC5] = entry("CMP", ZeroPage, K::Value(ops::cmp), 3, false);
    t[0xD5] = entry("CMP", ZeroPageX, K::Value(ops::cmp), 4, false);
    t[0xCD] = entry("CMP", Absolute, K::Value(ops::cmp), 4, false);
    t[0xDD] = entry("CMP", AbsoluteX, K::Value(ops::cmp), 4, true);
    t[0xD9] = entry("CMP", AbsoluteY, K::Value(ops::cmp), 4, true);
    t[0xC1] = entry("CMP", IndirectX, K::Value(ops::cmp), 6, false);
    t[0xD1] = entry("CMP", IndirectY, K::Value(ops::cmp), 5, true);

    t[0xE0] = entry("CPX", Immediate, K::Value(ops::cpx), 2, false);
    t[0xE4] = entry("CPX", ZeroPage, K::Value(ops::cpx), 3, false);
    t[0xEC] = entry("CPX", Absolute, K::Value(ops::cpx), 4, false);

    t[0xC0] = entry("CPY", Immediate, K::Value(ops::cpy), 2, false);
    t[0xC4] = entry("CPY", ZeroPage, K::Value(ops::cpy), 3, false);
    t[0xCC] = entry("CPY", Absolute, K::Value(ops::cpy), 4, false);

    // ----- Shifts / rotates -----
    t[0x0A] = entry("ASL", Accumulator, K::Accumulator(ops::asl), 2, false);
    t[0x06] = entry("ASL", ZeroPage, K::Modify(ops::asl), 5, false);
    t[0x16] = entry("ASL", ZeroPageX, K::Modify(ops::asl), 6, false);
    t[0x0E] = entry("ASL", Absolute, K::Modify(ops::asl), 6, false);
    t[0x1E] = entry("ASL", AbsoluteX, K::Modify(ops::asl), 7, false);

    t[0x4A] = entry("LSR", Accumulator, K::Accumulator(ops::lsr), 2, false);
    t[0x46] = entry("LSR", ZeroPage, K::Modify(ops::lsr), 5, false);
    t[0x56] = entry("LSR", ZeroPageX, K::Modify(ops::lsr), 6, false);
    t[0x4E] = entry("LSR", Absolute, K::Modify(ops::lsr), 6, false);
    t[0x5E] = entry("LSR", AbsoluteX, K::Modify(ops::lsr), 7, false);

    t[0x2A] = entry("ROL", Accumulator, K::Accumulator(ops::rol), 2, false);
    t[0x26] = entry("ROL", ZeroPage, K::Modify(ops::rol), 5, false);
    t[0x36] = entry("ROL", ZeroPageX, K::Modify(ops::rol), 6, false);
    t[0x2E] = entry("ROL", Absolute, K::Modify(ops::rol), 6, false);
    t[0x3E] = entry("ROL", AbsoluteX, K::Modify(ops::rol), 7, false);

    t[0x6A] = entry("ROR", Accumulator, K::Accumulator(ops::ror), 2, false);
    t[0x66] = entry("ROR", ZeroPage, K::Modify(ops::ror), 5, false);
    t[0x76] = entry("ROR", ZeroPageX, K::Modify(ops::ror), 6, false);
    t[0x6E] = entry("ROR", Absolute, K::Modify(ops::ror), 6, false);
    t[0x7E] = entry("ROR", AbsoluteX, K::Modify(ops::ror), 7, false);

    // ----- Increments / decrements -----
    t[0xE6] = entry("INC", ZeroPage, K::Modify(ops::inc), 5, false);
    t[0xF6] = entry("INC", ZeroPageX, K::Modify(ops::inc), 6, false);
    t[0xEE] = entry("INC", Absolute, K::Modify(ops::inc), 6, false);
    t[0xFE] = entry("INC", AbsoluteX, K::Modify(ops::inc), 7, false);

    t[0xC6] = entry("DEC", ZeroPage, K::Modify(ops::dec), 5, false);
    t[0xD6] = entry("DEC", ZeroPageX, K::Modify(ops::dec), 6, false);
    t[0xCE] = entry("DEC", Absolute, K::Modify(ops::dec), 6, false);
    t[0xDE] = entry("DEC", AbsoluteX, K::Modify(ops::dec), 7, false);

    t[0xE8] = entry("INX", Implied, K::Implied(ops::inx), 2, false);
    t[0xC8] = entry("INY", Implied, K::Implied(ops::iny), 2, false);
    t[0xCA] = entry("DEX", Implied, K::Implied(ops::dex), 2, false);
    t[0x88] = entry("DEY", Implied, K::Implied(ops::dey), 2, false);

    // ----- Flag operations -----
    t[0x18] = entry("CLC", Implied, K::Implied(ops::clc), 2, false);
    t[0x38] = entry("SEC", Implied, K::Implied(ops::sec), 2, false);
    t[0x58] = entry("CLI", Implied, K::Implied(ops::cli), 2, false);
    t[0x78] = entry("SEI", Implied, K::Implied(ops::sei), 2, false);
    t[0xB8] = entry("CLV", Implied, K::Implied(ops::clv), 2, false);
    t[0xD8] = entry("CLD", Implied, K::Implied(ops::cld), 2, false);
    t[0xF8] = entry("SED", Implied, K::Implied(ops::sed), 2, false);

    // ----- Stack -----
    t[0x48] = entry("PHA", Implied, K::Implied(ops::pha), 3, false);
    t[0x08] = entry("PHP", Implied, K::Implied(ops::php), 3, false);
    t[0x68] = entry("PLA", Implied, K::Implied(ops::pla), 4, false);
    t[0x28] = entry("PLP", Implied, K::Implied(ops::plp), 4, false);

    // ----- Control flow -----
    t[0x4C] = entry("JMP", Absolute, K::Address(ops::jmp), 3, false);
    t[0x6C] = entry("JMP", Indirect, K::Address(ops::jmp), 5, false);
    t[0x20] = entry("JSR", Absolute, K::Address(ops::jsr), 6, false);
    t[0x60] = entry("RTS", Implied, K::Implied(ops::rts), 6, false);
    t[0x40] = entry("RTI", Implied, K::Implied(ops::rti), 6, false);
    t[0x00] = entry("BRK", Implied, K::Implied(ops::brk), 7, false);

    t[0x90] = entry("BCC", Relative, K::Branch(ops::bcc), 2, false);
    t[0xB0] = entry("BCS", Relative, K::Branch(ops::bcs), 2, false);
    t[0xD0] = entry("BNE", Relative, K::Branch(ops::bne), 2, false);
    t[0xF0] = entry("BEQ", Relative, K::Branch(ops::beq), 2, false);
    t[0x10] = entry("BPL", Relative, K::Branch(ops::bpl), 2, false);
    t[0x30] = entry("BMI", Relative, K::Branch(ops::bmi), 2, false);
    t[0x50] = entry("BVC", Relative, K::Branch(ops::bvc), 2, false);
    t[0x70] = entry("BVS", Relative, K::Branch(ops::bvs), 2, false);

    // ----- Documented NOP -----
    t[0xEA] = entry("NOP", Implied, K::Nop, 2, false);

    // ----- Undocumented: combined load/store -----
    t[0xA7] = entry("LAX", ZeroPage, K::Value(ops::lax), 3, false);
    t[0xB7] = entry("LAX", ZeroPageY, K::Value(ops::lax), 4, false);
    t[0xAF] = entry("LAX", Absolute, K::Value(ops::lax), 4, false);
    t[0xBF] = entry("LAX", AbsoluteY, K::Value(ops::lax), 4, true);
    t[0xA3] = entry("LAX", IndirectX, K::Value(ops::lax), 6, false);
    t[0xB3] = entry("LAX", IndirectY, K::Value(ops::lax), 5, true);
    t[0xAB] = entry("LAX", Immediate, K::Value(ops::lax), 2, false);

    t[0x87] = entry("SAX", ZeroPage, K::Address(ops::sax), 3, false);
    t[0x97] = entry("SAX", ZeroPageY, K::Address(ops::sax), 4, false);
    t[0x8F] = entry("SAX", Absolute, K::Address(ops::sax), 4, false);
    t[0x83] = entry("SAX", IndirectX, K::Address(ops::sax), 6, false);

    // ----- Undocumented: read-modify-write combos -----
    t[0x07] = entry("SLO", ZeroPage, K::Modify(ops::slo), 5, false);
    t[0x17] = entry("SLO", ZeroPageX, K::Modify(ops::slo), 6, false);
    t[0x0F] = entry("SLO", Absolute, K::Modify(ops::slo), 6, false);
    t[0x1F] = entry("SLO", AbsoluteX, K::Modify(ops::slo), 7, false);
    t[0x1B] = entry("SLO", AbsoluteY, K::Modify(ops::slo), 7, false);
    t[0x03] = entry("SLO", IndirectX, K::Modify(ops::slo), 8, false);
    t[0x13] = entry("SLO", IndirectY, K::Modify(ops::slo), 8, false);

    t[0x27] = entry("RLA", ZeroPage, K::Modify(ops::rla), 5, false);
    t[0x37] = entry("RLA", ZeroPageX, K::Modify(ops::rla), 6, false);
    t[0x2F] = entry("RLA", Absolute, K::Modify(ops::rla), 6, false);
    t[0x3F] = entry("RLA", AbsoluteX, K::Modify(ops::rla), 7, false);
    t[0x3B] = entry("RLA", AbsoluteY, K::Modify(ops::rla), 7, false);
    t[0x23] = entry("RLA", IndirectX, K::Modify(ops::rla), 8, false);
    t[0x33] = entry("RLA", IndirectY, K::Modify(ops::rla), 8, false);

    t[0x47] = entry("SRE", ZeroPage, K::Modify(ops::sre), 5, false);
    t[0x57] = entry("SRE", ZeroPageX, K::Modify(ops::sre), 6, false);
    t[0x4F] = entry("SRE", Absolute, K::Modify(ops::sre), 6, false);
    t[0x5F] = entry("SRE", AbsoluteX, K::Modify(ops::sre), 7, false);
    t[0x5B] = entry("SRE", AbsoluteY, K::Modify(ops::sre), 7, false);
    t[0x43] = entry("SRE", IndirectX, K::Modify(ops::sre), 8, false);
    t[0x53] = entry("SRE", IndirectY, K::Modify(ops::sre), 8, false);

    t[0x67] = entry("RRA", ZeroPage, K::Modify(ops::rra), 5, false);
    t[0x77] = entry("RRA", ZeroPageX, K::Modify(ops::rra), 6, false);
    t[0x6F] = entry("RRA", Absolute, K::Modify(ops::rra), 6, false);
    t[0x7F] = entry("RRA", AbsoluteX, K::Modify(ops::rra), 7, false);
    t[0x7B] = entry("RRA", AbsoluteY, K::Modify(ops::rra), 7, false);
    t[0x63] = entry("RRA", IndirectX, K::Modify(ops::rra), 8, false);
    t[0x73] = entry("RRA", IndirectY, K::Modify(ops::rra), 8, false);

    t[0xC7] = entry("DCP", ZeroPage, K::Modify(ops::dcp), 5, false);
    t[0xD7] = entry("DCP", ZeroPageX, K::Modify(ops::dcp), 6, false);
    t[0xCF] = entry("DCP", Absolute, K::Modify(ops::dcp), 6, false);
    t[0xDF] = entry("DCP", AbsoluteX, K::Modify(ops::dcp), 7, false);
    t[0xDB] = entry("DCP", AbsoluteY, K::Modify(ops::dcp), 7, false);
    t[0xC3] = entry("DCP", IndirectX, K::Modify(ops::dcp), 8, false);
    t[0xD3] = entry("DCP", IndirectY, K::Modify(ops::dcp), 8, false);

    t[0xE7] = entry("ISC", ZeroPage, K::Modify(ops::isc), 5, false);
    t[0xF7] = entry("ISC", ZeroPageX, K::Modify(ops::isc), 6, false);
    t[0xEF] = entry("ISC", Absolute, K::Modify(ops::isc), 6, false);
    t[0xFF] = entry("ISC", AbsoluteX, K::Modify(ops::isc), 7, false);
    t[0xFB] = entry("ISC", AbsoluteY, K::Modify(ops::isc), 7, false);
    t[0xE3] = entry("ISC", IndirectX, K::Modify(ops::isc), 8, false);
    t[0xF3] = entry("ISC", IndirectY, K::Modify(ops::isc), 8, false);

    // ----- Undocumented: immediate-operand oddities -----
    t[0x0B] = entry("ANC", Immediate, K::Value(ops::anc), 2, false);
    t[0x2B] = entry("ANC", Immediate, K::Value(ops::anc), 2, false);
    t[0x4B] = entry("ALR", Immediate, K::Value(ops::alr), 2, false);
    t[0x6B] = entry("ARR", Immediate, K::Value(ops::arr), 2, false);
    t[0xCB] = entry("AXS", Immediate, K::Value(ops::axs), 2, false);
    t[0xBB] = entry("LAS", AbsoluteY, K::Value(ops::las), 4, true);

    // ----- Undocumented no-ops (operand bytes and cycles still consumed) -----
    t[0x1A] = entry("NOP", Implied, K::Nop, 2, false);
    t[0x3A] = entry("NOP", Implied, K::Nop, 2, false);
    t[0x5A] = entry("NOP", Implied, K::Nop, 2, false);
    t[0x7A] = entry("NOP", Implied, K::Nop, 2, false);
    t[0xDA] = entry("NOP", Implied, K::Nop, 2, false);
    t[0xFA] = entry("NOP", Implied, K::Nop, 2, false);

    t[0x80] = entry("NOP", Immediate, K::Nop, 2, false);
    t[0x82] = entry("NOP", Immediate, K::Nop, 2, false);
    t[0x89] = entry("NOP", Immediate, K::Nop, 2, false);
    t[0xC2] = entry("NOP", Immediate, K::Nop, 2, false);
    t[0xE2] = entry("NOP", Immediate, K::Nop, 2, false);

    t[0x04] = entry("NOP", ZeroPage, K::Nop, 3, false);
    t[0x44] = entry("NOP", ZeroPage, K::Nop, 3, false);
    t[0x64] = entry("NOP", ZeroPage, K::Nop, 3, false);

    t[0x14] = entry("NOP", ZeroPageX, K::Nop, 4, false);
    t[0x34] = entry("NOP", ZeroPageX, K::Nop, 4, false);
    t[0x54] = entry("NOP", ZeroPageX, K::Nop, 4, false);
    t[0x74] = entry("NOP", ZeroPageX, K::Nop, 4, false);
    t[0xD4] = entry("NOP", ZeroPageX, K::Nop, 4, false);
    t[0xF4] = entry("NOP", ZeroPageX, K::Nop, 4, false);

    t[0x0C] = entry("NOP", Absolute, K::Nop, 4, false);
    t[0x1C] = entry("NOP", AbsoluteX, K::Nop, 4, true);
    t[0x3C] = entry("NOP", AbsoluteX, K::Nop, 4, true);
    t[0x5C] = entry("NOP", AbsoluteX, K::Nop, 4, true);
    t[0x7C] = entry("NOP", AbsoluteX, K::Nop, 4, true);
    t[0xDC] = entry("NOP", AbsoluteX, K::Nop, 4, true);
    t[0xFC] = entry("NOP", AbsoluteX, K::Nop, 4, true);

    // Unstable store-class opcodes (XAA/AHX/TAS/SHX/SHY): their silicon
    // behavior depends on analog conditions, so they are modeled as
    // operand-consuming no-ops with their documented cycle counts.
    t[0x8B] = entry("XAA", Immediate, K::Nop, 2, false);
    t[0x93] = entry("AHX", IndirectY, K::Nop, 6, false);
    t[0x9F] = entry("AHX", AbsoluteY, K::Nop, 5, false);
    t[0x9B] = entry("TAS", AbsoluteY, K::Nop, 5, false);
    t[0x9C] = entry("SHY", AbsoluteX, K::Nop, 5, false);
    t[0x9E] = entry("SHX", AbsoluteY, K::Nop, 5, false);

    t
};

/// Mnemonic for an opcode byte, for trace and diagnostic output.
/// Undocumented operations report their common names; the twelve
/// lock-up bytes report "JAM".
pub fn mnemonic(opcode: u8) -> &'static str {
    OPCODE_TABLE[opcode as usize].mnemonic
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The table must cover all 256 bytes: exactly the twelve hardware jam
    /// opcodes remain Jam entries.
    #[test]
    fn jam_entries_are_exactly_the_twelve_lockups() {
        let expected = [
            0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
        ];
        for (op, e) in OPCODE_TABLE.iter().enumerate() {
            let is_jam = matches!(e.kind, OpKind::Jam);
            assert_eq!(
                is_jam,
                expected.contains(&(op as u8)),
                "opcode {op:#04X} jam status wrong"
            );
        }
    }

    #[test]
    fn cycle_counts_are_plausible() {
        for e in OPCODE_TABLE.iter() {
            assert!(e.cycles >= 2 && e.cycles <= 8, "{} cycles out of range", e.mnemonic);
        }
    }

    #[test]
    fn spot_check_known_entries() {
        let lda_imm = &OPCODE_TABLE[0xA9];
        assert_eq!(lda_imm.mnemonic, "LDA");
        assert_eq!(lda_imm.mode, AddrMode::Immediate);
        assert_eq!(lda_imm.cycles, 2);
        assert!(!lda_imm.page_penalty);

        // Stores never pay the page-cross penalty even on indexed modes.
        let sta_abs_x = &OPCODE_TABLE[0x9D];
        assert_eq!(sta_abs_x.cycles, 5);
        assert!(!sta_abs_x.page_penalty);

        // Loads on the same mode do.
        let lda_abs_x = &OPCODE_TABLE[0xBD];
        assert_eq!(lda_abs_x.cycles, 4);
        assert!(lda_abs_x.page_penalty);

        let jmp_ind = &OPCODE_TABLE[0x6C];
        assert_eq!(jmp_ind.mode, AddrMode::Indirect);
        assert_eq!(jmp_ind.cycles, 5);

        let brk = &OPCODE_TABLE[0x00];
        assert_eq!(brk.mnemonic, "BRK");
        assert_eq!(brk.cycles, 7);
    }

    #[test]
    fn page_penalty_only_on_read_style_indexed_entries() {
        for (op, e) in OPCODE_TABLE.iter().enumerate() {
            if e.page_penalty {
                assert!(
                    matches!(
                        e.mode,
                        AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::IndirectY
                    ),
                    "opcode {op:#04X} charges a cross penalty on a non-indexed mode"
                );
                assert!(
                    matches!(e.kind, OpKind::Value(_) | OpKind::Nop),
                    "opcode {op:#04X} charges a cross penalty on a write-style shape"
                );
            }
        }
    }
}
