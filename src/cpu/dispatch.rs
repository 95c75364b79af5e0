/*!
Instruction dispatch: the decode-resolve-execute-cost-tick loop.

`step` returns immediately once the CPU has jammed; otherwise it runs
exactly one of the following per call, in priority order:

1. OAM DMA stall: while the bus-side DMA engine is active the CPU is
   frozen; one cycle elapses (the PPU still receives its three dots).
2. NMI service, if the PPU latched one since the last fetch boundary.
3. IRQ service, if the line is asserted and the I flag is clear.
4. One full instruction: fetch the opcode, look up its table entry,
   resolve the operand, run the shape-matched operation, total up cycles
   (base + page-cross penalty + branch extras), then tick the bus once
   for the whole instruction.

No instruction is interruptible mid-execution; interrupts and DMA are only
observed here, at the fetch boundary. Jam opcodes halt the CPU fatally and
report the cumulative register/cycle state through the log.
*/

use crate::bus::Bus;
use crate::cpu::addressing::AddrMode;
use crate::cpu::state::{CpuState, IRQ_DISABLE, IRQ_VECTOR, NMI_VECTOR};
use crate::cpu::table::{OPCODE_TABLE, OpKind};

/// Execute one dispatch pass. Returns the number of CPU cycles consumed
/// (0 if the CPU is halted).
pub(crate) fn step(cpu: &mut CpuState, bus: &mut Bus) -> u32 {
    // A jammed processor is dead: not even interrupts reach it.
    if cpu.halted {
        return 0;
    }

    if bus.dma_active() {
        bus.tick(1);
        return 1;
    }

    if bus.take_nmi_pending() {
        log::trace!("servicing NMI at pc={:#06X}", cpu.pc);
        return service_interrupt(cpu, bus, NMI_VECTOR);
    }

    if bus.irq_line() && !cpu.is_flag_set(IRQ_DISABLE) {
        log::trace!("servicing IRQ at pc={:#06X}", cpu.pc);
        return service_interrupt(cpu, bus, IRQ_VECTOR);
    }

    let opcode = cpu.fetch_u8(bus);
    let entry = OPCODE_TABLE[opcode as usize];
    let mut cycles = entry.cycles as u32;

    match entry.kind {
        OpKind::Implied(f) => f(cpu, bus),
        OpKind::Accumulator(f) => {
            let a = cpu.a;
            cpu.a = f(cpu, a);
        }
        OpKind::Value(f) => {
            let operand = entry.mode.resolve(cpu, bus);
            let v = bus.read(operand.addr);
            f(cpu, v);
            if entry.page_penalty && operand.crossed {
                cycles += 1;
            }
        }
        OpKind::Modify(f) => {
            let operand = entry.mode.resolve(cpu, bus);
            let old = bus.read(operand.addr);
            // The 6502 writes the unmodified value back before the final
            // write; MMIO registers observe both.
            bus.write(operand.addr, old);
            let new = f(cpu, old);
            bus.write(operand.addr, new);
        }
        OpKind::Address(f) => {
            let operand = entry.mode.resolve(cpu, bus);
            f(cpu, bus, operand.addr);
        }
        OpKind::Branch(cond) => {
            let operand = entry.mode.resolve(cpu, bus);
            if cond(cpu) {
                cycles += 1;
                if operand.crossed {
                    cycles += 1;
                }
                cpu.pc = operand.addr;
            }
        }
        OpKind::Nop => {
            if entry.mode != AddrMode::Implied {
                let operand = entry.mode.resolve(cpu, bus);
                if entry.page_penalty && operand.crossed {
                    cycles += 1;
                }
            }
        }
        OpKind::Jam => {
            cpu.halted = true;
            log::error!(
                "CPU jam: opcode {:#04X} at pc={:#06X} a={:#04X} x={:#04X} y={:#04X} \
                 sp={:#04X} p={:#04X} cycle={}",
                opcode,
                cpu.pc.wrapping_sub(1),
                cpu.a,
                cpu.x,
                cpu.y,
                cpu.sp,
                cpu.status,
                bus.cpu_cycle(),
            );
            return 0;
        }
    }

    bus.tick(cycles);
    cycles
}

/// Hardware interrupt entry: push PC and status (Break clear), set I,
/// load the vector. Costs 7 cycles.
fn service_interrupt(cpu: &mut CpuState, bus: &mut Bus, vector: u16) -> u32 {
    let pc = cpu.pc;
    cpu.push_u16(bus, pc);
    let status = cpu.status_for_push(false);
    cpu.push_u8(bus, status);
    cpu.assign_flag(IRQ_DISABLE, true);
    cpu.pc = bus.read_word(vector);
    bus.tick(7);
    7
}
