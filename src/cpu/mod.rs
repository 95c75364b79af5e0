/*!
6502 CPU core.

Layering:
- `state`: the architectural register file and stack/fetch helpers
- `addressing`: operand resolution with page-cross reporting
- `execute`: per-operation semantics, pure where the hardware is pure
- `table`: the 256-entry opcode table tagged by operand shape
- `dispatch`: the decode-resolve-execute-cost-tick loop

`Cpu` is the external face: it owns a `CpuState` and a retired-instruction
counter and forwards stepping to the dispatch loop.
*/

pub mod addressing;
pub mod dispatch;
pub mod execute;
pub mod state;
pub mod table;

pub use state::{
    BREAK, CARRY, CpuState, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, UNUSED, ZERO,
};

use crate::bus::Bus;

/// The 2A03 CPU: register state plus the dispatch entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cpu {
    state: CpuState,
    instructions: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            state: CpuState::new(),
            instructions: 0,
        }
    }

    /// Reset registers and load PC from the reset vector.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.state.reset(bus);
        self.instructions = 0;
    }

    /// Run one dispatch pass (instruction, interrupt service, or DMA stall
    /// cycle). Returns the CPU cycles consumed.
    pub fn step(&mut self, bus: &mut Bus) -> u32 {
        let stalled = bus.dma_active();
        let cycles = dispatch::step(&mut self.state, bus);
        if cycles > 0 && !stalled {
            self.instructions += 1;
        }
        cycles
    }

    /// Run until the CPU halts or `max_instructions` have retired.
    pub fn run(&mut self, bus: &mut Bus, max_instructions: u64) -> u64 {
        let start = self.instructions;
        while !self.state.halted && self.instructions - start < max_instructions {
            if self.step(bus) == 0 {
                break;
            }
        }
        self.instructions - start
    }

    #[inline]
    pub fn state(&self) -> &CpuState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    #[inline]
    pub fn halted(&self) -> bool {
        self.state.halted
    }

    #[inline]
    pub fn instructions_retired(&self) -> u64 {
        self.instructions
    }
}
