/*!
APU register stub.

Audio synthesis is out of scope; what the rest of the console needs from
the APU is its CPU-visible register surface and the frame counter IRQ,
because games poll $4015 and rely on the frame IRQ for timing. Channel
writes are accepted and ignored. The frame counter runs a coarse 4-step
sequence: in mode 0 with IRQs enabled, the IRQ flag raises once per
sequence (about 60 Hz) and holds until $4015 is read or the flag is
inhibited.
*/

// One 4-step frame sequence in CPU cycles (NTSC).
const FRAME_SEQUENCE_CYCLES: u64 = 14916;

#[derive(Debug, Clone, Default)]
pub struct Apu {
    enabled_channels: u8,
    frame_mode_5step: bool,
    irq_inhibit: bool,
    frame_irq: bool,
    cycles_into_sequence: u64,
    registers: [u8; 0x18],
}

impl Apu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the frame counter by `cycles` CPU cycles.
    pub fn tick(&mut self, cycles: u32) {
        self.cycles_into_sequence += cycles as u64;
        while self.cycles_into_sequence >= FRAME_SEQUENCE_CYCLES {
            self.cycles_into_sequence -= FRAME_SEQUENCE_CYCLES;
            if !self.frame_mode_5step && !self.irq_inhibit {
                self.frame_irq = true;
            }
        }
    }

    /// Register write for $4000-$4017 (except $4014/$4016).
    pub fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x4015 => {
                self.enabled_channels = value & 0x1F;
            }
            0x4017 => {
                self.frame_mode_5step = (value & 0x80) != 0;
                self.irq_inhibit = (value & 0x40) != 0;
                if self.irq_inhibit {
                    self.frame_irq = false;
                }
                self.cycles_into_sequence = 0;
            }
            0x4000..=0x4013 => {
                self.registers[(addr - 0x4000) as usize] = value;
            }
            _ => {}
        }
    }

    /// $4015 read: channel enables plus the frame IRQ flag. Reading clears
    /// the frame IRQ flag.
    pub fn read_status(&mut self) -> u8 {
        let mut status = self.enabled_channels;
        if self.frame_irq {
            status |= 0x40;
        }
        self.frame_irq = false;
        status
    }

    #[inline]
    pub fn irq_asserted(&self) -> bool {
        self.frame_irq
    }
}
