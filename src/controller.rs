/*!
Standard controller: strobe latch plus 8-bit serial shift register.

Writing $4016 bit 0 high holds the shift register in continuous-reload
mode; writing it low latches the current button state and arms serial
readout. Each $4016/$4017 read then returns one button in hardware
order (A, B, Select, Start, Up, Down, Left, Right) in bit 0. After all
eight bits have shifted out, further reads return 1, which is what the
official controller does on real hardware.
*/

/// Button bit positions in the latched byte (bit 0 shifts out first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    A = 0x01,
    B = 0x02,
    Select = 0x04,
    Start = 0x08,
    Up = 0x10,
    Down = 0x20,
    Left = 0x40,
    Right = 0x80,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Controller {
    buttons: u8,
    shift: u8,
    strobe: bool,
    bits_read: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full button byte (one bit per `Button`).
    pub fn set_buttons(&mut self, buttons: u8) {
        self.buttons = buttons;
        if self.strobe {
            self.shift = buttons;
        }
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button as u8;
        } else {
            self.buttons &= !(button as u8);
        }
        if self.strobe {
            self.shift = self.buttons;
        }
    }

    /// $4016 write. Only bit 0 matters.
    pub fn write_strobe(&mut self, value: u8) {
        let strobe = (value & 0x01) != 0;
        if self.strobe && !strobe {
            // Falling edge: latch and arm serial readout.
            self.shift = self.buttons;
            self.bits_read = 0;
        }
        self.strobe = strobe;
        if self.strobe {
            self.shift = self.buttons;
            self.bits_read = 0;
        }
    }

    /// Serial read. While strobe is high this always returns the A button.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            return self.buttons & 0x01;
        }
        if self.bits_read >= 8 {
            return 1;
        }
        let bit = self.shift & 0x01;
        self.shift >>= 1;
        self.bits_read += 1;
        bit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latch(ctrl: &mut Controller) {
        ctrl.write_strobe(1);
        ctrl.write_strobe(0);
    }

    #[test]
    fn reads_buttons_in_hardware_order() {
        let mut ctrl = Controller::new();
        ctrl.set_button(Button::A, true);
        ctrl.set_button(Button::Start, true);
        latch(&mut ctrl);
        let bits: Vec<u8> = (0..8).map(|_| ctrl.read()).collect();
        assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn returns_one_after_exhaustion() {
        let mut ctrl = Controller::new();
        latch(&mut ctrl);
        for _ in 0..8 {
            assert_eq!(ctrl.read(), 0);
        }
        assert_eq!(ctrl.read(), 1);
        assert_eq!(ctrl.read(), 1);
    }

    #[test]
    fn strobe_high_repeats_a_button() {
        let mut ctrl = Controller::new();
        ctrl.write_strobe(1);
        ctrl.set_button(Button::A, true);
        assert_eq!(ctrl.read(), 1);
        assert_eq!(ctrl.read(), 1);
        ctrl.set_button(Button::A, false);
        assert_eq!(ctrl.read(), 0);
    }

    #[test]
    fn relatch_restarts_the_sequence() {
        let mut ctrl = Controller::new();
        ctrl.set_button(Button::B, true);
        latch(&mut ctrl);
        assert_eq!(ctrl.read(), 0); // A
        assert_eq!(ctrl.read(), 1); // B
        latch(&mut ctrl);
        assert_eq!(ctrl.read(), 0); // A again
        assert_eq!(ctrl.read(), 1); // B again
    }
}
