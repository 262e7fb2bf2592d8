use crate::lcd::hd44780::driver::{CursorDirection, HD44780Driver, InterfaceMode};
use crate::{GpioBus, GpioError, GpioOutput, GpioResult};
use log::{debug, trace};
use std::thread::sleep;
use std::time::Duration;

#[derive(Debug)]
pub enum GpioHD44780Bus<'a> {
    Bus8Bit(&'a mut dyn GpioBus<8>),
    Bus4Bit(&'a mut dyn GpioBus<4>),
}

impl GpioHD44780Bus<'_> {
    pub fn is_8bit(&self) -> bool {
        matches!(self, GpioHD44780Bus::Bus8Bit(_))
    }

    pub fn is_4bit(&self) -> bool {
        matches!(self, GpioHD44780Bus::Bus4Bit(_))
    }

    pub fn mode(&self) -> InterfaceMode {
        match self {
            GpioHD44780Bus::Bus8Bit(_) => InterfaceMode::Bits8,
            GpioHD44780Bus::Bus4Bit(_) => InterfaceMode::Bits4,
        }
    }
}

/// Delays used when talking to the controller.
///
/// The defaults leave a generous margin over the datasheet values, so no busy-flag polling is
/// needed and the RW line can be tied to ground.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Hd44780Timing {
    /// How long E is held high for each transfer.
    pub enable_pulse: Duration,
    /// Wait after each command or data byte.
    pub command_settle: Duration,
    /// Wait before the first transfer after power-on.
    pub power_on: Duration,
    /// Wait after each step of the initialization sequence.
    pub init_step: Duration,
    /// Wait after switching the controller to the 4-bit interface.
    pub mode_switch: Duration,
}

impl Hd44780Timing {
    /// No delays at all, for simulated displays.
    pub const fn none() -> Self {
        Hd44780Timing {
            enable_pulse: Duration::ZERO,
            command_settle: Duration::ZERO,
            power_on: Duration::ZERO,
            init_step: Duration::ZERO,
            mode_switch: Duration::ZERO,
        }
    }
}

impl Default for Hd44780Timing {
    fn default() -> Self {
        Hd44780Timing {
            enable_pulse: Duration::from_micros(100),
            command_settle: Duration::from_millis(2),
            power_on: Duration::from_millis(50),
            init_step: Duration::from_millis(10),
            mode_switch: Duration::from_millis(5),
        }
    }
}

fn wait(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration);
    }
}

/// HD44780 driver over GPIO lines.
///
/// The data bus is given LSb first: `[D4, D5, D6, D7]` in 4-bit mode, `[D0, .., D7]` in 8-bit mode.
/// Without an RW pin, the display's RW input must be tied to ground and reads are not supported.
#[derive(Debug)]
pub struct GpioHD44780Driver<'a> {
    pin_e: &'a dyn GpioOutput,
    pin_rw: Option<&'a dyn GpioOutput>,
    pin_rs: &'a dyn GpioOutput,
    data_bus: GpioHD44780Bus<'a>,
    timing: Hd44780Timing,
}

impl<'a> GpioHD44780Driver<'a> {
    pub fn new_4bit(
        pin_e: &'a dyn GpioOutput,
        pin_rw: Option<&'a dyn GpioOutput>,
        pin_rs: &'a dyn GpioOutput,
        data_bus: &'a mut dyn GpioBus<4>,
    ) -> Self {
        GpioHD44780Driver {
            pin_e,
            pin_rw,
            pin_rs,
            data_bus: GpioHD44780Bus::Bus4Bit(data_bus),
            timing: Hd44780Timing::default(),
        }
    }

    pub fn new_8bit(
        pin_e: &'a dyn GpioOutput,
        pin_rw: Option<&'a dyn GpioOutput>,
        pin_rs: &'a dyn GpioOutput,
        data_bus: &'a mut dyn GpioBus<8>,
    ) -> Self {
        GpioHD44780Driver {
            pin_e,
            pin_rw,
            pin_rs,
            data_bus: GpioHD44780Bus::Bus8Bit(data_bus),
            timing: Hd44780Timing::default(),
        }
    }

    pub fn with_timing(mut self, timing: Hd44780Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn interface_mode(&self) -> InterfaceMode {
        self.data_bus.mode()
    }

    fn pulse_e(pin: &dyn GpioOutput, timing: &Hd44780Timing) -> GpioResult<()> {
        pin.write(true)?;
        wait(timing.enable_pulse);
        pin.write(false)?;
        Ok(())
    }

    /// Puts `nibble` on D7..D4 and pulses E once. Used by the initialization sequence, when the
    /// controller may still be in 8-bit mode and only looks at the upper lines.
    fn write_init_nibble(&mut self, nibble: u8) -> GpioResult<()> {
        trace!("Init nibble: {:04b}", nibble);
        match &mut self.data_bus {
            GpioHD44780Bus::Bus8Bit(bus) => {
                let bus = bus.as_output()?;
                bus.write_byte(nibble << 4)?;
            }
            GpioHD44780Bus::Bus4Bit(bus) => {
                let bus = bus.as_output()?;
                bus.write_nibble(nibble)?;
            }
        }
        Self::pulse_e(self.pin_e, &self.timing)
    }

    fn send(&mut self, data: u8, rs: bool) -> GpioResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        // Set RW pin to write
        if let Some(rw) = self.pin_rw {
            rw.write(false)?;
        }

        // Set RS pin
        self.pin_rs.write(rs)?;

        // Write data to the data bus
        match &mut self.data_bus {
            GpioHD44780Bus::Bus8Bit(bus) => {
                let bus = bus.as_output()?;
                bus.write_byte(data)?;
                Self::pulse_e(self.pin_e, &self.timing)?;
            }
            GpioHD44780Bus::Bus4Bit(bus) => {
                let high_nibble = (data >> 4) & 0x0F;
                let low_nibble = data & 0x0F;
                let bus = bus.as_output()?;
                trace!("Writing HN: {:04b}", high_nibble);
                bus.write_nibble(high_nibble)?;
                Self::pulse_e(self.pin_e, &self.timing)?;
                trace!("Writing LN: {:04b}", low_nibble);
                bus.write_nibble(low_nibble)?;
                Self::pulse_e(self.pin_e, &self.timing)?;
            }
        }

        wait(self.timing.command_settle);
        Ok(())
    }

    fn read(&mut self, rs: bool) -> GpioResult<u8> {
        let Some(pin_rw) = self.pin_rw else {
            return Err(GpioError::NotSupported);
        };
        let strobe = self.timing.enable_pulse;

        // Read data from the data bus
        let data = match &mut self.data_bus {
            GpioHD44780Bus::Bus8Bit(bus) => {
                let input = bus.as_input()?;

                self.pin_rs.write(rs)?;
                pin_rw.write(true)?;

                self.pin_e.write(true)?;
                wait(strobe);
                let data = input.read_byte()?;
                self.pin_e.write(false)?;

                data
            }
            GpioHD44780Bus::Bus4Bit(bus) => {
                let input = bus.as_input()?;

                self.pin_rs.write(rs)?;
                pin_rw.write(true)?;

                self.pin_e.write(true)?;
                wait(strobe);
                let high_nibble = input.read_nibble()?;
                self.pin_e.write(false)?;
                wait(strobe);

                self.pin_e.write(true)?;
                wait(strobe);
                let low_nibble = input.read_nibble()?;
                self.pin_e.write(false)?;

                (high_nibble << 4) | low_nibble
            }
        };

        // Set RW pin back to write
        pin_rw.write(false)?;

        trace!("Read data: {:08b}, RS: {}", data, rs);

        Ok(data)
    }
}

impl HD44780Driver for GpioHD44780Driver<'_> {
    fn init(&mut self) -> GpioResult<()> {
        debug!("Initializing HD44780 ({:?})", self.interface_mode());

        // Every line low, then give the controller time to come out of reset.
        self.pin_e.write(false)?;
        self.pin_rs.write(false)?;
        if let Some(rw) = self.pin_rw {
            rw.write(false)?;
        }
        match &mut self.data_bus {
            GpioHD44780Bus::Bus8Bit(bus) => bus.as_output()?.write_byte(0)?,
            GpioHD44780Bus::Bus4Bit(bus) => bus.as_output()?.write_nibble(0)?,
        }
        wait(self.timing.power_on);

        // Synchronize: "8-bit interface" three times works from any state.
        for _ in 0..3 {
            self.write_init_nibble(0b0011)?;
            wait(self.timing.init_step);
        }
        if self.data_bus.is_4bit() {
            self.write_init_nibble(0b0010)?;
            wait(self.timing.mode_switch);
        }

        let step = self.timing.init_step;
        self.function_set(self.data_bus.is_8bit(), true, false)?;
        wait(step);
        self.display_off()?;
        wait(step);
        self.clear_display()?;
        wait(step);
        self.set_entry_mode(CursorDirection::Right, false)?;
        wait(step);
        self.cursor_blink()?;
        wait(step);
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data, true)
    }

    fn read_command(&mut self) -> GpioResult<u8> {
        self.read(false)
    }

    fn read_data(&mut self) -> GpioResult<u8> {
        self.read(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::hd44780::DisplayExt;
    use crate::mygpio::{MyGpio, MyGpioLayout};
    use crate::sim::SimRegisters;
    use crate::{GpioBusInput, GpioBusOutput, GpioDriver};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Line state of the fake display, plus every transfer it latched on a falling E edge.
    #[derive(Debug, Default)]
    struct Wire {
        e: bool,
        rs: bool,
        rw: bool,
        data: u8,
        inputs: VecDeque<u8>,
        latched: Vec<(bool, u8)>,
        input_mode: bool,
    }

    #[derive(Debug, Clone, Copy)]
    enum Line {
        E,
        Rs,
        Rw,
    }

    #[derive(Debug)]
    struct FakeLine<'w> {
        wire: &'w RefCell<Wire>,
        line: Line,
    }

    impl GpioOutput for FakeLine<'_> {
        fn write(&self, value: bool) -> GpioResult<()> {
            let mut wire = self.wire.borrow_mut();
            match self.line {
                Line::E => {
                    if wire.e && !value && !wire.rw {
                        let transfer = (wire.rs, wire.data);
                        wire.latched.push(transfer);
                    }
                    wire.e = value;
                }
                Line::Rs => wire.rs = value,
                Line::Rw => wire.rw = value,
            }
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FakeBus<'w, const N: usize> {
        wire: &'w RefCell<Wire>,
    }

    impl<const N: usize> GpioBus<N> for FakeBus<'_, N> {
        fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>> {
            self.wire.borrow_mut().input_mode = true;
            Ok(Box::new(FakeBusPort { wire: self.wire }))
        }

        fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>> {
            self.wire.borrow_mut().input_mode = false;
            Ok(Box::new(FakeBusPort { wire: self.wire }))
        }
    }

    #[derive(Debug)]
    struct FakeBusPort<'w, const N: usize> {
        wire: &'w RefCell<Wire>,
    }

    impl<const N: usize> GpioBusOutput<N> for FakeBusPort<'_, N> {
        fn write(&self, values: &[bool; N]) -> GpioResult<()> {
            let mut wire = self.wire.borrow_mut();
            assert!(!wire.input_mode, "bus written while in input mode");
            wire.data = values
                .iter()
                .enumerate()
                .fold(0, |acc, (i, &bit)| acc | ((bit as u8) << i));
            Ok(())
        }
    }

    impl<const N: usize> GpioBusInput<N> for FakeBusPort<'_, N> {
        fn read(&self) -> GpioResult<[bool; N]> {
            let mut wire = self.wire.borrow_mut();
            assert!(wire.e && wire.rw, "bus sampled outside of a read strobe");
            let value = wire.inputs.pop_front().unwrap_or(0);
            let mut values = [false; N];
            for (i, slot) in values.iter_mut().enumerate() {
                *slot = value & (1 << i) != 0;
            }
            Ok(values)
        }
    }

    fn lines(wire: &RefCell<Wire>) -> [FakeLine<'_>; 3] {
        [
            FakeLine { wire, line: Line::E },
            FakeLine { wire, line: Line::Rw },
            FakeLine { wire, line: Line::Rs },
        ]
    }

    #[test]
    fn init_4bit_sequence() {
        let wire = RefCell::new(Wire::default());
        let [e, rw, rs] = lines(&wire);
        let mut bus = FakeBus::<4> { wire: &wire };
        let mut lcd = GpioHD44780Driver::new_4bit(&e, Some(&rw), &rs, &mut bus)
            .with_timing(Hd44780Timing::none());
        assert_eq!(lcd.interface_mode(), InterfaceMode::Bits4);
        lcd.init().unwrap();

        let nibbles: Vec<u8> = wire.borrow().latched.iter().map(|&(_, d)| d).collect();
        assert_eq!(
            nibbles,
            vec![
                0x3, 0x3, 0x3, 0x2, // synchronize, switch to 4-bit
                0x2, 0x8, // function set: 4-bit, 2 lines
                0x0, 0x8, // display off
                0x0, 0x1, // clear
                0x0, 0x6, // entry mode: increment
                0x0, 0xF, // display on, blinking cursor
            ]
        );
        assert!(wire.borrow().latched.iter().all(|&(rs, _)| !rs));
    }

    #[test]
    fn init_8bit_sequence() {
        let wire = RefCell::new(Wire::default());
        let [e, rw, rs] = lines(&wire);
        let mut bus = FakeBus::<8> { wire: &wire };
        let mut lcd = GpioHD44780Driver::new_8bit(&e, Some(&rw), &rs, &mut bus)
            .with_timing(Hd44780Timing::none());
        lcd.init().unwrap();

        let bytes: Vec<u8> = wire.borrow().latched.iter().map(|&(_, d)| d).collect();
        assert_eq!(bytes, vec![0x30, 0x30, 0x30, 0x38, 0x08, 0x01, 0x06, 0x0F]);
    }

    #[test]
    fn data_goes_out_high_nibble_first_with_rs_set() {
        let wire = RefCell::new(Wire::default());
        let [e, rw, rs] = lines(&wire);
        let mut bus = FakeBus::<4> { wire: &wire };
        let mut lcd = GpioHD44780Driver::new_4bit(&e, Some(&rw), &rs, &mut bus)
            .with_timing(Hd44780Timing::none());
        lcd.print("Hi").unwrap();
        assert_eq!(
            wire.borrow().latched,
            vec![(true, 0x4), (true, 0x8), (true, 0x6), (true, 0x9)]
        );
    }

    #[test]
    fn busy_flag_read_in_4bit_mode() {
        let wire = RefCell::new(Wire::default());
        wire.borrow_mut().inputs.extend([0b1000, 0b0011]);
        let [e, rw, rs] = lines(&wire);
        let mut bus = FakeBus::<4> { wire: &wire };
        let mut lcd = GpioHD44780Driver::new_4bit(&e, Some(&rw), &rs, &mut bus)
            .with_timing(Hd44780Timing::none());
        assert_eq!(lcd.get_busy_flag_and_address().unwrap(), (true, 0x03));
        assert!(!wire.borrow().rw);
        assert!(wire.borrow().latched.is_empty());
    }

    #[test]
    fn reads_need_rw() {
        let wire = RefCell::new(Wire::default());
        let [e, _, rs] = lines(&wire);
        let mut bus = FakeBus::<8> { wire: &wire };
        let mut lcd = GpioHD44780Driver::new_8bit(&e, None, &rs, &mut bus);
        assert_eq!(lcd.read_data(), Err(GpioError::NotSupported));
    }

    #[test]
    fn drives_mygpio_registers() {
        let gpio = MyGpio::new(SimRegisters::new(MyGpioLayout::SIZE)).unwrap();
        let mut e = gpio.get_pin(8).unwrap();
        let mut rw = gpio.get_pin(9).unwrap();
        let mut rs = gpio.get_pin(10).unwrap();
        let e = e.as_output().unwrap();
        let rw = rw.as_output().unwrap();
        let rs = rs.as_output().unwrap();
        let mut bus = gpio.get_pin_bus([3, 2, 1, 0]).unwrap();

        let mut lcd = GpioHD44780Driver::new_4bit(&*e, Some(&*rw), &*rs, &mut *bus)
            .with_timing(Hd44780Timing::none());
        lcd.init().unwrap();
        lcd.printc('A').unwrap();

        let regs = gpio.registers();
        assert_eq!(regs.get(MyGpioLayout::MODE_OFFSET), 0x70F);
        // Last nibble of 'A' is 0x1, that is D4 on pin 3, and RS stays high.
        assert_eq!(regs.get(MyGpioLayout::WRITE_OFFSET), (1 << 10) | (1 << 3));
    }
}
