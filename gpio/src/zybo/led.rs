use crate::mygpio::{GpioMode, GpioValue, MyGpio};
use crate::regs::RegisterBlock;
use crate::zybo::{ZyboMask, ZyboPins, ZyboStatus};
use crate::{GpioResult, PinMask};
use log::debug;

/// The four user LEDs, LD3..LD0.
#[derive(Debug)]
pub struct ZyboLeds<'a, R: RegisterBlock> {
    gpio: &'a MyGpio<R>,
    pins: ZyboPins,
}

impl<'a, R: RegisterBlock> ZyboLeds<'a, R> {
    /// Configures the LED pins as outputs and turns every LED off.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if a mask is empty or two LEDs share a pin.
    pub fn new(
        gpio: &'a MyGpio<R>,
        led3: PinMask,
        led2: PinMask,
        led1: PinMask,
        led0: PinMask,
    ) -> GpioResult<Self> {
        let pins = ZyboPins::new(led3, led2, led1, led0)?;
        debug!("LEDs on {:?} pins {:?}", gpio, pins.all());
        gpio.set_mode(pins.all(), GpioMode::Write)?;
        gpio.set_value(pins.all(), GpioValue::Reset)?;
        Ok(ZyboLeds { gpio, pins })
    }

    pub fn set_status(&self, mask: ZyboMask, status: ZyboStatus) -> GpioResult<()> {
        let value = if status.is_on() { GpioValue::Set } else { GpioValue::Reset };
        self.gpio.set_value(self.pins.select(mask), value)
    }

    pub fn toggle(&self, mask: ZyboMask) -> GpioResult<()> {
        self.gpio.toggle(self.pins.select(mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mygpio::MyGpioLayout;
    use crate::sim::SimRegisters;
    use crate::GpioError;

    fn device() -> MyGpio<SimRegisters> {
        MyGpio::new(SimRegisters::new(MyGpioLayout::SIZE)).unwrap()
    }

    #[test]
    fn new_configures_outputs_and_clears_them() {
        let gpio = device();
        gpio.registers().set(MyGpioLayout::WRITE_OFFSET, 0xFFFF);
        let _leds =
            ZyboLeds::new(&gpio, PinMask::PIN3, PinMask::PIN2, PinMask::PIN1, PinMask::PIN0).unwrap();
        assert_eq!(gpio.registers().get(MyGpioLayout::MODE_OFFSET), 0xF);
        assert_eq!(gpio.registers().get(MyGpioLayout::WRITE_OFFSET), 0xFFF0);
    }

    #[test]
    fn set_and_toggle_follow_the_wiring() {
        let gpio = device();
        let leds =
            ZyboLeds::new(&gpio, PinMask::PIN8, PinMask::PIN9, PinMask::PIN10, PinMask::PIN11).unwrap();
        leds.set_status(ZyboMask::BIT0 | ZyboMask::BIT3, ZyboStatus::On).unwrap();
        assert_eq!(gpio.registers().get(MyGpioLayout::WRITE_OFFSET), (1 << 11) | (1 << 8));
        leds.toggle(ZyboMask::BIT0 | ZyboMask::BIT1).unwrap();
        assert_eq!(gpio.registers().get(MyGpioLayout::WRITE_OFFSET), (1 << 10) | (1 << 8));
        leds.set_status(ZyboMask::ALL, ZyboStatus::Off).unwrap();
        assert_eq!(gpio.registers().get(MyGpioLayout::WRITE_OFFSET), 0);
    }

    #[test]
    fn rejects_shared_pins() {
        let gpio = device();
        let leds = ZyboLeds::new(&gpio, PinMask::PIN3, PinMask::PIN3, PinMask::PIN1, PinMask::PIN0);
        assert_eq!(leds.unwrap_err(), GpioError::InvalidArgument);
        assert_eq!(gpio.registers().get(MyGpioLayout::MODE_OFFSET), 0);
    }
}
