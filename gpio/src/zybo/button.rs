use crate::mygpio::{GpioMode, GpioValue, MyGpio};
use crate::regs::RegisterBlock;
use crate::zybo::{ZyboMask, ZyboPins, ZyboStatus};
use crate::{GpioResult, PinMask};
use log::{debug, trace};
use std::thread::sleep;
use std::time::Duration;

/// The four push buttons, BTN3..BTN0.
#[derive(Debug)]
pub struct ZyboButtons<'a, R: RegisterBlock> {
    gpio: &'a MyGpio<R>,
    pins: ZyboPins,
    debounce_time: Duration,
}

impl<'a, R: RegisterBlock> ZyboButtons<'a, R> {
    pub const DEFAULT_DEBOUNCE_TIME: Duration = Duration::from_millis(50);

    /// Configures the button pins as inputs.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if a mask is empty or two buttons share a pin.
    pub fn new(
        gpio: &'a MyGpio<R>,
        btn3: PinMask,
        btn2: PinMask,
        btn1: PinMask,
        btn0: PinMask,
    ) -> GpioResult<Self> {
        let pins = ZyboPins::new(btn3, btn2, btn1, btn0)?;
        debug!("Buttons on {:?} pins {:?}", gpio, pins.all());
        gpio.set_mode(pins.all(), GpioMode::Read)?;
        gpio.set_value(pins.all(), GpioValue::Reset)?;
        Ok(ZyboButtons {
            gpio,
            pins,
            debounce_time: Self::DEFAULT_DEBOUNCE_TIME,
        })
    }

    pub fn with_debounce_time(mut self, debounce_time: Duration) -> Self {
        self.debounce_time = debounce_time;
        self
    }

    pub fn debounce_time(&self) -> Duration {
        self.debounce_time
    }

    /// [ZyboStatus::On] if any of the selected buttons is pressed.
    pub fn get_status(&self, mask: ZyboMask) -> GpioResult<ZyboStatus> {
        Ok(self.gpio.get_value(self.pins.select(mask))?.is_set().into())
    }

    /// Blocks until at least one button is pressed, then waits out the bounce.
    pub fn wait_while_idle(&self) -> GpioResult<()> {
        self.poll_until(ZyboStatus::On)
    }

    /// Blocks until every button is released, then waits out the bounce.
    pub fn wait_while_busy(&self) -> GpioResult<()> {
        self.poll_until(ZyboStatus::Off)
    }

    fn poll_until(&self, status: ZyboStatus) -> GpioResult<()> {
        trace!("Waiting for buttons to be {:?}", status);
        while self.get_status(ZyboMask::ALL)? != status {
            std::hint::spin_loop();
        }
        if !self.debounce_time.is_zero() {
            sleep(self.debounce_time);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mygpio::MyGpioLayout;
    use crate::sim::SimRegisters;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    const READ: usize = MyGpioLayout::READ_OFFSET;

    fn device() -> MyGpio<SimRegisters> {
        MyGpio::new(SimRegisters::new(MyGpioLayout::SIZE)).unwrap()
    }

    fn buttons(gpio: &MyGpio<SimRegisters>) -> ZyboButtons<'_, SimRegisters> {
        ZyboButtons::new(gpio, PinMask::PIN15, PinMask::PIN14, PinMask::PIN13, PinMask::PIN12).unwrap()
    }

    #[test]
    fn status_is_any_pressed() {
        let gpio = device();
        let buttons = buttons(&gpio);
        assert_eq!(buttons.debounce_time(), Duration::from_millis(50));
        assert_eq!(buttons.get_status(ZyboMask::ALL).unwrap(), ZyboStatus::Off);
        gpio.registers().set(READ, 1 << 14);
        assert_eq!(buttons.get_status(ZyboMask::BIT2).unwrap(), ZyboStatus::On);
        assert_eq!(buttons.get_status(ZyboMask::BIT1).unwrap(), ZyboStatus::Off);
        assert_eq!(buttons.get_status(ZyboMask::ALL).unwrap(), ZyboStatus::On);
    }

    #[test]
    fn wait_while_idle_returns_after_a_press() {
        let gpio = device();
        let buttons = buttons(&gpio).with_debounce_time(Duration::from_millis(5));
        let pressed = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                sleep(Duration::from_millis(20));
                pressed.store(true, Ordering::SeqCst);
                gpio.registers().set(READ, 1 << 12);
            });
            buttons.wait_while_idle().unwrap();
            assert!(pressed.load(Ordering::SeqCst));
        });
    }

    #[test]
    fn wait_while_busy_returns_after_release_and_debounce() {
        let gpio = device();
        gpio.registers().set(READ, (1 << 12) | (1 << 15));
        let buttons = buttons(&gpio).with_debounce_time(Duration::from_millis(30));

        std::thread::scope(|s| {
            s.spawn(|| {
                sleep(Duration::from_millis(10));
                gpio.registers().set(READ, 1 << 15);
                sleep(Duration::from_millis(10));
                gpio.registers().set(READ, 0);
            });
            buttons.wait_while_busy().unwrap();
        });

        let start = Instant::now();
        buttons.wait_while_busy().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
