use crate::mygpio::{GpioMode, GpioValue, MyGpio};
use crate::regs::RegisterBlock;
use crate::zybo::{ZyboMask, ZyboPins, ZyboStatus};
use crate::{GpioResult, PinMask};
use log::debug;

/// The four slide switches, SW3..SW0.
#[derive(Debug)]
pub struct ZyboSwitches<'a, R: RegisterBlock> {
    gpio: &'a MyGpio<R>,
    pins: ZyboPins,
}

impl<'a, R: RegisterBlock> ZyboSwitches<'a, R> {
    /// Configures the switch pins as inputs.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if a mask is empty or two switches share a pin.
    pub fn new(
        gpio: &'a MyGpio<R>,
        sw3: PinMask,
        sw2: PinMask,
        sw1: PinMask,
        sw0: PinMask,
    ) -> GpioResult<Self> {
        let pins = ZyboPins::new(sw3, sw2, sw1, sw0)?;
        debug!("Switches on {:?} pins {:?}", gpio, pins.all());
        gpio.set_mode(pins.all(), GpioMode::Read)?;
        gpio.set_value(pins.all(), GpioValue::Reset)?;
        Ok(ZyboSwitches { gpio, pins })
    }

    /// [ZyboStatus::On] if any of the selected switches is on.
    pub fn get_status(&self, mask: ZyboMask) -> GpioResult<ZyboStatus> {
        Ok(self.gpio.get_value(self.pins.select(mask))?.is_set().into())
    }
}
