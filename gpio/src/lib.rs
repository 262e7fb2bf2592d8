//! Userspace and bare-register drivers for the myGPIO AXI peripheral found in Zynq-7000 designs,
//! together with the devices usually wired to it: an HD44780 character LCD and the Digilent Zybo
//! LEDs, switches and push buttons.
//!
//! The entry point is [mygpio::MyGpio], which wraps any [regs::RegisterBlock]. Register blocks can
//! be mapped from `/dev/mem` ([raw]), from a UIO device ([uio]) or simulated in memory ([sim]).

pub mod lcd;
pub mod location;
pub mod mask;
pub mod mygpio;
pub mod raw;
pub mod regs;
pub mod sim;
pub mod uio;
pub mod zybo;

use std::fmt::Debug;
use thiserror::Error;

pub use mask::PinMask;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("pin already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

pub trait GpioDriver: Debug {
    /// Gets the amount of GPIO pins available.
    fn count(&self) -> GpioResult<usize>;

    /// Gets the GPIO pin at the given index.
    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>>;

    /// Gets the GPIO pin bus at the specific indices.
    ///
    /// The first index is the least significant line of the bus.
    fn get_pin_bus<const N: usize>(
        &self,
        indices: [usize; N],
    ) -> GpioResult<Box<dyn GpioBus<N> + '_>>;
}

/// Specifies the active level of the GPIO pin.
///
/// By default, the active level is high. The myGPIO core has no polarity control, so this is
/// always applied in software.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioActiveLevel {
    #[default] High,
    Low,
}

impl GpioActiveLevel {
    /// Gets the real state that will be outputted on the GPIO pin based on the active level and the value.
    pub fn get_state(&self, value: bool) -> bool {
        match self {
            GpioActiveLevel::High => value,
            GpioActiveLevel::Low => !value,
        }
    }
}

pub trait GpioPin: Debug {
    /// Sets the GPIO pin function to input, allowing reading its state.
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioInput + '_>>;
    /// Sets the GPIO pin function to output, allowing writing its state.
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>>;

    /// Gets whether the GPIO pin supports active level.
    fn supports_active_level(&self) -> bool {
        false
    }
    /// Gets the active level of the GPIO pin.
    fn active_level(&self) -> GpioActiveLevel {
        GpioActiveLevel::High
    }
    /// Sets the active level of the GPIO pin.
    ///
    /// # Errors
    /// - `GpioError::NotSupported` if the pin does not support active level.
    fn set_active_level(&mut self, _level: GpioActiveLevel) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }
}

pub trait GpioInput: Debug {
    /// Reads the state of the GPIO pin.
    fn read(&self) -> GpioResult<bool>;
}

pub trait GpioOutput: Debug {
    /// Writes the state of the GPIO pin.
    fn write(&self, value: bool) -> GpioResult<()>;
}

pub trait GpioBus<const N: usize>: Debug {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>>;
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>>;

    fn supports_active_level(&self) -> bool {
        false
    }
    fn active_level(&self) -> GpioActiveLevel {
        GpioActiveLevel::High
    }
    fn set_active_level(&mut self, _level: GpioActiveLevel) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }
}

pub trait GpioBusInput<const N: usize>: Debug {
    fn read(&self) -> GpioResult<[bool; N]>;
}

/// Packs bus levels into the low bits of a byte, line 0 first.
fn pack_levels<const N: usize>(values: &[bool; N]) -> u8 {
    values
        .iter()
        .enumerate()
        .filter(|(_, level)| **level)
        .fold(0, |acc, (i, _)| acc | 1 << i)
}

fn unpack_levels<const N: usize>(value: u8) -> [bool; N] {
    std::array::from_fn(|i| value >> i & 1 != 0)
}

impl dyn GpioBusInput<8> + '_ {
    /// Reads the bus as a byte, LSb first.
    pub fn read_byte(&self) -> GpioResult<u8> {
        Ok(pack_levels(&self.read()?))
    }
}

impl dyn GpioBusInput<4> + '_ {
    /// Reads the bus as a nibble, LSb first.
    pub fn read_nibble(&self) -> GpioResult<u8> {
        Ok(pack_levels(&self.read()?))
    }
}

pub trait GpioBusOutput<const N: usize>: Debug {
    fn write(&self, values: &[bool; N]) -> GpioResult<()>;
}

impl dyn GpioBusOutput<8> + '_ {
    /// Drives the bus with a byte, LSb first.
    pub fn write_byte(&self, value: u8) -> GpioResult<()> {
        self.write(&unpack_levels(value))
    }
}

impl dyn GpioBusOutput<4> + '_ {
    /// Drives the bus with a nibble, LSb first.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if `value` does not fit in 4 bits.
    pub fn write_nibble(&self, value: u8) -> GpioResult<()> {
        if value > 0xF {
            return Err(GpioError::InvalidArgument);
        }
        self.write(&unpack_levels(value))
    }
}
