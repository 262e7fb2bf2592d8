//! Digilent Zybo board support: the four user LEDs, slide switches and push buttons.
//!
//! Each group is wired to four myGPIO pins of the same device. Board controls are selected with a
//! [ZyboMask], which is translated to the myGPIO pins given at construction.

mod button;
mod led;
mod switch;

pub use button::*;
pub use led::*;
pub use switch::*;

use crate::{GpioError, GpioResult, PinMask};
use std::ops::{BitOr, BitOrAssign};

/// Selects some of the four controls of a group. Bit `i` is control `i` (LD0, SW0, BTN0, ...).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ZyboMask(u8);

impl ZyboMask {
    pub const NONE: ZyboMask = ZyboMask(0);
    pub const BIT0: ZyboMask = ZyboMask(0x1);
    pub const BIT1: ZyboMask = ZyboMask(0x2);
    pub const BIT2: ZyboMask = ZyboMask(0x4);
    pub const BIT3: ZyboMask = ZyboMask(0x8);
    pub const ALL: ZyboMask = ZyboMask(0xF);

    /// Control `index`, `0..4`.
    pub fn bit(index: usize) -> GpioResult<ZyboMask> {
        if index >= 4 {
            return Err(GpioError::InvalidArgument);
        }
        Ok(ZyboMask(1 << index))
    }

    pub fn contains(self, other: ZyboMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for ZyboMask {
    type Output = ZyboMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        ZyboMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ZyboMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ZyboStatus {
    #[default] Off,
    On,
}

impl ZyboStatus {
    pub fn is_on(self) -> bool {
        self == ZyboStatus::On
    }
}

impl From<bool> for ZyboStatus {
    fn from(value: bool) -> Self {
        if value { ZyboStatus::On } else { ZyboStatus::Off }
    }
}

/// The myGPIO pins behind the four controls of a group, index 0 being control 0.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct ZyboPins([PinMask; 4]);

impl ZyboPins {
    /// Takes the pins in board order, control 3 first. Every mask must select at least one pin
    /// and no two controls may share one.
    pub(crate) fn new(pin3: PinMask, pin2: PinMask, pin1: PinMask, pin0: PinMask) -> GpioResult<Self> {
        let pins = [pin0, pin1, pin2, pin3];
        for (i, pin) in pins.iter().enumerate() {
            if pin.is_empty() || pins[..i].iter().any(|other| other.intersects(*pin)) {
                return Err(GpioError::InvalidArgument);
            }
        }
        Ok(ZyboPins(pins))
    }

    pub(crate) fn all(&self) -> PinMask {
        self.select(ZyboMask::ALL)
    }

    /// Translates board controls to myGPIO pins.
    pub(crate) fn select(&self, mask: ZyboMask) -> PinMask {
        self.0
            .iter()
            .enumerate()
            .filter(|(i, _)| mask.bits() & (1 << i) != 0)
            .fold(PinMask::NONE, |acc, (_, &pin)| acc | pin)
    }
}
