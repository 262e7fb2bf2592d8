//! Pin selection masks for 32-bit GPIO registers.

use crate::{GpioError, GpioResult};
use std::fmt::{Binary, Debug, Formatter, LowerHex};
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Selects a set of pins of a 32-bit GPIO device. Bit `i` selects pin `i`.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct PinMask(pub u32);

impl PinMask {
    pub const NONE: PinMask = PinMask(0);
    pub const ALL: PinMask = PinMask(0xFFFF_FFFF);

    pub const PIN0: PinMask = PinMask(1 << 0);
    pub const PIN1: PinMask = PinMask(1 << 1);
    pub const PIN2: PinMask = PinMask(1 << 2);
    pub const PIN3: PinMask = PinMask(1 << 3);
    pub const PIN4: PinMask = PinMask(1 << 4);
    pub const PIN5: PinMask = PinMask(1 << 5);
    pub const PIN6: PinMask = PinMask(1 << 6);
    pub const PIN7: PinMask = PinMask(1 << 7);
    pub const PIN8: PinMask = PinMask(1 << 8);
    pub const PIN9: PinMask = PinMask(1 << 9);
    pub const PIN10: PinMask = PinMask(1 << 10);
    pub const PIN11: PinMask = PinMask(1 << 11);
    pub const PIN12: PinMask = PinMask(1 << 12);
    pub const PIN13: PinMask = PinMask(1 << 13);
    pub const PIN14: PinMask = PinMask(1 << 14);
    pub const PIN15: PinMask = PinMask(1 << 15);
    pub const PIN16: PinMask = PinMask(1 << 16);
    pub const PIN17: PinMask = PinMask(1 << 17);
    pub const PIN18: PinMask = PinMask(1 << 18);
    pub const PIN19: PinMask = PinMask(1 << 19);
    pub const PIN20: PinMask = PinMask(1 << 20);
    pub const PIN21: PinMask = PinMask(1 << 21);
    pub const PIN22: PinMask = PinMask(1 << 22);
    pub const PIN23: PinMask = PinMask(1 << 23);
    pub const PIN24: PinMask = PinMask(1 << 24);
    pub const PIN25: PinMask = PinMask(1 << 25);
    pub const PIN26: PinMask = PinMask(1 << 26);
    pub const PIN27: PinMask = PinMask(1 << 27);
    pub const PIN28: PinMask = PinMask(1 << 28);
    pub const PIN29: PinMask = PinMask(1 << 29);
    pub const PIN30: PinMask = PinMask(1 << 30);
    pub const PIN31: PinMask = PinMask(1 << 31);

    /// Pins 0-7.
    pub const BYTE0: PinMask = PinMask(0x0000_00FF);
    /// Pins 8-15.
    pub const BYTE1: PinMask = PinMask(0x0000_FF00);
    /// Pins 16-23.
    pub const BYTE2: PinMask = PinMask(0x00FF_0000);
    /// Pins 24-31.
    pub const BYTE3: PinMask = PinMask(0xFF00_0000);

    /// Mask selecting the single pin `index`.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if `index` is not below 32.
    pub fn try_pin(index: usize) -> GpioResult<Self> {
        if index >= 32 {
            return Err(GpioError::InvalidArgument);
        }
        Ok(PinMask(1 << index))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: PinMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: PinMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterates over the indices of the selected pins, lowest first.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..32).filter(move |&i| self.0 & (1 << i) != 0)
    }
}

impl From<u32> for PinMask {
    fn from(bits: u32) -> Self {
        PinMask(bits)
    }
}

impl From<PinMask> for u32 {
    fn from(mask: PinMask) -> Self {
        mask.0
    }
}

impl BitOr for PinMask {
    type Output = PinMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        PinMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for PinMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PinMask {
    type Output = PinMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        PinMask(self.0 & rhs.0)
    }
}

impl Not for PinMask {
    type Output = PinMask;

    fn not(self) -> Self::Output {
        PinMask(!self.0)
    }
}

impl Debug for PinMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PinMask({:#010x})", self.0)
    }
}

impl LowerHex for PinMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        LowerHex::fmt(&self.0, f)
    }
}

impl Binary for PinMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Binary::fmt(&self.0, f)
    }
}
