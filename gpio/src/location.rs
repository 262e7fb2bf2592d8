//! Where a device's registers live, as given on a command line or in the environment.

use crate::regs::{PAGE_SIZE, RegisterBlock};
use crate::sim::SimRegisters;
use crate::uio::UioDevice;
use crate::{GpioError, GpioResult, raw};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeviceLocation {
    /// Physical base address, mapped through `/dev/mem`.
    Physical(u64),
    /// UIO device node, e.g. `/dev/uio0`.
    Uio(PathBuf),
    /// In-memory register file, for running without hardware.
    Sim,
}

impl DeviceLocation {
    /// Opens the register window at this location.
    pub fn open(&self) -> GpioResult<Box<dyn RegisterBlock + Send + Sync>> {
        Ok(match self {
            DeviceLocation::Physical(address) => Box::new(raw::open_physical(*address)?),
            DeviceLocation::Uio(path) => Box::new(UioDevice::open(path)?),
            DeviceLocation::Sim => Box::new(SimRegisters::new(PAGE_SIZE)),
        })
    }
}

/// Parses an unsigned number, `0x`-prefixed hexadecimal or decimal.
pub fn parse_number(s: &str) -> GpioResult<u64> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| GpioError::Other(format!("not a number: {s:?}")))
}

impl FromStr for DeviceLocation {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("sim") {
            Ok(DeviceLocation::Sim)
        } else if s.starts_with('/') {
            Ok(DeviceLocation::Uio(PathBuf::from(s)))
        } else {
            let address = parse_number(s)?;
            if address % 4 != 0 {
                return Err(GpioError::InvalidArgument);
            }
            Ok(DeviceLocation::Physical(address))
        }
    }
}

impl Display for DeviceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceLocation::Physical(address) => write!(f, "{:#010x}", address),
            DeviceLocation::Uio(path) => write!(f, "{}", path.display()),
            DeviceLocation::Sim => write!(f, "sim"),
        }
    }
}
