//! Userspace I/O (UIO) devices.
//!
//! The kernel's generic UIO driver exposes each device as `/dev/uioN`. Mapping page 0 of the file
//! gives access to the registers. Reading 4 bytes blocks until the next interrupt and returns the
//! total interrupt count; writing the 32-bit value 1 re-enables the interrupt line, which the
//! kernel masks after each delivery.

use crate::regs::{MmapRegisters, PAGE_SIZE, RegisterBlock};
use crate::GpioResult;
use log::{debug, trace};
use std::fmt::{Debug, Formatter};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub struct UioDevice {
    path: PathBuf,
    file: File,
    regs: MmapRegisters,
}

impl UioDevice {
    pub fn open(path: impl AsRef<Path>) -> GpioResult<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Opening UIO device {}", path.display());
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)?;
        let regs = MmapRegisters::open(&path, 0, PAGE_SIZE)?;
        Ok(UioDevice { path, file, regs })
    }

    /// Device registers, starting at page 0 of the UIO map.
    pub fn registers(&self) -> &MmapRegisters {
        &self.regs
    }

    /// Blocks until the device raises an interrupt. Returns the interrupt count.
    pub fn wait_interrupt(&self) -> GpioResult<u32> {
        let mut count = [0u8; 4];
        (&self.file).read_exact(&mut count)?;
        let count = u32::from_ne_bytes(count);
        trace!("{:?} interrupt #{}", self, count);
        Ok(count)
    }

    /// Re-arms the interrupt line.
    pub fn enable_interrupt(&self) -> GpioResult<()> {
        (&self.file).write_all(&1u32.to_ne_bytes())?;
        Ok(())
    }

    /// Masks the interrupt line.
    pub fn disable_interrupt(&self) -> GpioResult<()> {
        (&self.file).write_all(&0u32.to_ne_bytes())?;
        Ok(())
    }
}

impl Debug for UioDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "UioDevice({})", self.path.display())
    }
}

impl RegisterBlock for UioDevice {
    fn len(&self) -> usize {
        self.regs.len()
    }

    fn read(&self, offset: usize) -> GpioResult<u32> {
        self.regs.read(offset)
    }

    fn write(&self, offset: usize, value: u32) -> GpioResult<()> {
        self.regs.write(offset, value)
    }
}
