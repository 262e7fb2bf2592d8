//! 32-bit register access.
//!
//! A [RegisterBlock] is a window of word-sized device registers addressed by byte offset. The
//! myGPIO driver only talks to a [RegisterBlock], so the same driver code runs on top of
//! `/dev/mem`, a UIO mapping or a simulated register file.

use crate::{GpioError, GpioResult};
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;
use std::path::Path;

/// Size of the pages mapped from device files.
pub const PAGE_SIZE: usize = 4096;

pub trait RegisterBlock: Debug {
    /// Length of the register window in bytes.
    fn len(&self) -> usize;

    /// Reads the 32-bit register at `offset` bytes from the start of the window.
    fn read(&self, offset: usize) -> GpioResult<u32>;

    /// Writes the 32-bit register at `offset` bytes from the start of the window.
    fn write(&self, offset: usize, value: u32) -> GpioResult<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-modify-write helper.
    fn modify(&self, offset: usize, f: impl FnOnce(u32) -> u32) -> GpioResult<()>
    where
        Self: Sized,
    {
        let value = self.read(offset)?;
        self.write(offset, f(value))
    }
}

/// Checks that a word access at `offset` is aligned and fits in a window of `len` bytes.
pub(crate) fn check_offset(len: usize, offset: usize) -> GpioResult<()> {
    if offset % 4 != 0 || offset.checked_add(4).is_none_or(|end| end > len) {
        return Err(GpioError::InvalidArgument);
    }
    Ok(())
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read(&self, offset: usize) -> GpioResult<u32> {
        (**self).read(offset)
    }

    fn write(&self, offset: usize, value: u32) -> GpioResult<()> {
        (**self).write(offset, value)
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for Box<T> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read(&self, offset: usize) -> GpioResult<u32> {
        (**self).read(offset)
    }

    fn write(&self, offset: usize, value: u32) -> GpioResult<()> {
        (**self).write(offset, value)
    }
}

/// Registers accessed through a shared memory mapping of a device file.
pub struct MmapRegisters {
    mmap: MmapRaw,
    start: usize,
    len: usize,
}

impl MmapRegisters {
    /// Maps `len` bytes of `path` starting at byte `offset`.
    ///
    /// The mapping itself starts at the page containing `offset`, so `offset` does not need to be
    /// page-aligned, but it must be word-aligned.
    pub fn open(path: impl AsRef<Path>, offset: u64, len: usize) -> GpioResult<Self> {
        if offset % 4 != 0 || len == 0 {
            return Err(GpioError::InvalidArgument);
        }

        let page_offset = offset & !(PAGE_SIZE as u64 - 1);
        let start = (offset - page_offset) as usize;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)?;

        let mmap = MmapOptions::new()
            .offset(page_offset)
            .len(start + len)
            .map_raw(&file)?;

        Ok(MmapRegisters { mmap, start, len })
    }

    fn word_ptr(&self, offset: usize) -> *mut u32 {
        // SAFETY: callers check the offset against `len`, and `start + len` bytes are mapped.
        unsafe { self.mmap.as_mut_ptr().add(self.start + offset) as *mut u32 }
    }
}

impl Debug for MmapRegisters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MmapRegisters({:#x}+{:#x})", self.mmap.as_ptr().addr(), self.start)
    }
}

impl RegisterBlock for MmapRegisters {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, offset: usize) -> GpioResult<u32> {
        check_offset(self.len, offset)?;
        let value = unsafe { self.word_ptr(offset).read_volatile() };
        Ok(value)
    }

    fn write(&self, offset: usize, value: u32) -> GpioResult<()> {
        check_offset(self.len, offset)?;
        unsafe { self.word_ptr(offset).write_volatile(value) };
        Ok(())
    }
}
