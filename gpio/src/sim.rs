//! In-memory register file.
//!
//! Behaves as plain memory: every register keeps the last value written to it. Other code (a
//! test, or a thread playing the role of the hardware) can drive input registers through
//! [SimRegisters::set].

use crate::regs::{RegisterBlock, check_offset};
use crate::GpioResult;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

pub struct SimRegisters {
    words: Vec<AtomicU32>,
}

impl SimRegisters {
    /// Creates a zeroed register file of `len` bytes, rounded up to whole words.
    pub fn new(len: usize) -> Self {
        let words = (0..len.div_ceil(4)).map(|_| AtomicU32::new(0)).collect();
        SimRegisters { words }
    }

    /// Sets a register as if the device had changed it.
    ///
    /// # Panics
    /// Panics if `offset` is unaligned or out of range.
    pub fn set(&self, offset: usize, value: u32) {
        self.words[Self::index(offset)].store(value, Ordering::SeqCst);
    }

    /// Gets a register value without going through the [RegisterBlock] checks.
    ///
    /// # Panics
    /// Panics if `offset` is unaligned or out of range.
    pub fn get(&self, offset: usize) -> u32 {
        self.words[Self::index(offset)].load(Ordering::SeqCst)
    }

    fn index(offset: usize) -> usize {
        assert_eq!(offset % 4, 0, "unaligned register offset {offset:#x}");
        offset / 4
    }
}

impl Debug for SimRegisters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimRegisters({} words)", self.words.len())
    }
}

impl RegisterBlock for SimRegisters {
    fn len(&self) -> usize {
        self.words.len() * 4
    }

    fn read(&self, offset: usize) -> GpioResult<u32> {
        check_offset(self.len(), offset)?;
        Ok(self.words[offset / 4].load(Ordering::SeqCst))
    }

    fn write(&self, offset: usize, value: u32) -> GpioResult<()> {
        check_offset(self.len(), offset)?;
        self.words[offset / 4].store(value, Ordering::SeqCst);
        Ok(())
    }
}
