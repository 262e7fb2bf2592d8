//! Direct physical memory access through `/dev/mem`.
//!
//! Needs root, and bypasses any kernel driver bound to the device. Prefer [crate::uio] when the
//! device tree exposes the peripheral as a UIO device.

use crate::regs::{MmapRegisters, PAGE_SIZE};
use crate::GpioResult;
use log::debug;

pub const DEV_MEM: &str = "/dev/mem";

/// Maps the registers of the device at physical address `address`.
///
/// The whole page containing the address is mapped; the returned window starts at `address` and
/// ends at the end of that page.
pub fn open_physical(address: u64) -> GpioResult<MmapRegisters> {
    let in_page = (address as usize) & (PAGE_SIZE - 1);
    debug!("Mapping {} @ {:#010x} (page offset {:#x})", DEV_MEM, address, in_page);
    MmapRegisters::open(DEV_MEM, address, PAGE_SIZE - in_page)
}
