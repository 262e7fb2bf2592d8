//! Driver for the myGPIO AXI peripheral.
//!
//! The core is a 32-bit GPIO with per-pin direction and interrupts. All of its state lives in
//! seven word registers:
//!
//! | register | offset | meaning |
//! |----------|--------|---------|
//! | `mode`   | `0x00` | `1` = output, `0` = input |
//! | `write`  | `0x04` | output latch |
//! | `read`   | `0x08` | sampled pin levels |
//! | `gies`   | `0x0C` | bit 0: global interrupt enable, bit 1: interrupt pending |
//! | `pie`    | `0x10` | per-pin interrupt enable |
//! | `irq`    | `0x14` | per-pin pending interrupts |
//! | `iack`   | `0x18` | write `1`s to acknowledge pending pins |
//!
//! [MyGpio] exposes these registers through mask-based operations, and also implements
//! [GpioDriver] so single pins and buses can be handed to device drivers like
//! [crate::lcd::hd44780::driver::GpioHD44780Driver].

use crate::regs::RegisterBlock;
use crate::{
    GpioActiveLevel, GpioBus, GpioBusInput, GpioBusOutput, GpioDriver, GpioError, GpioInput,
    GpioOutput, GpioPin, GpioResult, PinMask,
};
use bitvec::vec::BitVec;
use log::{debug, trace};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::AtomicU8;

/// Direction of a pin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GpioMode {
    /// Input.
    Read,
    /// Output.
    Write,
}

/// Logic level of a pin.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioValue {
    /// Logic `0`.
    #[default] Reset,
    /// Logic `1`.
    Set,
}

impl GpioValue {
    pub fn is_set(self) -> bool {
        self == GpioValue::Set
    }
}

impl From<bool> for GpioValue {
    fn from(value: bool) -> Self {
        if value { GpioValue::Set } else { GpioValue::Reset }
    }
}

/// Byte offsets of the myGPIO registers from the device base address.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MyGpioLayout {
    pub mode: usize,
    pub write: usize,
    pub read: usize,
    pub gies: usize,
    pub pie: usize,
    pub irq: usize,
    pub iack: usize,
}

impl MyGpioLayout {
    pub const MODE_OFFSET: usize = 0x00;
    pub const WRITE_OFFSET: usize = 0x04;
    pub const READ_OFFSET: usize = 0x08;
    pub const GIES_OFFSET: usize = 0x0C;
    pub const PIE_OFFSET: usize = 0x10;
    pub const IRQ_OFFSET: usize = 0x14;
    pub const IACK_OFFSET: usize = 0x18;

    /// Bytes spanned by the default layout.
    pub const SIZE: usize = 0x1C;

    fn offsets(&self) -> [usize; 7] {
        [self.mode, self.write, self.read, self.gies, self.pie, self.irq, self.iack]
    }

    /// Checks that every register is word-aligned, inside a window of `len` bytes and not shared
    /// with another register.
    pub fn validate(&self, len: usize) -> GpioResult<()> {
        let offsets = self.offsets();
        for (i, &offset) in offsets.iter().enumerate() {
            if offset % 4 != 0 || offset + 4 > len || offsets[..i].contains(&offset) {
                return Err(GpioError::InvalidArgument);
            }
        }
        Ok(())
    }
}

impl Default for MyGpioLayout {
    fn default() -> Self {
        MyGpioLayout {
            mode: Self::MODE_OFFSET,
            write: Self::WRITE_OFFSET,
            read: Self::READ_OFFSET,
            gies: Self::GIES_OFFSET,
            pie: Self::PIE_OFFSET,
            irq: Self::IRQ_OFFSET,
            iack: Self::IACK_OFFSET,
        }
    }
}

const GIES_ENABLE: u32 = 0b01;
const GIES_PENDING: u32 = 0b10;

pub struct MyGpio<R: RegisterBlock> {
    regs: R,
    layout: MyGpioLayout,
    used_pins: BitVec<AtomicU8>,
}

impl<R: RegisterBlock> MyGpio<R> {
    pub const PIN_COUNT: usize = 32;

    /// Creates a driver for a myGPIO device with the default register layout.
    pub fn new(regs: R) -> GpioResult<Self> {
        Self::with_layout(regs, MyGpioLayout::default())
    }

    /// Creates a driver for a device whose registers sit at non-standard offsets.
    pub fn with_layout(regs: R, layout: MyGpioLayout) -> GpioResult<Self> {
        layout.validate(regs.len())?;
        debug!("myGPIO on {:?} with {:?}", regs, layout);
        Ok(MyGpio {
            regs,
            layout,
            used_pins: BitVec::repeat(false, Self::PIN_COUNT),
        })
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn layout(&self) -> &MyGpioLayout {
        &self.layout
    }

    /// Switches the selected pins to input ([GpioMode::Read]) or output ([GpioMode::Write]).
    /// Other pins keep their direction.
    pub fn set_mode(&self, mask: PinMask, mode: GpioMode) -> GpioResult<()> {
        trace!("set_mode: mask={:?} mode={:?}", mask, mode);
        self.regs.modify(self.layout.mode, |value| match mode {
            GpioMode::Write => value | mask.bits(),
            GpioMode::Read => value & !mask.bits(),
        })
    }

    /// Sets or clears the output latch of the selected pins.
    pub fn set_value(&self, mask: PinMask, value: GpioValue) -> GpioResult<()> {
        trace!("set_value: mask={:?} value={:?}", mask, value);
        self.regs.modify(self.layout.write, |latch| match value {
            GpioValue::Set => latch | mask.bits(),
            GpioValue::Reset => latch & !mask.bits(),
        })
    }

    /// Rewrites the selected pins of the output latch with `bits` in a single register write.
    pub fn write_masked(&self, mask: PinMask, bits: PinMask) -> GpioResult<()> {
        trace!("write_masked: mask={:?} bits={:?}", mask, bits);
        self.regs.modify(self.layout.write, |latch| {
            (latch & !mask.bits()) | (bits.bits() & mask.bits())
        })
    }

    /// Inverts the output latch of the selected pins.
    pub fn toggle(&self, mask: PinMask) -> GpioResult<()> {
        self.regs.modify(self.layout.write, |latch| latch ^ mask.bits())
    }

    /// Returns [GpioValue::Set] if any of the selected pins reads high.
    pub fn get_value(&self, mask: PinMask) -> GpioResult<GpioValue> {
        let read = self.regs.read(self.layout.read)?;
        Ok((read & mask.bits() != 0).into())
    }

    /// Returns the whole `read` register.
    pub fn get_read(&self) -> GpioResult<PinMask> {
        Ok(self.regs.read(self.layout.read)?.into())
    }

    pub fn global_interrupt_enable(&self) -> GpioResult<()> {
        self.regs.write(self.layout.gies, GIES_ENABLE)
    }

    pub fn global_interrupt_disable(&self) -> GpioResult<()> {
        self.regs.write(self.layout.gies, 0)
    }

    pub fn is_global_interrupt_enabled(&self) -> GpioResult<bool> {
        Ok(self.regs.read(self.layout.gies)? & GIES_ENABLE != 0)
    }

    /// Whether the device is currently asserting its interrupt line.
    pub fn pending_interrupt(&self) -> GpioResult<bool> {
        Ok(self.regs.read(self.layout.gies)? & GIES_PENDING != 0)
    }

    pub fn pin_interrupt_enable(&self, mask: PinMask) -> GpioResult<()> {
        self.regs.modify(self.layout.pie, |pie| pie | mask.bits())
    }

    pub fn pin_interrupt_disable(&self, mask: PinMask) -> GpioResult<()> {
        self.regs.modify(self.layout.pie, |pie| pie & !mask.bits())
    }

    pub fn enabled_pin_interrupt(&self) -> GpioResult<PinMask> {
        Ok(self.regs.read(self.layout.pie)?.into())
    }

    pub fn pending_pin_interrupt(&self) -> GpioResult<PinMask> {
        Ok(self.regs.read(self.layout.irq)?.into())
    }

    /// Acknowledges the pending interrupts of the selected pins.
    pub fn pin_interrupt_ack(&self, mask: PinMask) -> GpioResult<()> {
        self.regs.write(self.layout.iack, mask.bits())
    }

    fn reset_pins(&self, mask: PinMask) -> GpioResult<()> {
        self.set_mode(mask, GpioMode::Read)?;
        self.set_value(mask, GpioValue::Reset)
    }

    fn mask_of(indices: &[usize]) -> GpioResult<PinMask> {
        let mut mask = PinMask::NONE;
        for &index in indices {
            mask |= PinMask::try_pin(index)?;
        }
        Ok(mask)
    }
}

impl<R: RegisterBlock> Debug for MyGpio<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MyGpio({:?})", self.regs)
    }
}

impl<R: RegisterBlock> GpioDriver for MyGpio<R> {
    fn count(&self) -> GpioResult<usize> {
        Ok(Self::PIN_COUNT)
    }

    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>> {
        if index >= self.count()? {
            return Err(GpioError::InvalidArgument);
        }

        if self.used_pins[index] {
            return Err(GpioError::AlreadyInUse);
        }

        let mask = PinMask::try_pin(index)?;
        self.reset_pins(mask)?;
        self.used_pins.set_aliased(index, true);

        Ok(Box::new(MyGpioPin {
            driver: self,
            pin_index: index,
            mask,
            active_level: GpioActiveLevel::High,
        }))
    }

    fn get_pin_bus<const N: usize>(
        &self,
        indices: [usize; N],
    ) -> GpioResult<Box<dyn GpioBus<N> + '_>> {
        let n = self.count()?;

        if indices.iter().any(|&index| index >= n) {
            return Err(GpioError::InvalidArgument);
        }

        if indices
            .iter()
            .enumerate()
            .any(|(i, index)| indices[..i].contains(index))
        {
            return Err(GpioError::InvalidArgument);
        }

        if indices.iter().any(|&index| self.used_pins[index]) {
            return Err(GpioError::AlreadyInUse);
        }

        let mask = Self::mask_of(&indices)?;
        self.reset_pins(mask)?;
        for &index in &indices {
            self.used_pins.set_aliased(index, true);
        }

        Ok(Box::new(MyGpioBus {
            driver: self,
            pin_indices: indices,
            mask,
            active_level: GpioActiveLevel::High,
        }))
    }
}

struct MyGpioPin<'a, R: RegisterBlock> {
    driver: &'a MyGpio<R>,
    pin_index: usize,
    mask: PinMask,
    active_level: GpioActiveLevel,
}

impl<R: RegisterBlock> Debug for MyGpioPin<'_, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{}]", self.driver, self.pin_index)
    }
}

impl<R: RegisterBlock> GpioPin for MyGpioPin<'_, R> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioInput + '_>> {
        self.driver.set_mode(self.mask, GpioMode::Read)?;
        Ok(Box::new(MyGpioInput { pin: self }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>> {
        self.driver.set_mode(self.mask, GpioMode::Write)?;
        Ok(Box::new(MyGpioOutput { pin: self }))
    }

    fn supports_active_level(&self) -> bool {
        true
    }

    fn active_level(&self) -> GpioActiveLevel {
        self.active_level
    }

    fn set_active_level(&mut self, level: GpioActiveLevel) -> GpioResult<()> {
        self.active_level = level;
        Ok(())
    }
}

impl<R: RegisterBlock> Drop for MyGpioPin<'_, R> {
    fn drop(&mut self) {
        _ = self.driver.set_mode(self.mask, GpioMode::Read);
        self.driver.used_pins.set_aliased(self.pin_index, false);
    }
}

struct MyGpioInput<'a, R: RegisterBlock> {
    pin: &'a MyGpioPin<'a, R>,
}

impl<R: RegisterBlock> Debug for MyGpioInput<'_, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[input]", self.pin)
    }
}

impl<R: RegisterBlock> GpioInput for MyGpioInput<'_, R> {
    fn read(&self) -> GpioResult<bool> {
        let level = self.pin.driver.get_value(self.pin.mask)?.is_set();
        Ok(self.pin.active_level.get_state(level))
    }
}

struct MyGpioOutput<'a, R: RegisterBlock> {
    pin: &'a MyGpioPin<'a, R>,
}

impl<R: RegisterBlock> Debug for MyGpioOutput<'_, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[output]", self.pin)
    }
}

impl<R: RegisterBlock> GpioOutput for MyGpioOutput<'_, R> {
    fn write(&self, value: bool) -> GpioResult<()> {
        let level = self.pin.active_level.get_state(value);
        self.pin.driver.set_value(self.pin.mask, level.into())
    }
}

struct MyGpioBus<'a, R: RegisterBlock, const N: usize> {
    driver: &'a MyGpio<R>,
    pin_indices: [usize; N],
    mask: PinMask,
    active_level: GpioActiveLevel,
}

impl<R: RegisterBlock, const N: usize> Debug for MyGpioBus<'_, R, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{:?}", self.driver, self.pin_indices)
    }
}

impl<R: RegisterBlock, const N: usize> GpioBus<N> for MyGpioBus<'_, R, N> {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>> {
        self.driver.set_mode(self.mask, GpioMode::Read)?;
        Ok(Box::new(MyGpioBusInput { bus: self }))
    }

    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>> {
        self.driver.set_mode(self.mask, GpioMode::Write)?;
        Ok(Box::new(MyGpioBusOutput { bus: self }))
    }

    fn supports_active_level(&self) -> bool {
        true
    }

    fn active_level(&self) -> GpioActiveLevel {
        self.active_level
    }

    fn set_active_level(&mut self, level: GpioActiveLevel) -> GpioResult<()> {
        self.active_level = level;
        Ok(())
    }
}

impl<R: RegisterBlock, const N: usize> Drop for MyGpioBus<'_, R, N> {
    fn drop(&mut self) {
        _ = self.driver.set_mode(self.mask, GpioMode::Read);
        for &pin_index in &self.pin_indices {
            self.driver.used_pins.set_aliased(pin_index, false);
        }
    }
}

struct MyGpioBusInput<'a, R: RegisterBlock, const N: usize> {
    bus: &'a MyGpioBus<'a, R, N>,
}

impl<R: RegisterBlock, const N: usize> Debug for MyGpioBusInput<'_, R, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[input]", self.bus)
    }
}

impl<R: RegisterBlock, const N: usize> GpioBusInput<N> for MyGpioBusInput<'_, R, N> {
    fn read(&self) -> GpioResult<[bool; N]> {
        // One register read, so all lines are sampled at the same time.
        let read = self.bus.driver.get_read()?;
        let mut values = [false; N];
        for (i, &pin_index) in self.bus.pin_indices.iter().enumerate() {
            let level = read.bits() & (1 << pin_index) != 0;
            values[i] = self.bus.active_level.get_state(level);
        }
        Ok(values)
    }
}

struct MyGpioBusOutput<'a, R: RegisterBlock, const N: usize> {
    bus: &'a MyGpioBus<'a, R, N>,
}

impl<R: RegisterBlock, const N: usize> Debug for MyGpioBusOutput<'_, R, N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[output]", self.bus)
    }
}

impl<R: RegisterBlock, const N: usize> GpioBusOutput<N> for MyGpioBusOutput<'_, R, N> {
    fn write(&self, values: &[bool; N]) -> GpioResult<()> {
        let mut bits = PinMask::NONE;
        for (i, &pin_index) in self.bus.pin_indices.iter().enumerate() {
            if self.bus.active_level.get_state(values[i]) {
                bits |= PinMask(1 << pin_index);
            }
        }
        self.bus.driver.write_masked(self.bus.mask, bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRegisters;
    use std::sync::atomic::{AtomicBool, Ordering};

    const MODE: usize = MyGpioLayout::MODE_OFFSET;
    const WRITE: usize = MyGpioLayout::WRITE_OFFSET;
    const READ: usize = MyGpioLayout::READ_OFFSET;
    const GIES: usize = MyGpioLayout::GIES_OFFSET;
    const PIE: usize = MyGpioLayout::PIE_OFFSET;
    const IRQ: usize = MyGpioLayout::IRQ_OFFSET;
    const IACK: usize = MyGpioLayout::IACK_OFFSET;

    fn device() -> MyGpio<SimRegisters> {
        MyGpio::new(SimRegisters::new(MyGpioLayout::SIZE)).unwrap()
    }

    #[test]
    fn set_mode_only_touches_selected_pins() {
        let gpio = device();
        gpio.registers().set(MODE, 0xF0);
        gpio.set_mode(PinMask::PIN0 | PinMask::PIN1, GpioMode::Write).unwrap();
        assert_eq!(gpio.registers().get(MODE), 0xF3);
        gpio.set_mode(PinMask::PIN4, GpioMode::Read).unwrap();
        assert_eq!(gpio.registers().get(MODE), 0xE3);
    }

    #[test]
    fn set_value_and_toggle() {
        let gpio = device();
        gpio.set_value(PinMask::BYTE0, GpioValue::Set).unwrap();
        assert_eq!(gpio.registers().get(WRITE), 0xFF);
        gpio.set_value(PinMask::PIN3, GpioValue::Reset).unwrap();
        assert_eq!(gpio.registers().get(WRITE), 0xF7);
        gpio.toggle(PinMask::PIN3 | PinMask::PIN8).unwrap();
        assert_eq!(gpio.registers().get(WRITE), 0x1FF);
    }

    #[test]
    fn write_masked_preserves_other_pins() {
        let gpio = device();
        gpio.registers().set(WRITE, 0xA5);
        gpio.write_masked(PinMask::PIN0 | PinMask::PIN1, PinMask::PIN1 | PinMask::PIN7).unwrap();
        assert_eq!(gpio.registers().get(WRITE), 0xA6);
    }

    #[test]
    fn get_value_is_set_if_any_pin_is_high() {
        let gpio = device();
        gpio.registers().set(READ, 0b0100);
        assert_eq!(gpio.get_value(PinMask::PIN2).unwrap(), GpioValue::Set);
        assert_eq!(gpio.get_value(PinMask::PIN0 | PinMask::PIN2).unwrap(), GpioValue::Set);
        assert_eq!(gpio.get_value(PinMask::PIN0 | PinMask::PIN1).unwrap(), GpioValue::Reset);
        assert_eq!(gpio.get_read().unwrap(), PinMask(0b0100));
    }

    #[test]
    fn interrupt_registers() {
        let gpio = device();
        gpio.global_interrupt_enable().unwrap();
        assert_eq!(gpio.registers().get(GIES), 1);
        assert!(gpio.is_global_interrupt_enabled().unwrap());
        assert!(!gpio.pending_interrupt().unwrap());
        gpio.registers().set(GIES, 0b11);
        assert!(gpio.pending_interrupt().unwrap());
        gpio.global_interrupt_disable().unwrap();
        assert!(!gpio.is_global_interrupt_enabled().unwrap());

        gpio.pin_interrupt_enable(PinMask::PIN0 | PinMask::PIN5).unwrap();
        gpio.pin_interrupt_disable(PinMask::PIN0).unwrap();
        assert_eq!(gpio.registers().get(PIE), 1 << 5);
        assert_eq!(gpio.enabled_pin_interrupt().unwrap(), PinMask::PIN5);

        gpio.registers().set(IRQ, 1 << 5);
        assert_eq!(gpio.pending_pin_interrupt().unwrap(), PinMask::PIN5);
        gpio.pin_interrupt_ack(PinMask::PIN5).unwrap();
        assert_eq!(gpio.registers().get(IACK), 1 << 5);
    }

    #[test]
    fn layout_must_fit_and_not_overlap() {
        let too_small = MyGpio::new(SimRegisters::new(0x18));
        assert_eq!(too_small.unwrap_err(), GpioError::InvalidArgument);

        let overlapping = MyGpioLayout { irq: MyGpioLayout::PIE_OFFSET, ..Default::default() };
        let gpio = MyGpio::with_layout(SimRegisters::new(0x20), overlapping);
        assert_eq!(gpio.unwrap_err(), GpioError::InvalidArgument);

        let unaligned = MyGpioLayout { iack: 0x19, ..Default::default() };
        assert_eq!(unaligned.validate(0x20), Err(GpioError::InvalidArgument));
    }

    #[test]
    fn pins_are_exclusive() {
        let gpio = device();
        let pin = gpio.get_pin(3).unwrap();
        assert_eq!(gpio.get_pin(3).unwrap_err(), GpioError::AlreadyInUse);
        assert_eq!(gpio.get_pin_bus([2, 3]).unwrap_err(), GpioError::AlreadyInUse);
        drop(pin);
        assert!(gpio.get_pin(3).is_ok());
        assert_eq!(gpio.get_pin(32).unwrap_err(), GpioError::InvalidArgument);
    }

    /// Fails every register write while `broken` is set.
    #[derive(Debug)]
    struct BrokenBus {
        regs: SimRegisters,
        broken: AtomicBool,
    }

    impl RegisterBlock for BrokenBus {
        fn len(&self) -> usize {
            self.regs.len()
        }

        fn read(&self, offset: usize) -> GpioResult<u32> {
            self.regs.read(offset)
        }

        fn write(&self, offset: usize, value: u32) -> GpioResult<()> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(GpioError::Io(std::io::ErrorKind::BrokenPipe));
            }
            self.regs.write(offset, value)
        }
    }

    #[test]
    fn failed_reset_leaves_pins_free() {
        let gpio = MyGpio::new(BrokenBus {
            regs: SimRegisters::new(MyGpioLayout::SIZE),
            broken: AtomicBool::new(true),
        })
        .unwrap();
        assert_eq!(
            gpio.get_pin(3).unwrap_err(),
            GpioError::Io(std::io::ErrorKind::BrokenPipe)
        );
        assert!(gpio.get_pin_bus([4, 5]).is_err());

        gpio.registers().broken.store(false, Ordering::SeqCst);
        assert!(gpio.get_pin(3).is_ok());
        assert!(gpio.get_pin_bus([4, 5]).is_ok());
    }

    #[test]
    fn bus_rejects_repeated_indices() {
        let gpio = device();
        assert_eq!(gpio.get_pin_bus([1, 2, 1]).unwrap_err(), GpioError::InvalidArgument);
        assert!(gpio.get_pin(1).is_ok());
    }

    #[test]
    fn pin_output_drives_its_bit() {
        let gpio = device();
        let mut pin = gpio.get_pin(9).unwrap();
        {
            let out = pin.as_output().unwrap();
            assert_eq!(gpio.registers().get(MODE), 1 << 9);
            out.write(true).unwrap();
            assert_eq!(gpio.registers().get(WRITE), 1 << 9);
            out.write(false).unwrap();
            assert_eq!(gpio.registers().get(WRITE), 0);
        }
        drop(pin);
        assert_eq!(gpio.registers().get(MODE), 0);
    }

    #[test]
    fn active_low_input() {
        let gpio = device();
        let mut pin = gpio.get_pin(4).unwrap();
        pin.set_active_level(GpioActiveLevel::Low).unwrap();
        let input = pin.as_input().unwrap();
        assert!(input.read().unwrap());
        gpio.registers().set(READ, 1 << 4);
        assert!(!input.read().unwrap());
    }

    #[test]
    fn bus_writes_in_one_go() {
        let gpio = device();
        gpio.registers().set(WRITE, 1 << 31);
        let mut bus = gpio.get_pin_bus([0, 1, 2, 3]).unwrap();
        assert_eq!(gpio.registers().get(WRITE), 1 << 31);
        let out = bus.as_output().unwrap();
        assert_eq!(gpio.registers().get(MODE), 0xF);
        out.write_nibble(0b1001).unwrap();
        assert_eq!(gpio.registers().get(WRITE), (1 << 31) | 0b1001);
    }

    #[test]
    fn bus_reads_in_index_order() {
        let gpio = device();
        let mut bus = gpio.get_pin_bus([10, 9, 8, 7]).unwrap();
        let input = bus.as_input().unwrap();
        gpio.registers().set(READ, 1 << 10 | 1 << 7);
        assert_eq!(input.read_nibble().unwrap(), 0b1001);
    }
}
