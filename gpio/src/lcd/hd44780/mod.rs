//! HD44780 LCD module.
//!
//! [driver::HD44780Driver] is the command interface of the controller and
//! [driver::GpioHD44780Driver] drives it over GPIO lines, with either a 4-bit or an 8-bit data bus.
//! Text and number output lives in the [DisplayExt] extension trait, which works for any driver.

pub mod driver;
mod print;

pub use print::*;
