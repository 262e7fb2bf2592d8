use crate::lcd::hd44780::driver::{HD44780Driver, ROW2_ADDRESS, ROW_LENGTH};
use crate::{GpioError, GpioResult};
use log::warn;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Text and number output for any [HD44780Driver].
pub trait DisplayExt {
    /// Writes a single character at the cursor.
    fn printc(&mut self, c: char) -> GpioResult<()>;
    /// Writes a string at the cursor. Non-ASCII characters are shown as `?`.
    fn print(&mut self, s: &str) -> GpioResult<()>;

    /// Writes `value` as 8 binary digits, most significant first.
    fn print_binary8(&mut self, value: u8) -> GpioResult<()>;
    fn print_binary32(&mut self, value: u32) -> GpioResult<()>;
    fn print_binary64(&mut self, value: u64) -> GpioResult<()>;

    /// Writes `value` as 2 uppercase hexadecimal digits, most significant first.
    fn print_hex8(&mut self, value: u8) -> GpioResult<()>;
    fn print_hex32(&mut self, value: u32) -> GpioResult<()>;
    fn print_hex64(&mut self, value: u64) -> GpioResult<()>;

    /// Moves the cursor to `col` (0..40) on `row` (0 or 1).
    fn set_cursor(&mut self, row: usize, col: usize) -> GpioResult<()>;
}

fn ascii_or_placeholder(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        warn!("Non-ASCII character: {}", c);
        b'?'
    }
}

impl<T: ?Sized + HD44780Driver> DisplayExt for T {
    fn printc(&mut self, c: char) -> GpioResult<()> {
        self.send_data(ascii_or_placeholder(c))
    }

    fn print(&mut self, s: &str) -> GpioResult<()> {
        for c in s.chars() {
            self.send_data(ascii_or_placeholder(c))?;
        }
        Ok(())
    }

    fn print_binary8(&mut self, value: u8) -> GpioResult<()> {
        self.print_binary64_width(value.into(), 8)
    }

    fn print_binary32(&mut self, value: u32) -> GpioResult<()> {
        self.print_binary64_width(value.into(), 32)
    }

    fn print_binary64(&mut self, value: u64) -> GpioResult<()> {
        self.print_binary64_width(value, 64)
    }

    fn print_hex8(&mut self, value: u8) -> GpioResult<()> {
        self.print_hex64_width(value.into(), 2)
    }

    fn print_hex32(&mut self, value: u32) -> GpioResult<()> {
        self.print_hex64_width(value.into(), 8)
    }

    fn print_hex64(&mut self, value: u64) -> GpioResult<()> {
        self.print_hex64_width(value, 16)
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> GpioResult<()> {
        if row >= 2 || col >= ROW_LENGTH {
            return Err(GpioError::InvalidArgument);
        }
        self.set_ddram_address(ROW2_ADDRESS * row as u8 + col as u8)
    }
}

trait DigitsExt {
    fn print_binary64_width(&mut self, value: u64, bits: u32) -> GpioResult<()>;
    fn print_hex64_width(&mut self, value: u64, digits: u32) -> GpioResult<()>;
}

impl<T: ?Sized + HD44780Driver> DigitsExt for T {
    fn print_binary64_width(&mut self, value: u64, bits: u32) -> GpioResult<()> {
        for i in (0..bits).rev() {
            let digit = if value >> i & 1 != 0 { b'1' } else { b'0' };
            self.send_data(digit)?;
        }
        Ok(())
    }

    fn print_hex64_width(&mut self, value: u64, digits: u32) -> GpioResult<()> {
        for i in (0..digits).rev() {
            let nibble = (value >> (i * 4)) & 0xF;
            self.send_data(HEX_DIGITS[nibble as usize])?;
        }
        Ok(())
    }
}
