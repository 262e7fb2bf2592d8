use thiserror::Error;
use zynq_gpio::lcd::hd44780::driver::InterfaceMode;
use zynq_gpio::location::DeviceLocation;
use zynq_gpio::GpioError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid { key, reason: reason.to_string() }
    }
}

/// HD44780 wiring, as myGPIO pin indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdConfig {
    pub device: DeviceLocation,
    pub mode: InterfaceMode,
    pub pin_rs: usize,
    pub pin_rw: usize,
    pub pin_e: usize,
    /// Data lines, D7 first.
    pub pins_data: Vec<usize>,
}

impl LcdConfig {
    /// D4..D7 in 4-bit mode, D0..D7 in 8-bit mode.
    pub fn data_bus_lsb_first(&self) -> Vec<usize> {
        self.pins_data.iter().rev().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub led_device: DeviceLocation,
    pub switch_device: DeviceLocation,
    pub button_device: DeviceLocation,
    pub lcd: Option<LcdConfig>,
}

const DEFAULT_LCD_PINS_CTRL: [usize; 3] = [10, 9, 8];
const DEFAULT_LCD_PINS_DATA_4BIT: [usize; 4] = [0, 1, 2, 3];
const DEFAULT_LCD_PINS_DATA_8BIT: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

fn parse_pins(key: &'static str, pin_str: &str) -> Result<Vec<usize>, ConfigError> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|e| ConfigError::invalid(key, e)))
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let device = |key: &'static str| -> Result<DeviceLocation, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::Missing(key))?;
            value.parse().map_err(|e: GpioError| ConfigError::invalid(key, e))
        };

        let led_device = device("ZYBO_LED_DEVICE")?;
        let switch_device = device("ZYBO_SWITCH_DEVICE")?;
        let button_device = device("ZYBO_BUTTON_DEVICE")?;

        let lcd = match lookup("ZYBO_LCD_DEVICE") {
            None => None,
            Some(_) => Some(Self::lcd_from_lookup(device("ZYBO_LCD_DEVICE")?, &lookup)?),
        };

        Ok(Config { led_device, switch_device, button_device, lcd })
    }

    fn lcd_from_lookup(
        device: DeviceLocation,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<LcdConfig, ConfigError> {
        let mode = match lookup("ZYBO_LCD_MODE").as_deref().map(str::trim) {
            None | Some("4") => InterfaceMode::Bits4,
            Some("8") => InterfaceMode::Bits8,
            Some(other) => {
                let reason = format!("expected 4 or 8, got {other:?}");
                return Err(ConfigError::invalid("ZYBO_LCD_MODE", reason));
            }
        };

        let ctrl = match lookup("ZYBO_LCD_PINS_CTRL") {
            Some(s) => parse_pins("ZYBO_LCD_PINS_CTRL", &s)?,
            None => DEFAULT_LCD_PINS_CTRL.to_vec(),
        };
        let [pin_rs, pin_rw, pin_e] = ctrl[..] else {
            return Err(ConfigError::invalid("ZYBO_LCD_PINS_CTRL", "expected RS, RW and E"));
        };

        let pins_data = match lookup("ZYBO_LCD_PINS_DATA") {
            Some(s) => parse_pins("ZYBO_LCD_PINS_DATA", &s)?,
            None if mode == InterfaceMode::Bits4 => DEFAULT_LCD_PINS_DATA_4BIT.to_vec(),
            None => DEFAULT_LCD_PINS_DATA_8BIT.to_vec(),
        };
        let expected = match mode {
            InterfaceMode::Bits4 => 4,
            InterfaceMode::Bits8 => 8,
        };
        if pins_data.len() != expected {
            return Err(ConfigError::invalid(
                "ZYBO_LCD_PINS_DATA",
                format!("expected {expected} data pins, got {}", pins_data.len()),
            ));
        }

        Ok(LcdConfig { device, mode, pin_rs, pin_rw, pin_e, pins_data })
    }
}
