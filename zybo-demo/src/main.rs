mod config;

use crate::config::{Config, LcdConfig};
use dotenv::dotenv;
use log::{debug, info};
use std::thread;
use std::time::Duration;
use zynq_gpio::lcd::hd44780::DisplayExt;
use zynq_gpio::lcd::hd44780::driver::{
    GpioHD44780Driver, HD44780Driver, Hd44780Timing, InterfaceMode,
};
use zynq_gpio::mygpio::MyGpio;
use zynq_gpio::regs::RegisterBlock;
use zynq_gpio::zybo::{ZyboButtons, ZyboLeds, ZyboMask, ZyboStatus, ZyboSwitches};
use zynq_gpio::{GpioDriver, PinMask};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Controls 3..0 of each group sit on pins 3..0 of their device.
const BOARD_PINS: [PinMask; 4] = [PinMask::PIN3, PinMask::PIN2, PinMask::PIN1, PinMask::PIN0];

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("Zybo demo starting...");

    let config = Config::from_env()?;
    debug!("{:?}", config);

    let led_gpio = MyGpio::new(config.led_device.open()?)?;
    let switch_gpio = MyGpio::new(config.switch_device.open()?)?;
    let button_gpio = MyGpio::new(config.button_device.open()?)?;

    let [p3, p2, p1, p0] = BOARD_PINS;
    let leds = ZyboLeds::new(&led_gpio, p3, p2, p1, p0)?;
    let switches = ZyboSwitches::new(&switch_gpio, p3, p2, p1, p0)?;
    let buttons = ZyboButtons::new(&button_gpio, p3, p2, p1, p0)?;

    let mirror = || -> eyre::Result<()> {
        info!("Mirroring buttons and switches on the LEDs.");
        loop {
            mirror_once(&leds, &switches, &buttons)?;
            thread::sleep(POLL_INTERVAL);
        }
    };

    match &config.lcd {
        Some(lcd_config) => {
            let lcd_gpio = MyGpio::new(lcd_config.device.open()?)?;
            with_lcd(&lcd_gpio, lcd_config, Hd44780Timing::default(), |lcd| {
                lcd.clear()?;
                lcd.print("Hello world!")?;
                debug!("{:?} initialized.", lcd);
                mirror()
            })
        }
        None => mirror(),
    }
}

/// Lights each LED while its button is pressed or its switch is on.
fn mirror_once<R: RegisterBlock>(
    leds: &ZyboLeds<'_, R>,
    switches: &ZyboSwitches<'_, R>,
    buttons: &ZyboButtons<'_, R>,
) -> eyre::Result<()> {
    for i in 0..4 {
        let mask = ZyboMask::bit(i)?;
        let on = buttons.get_status(mask)?.is_on() || switches.get_status(mask)?.is_on();
        leds.set_status(mask, ZyboStatus::from(on))?;
    }
    Ok(())
}

/// Acquires the LCD pins, initializes the display and hands it to `f`. The pins are released
/// when `f` returns.
fn with_lcd<R: RegisterBlock>(
    gpio: &MyGpio<R>,
    config: &LcdConfig,
    timing: Hd44780Timing,
    f: impl FnOnce(&mut dyn HD44780Driver) -> eyre::Result<()>,
) -> eyre::Result<()> {
    info!(
        "LCD @ RS: {}, RW: {}, E: {}, Data: {:?} ({:?})",
        config.pin_rs, config.pin_rw, config.pin_e, config.pins_data, config.mode
    );

    let mut e_pin = gpio.get_pin(config.pin_e)?;
    let e_out = e_pin.as_output()?;
    let mut rw_pin = gpio.get_pin(config.pin_rw)?;
    let rw_out = rw_pin.as_output()?;
    let mut rs_pin = gpio.get_pin(config.pin_rs)?;
    let rs_out = rs_pin.as_output()?;
    let data = config.data_bus_lsb_first();

    match config.mode {
        InterfaceMode::Bits4 => {
            let indices: [usize; 4] = data
                .try_into()
                .map_err(|_| eyre::eyre!("Invalid number of data pins"))?;
            let mut bus = gpio.get_pin_bus(indices)?;
            let mut lcd = GpioHD44780Driver::new_4bit(&*e_out, Some(&*rw_out), &*rs_out, &mut *bus)
                .with_timing(timing);
            lcd.init()?;
            f(&mut lcd)
        }
        InterfaceMode::Bits8 => {
            let indices: [usize; 8] = data
                .try_into()
                .map_err(|_| eyre::eyre!("Invalid number of data pins"))?;
            let mut bus = gpio.get_pin_bus(indices)?;
            let mut lcd = GpioHD44780Driver::new_8bit(&*e_out, Some(&*rw_out), &*rs_out, &mut *bus)
                .with_timing(timing);
            lcd.init()?;
            f(&mut lcd)
        }
    }
}
