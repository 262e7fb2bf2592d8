use clap::Parser;
use dotenv::dotenv;
use log::{debug, info};
use zynq_gpio::location::{DeviceLocation, parse_number};
use zynq_gpio::mygpio::{GpioMode, GpioValue, MyGpio};
use zynq_gpio::regs::RegisterBlock;
use zynq_gpio::uio::UioDevice;
use zynq_gpio::{GpioResult, PinMask};

/// Reads and writes the registers of a myGPIO device from userspace.
#[derive(Parser, Debug)]
#[command(name = "mygpio")]
#[command(version)]
struct Cli {
    /// Physical base address (`0x43C00000`), UIO node (`/dev/uio0`) or `sim`
    #[arg(short, long, env = "MYGPIO_DEVICE")]
    device: DeviceLocation,

    /// Value written to the mode register, `1` bits are outputs
    #[arg(short, long, value_parser = parse_register)]
    mode: Option<u32>,

    /// Value written to the write register
    #[arg(short, long, value_parser = parse_register)]
    write: Option<u32>,

    /// Print the read register
    #[arg(short, long)]
    read: bool,

    /// Before reading, wait for a pin interrupt (UIO devices only)
    #[arg(long, requires = "read")]
    wait_irq: bool,
}

fn parse_register(s: &str) -> Result<u32, String> {
    let value = parse_number(s).map_err(|e| e.to_string())?;
    u32::try_from(value).map_err(|e| e.to_string())
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();
    debug!("{:?}", cli);

    match &cli.device {
        DeviceLocation::Uio(path) if cli.wait_irq => {
            let uio = UioDevice::open(path)?;
            let gpio = MyGpio::new(&uio)?;
            run(&cli, &gpio, Some(&uio as &dyn InterruptLine))
        }
        location => {
            if cli.wait_irq {
                eyre::bail!("--wait-irq needs a UIO device, got {}", location);
            }
            let gpio = MyGpio::new(location.open()?)?;
            run(&cli, &gpio, None)
        }
    }
}

/// The interrupt line of a device: something to sleep on until the device fires, and to re-arm
/// afterwards.
trait InterruptLine: std::fmt::Debug {
    /// Blocks until the next interrupt. Returns the interrupt count.
    fn wait(&self) -> GpioResult<u32>;
    fn rearm(&self) -> GpioResult<()>;
}

impl InterruptLine for UioDevice {
    fn wait(&self) -> GpioResult<u32> {
        self.wait_interrupt()
    }

    fn rearm(&self) -> GpioResult<()> {
        self.enable_interrupt()
    }
}

fn print_read(read: PinMask) {
    println!("read = {:#010x} ({:032b})", read, read);
}

fn run<R: RegisterBlock>(
    cli: &Cli,
    gpio: &MyGpio<R>,
    irq: Option<&dyn InterruptLine>,
) -> eyre::Result<()> {
    info!("myGPIO @ {}", cli.device);

    if let Some(mode) = cli.mode {
        let mask = PinMask(mode);
        gpio.set_mode(mask, GpioMode::Write)?;
        gpio.set_mode(!mask, GpioMode::Read)?;
        println!("mode <- {:#010x}", mask);
    }

    if let Some(write) = cli.write {
        let mask = PinMask(write);
        gpio.set_value(mask, GpioValue::Set)?;
        gpio.set_value(!mask, GpioValue::Reset)?;
        println!("write <- {:#010x}", mask);
    }

    if cli.read {
        if let Some(irq) = irq {
            wait_for_interrupt(gpio, irq)?;
        } else {
            print_read(gpio.get_read()?);
        }
    }

    Ok(())
}

/// Arms the device, sleeps on its interrupt line until a pin fires, then services the interrupt.
fn wait_for_interrupt<R: RegisterBlock>(
    gpio: &MyGpio<R>,
    irq: &dyn InterruptLine,
) -> eyre::Result<()> {
    gpio.pin_interrupt_enable(PinMask::ALL)?;
    gpio.global_interrupt_enable()?;

    info!("Waiting for an interrupt on {:?}...", irq);
    let count = irq.wait()?;
    println!("interrupt count = {}", count);

    gpio.global_interrupt_disable()?;
    gpio.pin_interrupt_disable(PinMask::ALL)?;
    print_read(gpio.get_read()?);

    // Pins are level sensitive, so wait for the release before acknowledging.
    while gpio.get_read()? != PinMask::NONE {
        std::hint::spin_loop();
    }
    let pending = gpio.pending_pin_interrupt()?;
    debug!("Acknowledging pins {:?}", pending.indices().collect::<Vec<_>>());
    gpio.pin_interrupt_ack(pending)?;
    irq.rearm()?;
    Ok(())
}
