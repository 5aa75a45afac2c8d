#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_svc::hal::{
        i2c::{I2cConfig, I2cDriver},
        prelude::*,
    };
    use log::*;
    use thermopulse::{
        adc::ThermistorInput,
        app::{App, Board},
        button::ModeButton,
        clock::SystemClock,
        config::Config,
        max30105::Max30105,
        pulse::PeakDetector,
        tm1637::Tm1637,
    };

    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let config = Config::from_build_env();
    info!(
        "Calibration offset {} °C, brightness {}",
        config.thermistor.calibration_offset_c, config.brightness
    );

    // Standard mode I2C for the optical sensor
    let i2c_config = I2cConfig::new().baudrate(100.kHz().into());
    let i2c = I2cDriver::new(peripherals.i2c0, pins.gpio4, pins.gpio5, &i2c_config)?;

    let board = Board {
        adc: ThermistorInput::new(peripherals.adc1, pins.gpio3)?,
        display: Tm1637::new(pins.gpio6, pins.gpio7)?,
        sensor: Max30105::new(i2c),
        // BOOT button, active low
        button: ModeButton::new(pins.gpio9)?,
        clock: SystemClock::new(),
    };

    let mut app = App::new(config, board, PeakDetector::new());
    app.start()?;
    app.run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("thermopulse drives ESP32-C3 hardware, build it with --target riscv32imc-esp-espidf")
}
