//! The polling loop: read the button, then either the thermistor or the
//! pulse sensor depending on the mode, and push the result to the display.

use anyhow::Result;
use log::*;

use crate::config::Config;
use crate::mode::{DisplayMode, ModeController};
use crate::ports::{AnalogInput, Button, Clock, OpticalSensor, SegmentDisplay};
use crate::pulse::{BeatDetector, PeakDetector, PulseMonitor, PulseReading};
use crate::thermistor::TemperatureEstimator;

/// Shown briefly after the button flipped the mode.
pub const MODE_SWITCH_MARKER: i32 = 9999;

/// Everything the firmware drives, bundled so the loop owns it exclusively.
pub struct Board<A, D, S, B, C> {
    pub adc: A,
    pub display: D,
    pub sensor: S,
    pub button: B,
    pub clock: C,
}

pub struct App<A, D, S, B, C, P = PeakDetector> {
    pub board: Board<A, D, S, B, C>,
    config: Config,
    estimator: TemperatureEstimator,
    pulse: PulseMonitor<P>,
    mode: ModeController,
    sensor_ready: bool,
    displayed: Option<i32>,
    last_pulse: Option<PulseReading>,
}

impl<A, D, S, B, C, P> App<A, D, S, B, C, P>
where
    A: AnalogInput,
    D: SegmentDisplay,
    S: OpticalSensor,
    B: Button,
    C: Clock,
    P: BeatDetector,
{
    pub fn new(config: Config, board: Board<A, D, S, B, C>, detector: P) -> Self {
        Self {
            board,
            estimator: TemperatureEstimator::new(config.thermistor),
            pulse: PulseMonitor::new(config.pulse, detector),
            mode: ModeController::new(config.debounce_ms),
            config,
            sensor_ready: false,
            displayed: None,
            last_pulse: None,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode.mode()
    }

    /// Last value successfully written to the display.
    pub fn displayed(&self) -> Option<i32> {
        self.displayed
    }

    /// Boot sequence: display on, show 0, bring up the optical sensor.
    /// A missing sensor is not an error, the oximeter mode just reports it.
    pub fn start(&mut self) -> Result<()> {
        self.config.validate()?;
        self.board.display.set_brightness(self.config.brightness)?;
        self.show(0)?;

        self.board.clock.delay_ms(self.config.sensor_settle_ms);
        match self.board.sensor.begin() {
            Ok(()) => {
                self.sensor_ready = true;
                info!("Optical sensor ready.");
            }
            Err(e) => warn!("Optical sensor not found! Check wiring. ({e:#})"),
        }
        Ok(())
    }

    /// One iteration of the main loop, including its delay.
    pub fn tick(&mut self) -> Result<()> {
        let level = self.board.button.level()?;
        if self.mode.poll(level, self.board.clock.now_ms()) {
            let mode = self.mode.mode();
            info!("Mode switched to {mode}");
            if mode == DisplayMode::Oximeter {
                self.pulse.reset();
                self.last_pulse = None;
                if self.sensor_ready {
                    self.board.sensor.clear()?;
                }
            }
            self.show(MODE_SWITCH_MARKER)?;
            self.board.clock.delay_ms(self.config.mode_switch_hold_ms);
        }

        match self.mode.mode() {
            DisplayMode::Temperature => self.show_temperature(),
            DisplayMode::Oximeter => self.show_pulse(),
        }
    }

    pub fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.tick() {
                error!("Cycle failed: {e:#}");
                self.board.clock.delay_ms(self.config.temperature_delay_ms);
            }
        }
    }

    fn show_temperature(&mut self) -> Result<()> {
        let sample = self.board.adc.read_sample()?;
        match self.estimator.from_sample(sample) {
            Ok(temperature) => {
                info!("Temperature: {:.2} °C", temperature.celsius);
                let value = self.estimator.display_value(&temperature);
                self.show(value)?;
            }
            Err(e) => warn!("Skipping temperature update: {e}"),
        }
        self.board.clock.delay_ms(self.config.temperature_delay_ms);
        Ok(())
    }

    fn show_pulse(&mut self) -> Result<()> {
        let reading = if self.sensor_ready {
            let ir = self.board.sensor.ir()?;
            self.pulse.update(ir, self.board.clock.now_ms())
        } else {
            PulseReading::SensorMissing
        };

        let changed_state = self
            .last_pulse
            .map_or(true, |last| std::mem::discriminant(&last) != std::mem::discriminant(&reading));
        match reading {
            PulseReading::NoFinger if changed_state => info!("No finger detected"),
            PulseReading::SensorMissing if changed_state => {
                warn!("No optical sensor, showing 0")
            }
            PulseReading::Beat(bpm) => info!("BPM: {bpm:.1}"),
            PulseReading::Implausible(bpm) => debug!("Dropping implausible BPM {bpm:.1}"),
            _ => {}
        }
        self.last_pulse = Some(reading);

        if let Some(value) = reading.display_value() {
            self.show(value)?;
        }

        let delay = match reading {
            PulseReading::NoFinger | PulseReading::SensorMissing => self.config.no_finger_delay_ms,
            _ => self.config.pulse_delay_ms,
        };
        self.board.clock.delay_ms(delay);
        Ok(())
    }

    fn show(&mut self, value: i32) -> Result<()> {
        if self.displayed == Some(value) {
            return Ok(());
        }
        self.board.display.show_number(value, false)?;
        self.displayed = Some(value);
        Ok(())
    }
}
