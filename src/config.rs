//! Tunables for the thermometer / pulse firmware.
//!
//! Everything has a compiled-in default. A few values can be overridden at
//! build time through environment variables, e.g.
//! `THERMOPULSE_CALIBRATION_OFFSET=27 cargo build --release`.

use anyhow::{bail, Result};
use log::*;

/// Offset added to the Beta-equation result before rounding for display.
/// Tuned against the deployed board; recalibrate before changing it.
pub const DEFAULT_CALIBRATION_OFFSET_C: f32 = 25.0;

/// TM1637 brightness, 0 (dimmest) to 7.
pub const DEFAULT_BRIGHTNESS: u8 = 7;
pub const MAX_BRIGHTNESS: u8 = 7;

const CALIBRATION_OFFSET_ENV: Option<&str> = option_env!("THERMOPULSE_CALIBRATION_OFFSET");
const BRIGHTNESS_ENV: Option<&str> = option_env!("THERMOPULSE_BRIGHTNESS");

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermistorConfig {
    /// ADC reference voltage in volts
    pub vref: f32,
    /// Largest raw sample the ADC produces (12 bit)
    pub adc_max: u16,
    /// Fixed divider resistor in ohms
    pub r_fixed: f32,
    /// Beta constant of the NTC
    pub beta: f32,
    /// Reference temperature in kelvin (25 °C)
    pub t0: f32,
    /// NTC resistance at `t0`
    pub r0: f32,
    /// Readings at or below this voltage mean an open divider
    pub min_voltage: f32,
    pub calibration_offset_c: f32,
}

impl Default for ThermistorConfig {
    fn default() -> Self {
        Self {
            vref: 3.3,
            adc_max: 4095,
            r_fixed: 10_000.0,
            beta: 3950.0,
            t0: 298.15,
            r0: 10_000.0,
            min_voltage: 0.01,
            calibration_offset_c: DEFAULT_CALIBRATION_OFFSET_C,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseConfig {
    /// IR intensity below this means nothing is on the sensor
    pub finger_threshold: u32,
    /// Exclusive lower bound of a plausible heart rate
    pub min_bpm: f32,
    /// Exclusive upper bound of a plausible heart rate
    pub max_bpm: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            finger_threshold: 50_000,
            min_bpm: 30.0,
            max_bpm: 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub thermistor: ThermistorConfig,
    pub pulse: PulseConfig,
    pub debounce_ms: u64,
    /// How long the mode-switch marker stays on the display
    pub mode_switch_hold_ms: u32,
    pub temperature_delay_ms: u32,
    pub pulse_delay_ms: u32,
    pub no_finger_delay_ms: u32,
    /// Settle time between bus init and probing the optical sensor
    pub sensor_settle_ms: u32,
    pub brightness: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thermistor: ThermistorConfig::default(),
            pulse: PulseConfig::default(),
            debounce_ms: 250,
            mode_switch_hold_ms: 300,
            temperature_delay_ms: 500,
            pulse_delay_ms: 50,
            no_finger_delay_ms: 300,
            sensor_settle_ms: 100,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl Config {
    /// Defaults with the build-time overrides applied.
    pub fn from_build_env() -> Self {
        Self::default().with_overrides(CALIBRATION_OFFSET_ENV, BRIGHTNESS_ENV)
    }

    fn with_overrides(mut self, offset: Option<&str>, brightness: Option<&str>) -> Self {
        if let Some(raw) = offset {
            match raw.trim().parse::<f32>() {
                Ok(v) if v.is_finite() => self.thermistor.calibration_offset_c = v,
                _ => warn!("Ignoring calibration offset {raw:?}, using {DEFAULT_CALIBRATION_OFFSET_C}"),
            }
        }
        if let Some(raw) = brightness {
            match raw.trim().parse::<u8>() {
                Ok(v) if v <= MAX_BRIGHTNESS => self.brightness = v,
                _ => warn!("Ignoring brightness {raw:?}, using {DEFAULT_BRIGHTNESS}"),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thermistor;
        if !(t.vref > 0.0) {
            bail!("reference voltage must be positive, got {}", t.vref);
        }
        if t.adc_max == 0 {
            bail!("ADC full scale must be non-zero");
        }
        if !(t.r_fixed > 0.0 && t.r0 > 0.0 && t.beta > 0.0 && t.t0 > 0.0) {
            bail!("thermistor constants must be positive: {t:?}");
        }
        if !(t.min_voltage >= 0.0 && t.min_voltage < t.vref) {
            bail!("minimum voltage {} outside [0, {})", t.min_voltage, t.vref);
        }
        if !(self.pulse.min_bpm < self.pulse.max_bpm) {
            bail!(
                "BPM band is empty: ({}, {})",
                self.pulse.min_bpm,
                self.pulse.max_bpm
            );
        }
        if self.brightness > MAX_BRIGHTNESS {
            bail!("brightness {} above {MAX_BRIGHTNESS}", self.brightness);
        }
        Ok(())
    }
}
