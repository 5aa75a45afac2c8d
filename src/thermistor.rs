//! NTC thermistor on the high side of a divider, fixed resistor to ground.
//!
//! ```text
//! VREF ── NTC ──┬── ADC
//!               └── R_FIXED ── GND
//! ```
//!
//! Resistance comes from the divider ratio, temperature from the Beta
//! equation `1/T = 1/T0 + ln(R/R0) / BETA`.

use std::fmt;

use crate::config::ThermistorConfig;
use crate::segments::{DISPLAY_MAX, DISPLAY_MIN};

const KELVIN_OFFSET: f32 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureError {
    /// Divider voltage at or below the floor, open thermistor
    VoltageTooLow(f32),
    /// Divider voltage at or above VREF, shorted thermistor
    VoltageAtReference(f32),
}

impl fmt::Display for TemperatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureError::VoltageTooLow(v) => {
                write!(f, "divider voltage {v:.3} V too low, thermistor open?")
            }
            TemperatureError::VoltageAtReference(v) => {
                write!(f, "divider voltage {v:.3} V at reference, thermistor shorted?")
            }
        }
    }
}

impl std::error::Error for TemperatureError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub voltage: f32,
    pub resistance: f32,
    pub celsius: f32,
}

pub struct TemperatureEstimator {
    config: ThermistorConfig,
}

impl TemperatureEstimator {
    pub fn new(config: ThermistorConfig) -> Self {
        Self { config }
    }

    pub fn sample_to_voltage(&self, sample: u16) -> f32 {
        f32::from(sample) * self.config.vref / f32::from(self.config.adc_max)
    }

    pub fn resistance(&self, voltage: f32) -> Result<f32, TemperatureError> {
        let c = &self.config;
        if voltage <= c.min_voltage {
            return Err(TemperatureError::VoltageTooLow(voltage));
        }
        if voltage >= c.vref {
            return Err(TemperatureError::VoltageAtReference(voltage));
        }
        Ok(c.r_fixed * (c.vref / voltage - 1.0))
    }

    pub fn from_voltage(&self, voltage: f32) -> Result<Temperature, TemperatureError> {
        let c = &self.config;
        let resistance = self.resistance(voltage)?;
        let inv_t = 1.0 / c.t0 + (resistance / c.r0).ln() / c.beta;
        Ok(Temperature {
            voltage,
            resistance,
            celsius: 1.0 / inv_t - KELVIN_OFFSET,
        })
    }

    pub fn from_sample(&self, sample: u16) -> Result<Temperature, TemperatureError> {
        if sample >= self.config.adc_max {
            return Err(TemperatureError::VoltageAtReference(self.config.vref));
        }
        self.from_voltage(self.sample_to_voltage(sample))
    }

    /// Calibrated, rounded value clamped to what the display can show.
    pub fn display_value(&self, temperature: &Temperature) -> i32 {
        let calibrated = (temperature.celsius + self.config.calibration_offset_c).round();
        (calibrated as i32).clamp(DISPLAY_MIN, DISPLAY_MAX)
    }
}
