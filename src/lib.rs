//! Thermometer and pulse monitor firmware for an ESP32-C3 with an NTC
//! thermistor, a MAX30105 optical sensor and a TM1637 4-digit display.
//!
//! The conversions and the loop are plain Rust behind the traits in
//! [`ports`]; the drivers for the actual board only build for ESP-IDF.

pub mod app;
pub mod config;
pub mod mode;
pub mod ports;
pub mod pulse;
pub mod segments;
pub mod thermistor;

#[cfg(target_os = "espidf")]
pub mod adc;
#[cfg(target_os = "espidf")]
pub mod button;
#[cfg(target_os = "espidf")]
pub mod clock;
#[cfg(target_os = "espidf")]
pub mod max30105;
#[cfg(target_os = "espidf")]
pub mod tm1637;
