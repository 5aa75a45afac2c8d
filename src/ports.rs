//! Hardware the application talks to. The ESP-IDF drivers implement these
//! on the board; tests substitute fakes.

use anyhow::Result;

/// Raw level of the mode button. The button is active-low with a pull-up,
/// so `Pressed` corresponds to a low pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLevel {
    Pressed,
    Released,
}

impl ButtonLevel {
    pub fn from_active_low(pin_is_low: bool) -> Self {
        if pin_is_low {
            ButtonLevel::Pressed
        } else {
            ButtonLevel::Released
        }
    }
}

/// Single fixed analog channel.
pub trait AnalogInput {
    /// Blocking read, 12-bit sample in `0..=4095`.
    fn read_sample(&mut self) -> Result<u16>;
}

/// 4-digit seven-segment display.
pub trait SegmentDisplay {
    /// 0 (dimmest) to 7.
    fn set_brightness(&mut self, level: u8) -> Result<()>;
    fn show_number(&mut self, value: i32, leading_zeros: bool) -> Result<()>;
}

/// Optical (IR) pulse sensor.
pub trait OpticalSensor {
    /// Probe and configure the sensor. Fails if nothing answers on the bus.
    fn begin(&mut self) -> Result<()>;
    /// Latest raw infrared intensity.
    fn ir(&mut self) -> Result<u32>;
    /// Throw away buffered samples so the next `ir` is fresh.
    fn clear(&mut self) -> Result<()>;
}

pub trait Button {
    fn level(&mut self) -> Result<ButtonLevel>;
}

/// Monotonic time plus blocking delays.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn delay_ms(&mut self, ms: u32);
}
