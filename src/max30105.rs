//! MAX30105 / MAX30102 optical sensor, streamed in oximeter mode so the
//! FIFO carries red and IR words per sample.

use anyhow::{anyhow, Result};
use esp_idf_svc::hal::i2c::I2cDriver;
use log::*;
use max3010x::{
    marker::{ic::Max30102, mode},
    Led, Max3010x, SampleAveraging,
};

use crate::ports::OpticalSensor;

type Idle<'a> = Max3010x<I2cDriver<'a>, Max30102, mode::None>;
type Oximeter<'a> = Max3010x<I2cDriver<'a>, Max30102, mode::Oximeter>;

const LED_AMPLITUDE: u8 = 0x1f; // ~6.4 mA
const FIFO_DEPTH: usize = 32;
// Red, IR
const WORDS_PER_SAMPLE: usize = 2;

pub struct Max30105<'a> {
    idle: Option<Idle<'a>>,
    sensor: Option<Oximeter<'a>>,
    last_ir: u32,
}

impl<'a> Max30105<'a> {
    pub fn new(i2c: I2cDriver<'a>) -> Self {
        Self {
            idle: Some(Max3010x::new_max30102(i2c)),
            sensor: None,
            last_ir: 0,
        }
    }

    fn sensor(&mut self) -> Result<&mut Oximeter<'a>> {
        self.sensor
            .as_mut()
            .ok_or_else(|| anyhow!("MAX30105 not initialized"))
    }
}

fn driver_error<E: core::fmt::Debug>(e: max3010x::Error<E>) -> anyhow::Error {
    anyhow!("MAX30105: {e:?}")
}

impl OpticalSensor for Max30105<'_> {
    /// Reset, switch to oximeter mode and light the LEDs. Nothing answering
    /// on the bus shows up as a failed reset.
    fn begin(&mut self) -> Result<()> {
        let mut idle = self
            .idle
            .take()
            .ok_or_else(|| anyhow!("MAX30105 already started"))?;
        idle.reset().map_err(driver_error)?;

        let mut sensor = idle.into_oximeter().map_err(driver_error)?;
        sensor
            .set_sample_averaging(SampleAveraging::Sa4)
            .map_err(driver_error)?;
        sensor
            .set_pulse_amplitude(Led::All, LED_AMPLITUDE)
            .map_err(driver_error)?;
        sensor.enable_fifo_rollover().map_err(driver_error)?;
        sensor.clear_fifo().map_err(driver_error)?;
        debug!("MAX30105 in oximeter mode");

        self.sensor = Some(sensor);
        Ok(())
    }

    fn ir(&mut self) -> Result<u32> {
        let mut data = [0u32; FIFO_DEPTH * WORDS_PER_SAMPLE];
        let samples = usize::from(self.sensor()?.read_fifo(&mut data).map_err(driver_error)?);
        if samples > 0 {
            self.last_ir = data[samples * WORDS_PER_SAMPLE - 1];
        }
        Ok(self.last_ir)
    }

    fn clear(&mut self) -> Result<()> {
        self.sensor()?.clear_fifo().map_err(driver_error)
    }
}
