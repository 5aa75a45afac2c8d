use esp_idf_svc::hal::{
    adc::{
        attenuation::DB_11,
        oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver},
    },
    gpio::ADCPin,
    peripheral::Peripheral,
};

use crate::ports::AnalogInput;

/// One-shot reads of the thermistor divider junction.
pub struct ThermistorInput<'d, T: ADCPin> {
    channel: AdcChannelDriver<'d, T, AdcDriver<'d, T::Adc>>,
}

impl<'d, T: ADCPin> ThermistorInput<'d, T> {
    pub fn new(
        adc: impl Peripheral<P = T::Adc> + 'd,
        pin: impl Peripheral<P = T> + 'd,
    ) -> anyhow::Result<Self> {
        let driver = AdcDriver::new(adc)?;
        // Full range attenuation, raw 12-bit samples
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(driver, pin, &config)?;
        Ok(Self { channel })
    }
}

impl<T: ADCPin> AnalogInput for ThermistorInput<'_, T> {
    fn read_sample(&mut self) -> anyhow::Result<u16> {
        Ok(self.channel.read_raw()?)
    }
}
