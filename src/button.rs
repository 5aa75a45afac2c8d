use esp_idf_svc::hal::gpio::{Input, InputPin, OutputPin, Pin, PinDriver, Pull};

use crate::ports::{Button, ButtonLevel};

/// Push button between the pin and GND, read with the internal pull-up.
pub struct ModeButton<'a, T: Pin> {
    pin: PinDriver<'a, T, Input>,
}

impl<T> ModeButton<'_, T>
where
    T: InputPin + OutputPin,
{
    pub fn new(button_gpio: T) -> anyhow::Result<Self, anyhow::Error> {
        let mut pin = PinDriver::input(button_gpio)?;
        pin.set_pull(Pull::Up)?;
        Ok(Self { pin })
    }
}

impl<T> Button for ModeButton<'_, T>
where
    T: InputPin + OutputPin,
{
    fn level(&mut self) -> anyhow::Result<ButtonLevel> {
        Ok(ButtonLevel::from_active_low(self.pin.is_low()))
    }
}
