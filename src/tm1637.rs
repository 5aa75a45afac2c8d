//! Bit-banged driver for the TM1637 4-digit LED module.
//!
//! The chip speaks a two-wire protocol that looks like I2C without
//! addresses: LSB first, data sampled on the rising clock edge, one ACK
//! clock after every byte.

use anyhow::bail;
use esp_idf_svc::hal::{
    delay::Ets,
    gpio::{InputOutput, InputPin, Output, OutputPin, Pin, PinDriver, Pull},
};

use crate::config::MAX_BRIGHTNESS;
use crate::ports::SegmentDisplay;
use crate::segments::{encode_number, DIGITS};

const CMD_DATA_AUTO_INCREMENT: u8 = 0x40;
const CMD_ADDRESS_DIGIT0: u8 = 0xc0;
const CMD_DISPLAY_ON: u8 = 0x88;

// Half clock period
const BIT_DELAY_US: u32 = 100;

pub struct Tm1637<'a, C: Pin, D: Pin> {
    clk: PinDriver<'a, C, Output>,
    dio: PinDriver<'a, D, InputOutput>,
    brightness: u8,
}

impl<C, D> Tm1637<'_, C, D>
where
    C: OutputPin,
    D: InputPin + OutputPin,
{
    pub fn new(clk_gpio: C, dio_gpio: D) -> anyhow::Result<Self, anyhow::Error> {
        let mut clk = PinDriver::output(clk_gpio)?;
        let mut dio = PinDriver::input_output_od(dio_gpio)?;
        dio.set_pull(Pull::Up)?;
        clk.set_high()?;
        dio.set_high()?;

        Ok(Self {
            clk,
            dio,
            brightness: MAX_BRIGHTNESS,
        })
    }

    fn bit_delay() {
        Ets::delay_us(BIT_DELAY_US);
    }

    fn start(&mut self) -> anyhow::Result<()> {
        self.dio.set_low()?;
        Self::bit_delay();
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.dio.set_low()?;
        Self::bit_delay();
        self.clk.set_high()?;
        Self::bit_delay();
        self.dio.set_high()?;
        Self::bit_delay();
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> anyhow::Result<()> {
        for bit in 0..8 {
            self.clk.set_low()?;
            Self::bit_delay();
            if byte & (1 << bit) != 0 {
                self.dio.set_high()?;
            } else {
                self.dio.set_low()?;
            }
            Self::bit_delay();
            self.clk.set_high()?;
            Self::bit_delay();
        }

        // Release DIO and clock out the ACK; the chip pulls DIO low.
        self.clk.set_low()?;
        self.dio.set_high()?;
        Self::bit_delay();
        self.clk.set_high()?;
        Self::bit_delay();
        let acked = self.dio.is_low();
        self.clk.set_low()?;
        Self::bit_delay();

        if !acked {
            bail!("TM1637 did not acknowledge byte {byte:#04x}");
        }
        Ok(())
    }

    fn command(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.start()?;
        let sent = bytes.iter().try_for_each(|&b| self.write_byte(b));
        // Always end the frame so the next command starts clean.
        self.stop()?;
        sent
    }

    pub fn write_segments(&mut self, segments: &[u8; DIGITS]) -> anyhow::Result<()> {
        self.command(&[CMD_DATA_AUTO_INCREMENT])?;

        let mut frame = [0u8; DIGITS + 1];
        frame[0] = CMD_ADDRESS_DIGIT0;
        frame[1..].copy_from_slice(segments);
        self.command(&frame)?;

        self.command(&[CMD_DISPLAY_ON | self.brightness])
    }
}

impl<C, D> SegmentDisplay for Tm1637<'_, C, D>
where
    C: OutputPin,
    D: InputPin + OutputPin,
{
    /// Takes effect with the next write.
    fn set_brightness(&mut self, level: u8) -> anyhow::Result<()> {
        self.brightness = level.min(MAX_BRIGHTNESS);
        Ok(())
    }

    fn show_number(&mut self, value: i32, leading_zeros: bool) -> anyhow::Result<()> {
        self.write_segments(&encode_number(value, leading_zeros))
    }
}
