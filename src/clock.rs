use esp_idf_svc::hal::delay::FreeRtos;
use std::time::Instant;

use crate::ports::Clock;

/// Milliseconds since boot, FreeRTOS delays (1 ms ticks with the shipped sdkconfig).
pub struct SystemClock {
    boot: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}
