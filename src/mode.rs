//! Display mode and the debounced button that flips it.

use std::fmt;

use crate::ports::ButtonLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Temperature,
    Oximeter,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Temperature => DisplayMode::Oximeter,
            DisplayMode::Oximeter => DisplayMode::Temperature,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Temperature => write!(f, "temperature"),
            DisplayMode::Oximeter => write!(f, "oximeter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// A toggle was accepted recently, presses are ignored until the window ends
    CoolingDown { remaining_ms: u64 },
}

/// Edge-triggered toggle with a cooldown: a press counts only on a
/// released -> pressed transition, and only once per window.
pub struct ModeController {
    mode: DisplayMode,
    last_level: ButtonLevel,
    last_toggle_ms: Option<u64>,
    window_ms: u64,
}

impl ModeController {
    pub fn new(window_ms: u64) -> Self {
        Self {
            mode: DisplayMode::default(),
            last_level: ButtonLevel::Released,
            last_toggle_ms: None,
            window_ms,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Feed the current raw level. Returns true when the mode flipped.
    pub fn poll(&mut self, level: ButtonLevel, now_ms: u64) -> bool {
        let edge = level == ButtonLevel::Pressed && self.last_level == ButtonLevel::Released;
        self.last_level = level;

        if !edge || self.debounce_state(now_ms) != DebounceState::Idle {
            return false;
        }
        self.mode = self.mode.toggled();
        self.last_toggle_ms = Some(now_ms);
        true
    }

    pub fn debounce_state(&self, now_ms: u64) -> DebounceState {
        match self.last_toggle_ms {
            Some(at) if now_ms.saturating_sub(at) < self.window_ms => DebounceState::CoolingDown {
                remaining_ms: self.window_ms - now_ms.saturating_sub(at),
            },
            _ => DebounceState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ButtonLevel::*;

    #[test]
    fn press_toggles_mode() {
        let mut c = ModeController::new(250);
        assert_eq!(c.mode(), DisplayMode::Temperature);
        assert!(c.poll(Pressed, 1_000));
        assert_eq!(c.mode(), DisplayMode::Oximeter);
    }

    #[test]
    fn holding_the_button_toggles_once() {
        let mut c = ModeController::new(250);
        assert!(c.poll(Pressed, 1_000));
        for t in (1_050..3_000).step_by(50) {
            assert!(!c.poll(Pressed, t));
        }
        assert_eq!(c.mode(), DisplayMode::Oximeter);
    }

    #[test]
    fn bounce_inside_window_toggles_once() {
        let mut c = ModeController::new(250);
        let toggles = [
            (Pressed, 1_000),
            (Released, 1_040),
            (Pressed, 1_080),
            (Released, 1_150),
            (Pressed, 1_240),
        ]
        .into_iter()
        .filter(|&(level, t)| c.poll(level, t))
        .count();
        assert_eq!(toggles, 1);
        assert_eq!(c.mode(), DisplayMode::Oximeter);
    }

    #[test]
    fn press_after_window_toggles_again() {
        let mut c = ModeController::new(250);
        assert!(c.poll(Pressed, 1_000));
        assert!(!c.poll(Released, 1_100));
        assert_eq!(
            c.debounce_state(1_100),
            DebounceState::CoolingDown { remaining_ms: 150 }
        );
        assert_eq!(c.debounce_state(1_250), DebounceState::Idle);
        assert!(c.poll(Pressed, 1_250));
        assert_eq!(c.mode(), DisplayMode::Temperature);
    }

    #[test]
    fn press_right_after_boot_counts() {
        let mut c = ModeController::new(250);
        assert_eq!(c.debounce_state(0), DebounceState::Idle);
        assert!(c.poll(Pressed, 0));
    }
}
