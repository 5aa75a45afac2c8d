//! Heart rate from the optical sensor's infrared channel.
//!
//! The monitor only decides *whether* a finger is present and turns beat
//! timestamps into BPM; spotting the beat itself is up to a [`BeatDetector`].

use log::*;

use crate::config::PulseConfig;

/// Peak detection over the IR waveform.
pub trait BeatDetector {
    /// Feed one sample, true if it completes a beat.
    fn check_for_beat(&mut self, ir: u32) -> bool;

    /// Forget the waveform history, e.g. after the finger was lifted.
    fn reset(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseReading {
    /// The optical sensor never answered at boot
    SensorMissing,
    NoFinger,
    /// Finger present, no beat on this sample
    Searching,
    /// First beat since the finger went on, no interval yet
    Armed,
    /// Plausible heart rate
    Beat(f32),
    /// Beat interval outside the physiological band, dropped
    Implausible(f32),
}

impl PulseReading {
    /// What to put on the display, `None` keeps the previous value.
    pub fn display_value(&self) -> Option<i32> {
        match *self {
            PulseReading::SensorMissing | PulseReading::NoFinger => Some(0),
            PulseReading::Beat(bpm) => Some(bpm as i32),
            PulseReading::Searching | PulseReading::Armed | PulseReading::Implausible(_) => None,
        }
    }
}

pub struct PulseMonitor<D> {
    config: PulseConfig,
    detector: D,
    last_beat_ms: Option<u64>,
    finger_present: bool,
}

impl<D: BeatDetector> PulseMonitor<D> {
    pub fn new(config: PulseConfig, detector: D) -> Self {
        Self {
            config,
            detector,
            last_beat_ms: None,
            finger_present: false,
        }
    }

    /// Drop the beat reference and detector history.
    pub fn reset(&mut self) {
        self.last_beat_ms = None;
        self.finger_present = false;
        self.detector.reset();
    }

    pub fn update(&mut self, ir: u32, now_ms: u64) -> PulseReading {
        if ir < self.config.finger_threshold {
            if self.finger_present {
                debug!("Finger lifted (ir {ir})");
                self.finger_present = false;
                self.last_beat_ms = None;
                self.detector.reset();
            }
            return PulseReading::NoFinger;
        }
        self.finger_present = true;

        if !self.detector.check_for_beat(ir) {
            return PulseReading::Searching;
        }

        let Some(last) = self.last_beat_ms.replace(now_ms) else {
            return PulseReading::Armed;
        };
        let delta = now_ms.saturating_sub(last);
        if delta == 0 {
            return PulseReading::Implausible(f32::INFINITY);
        }

        let bpm = 60_000.0 / delta as f32;
        if bpm > self.config.min_bpm && bpm < self.config.max_bpm {
            PulseReading::Beat(bpm)
        } else {
            PulseReading::Implausible(bpm)
        }
    }
}

// DC tracking and smoothing weights, tuned for a ~20 Hz poll rate.
const DC_ALPHA: f32 = 0.05;
const SMOOTHING_ALPHA: f32 = 0.5;
// Accepted trough depth of the filtered AC signal, in raw IR counts.
const MIN_AMPLITUDE: f32 = 20.0;
const MAX_AMPLITUDE: f32 = 1000.0;

/// Beat on every rising zero crossing of the DC-free, smoothed IR signal,
/// provided the trough before it was deep enough to be a pulse and shallow
/// enough not to be motion.
#[derive(Debug, Default)]
pub struct PeakDetector {
    dc: Option<f32>,
    smoothed: f32,
    previous: f32,
    trough: f32,
}

impl PeakDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BeatDetector for PeakDetector {
    fn check_for_beat(&mut self, ir: u32) -> bool {
        let sample = ir as f32;
        let dc = match self.dc {
            Some(dc) => dc + DC_ALPHA * (sample - dc),
            None => sample,
        };
        self.dc = Some(dc);

        self.smoothed += SMOOTHING_ALPHA * ((sample - dc) - self.smoothed);
        let current = self.smoothed;

        let mut beat = false;
        if self.previous < 0.0 && current >= 0.0 {
            let depth = -self.trough;
            beat = (MIN_AMPLITUDE..=MAX_AMPLITUDE).contains(&depth);
            self.trough = 0.0;
        }
        if current < self.trough {
            self.trough = current;
        }
        self.previous = current;
        beat
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Reports beats from a fixed script, then none.
    struct Scripted(VecDeque<bool>);

    impl Scripted {
        fn new(beats: &[bool]) -> Self {
            Self(beats.iter().copied().collect())
        }
    }

    impl BeatDetector for Scripted {
        fn check_for_beat(&mut self, _ir: u32) -> bool {
            self.0.pop_front().unwrap_or(false)
        }
    }

    fn monitor(beats: &[bool]) -> PulseMonitor<Scripted> {
        PulseMonitor::new(PulseConfig::default(), Scripted::new(beats))
    }

    #[test]
    fn below_threshold_is_no_finger() {
        let mut m = monitor(&[true]);
        assert_eq!(m.update(49_999, 0), PulseReading::NoFinger);
        assert_eq!(PulseReading::NoFinger.display_value(), Some(0));
        assert!(!m.finger_present);
    }

    #[test]
    fn no_beat_keeps_display() {
        let mut m = monitor(&[]);
        let reading = m.update(50_001, 0);
        assert_eq!(reading, PulseReading::Searching);
        assert_eq!(reading.display_value(), None);
        assert!(m.finger_present);
    }

    #[test]
    fn first_beat_only_arms() {
        let mut m = monitor(&[true]);
        assert_eq!(m.update(80_000, 1_000), PulseReading::Armed);
    }

    #[test]
    fn plausible_interval_is_accepted() {
        let mut m = monitor(&[true, true]);
        m.update(80_000, 1_000);
        let reading = m.update(80_000, 1_400);
        assert_eq!(reading, PulseReading::Beat(150.0));
        assert_eq!(reading.display_value(), Some(150));
    }

    #[test]
    fn slow_interval_is_rejected() {
        let mut m = monitor(&[true, true]);
        m.update(80_000, 1_000);
        let reading = m.update(80_000, 4_000);
        assert_eq!(reading, PulseReading::Implausible(20.0));
        assert_eq!(reading.display_value(), None);
    }

    #[test]
    fn band_edges_are_exclusive() {
        // 2000 ms is exactly 30 BPM, 333 ms just over 180
        let mut m = monitor(&[true, true, true]);
        m.update(80_000, 0);
        assert_eq!(m.update(80_000, 2_000), PulseReading::Implausible(30.0));
        assert!(matches!(m.update(80_000, 2_333), PulseReading::Implausible(_)));
    }

    #[test]
    fn rejected_beat_still_moves_the_reference() {
        let mut m = monitor(&[true, true, true]);
        m.update(80_000, 0);
        m.update(80_000, 5_000);
        assert_eq!(m.update(80_000, 5_750), PulseReading::Beat(80.0));
    }

    #[test]
    fn lifting_the_finger_rearms() {
        let mut m = monitor(&[true, true]);
        m.update(80_000, 0);
        assert_eq!(m.update(10, 300), PulseReading::NoFinger);
        assert_eq!(m.update(80_000, 800), PulseReading::Armed);
    }

    fn synthetic_pulse(samples: usize, period: usize, amplitude: f32) -> Vec<u32> {
        (0..samples)
            .map(|i| {
                let phase = i as f32 / period as f32 * std::f32::consts::TAU;
                (100_000.0 + amplitude * phase.sin()) as u32
            })
            .collect()
    }

    #[test]
    fn peak_detector_finds_one_beat_per_period() {
        let mut detector = PeakDetector::new();
        let signal = synthetic_pulse(420, 16, 300.0);
        let beats = signal
            .iter()
            .enumerate()
            .map(|(i, &ir)| (i, detector.check_for_beat(ir)))
            .filter(|&(i, beat)| beat && i >= 100)
            .count();
        // 320 samples at 16 samples per period
        assert!((18..=22).contains(&beats), "found {beats} beats");
    }

    #[test]
    fn peak_detector_ignores_flat_signal_and_noise() {
        let mut detector = PeakDetector::new();
        assert!(!(0..200).any(|_| detector.check_for_beat(100_000)));

        let mut detector = PeakDetector::new();
        let ripple = synthetic_pulse(200, 16, 5.0);
        assert!(!ripple.iter().any(|&ir| detector.check_for_beat(ir)));
    }

    #[test]
    fn peak_detector_reset_forgets_history() {
        let mut detector = PeakDetector::new();
        for ir in synthetic_pulse(50, 16, 300.0) {
            detector.check_for_beat(ir);
        }
        detector.reset();
        assert!(detector.dc.is_none());
        assert_eq!(detector.trough, 0.0);
    }
}
