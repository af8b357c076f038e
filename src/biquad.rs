//! A single second-order IIR stage with a smoothed cutoff frequency.
//!
//! Coefficients follow Robert Bristow-Johnson's Audio EQ Cookbook. The stage runs in direct form
//! I with separate input and output registers, so the registers stay meaningful when the
//! coefficients are swapped underneath them while the cutoff is moving.

use nih_plug::prelude::*;
use std::f64::consts::PI;

use crate::smoothing::{Ramp, TargetTracker};

pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
pub const DEFAULT_CUTOFF_HZ: f64 = 1000.0;
pub const DEFAULT_RESONANCE: f64 = 0.707;
pub const DEFAULT_SHELF_GAIN_DB: f64 = 0.0;
/// Time it takes a cutoff change to fully take effect.
pub const DEFAULT_SMOOTHING_SECONDS: f64 = 0.05;

/// The response shape. The variant order is the order hosts see in the filter type choice.
#[derive(Enum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    #[default]
    #[id = "lowpass"]
    #[name = "LowPass"]
    LowPass,
    #[id = "highpass"]
    #[name = "HighPass"]
    HighPass,
    #[id = "bandpass"]
    #[name = "BandPass"]
    BandPass,
    #[id = "notch"]
    #[name = "Notch"]
    Notch,
    #[id = "highshelf"]
    #[name = "HighShelf"]
    HighShelf,
    #[id = "lowshelf"]
    #[name = "LowShelf"]
    LowShelf,
}

impl FilterType {
    pub const ALL: [FilterType; 6] = [
        FilterType::LowPass,
        FilterType::HighPass,
        FilterType::BandPass,
        FilterType::Notch,
        FilterType::HighShelf,
        FilterType::LowShelf,
    ];
}

/// Cookbook coefficients before the division by `a0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl RawCoefficients {
    pub fn design(
        filter_type: FilterType,
        cutoff_hz: f64,
        sample_rate: f64,
        q: f64,
        gain_db: f64,
    ) -> Self {
        let omega = 2.0 * PI * cutoff_hz / sample_rate;
        let alpha = omega.sin() / (2.0 * q);
        let cosw = omega.cos();

        match filter_type {
            FilterType::LowPass => Self {
                b0: (1.0 - cosw) / 2.0,
                b1: 1.0 - cosw,
                b2: (1.0 - cosw) / 2.0,
                a0: 1.0 + alpha,
                a1: -2.0 * cosw,
                a2: 1.0 - alpha,
            },
            FilterType::HighPass => Self {
                b0: (1.0 + cosw) / 2.0,
                b1: -(1.0 + cosw),
                b2: (1.0 + cosw) / 2.0,
                a0: 1.0 + alpha,
                a1: -2.0 * cosw,
                a2: 1.0 - alpha,
            },
            // Constant 0 dB peak gain
            FilterType::BandPass => Self {
                b0: alpha,
                b1: 0.0,
                b2: -alpha,
                a0: 1.0 + alpha,
                a1: -2.0 * cosw,
                a2: 1.0 - alpha,
            },
            FilterType::Notch => Self {
                b0: 1.0,
                b1: -2.0 * cosw,
                b2: 1.0,
                a0: 1.0 + alpha,
                a1: -2.0 * cosw,
                a2: 1.0 - alpha,
            },
            FilterType::LowShelf => {
                let a = 10f64.powf(gain_db / 40.0);
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                Self {
                    b0: a * ((a + 1.0) - (a - 1.0) * cosw + two_sqrt_a_alpha),
                    b1: 2.0 * a * ((a - 1.0) - (a + 1.0) * cosw),
                    b2: a * ((a + 1.0) - (a - 1.0) * cosw - two_sqrt_a_alpha),
                    a0: (a + 1.0) + (a - 1.0) * cosw + two_sqrt_a_alpha,
                    a1: -2.0 * ((a - 1.0) + (a + 1.0) * cosw),
                    a2: (a + 1.0) + (a - 1.0) * cosw - two_sqrt_a_alpha,
                }
            }
            FilterType::HighShelf => {
                let a = 10f64.powf(gain_db / 40.0);
                let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;
                Self {
                    b0: a * ((a + 1.0) + (a - 1.0) * cosw + two_sqrt_a_alpha),
                    b1: -2.0 * a * ((a - 1.0) + (a + 1.0) * cosw),
                    b2: a * ((a + 1.0) + (a - 1.0) * cosw - two_sqrt_a_alpha),
                    a0: (a + 1.0) - (a - 1.0) * cosw + two_sqrt_a_alpha,
                    a1: 2.0 * ((a - 1.0) - (a + 1.0) * cosw),
                    a2: (a + 1.0) - (a - 1.0) * cosw - two_sqrt_a_alpha,
                }
            }
        }
    }

    /// Divides everything by `a0` so the difference equation can assume a unit leading
    /// coefficient.
    pub fn normalize(self) -> Coefficients {
        Coefficients {
            b0: self.b0 / self.a0,
            b1: self.b1 / self.a0,
            b2: self.b2 / self.a0,
            a1: self.a1 / self.a0,
            a2: self.a2 / self.a0,
        }
    }
}

/// Normalized biquad coefficients, `a0` is implicitly 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Coefficients {
    pub fn derive(
        filter_type: FilterType,
        cutoff_hz: f64,
        sample_rate: f64,
        q: f64,
        gain_db: f64,
    ) -> Self {
        RawCoefficients::design(filter_type, cutoff_hz, sample_rate, q, gain_db).normalize()
    }
}

/// The two most recent inputs and outputs.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Registers {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

/// One filter per audio channel. Sharing a stage between channels interleaves their histories.
///
/// Cutoff changes ramp multiplicatively (constant ratio per sample), unlike the linear ramp of
/// the JUCE `SmoothedValue` this filter was first written against.
#[derive(Debug, Clone)]
pub struct BiquadFilterStage {
    sample_rate: f64,
    smoothing_seconds: f64,

    filter_type: FilterType,
    /// The effective cutoff, which lags behind the smoother's target while it is ramping.
    cutoff_hz: f64,
    resonance_q: f64,
    shelf_gain_db: f64,

    coefficients: Coefficients,
    registers: Registers,
    cutoff_smoother: TargetTracker,
}

impl Default for BiquadFilterStage {
    fn default() -> Self {
        Self::new()
    }
}

impl BiquadFilterStage {
    pub fn new() -> Self {
        Self::with_smoothing_time(DEFAULT_SMOOTHING_SECONDS)
    }

    pub fn with_smoothing_time(smoothing_seconds: f64) -> Self {
        let mut cutoff_smoother = TargetTracker::new(DEFAULT_CUTOFF_HZ, Ramp::Multiplicative);
        cutoff_smoother.reset(DEFAULT_SAMPLE_RATE, smoothing_seconds);

        let mut stage = Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            smoothing_seconds,

            filter_type: FilterType::default(),
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            resonance_q: DEFAULT_RESONANCE,
            shelf_gain_db: DEFAULT_SHELF_GAIN_DB,

            coefficients: Coefficients {
                b0: 1.0,
                b1: 0.0,
                b2: 0.0,
                a1: 0.0,
                a2: 0.0,
            },
            registers: Registers::default(),
            cutoff_smoother,
        };
        stage.update_coefficients();
        stage
    }

    /// Must be called before the first sample. Calling it mid-stream is a hard reconfiguration:
    /// a pending cutoff ramp jumps to its target.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        nih_debug_assert!(sample_rate > 0.0);

        self.sample_rate = sample_rate;
        self.cutoff_smoother.reset(sample_rate, self.smoothing_seconds);
        self.cutoff_hz = self.cutoff_smoother.current();
        self.update_coefficients();
    }

    /// Only sets the smoother's target. The coefficients follow in `process_sample()`.
    pub fn set_cutoff_frequency(&mut self, cutoff_hz: f64) {
        self.cutoff_smoother.set_target(cutoff_hz);
    }

    /// Takes effect immediately, unlike the cutoff.
    pub fn set_resonance(&mut self, q: f64) {
        nih_debug_assert!(q > 0.0);

        self.resonance_q = q;
        self.update_coefficients();
    }

    pub fn set_shelf_gain(&mut self, gain_db: f64) {
        self.shelf_gain_db = gain_db;
        self.update_coefficients();
    }

    /// The registers are kept, so switching types mid-stream may cause a short transient.
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
        self.update_coefficients();
    }

    /// Clears the registers and lets a pending cutoff ramp jump to its target.
    pub fn reset(&mut self) {
        self.registers = Registers::default();
        let target = self.cutoff_smoother.target();
        self.cutoff_smoother.snap_to(target);
        self.cutoff_hz = target;
        self.update_coefficients();
    }

    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        if self.cutoff_smoother.is_smoothing() {
            self.cutoff_hz = self.cutoff_smoother.next();
            self.update_coefficients();
        }

        let c = &self.coefficients;
        let r = &mut self.registers;
        let output = c.b0 * input + c.b1 * r.x1 + c.b2 * r.x2 - c.a1 * r.y1 - c.a2 * r.y2;

        r.x2 = r.x1;
        r.x1 = input;
        r.y2 = r.y1;
        r.y1 = output;

        output
    }

    fn update_coefficients(&mut self) {
        self.coefficients = Coefficients::derive(
            self.filter_type,
            self.cutoff_hz,
            self.sample_rate,
            self.resonance_q,
            self.shelf_gain_db,
        );
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn cutoff_frequency(&self) -> f64 {
        self.cutoff_hz
    }

    pub fn target_cutoff_frequency(&self) -> f64 {
        self.cutoff_smoother.target()
    }

    pub fn resonance(&self) -> f64 {
        self.resonance_q
    }

    pub fn shelf_gain(&self) -> f64 {
        self.shelf_gain_db
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn is_smoothing(&self) -> bool {
        self.cutoff_smoother.is_smoothing()
    }
}
