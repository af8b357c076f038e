use nih_plug::prelude::*;

use crate::biquad::{
    BiquadFilterStage, FilterType, DEFAULT_CUTOFF_HZ, DEFAULT_RESONANCE, DEFAULT_SHELF_GAIN_DB,
};

#[derive(Params)]
pub struct MultiFilterParams {
    /// The stage smooths this itself, so the host value is used as is.
    #[id = "cutoff"]
    pub cutoff: FloatParam,

    #[id = "resonance"]
    pub resonance: FloatParam,

    /// Only used by the shelf types.
    #[id = "gain"]
    pub gain: FloatParam,

    #[id = "filter"]
    pub filter_type: EnumParam<FilterType>,
}

impl Default for MultiFilterParams {
    fn default() -> Self {
        Self {
            cutoff: FloatParam::new(
                "Cutoff Frequency",
                DEFAULT_CUTOFF_HZ as f32,
                FloatRange::Skewed {
                    min: 20.0,
                    max: 15000.0,
                    factor: 0.3,
                },
            )
            .with_unit(" Hz")
            .with_value_to_string(formatters::v2s_f32_rounded(2)),

            resonance: FloatParam::new(
                "Resonance",
                DEFAULT_RESONANCE as f32,
                FloatRange::Linear {
                    min: 0.1,
                    max: 10.0,
                },
            )
            .with_value_to_string(formatters::v2s_f32_rounded(3)),

            gain: FloatParam::new(
                "Shelf Gain",
                DEFAULT_SHELF_GAIN_DB as f32,
                FloatRange::Linear {
                    min: -12.0,
                    max: 12.0,
                },
            )
            .with_step_size(1.0)
            .with_unit(" dB")
            .with_value_to_string(formatters::v2s_f32_rounded(1)),

            filter_type: EnumParam::new("Filter Type", FilterType::LowPass),
        }
    }
}

/// The parameter values last pushed into the filter stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub gain_db: f32,
    pub filter_type: FilterType,
}

impl FilterSettings {
    pub fn from_params(params: &MultiFilterParams) -> Self {
        Self {
            cutoff_hz: params.cutoff.value(),
            resonance: params.resonance.value(),
            gain_db: params.gain.value(),
            filter_type: params.filter_type.value(),
        }
    }

    /// Pushes every value into the stage.
    pub fn apply(&self, stage: &mut BiquadFilterStage) {
        stage.set_filter_type(self.filter_type);
        stage.set_resonance(self.resonance as f64);
        stage.set_shelf_gain(self.gain_db as f64);
        stage.set_cutoff_frequency(self.cutoff_hz as f64);
    }

    /// Pushes only what differs from `previous`, so the synchronous recomputations for Q, gain
    /// and type only happen when those actually change.
    pub fn apply_changes(&self, previous: &FilterSettings, stage: &mut BiquadFilterStage) {
        if self.filter_type != previous.filter_type {
            stage.set_filter_type(self.filter_type);
        }
        if self.resonance != previous.resonance {
            stage.set_resonance(self.resonance as f64);
        }
        if self.gain_db != previous.gain_db {
            stage.set_shelf_gain(self.gain_db as f64);
        }
        if self.cutoff_hz != previous.cutoff_hz {
            stage.set_cutoff_frequency(self.cutoff_hz as f64);
        }
    }
}
