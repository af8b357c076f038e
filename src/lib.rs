use nih_plug::prelude::*;

pub mod biquad;
mod params;
mod processor;
pub mod smoothing;

pub use biquad::{BiquadFilterStage, Coefficients, FilterType};
pub use processor::MultiFilter;

impl ClapPlugin for MultiFilter {
    const CLAP_ID: &'static str = "com.multi-filter.biquad";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A single biquad stage with six response shapes and a smoothed cutoff");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Filter,
        ClapFeature::Equalizer,
    ];
}

impl Vst3Plugin for MultiFilter {
    const VST3_CLASS_ID: [u8; 16] = *b"MultiFilterBiqd1";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Filter];
}

nih_export_clap!(MultiFilter);
nih_export_vst3!(MultiFilter);
