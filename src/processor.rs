use nih_plug::prelude::*;
use std::sync::Arc;

use crate::biquad::BiquadFilterStage;
use crate::params::{FilterSettings, MultiFilterParams};

pub struct MultiFilter {
    params: Arc<MultiFilterParams>,

    /// One stage per output channel, built in `initialize()`.
    stages: Vec<BiquadFilterStage>,
    /// What the stages were last told, so a block only pushes the parameters that moved.
    applied: FilterSettings,
}

impl Default for MultiFilter {
    fn default() -> Self {
        let params = Arc::new(MultiFilterParams::default());
        let applied = FilterSettings::from_params(&params);

        Self {
            params,

            stages: Vec::new(),
            applied,
        }
    }
}

impl MultiFilter {
    /// Called on the audio thread between blocks. Host automation is picked up at block
    /// boundaries, which `SAMPLE_ACCURATE_AUTOMATION` makes as fine grained as the host sends it.
    fn sync_parameters(&mut self) {
        let current = FilterSettings::from_params(&self.params);
        if current == self.applied {
            return;
        }

        for stage in self.stages.iter_mut() {
            current.apply_changes(&self.applied, stage);
        }
        self.applied = current;
    }

    /// Filters every channel in place, each through its own stage.
    fn filter_block(&mut self, channels: &mut [&mut [f32]]) {
        for (samples, stage) in channels.iter_mut().zip(self.stages.iter_mut()) {
            for sample in samples.iter_mut() {
                *sample = stage.process_sample(*sample as f64) as f32;
            }
        }
    }
}

impl Plugin for MultiFilter {
    const NAME: &'static str = "MultiFilter";
    const VENDOR: &'static str = "multi_filter";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let channels = match audio_io_layout.main_output_channels {
            Some(channels) => channels.get() as usize,
            None => {
                nih_log!("MultiFilter needs a main output, refusing the layout");
                return false;
            }
        };

        // Parameters first, then the sample rate so the cutoff starts at its value instead of
        // ramping towards it from the default
        self.applied = FilterSettings::from_params(&self.params);
        self.stages.clear();
        for _ in 0..channels {
            let mut stage = BiquadFilterStage::new();
            self.applied.apply(&mut stage);
            stage.set_sample_rate(buffer_config.sample_rate as f64);
            self.stages.push(stage);
        }

        nih_log!(
            "Initialized {} filter stage(s) at {} Hz ({:?}, {} Hz, Q {}, {} dB)",
            channels,
            buffer_config.sample_rate,
            self.applied.filter_type,
            self.applied.cutoff_hz,
            self.applied.resonance,
            self.applied.gain_db,
        );

        true
    }

    fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        self.sync_parameters();

        self.filter_block(buffer.as_slice());

        ProcessStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biquad::{FilterType, DEFAULT_RESONANCE};

    fn impulse(len: usize) -> Vec<f32> {
        (0..len).map(|n| if n == 0 { 1.0 } else { 0.0 }).collect()
    }

    fn plugin_with_stages(channels: usize, sample_rate: f64) -> MultiFilter {
        let mut plugin = MultiFilter::default();
        for _ in 0..channels {
            let mut stage = BiquadFilterStage::new();
            plugin.applied.apply(&mut stage);
            stage.set_sample_rate(sample_rate);
            plugin.stages.push(stage);
        }
        plugin
    }

    #[test]
    fn sync_without_changes_leaves_the_stages_alone() {
        let mut plugin = plugin_with_stages(2, 44100.0);
        let before: Vec<_> = plugin.stages.iter().map(|s| s.coefficients()).collect();

        plugin.sync_parameters();

        let after: Vec<_> = plugin.stages.iter().map(|s| s.coefficients()).collect();
        assert_eq!(before, after);
        assert!(plugin.stages.iter().all(|s| !s.is_smoothing()));
    }

    #[test]
    fn sync_pushes_changes_into_every_stage() {
        let mut plugin = plugin_with_stages(2, 44100.0);
        let stale = FilterSettings {
            cutoff_hz: 5000.0,
            resonance: 3.0,
            gain_db: 6.0,
            filter_type: FilterType::HighShelf,
        };
        for stage in plugin.stages.iter_mut() {
            stale.apply(stage);
            stage.set_sample_rate(44100.0);
            assert_eq!(stage.filter_type(), FilterType::HighShelf);
            assert_eq!(stage.target_cutoff_frequency(), 5000.0);
        }
        plugin.applied = stale;

        plugin.sync_parameters();

        assert_eq!(plugin.applied, FilterSettings::from_params(&plugin.params));
        for stage in &plugin.stages {
            assert_eq!(stage.filter_type(), FilterType::LowPass);
            assert_eq!(stage.resonance(), DEFAULT_RESONANCE as f32 as f64);
            assert_eq!(stage.shelf_gain(), 0.0);
            assert_eq!(stage.target_cutoff_frequency(), 1000.0);
        }
    }

    #[test]
    fn reset_clears_every_stage() {
        let mut plugin = plugin_with_stages(2, 48000.0);
        for stage in plugin.stages.iter_mut() {
            for _ in 0..32 {
                stage.process_sample(1.0);
            }
        }

        plugin.reset();

        for stage in plugin.stages.iter_mut() {
            let b0 = stage.coefficients().b0;
            assert_eq!(stage.process_sample(1.0), b0);
        }
    }

    #[test]
    fn filter_block_writes_each_channel_back_through_its_own_stage() {
        let mut plugin = plugin_with_stages(2, 44100.0);
        let c = plugin.stages[0].coefficients();

        let mut left = impulse(4);
        let mut right = impulse(4);
        plugin.filter_block(&mut [left.as_mut_slice(), right.as_mut_slice()]);

        for channel in [&left, &right] {
            assert_eq!(channel[0], c.b0 as f32);
            assert_eq!(channel[1], (c.b1 - c.a1 * c.b0) as f32);
        }
    }

    #[test]
    fn filter_block_keeps_channels_apart() {
        let mut mono = plugin_with_stages(1, 44100.0);
        let mut stereo = plugin_with_stages(2, 44100.0);

        let mut expected = impulse(256);
        mono.filter_block(&mut [expected.as_mut_slice()]);

        let mut left = impulse(256);
        let mut right: Vec<f32> = (0..256).map(|n| ((n as f32) * 0.3).sin()).collect();
        stereo.filter_block(&mut [left.as_mut_slice(), right.as_mut_slice()]);

        assert_eq!(left, expected);
        assert_ne!(right[1..], expected[1..]);
    }
}
