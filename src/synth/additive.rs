//! Nine-partial additive voice with three independently enveloped bands.
//!
//! Partials 0-2 form the "strings" band, 3-4 the low band and 5-8 the upper
//! band. Every partial runs at `ratio * fundamental`; changing either the
//! fundamental or a ratio retunes the affected oscillators immediately.

use super::dynamics::{EnvelopeFollower, Pan};
use super::envelope::{Envelope, DEFAULT_CURVE};
use super::oscillator::Sine;
use super::voice::Voice;
use super::Frame;

/// Number of sine partials
pub const PARTIAL_COUNT: usize = 9;

/// Output level below which a finished additive voice is freed
pub const ADDITIVE_SILENCE: f32 = 0.0001;

/// Partial index ranges of the three bands
const STRINGS: std::ops::Range<usize> = 0..3;
const LOW: std::ops::Range<usize> = 3..5;
const UPPER: std::ops::Range<usize> = 5..9;

/// Gain and envelope shape of one partial band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandParams {
    /// Band gain (linear)
    pub amp: f32,

    /// Rise to full level (seconds)
    pub attack_s: f32,

    /// Fall from sustain to silence (seconds)
    pub decay_s: f32,

    /// Level held between attack and decay [0, 1]
    pub sustain: f32,
}

/// Named parameter sets for the additive voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdditivePreset {
    /// Soft organ-like tone with near-harmonic partials
    #[default]
    Default,
    /// Inharmonic bell partials, instant attacks and long decays
    Chimes,
    /// Chime partials at five times the level
    Trumpet,
}

/// Additive voice parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveParams {
    /// Note length (seconds)
    pub duration_s: f32,

    /// Fundamental frequency (Hz)
    pub freq_hz: f32,

    /// Overall amplitude (linear gain)
    pub amp: f32,

    pub strings: BandParams,
    pub low: BandParams,
    pub upper: BandParams,

    /// Partial frequencies as multiples of the fundamental
    pub ratios: [f32; PARTIAL_COUNT],

    /// Stereo position [-1, 1]
    pub pan: f32,
}

impl AdditiveParams {
    pub fn preset(preset: AdditivePreset) -> Self {
        match preset {
            AdditivePreset::Default => Self {
                duration_s: 6.2,
                freq_hz: 155.6,
                amp: 0.01,
                strings: BandParams {
                    amp: 0.5,
                    attack_s: 0.1,
                    decay_s: 0.1,
                    sustain: 1.0,
                },
                low: BandParams {
                    amp: 0.5,
                    attack_s: 0.001,
                    decay_s: 0.1,
                    sustain: 1.0,
                },
                upper: BandParams {
                    amp: 0.6,
                    attack_s: 0.01,
                    decay_s: 0.075,
                    sustain: 1.0,
                },
                ratios: [1.0, 2.001, 3.0, 4.00009, 5.0002, 6.0, 7.0, 8.0, 9.0],
                pan: 0.0,
            },
            AdditivePreset::Chimes => Self {
                duration_s: 6.2,
                freq_hz: 440.0,
                amp: 0.1,
                strings: BandParams {
                    amp: 0.05,
                    attack_s: 0.0001,
                    decay_s: 3.8,
                    sustain: 0.3,
                },
                low: BandParams {
                    amp: 0.04,
                    attack_s: 0.0001,
                    decay_s: 6.0,
                    sustain: 0.99,
                },
                upper: BandParams {
                    amp: 0.03,
                    attack_s: 0.0001,
                    decay_s: 6.0,
                    sustain: 0.9,
                },
                ratios: [2.0, 3.0, 4.07, 0.56, 0.92, 1.19, 1.7, 2.75, 3.36],
                pan: 0.0,
            },
            AdditivePreset::Trumpet => Self {
                amp: 0.5,
                ..Self::preset(AdditivePreset::Chimes)
            },
        }
    }

    /// Absolute partial frequencies (Hz)
    pub fn partial_freqs(&self) -> [f32; PARTIAL_COUNT] {
        self.ratios.map(|ratio| ratio * self.freq_hz)
    }
}

impl Default for AdditiveParams {
    fn default() -> Self {
        Self::preset(AdditivePreset::Default)
    }
}

/// Nine sine partials in three enveloped bands
#[derive(Debug, Clone)]
pub struct AdditiveVoice {
    params: AdditiveParams,
    partials: [Sine; PARTIAL_COUNT],
    strings_env: Envelope,
    low_env: Envelope,
    upper_env: Envelope,
    follower: EnvelopeFollower,
    pan: Pan,
}

fn band_envelope(band: &BandParams, duration_s: f32, sample_rate_hz: f32) -> Envelope {
    Envelope::attack_hold_decay(
        band.attack_s,
        band.decay_s,
        band.sustain,
        duration_s,
        DEFAULT_CURVE,
        sample_rate_hz,
    )
}

impl AdditiveVoice {
    pub fn new(params: AdditiveParams, sample_rate_hz: f32) -> Self {
        let freqs = params.partial_freqs();
        Self {
            partials: freqs.map(|f| Sine::new(f, sample_rate_hz)),
            strings_env: band_envelope(&params.strings, params.duration_s, sample_rate_hz),
            low_env: band_envelope(&params.low, params.duration_s, sample_rate_hz),
            upper_env: band_envelope(&params.upper, params.duration_s, sample_rate_hz),
            follower: EnvelopeFollower::new(sample_rate_hz),
            pan: Pan::new(params.pan),
            params,
        }
    }

    pub fn params(&self) -> &AdditiveParams {
        &self.params
    }

    /// Retune every partial to `ratio * freq_hz`
    pub fn set_fundamental(&mut self, freq_hz: f32) {
        self.params.freq_hz = freq_hz;
        for (osc, ratio) in self.partials.iter_mut().zip(self.params.ratios) {
            osc.set_freq(ratio * freq_hz);
        }
    }

    /// Change one partial's ratio, retuning only that partial
    pub fn set_ratio(&mut self, index: usize, ratio: f32) {
        if let Some(osc) = self.partials.get_mut(index) {
            self.params.ratios[index] = ratio;
            osc.set_freq(ratio * self.params.freq_hz);
        }
    }

    /// Current partial frequencies (Hz)
    pub fn frequencies(&self) -> [f32; PARTIAL_COUNT] {
        std::array::from_fn(|i| self.partials[i].freq())
    }

    pub fn strings_envelope(&self) -> &Envelope {
        &self.strings_env
    }

    fn band_sum(&mut self, band: std::ops::Range<usize>) -> f32 {
        self.partials[band].iter_mut().map(|osc| osc.next_sample()).sum()
    }
}

impl Voice for AdditiveVoice {
    fn begin_block(&mut self) {
        let duration_s = self.params.duration_s;
        self.strings_env.fit_segment(duration_s, 1);
        self.low_env.fit_segment(duration_s, 1);
        self.upper_env.fit_segment(duration_s, 1);
    }

    fn next_frame(&mut self) -> Frame {
        let strings = self.band_sum(STRINGS) * self.strings_env.next_value() * self.params.strings.amp;
        let low = self.band_sum(LOW) * self.low_env.next_value() * self.params.low.amp;
        let upper = self.band_sum(UPPER) * self.upper_env.next_value() * self.params.upper.amp;

        let sample = (strings + low + upper) * self.params.amp;
        self.follower.process(sample);
        self.pan.apply(sample)
    }

    fn is_finished(&self) -> bool {
        self.strings_env.done() && self.follower.is_below(ADDITIVE_SILENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::voice::VoiceStatus;

    const SR: f32 = 44100.0;

    #[test]
    fn test_set_fundamental_retunes_all_partials() {
        let mut voice = AdditiveVoice::new(AdditiveParams::preset(AdditivePreset::Chimes), SR);
        voice.set_fundamental(300.0);

        let ratios = voice.params().ratios;
        for (freq, ratio) in voice.frequencies().iter().zip(ratios) {
            assert!((freq - ratio * 300.0).abs() < 1e-3);
        }
        assert_eq!(voice.params().freq_hz, 300.0);
    }

    #[test]
    fn test_set_ratio_retunes_one_partial() {
        let mut voice = AdditiveVoice::new(AdditiveParams::default(), SR);
        let before = voice.frequencies();
        voice.set_ratio(4, 5.5);
        let after = voice.frequencies();

        assert!((after[4] - 5.5 * 155.6).abs() < 1e-3);
        for i in (0..PARTIAL_COUNT).filter(|i| *i != 4) {
            assert_eq!(before[i], after[i]);
        }

        voice.set_ratio(PARTIAL_COUNT, 2.0); // Out of range is ignored
        assert_eq!(voice.frequencies(), after);
    }

    #[test]
    fn test_presets_share_engine() {
        let chimes = AdditiveParams::preset(AdditivePreset::Chimes);
        let trumpet = AdditiveParams::preset(AdditivePreset::Trumpet);

        assert_eq!(trumpet.amp, 0.5);
        assert_eq!(chimes.amp, 0.1);
        assert_eq!(trumpet.ratios, chimes.ratios);
        assert_eq!(trumpet.strings, chimes.strings);
    }

    #[test]
    fn test_default_preset_bands_hold_full_level() {
        let voice = AdditiveVoice::new(AdditiveParams::default(), SR);
        let env = voice.strings_envelope();
        assert_eq!(env.value_at(0.0), 0.0);
        assert!((env.value_at(3.0) - 1.0).abs() < 1e-6);
        assert!(env.value_at(6.2).abs() < 1e-6);
    }

    #[test]
    fn test_chime_rings_then_frees() {
        let params = AdditiveParams {
            duration_s: 0.2,
            ..AdditiveParams::preset(AdditivePreset::Chimes)
        };
        let mut voice = AdditiveVoice::new(params, SR);
        let mut block = vec![[0.0; 2]; 256];

        assert_eq!(voice.render(&mut block), VoiceStatus::Active);
        assert!(block.iter().any(|f| f[0].abs() > 0.0));

        let mut blocks = 1;
        while voice.render(&mut block) == VoiceStatus::Active {
            blocks += 1;
            assert!(blocks < 10_000, "voice never finished");
        }
        assert!(voice.strings_envelope().done());
    }
}
