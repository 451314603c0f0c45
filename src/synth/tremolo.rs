//! Wavetable voice with a swept-rate tremolo.

use super::dynamics::{EnvelopeFollower, Pan};
use super::envelope::{Envelope, DEFAULT_CURVE};
use super::oscillator::{Sine, TableOsc, Waveform};
use super::voice::Voice;
use super::Frame;

/// Output level below which a finished tremolo voice is freed
pub const TREMOLO_SILENCE: f32 = 0.001;

/// Tremolo voice parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TremoloParams {
    /// Note length (seconds)
    pub duration_s: f32,

    /// Carrier frequency (Hz)
    pub freq_hz: f32,

    /// Peak amplitude (linear gain)
    pub amp: f32,

    /// Rise to full level (seconds)
    pub attack_s: f32,

    /// Fall from sustain to silence (seconds)
    pub decay_s: f32,

    /// Level held between attack and decay [0, 1]
    pub sustain: f32,

    /// Share of the amplitude modulated by the tremolo [0, 1]
    pub depth: f32,

    /// Tremolo rate at the start and end of the note (Hz)
    pub rate_start_hz: f32,

    /// Tremolo rate at the peak of the sweep (Hz)
    pub rate_peak_hz: f32,

    /// Fraction of the note spent sweeping up to `rate_peak_hz` [0, 1]
    pub rise: f32,

    /// Carrier wavetable
    pub waveform: Waveform,

    /// Stereo position [-1, 1]
    pub pan: f32,
}

impl Default for TremoloParams {
    fn default() -> Self {
        Self {
            duration_s: 10.0,
            freq_hz: 262.0,
            amp: 0.5,
            attack_s: 0.1,
            decay_s: 2.0,
            sustain: 1.0,
            depth: 0.4,
            rate_start_hz: 4.0,
            rate_peak_hz: 8.0,
            rise: 0.5,
            waveform: Waveform::Sine,
            pan: 0.8,
        }
    }
}

/// Wavetable carrier with an amplitude envelope and tremolo
#[derive(Debug, Clone)]
pub struct TremoloVoice {
    params: TremoloParams,
    carrier: TableOsc,
    lfo: Sine,
    amp_env: Envelope,
    rate_env: Envelope,
    follower: EnvelopeFollower,
    pan: Pan,
}

impl TremoloVoice {
    pub fn new(params: TremoloParams, sample_rate_hz: f32) -> Self {
        let amp_env = Envelope::attack_hold_decay(
            params.attack_s,
            params.decay_s,
            params.sustain,
            params.duration_s,
            DEFAULT_CURVE,
            sample_rate_hz,
        );

        let rise = params.rise.clamp(0.0, 1.0);
        let mut rate_env = Envelope::new(
            &[params.rate_start_hz, params.rate_peak_hz, params.rate_start_hz],
            &[rise, 1.0 - rise],
            DEFAULT_CURVE,
            sample_rate_hz,
        );
        rate_env.scale_to(params.duration_s);

        Self {
            carrier: TableOsc::new(params.waveform, params.freq_hz, sample_rate_hz),
            lfo: Sine::new(params.rate_start_hz, sample_rate_hz),
            follower: EnvelopeFollower::new(sample_rate_hz),
            pan: Pan::new(params.pan),
            amp_env,
            rate_env,
            params,
        }
    }

    pub fn params(&self) -> &TremoloParams {
        &self.params
    }

    pub fn envelope(&self) -> &Envelope {
        &self.amp_env
    }

    pub fn rate_envelope(&self) -> &Envelope {
        &self.rate_env
    }
}

/// Gain applied by a tremolo LFO sample `trm` ∈ [-1, 1] at the given depth
pub fn tremolo_gain(trm: f32, depth: f32) -> f32 {
    (trm * 0.5 + 0.5) * depth + (1.0 - depth)
}

impl Voice for TremoloVoice {
    fn begin_block(&mut self) {
        self.amp_env.fit_segment(self.params.duration_s, 1);
        self.rate_env.scale_to(self.params.duration_s);
    }

    fn next_frame(&mut self) -> Frame {
        self.lfo.set_freq(self.rate_env.next_value());
        let gain = tremolo_gain(self.lfo.next_sample(), self.params.depth);
        let sample =
            self.carrier.next_sample() * self.amp_env.next_value() * gain * self.params.amp;
        self.follower.process(sample);
        self.pan.apply(sample)
    }

    fn is_finished(&self) -> bool {
        self.amp_env.done() && self.follower.is_below(TREMOLO_SILENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::voice::VoiceStatus;

    const SR: f32 = 44100.0;

    #[test]
    fn test_tremolo_gain_range() {
        // Full depth swings between silence and unity
        assert_eq!(tremolo_gain(-1.0, 1.0), 0.0);
        assert_eq!(tremolo_gain(1.0, 1.0), 1.0);

        // Zero depth disables the tremolo
        assert_eq!(tremolo_gain(-1.0, 0.0), 1.0);

        // Default depth keeps 60% of the signal untouched
        assert!((tremolo_gain(-1.0, 0.4) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_rate_envelope_spans_duration() {
        let voice = TremoloVoice::new(TremoloParams::default(), SR);
        let rate = voice.rate_envelope();

        assert!((rate.total_length() - 10.0).abs() < 1e-4);
        assert_eq!(rate.value_at(0.0), 4.0);
        assert!((rate.value_at(5.0) - 8.0).abs() < 1e-4);
        assert!((rate.value_at(10.0) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_amplitude_envelope_uses_sustain() {
        let params = TremoloParams {
            duration_s: 4.0,
            attack_s: 0.5,
            decay_s: 1.0,
            sustain: 0.1,
            ..TremoloParams::default()
        };
        let voice = TremoloVoice::new(params, SR);
        let env = voice.envelope();

        assert_eq!(env.value_at(0.0), 0.0);
        assert!((env.value_at(0.5) - 1.0).abs() < 1e-5);
        assert!((env.value_at(3.0) - 0.1).abs() < 1e-5); // Holding at sustain
        assert!(env.value_at(4.0).abs() < 1e-6);
    }

    #[test]
    fn test_voice_frees_only_after_tail_decays() {
        let params = TremoloParams {
            duration_s: 0.05,
            attack_s: 0.01,
            decay_s: 0.02,
            ..TremoloParams::default()
        };
        let mut voice = TremoloVoice::new(params, SR);
        let mut block = vec![[0.0; 2]; 256];

        let mut blocks = 0;
        while voice.render(&mut block) == VoiceStatus::Active {
            blocks += 1;
            assert!(blocks < 10_000, "voice never finished");
        }

        // Envelope alone ends after ~9 blocks; follower keeps it alive longer
        assert!(blocks >= 8);
        assert!(voice.envelope().done());
    }
}
