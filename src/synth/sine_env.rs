//! Amplitude-enveloped sine voice.

use super::dynamics::Pan;
use super::envelope::Envelope;
use super::oscillator::Sine;
use super::voice::Voice;
use super::Frame;

/// Sine voice parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SineEnvParams {
    /// Note length (seconds)
    pub duration_s: f32,

    /// Oscillator frequency (Hz)
    pub freq_hz: f32,

    /// Peak amplitude (linear gain)
    pub amp: f32,

    /// Linear rise 0→1 (seconds)
    pub attack_s: f32,

    /// Linear fall 1→0 (seconds)
    pub decay_s: f32,

    /// Stereo position [-1, 1]
    pub pan: f32,
}

impl Default for SineEnvParams {
    fn default() -> Self {
        Self {
            duration_s: 6.5,
            freq_hz: 60.0,
            amp: 0.3,
            attack_s: 1.0,
            decay_s: 2.0,
            pan: 0.0,
        }
    }
}

/// Sine oscillator shaped by a linear attack / hold / decay envelope
#[derive(Debug, Clone)]
pub struct SineEnv {
    params: SineEnvParams,
    osc: Sine,
    env: Envelope,
    pan: Pan,
}

impl SineEnv {
    pub fn new(params: SineEnvParams, sample_rate_hz: f32) -> Self {
        let env = Envelope::attack_hold_decay(
            params.attack_s,
            params.decay_s,
            1.0,
            params.duration_s,
            0.0,
            sample_rate_hz,
        );
        Self {
            osc: Sine::new(params.freq_hz, sample_rate_hz),
            pan: Pan::new(params.pan),
            env,
            params,
        }
    }

    pub fn params(&self) -> &SineEnvParams {
        &self.params
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }
}

impl Voice for SineEnv {
    fn begin_block(&mut self) {
        self.env.fit_segment(self.params.duration_s, 1);
    }

    fn next_frame(&mut self) -> Frame {
        let sample = self.osc.next_sample() * self.env.next_value() * self.params.amp;
        self.pan.apply(sample)
    }

    fn is_finished(&self) -> bool {
        self.env.done()
    }
}

/// The voice as a lazy stereo sequence ending with its envelope
impl Iterator for SineEnv {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.env.done() {
            None
        } else {
            Some(self.next_frame())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::voice::VoiceStatus;

    const SR: f32 = 44100.0;

    #[test]
    fn test_envelope_shape_matches_duration() {
        let voice = SineEnv::new(SineEnvParams::default(), SR);
        let env = voice.envelope();

        assert_eq!(env.value_at(0.0), 0.0);
        assert!(env.value_at(6.5).abs() < 1e-6);
        assert!((env.value_at(2.0) - 1.0).abs() < 1e-6);
        assert!((env.total_length() - 6.5).abs() < 1e-6);
    }

    #[test]
    fn test_iterator_length_matches_duration() {
        let params = SineEnvParams {
            duration_s: 0.1,
            attack_s: 0.02,
            decay_s: 0.05,
            ..SineEnvParams::default()
        };
        let frames: Vec<Frame> = SineEnv::new(params, SR).collect();
        let expected = (0.1 * SR) as usize;
        assert!(frames.len().abs_diff(expected) <= 1);
        assert_eq!(frames[0], [0.0, 0.0]);
    }

    #[test]
    fn test_peak_respects_amplitude_and_pan() {
        let params = SineEnvParams {
            duration_s: 0.5,
            freq_hz: 441.0,
            amp: 0.3,
            attack_s: 0.01,
            decay_s: 0.01,
            pan: 0.0,
        };
        let peak = SineEnv::new(params, SR)
            .map(|[l, _]| l.abs())
            .fold(0.0f32, f32::max);

        // Center pan splits 0.3 by cos(π/4)
        assert!((peak - 0.3 * std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_finishes_in_block_after_envelope_ends() {
        let params = SineEnvParams {
            duration_s: 0.01,
            attack_s: 0.002,
            decay_s: 0.002,
            ..SineEnvParams::default()
        };
        let mut voice = SineEnv::new(params, SR);
        let mut block = vec![[0.0; 2]; 256];

        assert_eq!(voice.render(&mut block), VoiceStatus::Active); // 256 of 441 samples
        assert_eq!(voice.render(&mut block), VoiceStatus::Finished);
    }
}
