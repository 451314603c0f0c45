//! Voice trait and the tagged voice configuration handed to the scheduler.

use super::additive::{AdditiveParams, AdditiveVoice};
use super::sine_env::{SineEnv, SineEnvParams};
use super::tremolo::{TremoloParams, TremoloVoice};
use super::Frame;

/// Lifecycle report returned after rendering a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceStatus {
    Active,
    /// Voice is silent for good and may be dropped
    Finished,
}

/// A sounding note owned by the scheduler until it finishes
pub trait Voice: Send {
    /// Called once before each rendered block
    fn begin_block(&mut self) {}

    /// Produce the next stereo frame
    fn next_frame(&mut self) -> Frame;

    /// True once the voice will never produce audible output again
    fn is_finished(&self) -> bool;

    /// Mix one block into `out` and report whether the voice should be freed
    fn render(&mut self, out: &mut [Frame]) -> VoiceStatus {
        self.begin_block();
        for frame in out.iter_mut() {
            let [left, right] = self.next_frame();
            frame[0] += left;
            frame[1] += right;
        }
        if self.is_finished() {
            VoiceStatus::Finished
        } else {
            VoiceStatus::Active
        }
    }
}

/// Immutable description of a voice to instantiate
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceSpec {
    Sine(SineEnvParams),
    Tremolo(TremoloParams),
    Additive(AdditiveParams),
}

impl VoiceSpec {
    /// Instantiate the voice at the given sample rate
    pub fn build(&self, sample_rate_hz: f32) -> Box<dyn Voice> {
        match self {
            VoiceSpec::Sine(p) => Box::new(SineEnv::new(p.clone(), sample_rate_hz)),
            VoiceSpec::Tremolo(p) => Box::new(TremoloVoice::new(p.clone(), sample_rate_hz)),
            VoiceSpec::Additive(p) => Box::new(AdditiveVoice::new(p.clone(), sample_rate_hz)),
        }
    }

    /// Nominal note length (seconds)
    pub fn duration_s(&self) -> f32 {
        match self {
            VoiceSpec::Sine(p) => p.duration_s,
            VoiceSpec::Tremolo(p) => p.duration_s,
            VoiceSpec::Additive(p) => p.duration_s,
        }
    }

    /// Fundamental frequency (Hz)
    pub fn freq_hz(&self) -> f32 {
        match self {
            VoiceSpec::Sine(p) => p.freq_hz,
            VoiceSpec::Tremolo(p) => p.freq_hz,
            VoiceSpec::Additive(p) => p.freq_hz,
        }
    }
}

impl From<SineEnvParams> for VoiceSpec {
    fn from(params: SineEnvParams) -> Self {
        VoiceSpec::Sine(params)
    }
}

impl From<TremoloParams> for VoiceSpec {
    fn from(params: TremoloParams) -> Self {
        VoiceSpec::Tremolo(params)
    }
}

impl From<AdditiveParams> for VoiceSpec {
    fn from(params: AdditiveParams) -> Self {
        VoiceSpec::Additive(params)
    }
}
