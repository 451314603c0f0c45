//! Voice engine: envelopes, oscillators and the three synthesizer voices.
//!
//! Voices are configured once through immutable parameter structs and then
//! owned by the scheduler, which renders them block by block until they
//! report [`VoiceStatus::Finished`].

mod additive;
mod dynamics;
mod envelope;
mod oscillator;
mod sine_env;
mod tremolo;
mod voice;

/// Interleaved stereo frame (left, right)
pub type Frame = [f32; 2];

pub use additive::{
    AdditiveParams, AdditivePreset, AdditiveVoice, BandParams, ADDITIVE_SILENCE, PARTIAL_COUNT,
};
pub use dynamics::{EnvelopeFollower, Pan};
pub use envelope::{Envelope, DEFAULT_CURVE};
pub use oscillator::{Sine, TableOsc, Waveform, TABLE_SIZE};
pub use sine_env::{SineEnv, SineEnvParams};
pub use tremolo::{tremolo_gain, TremoloParams, TremoloVoice, TREMOLO_SILENCE};
pub use voice::{Voice, VoiceSpec, VoiceStatus};
