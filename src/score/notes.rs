//! Note-emission helpers shared by the score.
//!
//! Each helper derives timing and pitch parameters and pushes one or more
//! voice requests into an [`EventSink`].

use rand::Rng;

use super::scheduler::EventSink;
use crate::synth::{AdditiveParams, AdditivePreset, SineEnvParams};

/// Amplitude used by `sin_q` when the phrase has no accent
pub const SIN_Q_AMP: f32 = 0.3;

/// Amplitude of pad chord tones
pub const SIN_WHOLE_AMP: f32 = 0.1;

/// Entries in an equal-temperament table
pub const SCALE_STEPS: usize = 20;

/// Shortest chime inter-onset interval (seconds)
pub const MIN_INTER_ONSET_S: f32 = 1e-4;

/// Short plucked sine: attack is a quarter of the note, decay half
pub fn sin_q<S: EventSink + ?Sized>(sink: &mut S, time_s: f32, freq_hz: f32, len_s: f32, amp: f32) {
    sink.add(
        time_s,
        SineEnvParams {
            duration_s: len_s,
            freq_hz,
            amp,
            attack_s: len_s * 0.25,
            decay_s: len_s * 0.5,
            pan: 0.0,
        }
        .into(),
    );
}

/// Slow pad tone with adjustable attack and decay, both scaled by `scale`
///
/// Attack is `(len * 0.25 + attack_adj) * scale` and decay is
/// `(1 + decay_adj) * scale`; the note length itself is not scaled.
pub fn sin_whole<S: EventSink + ?Sized>(
    sink: &mut S,
    time_s: f32,
    freq_hz: f32,
    len_s: f32,
    attack_adj: f32,
    decay_adj: f32,
    scale: f32,
) {
    sink.add(
        time_s,
        SineEnvParams {
            duration_s: len_s,
            freq_hz,
            amp: SIN_WHOLE_AMP,
            attack_s: (len_s * 0.25 + attack_adj) * scale,
            decay_s: (1.0 + decay_adj) * scale,
            pan: 0.0,
        }
        .into(),
    );
}

/// Uniform sample in `[a, b)`, tolerating swapped or equal bounds
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.random_range(lo..hi)
    }
}

/// Bounds for the three per-band attack times of a chime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackRange {
    /// Minimum attack per band: strings, low, upper (seconds)
    pub min_s: [f32; 3],

    /// Maximum attack per band: strings, low, upper (seconds)
    pub max_s: [f32; 3],
}

impl AttackRange {
    /// Even, fast texture used at the edges of each chime layer
    pub const STEADY: AttackRange = AttackRange {
        min_s: [0.0001; 3],
        max_s: [0.1; 3],
    };

    /// Randomly drawn bounds for a two-second chime burst
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            min_s: std::array::from_fn(|_| uniform(rng, 0.00005, 0.006)),
            max_s: std::array::from_fn(|_| uniform(rng, 0.05, 0.6)),
        }
    }

    /// Shortest possible inter-onset interval
    pub fn min_sum(&self) -> f32 {
        self.min_s.iter().sum()
    }

    /// Longest possible inter-onset interval
    pub fn max_sum(&self) -> f32 {
        self.max_s.iter().sum()
    }

    /// Draw the next inter-onset interval
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        uniform(rng, self.min_sum(), self.max_sum()).max(MIN_INTER_ONSET_S)
    }
}

/// Equal-temperament table: 20 ascending half steps from a base pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale12Tet {
    steps: [f32; SCALE_STEPS],
}

impl Scale12Tet {
    /// Half-step ratio, 2^(1/12)
    pub const HALF_STEP: f32 = 1.059_463_1;

    pub fn build(lowest_hz: f32) -> Self {
        let mut steps = [0.0; SCALE_STEPS];
        let mut f = lowest_hz;
        for step in &mut steps {
            *step = f;
            f *= Self::HALF_STEP;
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[f32; SCALE_STEPS] {
        &self.steps
    }

    pub fn lowest(&self) -> f32 {
        self.steps[0]
    }

    pub fn contains(&self, freq_hz: f32) -> bool {
        self.steps.iter().any(|s| (s - freq_hz).abs() < 1e-3)
    }

    /// Uniformly chosen entry
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.steps[rng.random_range(0..SCALE_STEPS)]
    }
}

fn chime(attack_s: f32, freq_hz: f32, amp: f32) -> AdditiveParams {
    let mut params = AdditiveParams::preset(AdditivePreset::Chimes);
    params.strings.attack_s = attack_s;
    params.freq_hz = freq_hz;
    params.amp = amp;
    params
}

/// Renewal process of chimes between `from_s` and `to_s`
///
/// Each chime's strings attack equals the interval to the next onset, so the
/// texture gets denser as the attack range shrinks. Returns the number of
/// chimes placed; every onset is at or before `to_s`.
pub fn fill_time<S, R>(
    sink: &mut S,
    rng: &mut R,
    from_s: f32,
    to_s: f32,
    attacks: &AttackRange,
    freq_range_hz: (f32, f32),
    amp: f32,
) -> usize
where
    S: EventSink + ?Sized,
    R: Rng + ?Sized,
{
    let mut cursor = from_s;
    let mut placed = 0;
    while cursor <= to_s {
        let interval = attacks.sample(rng);
        let freq = uniform(rng, freq_range_hz.0, freq_range_hz.1);
        sink.add(cursor, chime(interval, freq, amp).into());
        cursor += interval;
        placed += 1;
    }
    placed
}

/// Same renewal process as [`fill_time`] with pitches drawn from `scale`
pub fn fill_time_with_12tet<S, R>(
    sink: &mut S,
    rng: &mut R,
    from_s: f32,
    to_s: f32,
    attacks: &AttackRange,
    scale: &Scale12Tet,
    amp: f32,
) -> usize
where
    S: EventSink + ?Sized,
    R: Rng + ?Sized,
{
    let mut cursor = from_s;
    let mut placed = 0;
    while cursor <= to_s {
        let interval = attacks.sample(rng);
        let freq = scale.random(rng);
        sink.add(cursor, chime(interval, freq, amp).into());
        cursor += interval;
        placed += 1;
    }
    placed
}
