//! Multi-segment breakpoint envelope with per-segment curvature.
//!
//! An envelope with `n` segments holds `n + 1` levels. Segment `i` moves from
//! `levels[i]` to `levels[i + 1]` over `lengths[i]` seconds. A curvature of 0
//! gives straight lines; negative curvature rises fast and settles slowly:
//!
//! ```text
//! value(x) = start + (end - start) * (1 - e^(c·x)) / (1 - e^c),   x ∈ [0, 1]
//! ```

/// Curvature used when none is requested (fast attack, slow settle)
pub const DEFAULT_CURVE: f32 = -4.0;

/// Below this magnitude a curvature is treated as linear
const LINEAR_EPSILON: f32 = 1e-5;

/// Breakpoint envelope evaluated either by time or sample by sample
#[derive(Debug, Clone)]
pub struct Envelope {
    levels: Vec<f32>,
    lengths: Vec<f32>,
    curve: f32,
    sample_rate_hz: f32,
    /// Samples emitted so far by `next_value`
    elapsed_samples: u64,
}

impl Envelope {
    /// Create an envelope from `lengths.len() + 1` levels
    ///
    /// Missing levels are padded with zeros and extra levels are dropped so the
    /// level count always matches the segment count. Negative lengths clamp to 0.
    pub fn new(levels: &[f32], lengths: &[f32], curve: f32, sample_rate_hz: f32) -> Self {
        let mut levels = levels.to_vec();
        levels.resize(lengths.len() + 1, 0.0);

        Self {
            levels,
            lengths: lengths.iter().map(|l| l.max(0.0)).collect(),
            curve,
            sample_rate_hz,
            elapsed_samples: 0,
        }
    }

    /// Attack / hold / decay envelope rising to 1, holding at `sustain`, then
    /// falling to 0, stretched so the whole shape spans `duration_s`
    pub fn attack_hold_decay(
        attack_s: f32,
        decay_s: f32,
        sustain: f32,
        duration_s: f32,
        curve: f32,
        sample_rate_hz: f32,
    ) -> Self {
        let mut env = Self::new(
            &[0.0, 1.0, sustain, 0.0],
            &[attack_s, 0.0, decay_s],
            curve,
            sample_rate_hz,
        );
        env.fit_segment(duration_s, 1);
        env
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    pub fn lengths(&self) -> &[f32] {
        &self.lengths
    }

    pub fn curve(&self) -> f32 {
        self.curve
    }

    pub fn segment_count(&self) -> usize {
        self.lengths.len()
    }

    /// Sum of all segment lengths (seconds)
    pub fn total_length(&self) -> f32 {
        self.lengths.iter().sum()
    }

    /// Resize one segment so the envelope spans exactly `total_s`
    ///
    /// If the other segments alone exceed `total_s` they are scaled down
    /// proportionally and the chosen segment collapses to 0, so the envelope
    /// never has a negative segment and never outlives the requested length.
    pub fn fit_segment(&mut self, total_s: f32, segment: usize) {
        if segment >= self.lengths.len() {
            return;
        }
        let total_s = total_s.max(0.0);

        let others: f32 = self
            .lengths
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != segment)
            .map(|(_, l)| *l)
            .sum();

        if others <= total_s {
            self.lengths[segment] = total_s - others;
        } else {
            let scale = total_s / others;
            for (i, length) in self.lengths.iter_mut().enumerate() {
                *length = if i == segment { 0.0 } else { *length * scale };
            }
        }
    }

    /// Scale every segment proportionally so the envelope spans `total_s`
    pub fn scale_to(&mut self, total_s: f32) {
        let total_s = total_s.max(0.0);
        let current = self.total_length();
        if current > 0.0 {
            let scale = total_s / current;
            for length in &mut self.lengths {
                *length *= scale;
            }
        } else if let Some(last) = self.lengths.last_mut() {
            *last = total_s;
        }
    }

    /// Envelope value at `t_s` seconds after the start
    pub fn value_at(&self, t_s: f32) -> f32 {
        if t_s <= 0.0 {
            return self.levels[0];
        }

        let mut segment_start = 0.0;
        for (i, &length) in self.lengths.iter().enumerate() {
            let segment_end = segment_start + length;
            if t_s < segment_end {
                let x = (t_s - segment_start) / length;
                return shape(self.levels[i], self.levels[i + 1], x, self.curve);
            }
            segment_start = segment_end;
        }

        self.levels[self.levels.len() - 1]
    }

    /// Emit the value for the current sample and advance one sample
    pub fn next_value(&mut self) -> f32 {
        let value = self.value_at(self.elapsed_s());
        self.elapsed_samples += 1;
        value
    }

    /// Time consumed so far by `next_value` (seconds)
    pub fn elapsed_s(&self) -> f32 {
        self.elapsed_samples as f32 / self.sample_rate_hz
    }

    /// True once every segment has been traversed
    pub fn done(&self) -> bool {
        self.elapsed_s() >= self.total_length()
    }

    /// Rewind to the first sample
    pub fn reset(&mut self) {
        self.elapsed_samples = 0;
    }
}

/// Interpolate between `start` and `end` at position `x` ∈ [0, 1]
fn shape(start: f32, end: f32, x: f32, curve: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    if curve.abs() < LINEAR_EPSILON {
        start + (end - start) * x
    } else {
        start + (end - start) * (1.0 - (curve * x).exp()) / (1.0 - curve.exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    #[test]
    fn test_linear_envelope_endpoints_and_plateau() {
        let env = Envelope::attack_hold_decay(1.0, 2.0, 1.0, 6.5, 0.0, SR);

        assert_eq!(env.value_at(0.0), 0.0);
        assert!(env.value_at(6.5).abs() < 1e-6);
        for t in [1.0, 2.0, 3.0, 4.0, 4.5] {
            assert!((env.value_at(t) - 1.0).abs() < 1e-6, "plateau broken at {}", t);
        }
        assert!((env.value_at(0.5) - 0.5).abs() < 1e-6); // Halfway up the attack
    }

    #[test]
    fn test_fit_segment_absorbs_difference() {
        let env = Envelope::attack_hold_decay(0.5, 1.0, 1.0, 4.0, 0.0, SR);
        assert_eq!(env.lengths(), &[0.5, 2.5, 1.0]);
        assert!((env.total_length() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_segment_scales_when_overfull() {
        // Attack + decay (3s) longer than the note (1.5s)
        let env = Envelope::attack_hold_decay(1.0, 2.0, 1.0, 1.5, 0.0, SR);
        let lengths = env.lengths();

        assert!((lengths[0] - 0.5).abs() < 1e-6);
        assert_eq!(lengths[1], 0.0);
        assert!((lengths[2] - 1.0).abs() < 1e-6);
        assert!((env.total_length() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_negative_lengths_clamp_to_zero() {
        let env = Envelope::attack_hold_decay(-0.3, 1.0, 1.0, 2.0, 0.0, SR);
        assert!(env.lengths().iter().all(|l| *l >= 0.0));
        assert!((env.total_length() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_to_keeps_proportions() {
        let mut env = Envelope::new(&[4.0, 8.0, 4.0], &[0.5, 0.5], 0.0, SR);
        env.scale_to(10.0);
        assert_eq!(env.lengths(), &[5.0, 5.0]);
        assert!((env.value_at(5.0) - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_curved_segment_stays_between_levels() {
        let env = Envelope::attack_hold_decay(1.0, 1.0, 1.0, 3.0, DEFAULT_CURVE, SR);

        let early = env.value_at(0.25);
        assert!(early > 0.25, "negative curve should rise faster than a line");
        for i in 0..=300 {
            let v = env.value_at(i as f32 * 0.01);
            assert!((0.0..=1.0 + 1e-6).contains(&v));
        }
        assert!(env.value_at(3.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_stepping_reaches_done() {
        let mut env = Envelope::attack_hold_decay(0.001, 0.001, 1.0, 0.01, 0.0, SR);
        let total_samples = (0.01 * SR).ceil() as usize;

        assert_eq!(env.next_value(), 0.0);
        assert!(!env.done());
        for _ in 0..total_samples + 2 {
            env.next_value();
        }
        assert!(env.done());

        env.reset();
        assert!(!env.done());
    }
}
