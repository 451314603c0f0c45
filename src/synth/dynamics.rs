//! Stereo placement and output-level tracking.

use std::f32::consts::{FRAC_PI_4, TAU};

use super::Frame;

/// Constant-power stereo panner
#[derive(Debug, Clone, Copy)]
pub struct Pan {
    position: f32,
    left_gain: f32,
    right_gain: f32,
}

impl Pan {
    /// Create a panner at `position` ∈ [-1 (left), 1 (right)]
    pub fn new(position: f32) -> Self {
        let position = position.clamp(-1.0, 1.0);
        let angle = (position + 1.0) * FRAC_PI_4;
        Self {
            position,
            left_gain: angle.cos(),
            right_gain: angle.sin(),
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// Spread a mono sample across both channels
    pub fn apply(&self, sample: f32) -> Frame {
        [sample * self.left_gain, sample * self.right_gain]
    }
}

/// Cutoff of the magnitude smoother (Hz)
const FOLLOWER_CUTOFF_HZ: f32 = 10.0;

/// One-pole low-pass of |x| used to detect inaudible tails
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeFollower {
    value: f32,
    a0: f32,
    b1: f32,
}

impl EnvelopeFollower {
    pub fn new(sample_rate_hz: f32) -> Self {
        let b1 = (-TAU * FOLLOWER_CUTOFF_HZ / sample_rate_hz).exp();
        Self {
            value: 0.0,
            a0: 1.0 - b1,
            b1,
        }
    }

    /// Feed one sample, returning the smoothed magnitude
    pub fn process(&mut self, sample: f32) -> f32 {
        self.value = self.a0 * sample.abs() + self.b1 * self.value;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// True while the tracked level sits under `threshold`
    pub fn is_below(&self, threshold: f32) -> bool {
        self.value < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_pan_is_constant_power() {
        let pan = Pan::new(0.0);
        let [l, r] = pan.apply(1.0);
        assert!((l - r).abs() < 1e-6);
        assert!((l * l + r * r - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hard_pan_and_clamp() {
        let [l, r] = Pan::new(1.0).apply(1.0);
        assert!(l.abs() < 1e-6);
        assert!((r - 1.0).abs() < 1e-6);

        let clamped = Pan::new(-3.0);
        assert_eq!(clamped.position(), -1.0);
        let [l, r] = clamped.apply(1.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
    }

    #[test]
    fn test_follower_tracks_then_decays() {
        let mut follower = EnvelopeFollower::new(44100.0);
        for _ in 0..44100 {
            follower.process(-0.5); // Magnitude, not sign
        }
        assert!((follower.value() - 0.5).abs() < 1e-3);

        for _ in 0..44100 {
            follower.process(0.0);
        }
        assert!(follower.is_below(0.001));
    }
}
