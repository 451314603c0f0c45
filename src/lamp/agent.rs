//! Lava-lamp agents and their per-update state machine.
//!
//! Temperature is the only vertical driver: agents warmer than neutral rise,
//! cooler ones sink. Height bands heat the bottom of the lamp and cool the
//! top, which keeps the population circulating.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::params::LampPhysics;

/// Heating multiplier in the band just above the lamp floor
const FLOOR_HEAT_BOOST: f32 = 5.0;

/// Width of the heating and cooling bands next to floor and ceiling (meters)
const EDGE_BAND_M: f32 = 2.0;

/// Drift below this height is calmer than at the top
const LOWER_DRIFT_Y_M: f32 = -4.0;
const LOWER_DRIFT_SCALE: f32 = 0.75;

/// Drift above this height scales with height
const UPPER_DRIFT_Y_M: f32 = 2.0;

/// Source of the random perturbations that drive the agents
pub trait Noise {
    /// Uniform sample in [-1, 1)
    fn signed(&mut self) -> f32;

    /// Uniform sample between `a` and `b` (either order)
    fn range(&mut self, a: f32, b: f32) -> f32;
}

impl Noise for SmallRng {
    fn signed(&mut self) -> f32 {
        self.random_range(-1.0..1.0)
    }

    fn range(&mut self, a: f32, b: f32) -> f32 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if hi > lo {
            self.random_range(lo..hi)
        } else {
            lo
        }
    }
}

/// Noise pinned to one point of every distribution
///
/// `signed` always returns the value (clamped to [-1, 1]); `range` returns
/// the matching point between its bounds, so 0 yields the midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantNoise(pub f32);

impl Noise for ConstantNoise {
    fn signed(&mut self) -> f32 {
        self.0.clamp(-1.0, 1.0)
    }

    fn range(&mut self, a: f32, b: f32) -> f32 {
        let t = (self.signed() + 1.0) * 0.5;
        a + (b - a) * t
    }
}

/// Convert hue/saturation/value (all in [0, 1], hue wraps) to linear RGB
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Vec3 {
    let h = hue.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;

    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match sector as u32 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    Vec3::new(r, g, b)
}

/// Sonification frequency for a temperature, clamped to the audible band
pub fn frequency_for(temperature: f32, physics: &LampPhysics) -> f32 {
    let (lo, hi) = physics.frequency_range_hz;
    (temperature * physics.frequency_slope_hz + physics.frequency_offset_hz).clamp(lo, hi)
}

/// Blob radius at height `y`: rising blobs swell fast up to a cap, sinking ones grow slowly
pub fn radius_for(y: f32, physics: &LampPhysics) -> f32 {
    if y > 0.0 {
        (physics.start_radius_m + y * y * physics.upper_growth).min(physics.max_radius_m)
    } else {
        physics.start_radius_m + y * y * physics.lower_growth
    }
}

/// One blob of wax
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub position: Vec3,

    /// Linear RGB
    pub color: Vec3,

    /// Sphere radius (meters)
    pub radius: f32,

    /// Pitch of this agent's oscillator (Hz)
    pub frequency_hz: f32,

    /// Temperature [0, 100]
    pub temperature: f32,

    /// Direction flags; carried in the state but never driven
    pub rise: bool,
    pub fall: bool,

    /// Number of times the agent was pushed back inside the lamp
    pub rest: u32,

    pub id: usize,
}

impl Agent {
    /// Agent `id` of `count`, placed on the spawn ring at mid height
    pub fn spawn(id: usize, count: usize, start_freq_hz: f32, physics: &LampPhysics) -> Self {
        let angle = id as f32;
        Self {
            position: Vec3::new(
                angle.sin() * physics.start_ring_radius_m,
                0.0,
                -angle.cos() * physics.start_ring_radius_m,
            ),
            color: hsv_to_rgb(id as f32 / count as f32, 1.0, 1.0),
            radius: physics.start_radius_m,
            frequency_hz: start_freq_hz,
            temperature: physics.start_temperature,
            rise: false,
            fall: false,
            rest: 0,
            id,
        }
    }

    /// Static sphere that is drawn but never simulated
    pub fn marker(position: Vec3, color: Vec3, radius: f32) -> Self {
        Self {
            position,
            color,
            radius,
            frequency_hz: 0.0,
            temperature: 0.0,
            rise: false,
            fall: false,
            rest: 0,
            id: 0,
        }
    }

    /// Full update: temperature, position, color, then derived values
    pub fn step(&mut self, tick: u64, count: usize, noise: &mut impl Noise, physics: &LampPhysics) {
        self.update_temperature(tick, noise, physics);
        self.update_position(noise, physics);
        self.update_color(tick, count, physics);
        self.update_derived(physics);
    }

    /// Heat or cool depending on height band, keeping the result in range
    pub fn update_temperature(&mut self, tick: u64, noise: &mut impl Noise, physics: &LampPhysics) {
        let (t_min, t_max) = physics.temperature_range;
        let top = physics.max_height_m;
        let y = self.position.y;

        self.temperature = self.temperature.clamp(t_min, t_max);

        let s = noise.signed();
        if y > top {
            self.temperature -= s + 1.0;
        } else if y >= top - EDGE_BAND_M && y < top {
            self.temperature -= s;
        } else if y >= -top && y < -top + EDGE_BAND_M {
            self.temperature += (s + 1.0) * FLOOR_HEAT_BOOST;
        } else if y < -top {
            self.temperature += s + 1.0;
        } else if tick >= physics.settle_tick && tick % 3 == 0 {
            // Cooling eases off on every third tick once the lamp has settled
            self.temperature -= s;
        } else {
            self.temperature -= s + 1.0;
        }

        self.temperature = self.temperature.clamp(t_min, t_max);
    }

    /// Drift horizontally and move vertically with the temperature excess
    pub fn update_position(&mut self, noise: &mut impl Noise, physics: &LampPhysics) {
        self.confine(physics);

        let y = self.position.y;
        let drift = physics.horizontal_drift;
        let (dx, dz) = if y > UPPER_DRIFT_Y_M {
            (noise.range(-drift * y, drift * y), noise.range(-drift * y, drift * y))
        } else if y < LOWER_DRIFT_Y_M {
            (
                noise.range(-drift * y, drift * y) * LOWER_DRIFT_SCALE,
                noise.range(-drift * y, drift * y) * LOWER_DRIFT_SCALE,
            )
        } else {
            (noise.range(-drift, drift), noise.range(-drift, drift))
        };

        let excess = physics.neutral_temperature - self.temperature;
        self.position -= Vec3::new(dx, excess * physics.vertical_damping, dz);

        self.confine(physics);
    }

    /// Hue follows height, except on flash ticks where it shows the agent's identity
    pub fn update_color(&mut self, tick: u64, count: usize, physics: &LampPhysics) {
        let top = physics.max_height_m;
        let hue = if tick % physics.flash_every_ticks == 0 {
            self.id as f32 / count as f32
        } else {
            (self.position.y + top) / (3.0 * top)
        };
        self.color = hsv_to_rgb(hue, 1.0, 1.0);
    }

    /// Recompute frequency and radius from temperature and height
    pub fn update_derived(&mut self, physics: &LampPhysics) {
        self.frequency_hz = frequency_for(self.temperature, physics);
        self.radius = radius_for(self.position.y, physics);
    }

    fn confine(&mut self, physics: &LampPhysics) {
        let top = physics.max_height_m;
        if self.position.y < -top {
            self.position.y = -top;
            self.rest += 1;
        }
        if self.position.y > top {
            self.position.y = top;
            self.rest += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn agent_at(y: f32, temperature: f32) -> Agent {
        let physics = LampPhysics::default();
        Agent {
            position: Vec3::new(0.0, y, 0.0),
            temperature,
            ..Agent::spawn(0, 30, 261.6, &physics)
        }
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        assert!((hsv_to_rgb(1.0 / 3.0, 1.0, 1.0) - Vec3::Y).length() < 1e-5);
        assert!((hsv_to_rgb(2.0 / 3.0, 1.0, 1.0) - Vec3::Z).length() < 1e-5);
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), hsv_to_rgb(0.0, 1.0, 1.0)); // Hue wraps
    }

    #[test]
    fn test_temperature_stays_clamped() {
        let physics = LampPhysics::default();
        let mut rng = SmallRng::seed_from_u64(17);

        for start_y in [-12.0, -9.0, -5.0, 0.0, 9.0, 12.0] {
            for start_t in [-50.0, 0.0, 50.0, 100.0, 250.0] {
                let mut agent = agent_at(start_y, start_t);
                for tick in 0..2000 {
                    agent.update_temperature(tick, &mut rng, &physics);
                    assert!((0.0..=100.0).contains(&agent.temperature));
                }
            }
        }

        // Extreme pinned noise in both directions
        for value in [-1.0, 1.0] {
            let mut agent = agent_at(-9.0, 99.0);
            for tick in 0..100 {
                agent.update_temperature(tick, &mut ConstantNoise(value), &physics);
                assert!((0.0..=100.0).contains(&agent.temperature));
            }
        }
    }

    #[test]
    fn test_temperature_bands() {
        let physics = LampPhysics::default();
        let mut calm = ConstantNoise(0.0);

        let mut above = agent_at(11.0, 50.0);
        above.update_temperature(1, &mut calm, &physics);
        assert_eq!(above.temperature, 49.0);

        let mut floor = agent_at(-9.0, 50.0);
        floor.update_temperature(1, &mut calm, &physics);
        assert_eq!(floor.temperature, 55.0);

        let mut middle = agent_at(0.0, 50.0);
        middle.update_temperature(1, &mut calm, &physics);
        assert_eq!(middle.temperature, 49.0);

        // Settled lamp on a third tick: no bias left
        let mut settled = agent_at(0.0, 50.0);
        settled.update_temperature(600, &mut calm, &physics);
        assert_eq!(settled.temperature, 50.0);
    }

    #[test]
    fn test_position_confined_with_rest_count() {
        let physics = LampPhysics::default();
        let mut agent = agent_at(14.0, 100.0);
        agent.update_position(&mut ConstantNoise(0.0), &physics);

        // Hot agent keeps pushing up: clamped before and after the move
        assert_eq!(agent.position.y, 10.0);
        assert_eq!(agent.rest, 2);
    }

    #[test]
    fn test_vertical_motion_follows_temperature() {
        let physics = LampPhysics::default();
        let mut calm = ConstantNoise(0.0);

        let mut hot = agent_at(0.0, 80.0);
        hot.update_position(&mut calm, &physics);
        assert!((hot.position.y - 0.3).abs() < 1e-6);

        let mut cold = agent_at(0.0, 20.0);
        cold.update_position(&mut calm, &physics);
        assert!((cold.position.y + 0.3).abs() < 1e-6);

        // Midpoint noise means no horizontal drift
        assert_eq!(hot.position.x, 0.0);
        assert_eq!(hot.position.z, 0.0);
    }

    #[test]
    fn test_drift_scales_with_height() {
        let physics = LampPhysics::default();
        let mut full = ConstantNoise(1.0);

        let mut high = agent_at(5.0, 50.0);
        high.update_position(&mut full, &physics);
        assert!((high.position.x + 0.5).abs() < 1e-5);

        let mut low = agent_at(-6.0, 50.0);
        low.update_position(&mut full, &physics);
        assert!((low.position.x.abs() - 0.6 * 0.75).abs() < 1e-5);

        let mut mid = agent_at(1.0, 50.0);
        mid.update_position(&mut full, &physics);
        assert!((mid.position.x + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_identity_flash() {
        let physics = LampPhysics::default();
        let mut agent = agent_at(5.0, 50.0);
        agent.id = 10;

        agent.update_color(100, 30, &physics);
        assert!((agent.color - hsv_to_rgb(10.0 / 30.0, 1.0, 1.0)).length() < 1e-6);

        agent.update_color(101, 30, &physics);
        assert!((agent.color - hsv_to_rgb(0.5, 1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_frequency_clamped() {
        let physics = LampPhysics::default();
        assert_eq!(frequency_for(0.0, &physics), 200.0);
        assert_eq!(frequency_for(50.0, &physics), 300.0);
        assert_eq!(frequency_for(100.0, &physics), 500.0);
        assert_eq!(frequency_for(1000.0, &physics), 1600.0);
    }

    #[test]
    fn test_radius_monotone_per_side() {
        let physics = LampPhysics::default();

        let mut last = radius_for(0.001, &physics);
        for i in 1..=100 {
            let r = radius_for(i as f32 * 0.1, &physics);
            assert!(r >= last);
            assert!(r <= 7.0);
            last = r;
        }

        let mut last = radius_for(0.0, &physics);
        for i in 1..=100 {
            let r = radius_for(-(i as f32) * 0.1, &physics);
            assert!(r >= last);
            last = r;
        }
        assert!((radius_for(-10.0, &physics) - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_long_calm_run_stays_bounded() {
        let physics = LampPhysics::default();
        let mut agent = agent_at(0.0, 50.0);
        let mut calm = ConstantNoise(0.0);

        for tick in 1..=1000 {
            agent.step(tick, 30, &mut calm, &physics);
            assert!((-10.0..=10.0).contains(&agent.position.y));
            assert!((200.0..=1600.0).contains(&agent.frequency_hz));
        }
    }

    #[test]
    fn test_hot_agent_pins_to_ceiling() {
        let physics = LampPhysics::default();
        let mut agent = agent_at(0.0, 100.0);
        let mut calm = ConstantNoise(0.0);

        for tick in 1..=1000 {
            agent.step(tick, 30, &mut calm, &physics);
        }
        assert!(agent.rest > 0);
        assert!((-10.0..=10.0).contains(&agent.position.y));
    }
}
