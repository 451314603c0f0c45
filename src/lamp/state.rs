//! Canonical simulation state: tick counter, viewpoint and agents.

use glam::Vec3;

use super::agent::{Agent, Noise};
use crate::camera::Pose;
use crate::params::{LampPhysics, AGENT_COUNT, START_SCALE_HZ};

/// Notes of the starting scale used to tune the population
const START_SCALE_NOTES: usize = 11;

/// Everything a renderer or the sonification needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    /// Simulation ticks since init
    pub n: u64,

    /// Simulated time since init (seconds)
    pub elapsed_s: f32,

    /// Viewpoint, also the listener position
    pub pose: Pose,

    pub agents: Vec<Agent>,

    /// Static marker above the lamp
    pub blue: Agent,

    /// Static marker below the lamp
    pub red: Agent,
}

impl State {
    /// Fresh lamp: agents on the spawn ring, markers above and below
    pub fn init(physics: &LampPhysics, pose: Pose) -> Self {
        let agents = (0..AGENT_COUNT)
            .map(|i| {
                let freq = START_SCALE_HZ[i % START_SCALE_NOTES] * 2.0;
                Agent::spawn(i, AGENT_COUNT, freq, physics)
            })
            .collect();

        let offset = physics.marker_offset_m;
        Self {
            n: 0,
            elapsed_s: 0.0,
            pose,
            agents,
            blue: Agent::marker(Vec3::new(0.0, offset, 0.0), Vec3::Z, physics.marker_radius_m),
            red: Agent::marker(Vec3::new(0.0, -offset, 0.0), Vec3::X, physics.marker_radius_m),
        }
    }

    /// Advance one tick; agents update on every `update_every_ticks`-th tick
    pub fn simulate(&mut self, dt: f32, noise: &mut impl Noise, physics: &LampPhysics) {
        self.n += 1;
        self.elapsed_s += dt;

        if self.n % physics.update_every_ticks.max(1) != 0 {
            return;
        }

        let count = self.agents.len();
        for agent in &mut self.agents {
            agent.step(self.n, count, noise, physics);
        }
    }

    /// Agents followed by the two markers, in draw order
    pub fn drawables(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().chain([&self.blue, &self.red])
    }
}
