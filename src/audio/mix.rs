//! Agent sonification: one sine per agent, mixed by inverse listener distance.

use crate::lamp::State;
use crate::synth::{Frame, Sine};

/// Oscillator bank that follows the agent population
#[derive(Debug, Clone)]
pub struct Sonifier {
    oscillators: Vec<Sine>,
    gains: Vec<f32>,
    sample_rate_hz: f32,
}

impl Sonifier {
    pub fn new(sample_rate_hz: f32) -> Self {
        Self {
            oscillators: Vec::new(),
            gains: Vec::new(),
            sample_rate_hz,
        }
    }

    pub fn voice_count(&self) -> usize {
        self.oscillators.len()
    }

    /// Match oscillator count, pitch and gain to the agents in `state`
    ///
    /// Oscillators keep their phase across retunes so pitch changes don't click.
    pub fn retune(&mut self, state: &State) {
        let count = state.agents.len();
        let sample_rate_hz = self.sample_rate_hz;

        self.oscillators.truncate(count);
        while self.oscillators.len() < count {
            let freq = state.agents[self.oscillators.len()].frequency_hz;
            self.oscillators.push(Sine::new(freq, sample_rate_hz));
        }

        self.gains.clear();
        let norm = count.max(1) as f32;
        for (osc, agent) in self.oscillators.iter_mut().zip(&state.agents) {
            osc.set_freq(agent.frequency_hz);
            self.gains
                .push(1.0 / state.pose.attenuation_distance(agent.position) / norm);
        }
    }

    /// Retune to `state`, then fill `out` with the mix on both channels
    pub fn render(&mut self, state: &State, out: &mut [Frame]) {
        self.retune(state);

        for frame in out.iter_mut() {
            let sample: f32 = self
                .oscillators
                .iter_mut()
                .zip(&self.gains)
                .map(|(osc, gain)| osc.next_sample() * gain)
                .sum();
            *frame = [sample, sample];
        }
    }
}
