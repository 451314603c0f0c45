//! Fixed-rate simulation thread, the only writer of the lamp state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::snapshot::{SnapshotBus, SnapshotReader};
use super::state::State;
use crate::camera::SharedPose;
use crate::params::{LampPhysics, SimulationConfig};

/// Simulation thread handle and the bus it publishes to
pub struct SimulationSystem {
    bus: Arc<SnapshotBus>,
    running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SimulationSystem {
    /// Initialise the lamp and start ticking at `config.tick_rate_hz`
    ///
    /// Every tick copies the navigator pose into the state, advances the
    /// agents and publishes a full copy for readers.
    pub fn start(physics: LampPhysics, config: SimulationConfig, pose: SharedPose) -> Self {
        let state = State::init(&physics, **pose.load());
        let bus = Arc::new(SnapshotBus::new(state.clone()));
        let running = Arc::new(AtomicBool::new(true));

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        let thread_bus = Arc::clone(&bus);
        let thread_running = Arc::clone(&running);
        let thread = thread::spawn(move || {
            let mut state = state;
            let dt = config.tick_duration_s();
            let period = Duration::from_secs_f32(dt);
            let mut next = Instant::now() + period;

            info!(
                "Simulation running at {:.0} Hz with {} agents",
                config.tick_rate_hz,
                state.agents.len()
            );

            while thread_running.load(Ordering::Relaxed) {
                state.pose = **pose.load();
                state.simulate(dt, &mut rng, &physics);
                thread_bus.publish(state.clone());

                let now = Instant::now();
                if next > now {
                    thread::sleep(next - now);
                    next += period;
                } else {
                    // Fell behind: drop the missed ticks instead of bursting
                    debug!("Simulation tick {} overran by {:?}", state.n, now - next);
                    next = now + period;
                }
            }

            info!("Simulation stopped after {} ticks", state.n);
        });

        Self {
            bus,
            running,
            thread: Some(thread),
        }
    }

    pub fn bus(&self) -> &Arc<SnapshotBus> {
        &self.bus
    }

    /// New independent reader of the published state
    pub fn reader(&self) -> SnapshotReader {
        self.bus.reader()
    }

    /// Signal the thread to finish and wait for it
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("Simulation thread panicked");
            }
        }
    }
}

impl Drop for SimulationSystem {
    fn drop(&mut self) {
        self.stop();
    }
}
