//! Lava-lamp simulation: agents, canonical state, snapshot hand-off and the
//! simulation thread.

pub mod agent;
pub mod mesh;
pub mod snapshot;
pub mod state;
pub mod system;

pub use agent::{frequency_for, hsv_to_rgb, radius_for, Agent, ConstantNoise, Noise};
pub use mesh::{instances, Instance, SphereMesh, Vertex};
pub use snapshot::{Snapshot, SnapshotBus, SnapshotReader};
pub use state::State;
pub use system::SimulationSystem;
