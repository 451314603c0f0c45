//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (meters, seconds, Hz, etc.)
//! - Documented ranges and meanings
//! - Type safety where possible

mod audio;
mod camera;
mod lamp;
mod render;
mod score;

// Re-export all types
pub use audio::{audio_constants, AudioConfig};
pub use camera::NavConfig;
pub use lamp::{LampPhysics, SimulationConfig, AGENT_COUNT, START_SCALE_HZ};
pub use render::{RecordingConfig, RenderConfig};
pub use score::CompositionConfig;
