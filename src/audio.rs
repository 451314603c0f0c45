//! Live sonification of the lava lamp.
//!
//! Every agent drives one sine oscillator tuned to its frequency; the
//! listener is the viewpoint carried in the simulation state, and each
//! oscillator is attenuated by its distance to it.

mod mix;
mod system;

pub use mix::Sonifier;
pub use system::AudioSystem;
