//! Composition rendering configuration.

use std::path::PathBuf;

/// Offline composition render settings
#[derive(Debug, Clone)]
pub struct CompositionConfig {
    /// Output WAV path
    pub output_path: PathBuf,

    /// Hard stop for the offline render (seconds)
    /// Rendering ends earlier if every voice has finished
    pub max_duration_s: f32,

    /// RNG seed for the randomized filler passages (None = seeded from the OS)
    pub seed: Option<u64>,

    /// Draw chime filler pitches from 12-TET tables instead of continuous ranges
    pub chimes_on_scale: bool,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("nlm.wav"),
            max_duration_s: 240.0,
            seed: None,
            chimes_on_scale: false,
        }
    }
}
