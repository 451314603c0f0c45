//! Lavatone library - generative composition and a sonified lava lamp

pub mod audio;
pub mod camera;
pub mod cli;
pub mod error;
pub mod lamp;
pub mod params;
pub mod rendering;
pub mod score;
pub mod synth;

pub use error::{Error, Result};
