//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::params::{CompositionConfig, RecordingConfig, SimulationConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "lavatone")]
#[command(about = "Generative composition renderer and sonified lava lamp", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Render the fixed composition offline to a WAV file
    Compose {
        /// Output WAV path
        #[arg(long, value_name = "PATH", default_value = "nlm.wav")]
        output: PathBuf,

        /// Stop rendering after this many seconds
        #[arg(long, value_name = "SECONDS", default_value = "240")]
        max_duration: f32,

        /// Seed for the randomized passages
        #[arg(long)]
        seed: Option<u64>,

        /// Draw chime pitches from 12-TET tables instead of continuous ranges
        #[arg(long)]
        chime_scale: bool,
    },

    /// Open the interactive lava-lamp visualization
    Lamp {
        /// Seed for the agent noise
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation tick rate (Hz)
        #[arg(long, value_name = "HZ", default_value = "60")]
        sim_rate: f32,

        /// Record frames and audio (duration in seconds)
        #[arg(long, value_name = "SECONDS")]
        record: Option<f32>,

        /// Disable live sonification
        #[arg(long)]
        mute: bool,
    },
}

impl Command {
    /// Offline render settings, for the compose subcommand
    pub fn composition_config(&self) -> Option<CompositionConfig> {
        match self {
            Command::Compose {
                output,
                max_duration,
                seed,
                chime_scale,
            } => Some(CompositionConfig {
                output_path: output.clone(),
                max_duration_s: *max_duration,
                seed: *seed,
                chimes_on_scale: *chime_scale,
            }),
            Command::Lamp { .. } => None,
        }
    }

    /// Simulation timing, for the lamp subcommand
    pub fn simulation_config(&self) -> Option<SimulationConfig> {
        match self {
            Command::Lamp { seed, sim_rate, .. } => Some(SimulationConfig {
                tick_rate_hz: *sim_rate,
                seed: *seed,
            }),
            Command::Compose { .. } => None,
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        match self {
            Command::Lamp {
                record: Some(duration),
                ..
            } => Some(RecordingConfig::new(*duration)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_defaults() {
        let args = Args::try_parse_from(["lavatone", "compose"]).unwrap();
        let config = args.command.composition_config().unwrap();

        assert_eq!(config.output_path, PathBuf::from("nlm.wav"));
        assert_eq!(config.max_duration_s, 240.0);
        assert_eq!(config.seed, None);
        assert!(!config.chimes_on_scale);
        assert!(args.command.simulation_config().is_none());
    }

    #[test]
    fn test_compose_overrides() {
        let args = Args::try_parse_from([
            "lavatone",
            "compose",
            "--output",
            "out.wav",
            "--max-duration",
            "30",
            "--seed",
            "7",
            "--chime-scale",
        ])
        .unwrap();
        let config = args.command.composition_config().unwrap();

        assert_eq!(config.output_path, PathBuf::from("out.wav"));
        assert_eq!(config.max_duration_s, 30.0);
        assert_eq!(config.seed, Some(7));
        assert!(config.chimes_on_scale);
    }

    #[test]
    fn test_lamp_options() {
        let args = Args::try_parse_from([
            "lavatone", "lamp", "--seed", "3", "--sim-rate", "120", "--record", "2.5", "--mute",
        ])
        .unwrap();

        let sim = args.command.simulation_config().unwrap();
        assert_eq!(sim.tick_rate_hz, 120.0);
        assert_eq!(sim.seed, Some(3));

        let recording = args.command.recording_config().unwrap();
        assert_eq!(recording.total_frames(), 150);
        assert!(matches!(args.command, Command::Lamp { mute: true, .. }));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["lavatone"]).is_err());
        assert!(Args::try_parse_from(["lavatone", "lamp", "--record"]).is_err());
    }
}
