//! Audio engine configuration (sample rate, block size, output limiting).

use crate::error::Error;

/// Audio constants (compile-time, shared by offline and live rendering)
pub mod audio_constants {
    /// Output sample rate (Hz)
    pub const SAMPLE_RATE_HZ: u32 = 44_100;

    /// Audio block size (frames per rendered block)
    /// 256 frames = 5.8ms @ 44.1kHz
    pub const BLOCK_SIZE: usize = 256;

    /// Output channel count (interleaved stereo)
    pub const CHANNELS: u16 = 2;
}

/// Audio engine configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Sample rate (Hz)
    pub sample_rate_hz: f32,

    /// Frames rendered per block
    pub block_size: usize,

    /// Hard clip applied to live output (±, linear gain)
    /// Offline renders are written unclipped as 32-bit float
    pub output_limit: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: audio_constants::SAMPLE_RATE_HZ as f32,
            block_size: audio_constants::BLOCK_SIZE,
            output_limit: 0.5, // Safety limiter for headphones
        }
    }
}

impl AudioConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_rate_hz <= 0.0 {
            return Err(Error::Config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.block_size == 0 {
            return Err(Error::Config("block size must be non-zero".to_string()));
        }
        if self.output_limit <= 0.0 {
            return Err(Error::Config(format!(
                "output limit must be positive, got {}",
                self.output_limit
            )));
        }
        Ok(())
    }

    /// Duration of one block (seconds)
    pub fn block_duration_s(&self) -> f32 {
        self.block_size as f32 / self.sample_rate_hz
    }

    /// Convert a time in seconds to the nearest frame index
    pub fn seconds_to_frames(&self, seconds: f32) -> u64 {
        (seconds.max(0.0) * self.sample_rate_hz).round() as u64
    }

    /// WAV header matching this configuration
    pub fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: audio_constants::CHANNELS,
            sample_rate: self.sample_rate_hz as u32,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AudioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.block_size, 256);
        assert_eq!(config.sample_rate_hz, 44100.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AudioConfig {
            block_size: 0,
            ..AudioConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seconds_to_frames() {
        let config = AudioConfig::default();
        assert_eq!(config.seconds_to_frames(0.0), 0);
        assert_eq!(config.seconds_to_frames(1.0), 44100);
        assert_eq!(config.seconds_to_frames(-3.0), 0); // Negative times start immediately
    }
}
