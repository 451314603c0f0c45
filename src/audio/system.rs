//! Live sonification output through cpal, with optional WAV capture.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::sync::{Arc, Mutex};

use super::mix::Sonifier;
use crate::error::{Error, Result};
use crate::lamp::SnapshotReader;
use crate::params::{AudioConfig, RecordingConfig};
use crate::synth::Frame;

type SharedWavWriter = Arc<Mutex<Option<hound::WavWriter<BufWriter<File>>>>>;

/// Audio output stream driven by simulation snapshots
pub struct AudioSystem {
    /// Audio output stream (kept alive)
    stream: Option<cpal::Stream>,

    /// WAV capture, present in recording mode
    wav_writer: SharedWavWriter,

    sample_rate_hz: u32,
}

impl AudioSystem {
    /// Open the default output device and start sonifying
    ///
    /// The callback polls `reader` once per buffer, retunes the oscillator
    /// bank and mixes. When `recording` is set every output frame is also
    /// written to `recording.audio_path()`.
    pub fn new(
        audio_config: AudioConfig,
        mut reader: SnapshotReader,
        recording: Option<&RecordingConfig>,
    ) -> Result<Self> {
        audio_config.validate()?;

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoOutputDevice)?;
        let config = device.default_output_config()?;
        let sample_rate_hz = config.sample_rate().0;
        let channels = config.channels().max(1) as usize;

        info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate_hz,
            channels
        );

        // Capture at the device rate so the file matches what was heard
        let audio_config = AudioConfig {
            sample_rate_hz: sample_rate_hz as f32,
            ..audio_config
        };

        let wav_writer: SharedWavWriter = Arc::new(Mutex::new(None));
        if let Some(recording) = recording {
            std::fs::create_dir_all(&recording.output_dir)?;
            let path = recording.audio_path();
            let writer = hound::WavWriter::create(&path, audio_config.wav_spec())?;
            info!("Recording audio to {}", path.display());
            if let Ok(mut slot) = wav_writer.lock() {
                *slot = Some(writer);
            }
        }

        let mut sonifier = Sonifier::new(audio_config.sample_rate_hz);
        let mut block: Vec<Frame> = vec![[0.0; 2]; audio_config.block_size];
        let limit = audio_config.output_limit;
        let callback_writer = Arc::clone(&wav_writer);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let snapshot = reader.poll();
                let frames_needed = data.len() / channels;
                let mut writer = callback_writer.lock().ok();

                let mut frame_idx = 0;
                while frame_idx < frames_needed {
                    let count = (frames_needed - frame_idx).min(block.len());
                    sonifier.render(snapshot.state(), &mut block[..count]);

                    for (i, frame) in block[..count].iter().enumerate() {
                        // Safety limiter
                        let left = frame[0].clamp(-limit, limit);
                        let right = frame[1].clamp(-limit, limit);

                        let out = &mut data[(frame_idx + i) * channels..][..channels];
                        for (ch, sample) in out.iter_mut().enumerate() {
                            *sample = if ch % 2 == 0 { left } else { right };
                        }

                        if let Some(Some(w)) = writer.as_deref_mut() {
                            let _ = w.write_sample(left);
                            let _ = w.write_sample(right);
                        }
                    }

                    frame_idx += count;
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(Self {
            stream: Some(stream),
            wav_writer,
            sample_rate_hz,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Stop output and finalize the WAV capture, if any
    pub fn finish(&mut self) -> Result<()> {
        // Dropping the stream ends callbacks before the writer is closed
        self.stream = None;

        let writer = match self.wav_writer.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => {
                warn!("WAV writer lock poisoned, capture discarded");
                None
            }
        };
        if let Some(writer) = writer {
            writer.finalize()?;
            info!("Audio capture finalized");
        }
        Ok(())
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            error!("Failed to finalize audio capture: {}", e);
        }
    }
}
