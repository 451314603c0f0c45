//! Time-ordered voice scheduler with block mixing and offline WAV rendering.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::params::AudioConfig;
use crate::synth::{Frame, Voice, VoiceSpec, VoiceStatus};

/// A voice request at a start time (seconds from the score origin)
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub start_s: f32,
    pub voice: VoiceSpec,
}

/// Anything that accepts voice requests
pub trait EventSink {
    fn add(&mut self, start_s: f32, voice: VoiceSpec);
}

/// Collect events without rendering (score inspection, tests)
impl EventSink for Vec<Event> {
    fn add(&mut self, start_s: f32, voice: VoiceSpec) {
        self.push(Event { start_s, voice });
    }
}

/// Queued event ordered by start frame, then insertion order
struct Pending {
    start_frame: u64,
    seq: u64,
    voice: VoiceSpec,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.start_frame == other.start_frame && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .start_frame
            .cmp(&self.start_frame)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct ActiveVoice {
    voice: Box<dyn Voice>,
    /// Frame offset into the current block (non-zero only in the start block)
    offset: usize,
}

/// Summary of an offline render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    /// Frames written to disk
    pub frames: u64,

    /// Rendered length (seconds)
    pub duration_s: f32,

    /// Largest absolute sample value
    pub peak: f32,

    /// Voices started during the render
    pub voices_started: u64,

    /// True when rendering stopped at the duration cap with work left
    pub truncated: bool,
}

/// Owns every pending and sounding voice and mixes them block by block
pub struct Scheduler {
    config: AudioConfig,
    pending: BinaryHeap<Pending>,
    active: Vec<ActiveVoice>,
    cursor_frames: u64,
    next_seq: u64,
    voices_started: u64,
}

impl Scheduler {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            pending: BinaryHeap::new(),
            active: Vec::new(),
            cursor_frames: 0,
            next_seq: 0,
            voices_started: 0,
        }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Voices waiting for their start time
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Voices currently sounding
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// True when nothing is queued or sounding
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    /// Current render position (seconds)
    pub fn now_s(&self) -> f32 {
        self.cursor_frames as f32 / self.config.sample_rate_hz
    }

    /// Start time of the latest queued event (seconds)
    pub fn last_start_s(&self) -> Option<f32> {
        self.pending
            .iter()
            .map(|p| p.start_frame)
            .max()
            .map(|f| f as f32 / self.config.sample_rate_hz)
    }

    /// Mix the next block into `out` (cleared first)
    ///
    /// Voices whose start falls inside the block begin at the exact frame;
    /// events scheduled in the past start at the top of the block.
    pub fn render_block(&mut self, out: &mut [Frame]) {
        out.fill([0.0, 0.0]);

        let block_start = self.cursor_frames;
        let block_end = block_start + out.len() as u64;

        while self
            .pending
            .peek()
            .is_some_and(|p| p.start_frame < block_end)
        {
            let Some(event) = self.pending.pop() else {
                break;
            };
            let offset = event.start_frame.saturating_sub(block_start) as usize;
            self.active.push(ActiveVoice {
                voice: event.voice.build(self.config.sample_rate_hz),
                offset,
            });
            self.voices_started += 1;
        }

        self.active.retain_mut(|active| {
            let status = active.voice.render(&mut out[active.offset..]);
            active.offset = 0;
            status == VoiceStatus::Active
        });

        self.cursor_frames = block_end;
    }

    /// Render the whole schedule offline to a 32-bit float stereo WAV file
    ///
    /// Stops once every voice has finished or `max_duration_s` is reached,
    /// whichever comes first.
    pub fn record_nrt(
        &mut self,
        path: impl AsRef<Path>,
        max_duration_s: f32,
    ) -> Result<RenderSummary> {
        let path = path.as_ref();
        let mut writer = hound::WavWriter::create(path, self.config.wav_spec())?;

        let max_frames = self.config.seconds_to_frames(max_duration_s);
        let mut block = vec![[0.0f32; 2]; self.config.block_size];
        let start_frame = self.cursor_frames;
        let started_before = self.voices_started;
        let mut peak = 0.0f32;

        info!(
            "Rendering {} events to {} (max {:.0}s)",
            self.pending.len(),
            path.display(),
            max_duration_s
        );

        let report_every = self.config.seconds_to_frames(10.0).max(1);
        let mut next_report = report_every;

        while !self.is_idle() {
            let written = self.cursor_frames - start_frame;
            if written >= max_frames {
                break;
            }
            let frames = (max_frames - written).min(block.len() as u64) as usize;
            let block = &mut block[..frames];

            self.render_block(block);

            for [left, right] in block.iter() {
                peak = peak.max(left.abs()).max(right.abs());
                writer.write_sample(*left)?;
                writer.write_sample(*right)?;
            }

            if written + frames as u64 >= next_report {
                debug!(
                    "{:.0}s rendered, {} active, {} pending",
                    self.now_s(),
                    self.active.len(),
                    self.pending.len()
                );
                next_report += report_every;
            }
        }

        writer.finalize()?;

        let frames = self.cursor_frames - start_frame;
        let summary = RenderSummary {
            frames,
            duration_s: frames as f32 / self.config.sample_rate_hz,
            peak,
            voices_started: self.voices_started - started_before,
            truncated: !self.is_idle(),
        };

        info!(
            "Rendered {:.1}s ({} voices, peak {:.3}){}",
            summary.duration_s,
            summary.voices_started,
            summary.peak,
            if summary.truncated {
                ", stopped at duration cap"
            } else {
                ""
            }
        );

        Ok(summary)
    }
}

impl EventSink for Scheduler {
    fn add(&mut self, start_s: f32, voice: VoiceSpec) {
        let start_frame = self.config.seconds_to_frames(start_s);
        self.pending.push(Pending {
            start_frame,
            seq: self.next_seq,
            voice,
        });
        self.next_seq += 1;
    }
}
