//! Composition side: note helpers, the fixed score and the voice scheduler.

pub mod composition;
pub mod notes;
pub mod scheduler;

use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::params::{AudioConfig, CompositionConfig};

pub use composition::{beat, Composition, ScoreOutline};
pub use notes::{
    fill_time, fill_time_with_12tet, sin_q, sin_whole, AttackRange, Scale12Tet, SIN_Q_AMP,
    SIN_WHOLE_AMP,
};
pub use scheduler::{Event, EventSink, RenderSummary, Scheduler};

/// Write the composition into a fresh scheduler and render it to disk
pub fn render_composition(config: &CompositionConfig) -> Result<(ScoreOutline, RenderSummary)> {
    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let mut scheduler = Scheduler::new(AudioConfig::default());
    let outline = Composition::new(config.chimes_on_scale).write(&mut scheduler, &mut rng);
    info!(
        "Score: {} events, last entry at {:.1}s",
        outline.event_count, outline.last_start_s
    );

    let summary = scheduler.record_nrt(&config.output_path, config.max_duration_s)?;
    Ok((outline, summary))
}
