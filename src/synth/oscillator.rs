//! Phase-accumulating oscillators and the single-cycle wavetable catalogue.

use std::f32::consts::TAU;
use std::sync::OnceLock;

/// Samples per single-cycle wavetable
pub const TABLE_SIZE: usize = 2048;

/// Normalized phase accumulator (cycles, wraps in [0, 1))
#[derive(Debug, Clone, Copy)]
struct Phasor {
    phase: f32,
    increment: f32,
    freq_hz: f32,
    sample_rate_hz: f32,
}

impl Phasor {
    fn new(freq_hz: f32, sample_rate_hz: f32) -> Self {
        let mut phasor = Self {
            phase: 0.0,
            increment: 0.0,
            freq_hz: 0.0,
            sample_rate_hz,
        };
        phasor.set_freq(freq_hz);
        phasor
    }

    fn set_freq(&mut self, freq_hz: f32) {
        self.freq_hz = freq_hz;
        self.increment = freq_hz / self.sample_rate_hz;
    }

    /// Return the current phase and advance one sample
    fn tick(&mut self) -> f32 {
        let phase = self.phase;
        self.phase += self.increment;
        self.phase -= self.phase.floor();
        phase
    }
}

/// Pure sine oscillator
#[derive(Debug, Clone, Copy)]
pub struct Sine {
    phasor: Phasor,
}

impl Sine {
    pub fn new(freq_hz: f32, sample_rate_hz: f32) -> Self {
        Self {
            phasor: Phasor::new(freq_hz, sample_rate_hz),
        }
    }

    pub fn set_freq(&mut self, freq_hz: f32) {
        self.phasor.set_freq(freq_hz);
    }

    pub fn freq(&self) -> f32 {
        self.phasor.freq_hz
    }

    /// Next sample in [-1, 1]
    pub fn next_sample(&mut self) -> f32 {
        (TAU * self.phasor.tick()).sin()
    }
}

/// Oscillator reading a shared single-cycle table with linear interpolation
#[derive(Debug, Clone, Copy)]
pub struct TableOsc {
    phasor: Phasor,
    table: &'static [f32],
}

impl TableOsc {
    pub fn new(waveform: Waveform, freq_hz: f32, sample_rate_hz: f32) -> Self {
        Self {
            phasor: Phasor::new(freq_hz, sample_rate_hz),
            table: waveform.table(),
        }
    }

    pub fn set_freq(&mut self, freq_hz: f32) {
        self.phasor.set_freq(freq_hz);
    }

    pub fn freq(&self) -> f32 {
        self.phasor.freq_hz
    }

    pub fn next_sample(&mut self) -> f32 {
        let position = self.phasor.tick() * TABLE_SIZE as f32;
        let index = position as usize % TABLE_SIZE;
        let frac = position - position.floor();
        let a = self.table[index];
        let b = self.table[(index + 1) % TABLE_SIZE];
        a + (b - a) * frac
    }
}

/// Single-cycle waveforms built from additive harmonic sums
///
/// Tables are not normalized: richer spectra peak above 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    /// Fundamental only
    #[default]
    Sine,
    /// Harmonics 1-9 at 1/k
    Saw,
    /// Odd harmonics 1-17 at 1/k
    Square,
    /// Harmonics 1-9 at equal weight
    Impulse,
    /// Harmonics 1-8 with a rolled-off top
    Pulse,
    /// Sparse bright spectrum (harmonics 1, 4, 7, 11, 15, 18)
    Bright,
    /// Paired partials 3-15
    Inharmonic,
    /// Bell-like high partials (10 to 135)
    Bell,
    /// Narrow formant band (harmonics 20-27)
    Formant,
}

impl Waveform {
    pub const ALL: [Waveform; 9] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Impulse,
        Waveform::Pulse,
        Waveform::Bright,
        Waveform::Inharmonic,
        Waveform::Bell,
        Waveform::Formant,
    ];

    /// (harmonic number, amplitude) pairs making up the waveform
    pub fn partials(self) -> Vec<(f32, f32)> {
        match self {
            Waveform::Sine => vec![(1.0, 1.0)],
            Waveform::Saw => (1..=9).map(|k| (k as f32, 1.0 / k as f32)).collect(),
            Waveform::Square => (0..9)
                .map(|i| {
                    let k = (2 * i + 1) as f32;
                    (k, 1.0 / k)
                })
                .collect(),
            Waveform::Impulse => (1..=9).map(|k| (k as f32, 1.0)).collect(),
            Waveform::Pulse => [1.0, 1.0, 1.0, 1.0, 0.7, 0.5, 0.3, 0.1]
                .iter()
                .enumerate()
                .map(|(i, &a)| ((i + 1) as f32, a))
                .collect(),
            Waveform::Bright => zip_partials(
                &[1.0, 4.0, 7.0, 11.0, 15.0, 18.0],
                &[1.0, 0.4, 0.65, 0.3, 0.18, 0.08],
            ),
            Waveform::Inharmonic => zip_partials(
                &[3.0, 4.0, 7.0, 8.0, 11.0, 12.0, 15.0],
                &[0.5, 0.8, 0.7, 1.0, 0.3, 0.4, 0.2],
            ),
            Waveform::Bell => zip_partials(
                &[10.0, 27.0, 54.0, 81.0, 108.0, 135.0],
                &[1.0, 0.7, 0.45, 0.3, 0.15, 0.08],
            ),
            Waveform::Formant => [0.2, 0.4, 0.6, 1.0, 0.7, 0.5, 0.3, 0.1]
                .iter()
                .enumerate()
                .map(|(i, &a)| ((i + 20) as f32, a))
                .collect(),
        }
    }

    /// Shared table for this waveform, built on first use
    pub fn table(self) -> &'static [f32] {
        static TABLES: OnceLock<Vec<Vec<f32>>> = OnceLock::new();
        let tables = TABLES.get_or_init(|| {
            Waveform::ALL
                .iter()
                .map(|w| build_table(&w.partials()))
                .collect()
        });
        &tables[self as usize]
    }
}

fn zip_partials(harmonics: &[f32], amps: &[f32]) -> Vec<(f32, f32)> {
    harmonics.iter().copied().zip(amps.iter().copied()).collect()
}

/// Sum sine partials over one cycle
fn build_table(partials: &[(f32, f32)]) -> Vec<f32> {
    (0..TABLE_SIZE)
        .map(|i| {
            let phase = i as f32 / TABLE_SIZE as f32;
            partials
                .iter()
                .map(|&(harmonic, amp)| amp * (TAU * harmonic * phase).sin())
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    #[test]
    fn test_sine_starts_at_zero_and_stays_bounded() {
        let mut osc = Sine::new(440.0, SR);
        assert_eq!(osc.next_sample(), 0.0);
        for _ in 0..1000 {
            let s = osc.next_sample();
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_sine_quarter_period_peak() {
        // 441 Hz at 44.1kHz = 100 samples per cycle, peak at sample 25
        let mut osc = Sine::new(441.0, SR);
        let samples: Vec<f32> = (0..26).map(|_| osc.next_sample()).collect();
        assert!((samples[25] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_sine_table_matches_sine_oscillator() {
        let mut table = TableOsc::new(Waveform::Sine, 441.0, SR);
        let mut sine = Sine::new(441.0, SR);
        for _ in 0..500 {
            assert!((table.next_sample() - sine.next_sample()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_partial_counts() {
        assert_eq!(Waveform::Saw.partials().len(), 9);
        assert_eq!(Waveform::Square.partials().len(), 9);
        assert_eq!(Waveform::Pulse.partials().len(), 8);
        assert_eq!(Waveform::Inharmonic.partials().len(), 7);
        assert_eq!(Waveform::Formant.partials()[0].0, 20.0);

        // Square wave carries only odd harmonics
        assert!(Waveform::Square
            .partials()
            .iter()
            .all(|(k, _)| (*k as u32) % 2 == 1));
    }

    #[test]
    fn test_tables_built_once_per_waveform() {
        for waveform in Waveform::ALL {
            let table = waveform.table();
            assert_eq!(table.len(), TABLE_SIZE);
            assert!(table.iter().all(|s| s.is_finite()));
            assert!(std::ptr::eq(table, waveform.table()));
        }
    }
}
