//! The fixed two-part score.
//!
//! Four statements of the A section at rising tempi, overlapping chime
//! layers, a flute interlude over a tremolo bassline, a drone bridge, the
//! rhythmic B section and a closing run of accelerated A melodies.

use rand::Rng;

use super::notes::{
    fill_time, fill_time_with_12tet, sin_q, sin_whole, uniform, AttackRange, Scale12Tet, SIN_Q_AMP,
};
use super::scheduler::EventSink;
use crate::synth::{SineEnvParams, TremoloParams, VoiceSpec, Waveform};

/// Tremolo sweep (start, peak) in Hz
type Rates = (f32, f32);

const RISING: Rates = (4.0, 8.0);
const FALLING: Rates = (8.0, 4.0);

/// Pad chord that opens each A section: (freq, attack adj, decay adj)
const OPENING_CHORD: [(f32, f32, f32); 5] = [
    (600.0, -0.06, 0.0),
    (650.0, -0.03, 0.0),
    (720.0, -0.01, -0.01),
    (780.0, 0.03, -0.03),
    (860.0, 0.05, -0.07),
];

const BASS_CHORD_HZ: [f32; 6] = [13.75, 27.5, 55.0, 110.0, 36.0, 44.0];

/// Chords that close each A section: (freq, attack adj, decay adj)
const CLOSING_CHORDS: [(f32, f32, f32); 15] = [
    (480.0, -1.9, 3.5),
    (520.0, -1.6, 3.0),
    (576.0, -1.4, 2.6),
    (624.0, -1.0, 2.2),
    (688.0, -0.5, 1.6),
    (240.0, -1.9, -0.95),
    (260.0, 0.4, -0.95),
    (288.0, 1.2, -0.95),
    (312.0, 2.0, -0.95),
    (344.0, 2.7, -0.95),
    (70.0, -1.5, -0.9),
    (93.0, -1.3, -0.8),
    (113.0, -1.0, -0.5),
    (136.0, -0.8, -0.7),
    (168.0, -0.5, -0.3),
];

const MELODY_START_HZ: f32 = 220.0;
const MELODY_TURN_HZ: f32 = 247.0;

const FLUTE_MEL: [f32; 12] = [
    0.0, 1046.5, 1174.66, 1318.51, 880.0, 830.61, 880.0, 987.77, 739.99, 659.25, 493.88, 523.25,
];
const FLUTE_MEL_LOW: [f32; 12] = [
    0.0, 523.25, 587.33, 659.255, 440.0, 415.305, 440.0, 493.885, 369.995, 329.625, 246.94,
    261.625,
];
const FLUTE_LEN: [f32; 12] = [1.0, 2.0, 0.5, 0.5, 4.0, 3.0, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0];

const BASSLINE: [f32; 4] = [261.63, 207.65, 196.0, 174.61];

/// One tremolo pair in a slow bass bar: (freq, fixed sustain, sweep)
///
/// A `None` sustain follows the bar's sustain level.
type BassVoicing = (f32, Option<f32>, Rates);

const SLOW_BARS: [&[BassVoicing]; 4] = [
    &[
        (BASSLINE[0], None, RISING),
        (BASSLINE[0] * 0.5, None, RISING),
        (BASSLINE[0] * 0.25, None, RISING),
        (BASSLINE[0] * 0.6667, None, RISING),
    ],
    &[
        (BASSLINE[1], None, FALLING),
        (BASSLINE[1] * 0.25, None, RISING),
        (BASSLINE[1] * 0.8, None, FALLING),
    ],
    &[
        (BASSLINE[2], None, RISING),
        (BASSLINE[2] * 0.75, Some(0.1), RISING),
        (BASSLINE[0] * 0.55, Some(0.1), RISING),
    ],
    &[
        (BASSLINE[3], None, FALLING),
        (BASSLINE[3] * 0.5, None, FALLING),
        (BASSLINE[3] * 0.25, None, FALLING),
        (BASSLINE[0] * 0.6667, None, FALLING),
    ],
];

/// Bar sustain levels for the two passes through the slow bars
const SLOW_BAR_SUSTAIN: [[f32; 4]; 2] = [[0.1, 0.05, 0.05, 0.05], [0.05; 4]];

const INTERLUDE_AMP: f32 = 0.1;
const INTERLUDE_SUSTAIN: f32 = 0.1;

/// One layer of the chime passage
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChimeLayer {
    root_hz: f32,
    edge_amp: f32,
    burst_amps: [f32; 4],
    tail_amp: f32,
}

const LOW_CHIMES: ChimeLayer = ChimeLayer {
    root_hz: 420.0,
    edge_amp: 0.05,
    burst_amps: [0.01, 0.05, 0.05, 0.07],
    tail_amp: 0.05,
};

const HIGH_CHIMES: ChimeLayer = ChimeLayer {
    root_hz: 640.0,
    edge_amp: 0.05,
    burst_amps: [0.05, 0.08, 0.08, 0.07],
    tail_amp: 0.05,
};

const STEADY_FREQ_HZ: (f32, f32) = (200.0, 500.0);
const CHIME_BURST_S: f32 = 2.0;
const CHIME_EDGE_S: f32 = 10.0;

/// Seconds per beat at `tempo` BPM
pub fn beat(tempo: f32) -> f32 {
    60.0 / tempo
}

/// Start times of the score's sections (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOutline {
    /// The four A statements at 60, 120, 180 and 270 BPM
    pub a_sections_s: [f32; 4],
    pub chimes_s: f32,
    pub interlude_s: f32,
    pub bridge_s: f32,
    pub b_section_s: f32,
    pub finale_s: f32,

    /// Latest voice start in the score
    pub last_start_s: f32,

    /// Voices placed
    pub event_count: usize,
}

/// Records the latest start time while forwarding to the real sink
struct Tracking<'a, S: ?Sized> {
    inner: &'a mut S,
    last_start_s: f32,
    count: usize,
}

impl<S: EventSink + ?Sized> EventSink for Tracking<'_, S> {
    fn add(&mut self, start_s: f32, voice: VoiceSpec) {
        self.last_start_s = self.last_start_s.max(start_s);
        self.count += 1;
        self.inner.add(start_s, voice);
    }
}

/// Builder for the fixed score
#[derive(Debug, Clone, Copy, Default)]
pub struct Composition {
    /// Draw chime pitches from 12-TET tables instead of continuous ranges
    pub chimes_on_scale: bool,
}

impl Composition {
    pub fn new(chimes_on_scale: bool) -> Self {
        Self { chimes_on_scale }
    }

    /// Push the whole score into `sink`, drawing randomness from `rng`
    pub fn write<S, R>(&self, sink: &mut S, rng: &mut R) -> ScoreOutline
    where
        S: EventSink + ?Sized,
        R: Rng + ?Sized,
    {
        let mut sink = Tracking {
            inner: sink,
            last_start_s: 0.0,
            count: 0,
        };

        let mut a_sections_s = [0.0; 4];
        let mut time = 0.0;
        for (i, tempo) in [60.0, 120.0, 180.0, 270.0].into_iter().enumerate() {
            if i > 0 {
                time += 3.0;
            }
            a_sections_s[i] = time;
            time = a_section(&mut sink, time, tempo);
        }

        let chimes_s = time;
        let chimes_tail_s = self.chime_layer(&mut sink, rng, chimes_s, &LOW_CHIMES);
        self.chime_layer(&mut sink, rng, chimes_s, &HIGH_CHIMES);
        // Third layer is anchored at the score origin
        self.chime_layer(&mut sink, rng, 0.0, &HIGH_CHIMES);

        let interlude_s = chimes_tail_s + 2.0;
        let drone_hz = interlude(&mut sink, rng, interlude_s);
        let bridge_s = bassline(&mut sink, interlude_s);

        let b_section_s = bridge(&mut sink, bridge_s, drone_hz);
        let finale_s = b_section(&mut sink, rng, b_section_s);
        finale(&mut sink, finale_s);

        ScoreOutline {
            a_sections_s,
            chimes_s,
            interlude_s,
            bridge_s,
            b_section_s,
            finale_s,
            last_start_s: sink.last_start_s,
            event_count: sink.count,
        }
    }

    /// Steady edge, four random bursts, steady tail. Returns the tail start.
    fn chime_layer<S, R>(&self, sink: &mut S, rng: &mut R, start_s: f32, layer: &ChimeLayer) -> f32
    where
        S: EventSink + ?Sized,
        R: Rng + ?Sized,
    {
        let scale = Scale12Tet::build(layer.root_hz);
        let steady = AttackRange::STEADY;

        self.fill(sink, rng, start_s, CHIME_EDGE_S, &steady, STEADY_FREQ_HZ, &scale, layer.edge_amp);

        let mut time = start_s;
        for amp in layer.burst_amps {
            let attacks = AttackRange::random(rng);
            let range = (uniform(rng, 200.0, 500.0), uniform(rng, 500.0, 800.0));
            self.fill(sink, rng, time, CHIME_BURST_S, &attacks, range, &scale, amp);
            time += CHIME_BURST_S;
        }

        self.fill(sink, rng, time, CHIME_EDGE_S, &steady, STEADY_FREQ_HZ, &scale, layer.tail_amp);
        time
    }

    #[allow(clippy::too_many_arguments)]
    fn fill<S, R>(
        &self,
        sink: &mut S,
        rng: &mut R,
        from_s: f32,
        span_s: f32,
        attacks: &AttackRange,
        freq_range_hz: (f32, f32),
        scale: &Scale12Tet,
        amp: f32,
    ) -> usize
    where
        S: EventSink + ?Sized,
        R: Rng + ?Sized,
    {
        let to_s = from_s + span_s;
        if self.chimes_on_scale {
            fill_time_with_12tet(sink, rng, from_s, to_s, attacks, scale, amp)
        } else {
            fill_time(sink, rng, from_s, to_s, attacks, freq_range_hz, amp)
        }
    }
}

fn sine<S: EventSink + ?Sized>(
    sink: &mut S,
    time_s: f32,
    len_s: f32,
    freq_hz: f32,
    amp: f32,
    attack_s: f32,
    decay_s: f32,
) {
    sink.add(
        time_s,
        SineEnvParams {
            duration_s: len_s,
            freq_hz,
            amp,
            attack_s,
            decay_s,
            pan: 0.0,
        }
        .into(),
    );
}

/// Square-wave flute note with the default tremolo sweep
fn flute<S: EventSink + ?Sized>(sink: &mut S, time_s: f32, len_s: f32, freq_hz: f32, attack_s: f32, decay_s: f32) {
    sink.add(
        time_s,
        TremoloParams {
            duration_s: len_s,
            freq_hz,
            amp: INTERLUDE_AMP,
            attack_s,
            decay_s,
            sustain: INTERLUDE_SUSTAIN,
            waveform: Waveform::Square,
            ..TremoloParams::default()
        }
        .into(),
    );
}

/// Sine tremolo note lasting four beats
#[allow(clippy::too_many_arguments)]
fn bass_note<S: EventSink + ?Sized>(
    sink: &mut S,
    time_s: f32,
    dt: f32,
    freq_hz: f32,
    amp: f32,
    attack_s: f32,
    decay_s: f32,
    sustain: f32,
    rates: Rates,
) {
    sink.add(
        time_s,
        TremoloParams {
            duration_s: dt * 4.0,
            freq_hz,
            amp,
            attack_s,
            decay_s,
            sustain,
            rate_start_hz: rates.0,
            rate_peak_hz: rates.1,
            waveform: Waveform::Sine,
            ..TremoloParams::default()
        }
        .into(),
    );
}

/// A plucked note and a slow swell on the same pitch
#[allow(clippy::too_many_arguments)]
fn pluck_and_swell<S: EventSink + ?Sized>(
    sink: &mut S,
    time_s: f32,
    dt: f32,
    freq_hz: f32,
    amp: f32,
    pluck_decay_s: f32,
    sustain: f32,
    rates: Rates,
) {
    bass_note(sink, time_s, dt, freq_hz, amp, dt * 0.05, pluck_decay_s, sustain, rates);
    bass_note(sink, time_s, dt, freq_hz, amp, dt * 3.0, dt * 0.05, sustain, rates);
}

/// Sixteen-note arpeggio: repeated root, rising thirds, then a falling line
///
/// Returns the end time and the final pitch so runs can be chained.
fn melody_run<S: EventSink + ?Sized>(sink: &mut S, start_s: f32, dt: f32, freq_hz: f32) -> (f32, f32) {
    let mut time = start_s + dt * 0.5;
    let mut freq = freq_hz;

    for _ in 0..4 {
        sin_q(sink, time, freq, dt, SIN_Q_AMP);
        time += dt;
    }
    for _ in 0..8 {
        sin_q(sink, time, freq, dt, SIN_Q_AMP);
        time += dt;
        freq *= 1.25;
    }

    // The descending answer overlaps the rising line
    freq = MELODY_TURN_HZ;
    time = start_s + dt * 6.75;
    for _ in 0..4 {
        sin_q(sink, time, freq, dt, SIN_Q_AMP);
        time += dt;
        freq *= 2.0 * 0.667;
    }
    for _ in 0..6 {
        sin_q(sink, time, freq, dt, SIN_Q_AMP);
        time += dt;
        freq *= 0.667;
    }

    (time - dt * 0.5, freq)
}

/// Opening chord, bass chord, melody at double tempo, closing chords
fn a_section<S: EventSink + ?Sized>(sink: &mut S, start_s: f32, tempo: f32) -> f32 {
    let dt = beat(tempo);
    for (freq, attack_adj, decay_adj) in OPENING_CHORD {
        sin_whole(sink, start_s, freq, dt * 5.0, attack_adj, decay_adj, dt);
    }

    let time = start_s + dt * 4.0;
    for freq in BASS_CHORD_HZ {
        sin_whole(sink, time, freq, dt * 5.0, 0.0, 0.0, dt);
    }

    let dt = beat(tempo * 2.0);
    let (time, _) = melody_run(sink, time, dt, MELODY_START_HZ);
    for (freq, attack_adj, decay_adj) in CLOSING_CHORDS {
        sin_whole(sink, time, freq, dt * 8.0, attack_adj, decay_adj, dt);
    }
    time
}

/// Flute melody in three tempi with a sine counterline
///
/// Returns the pitch of the last note, which seeds the bridge drone.
fn interlude<S, R>(sink: &mut S, rng: &mut R, start_s: f32) -> f32
where
    S: EventSink + ?Sized,
    R: Rng + ?Sized,
{
    let mut time = start_s;

    let dt = beat(90.0);
    for (i, beats) in FLUTE_LEN.iter().enumerate() {
        let len = dt * beats;
        match i {
            5 => flute(sink, time, dt * 4.0, FLUTE_MEL[5], len * 0.1, len * 0.2),
            8 => flute(sink, time, dt * 4.0, FLUTE_MEL[8], len * 0.1, len * 0.15),
            _ => {}
        }
        if !matches!(i, 6 | 7 | 9..=11) {
            flute(sink, time, len, FLUTE_MEL[i], len * 0.1, len * 0.1);
        }
        time += len;
    }

    let dt = beat(80.0);
    for (i, beats) in FLUTE_LEN.iter().enumerate() {
        let len = dt * beats;
        flute(sink, time, len, FLUTE_MEL[i], len * 0.12, len * 0.15);
        flute(sink, time, len, FLUTE_MEL_LOW[i], len * 0.12, len * 0.15);
        time += len;
    }

    // Sine counterline over the last flute pass
    let mut counter = time;
    for i in 0..15 {
        sine(sink, counter, 0.5, FLUTE_MEL[i % 6] + 1.0, 0.1, 0.03, 0.03);
        counter += 0.5;
    }
    for i in 0..15 {
        let freq = FLUTE_MEL[rng.random_range(1..7)] + 1.0;
        sine(sink, counter, 0.5, freq, 0.15, 0.03, 0.03);
        sine(sink, counter, 0.5, FLUTE_MEL[i % 6] + 1.0, 0.15, 0.03, 0.03);
        counter += 0.5;
    }
    counter += 0.25;
    for i in 0..7 {
        let amp = uniform(rng, 0.15, 0.22);
        sine(sink, counter, 0.5, FLUTE_MEL[i % 6] + 1.0, amp, 0.03, 0.03);
        counter += 0.5;
    }

    let dt = beat(60.0);
    for (i, beats) in FLUTE_LEN.iter().enumerate() {
        let len = dt * beats;
        flute(sink, time, len, FLUTE_MEL[i], len * 0.1 - 0.05, len * 0.3);
        flute(sink, time, len, FLUTE_MEL_LOW[i], len * 0.1 - 0.05, len * 0.3);
        time += len;
    }

    let mut freq = 0.0;
    for _ in 0..15 {
        freq = FLUTE_MEL[rng.random_range(1..7)] + 1.0;
        let len = uniform(rng, 0.3, 1.4);
        let amp = uniform(rng, 0.15, 0.22);
        sin_q(sink, time, freq, len, amp);
        time += len;
    }
    freq
}

/// Tremolo bassline under the interlude. Returns its end time.
fn bassline<S: EventSink + ?Sized>(sink: &mut S, start_s: f32) -> f32 {
    let mut time = start_s;

    let dt = beat(90.0);
    for freq in BASSLINE {
        pluck_and_swell(sink, time, dt, freq, 0.3, dt * 0.5, 0.1, RISING);
        time += dt * 4.0;
    }

    let dt = beat(80.0);
    for freq in BASSLINE {
        pluck_and_swell(sink, time, dt, freq, INTERLUDE_AMP, dt * 0.5, 0.1, RISING);
        pluck_and_swell(sink, time, dt, freq * 0.5, INTERLUDE_AMP, 0.5, 0.1, RISING);
        time += dt * 4.0;
    }

    let dt = beat(60.0);
    for sustains in SLOW_BAR_SUSTAIN {
        for (bar, bar_sustain) in SLOW_BARS.iter().zip(sustains) {
            for &(freq, sustain, rates) in bar.iter() {
                let sustain = sustain.unwrap_or(bar_sustain);
                pluck_and_swell(sink, time, dt, freq, INTERLUDE_AMP, dt * 0.5, sustain, rates);
            }
            time += dt * 4.0;
        }
    }
    time
}

/// Three audio-rate tremolo drones followed by three glides
///
/// Glide pitches are `glide_hz` times each ratio; the middle glide sweeps
/// its tremolo over the full note and sits right of centre.
fn drones_and_glides<S: EventSink + ?Sized>(
    sink: &mut S,
    start_s: f32,
    drone_hz: f32,
    glide_hz: f32,
    glide_ratios: [f32; 3],
) {
    let drone = TremoloParams {
        duration_s: 4.0,
        freq_hz: drone_hz,
        amp: 0.3,
        attack_s: 0.2,
        decay_s: 1.0,
        sustain: 0.1,
        depth: 0.4,
        rate_start_hz: 80.0,
        rate_peak_hz: 80_000.0,
        rise: 0.5,
        waveform: Waveform::Sine,
        pan: 0.0,
    };
    for offset in [0.0, 3.4, 4.3] {
        sink.add(start_s + offset, drone.clone().into());
    }

    let glide = TremoloParams {
        duration_s: 7.0,
        rise: 0.0,
        ..drone
    };
    for (i, (offset, ratio)) in [8.0, 10.4, 14.6].into_iter().zip(glide_ratios).enumerate() {
        let mut params = TremoloParams {
            freq_hz: glide_hz * ratio,
            ..glide.clone()
        };
        if i == 1 {
            params.rise = 1.0;
            params.pan = 0.6;
        }
        sink.add(start_s + offset, params.into());
    }
}

/// Drone bridge between the two halves. Returns the B section start.
fn bridge<S: EventSink + ?Sized>(sink: &mut S, start_s: f32, drone_hz: f32) -> f32 {
    // The middle glide is pitched at 0 Hz and only contributes its tremolo bed
    drones_and_glides(sink, start_s, drone_hz, 512.0, [1.0, 0.0, 1.0]);
    start_s + 15.0
}

/// Swelling sine cluster: ten groups of five notes spaced `step_s` apart
///
/// The first note of group `i` plays at `lead_amp - i * fade` and the other
/// four at `amp - i * fade`; levels may go negative.
#[allow(clippy::too_many_arguments)]
fn shimmer<S, R>(
    sink: &mut S,
    rng: &mut R,
    start_s: f32,
    step_s: f32,
    freq_hz: f32,
    lead_amp: f32,
    amp: f32,
    fade: f32,
) -> f32
where
    S: EventSink + ?Sized,
    R: Rng + ?Sized,
{
    let mut time = start_s;
    for i in 0..10 {
        let len = uniform(rng, 1.5, 2.4);
        let drop = i as f32 * fade;
        for n in 0..5 {
            let level = (if n == 0 { lead_amp } else { amp }) - drop;
            sine(sink, time, len, freq_hz, level, 0.5, 0.98);
            time += step_s;
        }
    }
    time
}

/// Triplet pulse, dotted rhythm, slowing arpeggios and shimmering drones
///
/// Returns the start of the last shimmer, where the finale begins.
fn b_section<S, R>(sink: &mut S, rng: &mut R, start_s: f32) -> f32
where
    S: EventSink + ?Sized,
    R: Rng + ?Sized,
{
    let dt = beat(163.0);
    let dt3 = dt / 3.0;
    let dt4 = dt * 0.25;

    let mut pulse = start_s;
    for _ in 0..24 {
        for amp in [SIN_Q_AMP, 0.1, 0.1] {
            sin_q(sink, pulse, 210.0, dt3, amp);
            pulse += dt3;
        }
    }

    let mut dotted = start_s + dt3 * 6.0;
    let mut arpeggio = dotted + dt4 * 4.0;
    for _ in 0..20 {
        sin_q(sink, dotted, 262.5, dt4 * 3.0, SIN_Q_AMP);
        dotted += dt4 * 3.0;
        sin_q(sink, dotted, 210.0, dt4, 0.1);
        dotted += dt4;
    }

    let mut tempo = 84.0;
    for i in 0..9 {
        tempo -= 3.0;
        let dt3 = beat(tempo) / 3.0;
        let steps = if i % 3 == 2 {
            [1.3334, 1.083335, 0.87]
        } else {
            [1.5, 1.25, 1.0]
        };
        for (step, amp) in steps.into_iter().zip([0.3, 0.15, 0.07]) {
            sin_q(sink, arpeggio, 420.0 * step, dt3, amp);
            arpeggio += dt3;
        }
    }

    let dt3 = beat(tempo) / 3.0;
    let mut time = arpeggio - dt3;
    sin_q(sink, time, 210.0, dt3 * 5.0, SIN_Q_AMP);
    sin_q(sink, time, 262.5, dt3 * 5.0, SIN_Q_AMP);

    let shimmer_origin = time;
    drones_and_glides(sink, shimmer_origin, 420.0, 620.0, [1.0, 0.667, 0.75]);

    let dt5 = beat(59.0) * 0.2;
    let mut freq = 620.0;
    shimmer(sink, rng, time, dt5, freq, 0.1, 0.1, 0.0);

    freq *= 2.0 * 0.66667;
    shimmer(sink, rng, shimmer_origin + dt5 * 6.0, dt5, freq, 0.1, 0.05, 0.01);

    let finale_s = shimmer_origin + dt5 * 16.0;
    freq *= 2.0 * 0.66667;
    time = shimmer(sink, rng, finale_s, dt5, freq, 0.1, 0.05, 0.01);

    let mut pulse = time;
    for _ in 0..24 {
        for amp in [0.05, 0.2, 0.1] {
            sin_q(sink, pulse, 420.0, dt3, amp);
            pulse += dt3;
        }
    }
    for _ in 0..24 {
        for (freq, amp) in [(350.07, 0.07), (420.0, 0.12), (367.5, 0.06)] {
            sin_q(sink, time, freq, dt3 * 2.0, amp);
            time += dt3 * 2.0;
        }
    }

    finale_s
}

/// Four chained A melodies at 540 BPM. Returns the end time.
fn finale<S: EventSink + ?Sized>(sink: &mut S, start_s: f32) -> f32 {
    let dt = beat(540.0);
    let mut time = start_s;
    let mut freq = MELODY_START_HZ;
    for _ in 0..4 {
        (time, freq) = melody_run(sink, time, dt, freq);
    }
    time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::scheduler::Event;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn write_score(seed: u64, chimes_on_scale: bool) -> (Vec<Event>, ScoreOutline) {
        let mut events: Vec<Event> = Vec::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        let outline = Composition::new(chimes_on_scale).write(&mut events, &mut rng);
        (events, outline)
    }

    #[test]
    fn test_same_seed_same_score() {
        let (a, _) = write_score(42, false);
        let (b, _) = write_score(42, false);
        let (c, _) = write_score(43, false);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sections_in_order() {
        let (events, outline) = write_score(1, false);
        let [a1, a2, a3, a4] = outline.a_sections_s;

        assert_eq!(a1, 0.0);
        assert!(a1 < a2 && a2 < a3 && a3 < a4);
        assert!(a4 < outline.chimes_s);
        assert!(outline.chimes_s < outline.interlude_s);
        assert!(outline.interlude_s < outline.bridge_s);
        assert!(outline.bridge_s < outline.b_section_s);
        assert!(outline.b_section_s < outline.finale_s);

        assert_eq!(outline.event_count, events.len());
        assert!(events.iter().all(|e| e.start_s >= 0.0));
        assert!(outline.last_start_s < 240.0);
    }

    #[test]
    fn test_first_a_section_timing() {
        let mut events: Vec<Event> = Vec::new();
        let end = a_section(&mut events, 0.0, 60.0);

        // 4 beats of chord, then 16.25 half-beats of melody
        assert!((end - (4.0 + 16.25 * 0.5)).abs() < 1e-4);
        assert_eq!(events.len(), 5 + 6 + 22 + 15);

        let VoiceSpec::Sine(first) = &events[0].voice else {
            panic!("pad tones are sine voices");
        };
        assert_eq!(first.freq_hz, 600.0);
        assert_eq!(first.duration_s, 5.0);
        assert!((first.attack_s - 1.19).abs() < 1e-5);
    }

    #[test]
    fn test_melody_run_chains() {
        let mut events: Vec<Event> = Vec::new();
        let (end, freq) = melody_run(&mut events, 1.0, 0.5, 220.0);

        assert!((end - (1.0 + 16.25 * 0.5)).abs() < 1e-4);
        let expected = 247.0 * (2.0f32 * 0.667).powi(4) * 0.667f32.powi(6);
        assert!((freq - expected).abs() < 1e-2);

        // Rising line tops out at 220 * 1.25^7
        let top = events
            .iter()
            .map(|e| e.voice.freq_hz())
            .fold(0.0f32, f32::max);
        assert!((top - 220.0 * 1.25f32.powi(7)).abs() < 1e-2);
    }

    #[test]
    fn test_chime_scale_draws_from_tables() {
        let (events, _) = write_score(9, true);
        let low = Scale12Tet::build(LOW_CHIMES.root_hz);
        let high = Scale12Tet::build(HIGH_CHIMES.root_hz);

        let chimes: Vec<f32> = events
            .iter()
            .filter_map(|e| match &e.voice {
                VoiceSpec::Additive(p) => Some(p.freq_hz),
                _ => None,
            })
            .collect();

        assert!(!chimes.is_empty());
        assert!(chimes.iter().all(|f| low.contains(*f) || high.contains(*f)));
    }

    #[test]
    fn test_third_chime_layer_starts_at_origin() {
        let (events, outline) = write_score(5, false);
        let early_chimes = events
            .iter()
            .filter(|e| matches!(e.voice, VoiceSpec::Additive(_)) && e.start_s < outline.a_sections_s[1])
            .count();
        assert!(early_chimes > 0);
    }

    #[test]
    fn test_bridge_keeps_silent_glide() {
        let mut events: Vec<Event> = Vec::new();
        let end = bridge(&mut events, 10.0, 523.25);

        assert_eq!(end, 25.0);
        assert_eq!(events.len(), 6);
        let VoiceSpec::Tremolo(middle) = &events[4].voice else {
            panic!("bridge voices are tremolo voices");
        };
        assert_eq!(middle.freq_hz, 0.0);
        assert_eq!(middle.rise, 1.0);
        assert_eq!(middle.pan, 0.6);
        assert!((events[4].start_s - 20.4).abs() < 1e-4);
    }

    #[test]
    fn test_bassline_length() {
        let mut events: Vec<Event> = Vec::new();
        let end = bassline(&mut events, 0.0);

        let expected = 4.0 * beat(90.0) * 4.0 + 4.0 * beat(80.0) * 4.0 + 8.0 * 4.0;
        assert!((end - expected).abs() < 1e-3);
        assert!(events.iter().all(|e| matches!(e.voice, VoiceSpec::Tremolo(_))));
    }

    #[test]
    fn test_shimmer_fades_through_zero() {
        let mut events: Vec<Event> = Vec::new();
        let mut rng = SmallRng::seed_from_u64(2);
        shimmer(&mut events, &mut rng, 0.0, 0.2, 826.0, 0.1, 0.05, 0.01);

        assert_eq!(events.len(), 50);
        let last_amp = match &events[49].voice {
            VoiceSpec::Sine(p) => p.amp,
            _ => panic!("shimmer notes are sine voices"),
        };
        assert!((last_amp - (0.05 - 0.09)).abs() < 1e-6);
    }
}
