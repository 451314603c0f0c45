//! Lava-lamp agent physics parameters.

/// Agent population size
pub const AGENT_COUNT: usize = 30;

/// Semitone table (Hz) used to tune the initial population, one octave up from C3
pub const START_SCALE_HZ: [f32; 12] = [
    130.8, 138.6, 146.8, 155.6, 164.8, 174.6, 185.0, 195.0, 207.7, 220.0, 233.1, 246.9,
];

/// Lava-lamp simulation parameters
#[derive(Debug, Clone)]
pub struct LampPhysics {
    /// Agents are updated on every n-th simulation tick
    pub update_every_ticks: u64,

    /// Vertical extent of the lamp (meters, ±)
    pub max_height_m: f32,

    /// Radius of a freshly spawned agent (meters)
    pub start_radius_m: f32,

    /// Radius cap for agents above the midline (meters)
    pub max_radius_m: f32,

    /// Radial growth rate above the midline (meters per meter²)
    pub upper_growth: f32,

    /// Radial growth rate below the midline (meters per meter²)
    pub lower_growth: f32,

    /// Initial temperature (same scale as `temperature_range`)
    pub start_temperature: f32,

    /// Temperature at which an agent neither rises nor sinks
    pub neutral_temperature: f32,

    /// Temperature bounds (min, max)
    pub temperature_range: (f32, f32),

    /// Distance of the spawn ring from the lamp axis (meters)
    pub start_ring_radius_m: f32,

    /// Horizontal drift scale (meters per update, per meter of height when far from center)
    pub horizontal_drift: f32,

    /// Vertical speed per degree away from neutral (meters per update)
    pub vertical_damping: f32,

    /// Frequency = temperature * slope + offset (Hz)
    pub frequency_slope_hz: f32,
    pub frequency_offset_hz: f32,

    /// Sonification frequency bounds (Hz)
    pub frequency_range_hz: (f32, f32),

    /// Ticks between identity color flashes
    pub flash_every_ticks: u64,

    /// Tick after which the neutral-band cooling is relaxed on every third tick
    pub settle_tick: u64,

    /// Vertical offset of the blue (top) and red (bottom) marker spheres (meters)
    pub marker_offset_m: f32,

    /// Marker sphere radius (meters)
    pub marker_radius_m: f32,
}

impl Default for LampPhysics {
    fn default() -> Self {
        Self {
            update_every_ticks: 5,
            max_height_m: 10.0,
            start_radius_m: 0.5,
            max_radius_m: 7.0,
            upper_growth: 0.1,
            lower_growth: 0.01, // Sinking blobs stay small
            start_temperature: 50.0,
            neutral_temperature: 50.0,
            temperature_range: (0.0, 100.0),
            start_ring_radius_m: 10.0,
            horizontal_drift: 0.1,
            vertical_damping: 0.01,
            frequency_slope_hz: 4.0,
            frequency_offset_hz: 100.0,
            frequency_range_hz: (200.0, 1600.0),
            flash_every_ticks: 100,
            settle_tick: 500,
            marker_offset_m: 60.0,
            marker_radius_m: 50.0,
        }
    }
}

/// Simulation loop timing
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Simulation tick rate (Hz)
    pub tick_rate_hz: f32,

    /// RNG seed for agent noise (None = seeded from the OS)
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Duration of one simulation tick (seconds)
    pub fn tick_duration_s(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1.0)
    }
}
