//! Viewpoint navigation parameters.

/// Keyboard navigation of the listener / camera pose
#[derive(Debug, Clone)]
pub struct NavConfig {
    /// Starting position (meters)
    pub start_position: [f32; 3],

    /// Translation speed while a movement key is held (meters per second)
    pub move_speed_m_per_s: f32,

    /// Rotation speed while a turn key is held (degrees per second)
    pub turn_speed_deg_per_s: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 0.0, 0.0], // Lamp axis, inside the spawn ring
            move_speed_m_per_s: 8.0,
            turn_speed_deg_per_s: 60.0,
        }
    }
}
