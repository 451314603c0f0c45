//! Viewpoint pose, keyboard navigation and the view-projection matrix.
//!
//! The navigator runs on the window thread and publishes its pose; the
//! simulation copies it into the shared state so renderer and sonification
//! see the same listener position.

use std::sync::Arc;

use arc_swap::ArcSwap;
use glam::{Mat4, Quat, Vec3};
use winit::keyboard::KeyCode;

use crate::params::{NavConfig, RenderConfig};

/// Position and orientation of the viewer (also the listener)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Viewing direction (-Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Distance to a point, floored at 1 so nearby sources never blow up
    pub fn attenuation_distance(&self, point: Vec3) -> f32 {
        self.position.distance(point).max(1.0)
    }
}

/// Latest navigator pose, readable from any thread
pub type SharedPose = Arc<ArcSwap<Pose>>;

pub fn shared_pose(pose: Pose) -> SharedPose {
    Arc::new(ArcSwap::from_pointee(pose))
}

/// Movement intent from held keys, each axis in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Intent {
    forward: f32,
    strafe: f32,
    lift: f32,
    yaw: f32,
}

/// Keyboard fly-through navigation
#[derive(Debug, Clone)]
pub struct Navigator {
    config: NavConfig,
    pose: Pose,
    held: Vec<KeyCode>,
}

impl Navigator {
    pub fn new(config: NavConfig) -> Self {
        let pose = Pose::at(Vec3::from_array(config.start_position));
        Self {
            config,
            pose,
            held: Vec::new(),
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Track a key press or release. Returns true when the key steers navigation.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        if Self::axis_of(key).is_none() {
            return false;
        }
        if pressed {
            if !self.held.contains(&key) {
                self.held.push(key);
            }
        } else {
            self.held.retain(|k| *k != key);
        }
        true
    }

    /// Integrate held keys over `dt_s` seconds
    pub fn update(&mut self, dt_s: f32) -> Pose {
        let intent = self.intent();

        let yaw = intent.yaw * self.config.turn_speed_deg_per_s.to_radians() * dt_s;
        self.pose.orientation = (Quat::from_rotation_y(yaw) * self.pose.orientation).normalize();

        let step = self.config.move_speed_m_per_s * dt_s;
        self.pose.position += self.pose.forward() * intent.forward * step
            + self.pose.right() * intent.strafe * step
            + Vec3::Y * intent.lift * step;

        self.pose
    }

    fn intent(&self) -> Intent {
        let mut intent = Intent::default();
        for key in &self.held {
            match Self::axis_of(*key) {
                Some((Axis::Forward, s)) => intent.forward += s,
                Some((Axis::Strafe, s)) => intent.strafe += s,
                Some((Axis::Lift, s)) => intent.lift += s,
                Some((Axis::Yaw, s)) => intent.yaw += s,
                None => {}
            }
        }
        intent.forward = intent.forward.clamp(-1.0, 1.0);
        intent.strafe = intent.strafe.clamp(-1.0, 1.0);
        intent.lift = intent.lift.clamp(-1.0, 1.0);
        intent.yaw = intent.yaw.clamp(-1.0, 1.0);
        intent
    }

    fn axis_of(key: KeyCode) -> Option<(Axis, f32)> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some((Axis::Forward, 1.0)),
            KeyCode::KeyS | KeyCode::ArrowDown => Some((Axis::Forward, -1.0)),
            KeyCode::KeyD => Some((Axis::Strafe, 1.0)),
            KeyCode::KeyA => Some((Axis::Strafe, -1.0)),
            KeyCode::KeyR | KeyCode::PageUp => Some((Axis::Lift, 1.0)),
            KeyCode::KeyF | KeyCode::PageDown => Some((Axis::Lift, -1.0)),
            KeyCode::ArrowLeft | KeyCode::KeyQ => Some((Axis::Yaw, 1.0)),
            KeyCode::ArrowRight | KeyCode::KeyE => Some((Axis::Yaw, -1.0)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Forward,
    Strafe,
    Lift,
    Yaw,
}

/// Builds camera matrices from the pose carried in the simulation state
pub struct CameraSystem {
    render_config: RenderConfig,
}

impl CameraSystem {
    pub fn new(render_config: RenderConfig) -> Self {
        Self { render_config }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.render_config.window_width = width.max(1);
        self.render_config.window_height = height.max(1);
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(&self, pose: &Pose) -> (Mat4, Vec3) {
        let eye = pose.position;
        let target = eye + pose.forward();

        // Always keep Y as up vector (camera never rolls)
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.render_config.fov_degrees.to_radians(),
            self.render_config.aspect_ratio(),
            self.render_config.near_plane_m,
            self.render_config.far_plane_m,
        );

        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose_looks_down_negative_z() {
        let pose = Pose::default();
        assert!((pose.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((pose.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_attenuation_distance_floor() {
        let pose = Pose::default();
        assert_eq!(pose.attenuation_distance(Vec3::new(0.0, 0.5, 0.0)), 1.0);
        assert_eq!(pose.attenuation_distance(Vec3::new(0.0, 0.0, -10.0)), 10.0);
    }

    #[test]
    fn test_navigator_moves_forward() {
        let mut nav = Navigator::new(NavConfig::default());
        assert!(nav.handle_key(KeyCode::KeyW, true));

        let pose = nav.update(1.0);
        assert!((pose.position - Vec3::new(0.0, 0.0, -8.0)).length() < 1e-4);

        nav.handle_key(KeyCode::KeyW, false);
        let still = nav.update(1.0);
        assert_eq!(still.position, pose.position);
    }

    #[test]
    fn test_navigator_turns_and_ignores_other_keys() {
        let mut nav = Navigator::new(NavConfig::default());
        assert!(!nav.handle_key(KeyCode::Space, true));

        nav.handle_key(KeyCode::ArrowLeft, true);
        nav.update(1.5); // 90 degrees at 60 deg/s

        assert!((nav.pose().forward() - Vec3::NEG_X).length() < 1e-4);
        assert_eq!(nav.pose().position, Vec3::ZERO);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut nav = Navigator::new(NavConfig::default());
        nav.handle_key(KeyCode::KeyR, true);
        nav.handle_key(KeyCode::KeyF, true);
        assert_eq!(nav.update(1.0).position, Vec3::ZERO);
    }

    #[test]
    fn test_shared_pose_round_trip() {
        let shared = shared_pose(Pose::default());
        shared.store(Arc::new(Pose::at(Vec3::ONE)));
        assert_eq!(shared.load().position, Vec3::ONE);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let camera = CameraSystem::new(RenderConfig::default());
        let (view_proj, eye_pos) = camera.create_view_proj_matrix(&Pose::default());

        // Matrix should not be identity or zero
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert_eq!(eye_pos, Vec3::ZERO);

        // A point straight ahead projects to the screen center
        let clip = view_proj * glam::Vec4::new(0.0, 0.0, -10.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }
}
