//! Unit-sphere mesh and per-agent instance data for the renderer.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;

use super::agent::Agent;
use super::state::State;

/// Vertex data for the sphere mesh (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-sphere transform and color, uploaded once per frame
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    /// World-space center (xyz) and radius (w)
    pub center_radius: [f32; 4],

    /// Linear RGB (w unused)
    pub color: [f32; 4],
}

impl From<&Agent> for Instance {
    fn from(agent: &Agent) -> Self {
        Self {
            center_radius: agent.position.extend(agent.radius).to_array(),
            color: agent.color.extend(1.0).to_array(),
        }
    }
}

/// All spheres of a state: agents first, then the two markers
pub fn instances(state: &State) -> Vec<Instance> {
    state.drawables().map(Instance::from).collect()
}

/// UV sphere of radius 1 centered at the origin
pub struct SphereMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Sphere with `segments` latitude bands and twice as many longitude slices
    pub fn new(segments: u32) -> Self {
        let stacks = segments.max(2);
        let slices = stacks * 2;

        let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
        for stack in 0..=stacks {
            let phi = PI * stack as f32 / stacks as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            for slice in 0..=slices {
                let theta = 2.0 * PI * slice as f32 / slices as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                let p = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];

                // On a unit sphere the normal is the position
                vertices.push(Vertex {
                    position: p,
                    normal: p,
                });
            }
        }

        // Counter-clockwise winding seen from outside
        let row = slices + 1;
        let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
        for stack in 0..stacks {
            for slice in 0..slices {
                let top_left = stack * row + slice;
                let top_right = top_left + 1;
                let bottom_left = top_left + row;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    top_right,
                    bottom_left,
                    top_right,
                    bottom_right,
                    bottom_left,
                ]);
            }
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Pose;
    use crate::params::{LampPhysics, AGENT_COUNT};
    use glam::Vec3;

    #[test]
    fn test_sphere_mesh_counts() {
        let mesh = SphereMesh::new(8);

        // (stacks + 1) * (slices + 1) vertices, 2 triangles per quad
        assert_eq!(mesh.vertices.len(), 9 * 17);
        assert_eq!(mesh.indices.len(), 8 * 16 * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_sphere_vertices_on_unit_sphere() {
        let mesh = SphereMesh::new(12);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_outward_winding() {
        let mesh = SphereMesh::new(8);
        // First triangle below the pole band
        let tri = &mesh.indices[8 * 2 * 6..8 * 2 * 6 + 3];
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
        let normal = (b - a).cross(c - a);
        let center = (a + b + c) / 3.0;
        assert!(normal.dot(center) > 0.0);
    }

    #[test]
    fn test_instances_include_markers() {
        let physics = LampPhysics::default();
        let state = State::init(&physics, Pose::default());
        let list = instances(&state);

        assert_eq!(list.len(), AGENT_COUNT + 2);
        assert_eq!(list[AGENT_COUNT].center_radius, [0.0, 60.0, 0.0, 50.0]);
        assert_eq!(list[AGENT_COUNT + 1].color, [1.0, 0.0, 0.0, 1.0]);
    }
}
