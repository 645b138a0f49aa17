// src/mesh.rs
// CPU-side mesh data shared by the terrain generator, the asset loader and
// the renderer. Flat-shaded, vertex-colored — no textures in this demo.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex layout for everything the demo draws.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// A triangle mesh ready for GPU upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, offsetting its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// True when every vertex position is finite. Used by the asset loader
    /// to reject corrupt model data before it reaches the GPU.
    pub fn positions_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.is_finite()))
    }
}

/// Axis-aligned cuboid centered at `center` with the given half extents,
/// flat normals, one color. Building block for the placeholder car and the
/// scattered obstacles.
pub fn cuboid(center: Vec3, half: Vec3, color: [f32; 3]) -> MeshData {
    // 6 faces, 4 unique vertices each so normals stay flat.
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        (
            [1.0, 0.0, 0.0],
            [
                [1.0, -1.0, -1.0],
                [1.0, 1.0, -1.0],
                [1.0, 1.0, 1.0],
                [1.0, -1.0, 1.0],
            ],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [
                [-1.0, -1.0, 1.0],
                [-1.0, 1.0, 1.0],
                [-1.0, 1.0, -1.0],
                [-1.0, -1.0, -1.0],
            ],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [
                [-1.0, 1.0, -1.0],
                [-1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
                [1.0, 1.0, -1.0],
            ],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [
                [-1.0, -1.0, 1.0],
                [-1.0, -1.0, -1.0],
                [1.0, -1.0, -1.0],
                [1.0, -1.0, 1.0],
            ],
        ),
        // +Z
        (
            [0.0, 0.0, 1.0],
            [
                [1.0, -1.0, 1.0],
                [1.0, 1.0, 1.0],
                [-1.0, 1.0, 1.0],
                [-1.0, -1.0, 1.0],
            ],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [
                [-1.0, -1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [1.0, 1.0, -1.0],
                [1.0, -1.0, -1.0],
            ],
        ),
    ];

    let mut mesh = MeshData::default();
    for (normal, corners) in FACES {
        let base = mesh.vertices.len() as u32;
        for corner in corners {
            mesh.vertices.push(Vertex {
                position: [
                    center.x + corner[0] * half.x,
                    center.y + corner[1] * half.y,
                    center.z + corner[2] * half.z,
                ],
                normal,
                color,
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_has_expected_counts() {
        let m = cuboid(Vec3::ZERO, Vec3::ONE, [1.0, 0.0, 0.0]);
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.indices.len(), 36);
        assert!(m.positions_finite());
    }

    #[test]
    fn append_offsets_indices() {
        let mut a = cuboid(Vec3::ZERO, Vec3::ONE, [1.0, 0.0, 0.0]);
        let b = cuboid(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE, [0.0, 1.0, 0.0]);
        a.append(&b);
        assert_eq!(a.vertices.len(), 48);
        assert_eq!(a.indices.len(), 72);
        assert!(a.indices.iter().all(|&i| (i as usize) < a.vertices.len()));
    }
}
