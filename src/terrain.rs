// src/terrain.rs
// Procedural terrain: an fBm heightfield over a bounded square patch, the
// ground-height probe the integrator drives on, and the CPU meshes (terrain
// grid + scattered obstacle boxes) the renderer uploads once at startup.
//
// The sampler is a pure query: no caching, no mutation. Probes outside the
// patch find no surface and report the deep sentinel, so driving off the
// edge of the world means falling, not crashing.

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::mesh::{cuboid, MeshData, Vertex};
use crate::physics::{GroundHeightQuery, NO_GROUND_HEIGHT};

/// Terrain generation tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u32,
    /// The patch covers `[-half_extent, half_extent]` on X and Z.
    pub half_extent: f32,
    /// Mean terrain height.
    pub base_height: f32,
    /// Peak-to-mean height of the noise, meters. Zero gives flat ground.
    pub amplitude: f32,
    /// Horizontal noise frequency, cycles per meter.
    pub frequency: f64,
    pub octaves: usize,
    /// Number of scattered obstacle boxes.
    pub obstacle_count: usize,
    /// Grid cells per side of the render mesh.
    pub mesh_resolution: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            half_extent: 240.0,
            base_height: 0.0,
            amplitude: 5.0,
            frequency: 0.012,
            octaves: 4,
            obstacle_count: 48,
            mesh_resolution: 160,
        }
    }
}

pub struct Terrain {
    config: TerrainConfig,
    noise: Fbm<Perlin>,
}

impl Terrain {
    pub fn new(config: TerrainConfig) -> Self {
        let noise = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves.max(1))
            .set_frequency(config.frequency);
        Self { config, noise }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Downward probe: the surface height beneath `(x, z)`, or `None` when
    /// the probe leaves the patch and finds nothing.
    pub fn probe(&self, x: f32, z: f32) -> Option<f32> {
        let he = self.config.half_extent;
        if !x.is_finite() || !z.is_finite() || x.abs() > he || z.abs() > he {
            return None;
        }
        Some(self.sample(x, z))
    }

    /// Heightfield sample without the bounds check.
    fn sample(&self, x: f32, z: f32) -> f32 {
        if self.config.amplitude == 0.0 {
            return self.config.base_height;
        }
        let n = self.noise.get([x as f64, z as f64]) as f32;
        self.config.base_height + n * self.config.amplitude
    }

    /// Build the render mesh for the whole patch, height-tinted.
    pub fn build_mesh(&self) -> MeshData {
        let res = self.config.mesh_resolution.max(2);
        let he = self.config.half_extent;
        let step = 2.0 * he / res as f32;

        let mut mesh = MeshData::default();
        mesh.vertices.reserve((res + 1) * (res + 1));

        for iz in 0..=res {
            for ix in 0..=res {
                let x = -he + ix as f32 * step;
                let z = -he + iz as f32 * step;
                let y = self.sample(x, z);

                // Central differences for the normal; clamp at the rim.
                let dx = self.sample((x + step).min(he), z) - self.sample((x - step).max(-he), z);
                let dz = self.sample(x, (z + step).min(he)) - self.sample(x, (z - step).max(-he));
                let normal = Vec3::new(-dx, 2.0 * step, -dz).normalize_or_zero();

                mesh.vertices.push(Vertex {
                    position: [x, y, z],
                    normal: normal.to_array(),
                    color: height_tint(y, &self.config),
                });
            }
        }

        let stride = (res + 1) as u32;
        for iz in 0..res as u32 {
            for ix in 0..res as u32 {
                let a = iz * stride + ix;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        mesh
    }

    /// Scatter static obstacle boxes across the patch, seated on the
    /// ground. Deterministic per seed; keeps a clear circle around spawn.
    ///
    /// Rejection sampling with a bounded attempt count: a patch too small
    /// to fit anything outside the spawn clearance yields fewer (possibly
    /// zero) obstacles instead of looping forever. `TerrainConfig` is
    /// user-supplied JSON, so degenerate extents must stay safe.
    pub fn build_obstacle_mesh(&self) -> MeshData {
        let mut rng = StdRng::seed_from_u64(self.config.seed as u64 ^ 0x6f62_7374);
        let he = self.config.half_extent * 0.9;
        let mut mesh = MeshData::default();
        if he <= 0.0 || self.config.obstacle_count == 0 {
            return mesh;
        }

        let mut placed = 0;
        for _ in 0..self.config.obstacle_count * 20 {
            if placed == self.config.obstacle_count {
                break;
            }
            let x = rng.gen_range(-he..he);
            let z = rng.gen_range(-he..he);
            // Leave the spawn area drivable.
            if x * x + z * z < 20.0 * 20.0 {
                continue;
            }
            let half = Vec3::new(
                rng.gen_range(0.6..2.2),
                rng.gen_range(0.8..2.8),
                rng.gen_range(0.6..2.2),
            );
            let y = self.sample(x, z) + half.y * 0.8; // sunk slightly into the slope
            let shade = rng.gen_range(0.35..0.55);
            mesh.append(&cuboid(
                Vec3::new(x, y, z),
                half,
                [shade, shade * 0.95, shade * 0.9],
            ));
            placed += 1;
        }
        if placed < self.config.obstacle_count {
            log::warn!(
                "placed {placed}/{} obstacles; patch too small for the rest",
                self.config.obstacle_count
            );
        }
        mesh
    }
}

impl GroundHeightQuery for Terrain {
    #[inline]
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.probe(x, z).unwrap_or(NO_GROUND_HEIGHT)
    }
}

fn height_tint(y: f32, config: &TerrainConfig) -> [f32; 3] {
    // Low ground is dusty green, ridges fade to gray.
    let a = if config.amplitude > 0.0 {
        ((y - config.base_height) / config.amplitude * 0.5 + 0.5).clamp(0.0, 1.0)
    } else {
        0.5
    };
    [
        0.32 + 0.28 * a,
        0.42 + 0.13 * a,
        0.22 + 0.28 * a,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_at(h: f32) -> Terrain {
        Terrain::new(TerrainConfig {
            amplitude: 0.0,
            base_height: h,
            ..TerrainConfig::default()
        })
    }

    #[test]
    fn flat_terrain_reports_base_height_everywhere() {
        let t = flat_at(3.25);
        for (x, z) in [(0.0, 0.0), (17.3, -90.0), (-239.9, 239.9), (100.0, 100.0)] {
            assert_eq!(t.height_at(x, z), 3.25, "at ({x}, {z})");
        }
    }

    #[test]
    fn probe_outside_patch_finds_no_ground() {
        let t = flat_at(0.0);
        let he = t.config().half_extent;
        assert_eq!(t.probe(he + 1.0, 0.0), None);
        assert_eq!(t.probe(0.0, -he - 0.1), None);
        assert_eq!(t.height_at(he * 2.0, 0.0), NO_GROUND_HEIGHT);
        assert_eq!(t.height_at(f32::NAN, 0.0), NO_GROUND_HEIGHT);
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let a = Terrain::new(TerrainConfig::default());
        let b = Terrain::new(TerrainConfig::default());
        let c = Terrain::new(TerrainConfig {
            seed: 99,
            ..TerrainConfig::default()
        });
        let mut differs = false;
        for i in 0..50 {
            let x = i as f32 * 7.3 - 180.0;
            let z = i as f32 * -4.1 + 120.0;
            assert_eq!(a.height_at(x, z), b.height_at(x, z));
            differs |= a.height_at(x, z) != c.height_at(x, z);
        }
        assert!(differs, "different seeds produced identical terrain");
    }

    #[test]
    fn heights_stay_within_amplitude() {
        let t = Terrain::new(TerrainConfig::default());
        let cfg = *t.config();
        for i in 0..200 {
            let x = (i as f32 * 13.7) % cfg.half_extent - cfg.half_extent / 2.0;
            let z = (i as f32 * 31.1) % cfg.half_extent - cfg.half_extent / 2.0;
            let h = t.height_at(x, z);
            assert!(h.is_finite());
            // fBm output is normalized to roughly [-1, 1]; allow slack.
            assert!((h - cfg.base_height).abs() <= cfg.amplitude * 2.0);
        }
    }

    #[test]
    fn meshes_are_finite_and_non_empty() {
        let t = Terrain::new(TerrainConfig {
            mesh_resolution: 16,
            obstacle_count: 8,
            ..TerrainConfig::default()
        });
        let ground = t.build_mesh();
        assert!(!ground.is_empty());
        assert!(ground.positions_finite());
        assert_eq!(ground.vertices.len(), 17 * 17);

        let obstacles = t.build_obstacle_mesh();
        assert!(!obstacles.is_empty());
        assert!(obstacles.positions_finite());
        assert_eq!(obstacles.vertices.len(), 8 * 24);
    }

    #[test]
    fn cramped_patch_scatter_terminates() {
        // The whole usable area sits inside the spawn clearance circle:
        // every sample is rejected, so the scatter must give up, not spin.
        let t = Terrain::new(TerrainConfig {
            half_extent: 15.0,
            obstacle_count: 4,
            ..TerrainConfig::default()
        });
        let obstacles = t.build_obstacle_mesh();
        assert!(obstacles.is_empty());
    }

    #[test]
    fn degenerate_extent_yields_no_obstacles() {
        for he in [0.0, -5.0] {
            let t = Terrain::new(TerrainConfig {
                half_extent: he,
                obstacle_count: 4,
                ..TerrainConfig::default()
            });
            assert!(t.build_obstacle_mesh().is_empty());
        }
    }
}
