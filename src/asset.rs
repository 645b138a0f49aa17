// src/asset.rs
// Vehicle model loading. glTF/GLB in, flat-shaded vertex-colored mesh out.
//
// Load failures are an application-boundary concern: the caller logs them
// and substitutes the placeholder box car. The simulation never learns
// whether the real model arrived — it only needs *some* representation to
// push poses into.

use glam::Vec3;

use crate::error::Error;
use crate::mesh::{cuboid, MeshData, Vertex};
use crate::Result;

/// Paint applied to model primitives that carry no vertex colors.
const BODY_COLOR: [f32; 3] = [0.78, 0.22, 0.16];

/// Decode a glTF or GLB blob into a single mesh. All primitives are
/// flattened together; materials and textures are ignored.
pub fn load_vehicle_mesh(bytes: &[u8]) -> Result<MeshData> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| Error::asset(format!("glTF decode: {e}")))?;

    let mut mesh = MeshData::default();
    for gltf_mesh in document.meshes() {
        for primitive in gltf_mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| iter.collect())
                .unwrap_or_default();

            let base = mesh.vertices.len() as u32;
            for (i, position) in positions.iter().enumerate() {
                mesh.vertices.push(Vertex {
                    position: *position,
                    normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    color: BODY_COLOR,
                });
            }

            match reader.read_indices() {
                Some(indices) => mesh.indices.extend(indices.into_u32().map(|i| i + base)),
                // Non-indexed primitive: triangles in vertex order.
                None => mesh
                    .indices
                    .extend(base..base + positions.len() as u32),
            }
        }
    }

    if mesh.is_empty() {
        return Err(Error::asset("model contains no triangle data"));
    }
    if !mesh.positions_finite() {
        return Err(Error::asset("model contains non-finite positions"));
    }
    Ok(mesh)
}

/// The fallback representation: a box-car silhouette that is obviously a
/// placeholder but drives and frames the chase camera exactly like the real
/// model. Local +Z is forward, origin at the body center.
pub fn placeholder_vehicle_mesh() -> MeshData {
    let mut mesh = MeshData::default();
    // Body
    mesh.append(&cuboid(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.95, 0.45, 2.1),
        BODY_COLOR,
    ));
    // Cabin, set back from the nose
    mesh.append(&cuboid(
        Vec3::new(0.0, 0.72, -0.35),
        Vec3::new(0.8, 0.32, 0.95),
        [0.25, 0.27, 0.3],
    ));
    // Wheels
    for (x, z) in [(-0.85, 1.3), (0.85, 1.3), (-0.85, -1.3), (0.85, -1.3)] {
        mesh.append(&cuboid(
            Vec3::new(x, -0.45, z),
            Vec3::new(0.18, 0.35, 0.35),
            [0.08, 0.08, 0.09],
        ));
    }
    mesh
}

/// Boundary recovery: try the model bytes if any, fall back to the
/// placeholder on any failure, logging the reason once.
pub fn vehicle_mesh_or_placeholder(model_bytes: Option<&[u8]>) -> MeshData {
    match model_bytes {
        Some(bytes) => match load_vehicle_mesh(bytes) {
            Ok(mesh) => {
                log::info!(
                    "vehicle model loaded: {} vertices, {} triangles",
                    mesh.vertices.len(),
                    mesh.indices.len() / 3
                );
                mesh
            }
            Err(e) => {
                log::warn!("vehicle model rejected ({e}); using placeholder");
                placeholder_vehicle_mesh()
            }
        },
        None => {
            log::info!("no vehicle model provided; using placeholder");
            placeholder_vehicle_mesh()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_well_formed() {
        let mesh = placeholder_vehicle_mesh();
        assert!(!mesh.is_empty());
        assert!(mesh.positions_finite());
        // Body + cabin + 4 wheels.
        assert_eq!(mesh.vertices.len(), 6 * 24);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = load_vehicle_mesh(b"definitely not a gltf file").unwrap_err();
        assert!(err.is_asset());
    }

    #[test]
    fn boundary_recovery_always_yields_a_mesh() {
        let from_garbage = vehicle_mesh_or_placeholder(Some(b"nope"));
        let from_nothing = vehicle_mesh_or_placeholder(None);
        assert_eq!(from_garbage.vertices.len(), from_nothing.vertices.len());
        assert!(!from_nothing.is_empty());
    }
}
