// src/camera.rs
// Camera state and the chase/orbit rig that drives it from vehicle state.
//
// The rig owns no GPU resources; it mutates a plain `Camera` (position +
// look target) and the renderer turns that into matrices. Chase smoothing
// uses `1 - 0.01^dt`, so the convergence half-life is the same at any frame
// rate.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Chase offset in vehicle-local space: above and behind the body
/// (local +Z is forward).
pub const CHASE_OFFSET: Vec3 = Vec3::new(0.0, 2.2, -6.0);

/// The chase camera looks at a point slightly above the body origin.
pub const CHASE_LOOK_OFFSET: Vec3 = Vec3::new(0.0, 1.2, 0.0);

/// Perspective camera with an explicit look target.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fovy: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 24.0, -10.0),
            target: Vec3::new(0.0, 20.0, 0.0),
            fovy: 60f32.to_radians(),
            aspect,
            znear: 0.1,
            zfar: 1200.0,
        }
    }

    /// Update aspect ratio (call on resize).
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(1e-3);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn proj_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        self.proj_matrix() * self.view_matrix()
    }
}

/// Camera modes. Toggling is instantaneous; only positions are smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    Chase,
    Orbit,
}

/// Manual orbit around a fixed target, fed by pointer deltas.
#[derive(Debug, Clone, Copy)]
pub struct OrbitController {
    pub target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    pub sensitivity: f32,
}

impl OrbitController {
    const MIN_DISTANCE: f32 = 2.0;
    const MAX_DISTANCE: f32 = 80.0;
    const MAX_PITCH: f32 = 1.45;

    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.45,
            distance: 12.0,
            sensitivity: 0.005,
        }
    }

    /// Pointer drag, in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    /// Scroll zoom, positive pulls in.
    pub fn zoom(&mut self, delta: f32) {
        self.distance =
            (self.distance - delta).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    fn apply(&self, camera: &mut Camera) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = Vec3::new(
            self.distance * cos_pitch * sin_yaw,
            self.distance * sin_pitch,
            self.distance * cos_pitch * cos_yaw,
        );
        camera.position = self.target + offset;
        camera.target = self.target;
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the camera from the vehicle (chase) or from the orbit
/// controller. Holds no other persistent state.
pub struct CameraRig {
    pub mode: CameraMode,
    pub orbit: OrbitController,
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            mode: CameraMode::Chase,
            orbit: OrbitController::new(),
        }
    }

    /// Flip between chase and orbit. Entering orbit snaps the orbit target
    /// to the vehicle once; after that the user owns it.
    pub fn toggle(&mut self, vehicle_position: Vec3) {
        self.mode = match self.mode {
            CameraMode::Chase => {
                self.orbit.target = vehicle_position;
                CameraMode::Orbit
            }
            CameraMode::Orbit => CameraMode::Chase,
        };
    }

    pub fn update(
        &mut self,
        camera: &mut Camera,
        vehicle_position: Vec3,
        vehicle_orientation: Quat,
        dt: f32,
    ) {
        match self.mode {
            CameraMode::Chase => {
                let desired = vehicle_position + vehicle_orientation * CHASE_OFFSET;
                // Frame-rate-independent smoothing: constant half-life
                // regardless of dt.
                let t = 1.0 - 0.01f32.powf(dt);
                camera.position = camera.position.lerp(desired, t);
                camera.target = vehicle_position + CHASE_LOOK_OFFSET;
            }
            CameraMode::Orbit => {
                self.orbit.apply(camera);
            }
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chase_converges_to_rotated_offset() {
        let mut rig = CameraRig::new();
        let mut camera = Camera::new(16.0 / 9.0);
        let pos = Vec3::new(30.0, 1.0, -12.0);
        let orient = Quat::from_rotation_y(0.8);

        for _ in 0..2000 {
            rig.update(&mut camera, pos, orient, 0.016);
        }
        let desired = pos + orient * CHASE_OFFSET;
        assert!((camera.position - desired).length() < 1e-3);
        assert!((camera.target - (pos + CHASE_LOOK_OFFSET)).length() < 1e-6);
    }

    #[test]
    fn chase_single_tick_moves_partially() {
        let mut rig = CameraRig::new();
        let mut camera = Camera::new(1.0);
        camera.position = Vec3::ZERO;
        let pos = Vec3::new(0.0, 0.0, 100.0);
        let desired = pos + CHASE_OFFSET;
        let before = (camera.position - desired).length();

        rig.update(&mut camera, pos, Quat::IDENTITY, 0.016);
        let after = (camera.position - desired).length();

        assert!(after < before, "camera did not move toward target");
        assert!(after > 0.0, "camera snapped in a single tick");
        // Remaining distance shrinks by exactly 0.01^dt.
        let expected = before * 0.01f32.powf(0.016);
        assert!((after - expected).abs() < 1e-3);
    }

    #[test]
    fn smoothing_is_frame_rate_independent() {
        let pos = Vec3::new(0.0, 0.0, 50.0);
        let desired = pos + CHASE_OFFSET;

        // Many small ticks vs few large ticks covering the same wall time.
        let run = |dt: f32, ticks: usize| {
            let mut rig = CameraRig::new();
            let mut camera = Camera::new(1.0);
            camera.position = Vec3::ZERO;
            for _ in 0..ticks {
                rig.update(&mut camera, pos, Quat::IDENTITY, dt);
            }
            (camera.position - desired).length()
        };
        let fine = run(0.01, 100);
        let coarse = run(0.05, 20);
        assert!((fine - coarse).abs() < fine * 0.01 + 1e-4);
    }

    #[test]
    fn toggle_snaps_orbit_target_once() {
        let mut rig = CameraRig::new();
        let vehicle = Vec3::new(5.0, 1.0, 7.0);
        rig.toggle(vehicle);
        assert_eq!(rig.mode, CameraMode::Orbit);
        assert_eq!(rig.orbit.target, vehicle);

        // Orbit target stays put even as the vehicle keeps moving.
        let mut camera = Camera::new(1.0);
        rig.update(&mut camera, Vec3::new(90.0, 0.0, 0.0), Quat::IDENTITY, 0.016);
        assert_eq!(camera.target, vehicle);

        rig.toggle(Vec3::ZERO);
        assert_eq!(rig.mode, CameraMode::Chase);
    }

    #[test]
    fn orbit_pitch_is_clamped() {
        let mut orbit = OrbitController::new();
        orbit.rotate(0.0, 1.0e5);
        let mut camera = Camera::new(1.0);
        orbit.apply(&mut camera);
        assert!(camera.position.is_finite());
        // Pitch clamp keeps the camera from flipping over the pole.
        assert!(camera.position.y <= OrbitController::MAX_DISTANCE);
    }

    #[test]
    fn orbit_zoom_is_bounded() {
        let mut orbit = OrbitController::new();
        orbit.zoom(1.0e4);
        let mut camera = Camera::new(1.0);
        orbit.apply(&mut camera);
        let d = (camera.position - camera.target).length();
        assert!((d - OrbitController::MIN_DISTANCE).abs() < 1e-3);

        orbit.zoom(-1.0e4);
        orbit.apply(&mut camera);
        let d = (camera.position - camera.target).length();
        assert!((d - OrbitController::MAX_DISTANCE).abs() < 1e-3);
    }
}
