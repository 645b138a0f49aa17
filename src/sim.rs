// src/sim.rs
// The per-frame simulation tick: clamp elapsed time, consume edge actions,
// step the vehicle, push the pose to the renderer's vehicle object, update
// the camera rig.
//
// Single logical thread of execution. Input events mutate `InputState`
// asynchronously; the read at the top of `tick` is the only
// synchronization point.

use glam::{Mat4, Quat, Vec3};

use crate::camera::{Camera, CameraRig};
use crate::input::InputState;
use crate::physics::{self, GroundHeightQuery};
use crate::vehicle::{VehicleParams, VehicleState};

/// Upper bound on simulated time per frame, seconds. Longer real gaps (tab
/// switches, jank) are treated as if only this much time passed — physical
/// accuracy is traded for stability.
pub const MAX_TICK_DT: f32 = 0.05;

/// Narrow capability the loop needs from the renderer: somewhere to put the
/// vehicle's pose. Keeps the simulation free of any scene-graph types.
pub trait TransformSink {
    fn set_pose(&mut self, position: Vec3, orientation: Quat);
}

/// A plain pose holder. The app ticks the simulation into this, then turns
/// it into a model matrix for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseBuffer {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for PoseBuffer {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl PoseBuffer {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

impl TransformSink for PoseBuffer {
    fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation;
    }
}

/// Everything that evolves frame to frame, owned in one place instead of
/// module-level globals: vehicle state, control intent, camera mode.
pub struct SimulationContext {
    pub vehicle: VehicleState,
    pub params: VehicleParams,
    pub input: InputState,
    pub rig: CameraRig,
}

impl SimulationContext {
    pub fn new(params: VehicleParams) -> Self {
        Self {
            vehicle: VehicleState::new(),
            params,
            input: InputState::new(),
            rig: CameraRig::new(),
        }
    }

    /// One frame of simulation.
    ///
    /// `vehicle_sink` is `None` while the vehicle's visual representation
    /// is still loading; the whole tick is a no-op for such frames —
    /// skipped, not failed.
    pub fn tick(
        &mut self,
        ground: &impl GroundHeightQuery,
        camera: &mut Camera,
        vehicle_sink: Option<&mut dyn TransformSink>,
        raw_dt: f32,
    ) {
        let Some(sink) = vehicle_sink else {
            return;
        };
        let dt = raw_dt.min(MAX_TICK_DT);
        if !(dt > 0.0) {
            return;
        }

        if self.input.take_reset() {
            self.vehicle.reset();
        }
        if self.input.take_camera_toggle() {
            self.rig.toggle(self.vehicle.position);
        }

        physics::step(&mut self.vehicle, &self.params, &self.input, ground, dt);
        sink.set_pose(self.vehicle.position, self.vehicle.orientation);

        self.rig
            .update(camera, self.vehicle.position, self.vehicle.orientation, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMode;

    struct RecordingSink {
        poses: Vec<(Vec3, Quat)>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self { poses: Vec::new() }
        }
    }

    impl TransformSink for RecordingSink {
        fn set_pose(&mut self, position: Vec3, orientation: Quat) {
            self.poses.push((position, orientation));
        }
    }

    fn flat() -> impl GroundHeightQuery {
        |_x: f32, _z: f32| 0.0
    }

    #[test]
    fn long_frame_gaps_are_clamped() {
        let params = VehicleParams::default();

        // A 10-second gap must simulate exactly like one MAX_TICK_DT tick.
        let mut ctx = SimulationContext::new(params);
        ctx.input.forward = true;
        let mut camera = Camera::new(1.0);
        let mut sink = RecordingSink::new();
        ctx.tick(&flat(), &mut camera, Some(&mut sink), 10.0);

        let mut reference = VehicleState::new();
        let mut ref_input = InputState::new();
        ref_input.forward = true;
        physics::step(&mut reference, &params, &ref_input, &flat(), MAX_TICK_DT);

        assert_eq!(ctx.vehicle, reference);
    }

    #[test]
    fn zero_dt_frame_is_skipped() {
        let mut ctx = SimulationContext::new(VehicleParams::default());
        ctx.input.forward = true;
        let before = ctx.vehicle;
        let mut camera = Camera::new(1.0);
        let mut sink = RecordingSink::new();

        ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.0);

        assert_eq!(ctx.vehicle, before);
        assert!(sink.poses.is_empty());
    }

    #[test]
    fn missing_vehicle_representation_skips_the_tick() {
        let mut ctx = SimulationContext::new(VehicleParams::default());
        ctx.input.forward = true;
        ctx.input.request_reset();
        let before = ctx.vehicle;
        let mut camera = Camera::new(1.0);

        ctx.tick(&flat(), &mut camera, None, 0.016);

        assert_eq!(ctx.vehicle, before);
        // The reset stays latched for the first frame that actually runs.
        let mut sink = RecordingSink::new();
        ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.016);
        assert_eq!(sink.poses.len(), 1);
    }

    #[test]
    fn reset_action_restores_spawn_state() {
        let mut ctx = SimulationContext::new(VehicleParams::default());
        let mut camera = Camera::new(1.0);
        let mut sink = RecordingSink::new();

        ctx.input.forward = true;
        for _ in 0..200 {
            ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.016);
        }
        assert!(ctx.vehicle.position != VehicleState::new().position);

        ctx.input.forward = false;
        ctx.input.request_reset();
        ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.016);

        // One tick of settling has already run after the reset, so compare
        // against a freshly-reset state stepped once.
        let mut expected = VehicleState::new();
        physics::step(
            &mut expected,
            &ctx.params,
            &InputState::new(),
            &flat(),
            0.016,
        );
        assert_eq!(ctx.vehicle, expected);
    }

    #[test]
    fn camera_toggle_switches_mode_and_back() {
        let mut ctx = SimulationContext::new(VehicleParams::default());
        let mut camera = Camera::new(1.0);
        let mut sink = RecordingSink::new();

        ctx.input.request_camera_toggle();
        ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.016);
        assert_eq!(ctx.rig.mode, CameraMode::Orbit);

        // Consumed: the next tick must not toggle again.
        ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.016);
        assert_eq!(ctx.rig.mode, CameraMode::Orbit);

        ctx.input.request_camera_toggle();
        ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.016);
        assert_eq!(ctx.rig.mode, CameraMode::Chase);
    }

    #[test]
    fn sink_receives_every_pose() {
        let mut ctx = SimulationContext::new(VehicleParams::default());
        let mut camera = Camera::new(1.0);
        let mut sink = RecordingSink::new();
        ctx.input.forward = true;

        for _ in 0..10 {
            ctx.tick(&flat(), &mut camera, Some(&mut sink), 0.016);
        }
        assert_eq!(sink.poses.len(), 10);
        let (last_pos, last_orient) = sink.poses[9];
        assert_eq!(last_pos, ctx.vehicle.position);
        assert_eq!(last_orient, ctx.vehicle.orientation);
    }
}
