// src/vehicle.rs
// Vehicle state and static physical parameters.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spawn point: well above the terrain so the suspension spring settles the
/// body onto the ground on the first few ticks.
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 20.0, 0.0);

/// Static physical parameters, immutable while the simulation runs.
///
/// All of these are plain tunables; the defaults reproduce the demo's stock
/// handling. Overrides load from JSON via [`crate::config::SimConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Body mass in kg.
    pub mass: f32,
    /// Distance between axles in meters (bicycle-model turn radius input).
    pub wheel_base: f32,
    /// Steering lock in radians.
    pub max_steer: f32,
    /// Quadratic drag: force ∝ v².
    pub drag_coefficient: f32,
    /// Linear rolling resistance: force ∝ v.
    pub rolling_resistance: f32,
    /// Maximum engine force in N at full throttle.
    pub engine_force: f32,
    /// Reverse throttle scale (reverse is weaker than forward).
    pub reverse_factor: f32,
    /// Steering first-order lag rate constant, per second.
    pub steer_response: f32,
    /// Target height of the body origin above the ground, meters.
    pub ride_height: f32,
    /// Suspension spring constant.
    pub suspension_stiffness: f32,
    /// Suspension damping. The stock demo runs the spring undamped; kept as
    /// a tunable for anyone who wants to tame the bounce on steep terrain.
    pub suspension_damping: f32,
    /// Extra linear decay applied to horizontal velocity while the
    /// handbrake is held, per second.
    pub handbrake_decay: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            mass: 1200.0,
            wheel_base: 2.6,
            max_steer: 0.55,
            drag_coefficient: 4.0,
            rolling_resistance: 60.0,
            engine_force: 8000.0,
            reverse_factor: 0.6,
            steer_response: 5.0,
            ride_height: 0.8,
            suspension_stiffness: 80.0,
            suspension_damping: 0.0,
            handbrake_decay: 4.0,
        }
    }
}

impl VehicleParams {
    /// Steady-state speed where engine force equals combined resistance:
    /// the positive root of `drag·v² + rolling·v − engine = 0`.
    pub fn terminal_speed(&self) -> f32 {
        let a = self.drag_coefficient;
        let b = self.rolling_resistance;
        let c = -self.engine_force;
        (-b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a)
    }
}

/// The mutable physical state of the vehicle.
///
/// Owned by the [`crate::sim::SimulationContext`] and mutated only inside
/// [`crate::physics::step`]; everything else (camera rig, renderer) reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    /// World-space position, meters.
    pub position: Vec3,
    /// Heading as a unit rotation. Yaw-dominant; pitch and roll are not
    /// modeled. Local +Z is forward.
    pub orientation: Quat,
    /// World-space velocity, m/s.
    pub velocity: Vec3,
    /// Current steering angle in radians, `|steer_angle| <= max_steer`.
    pub steer_angle: f32,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: SPAWN_POSITION,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            steer_angle: 0.0,
        }
    }
}

impl VehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the vehicle back at the spawn point, at rest, facing +Z.
    /// Unconditional: prior state does not matter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Unit forward vector (local +Z rotated into world space).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// True when every component of the state is a normal number. The
    /// integrator maintains this; the check exists for tests and debug
    /// assertions.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.orientation.is_finite()
            && self.steer_angle.is_finite()
    }
}
