// src/physics.rs
// Single-body arcade vehicle integration.
//
// One step advances the whole state: throttle/steer mapping, longitudinal
// forces, bicycle-model yaw, displacement along the heading axis, and the
// suspension spring that couples the body to the ground height. The step is
// a pure function of its inputs — no branch can fail, every output is a
// defined finite number, and no renderer is needed to run it.

use glam::{Quat, Vec3};

use crate::input::InputState;
use crate::vehicle::{VehicleParams, VehicleState};

/// Gravitational acceleration along world Y, m/s².
pub const GRAVITY: f32 = -9.81;

/// Height reported when no surface exists beneath a probe point. Deep below
/// any valid terrain. The integrator treats it as "no ground": the
/// suspension spring disengages and the body falls under gravity alone.
pub const NO_GROUND_HEIGHT: f32 = -1.0e4;

/// Below this speed the turn rate degenerates to zero (no yaw at standstill).
const YAW_SPEED_EPS: f32 = 1e-4;

/// Narrow capability the integrator needs from the world: terrain height
/// beneath a horizontal position. Implementations must not fail — a probe
/// that finds nothing reports [`NO_GROUND_HEIGHT`].
pub trait GroundHeightQuery {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Plain functions work as ground queries; handy for tests and flat worlds.
impl<F> GroundHeightQuery for F
where
    F: Fn(f32, f32) -> f32,
{
    #[inline]
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Advance the vehicle by one tick of `dt` seconds.
///
/// `dt` must already be clamped by the caller (see
/// [`crate::sim::MAX_TICK_DT`]); longer real gaps are simulated as if only
/// the clamped time passed.
pub fn step(
    state: &mut VehicleState,
    params: &VehicleParams,
    input: &InputState,
    ground: &impl GroundHeightQuery,
    dt: f32,
) {
    debug_assert!(dt > 0.0 && dt <= crate::sim::MAX_TICK_DT + f32::EPSILON);

    // 1-2. Control mapping. Steering is a first-order lag toward the target
    // angle, not a snap; the clamp keeps the invariant even if a config sets
    // an aggressive response rate.
    let throttle = input.throttle(params.reverse_factor);
    let steer_target = input.steer() * params.max_steer;
    let blend = 1.0 - (-params.steer_response * dt).exp();
    state.steer_angle += (steer_target - state.steer_angle) * blend;
    state.steer_angle = state.steer_angle.clamp(-params.max_steer, params.max_steer);

    // 3-6. Longitudinal forces and velocity integration. Drag and rolling
    // resistance oppose the current velocity and vanish with it, so they
    // can never start the vehicle moving on their own.
    let forward = state.forward();
    let engine = if input.handbrake {
        Vec3::ZERO
    } else {
        forward * (throttle * params.engine_force)
    };
    let speed = state.velocity.length();
    let drag = -state.velocity * (params.drag_coefficient * speed);
    let rolling = -state.velocity * params.rolling_resistance;
    state.velocity += (engine + drag + rolling) / params.mass * dt;

    // Handbrake: arcade lock-up. Horizontal velocity decays toward zero and
    // never crosses it.
    if input.handbrake {
        let decay = (1.0 - params.handbrake_decay * dt).max(0.0);
        state.velocity.x *= decay;
        state.velocity.z *= decay;
    }

    // 7. Bicycle-model yaw: turn rate proportional to speed and steer
    // angle, zero at standstill. World-space yaw, pre-multiplied.
    let speed = state.velocity.length();
    if speed > YAW_SPEED_EPS {
        let yaw_rate = speed / params.wheel_base * state.steer_angle.tan();
        state.orientation = (Quat::from_rotation_y(yaw_rate * dt) * state.orientation).normalize();
    }

    // 8. The body moves along its own heading axis, never sideways; the
    // dot with the (updated) forward vector supplies the sign for reverse.
    let forward = state.forward();
    let sign = if state.velocity.dot(forward) < 0.0 { -1.0 } else { 1.0 };
    let travel = speed * dt * sign;
    state.position.x += forward.x * travel;
    state.position.z += forward.z * travel;

    // 9. Suspension spring toward ride height over the sampled ground, plus
    // gravity. Damping defaults to zero, faithful to the stock tune. Over
    // the void the spring disengages entirely — pulling toward the sentinel
    // depth would inject an enormous impulse instead of a free fall.
    let ground_y = ground.height_at(state.position.x, state.position.z);
    if ground_y > NO_GROUND_HEIGHT {
        let desired_y = ground_y + params.ride_height;
        state.velocity.y += (desired_y - state.position.y) * params.suspension_stiffness * dt;
        state.velocity.y -= state.velocity.y * params.suspension_damping * dt;
    }
    state.velocity.y += GRAVITY * dt;
    state.position.y += state.velocity.y * dt;
}
