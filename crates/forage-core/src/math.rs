//! Small geometry helpers shared by the agent and the spawn placer.
//!
//! Convention: the agent's local frame is +Z forward, +Y up, matching the
//! rest of the crate.

use glam::{Mat3, Quat, Vec3};

/// Orientation whose local +Z points along `forward`, using `up` as the
/// secondary axis. Falls back to +Z as the secondary axis when `forward`
/// is (anti)parallel to `up`, which happens when looking straight down at
/// a flower from above it.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let f = forward.normalize();
    let up = if f.dot(up).abs() > 0.999 { Vec3::Z } else { up };
    let right = up.cross(f).normalize();
    let u = f.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, u, f))
}

/// Wrap an angle in degrees into (-180, 180].
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Move `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    current + (target - current).clamp(-max_delta, max_delta)
}

pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
