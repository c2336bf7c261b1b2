//! The foraging agent: perception encoding, action decoding, nearest-flower
//! tracking, and freeze state.
//!
//! Position and velocity are owned by the external physics; the agent only
//! observes them. Orientation is kinematic and owned here, stored as
//! pitch/yaw Euler angles with roll pinned to zero.

use crate::area::{ResourceArea, ResourceId};
use crate::config::EnvConfig;
use crate::math::{move_towards, wrap_degrees};
use crate::spawn::SpawnPose;
use glam::{EulerRot, Quat, Vec3};

/// Fixed-size observation vector handed to the policy.
pub const OBSERVATION_LEN: usize = 10;
/// Fixed-size action vector consumed per step.
pub const ACTION_LEN: usize = 5;

pub struct ForagingAgent {
    /// World position, mirrored from the external physics each step.
    pub(crate) position: Vec3,
    /// World velocity, mirrored from the external physics each step.
    pub(crate) velocity: Vec3,
    pitch_deg: f32,
    yaw_deg: f32,
    smooth_pitch_rate: f32,
    smooth_yaw_rate: f32,
    /// Handle to the tracked flower; always re-validated via `has_nectar`.
    nearest: Option<ResourceId>,
    nectar_obtained: f32,
    pub(crate) frozen: bool,
}

impl ForagingAgent {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            pitch_deg: 0.0,
            yaw_deg: 0.0,
            smooth_pitch_rate: 0.0,
            smooth_yaw_rate: 0.0,
            nearest: None,
            nectar_obtained: 0.0,
            frozen: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw_deg.to_radians(),
            self.pitch_deg.to_radians(),
            0.0,
        )
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    /// The sensor point used for all proximity and contact calculations.
    pub fn beak_tip(&self, config: &EnvConfig) -> Vec3 {
        self.position + self.orientation() * Vec3::from_array(config.beak_tip_offset)
    }

    pub fn nearest(&self) -> Option<ResourceId> {
        self.nearest
    }

    pub fn nectar_obtained(&self) -> f32 {
        self.nectar_obtained
    }

    pub(crate) fn add_nectar(&mut self, amount: f32) {
        self.nectar_obtained += amount;
    }

    /// Adopt the spawn pose and clear per-episode state. The smoothed
    /// pitch/yaw rates are reset here as well.
    pub(crate) fn begin_episode(&mut self, pose: SpawnPose) {
        self.position = pose.position;
        self.velocity = Vec3::ZERO;
        let (yaw, pitch, _roll) = pose.orientation.to_euler(EulerRot::YXZ);
        self.yaw_deg = wrap_degrees(yaw.to_degrees());
        self.pitch_deg = wrap_degrees(pitch.to_degrees());
        self.smooth_pitch_rate = 0.0;
        self.smooth_yaw_rate = 0.0;
        self.nearest = None;
        self.nectar_obtained = 0.0;
    }

    /// Re-select the tracked flower. Keeps the current one unless it has
    /// emptied or a strictly closer candidate exists; ties keep the first
    /// flower in registration order.
    pub(crate) fn update_nearest(&mut self, area: &ResourceArea, config: &EnvConfig) {
        if let Some(id) = self.nearest {
            if !area.get(id).has_nectar() {
                self.nearest = None;
            }
        }
        let beak = self.beak_tip(config);
        for (id, flower) in area.iter() {
            if !flower.has_nectar() {
                continue;
            }
            match self.nearest {
                None => self.nearest = Some(id),
                Some(current) => {
                    let current_sq = area.get(current).position().distance_squared(beak);
                    if flower.position().distance_squared(beak) < current_sq {
                        self.nearest = Some(id);
                    }
                }
            }
        }
    }

    /// Encode world geometry into the 10-float observation. With no flower
    /// to track this is all zeros: a degraded but valid state, not an error.
    pub fn observe(&self, area: &ResourceArea, config: &EnvConfig) -> [f32; OBSERVATION_LEN] {
        let mut obs = [0.0f32; OBSERVATION_LEN];
        let Some(id) = self.nearest else {
            return obs;
        };
        let flower = area.get(id);
        if !flower.has_nectar() {
            return obs;
        }

        let rotation = self.orientation().normalize();
        obs[..4].copy_from_slice(&rotation.to_array());

        let beak = self.beak_tip(config);
        let to_flower = flower.position() - beak;
        let distance = to_flower.length();
        let direction = if distance > f32::EPSILON {
            to_flower / distance
        } else {
            Vec3::ZERO
        };
        obs[4..7].copy_from_slice(&direction.to_array());
        obs[7] = direction.dot(-flower.up());
        obs[8] = self.forward().dot(-flower.up());
        obs[9] = distance / config.arena_diameter;
        obs
    }

    /// Decode the 5-float action into a movement force and integrate the
    /// kinematic orientation. Returns the force for the external physics;
    /// zero while frozen.
    pub(crate) fn apply_action(&mut self, action: &[f32; ACTION_LEN], config: &EnvConfig) -> Vec3 {
        if self.frozen {
            return Vec3::ZERO;
        }
        let force = Vec3::new(action[0], action[1], action[2]) * config.move_force;

        // Ramp the stored rates toward the commanded ones instead of
        // snapping, then integrate into the Euler angles.
        let max_delta = config.rate_smoothing * config.dt;
        self.smooth_pitch_rate = move_towards(self.smooth_pitch_rate, action[3], max_delta);
        self.smooth_yaw_rate = move_towards(self.smooth_yaw_rate, action[4], max_delta);

        let pitch = self.pitch_deg + self.smooth_pitch_rate * config.pitch_speed * config.dt;
        self.pitch_deg = wrap_degrees(pitch).clamp(-config.max_pitch, config.max_pitch);
        self.yaw_deg = wrap_degrees(self.yaw_deg + self.smooth_yaw_rate * config.yaw_speed * config.dt);

        force
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_deg
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_deg
    }

    #[cfg(test)]
    pub(crate) fn smoothed_rates(&self) -> (f32, f32) {
        (self.smooth_pitch_rate, self.smooth_yaw_rate)
    }
}

impl Default for ForagingAgent {
    fn default() -> Self {
        Self::new()
    }
}
