//! Rejection-sampling spawn placement.
//!
//! Two candidate distributions: directly in front of a random flower (used
//! to bootstrap feeding behavior) and free flight anywhere in the arena.
//! A candidate is accepted when a small probe sphere at its position
//! touches nothing; the budget is fixed and exhaustion is fatal to the
//! episode attempt.

use crate::area::ResourceArea;
use crate::config::EnvConfig;
use crate::math::look_rotation;
use crate::resource::NectarSource;
use crate::spatial::SpatialQuery;
use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPose {
    pub position: Vec3,
    pub orientation: Quat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementExhausted {
    pub attempts: usize,
}

impl fmt::Display for PlacementExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no collision-free spawn pose found in {} attempts",
            self.attempts
        )
    }
}

impl Error for PlacementExhausted {}

/// Find a collision-free pose for the agent, or fail after the configured
/// attempt budget. Asking for an in-front pose over an empty area fails
/// immediately with zero attempts: there is no flower to stand in front of.
pub fn place(
    area: &ResourceArea,
    query: &dyn SpatialQuery,
    rng: &mut ChaCha12Rng,
    config: &EnvConfig,
    in_front_of_resource: bool,
) -> Result<SpawnPose, PlacementExhausted> {
    if in_front_of_resource && area.is_empty() {
        return Err(PlacementExhausted { attempts: 0 });
    }
    for _ in 0..config.spawn_attempts {
        let candidate = if in_front_of_resource {
            let id = match area.random_resource(rng) {
                Some(id) => id,
                None => return Err(PlacementExhausted { attempts: 0 }),
            };
            sample_in_front(area.get(id), rng, config)
        } else {
            sample_free_flight(area.center(), rng, config)
        };
        if query
            .overlap_sphere(candidate.position, config.probe_radius)
            .is_empty()
        {
            return Ok(candidate);
        }
    }
    Err(PlacementExhausted {
        attempts: config.spawn_attempts,
    })
}

/// A short distance out along the chosen flower's axis, looking back at it.
fn sample_in_front(flower: &NectarSource, rng: &mut ChaCha12Rng, config: &EnvConfig) -> SpawnPose {
    let distance = rng.random_range(config.spawn_front_distance_min..=config.spawn_front_distance_max);
    let position = flower.position() + flower.up() * distance;
    let orientation = look_rotation(flower.position() - position, Vec3::Y);
    SpawnPose {
        position,
        orientation,
    }
}

/// A random point on an annulus above the area center, at a random attitude.
fn sample_free_flight(center: Vec3, rng: &mut ChaCha12Rng, config: &EnvConfig) -> SpawnPose {
    let height = rng.random_range(config.spawn_height_min..=config.spawn_height_max);
    let radius = rng.random_range(config.spawn_radius_min..=config.spawn_radius_max);
    let azimuth = rng.random_range(-180.0f32..=180.0);
    let position = center
        + Vec3::Y * height
        + Quat::from_rotation_y(azimuth.to_radians()) * (Vec3::Z * radius);

    let pitch = rng.random_range(-config.spawn_pitch_range..=config.spawn_pitch_range);
    let yaw = rng.random_range(-180.0f32..=180.0);
    let orientation = Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), 0.0);
    SpawnPose {
        position,
        orientation,
    }
}
