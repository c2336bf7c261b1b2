use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvConfig {
    /// Deterministic seed for reproducible episodes.
    pub seed: u64,
    /// Training mode: enables step limits and reward shaping, disables manual freeze.
    pub training: bool,
    /// Fixed diameter of the arena, used to normalize the distance observation.
    pub arena_diameter: f32,
    /// Center of the resource area in world coordinates.
    pub area_center: [f32; 3],
    /// Simulation timestep in seconds (conventionally 1/50).
    pub dt: f32,
    /// Episode length limit in steps. Only enforced in training mode.
    pub max_episode_steps: usize,
    /// Magnitude of the movement force handed to the external physics.
    pub move_force: f32,
    /// Pitch integration speed in degrees per second at full rate.
    pub pitch_speed: f32,
    /// Yaw integration speed in degrees per second at full rate.
    pub yaw_speed: f32,
    /// Absolute pitch clamp in degrees, preventing inversion.
    pub max_pitch: f32,
    /// Maximum change of the smoothed pitch/yaw rates per second.
    pub rate_smoothing: f32,
    /// Beak tip position in the agent's local frame (+Z forward, +Y up).
    pub beak_tip_offset: [f32; 3],
    /// Maximum distance from the beak tip for a nectar contact to count.
    pub beak_contact_radius: f32,
    /// Nectar extracted per accepted contact per step.
    pub feed_quantum: f32,
    /// Base reward delta per accepted feed (training mode).
    pub base_feed_reward: f32,
    /// Maximum extra reward for feeding while aligned with the flower axis.
    pub aligned_feed_bonus: f32,
    /// Reward delta reported on boundary contact (training mode).
    pub boundary_penalty: f32,
    /// Rejection-sampling budget for spawn placement.
    pub spawn_attempts: usize,
    /// Radius of the collision probe used to test spawn candidates.
    pub probe_radius: f32,
    /// Minimum spawn distance along the flower up axis (in-front placement).
    pub spawn_front_distance_min: f32,
    /// Maximum spawn distance along the flower up axis (in-front placement).
    pub spawn_front_distance_max: f32,
    /// Minimum spawn height above the area center (free-flight placement).
    pub spawn_height_min: f32,
    /// Maximum spawn height above the area center (free-flight placement).
    pub spawn_height_max: f32,
    /// Minimum horizontal spawn radius from the area center (free-flight placement).
    pub spawn_radius_min: f32,
    /// Maximum horizontal spawn radius from the area center (free-flight placement).
    pub spawn_radius_max: f32,
    /// Absolute pitch range in degrees for free-flight spawn orientation.
    pub spawn_pitch_range: f32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            training: true,
            arena_diameter: 20.0,
            area_center: [0.0, 0.0, 0.0],
            dt: 0.02,
            max_episode_steps: 5000,
            move_force: 2.0,
            pitch_speed: 100.0,
            yaw_speed: 100.0,
            max_pitch: 80.0,
            rate_smoothing: 2.0,
            beak_tip_offset: [0.0, 0.0, 0.3],
            beak_contact_radius: 0.008,
            feed_quantum: 0.01,
            base_feed_reward: 0.01,
            aligned_feed_bonus: 0.02,
            boundary_penalty: -0.5,
            spawn_attempts: 100,
            probe_radius: 0.05,
            spawn_front_distance_min: 0.1,
            spawn_front_distance_max: 0.2,
            spawn_height_min: 1.2,
            spawn_height_max: 2.5,
            spawn_radius_min: 2.0,
            spawn_radius_max: 7.0,
            spawn_pitch_range: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvConfigError {
    InvalidArenaDiameter,
    InvalidTimestep,
    InvalidMaxPitch,
    NonPositiveProbeRadius,
    NonPositiveBeakContactRadius,
    NonPositiveFeedQuantum,
    ZeroSpawnAttempts,
    NegativeSpeed { name: &'static str },
    InvertedSpawnRange { name: &'static str },
}

impl fmt::Display for EnvConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvConfigError::InvalidArenaDiameter => {
                write!(f, "arena_diameter must be positive and finite")
            }
            EnvConfigError::InvalidTimestep => write!(f, "dt must be positive and finite"),
            EnvConfigError::InvalidMaxPitch => {
                write!(f, "max_pitch must be in (0, 90] degrees")
            }
            EnvConfigError::NonPositiveProbeRadius => write!(f, "probe_radius must be positive"),
            EnvConfigError::NonPositiveBeakContactRadius => {
                write!(f, "beak_contact_radius must be positive")
            }
            EnvConfigError::NonPositiveFeedQuantum => write!(f, "feed_quantum must be positive"),
            EnvConfigError::ZeroSpawnAttempts => write!(f, "spawn_attempts must be positive"),
            EnvConfigError::NegativeSpeed { name } => {
                write!(f, "{name} must not be negative")
            }
            EnvConfigError::InvertedSpawnRange { name } => {
                write!(f, "{name} range has min greater than max")
            }
        }
    }
}

impl Error for EnvConfigError {}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), EnvConfigError> {
        if !(self.arena_diameter.is_finite() && self.arena_diameter > 0.0) {
            return Err(EnvConfigError::InvalidArenaDiameter);
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(EnvConfigError::InvalidTimestep);
        }
        if !(self.max_pitch > 0.0 && self.max_pitch <= 90.0) {
            return Err(EnvConfigError::InvalidMaxPitch);
        }
        if self.probe_radius <= 0.0 {
            return Err(EnvConfigError::NonPositiveProbeRadius);
        }
        if self.beak_contact_radius <= 0.0 {
            return Err(EnvConfigError::NonPositiveBeakContactRadius);
        }
        if self.feed_quantum <= 0.0 {
            return Err(EnvConfigError::NonPositiveFeedQuantum);
        }
        if self.spawn_attempts == 0 {
            return Err(EnvConfigError::ZeroSpawnAttempts);
        }
        for (name, value) in [
            ("move_force", self.move_force),
            ("pitch_speed", self.pitch_speed),
            ("yaw_speed", self.yaw_speed),
            ("rate_smoothing", self.rate_smoothing),
        ] {
            if value < 0.0 {
                return Err(EnvConfigError::NegativeSpeed { name });
            }
        }
        for (name, min, max) in [
            (
                "spawn_front_distance",
                self.spawn_front_distance_min,
                self.spawn_front_distance_max,
            ),
            ("spawn_height", self.spawn_height_min, self.spawn_height_max),
            ("spawn_radius", self.spawn_radius_min, self.spawn_radius_max),
        ] {
            if min > max {
                return Err(EnvConfigError::InvertedSpawnRange { name });
            }
        }
        Ok(())
    }
}
