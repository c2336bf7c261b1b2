pub mod lifecycle;
pub mod metrics;
#[cfg(test)]
mod tests;

pub use metrics::*;

use crate::agent::ForagingAgent;
use crate::area::{AreaError, ResourceArea, ResourceDescriptor};
use crate::config::{EnvConfig, EnvConfigError};
use crate::resource::ResourceEvent;
use crate::spatial::SpatialQuery;
use crate::spawn::PlacementExhausted;
use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};

/// Fixed-size observation vector returned by `reset` and `complete_step`.
pub type Observation = [f32; OBSERVATION_LEN];

/// Per-step output of the episode protocol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward_delta: f32,
    pub done: bool,
}

/// What the external physics needs from the core for the coming
/// integration: a world-space force, the kinematic orientation, and
/// whether the agent's velocity should be stilled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Actuation {
    pub force: Vec3,
    pub orientation: Quat,
    pub frozen: bool,
}

/// Contact classification; the embedder maps its own collider tags onto
/// these before handing contacts to the core and drops everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactTag {
    Nectar,
    Boundary,
}

/// One overlap event reported by the external physics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactEvent {
    pub contact_id: u64,
    pub tag: ContactTag,
    /// Closest point of the other collider to the agent's sensor.
    pub closest_point: Vec3,
}

/// Post-integration state reported by the external physics for one step.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsFrame {
    pub position: Vec3,
    pub velocity: Vec3,
    pub contacts: Vec<ContactEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvInitError {
    Config(EnvConfigError),
    Registration(AreaError),
    NoResources,
}

impl fmt::Display for EnvInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvInitError::Config(e) => write!(f, "{}", e),
            EnvInitError::Registration(e) => write!(f, "{}", e),
            EnvInitError::NoResources => {
                write!(f, "at least one nectar source must be registered")
            }
        }
    }
}

impl From<EnvConfigError> for EnvInitError {
    fn from(err: EnvConfigError) -> Self {
        EnvInitError::Config(err)
    }
}

impl From<AreaError> for EnvInitError {
    fn from(err: AreaError) -> Self {
        EnvInitError::Registration(err)
    }
}

impl Error for EnvInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EnvInitError::Config(e) => Some(e),
            EnvInitError::Registration(e) => Some(e),
            EnvInitError::NoResources => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetError {
    Placement(PlacementExhausted),
}

impl fmt::Display for ResetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetError::Placement(e) => write!(f, "{}", e),
        }
    }
}

impl From<PlacementExhausted> for ResetError {
    fn from(err: PlacementExhausted) -> Self {
        ResetError::Placement(err)
    }
}

impl Error for ResetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ResetError::Placement(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The physics reported a nectar contact this core never registered.
    UnknownContact { contact_id: u64 },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::UnknownContact { contact_id } => {
                write!(
                    f,
                    "physics reported unregistered nectar contact id {contact_id}"
                )
            }
        }
    }
}

impl Error for StepError {}

/// The environment core: one foraging agent, one resource area, and the
/// episode protocol driving them. Single-threaded, fixed-timestep,
/// advanced only by an external stepper.
pub struct Environment {
    pub(crate) config: EnvConfig,
    pub(crate) area: ResourceArea,
    pub(crate) agent: ForagingAgent,
    pub(crate) obstacles: Box<dyn SpatialQuery>,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) step_index: usize,
    pub(crate) episode_index: usize,
    pub(crate) cumulative_reward: f32,
}

impl Environment {
    pub fn try_new(
        config: EnvConfig,
        descriptors: Vec<ResourceDescriptor>,
        obstacles: Box<dyn SpatialQuery>,
    ) -> Result<Self, EnvInitError> {
        config.validate()?;
        if descriptors.is_empty() {
            return Err(EnvInitError::NoResources);
        }
        let mut area = ResourceArea::new(Vec3::from_array(config.area_center));
        for descriptor in descriptors {
            area.register(descriptor)?;
        }
        let rng = ChaCha12Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            area,
            agent: ForagingAgent::new(),
            obstacles,
            rng,
            step_index: 0,
            episode_index: 0,
            cumulative_reward: 0.0,
        })
    }

    pub fn new(
        config: EnvConfig,
        descriptors: Vec<ResourceDescriptor>,
        obstacles: Box<dyn SpatialQuery>,
    ) -> Self {
        Self::try_new(config, descriptors, obstacles).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn area(&self) -> &ResourceArea {
        &self.area
    }

    pub fn agent(&self) -> &ForagingAgent {
        &self.agent
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn episode_index(&self) -> usize {
        self.episode_index
    }

    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    /// Queued visual/physics notifications since the last drain.
    pub fn drain_events(&mut self) -> Vec<ResourceEvent> {
        self.area.drain_events()
    }

    /// Suspend action decoding and request the physics to still the agent.
    /// Manual-control only; misuse during training is a programmer error.
    pub fn freeze(&mut self) {
        assert!(
            !self.config.training,
            "freeze is only valid outside training mode"
        );
        self.agent.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        assert!(
            !self.config.training,
            "unfreeze is only valid outside training mode"
        );
        self.agent.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.agent.frozen
    }
}

// Re-exported so embedders can size their buffers without reaching into
// the agent module.
pub use crate::agent::{ACTION_LEN, OBSERVATION_LEN};
