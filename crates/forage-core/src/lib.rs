pub mod agent;
pub mod area;
pub mod config;
pub mod input;
pub mod math;
pub mod resource;
pub mod spatial;
pub mod spawn;
pub mod world;

pub use agent::ForagingAgent;
pub use area::{AreaError, ResourceArea, ResourceDescriptor, ResourceId};
pub use config::{EnvConfig, EnvConfigError};
pub use input::ManualControls;
pub use resource::{NectarSource, ResourceEvent};
pub use spatial::{Obstacle, ObstacleIndex, SpatialQuery};
pub use spawn::{PlacementExhausted, SpawnPose};
pub use world::{
    Actuation, ContactEvent, ContactTag, EnvInitError, Environment, Observation, PhysicsFrame,
    ResetError, StepError, StepOutcome,
};
