//! The resource registry: owns every nectar source, maps opaque contact
//! identifiers to sources, and is the sole mutator of nectar quantity.

use crate::resource::{NectarSource, ResourceEvent};
use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use std::collections::HashMap;
use std::{error::Error, fmt};

/// Stable handle into the area's resource list. Resources are never removed
/// within a session, so handles stay valid for its lifetime; holders must
/// still re-check `has_nectar` before acting on one.
pub type ResourceId = usize;

/// Maximum tilt applied to the x and z axes at episode reset, degrees.
const RESET_TILT_DEGREES: f32 = 5.0;

/// Setup-time description of one nectar source, replacing scene-graph
/// discovery with explicit registration.
#[derive(Clone, Copy, Debug)]
pub struct ResourceDescriptor {
    /// Pivot the episode tilt rotates around.
    pub anchor: Vec3,
    /// Nectar collider position relative to the anchor.
    pub local_offset: Vec3,
    /// Flower axis relative to the anchor.
    pub local_up: Vec3,
    /// Opaque identifier the external physics reports on contact.
    pub contact_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaError {
    DuplicateContact { contact_id: u64 },
    NotFound { contact_id: u64 },
}

impl fmt::Display for AreaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaError::DuplicateContact { contact_id } => {
                write!(f, "contact id {contact_id} is already registered")
            }
            AreaError::NotFound { contact_id } => {
                write!(f, "contact id {contact_id} was never registered")
            }
        }
    }
}

impl Error for AreaError {}

pub struct ResourceArea {
    center: Vec3,
    /// Ordered storage; iteration order is stable for reproducible
    /// random selection.
    resources: Vec<NectarSource>,
    by_contact: HashMap<u64, ResourceId>,
    events: Vec<ResourceEvent>,
}

impl ResourceArea {
    pub fn new(center: Vec3) -> Self {
        Self {
            center,
            resources: Vec::new(),
            by_contact: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, id: ResourceId) -> &NectarSource {
        &self.resources[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &NectarSource)> {
        self.resources.iter().enumerate()
    }

    /// Register one nectar source under its contact identifier.
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Result<ResourceId, AreaError> {
        if self.by_contact.contains_key(&descriptor.contact_id) {
            return Err(AreaError::DuplicateContact {
                contact_id: descriptor.contact_id,
            });
        }
        let id = self.resources.len();
        self.resources.push(NectarSource::new(
            descriptor.anchor,
            descriptor.local_offset,
            descriptor.local_up,
        ));
        self.by_contact.insert(descriptor.contact_id, id);
        Ok(id)
    }

    /// Resolve a physics contact to a resource handle. An unregistered id is
    /// an integration error; there is no fallback resource.
    pub fn lookup(&self, contact_id: u64) -> Result<ResourceId, AreaError> {
        self.by_contact
            .get(&contact_id)
            .copied()
            .ok_or(AreaError::NotFound { contact_id })
    }

    /// Episode reset: every source gets a fresh small tilt (x,z within
    /// +/-5 degrees, y within +/-180 degrees) and a full refill.
    pub fn reset_all(&mut self, rng: &mut ChaCha12Rng) {
        for id in 0..self.resources.len() {
            let x = rng.random_range(-RESET_TILT_DEGREES..=RESET_TILT_DEGREES);
            let y = rng.random_range(-180.0f32..=180.0);
            let z = rng.random_range(-RESET_TILT_DEGREES..=RESET_TILT_DEGREES);
            let tilt = Quat::from_euler(
                EulerRot::YXZ,
                y.to_radians(),
                x.to_radians(),
                z.to_radians(),
            );
            let source = &mut self.resources[id];
            source.apply_tilt(tilt);
            source.reset();
            self.events.push(ResourceEvent::Activated(id));
            self.events
                .push(ResourceEvent::ColorChanged(id, self.resources[id].color()));
        }
    }

    /// Withdraw nectar from one source and return the amount obtained.
    /// This is the only mutation path for quantity outside `reset_all`.
    pub fn feed(&mut self, id: ResourceId, amount: f32) -> f32 {
        let source = &mut self.resources[id];
        let had_nectar = source.has_nectar();
        let taken = source.feed(amount);
        if taken > 0.0 {
            self.events.push(ResourceEvent::ColorChanged(id, source.color()));
        }
        if had_nectar && !source.has_nectar() {
            self.events.push(ResourceEvent::Deactivated(id));
        }
        taken
    }

    /// Uniformly random resource, used by in-front spawn placement.
    pub fn random_resource(&self, rng: &mut ChaCha12Rng) -> Option<ResourceId> {
        if self.resources.is_empty() {
            return None;
        }
        Some(rng.random_range(0..self.resources.len()))
    }

    pub fn active_count(&self) -> usize {
        self.resources.iter().filter(|r| r.has_nectar()).count()
    }

    /// Hand the queued visual/physics notifications to the embedder.
    pub fn drain_events(&mut self) -> Vec<ResourceEvent> {
        std::mem::take(&mut self.events)
    }
}
