//! Collision-probe boundary between the core and whatever owns the scene.
//!
//! The spawn placer only needs one capability: "which colliders overlap this
//! sphere". `ObstacleIndex` is the default provider, an R*-tree of static
//! spheres queried by AABB envelope and filtered by exact distance.

use glam::Vec3;
use rstar::{RTree, RTreeObject, AABB};

/// Spatial query capability consumed by spawn placement.
pub trait SpatialQuery {
    /// Contact identifiers of every collider overlapping the given sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<u64>;
}

/// A static spherical collider.
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub center: Vec3,
    pub radius: f32,
    pub contact_id: u64,
}

impl RTreeObject for Obstacle {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        let r = Vec3::splat(self.radius);
        AABB::from_corners((self.center - r).to_array(), (self.center + r).to_array())
    }
}

/// R*-tree over static obstacles, built once via bulk load (O(n log n)).
pub struct ObstacleIndex {
    tree: RTree<Obstacle>,
}

impl ObstacleIndex {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self {
            tree: RTree::bulk_load(obstacles),
        }
    }

    pub fn empty() -> Self {
        Self { tree: RTree::new() }
    }
}

impl SpatialQuery for ObstacleIndex {
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<u64> {
        let r = Vec3::splat(radius);
        let envelope = AABB::from_corners((center - r).to_array(), (center + r).to_array());
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|o| {
                let reach = o.radius + radius;
                o.center.distance_squared(center) <= reach * reach
            })
            .map(|o| o.contact_id)
            .collect()
    }
}
