//! A single depletable nectar source.
//!
//! Quantity lives in [0, 1]; feeding clamps exactly, never leaving a
//! negative residue. The source is created once at setup and never
//! destroyed within a session; episodes only reset it.

use crate::area::ResourceId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// RGBA shown while the source still holds nectar.
pub const FULL_COLOR: [f32; 4] = [1.0, 0.0, 0.3, 1.0];
/// RGBA shown once the source is depleted.
pub const EMPTY_COLOR: [f32; 4] = [0.5, 0.0, 1.0, 1.0];

/// Fire-and-forget notifications for the embedding visual/physics layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceEvent {
    Activated(ResourceId),
    Deactivated(ResourceId),
    ColorChanged(ResourceId, [f32; 4]),
}

#[derive(Clone, Debug)]
pub struct NectarSource {
    /// Pivot the episode tilt rotates around.
    anchor: Vec3,
    /// Position of the nectar collider relative to the anchor.
    local_offset: Vec3,
    /// Axis pointing out of the flower, relative to the anchor.
    local_up: Vec3,
    /// Derived world position for the current episode.
    pub(crate) position: Vec3,
    /// Derived world up axis for the current episode (unit length).
    pub(crate) up: Vec3,
    quantity: f32,
}

impl NectarSource {
    pub fn new(anchor: Vec3, local_offset: Vec3, local_up: Vec3) -> Self {
        let up = local_up.normalize_or(Vec3::Y);
        Self {
            anchor,
            local_offset,
            local_up: up,
            position: anchor + local_offset,
            up,
            quantity: 1.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit vector pointing out of the flower.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn quantity(&self) -> f32 {
        self.quantity
    }

    pub fn has_nectar(&self) -> bool {
        self.quantity > 0.0
    }

    /// Withdraw up to `amount` nectar and return the amount actually taken.
    /// Negative requests are treated as zero.
    pub(crate) fn feed(&mut self, amount: f32) -> f32 {
        let mut taken = self.quantity.min(amount.max(0.0));
        // Fold a sub-epsilon remainder into the withdrawal, keeping the
        // decrement and the returned amount equal.
        if taken > 0.0 && self.quantity - taken < f32::EPSILON {
            taken = self.quantity;
        }
        self.quantity -= taken;
        taken
    }

    /// Refill to full at episode start.
    pub(crate) fn reset(&mut self) {
        self.quantity = 1.0;
    }

    /// Re-derive the world pose from a fresh episode tilt.
    pub(crate) fn apply_tilt(&mut self, tilt: Quat) {
        self.position = self.anchor + tilt * self.local_offset;
        self.up = (tilt * self.local_up).normalize();
    }

    /// Current display color: blend from full to empty as nectar drains.
    pub fn color(&self) -> [f32; 4] {
        let t = self.quantity.clamp(0.0, 1.0);
        let mut color = [0.0; 4];
        for (c, (full, empty)) in color
            .iter_mut()
            .zip(FULL_COLOR.iter().zip(EMPTY_COLOR.iter()))
        {
            *c = full * t + empty * (1.0 - t);
        }
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> NectarSource {
        NectarSource::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
    }

    #[test]
    fn feed_returns_min_of_amount_and_quantity() {
        let mut s = source();
        assert!((s.feed(0.25) - 0.25).abs() < f32::EPSILON);
        assert!((s.quantity() - 0.75).abs() < 1e-6);
        assert!((s.feed(5.0) - 0.75).abs() < 1e-6);
        assert_eq!(s.quantity(), 0.0);
        assert!(!s.has_nectar());
    }

    #[test]
    fn feed_ignores_negative_amounts() {
        let mut s = source();
        assert_eq!(s.feed(-1.0), 0.0);
        assert_eq!(s.quantity(), 1.0);
    }

    #[test]
    fn repeated_feeds_reach_exactly_zero() {
        let mut s = source();
        let mut taken = 0.0;
        for _ in 0..200 {
            taken += s.feed(0.01);
        }
        assert_eq!(s.quantity(), 0.0);
        assert!((taken - 1.0).abs() < 1e-4);
    }

    #[test]
    fn feed_folds_a_subepsilon_remainder_into_the_return() {
        let mut s = source();
        let before = s.quantity();
        let taken = s.feed(1.0 - f32::EPSILON / 2.0);
        assert_eq!(taken, 1.0);
        assert_eq!(s.quantity(), 0.0);
        assert_eq!(s.quantity(), before - taken);
    }

    #[test]
    fn reset_restores_full_quantity() {
        let mut s = source();
        s.feed(1.0);
        s.reset();
        assert_eq!(s.quantity(), 1.0);
        assert!(s.has_nectar());
    }

    #[test]
    fn tilt_moves_position_and_up_axis() {
        let mut s = source();
        let tilt = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        s.apply_tilt(tilt);
        assert!(s.position().distance(Vec3::new(-1.0, 0.0, 0.0)) < 1e-5);
        assert!(s.up().distance(Vec3::new(-1.0, 0.0, 0.0)) < 1e-5);
        assert!((s.up().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn color_blends_between_full_and_empty() {
        let mut s = source();
        assert_eq!(s.color(), FULL_COLOR);
        s.feed(1.0);
        assert_eq!(s.color(), EMPTY_COLOR);
    }
}
