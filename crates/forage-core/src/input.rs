//! Manual-control mapping, used only outside training mode.
//!
//! This stays engine-agnostic: the window layer sets plain booleans from
//! whatever key events it receives (WASD move, E/C vertical, arrow keys
//! pitch/yaw), and `action` turns them into the same 5-float vector a
//! policy would produce.

use crate::agent::ACTION_LEN;
use glam::{Quat, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManualControls {
    /// W
    pub forward: bool,
    /// S
    pub backward: bool,
    /// A
    pub left: bool,
    /// D
    pub right: bool,
    /// E
    pub ascend: bool,
    /// C
    pub descend: bool,
    /// Up arrow
    pub pitch_up: bool,
    /// Down arrow
    pub pitch_down: bool,
    /// Left arrow
    pub yaw_left: bool,
    /// Right arrow
    pub yaw_right: bool,
}

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i8 - negative as i8) as f32
}

impl ManualControls {
    /// Build the action vector relative to the agent's current orientation,
    /// so "forward" always means where the beak points.
    pub fn action(&self, orientation: Quat) -> [f32; ACTION_LEN] {
        let movement = orientation * Vec3::Z * axis(self.forward, self.backward)
            + orientation * Vec3::X * axis(self.right, self.left)
            + orientation * Vec3::Y * axis(self.ascend, self.descend);
        let movement = movement.normalize_or_zero();

        [
            movement.x,
            movement.y,
            movement.z,
            // Positive pitch rate tilts the beak down.
            axis(self.pitch_down, self.pitch_up),
            axis(self.yaw_right, self.yaw_left),
        ]
    }
}
