//! Ground detection from sweep contacts.
//!
//! The tracker is fed every contact reported during a sweep and keeps the
//! most upward-facing qualifying normal. After the sweep the motor asks it
//! whether the character crossed between the grounded and airborne states.

use glam::Vec3;

use crate::constants::{GROUNDED_NORMAL_Y, HIT_POINT_EPSILON_SQ};
use crate::mover::Contact;

/// An edge between grounded and airborne, detected once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundTransition {
    /// Grounded last tick, airborne now.
    LeftGround,
    /// Airborne last tick, grounded now.
    Landed,
}

/// Hysteresis-filtered ground contact state.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundContactTracker {
    grounded: bool,
    ground_normal: Vec3,
    last_ground_normal: Vec3,
    hit_point: Vec3,
    last_hit_point: Option<Vec3>,
}

impl Default for GroundContactTracker {
    fn default() -> Self {
        Self::grounded()
    }
}

impl GroundContactTracker {
    /// A tracker that starts standing on flat ground.
    #[must_use]
    pub const fn grounded() -> Self {
        Self {
            grounded: true,
            ground_normal: Vec3::Y,
            last_ground_normal: Vec3::Y,
            hit_point: Vec3::ZERO,
            last_hit_point: None,
        }
    }

    /// A tracker that starts in the air.
    #[must_use]
    pub const fn airborne() -> Self {
        Self {
            grounded: false,
            ground_normal: Vec3::ZERO,
            last_ground_normal: Vec3::ZERO,
            hit_point: Vec3::ZERO,
            last_hit_point: None,
        }
    }

    /// Whether the character is standing on something.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Best ground normal of the latest sweep, or zero if none qualified.
    #[must_use]
    pub const fn ground_normal(&self) -> Vec3 {
        self.ground_normal
    }

    /// Ground normal kept from the previous sweep.
    #[must_use]
    pub const fn last_ground_normal(&self) -> Vec3 {
        self.last_ground_normal
    }

    /// Point of the latest accepted ground contact.
    #[must_use]
    pub const fn hit_point(&self) -> Vec3 {
        self.hit_point
    }

    /// Point of the accepted ground contact before the latest sweep.
    #[must_use]
    pub const fn last_hit_point(&self) -> Option<Vec3> {
        self.last_hit_point
    }

    /// Whether the ground normal is too steep to walk on, given the cosine
    /// of the slope limit.
    #[must_use]
    pub fn is_too_steep(&self, steep_threshold: f32) -> bool {
        self.ground_normal.y <= steep_threshold
    }

    /// Whether the latest sweep found qualifying ground.
    #[must_use]
    pub fn has_ground_contact(&self) -> bool {
        self.ground_normal.y > GROUNDED_NORMAL_Y
    }

    /// Forces the airborne state without raising a transition, as jumps and
    /// external velocity changes do.
    pub fn leave_ground(&mut self) {
        self.grounded = false;
    }

    /// Clears the ground normal ahead of a sweep.
    pub fn begin_sweep(&mut self) {
        self.ground_normal = Vec3::ZERO;
    }

    /// Considers one contact from the running sweep. May be called any
    /// number of times per sweep.
    ///
    /// A contact qualifies when it faces upwards, faces more upwards than
    /// anything seen so far this sweep, and was hit while moving down. If it
    /// lands on the previous sweep's hit point before anything else
    /// qualified, the previous normal is reused so overlapping polygons do
    /// not make the normal chatter. Returns `true` if the contact was
    /// accepted.
    pub fn record_contact(&mut self, contact: &Contact) -> bool {
        let normal = contact.normal;
        if !(normal.y > 0.0 && normal.y > self.ground_normal.y && contact.move_direction.y < 0.0)
        {
            return false;
        }
        let near_last_hit = self
            .last_hit_point
            .is_some_and(|last| (contact.point - last).length_squared() <= HIT_POINT_EPSILON_SQ);
        let nothing_yet = self.ground_normal == Vec3::ZERO;
        self.ground_normal = if near_last_hit && nothing_yet && self.last_ground_normal != Vec3::ZERO
        {
            self.last_ground_normal
        } else {
            normal
        };
        self.hit_point = contact.point;
        true
    }

    /// Rolls the sweep results into the "previous" slots.
    pub fn finish_sweep(&mut self) {
        self.last_hit_point = Some(self.hit_point);
        self.last_ground_normal = self.ground_normal;
    }

    /// Applies the edge-triggered grounded/airborne switch.
    pub fn resolve_transition(&mut self) -> Option<GroundTransition> {
        let contact = self.has_ground_contact();
        match (self.grounded, contact) {
            (true, false) => {
                self.grounded = false;
                Some(GroundTransition::LeftGround)
            }
            (false, true) => {
                self.grounded = true;
                Some(GroundTransition::Landed)
            }
            _ => None,
        }
    }
}
