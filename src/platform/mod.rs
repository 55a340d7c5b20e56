//! Moving platform tracking.
//!
//! A [`PlatformBinding`] remembers which body the character stands on, where
//! on that body it stands (an anchor in the body's local space), and how
//! fast that anchor is moving. Platforms are referenced by [`PlatformId`]
//! and resolved through a [`PlatformSource`] each tick, so a destroyed
//! platform simply stops resolving and the binding drops it.

use glam::{Affine3A, Quat, Vec3};
use hashbrown::HashMap;
use log::{debug, warn};

use crate::config::{PlatformConfig, TransferMode};
use crate::constants::PLATFORM_CORRECTION_DELAY_TICKS;
use crate::vector_math::yaw_of;

/// Identifies a body the character can stand on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId(pub u64);

/// Resolves platforms to their current world pose.
pub trait PlatformSource {
    /// World pose of `id`, or `None` if it no longer exists.
    fn pose(&self, id: PlatformId) -> Option<Affine3A>;
}

impl<P: PlatformSource + ?Sized> PlatformSource for &P {
    fn pose(&self, id: PlatformId) -> Option<Affine3A> {
        (**self).pose(id)
    }
}

/// A world without platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatforms;

impl PlatformSource for NoPlatforms {
    fn pose(&self, _id: PlatformId) -> Option<Affine3A> {
        None
    }
}

/// Poses of the platforms in a scene, keyed by id.
///
/// # Examples
///
/// ```
/// use character_motor::platform::{PlatformId, PlatformRegistry, PlatformSource};
/// use glam::{Affine3A, Vec3};
/// let mut platforms = PlatformRegistry::default();
/// platforms.insert(PlatformId(1), Affine3A::from_translation(Vec3::X));
/// assert!(platforms.pose(PlatformId(1)).is_some());
/// platforms.remove(PlatformId(1));
/// assert!(platforms.pose(PlatformId(1)).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    poses: HashMap<PlatformId, Affine3A>,
}

impl PlatformRegistry {
    /// Adds or replaces a platform.
    pub fn insert(&mut self, id: PlatformId, pose: Affine3A) {
        self.poses.insert(id, pose);
    }

    /// Moves an existing platform. Returns `false` if it is unknown.
    pub fn set_pose(&mut self, id: PlatformId, pose: Affine3A) -> bool {
        self.poses.get_mut(&id).map_or(false, |slot| {
            *slot = pose;
            true
        })
    }

    /// Destroys a platform.
    pub fn remove(&mut self, id: PlatformId) -> Option<Affine3A> {
        self.poses.remove(&id)
    }

    /// Number of live platforms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Whether no platforms exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl PlatformSource for PlatformRegistry {
    fn pose(&self, id: PlatformId) -> Option<Affine3A> {
        self.poses.get(&id).copied()
    }
}

/// What to do with the platform velocity after landing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LandingCorrection {
    /// Nothing to subtract.
    None,
    /// Subtract this velocity now.
    Immediate(Vec3),
    /// The platform is freshly bound; the subtraction is scheduled.
    Deferred,
}

/// What the latest sweep stood on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepGround {
    Untouched,
    Static,
    Platform(PlatformId),
}

/// A velocity subtraction waiting for a trustworthy platform estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCorrection {
    platform: PlatformId,
    ticks_remaining: u8,
}

fn rotation_of(pose: &Affine3A) -> Quat {
    let (_scale, rotation, _translation) = pose.to_scale_rotation_translation();
    rotation
}

/// The character's relationship with the platform it rides.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformBinding {
    config: PlatformConfig,
    active: Option<PlatformId>,
    hit_this_tick: SweepGround,
    local_point: Vec3,
    global_point: Vec3,
    local_rotation: Quat,
    global_rotation: Quat,
    last_pose: Affine3A,
    velocity: Vec3,
    newly_bound: bool,
    pending: Option<PendingCorrection>,
}

impl PlatformBinding {
    /// Creates an unbound tracker.
    #[must_use]
    pub const fn new(config: PlatformConfig) -> Self {
        Self {
            config,
            active: None,
            hit_this_tick: SweepGround::Untouched,
            local_point: Vec3::ZERO,
            global_point: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            global_rotation: Quat::IDENTITY,
            last_pose: Affine3A::IDENTITY,
            velocity: Vec3::ZERO,
            newly_bound: false,
            pending: None,
        }
    }

    /// The platform currently ridden.
    #[must_use]
    pub const fn active(&self) -> Option<PlatformId> {
        self.active
    }

    /// Estimated world velocity of the anchor point.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Whether the binding was made since the last velocity update.
    #[must_use]
    pub const fn is_newly_bound(&self) -> bool {
        self.newly_bound
    }

    /// Whether a landing correction is waiting.
    #[must_use]
    pub const fn has_pending_correction(&self) -> bool {
        self.pending.is_some()
    }

    /// The platform settings in force.
    #[must_use]
    pub const fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Whether the character should be carried by the platform this tick.
    #[must_use]
    pub fn carries(&self, grounded: bool) -> bool {
        self.config.enabled
            && (grounded || self.config.movement_transfer == TransferMode::PermaLocked)
            && self.active.is_some()
    }

    /// Forgets the active platform and any pending correction.
    pub fn unbind(&mut self) {
        if let Some(id) = self.active.take() {
            debug!("platform binding to {id:?} dropped");
        }
        self.velocity = Vec3::ZERO;
        self.newly_bound = false;
        self.pending = None;
    }

    /// Refreshes the velocity estimate. Runs once per physics tick, before
    /// integration.
    ///
    /// The first update after binding only snapshots the pose, so a fresh
    /// binding reports zero velocity instead of a spike.
    pub fn update_velocity(&mut self, dt: f32, platforms: &impl PlatformSource) {
        if !self.config.enabled {
            return;
        }
        let Some(id) = self.active else {
            self.velocity = Vec3::ZERO;
            return;
        };
        let Some(pose) = platforms.pose(id) else {
            warn!("bound platform {id:?} no longer exists");
            self.unbind();
            return;
        };
        if !self.newly_bound && dt > 0.0 {
            self.velocity = (pose.transform_point3(self.local_point)
                - self.last_pose.transform_point3(self.local_point))
                / dt;
        }
        self.last_pose = pose;
        self.newly_bound = false;
    }

    /// Counts down a pending landing correction.
    ///
    /// Returns the velocity to subtract once the delay has elapsed. The
    /// correction is silently cancelled if the character is airborne or has
    /// moved to a different platform.
    pub fn advance_pending(&mut self, grounded: bool) -> Option<Vec3> {
        let mut pending = self.pending.take()?;
        if !grounded || self.active != Some(pending.platform) {
            debug!("landing correction for {:?} cancelled", pending.platform);
            return None;
        }
        pending.ticks_remaining = pending.ticks_remaining.saturating_sub(1);
        if pending.ticks_remaining == 0 {
            debug!(
                "landing correction for {:?} applied: {}",
                pending.platform, self.velocity
            );
            return Some(self.velocity);
        }
        self.pending = Some(pending);
        None
    }

    /// Clears the body recorded by the previous sweep.
    pub fn begin_sweep(&mut self) {
        self.hit_this_tick = SweepGround::Untouched;
    }

    /// Records the body under an accepted ground contact; `None` is ground
    /// that cannot move.
    pub fn record_hit(&mut self, body: Option<PlatformId>) {
        self.hit_this_tick = body.map_or(SweepGround::Static, SweepGround::Platform);
    }

    /// Binds to the body stood on this tick if it differs from the active
    /// one. Standing on static ground releases the binding; touching no
    /// ground at all keeps it, so airborne characters stay attached.
    pub fn rebind_if_changed(
        &mut self,
        platforms: &impl PlatformSource,
        anchor: Vec3,
        orientation: Quat,
    ) {
        if !self.config.enabled {
            return;
        }
        let id = match self.hit_this_tick {
            SweepGround::Untouched => return,
            SweepGround::Static => {
                if self.active.is_some() {
                    self.unbind();
                }
                return;
            }
            SweepGround::Platform(id) if self.active == Some(id) => return,
            SweepGround::Platform(id) => id,
        };
        let Some(pose) = platforms.pose(id) else {
            return;
        };
        debug!("bound to platform {id:?}");
        self.active = Some(id);
        self.last_pose = pose;
        self.newly_bound = true;
        self.velocity = Vec3::ZERO;
        self.pending = None;
        self.capture(&pose, anchor, orientation);
    }

    /// Displacement and yaw the platform imposed since the anchor was last
    /// captured.
    ///
    /// Only the rotation about the world up axis is reported so a tilting
    /// platform never rolls or pitches the character. Returns `None` when
    /// the active platform has disappeared, after dropping the binding.
    pub fn carried_motion(&mut self, platforms: &impl PlatformSource) -> Option<(Vec3, f32)> {
        let id = self.active?;
        let Some(pose) = platforms.pose(id) else {
            warn!("bound platform {id:?} no longer exists");
            self.unbind();
            return None;
        };
        let displacement = pose.transform_point3(self.local_point) - self.global_point;
        let new_rotation = rotation_of(&pose) * self.local_rotation;
        let yaw = yaw_of(new_rotation * self.global_rotation.inverse());
        Some((displacement, yaw))
    }

    /// Re-anchors the character on the active platform at the end of a tick.
    pub fn capture_anchor(
        &mut self,
        platforms: &impl PlatformSource,
        anchor: Vec3,
        orientation: Quat,
    ) {
        let Some(id) = self.active else {
            return;
        };
        match platforms.pose(id) {
            Some(pose) => self.capture(&pose, anchor, orientation),
            None => self.unbind(),
        }
    }

    fn capture(&mut self, pose: &Affine3A, anchor: Vec3, orientation: Quat) {
        self.global_point = anchor;
        self.local_point = pose.inverse().transform_point3(anchor);
        self.global_rotation = orientation;
        self.local_rotation = rotation_of(pose).inverse() * orientation;
    }

    /// Decides how the platform velocity is removed after landing.
    ///
    /// Velocity is only exchanged under the transfer modes. A platform bound
    /// this very tick has no reliable estimate yet, so the subtraction is
    /// scheduled for a later tick instead.
    pub fn on_landing(&mut self) -> LandingCorrection {
        if !self.config.transfers_velocity() {
            return LandingCorrection::None;
        }
        match self.active {
            Some(platform) if self.newly_bound => {
                debug!("landing correction for {platform:?} deferred");
                self.pending = Some(PendingCorrection {
                    platform,
                    ticks_remaining: PLATFORM_CORRECTION_DELAY_TICKS,
                });
                LandingCorrection::Deferred
            }
            _ => LandingCorrection::Immediate(self.velocity),
        }
    }
}
