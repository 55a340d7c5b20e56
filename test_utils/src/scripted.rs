//! A collision mover that replays scripted sweep outcomes.

use std::collections::VecDeque;

use character_motor::{CollisionFlags, CollisionMover, Contact, PlatformId};
use glam::Vec3;

/// Which parts of a displacement a scripted sweep lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocking {
    /// The whole displacement is applied.
    Free,
    /// Vertical motion is stopped; horizontal motion is applied.
    Vertical,
    /// Nothing moves.
    All,
}

/// One surface a scripted sweep reports.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScriptedContact {
    normal: Vec3,
    body: Option<PlatformId>,
}

/// The outcome of a single sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    contacts: Vec<ScriptedContact>,
    blocking: Blocking,
    flags: CollisionFlags,
}

impl Sweep {
    /// Open air: no contacts, unobstructed motion.
    #[must_use]
    pub fn free() -> Self {
        Self {
            contacts: Vec::new(),
            blocking: Blocking::Free,
            flags: CollisionFlags::none(),
        }
    }

    /// Static ground with `normal` that stops vertical motion.
    #[must_use]
    pub fn ground(normal: Vec3) -> Self {
        Self::free()
            .with_contact(normal, None)
            .blocking(Blocking::Vertical)
            .with_flags(CollisionFlags {
                below: true,
                ..CollisionFlags::none()
            })
    }

    /// Flat ground belonging to `body`.
    #[must_use]
    pub fn platform(body: PlatformId) -> Self {
        let mut sweep = Self::ground(Vec3::Y);
        if let Some(contact) = sweep.contacts.first_mut() {
            contact.body = Some(body);
        }
        sweep
    }

    /// A ceiling that stops vertical motion.
    #[must_use]
    pub fn ceiling() -> Self {
        Self::free()
            .with_contact(Vec3::NEG_Y, None)
            .blocking(Blocking::Vertical)
            .with_flags(CollisionFlags {
                above: true,
                ..CollisionFlags::none()
            })
    }

    /// Adds a reported surface.
    #[must_use]
    pub fn with_contact(mut self, normal: Vec3, body: Option<PlatformId>) -> Self {
        self.contacts.push(ScriptedContact {
            normal: normal.normalize_or_zero(),
            body,
        });
        self
    }

    /// Sets what the sweep lets through.
    #[must_use]
    pub const fn blocking(mut self, blocking: Blocking) -> Self {
        self.blocking = blocking;
        self
    }

    /// Sets the reported flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: CollisionFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Replays queued [`Sweep`]s, falling back to a default once the queue runs
/// dry. Every contact is reported at the post-sweep position, moving in the
/// direction of the requested displacement.
#[derive(Debug, Clone)]
pub struct ScriptedMover {
    position: Vec3,
    queue: VecDeque<Sweep>,
    fallback: Sweep,
    requested: Vec<Vec3>,
}

impl ScriptedMover {
    /// A mover at `position` that replays `fallback` for every sweep.
    #[must_use]
    pub fn new(position: Vec3, fallback: Sweep) -> Self {
        Self {
            position,
            queue: VecDeque::new(),
            fallback,
            requested: Vec::new(),
        }
    }

    /// Queues the outcome of the next unscripted sweep.
    #[must_use]
    pub fn then(mut self, sweep: Sweep) -> Self {
        self.queue.push_back(sweep);
        self
    }

    /// Queues `sweep` on an existing mover.
    pub fn push(&mut self, sweep: Sweep) {
        self.queue.push_back(sweep);
    }

    /// Replaces the fallback outcome.
    pub fn set_fallback(&mut self, sweep: Sweep) {
        self.fallback = sweep;
    }

    /// Every displacement requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> &[Vec3] {
        &self.requested
    }
}

impl CollisionMover for ScriptedMover {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn move_and_slide(
        &mut self,
        displacement: Vec3,
        on_contact: &mut dyn FnMut(&Contact),
    ) -> CollisionFlags {
        let sweep = self
            .queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        self.requested.push(displacement);
        self.position += match sweep.blocking {
            Blocking::Free => displacement,
            Blocking::Vertical => Vec3::new(displacement.x, 0.0, displacement.z),
            Blocking::All => Vec3::ZERO,
        };
        let move_direction = displacement.normalize_or_zero();
        for scripted in &sweep.contacts {
            on_contact(&Contact {
                normal: scripted.normal,
                point: self.position,
                move_direction,
                body: scripted.body,
            });
        }
        sweep.flags
    }

    fn teleport(&mut self, offset: Vec3) {
        self.position += offset;
    }
}
