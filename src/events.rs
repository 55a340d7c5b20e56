//! Notifications emitted by the motor.
//!
//! The motor holds an [`EventSink`] injected at construction and calls it
//! synchronously whenever something observable happens. Sinks are
//! fire-and-forget: they cannot influence the tick that raised the event.

use std::fmt;

/// Something collaborators such as animation or audio may react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorEvent {
    /// A jump launched.
    Jump,
    /// The character touched walkable ground after being airborne.
    Land,
    /// The character lost the ground without jumping.
    Fall,
    /// Sprinting began.
    SprintStart,
    /// Sprinting ended.
    SprintStop,
    /// The jetpack fired.
    JetpackStart,
    /// The jetpack cut out.
    JetpackStop,
    /// The dashpack fired.
    DashpackStart,
    /// The dashpack cut out.
    DashpackStop,
    /// An outside system overwrote the velocity.
    ExternalVelocity,
}

impl MotorEvent {
    /// Conventional handler name for this event.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jump => "OnJump",
            Self::Land => "OnLand",
            Self::Fall => "OnFall",
            Self::SprintStart => "OnSprintStart",
            Self::SprintStop => "OnSprintStop",
            Self::JetpackStart => "OnJetpackStart",
            Self::JetpackStop => "OnJetpackStop",
            Self::DashpackStart => "OnDashpackStart",
            Self::DashpackStop => "OnDashpackStop",
            Self::ExternalVelocity => "OnExternalVelocity",
        }
    }
}

impl fmt::Display for MotorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receiver of [`MotorEvent`]s.
pub trait EventSink {
    /// Handles one event.
    fn emit(&mut self, event: MotorEvent);
}

/// Discards every event.
impl EventSink for () {
    fn emit(&mut self, _event: MotorEvent) {}
}

impl EventSink for Vec<MotorEvent> {
    fn emit(&mut self, event: MotorEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: MotorEvent) {
        (**self).emit(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: MotorEvent) {
        (**self).emit(event);
    }
}

/// Adapts a closure into an [`EventSink`].
///
/// # Examples
///
/// ```
/// use character_motor::events::{EventSink, FnSink, MotorEvent};
/// let mut landings = 0;
/// let mut sink = FnSink(|event: MotorEvent| {
///     if event == MotorEvent::Land {
///         landings += 1;
///     }
/// });
/// sink.emit(MotorEvent::Land);
/// sink.emit(MotorEvent::Jump);
/// drop(sink);
/// assert_eq!(landings, 1);
/// ```
pub struct FnSink<F>(pub F);

impl<F: FnMut(MotorEvent)> EventSink for FnSink<F> {
    fn emit(&mut self, event: MotorEvent) {
        (self.0)(event);
    }
}

/// Records events in order for later inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<MotorEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[MotorEvent] {
        &self.events
    }

    /// Number of times `event` was recorded.
    #[must_use]
    pub fn count(&self, event: MotorEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }

    /// Whether `event` was recorded at least once.
    #[must_use]
    pub fn contains(&self, event: MotorEvent) -> bool {
        self.events.contains(&event)
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&mut self) -> Vec<MotorEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: MotorEvent) {
        self.events.push(event);
    }
}
