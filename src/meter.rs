//! Depletable, rechargeable budgets gating time-limited abilities.
//!
//! Sprint stamina, jetpack fuel and dashpack fuel share one implementation:
//! a [`ResourceMeter`] that drains while its ability is engaged, refills
//! while idle, and refuses to re-engage until a cooldown has elapsed.

use crate::events::MotorEvent;

/// The abilities backed by a [`ResourceMeter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    /// Sprint stamina.
    Sprint,
    /// Jetpack fuel.
    Jetpack,
    /// Dashpack fuel.
    Dashpack,
}

impl Ability {
    /// Event announcing that the ability engaged.
    #[must_use]
    pub const fn start_event(self) -> MotorEvent {
        match self {
            Self::Sprint => MotorEvent::SprintStart,
            Self::Jetpack => MotorEvent::JetpackStart,
            Self::Dashpack => MotorEvent::DashpackStart,
        }
    }

    /// Event announcing that the ability disengaged.
    #[must_use]
    pub const fn stop_event(self) -> MotorEvent {
        match self {
            Self::Sprint => MotorEvent::SprintStop,
            Self::Jetpack => MotorEvent::JetpackStop,
            Self::Dashpack => MotorEvent::DashpackStop,
        }
    }
}

/// What a [`ResourceMeter::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterTick {
    /// The ability is engaged and its effect applies this tick.
    Draining,
    /// The ability just disengaged; the stop event is due.
    Stopped,
    /// The ability is idle and the budget refilled.
    Recharging,
}

/// A bounded budget with a recharge rate and an activation cooldown.
///
/// `current` always stays within `[0, max]`.
///
/// # Examples
///
/// ```
/// use character_motor::meter::{Ability, MeterTick, ResourceMeter};
/// let mut fuel = ResourceMeter::new(Ability::Jetpack, 4.0, 1.0, 1.0);
/// assert!(fuel.try_activate(0.0, true));
/// assert_eq!(fuel.tick(0.5, true, 0.5), MeterTick::Draining);
/// assert_eq!(fuel.current(), 3.5);
/// assert_eq!(fuel.tick(0.5, false, 0.5), MeterTick::Stopped);
/// assert_eq!(fuel.tick(0.5, false, 0.5), MeterTick::Recharging);
/// assert_eq!(fuel.current(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMeter {
    ability: Ability,
    current: f32,
    max: f32,
    recharge_rate: f32,
    cooldown: f32,
    last_activation: Option<f32>,
    active: bool,
}

impl ResourceMeter {
    /// Creates a full, idle meter.
    #[must_use]
    pub fn new(ability: Ability, max: f32, recharge_rate: f32, cooldown: f32) -> Self {
        let max = max.max(0.0);
        Self {
            ability,
            current: max,
            max,
            recharge_rate,
            cooldown,
            last_activation: None,
            active: false,
        }
    }

    /// The ability this meter gates.
    #[must_use]
    pub const fn ability(&self) -> Ability {
        self.ability
    }

    /// Remaining budget.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Capacity.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Remaining budget as a share of capacity, for gauges.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Whether the ability is engaged.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Clock time of the most recent activation.
    #[must_use]
    pub const fn last_activation(&self) -> Option<f32> {
        self.last_activation
    }

    /// Whether the cooldown has elapsed and enough budget remains to engage.
    ///
    /// The budget must exceed one second's worth of recharge, so a meter
    /// that has only just started refilling cannot flicker back on.
    #[must_use]
    pub fn is_ready(&self, now: f32) -> bool {
        let cooled = self
            .last_activation
            .map_or(true, |last| now - last >= self.cooldown);
        cooled && self.current > self.recharge_rate
    }

    /// Engages the ability if it is idle, ready, and `gate_open` holds.
    ///
    /// `gate_open` carries the mode-specific condition, such as being
    /// airborne for the jetpack. Returns `true` when the ability engaged;
    /// the caller announces [`Ability::start_event`].
    pub fn try_activate(&mut self, now: f32, gate_open: bool) -> bool {
        if self.active || !gate_open || !self.is_ready(now) {
            return false;
        }
        self.active = true;
        self.last_activation = Some(now);
        true
    }

    /// Advances the meter by one tick.
    ///
    /// While engaged and `held` with budget left, `drain` is removed.
    /// Otherwise an engaged meter disengages, and an idle meter recharges by
    /// `recharge_rate * dt`.
    pub fn tick(&mut self, dt: f32, held: bool, drain: f32) -> MeterTick {
        if self.active {
            if self.current > 0.0 && held {
                self.current = (self.current - drain.max(0.0)).clamp(0.0, self.max);
                MeterTick::Draining
            } else {
                self.active = false;
                MeterTick::Stopped
            }
        } else {
            self.current = (self.current + self.recharge_rate * dt).clamp(0.0, self.max);
            MeterTick::Recharging
        }
    }

    /// Disengages immediately. Returns `true` if the ability was engaged, in
    /// which case the caller announces [`Ability::stop_event`]. Calling it on
    /// an idle meter does nothing.
    pub fn force_stop(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const DT: f32 = 0.02;

    #[test]
    fn starts_full_and_idle() {
        let meter = ResourceMeter::new(Ability::Sprint, 4.0, 1.0, 0.5);
        assert_eq!(meter.current(), 4.0);
        assert!(!meter.is_active());
        assert_eq!(meter.fraction(), 1.0);
    }

    #[test]
    fn jetpack_fuel_drains_then_clamps_at_capacity() {
        let mut fuel = ResourceMeter::new(Ability::Jetpack, 4.0, 1.0, 1.0);
        assert!(fuel.try_activate(0.0, true));
        for _ in 0..100 {
            assert_eq!(fuel.tick(DT, true, DT), MeterTick::Draining);
        }
        assert_relative_eq!(fuel.current(), 2.0, epsilon = 1e-4);

        for _ in 0..150 {
            fuel.tick(DT, false, DT);
        }
        assert_eq!(fuel.current(), 4.0);
    }

    #[test]
    fn exhausted_meter_stops_and_never_goes_negative() {
        let mut meter = ResourceMeter::new(Ability::Dashpack, 0.05, 0.01, 0.0);
        assert!(meter.try_activate(0.0, true));
        assert_eq!(meter.tick(DT, true, 0.04), MeterTick::Draining);
        assert_eq!(meter.tick(DT, true, 0.04), MeterTick::Draining);
        assert_eq!(meter.current(), 0.0);
        assert_eq!(meter.tick(DT, true, 0.04), MeterTick::Stopped);
        assert!(!meter.is_active());
    }

    #[rstest]
    #[case::before_cooldown(0.4, false)]
    #[case::at_cooldown(0.5, true)]
    #[case::after_cooldown(0.9, true)]
    fn cooldown_gates_reactivation(#[case] retry_at: f32, #[case] expected: bool) {
        let mut meter = ResourceMeter::new(Ability::Sprint, 4.0, 1.0, 0.5);
        assert!(meter.try_activate(0.0, true));
        meter.tick(DT, false, 0.0);
        assert_eq!(meter.try_activate(retry_at, true), expected);
    }

    #[test]
    fn closed_gate_blocks_activation() {
        let mut meter = ResourceMeter::new(Ability::Jetpack, 4.0, 1.0, 0.0);
        assert!(!meter.try_activate(0.0, false));
        assert!(meter.last_activation().is_none());
    }

    #[test]
    fn low_budget_blocks_activation() {
        let mut meter = ResourceMeter::new(Ability::Jetpack, 4.0, 1.0, 0.0);
        assert!(meter.try_activate(0.0, true));
        meter.tick(DT, true, 3.5);
        meter.tick(DT, false, 0.0);
        assert!(meter.current() <= 1.0);
        assert!(!meter.try_activate(1.0, true));
    }

    #[test]
    fn force_stop_is_idempotent() {
        let mut meter = ResourceMeter::new(Ability::Dashpack, 4.0, 1.0, 0.0);
        assert!(!meter.force_stop());
        assert!(meter.try_activate(0.0, true));
        assert!(meter.force_stop());
        assert!(!meter.force_stop());
    }

    #[test]
    fn arbitrary_sequences_stay_in_bounds() {
        let mut meter = ResourceMeter::new(Ability::Sprint, 3.0, 2.5, 0.1);
        let mut now = 0.0;
        for step in 0_u32..2_000 {
            now += DT;
            let held = step % 7 < 4;
            if held {
                meter.try_activate(now, true);
            }
            let drain = f32::from(u8::try_from(step % 13).unwrap_or(0)) * 0.05;
            meter.tick(DT, held, drain);
            assert!((0.0..=meter.max()).contains(&meter.current()));
        }
    }

    #[rstest]
    #[case(Ability::Sprint, MotorEvent::SprintStart, MotorEvent::SprintStop)]
    #[case(Ability::Jetpack, MotorEvent::JetpackStart, MotorEvent::JetpackStop)]
    #[case(Ability::Dashpack, MotorEvent::DashpackStart, MotorEvent::DashpackStop)]
    fn abilities_map_to_events(
        #[case] ability: Ability,
        #[case] start: MotorEvent,
        #[case] stop: MotorEvent,
    ) {
        assert_eq!(ability.start_event(), start);
        assert_eq!(ability.stop_event(), stop);
    }
}
