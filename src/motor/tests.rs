//! Tests for the per-tick integration order, jumps, packs and platforms.

use super::*;
use crate::config::{DashpackConfig, JetpackConfig, MovementConfig, PlatformConfig, TransferMode};
use crate::events::EventLog;
use crate::mover::{Contact, PlaneMover};
use crate::platform::{NoPlatforms, PlatformId, PlatformRegistry};
use approx::assert_relative_eq;
use glam::Affine3A;
use rstest::rstest;

const DT: f32 = 0.02;

type TestMotor = CharacterMotor<PlaneMover, EventLog>;

fn motor_with(config: MotorConfig, mover: PlaneMover) -> TestMotor {
    CharacterMotor::new(config, mover, EventLog::new()).expect("valid config")
}

fn standing() -> TestMotor {
    motor_with(MotorConfig::default(), PlaneMover::new(Vec3::ZERO))
}

fn run(motor: &mut TestMotor, ticks: usize, input: &MotorInput) {
    for _ in 0..ticks {
        motor.tick(DT, input, &NoPlatforms);
    }
}

/// Reports one fixed ground normal whenever the sweep moves down, and never
/// lets the character sink.
struct SlopeMover {
    position: Vec3,
    normal: Vec3,
}

impl CollisionMover for SlopeMover {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn move_and_slide(
        &mut self,
        displacement: Vec3,
        on_contact: &mut dyn FnMut(&Contact),
    ) -> CollisionFlags {
        self.position += horizontal(displacement);
        if displacement.y < 0.0 {
            on_contact(&Contact {
                normal: self.normal,
                point: self.position,
                move_direction: displacement.normalize_or_zero(),
                body: None,
            });
            CollisionFlags {
                below: true,
                ..CollisionFlags::none()
            }
        } else {
            CollisionFlags::none()
        }
    }

    fn teleport(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = MotorConfig::default();
    config.movement.gravity = -1.0;
    assert!(matches!(
        CharacterMotor::new(config, PlaneMover::new(Vec3::ZERO), ()),
        Err(ConfigError::Invalid { field: "movement.gravity", .. })
    ));
}

#[test]
fn standing_still_stays_put() {
    let mut motor = standing();
    run(&mut motor, 50, &MotorInput::default());
    assert!(motor.is_grounded());
    assert_eq!(motor.position(), Vec3::ZERO);
    assert_eq!(motor.velocity(), Vec3::ZERO);
    assert!(motor.events().events().is_empty());
}

#[test]
fn tapped_jump_launches_then_decays_under_gravity() {
    let mut motor = standing();
    motor.tick(DT, &MotorInput::default().with_jump(true), &NoPlatforms);
    assert_relative_eq!(motor.velocity().y, 20.0_f32.sqrt(), epsilon = 1e-3);
    assert!(motor.is_jumping());
    assert!(!motor.is_grounded());
    assert_eq!(motor.events().events(), &[MotorEvent::Jump]);

    motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    assert_relative_eq!(motor.velocity().y, 4.2721, epsilon = 1e-3);
}

#[test]
fn held_jump_cancels_gravity_during_extra_window() {
    let mut motor = standing();
    let held = MotorInput::default().with_jump(true);
    run(&mut motor, 10, &held);
    assert!(motor.jump_state().is_holding_button());
    assert_relative_eq!(motor.velocity().y, 20.0_f32.sqrt(), epsilon = 1e-3);
}

#[test]
fn jump_buffer_expires() {
    let mut motor = standing().starting_airborne();
    motor.mover_mut().teleport(Vec3::new(0.0, 3.0, 0.0));
    let held = MotorInput::default().with_jump(true);
    // Holding jump all the way down: the press is far older than the buffer.
    for _ in 0..200 {
        motor.tick(DT, &held, &NoPlatforms);
        if motor.is_grounded() {
            break;
        }
    }
    assert!(motor.is_grounded());
    motor.tick(DT, &held, &NoPlatforms);
    assert!(motor.is_grounded());
    assert!(!motor.events().contains(MotorEvent::Jump));
}

#[test]
fn super_jump_uses_its_own_height() {
    let mut motor = standing();
    motor.set_super_jump(true);
    motor.tick(DT, &MotorInput::default().with_jump(true), &NoPlatforms);
    assert_relative_eq!(motor.velocity().y, 400.0_f32.sqrt(), epsilon = 1e-2);
}

#[test]
fn uncontrolled_character_ignores_buttons() {
    let mut motor = standing();
    let input = MotorInput::default()
        .moving(Vec3::Z)
        .with_jump(true)
        .without_control();
    run(&mut motor, 5, &input);
    assert!(motor.is_grounded());
    assert_eq!(motor.position(), Vec3::ZERO);
}

#[rstest]
#[case::circle_forward(10.0, Vec3::Z, 10.0)]
#[case::circle_sideways(10.0, Vec3::X, 10.0)]
#[case::ellipse_forward(20.0, Vec3::Z, 20.0)]
#[case::ellipse_sideways(20.0, Vec3::NEG_X, 10.0)]
fn walking_settles_on_envelope_speed(
    #[case] forward: f32,
    #[case] direction: Vec3,
    #[case] expected: f32,
) {
    let config = MotorConfig {
        movement: MovementConfig {
            max_forward_speed: forward,
            ..MovementConfig::default()
        },
        ..MotorConfig::default()
    };
    let mut motor = motor_with(config, PlaneMover::new(Vec3::ZERO));
    run(&mut motor, 60, &MotorInput::default().moving(direction));
    assert_relative_eq!(horizontal(motor.velocity()).length(), expected, epsilon = 1e-3);
    assert!(motor.is_grounded());
}

#[test]
fn orientation_rotates_the_envelope() {
    let config = MotorConfig {
        movement: MovementConfig {
            max_forward_speed: 20.0,
            ..MovementConfig::default()
        },
        ..MotorConfig::default()
    };
    // Facing +X, so world +X is local forward.
    let mut motor = motor_with(config, PlaneMover::new(Vec3::ZERO))
        .with_orientation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
    run(&mut motor, 60, &MotorInput::default().moving(Vec3::X));
    assert_relative_eq!(motor.velocity().x, 20.0, epsilon = 1e-2);
}

#[test]
fn acceleration_is_limited_per_tick() {
    let mut motor = standing();
    motor.tick(DT, &MotorInput::default().moving(Vec3::Z), &NoPlatforms);
    assert_relative_eq!(motor.velocity().z, 30.0 * DT, epsilon = 1e-4);
}

#[test]
fn sprinting_starts_drains_and_stops() {
    let mut motor = standing();
    let sprinting = MotorInput::default().moving(Vec3::Z).with_sprint(true);
    run(&mut motor, 40, &sprinting);
    assert!(motor.is_sprinting());
    assert!(motor.velocity().z > 10.0);
    assert!(motor.sprint_meter().current() < motor.sprint_meter().max());

    run(&mut motor, 1, &MotorInput::default().moving(Vec3::Z));
    assert!(!motor.is_sprinting());
    assert_eq!(motor.events().count(MotorEvent::SprintStart), 1);
    assert_eq!(motor.events().count(MotorEvent::SprintStop), 1);
    assert!(motor.can_sprint(), "stamina and cooldown allow another sprint");
}

#[test]
fn steep_ground_slides_downhill() {
    let normal = Vec3::new(1.0, 0.5, 0.0).normalize();
    let mover = SlopeMover {
        position: Vec3::ZERO,
        normal,
    };
    let mut motor =
        CharacterMotor::new(MotorConfig::default(), mover, EventLog::new()).expect("valid config");
    for _ in 0..20 {
        motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    }
    assert!(motor.is_grounded());
    assert!(motor.is_sliding());
    assert!(motor.velocity().x > 1.0);
    assert!(motor.position().x > 0.0);
}

#[test]
fn disabled_sliding_keeps_standing_still() {
    let mut config = MotorConfig::default();
    config.sliding.enabled = false;
    let mover = SlopeMover {
        position: Vec3::ZERO,
        normal: Vec3::new(1.0, 0.5, 0.0).normalize(),
    };
    let mut motor = CharacterMotor::new(config, mover, EventLog::new()).expect("valid config");
    for _ in 0..20 {
        motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    }
    assert!(!motor.is_sliding());
    assert_eq!(horizontal(motor.velocity()), Vec3::ZERO);
}

#[test]
fn ceiling_ends_the_held_jump() {
    let mut motor = motor_with(MotorConfig::default(), PlaneMover::new(Vec3::ZERO).with_ceiling(2.3));
    let held = MotorInput::default().with_jump(true);
    run(&mut motor, 4, &held);
    assert!(motor.is_touching_ceiling());
    assert!(motor.is_jumping());
    assert!(!motor.jump_state().is_holding_button());
    assert_relative_eq!(motor.position().y, 0.3, epsilon = 1e-5);
}

#[test]
fn walking_off_a_ledge_falls_without_the_step_bias() {
    let mut motor = standing();
    motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    motor.mover_mut().floor_height = -5.0;
    motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    assert!(!motor.is_grounded());
    assert_eq!(motor.events().events(), &[MotorEvent::Fall]);
    // Only gravity's share of the displacement remains.
    assert_relative_eq!(motor.position().y, -10.0 * DT * DT, epsilon = 1e-5);
    assert!(motor.is_falling());
}

#[test]
fn terminal_velocity_caps_the_fall() {
    let mut motor = standing().starting_airborne();
    motor.mover_mut().teleport(Vec3::new(0.0, 100.0, 0.0));
    run(&mut motor, 200, &MotorInput::default());
    assert_relative_eq!(motor.velocity().y, -20.0, epsilon = 1e-2);
}

#[test]
fn landing_clears_jump_and_stops_packs_once() {
    let config = MotorConfig {
        jetpack: JetpackConfig {
            enabled: true,
            ..JetpackConfig::default()
        },
        dashpack: DashpackConfig {
            enabled: true,
            ..DashpackConfig::default()
        },
        ..MotorConfig::default()
    };
    let mut motor = motor_with(config, PlaneMover::new(Vec3::new(0.0, 2.0, 0.0))).starting_airborne();
    let held = MotorInput::default().with_jump(true);
    motor.tick(DT, &held, &NoPlatforms);
    // Both packs answer the same button.
    assert!(motor.is_jetpacking());
    assert!(motor.is_dashpacking());
    assert_ne!(motor.dash(), Vec3::ZERO);

    for _ in 0..200 {
        motor.tick(DT, &held, &NoPlatforms);
        if motor.is_grounded() {
            break;
        }
    }
    assert!(motor.is_grounded());
    assert!(!motor.is_jumping());
    assert!(!motor.is_jetpacking());
    assert!(!motor.is_dashpacking());
    assert_eq!(motor.dash(), Vec3::ZERO);

    run(&mut motor, 5, &held);
    let log = motor.events();
    assert_eq!(log.count(MotorEvent::JetpackStart), 1);
    assert_eq!(log.count(MotorEvent::JetpackStop), 1);
    assert_eq!(log.count(MotorEvent::DashpackStart), 1);
    assert_eq!(log.count(MotorEvent::DashpackStop), 1);
    assert_eq!(log.count(MotorEvent::Land), 1);
}

#[test]
fn jetpack_fuel_drains_and_refills_to_capacity() {
    let config = MotorConfig {
        jetpack: JetpackConfig {
            enabled: true,
            ..JetpackConfig::default()
        },
        ..MotorConfig::default()
    };
    let mut motor =
        motor_with(config, PlaneMover::new(Vec3::new(0.0, 1000.0, 0.0))).starting_airborne();
    run(&mut motor, 100, &MotorInput::default().with_jump(true));
    assert_relative_eq!(motor.jetpack_meter().current(), 2.0, epsilon = 1e-3);

    run(&mut motor, 150, &MotorInput::default());
    assert_relative_eq!(motor.jetpack_meter().current(), 4.0);
    assert_eq!(motor.events().count(MotorEvent::JetpackStop), 1);
}

#[test]
fn jetpack_needs_the_air() {
    let mut config = MotorConfig::default();
    config.jetpack.enabled = true;
    let mut motor = motor_with(config, PlaneMover::new(Vec3::ZERO));
    assert!(!motor.can_jetpack());
    motor.tick(DT, &MotorInput::default().with_jump(true), &NoPlatforms);
    // Launching this tick is not enough: the jetpack only fires while falling.
    assert!(!motor.is_jetpacking());
    assert!(motor.can_jetpack());
}

#[test]
fn jetpack_climbs_no_faster_than_its_cap() {
    let config = MotorConfig {
        jetpack: JetpackConfig {
            enabled: true,
            vertical_accel: 100.0,
            max_vertical_speed: 1.0,
            ..JetpackConfig::default()
        },
        ..MotorConfig::default()
    };
    let mut motor =
        motor_with(config, PlaneMover::new(Vec3::new(0.0, 10.0, 0.0))).starting_airborne();
    let held = MotorInput::default().with_jump(true);
    for _ in 0..50 {
        motor.tick(DT, &held, &NoPlatforms);
        assert!(motor.velocity().y <= 1.0 + 1e-3, "vy {}", motor.velocity().y);
    }
    assert!(motor.is_jetpacking());
    assert_relative_eq!(motor.velocity().y, 1.0, epsilon = 1e-3);
    assert!(motor.position().y > 10.0);
}

fn dashpack_motor(dashpack: DashpackConfig) -> TestMotor {
    let config = MotorConfig {
        dashpack: DashpackConfig {
            enabled: true,
            ..dashpack
        },
        ..MotorConfig::default()
    };
    motor_with(config, PlaneMover::new(Vec3::new(0.0, 100.0, 0.0))).starting_airborne()
}

#[test]
fn dashpack_arrests_a_fall_at_level_flight() {
    let mut motor = dashpack_motor(DashpackConfig {
        vertical_accel: 10_000.0,
        ..DashpackConfig::default()
    });
    run(&mut motor, 10, &MotorInput::default());
    assert!(motor.velocity().y < -1.0);

    let dashing = MotorInput::default().with_jump(true).looking(Vec3::X);
    for _ in 0..5 {
        motor.tick(DT, &dashing, &NoPlatforms);
        assert!(motor.is_dashpacking());
        assert_relative_eq!(motor.velocity().y, 0.0, epsilon = 1e-3);
        assert!(motor.velocity().y <= 0.0);
    }
}

#[test]
fn dashpack_adds_no_thrust_beyond_max_speed() {
    let mut motor = dashpack_motor(DashpackConfig {
        max_speed: 5.0,
        ..DashpackConfig::default()
    });
    run(&mut motor, 40, &MotorInput::default());
    assert!(motor.velocity().y < -5.0);

    motor.tick(DT, &MotorInput::default().with_jump(true).looking(Vec3::X), &NoPlatforms);
    assert!(motor.is_dashpacking());
    assert_eq!(motor.dash(), Vec3::ZERO);
    assert_relative_eq!(motor.velocity().x, 0.0);
}

#[rstest]
#[case::one_tick(1)]
#[case::five_ticks(5)]
fn dash_grows_along_the_look_direction(#[case] ticks: u8) {
    let mut motor = dashpack_motor(DashpackConfig {
        accel: 2.0,
        ..DashpackConfig::default()
    });
    let dashing = MotorInput::default().with_jump(true).looking(Vec3::X);
    run(&mut motor, usize::from(ticks), &dashing);
    assert!(motor.is_dashpacking());
    let expected = 2.0 * DT * f32::from(ticks);
    assert!(
        motor.dash().abs_diff_eq(Vec3::X * expected, 1e-5),
        "dash {}",
        motor.dash()
    );
}

#[rstest]
#[case::grounded(false, 1.0)]
#[case::airborne(true, 0.125)]
fn kickback_bypasses_acceleration(#[case] airborne: bool, #[case] expected: f32) {
    let mut motor = if airborne {
        motor_with(MotorConfig::default(), PlaneMover::new(Vec3::new(0.0, 10.0, 0.0)))
            .starting_airborne()
    } else {
        standing()
    };
    motor.kickback(Vec3::X);
    motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    assert_relative_eq!(motor.position().x, expected, epsilon = 1e-5);

    // One tick only.
    motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    assert_relative_eq!(motor.position().x, expected, epsilon = 1e-5);
}

#[test]
fn external_velocity_leaves_ground_and_notifies() {
    let mut motor = standing();
    motor.set_velocity(Vec3::new(0.0, 5.0, 2.0));
    assert!(!motor.is_grounded());
    assert_eq!(motor.velocity(), Vec3::new(0.0, 5.0, 2.0));
    assert_eq!(motor.frame_velocity(), Vec3::ZERO);
    assert_eq!(motor.events().events(), &[MotorEvent::ExternalVelocity]);

    motor.tick(DT, &MotorInput::default(), &NoPlatforms);
    assert!(motor.position().y > 0.0);
}

#[rstest]
#[case::zero(0.0)]
#[case::negative(-0.02)]
#[case::nan(f32::NAN)]
fn degenerate_dt_is_ignored(#[case] dt: f32) {
    let mut motor = standing();
    motor.tick(dt, &MotorInput::default().with_jump(true), &NoPlatforms);
    assert_eq!(motor.clock(), 0.0);
    assert!(motor.events().events().is_empty());
}

const LIFT: PlatformId = PlatformId(4);

fn lift_at(x: f32) -> Affine3A {
    Affine3A::from_translation(Vec3::new(x, 0.0, 0.0))
}

#[test]
fn landing_on_a_moving_lift_subtracts_its_velocity_two_ticks_later() {
    let mut platforms = PlatformRegistry::default();
    platforms.insert(LIFT, lift_at(0.0));
    let mover = PlaneMover::new(Vec3::ZERO).with_floor_body(LIFT);
    let mut motor = motor_with(MotorConfig::default(), mover).starting_airborne();
    motor.set_velocity(Vec3::new(5.0, 0.0, 0.0));

    let idle = MotorInput::default();
    motor.tick(DT, &idle, &platforms);
    assert!(motor.events().contains(MotorEvent::Land));
    assert_eq!(motor.platform().active(), Some(LIFT));
    assert!(motor.platform().has_pending_correction());

    platforms.set_pose(LIFT, lift_at(0.1));
    motor.tick(DT, &idle, &platforms);
    assert!(motor.velocity().x > 4.0, "correction must wait for a reliable estimate");

    platforms.set_pose(LIFT, lift_at(0.2));
    motor.tick(DT, &idle, &platforms);
    assert!(!motor.platform().has_pending_correction());
    assert_relative_eq!(motor.platform().velocity().x, 5.0, epsilon = 1e-3);
    assert!(motor.velocity().x < 0.0 && motor.velocity().x > -1.0);
}

#[test]
fn grounded_character_rides_the_lift() {
    let mut platforms = PlatformRegistry::default();
    platforms.insert(LIFT, lift_at(0.0));
    let mover = PlaneMover::new(Vec3::ZERO).with_floor_body(LIFT);
    let mut motor = motor_with(MotorConfig::default(), mover);
    let idle = MotorInput::default();
    motor.tick(DT, &idle, &platforms);
    for step in 1..=10_u8 {
        platforms.set_pose(LIFT, lift_at(f32::from(step) * 0.1));
        motor.tick(DT, &idle, &platforms);
    }
    assert_relative_eq!(motor.position().x, 1.0, epsilon = 1e-4);
    // Carried motion is not the character's own velocity.
    assert_relative_eq!(motor.velocity().x, 0.0, epsilon = 1e-4);
}

#[test]
fn turning_lift_turns_the_character_about_up_only() {
    let mut platforms = PlatformRegistry::default();
    platforms.insert(LIFT, Affine3A::IDENTITY);
    let mover = PlaneMover::new(Vec3::ZERO).with_floor_body(LIFT);
    let mut motor = motor_with(MotorConfig::default(), mover);
    let idle = MotorInput::default();
    motor.tick(DT, &idle, &platforms);
    platforms.set_pose(
        LIFT,
        Affine3A::from_quat(Quat::from_rotation_y(0.3) * Quat::from_rotation_x(0.2)),
    );
    motor.tick(DT, &idle, &platforms);
    let forward = motor.orientation() * Vec3::Z;
    assert_relative_eq!(forward.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(crate::vector_math::yaw_of(motor.orientation()), 0.3, epsilon = 1e-4);
}

#[test]
fn jumping_off_a_lift_inherits_its_velocity() {
    let mut platforms = PlatformRegistry::default();
    platforms.insert(LIFT, lift_at(0.0));
    let config = MotorConfig {
        platform: PlatformConfig {
            enabled: true,
            movement_transfer: TransferMode::InitTransfer,
        },
        ..MotorConfig::default()
    };
    let mover = PlaneMover::new(Vec3::ZERO).with_floor_body(LIFT);
    let mut motor = motor_with(config, mover);
    let idle = MotorInput::default();
    for step in 0..5_u8 {
        platforms.set_pose(LIFT, lift_at(f32::from(step) * 0.1));
        motor.tick(DT, &idle, &platforms);
    }
    platforms.set_pose(LIFT, lift_at(0.5));
    motor.tick(DT, &MotorInput::default().with_jump(true), &platforms);
    assert!(motor.is_jumping());
    assert_relative_eq!(motor.frame_velocity().x, 5.0, epsilon = 1e-3);
    assert!(motor.velocity().x > 4.0);
}
