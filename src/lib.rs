#![cfg_attr(docsrs, feature(doc_cfg))]
//! Library crate providing a deterministic character motor.
//!
//! [`CharacterMotor`] turns per-tick intent ([`MotorInput`]) into motion:
//! ground locomotion on an elliptical speed envelope, sprinting, variable
//! height jumps, jetpack and dashpack thrust, sliding on steep ground and
//! riding moving platforms. Collision resolution is delegated to a
//! [`CollisionMover`] and notifications go to an [`EventSink`].
pub mod config;
pub mod constants;
pub mod curve;
pub mod events;
pub mod ground;
pub mod input;
pub mod logging;
pub mod meter;
pub mod motor;
pub mod mover;
pub mod platform;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use config::{ConfigError, MotorConfig, TransferMode};
pub use curve::{Keyframe, SpeedCurve};
pub use events::{EventLog, EventSink, FnSink, MotorEvent};
pub use ground::{GroundContactTracker, GroundTransition};
pub use input::MotorInput;
pub use logging::init as init_logging;
pub use meter::{Ability, MeterTick, ResourceMeter};
pub use motor::{CharacterMotor, JumpState};
pub use mover::{CollisionFlags, CollisionMover, Contact, PlaneMover};
pub use platform::{
    LandingCorrection, NoPlatforms, PlatformBinding, PlatformId, PlatformRegistry,
    PlatformSource,
};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust
    //! use character_motor::prelude::*;
    //! let config = MotorConfig::default();
    //! assert!(config.validate().is_ok());
    //! ```

    pub use crate::CharacterMotor;
    pub use crate::CollisionMover;
    pub use crate::EventLog;
    pub use crate::EventSink;
    pub use crate::MotorConfig;
    pub use crate::MotorEvent;
    pub use crate::MotorInput;
    pub use crate::NoPlatforms;
    pub use crate::PlaneMover;
    pub use crate::PlatformId;
    pub use crate::PlatformRegistry;
    pub use crate::PlatformSource;
}
