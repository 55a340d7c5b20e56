//! Headless driver that runs the character motor over a flat floor and logs
//! what it does.
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use character_motor::{
    init_logging, CharacterMotor, FnSink, MotorConfig, MotorEvent, MotorInput, NoPlatforms,
    PlaneMover,
};
use glam::Vec3;
use log::{debug, info};

/// Simulates a character on flat ground
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON motor configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 100)]
    ticks: u32,
    /// Seconds per tick
    #[arg(long, default_value_t = 0.02)]
    dt: f32,
    /// Tick at which the jump button goes down
    #[arg(long)]
    jump_at: Option<u32>,
    /// Ticks the jump button stays down
    #[arg(long, default_value_t = 1)]
    hold_jump: u32,
    /// Walk forwards the whole time
    #[arg(short, long)]
    forward: bool,
    /// Hold the sprint button the whole time
    #[arg(short, long)]
    sprint: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn input_at(&self, tick: u32) -> MotorInput {
        let jump = self
            .jump_at
            .is_some_and(|start| tick >= start && tick - start < self.hold_jump);
        let direction = if self.forward { Vec3::Z } else { Vec3::ZERO };
        MotorInput::default()
            .moving(direction)
            .with_jump(jump)
            .with_sprint(self.sprint)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "--dt must be a positive number of seconds, got {}",
        args.dt
    );

    let config = args.config.as_ref().map_or_else(
        || Ok(MotorConfig::default()),
        |path| {
            MotorConfig::from_path(path)
                .with_context(|| format!("loading motor config from {}", path.display()))
        },
    )?;
    let sink = FnSink(|event: MotorEvent| info!("{event}"));
    let mut motor = CharacterMotor::new(config, PlaneMover::new(Vec3::ZERO), sink)
        .context("motor config rejected")?;

    for tick in 0..args.ticks {
        let flags = motor.tick(args.dt, &args.input_at(tick), &NoPlatforms);
        debug!(
            "tick {tick}: position {} velocity {} grounded {} flags {flags:?}",
            motor.position(),
            motor.velocity(),
            motor.is_grounded()
        );
    }

    info!(
        "after {} ticks ({:.2}s): position {} velocity {}",
        args.ticks,
        motor.clock(),
        motor.position(),
        motor.velocity()
    );
    info!(
        "stamina {:.0}% jetpack {:.0}% dashpack {:.0}%",
        motor.sprint_meter().fraction() * 100.0,
        motor.jetpack_meter().fraction() * 100.0,
        motor.dashpack_meter().fraction() * 100.0
    );
    Ok(())
}
