//! Host-side rig for exercising the gear motor driver without hardware.
//!
//! Sweeps a speed command across the full range through a console-logging
//! backend, optionally with a calibration table loaded from JSON, so the
//! direction/magnitude output of the driver can be inspected tick by tick.

use std::convert::Infallible;
use std::fs;
use std::thread;
use std::time::Duration;

use clap::Parser;
use gearmotor_core::{Calibration, Direction, GearMotor, MotorBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// JSON calibration table to install before the sweep
    #[clap(long)]
    calibration: Option<String>,
    /// Sweep start speed
    #[clap(long, default_value_t = -255)]
    from: i32,
    /// Sweep end speed
    #[clap(long, default_value_t = 255)]
    to: i32,
    /// Speed increment per tick
    #[clap(long, default_value_t = 15)]
    step: i32,
    /// Tick period in milliseconds
    #[clap(long, default_value_t = 50)]
    tick_ms: u64,
}

/// Backend that reports every command on the console instead of driving
/// hardware.
struct ConsoleMotor;

impl MotorBackend for ConsoleMotor {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        info!("backend: init");
        Ok(())
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        info!("backend: direction {:?}", direction);
        Ok(())
    }

    fn set_magnitude(&mut self, duty: u8) -> Result<(), Self::Error> {
        info!("backend: duty {}", duty);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        info!("backend: stop");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts: Opts = Opts::parse();

    let mut motor = GearMotor::new(ConsoleMotor);
    motor.setup()?;

    if let Some(path) = &opts.calibration {
        let table: Calibration = serde_json::from_str(&fs::read_to_string(path)?)?;
        motor.set_calibration(table);
        info!("loaded calibration from {}", path);
    }

    let step = opts.step.max(1);
    info!(opts.from, opts.to, step, "sweeping speed");

    let mut speed = opts.from;
    while speed <= opts.to {
        motor.write(speed)?;
        thread::sleep(Duration::from_millis(opts.tick_ms));
        speed += step;
    }

    motor.detach()?;
    Ok(())
}
