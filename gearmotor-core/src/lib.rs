//! Continuous-rotation-servo style control of DC gear motors.
//!
//! A [`GearMotor`] lets motion-control code command an ordinary gear motor the
//! way it would a continuous-rotation servo: attach it, then `write` a signed
//! speed every control tick. The driver flattens the motor's non-linear
//! response through a piecewise-linear [`Calibration`] table and maps the
//! signed command onto a direction state plus a magnitude-only PWM duty on
//! whichever [`backend`] the motor is wired to.
//!
//! For a runnable host demo, see the `mock-rig` application.
#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod calibration;
pub mod motor;

pub use backend::{Direction, MotorBackend};
pub use calibration::{Calibration, CalibrationError, LinSegment, SEGMENT_CAPACITY};
pub use motor::{GearMotor, MAX_SPEED};
