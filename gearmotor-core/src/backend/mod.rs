//! Actuation backends.
//!
//! A [`GearMotor`](crate::motor::GearMotor) never touches hardware directly;
//! it drives one of these backends, selected when the motor is constructed.
//! Two wirings are supported:
//!
//! - [`hbridge`]: two discrete direction pins plus a PWM pin.
//! - [`shield`]: a motor header on a PCA9685-based driver board over I2C.
//!
//! The speed/direction logic upstream is identical for both.

pub mod hbridge;
pub mod shield;

pub use hbridge::HBridgeMotor;
pub use shield::ShieldMotor;

/// Direction state commanded alongside a PWM magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    /// Release the motor. The magnitude is always zero on this path, so
    /// pin-level backends may leave their direction lines untouched.
    Stop,
}

/// Physical drive interface for a single motor channel.
///
/// Implementations hold whatever hardware handles they need (pins, a driver
/// board channel) and are owned exclusively by one `GearMotor` for the life
/// of the instance.
pub trait MotorBackend {
    type Error;

    /// One-time hardware bring-up. Must leave the motor stopped.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Command the direction/enable state.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Command the PWM duty carrying the speed magnitude, full scale 255.
    fn set_magnitude(&mut self, duty: u8) -> Result<(), Self::Error>;

    /// Immediate stop: direction released, duty driven to zero.
    fn stop(&mut self) -> Result<(), Self::Error>;
}
