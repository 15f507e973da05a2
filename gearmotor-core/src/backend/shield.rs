//! Motor driver board backend.
//!
//! Drives one motor header of a PCA9685-based driver board (the common
//! Adafruit shield layout) over a shared I2C bus. Each header uses three of
//! the chip's sixteen channels: a PWM channel for the magnitude and two
//! channels held at static levels as the H-bridge IN1/IN2 inputs.
//!
//! Boards carry four headers and are usually shared between motors: hand each
//! [`ShieldMotor`] the same `RefCell`-wrapped bus and every motor owns its own
//! controller handle.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use libm::roundf;
use pwm_pca9685::{Address, Channel, Error as PwmError, Pca9685};

use super::{Direction, MotorBackend};

/// Full-scale channel duty of the PCA9685.
const MAX_DUTY: u16 = 4095;

/// Prescale for ~1.6 kHz PWM, the rate the board's bridges are driven at.
const MOTOR_PRESCALE: u8 = 3;

/// (pwm, in1, in2) channel triple for each of the four motor headers.
const MOTOR_CHANNELS: [(Channel, Channel, Channel); 4] = [
    (Channel::C8, Channel::C10, Channel::C9),
    (Channel::C13, Channel::C11, Channel::C12),
    (Channel::C2, Channel::C4, Channel::C3),
    (Channel::C7, Channel::C5, Channel::C6),
];

/// Errors from the driver board backend.
#[derive(Debug)]
pub enum ShieldError<E> {
    /// The PWM controller rejected a command or the bus failed.
    Pwm(PwmError<E>),
    /// The board only has headers 0 through 3.
    InvalidMotor { motor: usize },
}

/// One motor header on a PCA9685 driver board.
pub struct ShieldMotor<'a, I2C> {
    pwm: Pca9685<RefCellDevice<'a, I2C>>,
    pwm_channel: Channel,
    in1: Channel,
    in2: Channel,
}

impl<'a, I2C, E> ShieldMotor<'a, I2C>
where
    I2C: I2c<Error = E>,
{
    /// Default I2C address of the driver board.
    pub const DEFAULT_ADDRESS: u8 = 0x60;

    /// Claim motor header `motor` (0..=3) on the board at `address`.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        address: u8,
        motor: usize,
    ) -> Result<Self, ShieldError<E>> {
        let (pwm_channel, in1, in2) = MOTOR_CHANNELS
            .get(motor)
            .copied()
            .ok_or(ShieldError::InvalidMotor { motor })?;
        let pwm = Pca9685::new(RefCellDevice::new(i2c_bus), Address::from(address))
            .map_err(ShieldError::Pwm)?;
        Ok(Self {
            pwm,
            pwm_channel,
            in1,
            in2,
        })
    }

    /// Drive an IN channel as a static level: full off, or on for the whole
    /// cycle.
    fn set_level(&mut self, channel: Channel, high: bool) -> Result<(), ShieldError<E>> {
        let off = if high { MAX_DUTY } else { 0 };
        self.pwm
            .set_channel_on_off(channel, 0, off)
            .map_err(ShieldError::Pwm)
    }
}

impl<'a, I2C, E> MotorBackend for ShieldMotor<'a, I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = ShieldError<E>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.pwm.enable().map_err(ShieldError::Pwm)?;
        self.pwm
            .set_prescale(MOTOR_PRESCALE)
            .map_err(ShieldError::Pwm)?;
        self.stop()
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        // The line being deasserted drops first so both inputs are never
        // high at once.
        match direction {
            Direction::Forward => {
                self.set_level(self.in2, false)?;
                self.set_level(self.in1, true)
            }
            Direction::Reverse => {
                self.set_level(self.in1, false)?;
                self.set_level(self.in2, true)
            }
            Direction::Stop => {
                self.set_level(self.in1, false)?;
                self.set_level(self.in2, false)
            }
        }
    }

    fn set_magnitude(&mut self, duty: u8) -> Result<(), Self::Error> {
        let scaled = roundf(f32::from(duty) * f32::from(MAX_DUTY) / 255.0) as u16;
        self.pwm
            .set_channel_on_off(self.pwm_channel, 0, scaled)
            .map_err(ShieldError::Pwm)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.set_direction(Direction::Stop)?;
        self.set_magnitude(0)
    }
}
