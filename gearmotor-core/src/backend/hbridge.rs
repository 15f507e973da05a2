//! Discrete-pin H-bridge backend.
//!
//! Drives a motor through two digital direction lines and one PWM line, the
//! wiring used by L298-style bridges:
//!
//! | PIN1 | PIN2 | Motor state |
//! |------|------|-------------|
//! | H    | L    | Forward     |
//! | L    | H    | Reverse     |
//!
//! The PWM line carries the magnitude; the bridge's stopped state is the
//! forward pin pattern with zero duty.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use super::{Direction, MotorBackend};

/// Speed commands are full scale at 255; the PWM pin's native range is
/// reached through `set_duty_cycle_fraction`.
const DUTY_SCALE: u16 = 255;

/// Errors from the underlying pin HAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HBridgeError<DE, PE> {
    /// A direction pin write failed.
    Pin(DE),
    /// The PWM peripheral rejected a duty update.
    Pwm(PE),
}

/// H-bridge backend over two direction pins and a PWM pin.
///
/// Both direction pins must come from the same HAL so their error types
/// match; the PWM pin may be a different peripheral.
pub struct HBridgeMotor<P1, P2, PWM> {
    pin1: P1,
    pin2: P2,
    pwm: PWM,
}

impl<P1, P2, PWM> HBridgeMotor<P1, P2, PWM> {
    /// Wrap already-configured output pins. No pin is driven until
    /// [`MotorBackend::init`] runs.
    pub fn new(pin1: P1, pin2: P2, pwm: PWM) -> Self {
        Self { pin1, pin2, pwm }
    }

    /// Give the pins back, e.g. to reconfigure or power down the peripheral.
    pub fn release(self) -> (P1, P2, PWM) {
        (self.pin1, self.pin2, self.pwm)
    }
}

impl<P1, P2, PWM, DE> MotorBackend for HBridgeMotor<P1, P2, PWM>
where
    P1: OutputPin<Error = DE>,
    P2: OutputPin<Error = DE>,
    PWM: SetDutyCycle,
{
    type Error = HBridgeError<DE, PWM::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.stop()
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        match direction {
            Direction::Forward => {
                self.pin2.set_low().map_err(HBridgeError::Pin)?;
                self.pin1.set_high().map_err(HBridgeError::Pin)
            }
            Direction::Reverse => {
                self.pin1.set_low().map_err(HBridgeError::Pin)?;
                self.pin2.set_high().map_err(HBridgeError::Pin)
            }
            // Zero magnitude stops the motor; the bridge keeps its last
            // direction lines rather than glitching them.
            Direction::Stop => Ok(()),
        }
    }

    fn set_magnitude(&mut self, duty: u8) -> Result<(), Self::Error> {
        self.pwm
            .set_duty_cycle_fraction(u16::from(duty), DUTY_SCALE)
            .map_err(HBridgeError::Pwm)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.pin1.set_high().map_err(HBridgeError::Pin)?;
        self.pin2.set_low().map_err(HBridgeError::Pin)?;
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(HBridgeError::Pwm)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::pwm::ErrorType;

    use super::*;

    // Mock pins with no hardware dependencies, recording the last state.
    #[derive(Debug, Default)]
    struct MockPin {
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MockPwm {
        duty: u16,
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            255
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    fn bridge() -> HBridgeMotor<MockPin, MockPin, MockPwm> {
        HBridgeMotor::new(MockPin::default(), MockPin::default(), MockPwm::default())
    }

    #[test]
    fn init_leaves_motor_stopped() {
        let mut motor = bridge();
        motor.init().unwrap();
        assert!(motor.pin1.high);
        assert!(!motor.pin2.high);
        assert_eq!(motor.pwm.duty, 0);
    }

    #[test]
    fn forward_and_reverse_pin_patterns() {
        let mut motor = bridge();
        motor.set_direction(Direction::Forward).unwrap();
        assert!(motor.pin1.high);
        assert!(!motor.pin2.high);

        motor.set_direction(Direction::Reverse).unwrap();
        assert!(!motor.pin1.high);
        assert!(motor.pin2.high);
    }

    #[test]
    fn stop_direction_leaves_pins_alone() {
        let mut motor = bridge();
        motor.set_direction(Direction::Reverse).unwrap();
        motor.set_direction(Direction::Stop).unwrap();
        // Still the reverse pattern; only the duty goes to zero on this path.
        assert!(!motor.pin1.high);
        assert!(motor.pin2.high);
    }

    #[test]
    fn magnitude_maps_onto_pwm_range() {
        let mut motor = bridge();
        motor.set_magnitude(255).unwrap();
        assert_eq!(motor.pwm.duty, 255);
        motor.set_magnitude(30).unwrap();
        assert_eq!(motor.pwm.duty, 30);
        motor.set_magnitude(0).unwrap();
        assert_eq!(motor.pwm.duty, 0);
    }

    #[test]
    fn stop_forces_idle_wiring_state() {
        let mut motor = bridge();
        motor.set_direction(Direction::Reverse).unwrap();
        motor.set_magnitude(200).unwrap();
        motor.stop().unwrap();
        assert!(motor.pin1.high);
        assert!(!motor.pin2.high);
        assert_eq!(motor.pwm.duty, 0);
    }
}
