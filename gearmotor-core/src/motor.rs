//! The gear motor driver itself.

use tracing::{debug, trace};

use crate::backend::{Direction, MotorBackend};
use crate::calibration::{Calibration, CalibrationError, LinSegment};

/// Full-scale speed command; [`GearMotor::write`] clamps beyond this.
pub const MAX_SPEED: i32 = 255;

/// Drop-in replacement for a continuous-rotation servo, backed by a DC gear
/// motor on an arbitrary [`MotorBackend`].
///
/// A signed speed in `-255..=255` is linearized through the per-motor
/// [`Calibration`] table and split into a direction state plus a
/// magnitude-only PWM duty. Like a servo, the driver only acts while
/// attached, and sustained motion comes from calling [`write`](Self::write)
/// every control tick.
///
/// The driver is synchronous and single-owner; wrap it in external
/// synchronization if several tasks must share one motor.
pub struct GearMotor<B> {
    backend: B,
    calibration: Calibration,
    attached: bool,
}

impl<B: MotorBackend> GearMotor<B> {
    /// Wrap a backend. The motor starts detached; run [`setup`](Self::setup)
    /// once before anything else.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            calibration: Calibration::new(),
            attached: false,
        }
    }

    /// One-time hardware bring-up: initializes the backend, leaves the motor
    /// stopped and the driver attached.
    pub fn setup(&mut self) -> Result<(), B::Error> {
        debug!("bringing up motor backend");
        self.backend.init()?;
        self.attached = true;
        Ok(())
    }

    /// Re-enable [`write`](Self::write) without re-running hardware bring-up.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Disable [`write`](Self::write) and stop the motor, whatever state it
    /// was in.
    pub fn detach(&mut self) -> Result<(), B::Error> {
        self.attached = false;
        debug!("motor detached, stopping");
        self.backend.stop()
    }

    /// Current attachment state.
    pub fn attached(&self) -> bool {
        self.attached
    }

    /// Command a signed speed: 0 is stopped, 255 full ahead, -255 full
    /// reverse. Out-of-range commands are clamped, never rejected; while
    /// detached this is a complete no-op.
    pub fn write(&mut self, speed: i32) -> Result<(), B::Error> {
        if !self.attached {
            return Ok(());
        }

        let speed = self.calibration.linearize(speed);

        // Direction follows the sign of the linearized speed. The backend's
        // direction lines carry the sign, so the duty below is magnitude
        // only.
        let direction = match speed {
            s if s > 0 => Direction::Forward,
            0 => Direction::Stop,
            _ => Direction::Reverse,
        };
        self.backend.set_direction(direction)?;

        let magnitude = speed.clamp(-MAX_SPEED, MAX_SPEED).unsigned_abs() as u8;
        trace!(speed, ?direction, magnitude, "write");
        self.backend.set_magnitude(magnitude)
    }

    /// Install one linearization segment; see [`Calibration::set_segment`].
    pub fn set_segment(
        &mut self,
        index: usize,
        slope: f32,
        intercept: f32,
        negative_bound: i32,
        positive_bound: i32,
    ) -> Result<(), CalibrationError> {
        self.calibration
            .set_segment(index, slope, intercept, negative_bound, positive_bound)
    }

    /// Segment stored at `index`.
    pub fn segment(&self, index: usize) -> Result<LinSegment, CalibrationError> {
        self.calibration.segment(index)
    }

    /// Replace the whole table, e.g. one deserialized from storage.
    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
    }

    /// Consume the driver and reclaim the backend (and through it, the pins).
    pub fn into_backend(self) -> B {
        self.backend
    }
}
