//! Piecewise-linear speed calibration.
//!
//! A gear motor's shaft speed is not proportional to PWM duty, so a raw
//! command produces lurching low-end response. [`Calibration`] holds the
//! inverse of the measured response curve as a small set of linear segments;
//! [`Calibration::linearize`] distorts each command by the inverse curve so
//! the mechanics distort it back to a straight line.

use serde::{Deserialize, Serialize};

/// Number of segment slots in a calibration table.
pub const SEGMENT_CAPACITY: usize = 4;

/// Errors surfaced while installing or fetching calibration segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The index does not name a slot in the fixed table.
    IndexOutOfRange { index: usize },
    /// The slope is used as a divisor and must be non-zero.
    ZeroSlope { index: usize },
}

/// One linear piece of the inverse response curve.
///
/// The segment covers raw inputs strictly inside the open interval
/// `(negative_bound, positive_bound)` and maps them as
/// `(input + intercept) / slope`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinSegment {
    pub slope: f32,
    pub intercept: f32,
    pub negative_bound: i32,
    pub positive_bound: i32,
}

impl LinSegment {
    /// Whether `input` falls strictly inside this segment's interval.
    ///
    /// Both bounds are exclusive; an input equal to either bound does not
    /// match and falls through to the next segment or to passthrough.
    pub fn contains(&self, input: i32) -> bool {
        input > self.negative_bound && input < self.positive_bound
    }
}

/// Fixed-capacity table of linearization segments.
///
/// Slots start zeroed. A zeroed segment has an empty interval and can never
/// match, so an untouched table is a pure passthrough. Slots are only ever
/// overwritten, never removed, and the table permits overlapping or gapped
/// intervals: lookup scans in index order and the first match wins.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default)]
    segments: [LinSegment; SEGMENT_CAPACITY],
}

impl Calibration {
    /// Empty table; every input passes through unmodified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or overwrite the segment at `index`.
    ///
    /// Rejects out-of-range slots and zero slopes; interval sanity is the
    /// caller's responsibility (an inverted interval simply never matches).
    pub fn set_segment(
        &mut self,
        index: usize,
        slope: f32,
        intercept: f32,
        negative_bound: i32,
        positive_bound: i32,
    ) -> Result<(), CalibrationError> {
        if index >= SEGMENT_CAPACITY {
            return Err(CalibrationError::IndexOutOfRange { index });
        }
        if slope == 0.0 {
            return Err(CalibrationError::ZeroSlope { index });
        }
        self.segments[index] = LinSegment {
            slope,
            intercept,
            negative_bound,
            positive_bound,
        };
        Ok(())
    }

    /// Segment currently stored at `index`.
    pub fn segment(&self, index: usize) -> Result<LinSegment, CalibrationError> {
        self.segments
            .get(index)
            .copied()
            .ok_or(CalibrationError::IndexOutOfRange { index })
    }

    /// Apply the inverse transfer curve to a raw speed command.
    ///
    /// Scans segments in index order and applies the first whose open
    /// interval contains `input`; with no match the input passes through
    /// unmodified. The affine transform truncates toward zero rather than
    /// rounding — calibration tables are measured against this exact
    /// transform, so the truncation is part of the contract.
    pub fn linearize(&self, input: i32) -> i32 {
        for segment in &self.segments {
            if segment.contains(input) {
                return ((input as f32 + segment.intercept) / segment.slope) as i32;
            }
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_is_passthrough() {
        let cal = Calibration::new();
        for input in [-300, -255, -1, 0, 1, 30, 255, 300] {
            assert_eq!(cal.linearize(input), input);
        }
    }

    #[test]
    fn affine_transform_applies_inside_interval() {
        let mut cal = Calibration::new();
        cal.set_segment(0, 2.0, 10.0, -300, 300).unwrap();
        // (50 + 10) / 2 = 30
        assert_eq!(cal.linearize(50), 30);
        // (-70 + 10) / 2 = -30
        assert_eq!(cal.linearize(-70), -30);
    }

    #[test]
    fn bounds_are_exclusive() {
        let mut cal = Calibration::new();
        cal.set_segment(0, 1.0, 0.0, 0, 100).unwrap();
        // Inputs equal to a bound match nothing and pass through.
        assert_eq!(cal.linearize(0), 0);
        assert_eq!(cal.linearize(100), 100);
        assert_eq!(cal.linearize(1), 1);
        assert_eq!(cal.linearize(99), 99);
    }

    #[test]
    fn first_matching_segment_wins() {
        let mut cal = Calibration::new();
        cal.set_segment(0, 2.0, 0.0, -100, 100).unwrap();
        cal.set_segment(1, 4.0, 0.0, -100, 100).unwrap();
        // Both segments cover 40; index 0 applies.
        assert_eq!(cal.linearize(40), 20);
    }

    #[test]
    fn transform_truncates_toward_zero() {
        let mut cal = Calibration::new();
        cal.set_segment(0, 4.0, 1.0, -300, 300).unwrap();
        // (50 + 1) / 4 = 12.75 -> 12
        assert_eq!(cal.linearize(50), 12);
        // (-51 + 1) / 4 = -12.5 -> -12, not -13
        assert_eq!(cal.linearize(-51), -12);
    }

    #[test]
    fn set_segment_rejects_bad_index() {
        let mut cal = Calibration::new();
        assert_eq!(
            cal.set_segment(SEGMENT_CAPACITY, 1.0, 0.0, -10, 10),
            Err(CalibrationError::IndexOutOfRange {
                index: SEGMENT_CAPACITY
            })
        );
        assert_eq!(
            cal.segment(SEGMENT_CAPACITY),
            Err(CalibrationError::IndexOutOfRange {
                index: SEGMENT_CAPACITY
            })
        );
    }

    #[test]
    fn set_segment_rejects_zero_slope() {
        let mut cal = Calibration::new();
        assert_eq!(
            cal.set_segment(0, 0.0, 5.0, -10, 10),
            Err(CalibrationError::ZeroSlope { index: 0 })
        );
        // Table is untouched after the rejection.
        assert_eq!(cal.segment(0).unwrap(), LinSegment::default());
    }

    #[test]
    fn segments_can_be_overwritten() {
        let mut cal = Calibration::new();
        cal.set_segment(0, 2.0, 0.0, -100, 100).unwrap();
        cal.set_segment(0, 5.0, 0.0, -100, 100).unwrap();
        assert_eq!(cal.linearize(50), 10);
        assert_eq!(cal.segment(0).unwrap().slope, 5.0);
    }

    #[test]
    fn zeroed_slots_never_match() {
        let mut cal = Calibration::new();
        // Only slot 2 populated; zeroed slots 0 and 1 are scanned first but
        // their empty (0, 0) interval matches nothing.
        cal.set_segment(2, 2.0, 0.0, -100, 100).unwrap();
        assert_eq!(cal.linearize(50), 25);
    }
}
