//! Layout of the wheel's segments relative to the fixed pointer.
//!
//! Angles are canvas radians: 0 points east and positive angles turn
//! clockwise. The pointer sits at the top of the wheel and never moves; the
//! wheel itself turns clockwise by the spin's rotation.

use std::f64::consts::TAU;

/// Angular width of one segment on a wheel of `segments` slices.
pub fn segment_angle(segments: usize) -> f64 {
    TAU / segments as f64
}

/// Segment sitting under the pointer after the wheel turned clockwise by
/// `rotation_radians`.
pub fn segment_under_pointer(rotation_radians: f64, segments: usize) -> Option<usize> {
    if segments == 0 {
        return None;
    }
    // Clockwise offset, from the top, of the wheel point now under the pointer.
    let offset = (-rotation_radians).rem_euclid(TAU);
    let slot = (offset / segment_angle(segments)).ceil() as usize;
    Some(slot % segments)
}
