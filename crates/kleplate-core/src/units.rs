//! Explicit conversions between the unit systems used by the pipeline.
//!
//! Layout documents are expressed in key units ("u"), the host design in mils (thousandths of an
//! inch, Y up) and exports in millimetres (Y down). Nothing converts implicitly.

use crate::point::Vec2;

pub const MM_PER_INCH: f64 = 25.4;
pub const MILS_PER_INCH: f64 = 1000.0;

#[must_use]
pub fn mm_to_mil(mm: f64) -> f64 {
    mm / MM_PER_INCH * MILS_PER_INCH
}

#[must_use]
pub fn mil_to_mm(mil: f64) -> f64 {
    mil / MILS_PER_INCH * MM_PER_INCH
}

/// Layout units to millimetres, keeping the Y-down orientation.
#[must_use]
pub fn layout_to_mm(p: Vec2, pitch_mm: f64) -> Vec2 {
    p * pitch_mm
}

/// Layout units to host board mils: scaled by the pitch and flipped to Y up.
#[must_use]
pub fn layout_to_board_mil(p: Vec2, pitch_mm: f64) -> Vec2 {
    let mil_per_u = mm_to_mil(pitch_mm);
    Vec2::new(p.x * mil_per_u, -p.y * mil_per_u)
}

/// Host board mils (Y up) to pipeline millimetres (Y down).
#[must_use]
pub fn board_mil_to_mm(p: Vec2) -> Vec2 {
    Vec2::new(mil_to_mm(p.x), -mil_to_mm(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn one_u_is_750_mil_at_mx_pitch() {
        let p = layout_to_board_mil(Vec2::new(1.0, 1.0), 19.05);
        assert_abs_diff_eq!(p.x, 750.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, -750.0, epsilon = 1e-9);
    }

    #[test]
    fn board_mils_round_trip_to_layout_mm() {
        let mil = layout_to_board_mil(Vec2::new(2.5, 1.5), 19.05);
        let mm = board_mil_to_mm(mil);
        let expected = layout_to_mm(Vec2::new(2.5, 1.5), 19.05);
        assert_abs_diff_eq!(mm.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(mm.y, expected.y, epsilon = 1e-9);
    }
}
