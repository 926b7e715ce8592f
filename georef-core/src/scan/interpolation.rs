use crate::geometry::AZIMUTH_MAX_CENTIDEG;
use crate::scan::sweep::SweepBuffer;

/// Midpoint of two observed azimuths in centidegrees, safe across the
/// 0/36000 rollover. `a1` is the earlier observation.
pub fn wrap_midpoint(a1: f64, mut a3: f64) -> f64 {
    if a3 < a1 {
        a3 += AZIMUTH_MAX_CENTIDEG;
    }
    let mut a2 = (a1 + a3) / 2.0;
    if a2 > AZIMUTH_MAX_CENTIDEG - 1.0 {
        a2 -= AZIMUTH_MAX_CENTIDEG;
    }
    a2
}

/// Fills every unobserved azimuth that has directly observed neighbors
/// on both sides. Only gaps are written; observed values are never
/// touched. Buffers with fewer than 3 sequences are left unchanged.
pub fn interpolate_azimuths(buffer: &mut SweepBuffer) -> usize {
    if buffer.sequences.len() < 3 {
        return 0;
    }

    let mut filled = 0;
    for i in 1..buffer.sequences.len() - 1 {
        if buffer.sequences[i].azimuth.is_some() {
            continue;
        }
        let before = buffer.sequences[i - 1].azimuth;
        let after = buffer.sequences[i + 1].azimuth;
        if let (Some(a1), Some(a3)) = (before, after) {
            buffer.sequences[i].azimuth = Some(wrap_midpoint(a1, a3));
            filled += 1;
        }
    }
    filled
}
