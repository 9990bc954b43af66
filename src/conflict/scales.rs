//! Ordered severity scales for graded engineering claims.
//!
//! Position on a scale is the claim's rank; arbitration picks the higher
//! rank ("stricter requirement wins"). A claim absent from its scale cannot
//! be ranked and must go to a human.

/// Concrete strength classes, ascending (EN 206).
pub(crate) const CONCRETE_CLASS_SCALE: &[&str] = &[
    "C16/20", "C20/25", "C25/30", "C30/37", "C35/45", "C40/50", "C45/55", "C50/60",
];

/// Exposure classes, ascending severity (EN 206 carbonation/chloride groups).
pub(crate) const EXPOSURE_CLASS_SCALE: &[&str] = &[
    "X0", "XC1", "XC2", "XC3", "XC4", "XD1", "XD2", "XD3", "XS1", "XS2", "XS3",
];

pub(crate) fn rank(scale: &[&str], value: &str) -> Option<usize> {
    scale.iter().position(|entry| *entry == value)
}

/// The stricter of two claims, or `None` when either is off-scale.
pub(crate) fn stricter<'a>(scale: &[&'a str], a: &str, b: &str) -> Option<&'a str> {
    let rank_a = rank(scale, a)?;
    let rank_b = rank(scale, b)?;
    Some(scale[rank_a.max(rank_b)])
}
