//! Shared data model for NEXRAD Level 2 decoding.
//!
//! This crate holds the types that cross crate boundaries: volume indexes,
//! moment names, sweeps, and assembled volumes. The decode pipeline lives in
//! `level2-decode`; realtime chunk handling in `level2-realtime`.

pub mod moment;
pub mod sweep;
pub mod volume;
pub mod volume_index;

pub use moment::Moment;
pub use sweep::MomentSweep;
pub use volume::Level2Volume;
pub use volume_index::VolumeIndex;

/// Sentinel for gates with no usable return (below threshold or
/// range-folded). Deliberately not 0.0, which is a valid physical value
/// for every moment.
pub const NO_DATA: f32 = -9999.0;

/// Default tolerance for floating-point volume/sweep comparisons.
pub const DEFAULT_TOLERANCE: f32 = 1e-6;

/// Compare two floats at a tolerance, treating the `NO_DATA` sentinel as
/// only equal to itself.
pub(crate) fn float_eq(a: f32, b: f32, tolerance: f32) -> bool {
    if a == NO_DATA || b == NO_DATA {
        return a == b;
    }
    (a - b).abs() <= tolerance
}
