//! Realtime volume numbering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a realtime volume in the live feed.
///
/// Valid values are 1 through 999. After 999 the feed wraps back to 1;
/// 0 never occurs. The index advances only when an End-role chunk for the
/// current volume has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VolumeIndex(u16);

impl VolumeIndex {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 999;

    /// Create a volume index. Returns `None` if `number` is outside 1..=999.
    pub fn new(number: u16) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&number) {
            Some(Self(number))
        } else {
            None
        }
    }

    pub fn as_number(self) -> u16 {
        self.0
    }

    /// The volume that follows this one in the feed, wrapping 999 -> 1.
    pub fn next(self) -> Self {
        if self.0 == Self::MAX {
            Self(Self::MIN)
        } else {
            Self(self.0 + 1)
        }
    }
}

impl fmt::Display for VolumeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(VolumeIndex::new(0).is_none());
        assert!(VolumeIndex::new(1000).is_none());
        assert!(VolumeIndex::new(1).is_some());
        assert!(VolumeIndex::new(999).is_some());
    }

    #[test]
    fn next_wraps_at_999() {
        let v = VolumeIndex::new(999).unwrap();
        assert_eq!(v.next().as_number(), 1);
        let v = VolumeIndex::new(42).unwrap();
        assert_eq!(v.next().as_number(), 43);
    }

    #[test]
    fn full_cycle_stays_in_range() {
        let mut v = VolumeIndex::new(1).unwrap();
        for _ in 0..2000 {
            v = v.next();
            assert!(v.as_number() >= 1 && v.as_number() <= 999);
        }
    }
}
