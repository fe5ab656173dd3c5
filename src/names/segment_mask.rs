use std::fmt;

use serde::{Deserialize, Serialize};

/// Bitset selecting which of the four name segments are "in use".
///
/// Bits are ordered from the broadest segment (catalog) to the narrowest
/// (column). A mask only controls display and equality; segment values that
/// are masked out are still carried by the name they belong to.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentMask(u8);

impl SegmentMask {
    pub const NONE: SegmentMask = SegmentMask(0);
    pub const CATALOG: SegmentMask = SegmentMask(0b1000);
    pub const SCHEMA: SegmentMask = SegmentMask(0b0100);
    pub const TABLE: SegmentMask = SegmentMask(0b0010);
    pub const COLUMN: SegmentMask = SegmentMask(0b0001);
    pub const ALL: SegmentMask = SegmentMask(0b1111);

    /// Segments in declaration order, broadest first.
    pub const SEGMENTS: [SegmentMask; 4] = [Self::CATALOG, Self::SCHEMA, Self::TABLE, Self::COLUMN];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        SegmentMask(bits & Self::ALL.0)
    }

    pub fn contains(self, other: SegmentMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: SegmentMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: SegmentMask) -> SegmentMask {
        SegmentMask(self.0 | other.0)
    }

    pub fn intersection(self, other: SegmentMask) -> SegmentMask {
        SegmentMask(self.0 & other.0)
    }

    pub fn without(self, other: SegmentMask) -> SegmentMask {
        SegmentMask(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// True when the active segments form one unbroken run (e.g. `schema.table`
    /// but not `catalog.table`).
    pub fn is_contiguous(self) -> bool {
        if self.0 == 0 {
            return true;
        }
        let shifted = self.0 >> self.0.trailing_zeros();
        shifted & (shifted + 1) == 0
    }

    /// The mask for the `n` narrowest segments ending at `lowest`.
    ///
    /// `trailing(COLUMN, 2)` is `TABLE | COLUMN`; the count is clamped to the
    /// segments available above `lowest`.
    pub fn trailing(lowest: SegmentMask, n: usize) -> SegmentMask {
        let Some(lowest_index) = Self::SEGMENTS.iter().position(|s| *s == lowest) else {
            return SegmentMask::NONE;
        };
        let start = lowest_index.saturating_sub(n.saturating_sub(1));
        Self::SEGMENTS[start..=lowest_index]
            .iter()
            .fold(SegmentMask::NONE, |acc, s| acc.union(*s))
    }

    /// The narrowest active segment, if any.
    pub fn lowest(self) -> Option<SegmentMask> {
        Self::SEGMENTS.iter().rev().copied().find(|s| self.contains(*s))
    }
}

impl std::ops::BitOr for SegmentMask {
    type Output = SegmentMask;

    fn bitor(self, rhs: SegmentMask) -> SegmentMask {
        self.union(rhs)
    }
}

impl std::ops::BitAnd for SegmentMask {
    type Output = SegmentMask;

    fn bitand(self, rhs: SegmentMask) -> SegmentMask {
        self.intersection(rhs)
    }
}

impl fmt::Debug for SegmentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: String = [('C', Self::CATALOG), ('S', Self::SCHEMA), ('T', Self::TABLE), ('c', Self::COLUMN)]
            .iter()
            .map(|(l, m)| if self.contains(*m) { *l } else { '-' })
            .collect();
        write!(f, "SegmentMask({})", letters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguity() {
        assert!(SegmentMask::ALL.is_contiguous());
        assert!((SegmentMask::TABLE | SegmentMask::COLUMN).is_contiguous());
        assert!(SegmentMask::SCHEMA.is_contiguous());
        assert!(SegmentMask::NONE.is_contiguous());
        assert!(!(SegmentMask::CATALOG | SegmentMask::TABLE).is_contiguous());
        assert!(!(SegmentMask::SCHEMA | SegmentMask::COLUMN).is_contiguous());
    }

    #[test]
    fn trailing_segments() {
        assert_eq!(SegmentMask::trailing(SegmentMask::COLUMN, 1), SegmentMask::COLUMN);
        assert_eq!(SegmentMask::trailing(SegmentMask::COLUMN, 2), SegmentMask::TABLE | SegmentMask::COLUMN);
        assert_eq!(SegmentMask::trailing(SegmentMask::TABLE, 9), SegmentMask::CATALOG | SegmentMask::SCHEMA | SegmentMask::TABLE);
        assert_eq!(SegmentMask::trailing(SegmentMask::COLUMN, 0), SegmentMask::COLUMN);
    }

    #[test]
    fn lowest_segment() {
        assert_eq!(SegmentMask::ALL.lowest(), Some(SegmentMask::COLUMN));
        assert_eq!((SegmentMask::CATALOG | SegmentMask::SCHEMA).lowest(), Some(SegmentMask::SCHEMA));
        assert_eq!(SegmentMask::NONE.lowest(), None);
    }
}
