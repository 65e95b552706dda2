//! # Character Sets
//!
//! Compact sets of code points over a dense contiguous universe.
//!
//! A [`CharSet`] is stored as a sorted run of disjoint, non-empty,
//! non-adjacent inclusive ranges. All operations preserve that
//! normal form, so structural equality coincides with set equality
//! and the run can be hashed or ordered directly. The binary set
//! operations are two-cursor merges, linear in the combined range
//! count.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// The character universe a compilation runs against.
///
/// Complement-like operations ([`CharSet::difference`] from the full
/// set, derivative classes) are always taken relative to a universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Universe {
    /// Code points `0x00..=0xFF`.
    Ascii,
    /// The Basic Multilingual Plane, `0x0000..=0xFFFF`.
    Unicode,
}

impl Universe {
    /// The largest code point in this universe.
    #[must_use]
    pub const fn max_char(self) -> u32 {
        match self {
            Self::Ascii => 0xFF,
            Self::Unicode => 0xFFFF,
        }
    }

    /// Whether `c` is a member of this universe.
    #[must_use]
    pub const fn contains(self, c: u32) -> bool {
        c <= self.max_char()
    }

    /// The full universe as a [`CharSet`].
    #[must_use]
    pub fn charset(self) -> CharSet {
        CharSet::of_range(0, self.max_char())
    }
}

type RangeRun = SmallVec<[(u32, u32); 4]>;

/// A set of code points as sorted disjoint inclusive ranges.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CharSet {
    ranges: RangeRun,
}

impl CharSet {
    /// The empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The set containing exactly `c`.
    #[must_use]
    pub fn singleton(c: u32) -> Self {
        Self::of_range(c, c)
    }

    /// The inclusive range `lo..=hi`; empty when `lo > hi`.
    #[must_use]
    pub fn of_range(lo: u32, hi: u32) -> Self {
        let mut ranges = RangeRun::new();
        if lo <= hi {
            ranges.push((lo, hi));
        }
        Self { ranges }
    }

    /// Build a set from arbitrary inclusive ranges; overlapping and
    /// adjacent input ranges are merged, ranges with `lo > hi` are
    /// dropped.
    #[must_use]
    pub fn of_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut sorted: Vec<(u32, u32)> = ranges.into_iter().filter(|&(lo, hi)| lo <= hi).collect();
        sorted.sort_unstable();
        let mut out = RangeRun::new();
        for (lo, hi) in sorted {
            push_merged(&mut out, lo, hi);
        }
        Self { ranges: out }
    }

    /// The normalized range run backing this set.
    #[must_use]
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of code points in the set.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.ranges.iter().map(|&(lo, hi)| hi - lo + 1).sum()
    }

    #[must_use]
    pub fn contains(&self, c: u32) -> bool {
        let idx = self.ranges.partition_point(|&(_, hi)| hi < c);
        idx < self.ranges.len() && self.ranges[idx].0 <= c
    }

    /// The smallest member, or `None` if the set is empty.
    #[must_use]
    pub fn min_element(&self) -> Option<u32> {
        self.ranges.first().map(|&(lo, _)| lo)
    }

    /// The largest member, or `None` if the set is empty.
    #[must_use]
    pub fn max_element(&self) -> Option<u32> {
        self.ranges.last().map(|&(_, hi)| hi)
    }

    /// The set with `c` added.
    #[must_use]
    pub fn add(&self, c: u32) -> Self {
        self.union(&Self::singleton(c))
    }

    /// The set with `c` removed.
    #[must_use]
    pub fn remove(&self, c: u32) -> Self {
        self.difference(&Self::singleton(c))
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = RangeRun::new();
        let (a, b) = (&self.ranges, &other.ranges);
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let from_a = match (a.get(i), b.get(j)) {
                (Some(x), Some(y)) => x.0 <= y.0,
                (Some(_), None) => true,
                _ => false,
            };
            let (lo, hi) = if from_a {
                i += 1;
                a[i - 1]
            } else {
                j += 1;
                b[j - 1]
            };
            push_merged(&mut out, lo, hi);
        }
        Self { ranges: out }
    }

    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = RangeRun::new();
        let (a, b) = (&self.ranges, &other.ranges);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let lo = a[i].0.max(b[j].0);
            let hi = a[i].1.min(b[j].1);
            if lo <= hi {
                push_merged(&mut out, lo, hi);
            }
            if a[i].1 < b[j].1 {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { ranges: out }
    }

    /// Members of `self` that are not members of `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = RangeRun::new();
        let b = &other.ranges;
        let mut j = 0;
        for &(lo, hi) in &self.ranges {
            while j < b.len() && b[j].1 < lo {
                j += 1;
            }
            // walk the b-ranges overlapping (lo, hi), emitting the holes
            let mut cur = lo;
            let mut k = j;
            let mut live = true;
            while live && k < b.len() && b[k].0 <= hi {
                if b[k].0 > cur {
                    push_merged(&mut out, cur, b[k].0 - 1);
                }
                if b[k].1 >= hi {
                    live = false;
                } else {
                    cur = b[k].1 + 1;
                    k += 1;
                }
            }
            if live {
                push_merged(&mut out, cur, hi);
            }
        }
        Self { ranges: out }
    }

    /// Whether `p` holds for every member. Short-circuits on the
    /// first counterexample.
    pub fn for_all<P>(&self, mut p: P) -> bool
    where
        P: FnMut(u32) -> bool,
    {
        self.iter().all(|c| p(c))
    }

    /// Iterate the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(|&(lo, hi)| lo..=hi)
    }
}

fn push_merged(out: &mut RangeRun, lo: u32, hi: u32) {
    if let Some(last) = out.last_mut() {
        // adjacent or overlapping ranges collapse into the previous run
        if lo <= last.1.saturating_add(1) {
            if hi > last.1 {
                last.1 = hi;
            }
            return;
        }
    }
    out.push((lo, hi));
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharSet[")?;
        for (idx, &(lo, hi)) in self.ranges.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            if lo == hi {
                write!(f, "{lo:#x}")?;
            } else {
                write!(f, "{lo:#x}-{hi:#x}")?;
            }
        }
        write!(f, "]")
    }
}
