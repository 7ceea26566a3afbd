//! Operation counters.
//!
//! A [`Counters`] value is owned by the caller and passed by `&mut` to the
//! `*_counted` entry points, which add to it. Nothing is global: two
//! sessions measuring different workloads simply use two values.

use std::fmt;
use std::ops::AddAssign;

/// Tallies of the primitive work done by image operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Pixel memory accesses (reads plus writes).
    pub pixmem: u64,
    /// Pixel comparisons made by subimage search.
    pub comparisons: u64,
    /// Additions folded into running sums.
    pub sums: u64,
    /// Divisions computing window means.
    pub divisions: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn add_pixmem(&mut self, n: u64) {
        self.pixmem += n;
    }

    #[inline]
    pub fn add_comparisons(&mut self, n: u64) {
        self.comparisons += n;
    }

    #[inline]
    pub fn add_sums(&mut self, n: u64) {
        self.sums += n;
    }

    #[inline]
    pub fn add_divisions(&mut self, n: u64) {
        self.divisions += n;
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, rhs: Self) {
        self.pixmem += rhs.pixmem;
        self.comparisons += rhs.comparisons;
        self.sums += rhs.sums;
        self.divisions += rhs.divisions;
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pixmem={} comparisons={} sums={} divisions={}",
            self.pixmem, self.comparisons, self.sums, self.divisions
        )
    }
}
