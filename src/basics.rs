//! Foundation types and rounding helpers.
//!
//! Everything else in the crate depends on these: the half-open [`Rect`]
//! used by every rectangle-taking operation, and the round-half-up and
//! saturation helpers that keep computed levels inside `[0, maxval]`.

// ============================================================================
// Rounding and saturation
// ============================================================================

/// Integer division rounding half up: `floor(num / den + 0.5)`.
///
/// Exact for all non-negative `num` and positive `den`, unlike going through
/// a float. `den` must be positive.
#[inline]
pub fn div_round_half_up(num: i64, den: i64) -> i64 {
    debug_assert!(den > 0, "division by non-positive denominator {}", den);
    (2 * num + den).div_euclid(2 * den)
}

/// Round `v` half up and clamp the result to `[0, maxval]`.
///
/// NaN maps to 0.
#[inline]
pub fn saturate_level(v: f64, maxval: u8) -> u8 {
    let r = (v + 0.5).floor();
    if r.is_nan() || r <= 0.0 {
        0
    } else if r >= maxval as f64 {
        maxval
    } else {
        r as u8
    }
}

/// Clamp an integer level to `[0, maxval]`.
#[inline]
pub fn clamp_level(v: i64, maxval: u8) -> u8 {
    v.clamp(0, maxval as i64) as u8
}

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle anchored at `(x, y)` with extent `w × h`.
///
/// Half-open: covers columns `x..x + w` and rows `y..y + h`. A rectangle of
/// width `w` anchored at column 0 fits exactly inside an image of width `w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering a whole `width × height` image.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    /// Number of pixels covered.
    #[inline]
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Returns `true` if the point (x, y) is inside the rectangle.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && (x as i64) < self.right() && y >= self.y && (y as i64) < self.bottom()
    }

    /// Returns `true` if the rectangle lies completely inside a
    /// `width × height` grid anchored at the origin.
    #[inline]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= width as i64
            && self.bottom() <= height as i64
    }
}

// ============================================================================
// Tests
// ============================================================================
