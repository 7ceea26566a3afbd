//! Summed-area table (2-D prefix sums) over an [`Image`].
//!
//! Cell `(x, y)` holds the sum of every pixel at column `<= x` and row
//! `<= y`. With the table built, the sum over any rectangle is four lookups
//! (inclusion-exclusion), which is what makes the box blur cost independent
//! of the window size.
//!
//! The table has the same dimensions as the image. Lookups at a negative
//! coordinate stand for "no pixels before the image start" and read as zero.
//!
//! Cells are `i64`: the largest possible total, `u32::MAX² × 255`, does not
//! fit, but any image whose pixel buffer can actually be allocated does.

use crate::error::ImageResult;
use crate::image::{pixel_count, try_alloc, Image};
use crate::instrumentation::Counters;

/// Inclusive prefix sums of an image's levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummedAreaTable {
    width: u32,
    height: u32,
    cells: Vec<i64>,
}

impl SummedAreaTable {
    /// Build the table in one raster-scan pass.
    pub fn build(img: &Image) -> ImageResult<Self> {
        let mut counters = Counters::new();
        Self::build_counted(img, &mut counters)
    }

    /// [`build`](Self::build), counting one pixel read per pixel and one
    /// running-sum update per cell.
    ///
    /// Each cell is `p[y][x] + t[y-1][x] + t[y][x-1] - t[y-1][x-1]`, with
    /// terms outside the table omitted. Cells only depend on their upper and
    /// left neighbours, so raster order fills them in one pass.
    pub fn build_counted(img: &Image, counters: &mut Counters) -> ImageResult<Self> {
        let width = img.width();
        let height = img.height();
        let len = pixel_count(width, height, "summed-area table")?;
        let mut cells: Vec<i64> = try_alloc(len, "summed-area table")?;

        let w = width as usize;
        for (y, row) in img.rows().enumerate() {
            let base = y * w;
            for (x, &p) in row.iter().enumerate() {
                let i = base + x;
                let mut v = p as i64;
                if y > 0 {
                    v += cells[i - w];
                }
                if x > 0 {
                    v += cells[i - 1];
                }
                if x > 0 && y > 0 {
                    v -= cells[i - w - 1];
                }
                cells[i] = v;
            }
        }

        counters.add_pixmem(len as u64);
        counters.add_sums(len as u64);

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Prefix sum at `(x, y)`.
    ///
    /// # Panics
    /// If `(x, y)` is outside the table.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> i64 {
        assert!(
            x < self.width && y < self.height,
            "cell ({}, {}) out of bounds ({}x{})",
            x,
            y,
            self.width,
            self.height
        );
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Prefix sum at `(x, y)`, zero if either coordinate is negative.
    ///
    /// Positive coordinates must lie inside the table.
    #[inline]
    pub fn corner(&self, x: i64, y: i64) -> i64 {
        if x < 0 || y < 0 {
            0
        } else {
            self.at(x as u32, y as u32)
        }
    }

    /// Sum of every level in the image.
    pub fn total(&self) -> i64 {
        self.cells.last().copied().unwrap_or(0)
    }

    /// Sum over the rectangle whose exclusive lower corner is `(x_lo, y_lo)`
    /// and inclusive upper corner is `(x_hi, y_hi)`.
    ///
    /// `x_lo`/`y_lo` may be `-1` to start at the image edge.
    #[inline]
    pub fn window_sum(&self, x_lo: i64, y_lo: i64, x_hi: i64, y_hi: i64) -> i64 {
        let d = self.corner(x_hi, y_hi);
        let b = self.corner(x_hi, y_lo);
        let c = self.corner(x_lo, y_hi);
        let a = self.corner(x_lo, y_lo);
        d - b - c + a
    }

    /// Sum over the inclusive rectangle `[x0, x1] × [y0, y1]`.
    pub fn rect_sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> i64 {
        debug_assert!(x0 <= x1 && y0 <= y1);
        self.window_sum(x0 as i64 - 1, y0 as i64 - 1, x1 as i64, y1 as i64)
    }
}

// ============================================================================
// Tests
// ============================================================================
