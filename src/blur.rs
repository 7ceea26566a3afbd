//! Box (mean) blur backed by a summed-area table.
//!
//! Each pixel is replaced by the mean of the `(2*dx+1) × (2*dy+1)`
//! rectangle centred on it. Windows are clamped to the image: border pixels
//! average over the samples that exist rather than over assumed zeros, and
//! nothing wraps around.
//!
//! The filter builds one [`SummedAreaTable`] from the unmodified pixels, then
//! makes a single write-back pass reading four table corners per pixel. Cost
//! is O(width × height) regardless of the radii. Because every read goes to
//! the table, overwriting pixels during the pass is safe.
//!
//! `box_blur` takes `&mut Image`, so two blurs of the same image cannot run
//! at once; callers sharing an image across threads must serialise access
//! themselves (e.g. behind a `Mutex`).

use log::debug;

use crate::basics::{clamp_level, div_round_half_up};
use crate::error::{ImageError, ImageResult};
use crate::image::Image;
use crate::instrumentation::Counters;
use crate::integral::SummedAreaTable;

// ============================================================================
// Window
// ============================================================================

/// A blur window clamped to the image.
///
/// `x_lo`/`y_lo` are *exclusive* (one before the first summed column/row,
/// `-1` at the image edge); `x_hi`/`y_hi` are inclusive. That is the shape
/// [`SummedAreaTable::window_sum`] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxWindow {
    pub x_lo: i64,
    pub y_lo: i64,
    pub x_hi: i64,
    pub y_hi: i64,
}

impl BoxWindow {
    /// Window of radii `dx`, `dy` around `(col, row)` in a `width × height`
    /// image. `(col, row)` must be inside the image.
    #[inline]
    pub fn clamped(col: u32, row: u32, dx: u32, dy: u32, width: u32, height: u32) -> Self {
        let (col, row, dx, dy) = (col as i64, row as i64, dx as i64, dy as i64);
        Self {
            x_lo: (col - dx - 1).max(-1),
            y_lo: (row - dy - 1).max(-1),
            x_hi: (col + dx).min(width as i64 - 1),
            y_hi: (row + dy).min(height as i64 - 1),
        }
    }

    /// Number of pixels the window covers.
    #[inline]
    pub fn area(&self) -> i64 {
        (self.x_hi - self.x_lo) * (self.y_hi - self.y_lo)
    }
}

fn check_radii(dx: i32, dy: i32) -> ImageResult<(u32, u32)> {
    if dx < 0 || dy < 0 {
        return Err(ImageError::invalid(format!(
            "blur radii must be non-negative (dx={dx}, dy={dy})"
        )));
    }
    Ok((dx as u32, dy as u32))
}

// ============================================================================
// Summed-area table blur
// ============================================================================

/// Blur `img` in place with a `(2*dx+1) × (2*dy+1)` mean filter.
///
/// Fails with [`ImageError::InvalidArgument`] for negative radii and with
/// [`ImageError::Allocation`] if the table cannot be allocated; in both cases
/// the image is left untouched.
pub fn box_blur(img: &mut Image, dx: i32, dy: i32) -> ImageResult<()> {
    let mut counters = Counters::new();
    box_blur_counted(img, dx, dy, &mut counters)
}

/// [`box_blur`], adding the work done to `counters`.
///
/// Besides the table build, each output pixel counts one window sum, one
/// division and one pixel write.
pub fn box_blur_counted(img: &mut Image, dx: i32, dy: i32, counters: &mut Counters) -> ImageResult<()> {
    let (dx, dy) = check_radii(dx, dy)?;
    let (w, h) = (img.width(), img.height());
    debug!("box_blur: {}x{} dx={} dy={}", w, h, dx, dy);
    if img.is_empty() {
        return Ok(());
    }

    let table = SummedAreaTable::build_counted(img, counters)?;

    let maxval = img.maxval();
    let stride = w as usize;
    let pixels = img.as_mut_slice();
    for row in 0..h {
        let line = &mut pixels[row as usize * stride..(row as usize + 1) * stride];
        for col in 0..w {
            let win = BoxWindow::clamped(col, row, dx, dy, w, h);
            let sum = table.window_sum(win.x_lo, win.y_lo, win.x_hi, win.y_hi);
            line[col as usize] = clamp_level(div_round_half_up(sum, win.area()), maxval);
        }
    }

    let n = img.len() as u64;
    counters.add_sums(n);
    counters.add_divisions(n);
    counters.add_pixmem(n);
    Ok(())
}

// ============================================================================
// Direct reference blur
// ============================================================================

/// Direct O(window area) mean blur with the same border policy and rounding
/// as [`box_blur`].
///
/// Used to cross-check the fast filter and as a benchmark baseline. Keeps a
/// copy of the original pixels, so results do not depend on scan order.
#[doc(hidden)]
pub fn box_blur_reference(img: &mut Image, dx: i32, dy: i32) -> ImageResult<()> {
    let (dx, dy) = check_radii(dx, dy)?;
    if img.is_empty() {
        return Ok(());
    }
    let src = img.clone();
    let (w, h) = (img.width() as i64, img.height() as i64);
    let (dx, dy) = (dx as i64, dy as i64);
    let maxval = img.maxval();

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0i64;
            let mut count = 0i64;
            for yy in (y - dy).max(0)..=(y + dy).min(h - 1) {
                let row = src.row(yy as u32);
                for xx in (x - dx).max(0)..=(x + dx).min(w - 1) {
                    sum += row[xx as usize] as i64;
                    count += 1;
                }
            }
            img.set_pixel(
                x as i32,
                y as i32,
                clamp_level(div_round_half_up(sum, count), maxval),
            );
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
