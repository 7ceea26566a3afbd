//! Geometric transforms and two-image operations.
//!
//! [`rotate`], [`mirror`] and [`crop`] return a new image and leave the source
//! untouched. [`paste`] and [`blend`] write into the destination in place.
//! Rectangles follow the half-open convention of [`Rect`].

use crate::basics::{saturate_level, Rect};
use crate::error::{ImageError, ImageResult};
use crate::image::Image;

/// Rotate 90° anti-clockwise.
///
/// A `w × h` image becomes `h × w`; source pixel `(x, y)` lands at
/// `(y, w - 1 - x)`.
pub fn rotate(img: &Image) -> ImageResult<Image> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let mut out = Image::new(img.height(), img.width(), img.maxval())?;
    let dst = out.as_mut_slice();
    for (y, row) in img.rows().enumerate() {
        for (x, &p) in row.iter().enumerate() {
            // Destination is h pixels wide.
            dst[(w - 1 - x) * h + y] = p;
        }
    }
    Ok(out)
}

/// Flip left to right.
pub fn mirror(img: &Image) -> ImageResult<Image> {
    let mut out = Image::new(img.width(), img.height(), img.maxval())?;
    for y in 0..img.height() {
        let src = img.row(y);
        let dst = out.row_mut(y);
        for (d, &s) in dst.iter_mut().zip(src.iter().rev()) {
            *d = s;
        }
    }
    Ok(out)
}

/// Copy the region `rect` into a new `rect.w × rect.h` image with the same
/// maxval.
///
/// Fails with [`ImageError::OutOfBounds`] unless `rect` lies inside `img`.
pub fn crop(img: &Image, rect: Rect) -> ImageResult<Image> {
    img.check_rect(&rect)?;
    let mut out = Image::new(rect.w, rect.h, img.maxval())?;
    let x0 = rect.x as usize;
    let x1 = x0 + rect.w as usize;
    for dy in 0..rect.h {
        let src = &img.row(rect.y as u32 + dy)[x0..x1];
        out.row_mut(dy).copy_from_slice(src);
    }
    Ok(out)
}

/// Overwrite the region of `dst` anchored at `(x, y)` with `src`.
///
/// `src` must fit completely inside `dst` at that position. Levels are copied
/// verbatim, so `src.maxval()` may not exceed `dst.maxval()`; rescale first
/// (e.g. with [`brighten`](crate::point_ops::brighten)) or use [`blend`],
/// which saturates.
pub fn paste(dst: &mut Image, x: i32, y: i32, src: &Image) -> ImageResult<()> {
    if src.maxval() > dst.maxval() {
        return Err(ImageError::invalid(format!(
            "cannot paste maxval {} image into maxval {} image",
            src.maxval(),
            dst.maxval()
        )));
    }
    let rect = Rect::new(x, y, src.width(), src.height());
    dst.check_rect(&rect)?;
    let x0 = x as usize;
    let x1 = x0 + src.width() as usize;
    for (dy, line) in src.rows().enumerate() {
        dst.row_mut(y as u32 + dy as u32)[x0..x1].copy_from_slice(line);
    }
    Ok(())
}

/// Blend `src` into the region of `dst` anchored at `(x, y)`:
/// `d = d * (1 - alpha) + s * alpha`, rounded half up and saturated to
/// `[0, dst.maxval()]`.
///
/// `alpha` is usually in `[0, 1]`; values outside that range are allowed
/// and saturate. Non-finite `alpha` is rejected.
pub fn blend(dst: &mut Image, x: i32, y: i32, src: &Image, alpha: f64) -> ImageResult<()> {
    if !alpha.is_finite() {
        return Err(ImageError::invalid(format!("blend alpha must be finite, got {alpha}")));
    }
    let rect = Rect::new(x, y, src.width(), src.height());
    dst.check_rect(&rect)?;
    let maxval = dst.maxval();
    let x0 = x as usize;
    let x1 = x0 + src.width() as usize;
    for (dy, line) in src.rows().enumerate() {
        let target = &mut dst.row_mut(y as u32 + dy as u32)[x0..x1];
        for (d, &s) in target.iter_mut().zip(line) {
            *d = saturate_level(*d as f64 * (1.0 - alpha) + s as f64 * alpha, maxval);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
