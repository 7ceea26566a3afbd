//! Whole-image point transforms.
//!
//! Each level is mapped independently of its neighbours; pixel positions and
//! image geometry never change. All transforms work in place.

use crate::basics::saturate_level;
use crate::error::{ImageError, ImageResult};
use crate::image::Image;

/// Photographic negative: `level -> maxval - level`.
pub fn negative(img: &mut Image) {
    let maxval = img.maxval();
    for p in img.as_mut_slice() {
        *p = maxval.saturating_sub(*p);
    }
}

/// Levels below `thr` become black (0), the rest become white (`maxval`).
pub fn threshold(img: &mut Image, thr: u8) {
    let maxval = img.maxval();
    for p in img.as_mut_slice() {
        *p = if *p < thr { 0 } else { maxval };
    }
}

/// Multiply every level by `factor`, rounding half up and saturating at
/// `maxval`.
///
/// `factor > 1` brightens, `factor < 1` darkens. Negative or non-finite
/// factors are rejected.
pub fn brighten(img: &mut Image, factor: f64) -> ImageResult<()> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(ImageError::invalid(format!(
            "brighten factor must be a non-negative number, got {factor}"
        )));
    }
    let maxval = img.maxval();
    for p in img.as_mut_slice() {
        *p = saturate_level(*p as f64 * factor, maxval);
    }
    Ok(())
}
