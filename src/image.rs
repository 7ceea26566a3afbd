//! Owned 8-bit grayscale pixel buffer.
//!
//! An [`Image`] stores `width * height` gray levels in one contiguous
//! row-major `Vec<u8>` together with its `maxval` (the level that means pure
//! white). Pixel `(x, y)` lives at index `y * width + x`; [`Image::index`] is
//! the only place that mapping is spelled out.
//!
//! Two accessor families are provided:
//!
//! - [`Image::get`] / [`Image::set`] validate the position and return
//!   [`ImageError::OutOfBounds`] on failure.
//! - [`Image::pixel`] / [`Image::set_pixel`] treat an invalid position as a
//!   contract violation and panic, for call sites that already validated.
//!
//! Neither family clamps written levels to `maxval`; callers are expected to
//! produce levels in range.

use crate::basics::Rect;
use crate::error::{ImageError, ImageResult};
use crate::instrumentation::Counters;

/// Largest `maxval` an 8-bit image can carry.
pub const PIX_MAX: u8 = 255;

/// Allocate a zeroed buffer of `len` elements, reporting failure instead of
/// aborting.
pub(crate) fn try_alloc<T: Clone + Default>(len: usize, what: &'static str) -> ImageResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ImageError::Allocation {
            what,
            requested: len,
        })?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// Number of pixels in a `width × height` image, or an allocation error if
/// that does not fit in `usize`.
pub(crate) fn pixel_count(width: u32, height: u32, what: &'static str) -> ImageResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(ImageError::Allocation {
            what,
            requested: usize::MAX,
        })
}

/// An 8-bit grayscale image.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    maxval: u8,
    pixels: Vec<u8>,
}

impl Image {
    /// Create a black image (every level 0).
    ///
    /// Fails with [`ImageError::InvalidArgument`] if `maxval == 0` and with
    /// [`ImageError::Allocation`] if the pixel buffer cannot be reserved.
    pub fn new(width: u32, height: u32, maxval: u8) -> ImageResult<Self> {
        if maxval == 0 {
            return Err(ImageError::invalid("maxval must be positive"));
        }
        let len = pixel_count(width, height, "pixel buffer")?;
        let pixels = try_alloc(len, "pixel buffer")?;
        Ok(Self {
            width,
            height,
            maxval,
            pixels,
        })
    }

    /// Create an image with every pixel set to `level`.
    pub fn filled(width: u32, height: u32, maxval: u8, level: u8) -> ImageResult<Self> {
        if level > maxval {
            return Err(ImageError::invalid(format!(
                "fill level {level} exceeds maxval {maxval}"
            )));
        }
        let mut img = Self::new(width, height, maxval)?;
        img.pixels.fill(level);
        Ok(img)
    }

    /// Wrap an existing row-major buffer.
    ///
    /// The buffer must hold exactly `width * height` levels, none above
    /// `maxval`.
    pub fn from_raw(width: u32, height: u32, maxval: u8, pixels: Vec<u8>) -> ImageResult<Self> {
        if maxval == 0 {
            return Err(ImageError::invalid("maxval must be positive"));
        }
        let len = pixel_count(width, height, "pixel buffer")?;
        if pixels.len() != len {
            return Err(ImageError::invalid(format!(
                "buffer holds {} levels, {width}x{height} image needs {len}",
                pixels.len()
            )));
        }
        if let Some(i) = pixels.iter().position(|&p| p > maxval) {
            return Err(ImageError::invalid(format!(
                "level {} at index {i} exceeds maxval {maxval}",
                pixels[i]
            )));
        }
        Ok(Self {
            width,
            height,
            maxval,
            pixels,
        })
    }

    /// Consume the image, returning its raster.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    // ------------------------------------------------------------------------
    // Information queries
    // ------------------------------------------------------------------------

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Level of pure white.
    #[inline]
    pub fn maxval(&self) -> u8 {
        self.maxval
    }

    /// Pixel count.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The rectangle covering the whole image.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Minimum and maximum level present, `(0, 0)` for an empty image.
    pub fn stats(&self) -> (u8, u8) {
        let mut it = self.pixels.iter().copied();
        let Some(first) = it.next() else {
            return (0, 0);
        };
        it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)))
    }

    // ------------------------------------------------------------------------
    // Bounds validation
    // ------------------------------------------------------------------------

    /// Returns `true` if `(x, y)` addresses a pixel of this image.
    #[inline]
    pub fn is_valid_pos(&self, x: i32, y: i32) -> bool {
        self.rect().contains(x, y)
    }

    /// Returns `true` if `rect` lies completely inside the image.
    ///
    /// Half-open convention: `Rect::new(0, 0, w, h)` is valid for a `w × h`
    /// image.
    #[inline]
    pub fn is_valid_rect(&self, rect: &Rect) -> bool {
        rect.fits_within(self.width, self.height)
    }

    pub(crate) fn check_pos(&self, x: i32, y: i32) -> ImageResult<()> {
        if self.is_valid_pos(x, y) {
            Ok(())
        } else {
            Err(ImageError::out_of_bounds(x, y, self.width, self.height))
        }
    }

    pub(crate) fn check_rect(&self, rect: &Rect) -> ImageResult<()> {
        if self.is_valid_rect(rect) {
            Ok(())
        } else {
            // Report the far corner when the anchor itself is inside.
            let (x, y) = if self.is_valid_pos(rect.x, rect.y) {
                (rect.right() - 1, rect.bottom() - 1)
            } else {
                (rect.x as i64, rect.y as i64)
            };
            Err(ImageError::out_of_bounds(x, y, self.width, self.height))
        }
    }

    // ------------------------------------------------------------------------
    // Pixel access
    // ------------------------------------------------------------------------

    /// Linear index of `(x, y)` in raster-scan order.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Level at `(x, y)`.
    pub fn get(&self, x: i32, y: i32) -> ImageResult<u8> {
        self.check_pos(x, y)?;
        Ok(self.pixels[self.index(x as u32, y as u32)])
    }

    /// Overwrite the level at `(x, y)`.
    pub fn set(&mut self, x: i32, y: i32, level: u8) -> ImageResult<()> {
        self.check_pos(x, y)?;
        let i = self.index(x as u32, y as u32);
        self.pixels[i] = level;
        Ok(())
    }

    /// [`get`](Self::get), counting one pixel memory access.
    pub fn get_counted(&self, x: i32, y: i32, counters: &mut Counters) -> ImageResult<u8> {
        let v = self.get(x, y)?;
        counters.add_pixmem(1);
        Ok(v)
    }

    /// [`set`](Self::set), counting one pixel memory access.
    pub fn set_counted(&mut self, x: i32, y: i32, level: u8, counters: &mut Counters) -> ImageResult<()> {
        self.set(x, y, level)?;
        counters.add_pixmem(1);
        Ok(())
    }

    /// Level at `(x, y)`.
    ///
    /// # Panics
    /// If `(x, y)` is outside the image.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> u8 {
        assert!(
            self.is_valid_pos(x, y),
            "pixel ({}, {}) out of bounds ({}x{})",
            x,
            y,
            self.width,
            self.height
        );
        self.pixels[self.index(x as u32, y as u32)]
    }

    /// Overwrite the level at `(x, y)`.
    ///
    /// # Panics
    /// If `(x, y)` is outside the image.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, level: u8) {
        assert!(
            self.is_valid_pos(x, y),
            "pixel ({}, {}) out of bounds ({}x{})",
            x,
            y,
            self.width,
            self.height
        );
        let i = self.index(x as u32, y as u32);
        self.pixels[i] = level;
    }

    /// The raster as one row-major slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Row `y` as a slice of `width` levels.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// Mutable row `y`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.pixels[start..start + w]
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("maxval", &self.maxval)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> Image {
        let data = (0..w * h).map(|i| (i % 256) as u8).collect();
        Image::from_raw(w, h, 255, data).unwrap()
    }

    #[test]
    fn test_new_is_black() {
        let img = Image::new(4, 3, 255).unwrap();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.maxval(), 255);
        assert_eq!(img.len(), 12);
        assert!(img.as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_new_rejects_zero_maxval() {
        assert!(matches!(
            Image::new(2, 2, 0),
            Err(ImageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_new_empty_dimensions() {
        let img = Image::new(0, 5, 10).unwrap();
        assert!(img.is_empty());
        assert_eq!(img.rows().count(), 5);
        assert!(img.rows().all(|r| r.is_empty()));
    }

    #[test]
    fn test_filled() {
        let img = Image::filled(3, 2, 200, 77).unwrap();
        assert!(img.as_slice().iter().all(|&p| p == 77));
        assert!(Image::filled(3, 2, 50, 51).is_err());
    }

    #[test]
    fn test_from_raw_validates_length_and_levels() {
        assert!(Image::from_raw(2, 2, 255, vec![0; 3]).is_err());
        assert!(Image::from_raw(2, 2, 9, vec![1, 2, 10, 3]).is_err());
        let img = Image::from_raw(2, 2, 9, vec![1, 2, 9, 3]).unwrap();
        assert_eq!(img.into_raw(), vec![1, 2, 9, 3]);
    }

    #[test]
    fn test_index_is_row_major() {
        let img = Image::new(100, 3, 255).unwrap();
        assert_eq!(img.index(33, 0), 33);
        assert_eq!(img.index(22, 1), 122);
    }

    #[test]
    fn test_get_set() {
        let mut img = Image::new(3, 3, 255).unwrap();
        img.set(2, 1, 42).unwrap();
        assert_eq!(img.get(2, 1).unwrap(), 42);
        assert_eq!(img.as_slice()[5], 42);
        assert_eq!(img.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let mut img = Image::new(3, 2, 255).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 2)] {
            match img.get(x, y) {
                Err(ImageError::OutOfBounds {
                    width: 3,
                    height: 2,
                    ..
                }) => {}
                other => panic!("expected OutOfBounds for ({x},{y}), got {other:?}"),
            }
            assert!(img.set(x, y, 1).is_err());
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_pixel_panics_out_of_bounds() {
        let img = Image::new(2, 2, 255).unwrap();
        img.pixel(2, 0);
    }

    #[test]
    fn test_counted_access() {
        let mut img = Image::new(2, 2, 255).unwrap();
        let mut c = Counters::new();
        img.set_counted(1, 1, 9, &mut c).unwrap();
        assert_eq!(img.get_counted(1, 1, &mut c).unwrap(), 9);
        assert!(img.get_counted(5, 5, &mut c).is_err());
        assert_eq!(c.pixmem, 2);
    }

    #[test]
    fn test_valid_pos() {
        let img = Image::new(4, 3, 255).unwrap();
        assert!(img.is_valid_pos(0, 0));
        assert!(img.is_valid_pos(3, 2));
        assert!(!img.is_valid_pos(4, 2));
        assert!(!img.is_valid_pos(-1, 0));
        assert!(!img.is_valid_pos(i32::MAX, 0));
        assert!(!img.is_valid_pos(0, i32::MIN));
    }

    #[test]
    fn test_valid_rect_half_open() {
        let img = Image::new(4, 3, 255).unwrap();
        assert!(img.is_valid_rect(&Rect::new(0, 0, 4, 3)));
        assert!(!img.is_valid_rect(&Rect::new(0, 0, 5, 3)));
        assert!(img.is_valid_rect(&Rect::new(1, 1, 3, 2)));
        assert!(!img.is_valid_rect(&Rect::new(1, 1, 3, 3)));
    }

    #[test]
    fn test_check_rect_reports_far_corner() {
        let img = Image::new(4, 3, 255).unwrap();
        match img.check_rect(&Rect::new(1, 1, 4, 1)) {
            Err(ImageError::OutOfBounds { x: 4, y: 1, .. }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rows() {
        let img = ramp(3, 2);
        let rows: Vec<&[u8]> = img.rows().collect();
        assert_eq!(rows, vec![&[0u8, 1, 2][..], &[3u8, 4, 5][..]]);
        assert_eq!(img.row(1), &[3, 4, 5]);
    }

    #[test]
    fn test_row_mut() {
        let mut img = ramp(3, 2);
        img.row_mut(0).fill(9);
        assert_eq!(img.as_slice(), &[9, 9, 9, 3, 4, 5]);
    }

    #[test]
    fn test_stats() {
        let img = Image::from_raw(3, 1, 255, vec![7, 200, 3]).unwrap();
        assert_eq!(img.stats(), (3, 200));
        assert_eq!(Image::new(0, 0, 255).unwrap().stats(), (0, 0));
    }
}
