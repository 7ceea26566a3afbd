//! Exact subimage matching and search.

use crate::basics::Rect;
use crate::image::Image;
use crate::instrumentation::Counters;

/// Returns `true` if `needle` equals the region of `hay` anchored at
/// `(x, y)`.
///
/// A region that does not fit inside `hay` never matches.
pub fn match_subimage(hay: &Image, x: i32, y: i32, needle: &Image) -> bool {
    let mut counters = Counters::new();
    match_subimage_counted(hay, x, y, needle, &mut counters)
}

/// [`match_subimage`], counting one comparison (and two pixel reads) per
/// pixel compared. Stops at the first mismatch.
pub fn match_subimage_counted(
    hay: &Image,
    x: i32,
    y: i32,
    needle: &Image,
    counters: &mut Counters,
) -> bool {
    let rect = Rect::new(x, y, needle.width(), needle.height());
    if !hay.is_valid_rect(&rect) {
        return false;
    }
    let x0 = x as usize;
    let x1 = x0 + needle.width() as usize;
    for (dy, line) in needle.rows().enumerate() {
        let region = &hay.row(y as u32 + dy as u32)[x0..x1];
        for (a, b) in region.iter().zip(line) {
            counters.add_comparisons(1);
            counters.add_pixmem(2);
            if a != b {
                return false;
            }
        }
    }
    true
}

/// Find the first anchor, in raster-scan order, where `needle` matches
/// inside `hay`. Returns `(x, y)`.
pub fn locate_subimage(hay: &Image, needle: &Image) -> Option<(i32, i32)> {
    let mut counters = Counters::new();
    locate_subimage_counted(hay, needle, &mut counters)
}

/// [`locate_subimage`], adding comparison counts to `counters`.
pub fn locate_subimage_counted(
    hay: &Image,
    needle: &Image,
    counters: &mut Counters,
) -> Option<(i32, i32)> {
    if needle.width() > hay.width() || needle.height() > hay.height() {
        return None;
    }
    let max_x = (hay.width() - needle.width()) as i32;
    let max_y = (hay.height() - needle.height()) as i32;
    for y in 0..=max_y {
        for x in 0..=max_x {
            if match_subimage_counted(hay, x, y, needle, counters) {
                return Some((x, y));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::crop;

    fn hay() -> Image {
        #[rustfmt::skip]
        let data = vec![
            0, 1, 2, 3, 4,
            5, 6, 7, 8, 9,
            1, 2, 3, 4, 5,
            9, 9, 6, 7, 8,
        ];
        Image::from_raw(5, 4, 255, data).unwrap()
    }

    #[test]
    fn test_match_at_position() {
        let h = hay();
        let n = Image::from_raw(2, 2, 255, vec![6, 7, 2, 3]).unwrap();
        assert!(match_subimage(&h, 1, 1, &n));
        assert!(!match_subimage(&h, 0, 0, &n));
    }

    #[test]
    fn test_match_out_of_bounds_is_false() {
        let h = hay();
        let n = Image::from_raw(2, 2, 255, vec![4, 0, 9, 0]).unwrap();
        assert!(!match_subimage(&h, 4, 0, &n));
        assert!(!match_subimage(&h, -1, 0, &n));
    }

    #[test]
    fn test_locate_returns_x_then_y() {
        let h = hay();
        let n = Image::from_raw(3, 1, 255, vec![6, 7, 8]).unwrap();
        // First in raster order is row 1, column 1 (row 3 also has it at x=2).
        assert_eq!(locate_subimage(&h, &n), Some((1, 1)));
        let n = Image::from_raw(2, 1, 255, vec![9, 9]).unwrap();
        assert_eq!(locate_subimage(&h, &n), Some((0, 3)));
    }

    #[test]
    fn test_locate_cropped_region() {
        let h = hay();
        let n = crop(&h, Rect::new(2, 2, 3, 2)).unwrap();
        assert_eq!(locate_subimage(&h, &n), Some((2, 2)));
    }

    #[test]
    fn test_locate_missing_or_oversized() {
        let h = hay();
        let n = Image::from_raw(2, 1, 255, vec![200, 201]).unwrap();
        assert_eq!(locate_subimage(&h, &n), None);
        let big = Image::new(6, 1, 255).unwrap();
        assert_eq!(locate_subimage(&h, &big), None);
    }

    #[test]
    fn test_locate_whole_image() {
        let h = hay();
        assert_eq!(locate_subimage(&h, &h.clone()), Some((0, 0)));
    }

    #[test]
    fn test_counted_comparisons() {
        let h = hay();
        let n = Image::from_raw(1, 1, 255, vec![5]).unwrap();
        let mut c = Counters::new();
        assert_eq!(locate_subimage_counted(&h, &n, &mut c), Some((0, 1)));
        // Anchors (0,0)..(4,0) then (0,1): six single-pixel comparisons.
        assert_eq!(c.comparisons, 6);
        assert_eq!(c.pixmem, 12);
    }
}
