// Image comparison and pipeline support for the graymap command-line tool.
//
// Provides level-by-level comparison, diff image generation, and the
// JSON-configured operation pipeline.

use anyhow::{ensure, Result};
use graymap::{paste, Image};

pub mod pipeline;

// ============================================================================
// Comparison Result
// ============================================================================

/// Information about a single differing pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    pub x: u32,
    pub y: u32,
    pub level_a: u8,
    pub level_b: u8,
}

/// Result of comparing two images.
#[derive(Debug, Clone)]
pub struct CompareResult {
    /// True if every pixel in both images is identical.
    pub identical: bool,
    /// Total number of pixels compared.
    pub total_pixels: u64,
    /// Number of pixels that differ by at least 1.
    pub different_pixels: u64,
    /// Maximum absolute level difference.
    pub max_diff: u8,
    /// Mean absolute difference over the differing pixels.
    pub mean_diff: f64,
    /// The first differing pixel found (scanning left-to-right, top-to-bottom).
    pub first_diff: Option<DiffInfo>,
    /// Histogram of differences (index = abs_diff, value = count).
    pub diff_histogram: [u64; 256],
}

impl std::fmt::Display for CompareResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.identical {
            return write!(f, "same levels at all {} pixels", self.total_pixels);
        }
        let share = self.different_pixels as f64 / self.total_pixels as f64;
        write!(
            f,
            "levels differ at {} of {} pixels ({:.2}%); largest delta {}, mean delta {:.4}",
            self.different_pixels,
            self.total_pixels,
            share * 100.0,
            self.max_diff,
            self.mean_diff,
        )?;
        if let Some(d) = &self.first_diff {
            write!(f, "\n  first at ({}, {}): {} vs {}", d.x, d.y, d.level_a, d.level_b)?;
        }
        Ok(())
    }
}

// ============================================================================
// Image Comparison
// ============================================================================

/// Compare two images level by level.
///
/// Both images must have the same dimensions. maxval is not compared.
pub fn compare_images(a: &Image, b: &Image) -> Result<CompareResult> {
    ensure!(
        a.width() == b.width() && a.height() == b.height(),
        "size mismatch: {}x{} vs {}x{}",
        a.width(),
        a.height(),
        b.width(),
        b.height()
    );

    let total_pixels = a.len() as u64;
    let mut different_pixels = 0u64;
    let mut max_diff = 0u8;
    let mut total_diff_sum = 0u64;
    let mut first_diff: Option<DiffInfo> = None;
    let mut diff_histogram = [0u64; 256];

    let width = a.width() as usize;
    for (i, (&pa, &pb)) in a.as_slice().iter().zip(b.as_slice()).enumerate() {
        let diff = pa.abs_diff(pb);
        if diff == 0 {
            continue;
        }
        different_pixels += 1;
        max_diff = max_diff.max(diff);
        total_diff_sum += diff as u64;
        diff_histogram[diff as usize] += 1;
        if first_diff.is_none() {
            first_diff = Some(DiffInfo {
                x: (i % width) as u32,
                y: (i / width) as u32,
                level_a: pa,
                level_b: pb,
            });
        }
    }

    let mean_diff = if different_pixels > 0 {
        total_diff_sum as f64 / different_pixels as f64
    } else {
        0.0
    };

    Ok(CompareResult {
        identical: different_pixels == 0,
        total_pixels,
        different_pixels,
        max_diff,
        mean_diff,
        first_diff,
        diff_histogram,
    })
}

/// Generate a diff image highlighting level differences.
///
/// - Identical pixels are black.
/// - Different pixels are bright, proportional to the difference amplified
///   10x (at least 40 so a difference of 1 stays visible).
pub fn generate_diff_image(a: &Image, b: &Image) -> Result<Image> {
    ensure!(
        a.width() == b.width() && a.height() == b.height(),
        "size mismatch: {}x{} vs {}x{}",
        a.width(),
        a.height(),
        b.width(),
        b.height()
    );

    let mut diff = Image::new(a.width(), a.height(), 255)?;
    for ((d, &pa), &pb) in diff
        .as_mut_slice()
        .iter_mut()
        .zip(a.as_slice())
        .zip(b.as_slice())
    {
        let delta = pa.abs_diff(pb) as u16;
        if delta > 0 {
            *d = (delta * 10).clamp(40, 255) as u8;
        }
    }
    Ok(diff)
}

/// Generate a side-by-side comparison image: [A | Diff | B]
pub fn generate_sidebyside(a: &Image, b: &Image) -> Result<Image> {
    let diff = generate_diff_image(a, b)?;
    let maxval = a.maxval().max(b.maxval());
    let mut out = Image::new(a.width() * 3, a.height(), maxval.max(diff.maxval()))?;
    let w = a.width() as i32;
    paste(&mut out, 0, 0, a)?;
    paste(&mut out, w, 0, &diff)?;
    paste(&mut out, w * 2, 0, b)?;
    Ok(out)
}

// ============================================================================
// Tests
// ============================================================================
