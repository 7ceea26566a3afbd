//! # graymap
//!
//! In-memory 8-bit grayscale images.
//!
//! - Load and save binary portable graymaps (PGM `P5`)
//! - Bounds-checked pixel access over an owned row-major buffer
//! - Point transforms: negative, threshold, brighten
//! - Geometric transforms: rotate, mirror, crop, paste, blend
//! - Exact subimage matching and search
//! - Box blur in O(width × height) via a summed-area table
//!
//! ## Architecture
//!
//! Every operation works on an [`Image`]:
//!
//! 1. **Codec** ([`pgm`]): produces and consumes images
//! 2. **Pixel buffer** ([`image`]): storage, accessors, bounds validation
//! 3. **Summed-area table** ([`integral`]): prefix sums over a buffer
//! 4. **Filters and transforms** ([`blur`], [`point_ops`], [`geometry`],
//!    [`search`]): read and rewrite buffers
//!
//! Work counts (pixel accesses, comparisons, sums, divisions) are gathered in
//! a caller-owned [`Counters`] passed to the `*_counted` entry points.
//!
//! ```
//! use graymap::{box_blur, Image};
//!
//! let mut img = Image::from_raw(3, 3, 255, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
//! box_blur(&mut img, 1, 1).unwrap();
//! assert_eq!(img.pixel(0, 0), 3);
//! assert_eq!(img.pixel(1, 1), 5);
//! ```

// Foundation
pub mod basics;
pub mod error;
pub mod instrumentation;

// Storage
pub mod image;
pub mod integral;

// Operations
pub mod blur;
pub mod geometry;
pub mod point_ops;
pub mod search;

// I/O
pub mod pgm;

pub use crate::basics::Rect;
pub use crate::blur::{box_blur, box_blur_counted, BoxWindow};
#[doc(hidden)]
pub use crate::blur::box_blur_reference;
pub use crate::error::{ImageError, ImageResult};
pub use crate::geometry::{blend, crop, mirror, paste, rotate};
pub use crate::image::{Image, PIX_MAX};
pub use crate::instrumentation::Counters;
pub use crate::integral::SummedAreaTable;
pub use crate::pgm::{decode_pgm, encode_pgm, load_pgm, read_pgm, save_pgm, write_pgm};
pub use crate::point_ops::{brighten, negative, threshold};
pub use crate::search::{locate_subimage, match_subimage};
