//! Error taxonomy for image operations.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type ImageResult<T> = Result<T, ImageError>;

/// Reasons an image operation can fail.
#[derive(Debug)]
pub enum ImageError {
    /// A position or rectangle lies outside the image.
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    /// An argument violates the operation's contract.
    InvalidArgument(String),
    /// A pixel buffer or summed-area table could not be allocated.
    Allocation {
        what: &'static str,
        requested: usize,
    },
    /// Malformed graymap data.
    Format { reason: String },
    /// Underlying reader/writer failure.
    Io(io::Error),
    /// A failure tied to a file on disk.
    Path {
        path: PathBuf,
        source: Box<ImageError>,
    },
}

impl ImageError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ImageError::InvalidArgument(msg.into())
    }

    pub(crate) fn format(reason: impl Into<String>) -> Self {
        ImageError::Format {
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_bounds(x: impl Into<i64>, y: impl Into<i64>, width: u32, height: u32) -> Self {
        ImageError::OutOfBounds {
            x: x.into(),
            y: y.into(),
            width,
            height,
        }
    }

    pub(crate) fn with_path(self, path: impl Into<PathBuf>) -> Self {
        ImageError::Path {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "position ({x}, {y}) out of bounds for {width}x{height} image"),
            ImageError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            ImageError::Allocation { what, requested } => {
                write!(f, "failed to allocate {what} ({requested} elements)")
            }
            ImageError::Format { reason } => write!(f, "invalid graymap: {reason}"),
            ImageError::Io(e) => write!(f, "I/O error: {e}"),
            ImageError::Path { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageError::Io(e) => Some(e),
            ImageError::Path { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for ImageError {
    fn from(e: io::Error) -> Self {
        // A truncated stream is a malformed file, not an environment failure.
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ImageError::format("unexpected end of data")
        } else {
            ImageError::Io(e)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_out_of_bounds() {
        let e = ImageError::out_of_bounds(5, -1, 4, 3);
        assert_eq!(e.to_string(), "position (5, -1) out of bounds for 4x3 image");
    }

    #[test]
    fn test_display_allocation() {
        let e = ImageError::Allocation {
            what: "summed-area table",
            requested: 12,
        };
        assert_eq!(e.to_string(), "failed to allocate summed-area table (12 elements)");
    }

    #[test]
    fn test_path_wraps_source() {
        let e = ImageError::format("bad magic").with_path("a/b.pgm");
        assert_eq!(e.to_string(), "a/b.pgm: invalid graymap: bad magic");
        let src = e.source().expect("path error carries a source");
        assert_eq!(src.to_string(), "invalid graymap: bad magic");
    }

    #[test]
    fn test_from_io_eof_is_format() {
        let e: ImageError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(e, ImageError::Format { .. }));
        let e: ImageError = io::Error::new(io::ErrorKind::NotFound, "nope").into();
        assert!(matches!(e, ImageError::Io(_)));
    }
}
