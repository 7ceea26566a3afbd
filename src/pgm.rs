//! Binary portable graymap (PGM `P5`) reader and writer.
//!
//! Layout: the magic `P5`, then width, height and maxval as ASCII decimals
//! separated by whitespace, then exactly one whitespace byte, then
//! `width * height` raw bytes in raster order. A `#` starts a comment that
//! runs to the end of the line; comments may appear wherever whitespace is
//! allowed between header tokens.
//!
//! Only 8-bit files (`maxval <= 255`) are accepted. Files are written as
//! `P5\n<width> <height>\n<maxval>\n<pixels>`, so anything written by
//! [`save_pgm`] reads back and re-encodes to the same bytes.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::error::{ImageError, ImageResult};
use crate::image::{pixel_count, Image, PIX_MAX};
use crate::instrumentation::Counters;

/// Magic number of binary graymaps.
pub const MAGIC: &[u8; 2] = b"P5";

// ============================================================================
// Header parsing
// ============================================================================

/// Byte-level cursor over the header of a graymap stream.
struct HeaderReader<R> {
    inner: R,
}

impl<R: BufRead> HeaderReader<R> {
    fn new(inner: R) -> Self {
        Self { inner }
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.inner.fill_buf()?.first().copied())
    }

    fn bump(&mut self) {
        self.inner.consume(1);
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let b = self.peek()?;
        if b.is_some() {
            self.bump();
        }
        Ok(b)
    }

    /// Skip whitespace and `#` comments. Returns `true` if anything was
    /// skipped.
    fn skip_separators(&mut self) -> io::Result<bool> {
        let mut skipped = false;
        while let Some(b) = self.peek()? {
            if b.is_ascii_whitespace() {
                self.bump();
            } else if b == b'#' {
                while let Some(c) = self.next_byte()? {
                    if c == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
            skipped = true;
        }
        Ok(skipped)
    }

    /// Parse an unsigned decimal token after skipping separators.
    fn number(&mut self, what: &str) -> ImageResult<u32> {
        self.skip_separators()?;
        let mut value: u32 = 0;
        let mut digits = 0usize;
        while let Some(b) = self.peek()? {
            if !b.is_ascii_digit() {
                break;
            }
            self.bump();
            digits += 1;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as u32))
                .ok_or_else(|| ImageError::format(format!("{what} is too large")))?;
        }
        if digits == 0 {
            return Err(ImageError::format(format!("invalid {what}")));
        }
        Ok(value)
    }

    fn into_inner(self) -> R {
        self.inner
    }
}

/// Parsed graymap header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PgmHeader {
    width: u32,
    height: u32,
    maxval: u8,
}

fn read_header<R: BufRead>(reader: &mut HeaderReader<R>) -> ImageResult<PgmHeader> {
    let mut magic = [0u8; 2];
    for b in magic.iter_mut() {
        *b = reader
            .next_byte()?
            .ok_or_else(|| ImageError::format("missing magic number"))?;
    }
    if &magic != MAGIC {
        return Err(ImageError::format(format!(
            "invalid file format (magic {:?}, expected \"P5\")",
            String::from_utf8_lossy(&magic)
        )));
    }
    if !reader.skip_separators()? {
        return Err(ImageError::format("whitespace expected after magic number"));
    }

    let width = reader.number("width")?;
    let height = reader.number("height")?;
    let maxval = reader.number("maxval")?;
    if maxval == 0 || maxval > PIX_MAX as u32 {
        return Err(ImageError::format(format!(
            "invalid maxval {maxval} (expected 1..={PIX_MAX})"
        )));
    }
    match reader.next_byte()? {
        Some(b) if b.is_ascii_whitespace() => {}
        _ => return Err(ImageError::format("whitespace expected after maxval")),
    }

    Ok(PgmHeader {
        width,
        height,
        maxval: maxval as u8,
    })
}

// ============================================================================
// Decoding
// ============================================================================

/// Read a binary graymap from `reader`.
pub fn read_pgm<R: Read>(reader: R) -> ImageResult<Image> {
    let mut header_reader = HeaderReader::new(BufReader::new(reader));
    let header = read_header(&mut header_reader)?;
    let body = header_reader.into_inner();

    // Buffer grows with the bytes present, not the header's claimed size.
    let len = pixel_count(header.width, header.height, "pixel buffer")?;
    let mut pixels = Vec::new();
    body.take(len as u64).read_to_end(&mut pixels)?;
    if pixels.len() < len {
        return Err(ImageError::format(format!(
            "pixel data truncated (expected {len} bytes, found {})",
            pixels.len()
        )));
    }

    if let Some(i) = pixels.iter().position(|&p| p > header.maxval) {
        return Err(ImageError::format(format!(
            "level {} at pixel {i} exceeds maxval {}",
            pixels[i], header.maxval
        )));
    }
    Image::from_raw(header.width, header.height, header.maxval, pixels)
}

/// Decode a binary graymap held in memory.
pub fn decode_pgm(data: &[u8]) -> ImageResult<Image> {
    read_pgm(data)
}

/// Load a binary graymap file.
pub fn load_pgm(path: impl AsRef<Path>) -> ImageResult<Image> {
    let mut counters = Counters::new();
    load_pgm_counted(path, &mut counters)
}

/// [`load_pgm`], counting one pixel access per pixel read.
pub fn load_pgm_counted(path: impl AsRef<Path>, counters: &mut Counters) -> ImageResult<Image> {
    let path = path.as_ref();
    let img = File::open(path)
        .map_err(ImageError::from)
        .and_then(read_pgm)
        .map_err(|e| e.with_path(path))?;
    counters.add_pixmem(img.len() as u64);
    debug!(
        "loaded {} ({}x{}, maxval {})",
        path.display(),
        img.width(),
        img.height(),
        img.maxval()
    );
    Ok(img)
}

// ============================================================================
// Encoding
// ============================================================================

fn header_line(img: &Image) -> String {
    format!("P5\n{} {}\n{}\n", img.width(), img.height(), img.maxval())
}

/// Write `img` as a binary graymap.
pub fn write_pgm<W: Write>(mut writer: W, img: &Image) -> ImageResult<()> {
    writer.write_all(header_line(img).as_bytes())?;
    writer.write_all(img.as_slice())?;
    writer.flush()?;
    Ok(())
}

/// Encode `img` into an in-memory graymap.
pub fn encode_pgm(img: &Image) -> Vec<u8> {
    let header = header_line(img);
    let mut out = Vec::with_capacity(header.len() + img.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(img.as_slice());
    out
}

/// Save `img` to a binary graymap file.
///
/// On failure a partial file may be left behind.
pub fn save_pgm(path: impl AsRef<Path>, img: &Image) -> ImageResult<()> {
    let mut counters = Counters::new();
    save_pgm_counted(path, img, &mut counters)
}

/// [`save_pgm`], counting one pixel access per pixel written.
pub fn save_pgm_counted(path: impl AsRef<Path>, img: &Image, counters: &mut Counters) -> ImageResult<()> {
    let path = path.as_ref();
    File::create(path)
        .map_err(ImageError::from)
        .and_then(|f| write_pgm(BufWriter::new(f), img))
        .map_err(|e| e.with_path(path))?;
    counters.add_pixmem(img.len() as u64);
    debug!(
        "saved {} ({}x{}, maxval {})",
        path.display(),
        img.width(),
        img.height(),
        img.maxval()
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_format_err(data: &[u8], needle: &str) {
        match decode_pgm(data) {
            Err(ImageError::Format { reason }) => {
                assert!(reason.contains(needle), "reason {reason:?} lacks {needle:?}")
            }
            other => panic!("expected format error containing {needle:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_minimal() {
        let img = decode_pgm(b"P5\n3 2\n255\n\x00\x01\x02\x03\x04\x05").unwrap();
        assert_eq!((img.width(), img.height(), img.maxval()), (3, 2, 255));
        assert_eq!(img.as_slice(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_decode_with_comments() {
        let data = b"P5\n# created by hand\n2 # width\n# more\n1\n#maxval next\n100\n\x0a\x64";
        let img = decode_pgm(data).unwrap();
        assert_eq!((img.width(), img.height(), img.maxval()), (2, 1, 100));
        // Body bytes that look like whitespace are still pixels.
        assert_eq!(img.as_slice(), &[10, 100]);
    }

    #[test]
    fn test_decode_single_space_separators() {
        let img = decode_pgm(b"P5 2 2 15 \x01\x02\x03\x0f").unwrap();
        assert_eq!(img.as_slice(), &[1, 2, 3, 15]);
    }

    #[test]
    fn test_decode_empty_image() {
        let img = decode_pgm(b"P5\n0 0\n255\n").unwrap();
        assert!(img.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        assert_format_err(b"P2\n1 1\n255\n0", "invalid file format");
        assert_format_err(b"P", "missing magic");
        assert_format_err(b"P51 1 255\n\x00", "whitespace expected after magic");
    }

    #[test]
    fn test_decode_rejects_bad_numbers() {
        assert_format_err(b"P5\n-1 1\n255\n\x00", "invalid width");
        assert_format_err(b"P5\n1 x\n255\n\x00", "invalid height");
        assert_format_err(b"P5\n1 1\n\n", "invalid maxval");
        assert_format_err(b"P5\n1 1\n0\n\x00", "invalid maxval 0");
        assert_format_err(b"P5\n1 1\n256\n\x00", "invalid maxval 256");
        assert_format_err(b"P5\n99999999999 1\n255\n", "width is too large");
    }

    #[test]
    fn test_decode_requires_whitespace_after_maxval() {
        assert_format_err(b"P5\n1 1\n255", "whitespace expected after maxval");
    }

    #[test]
    fn test_decode_truncated_body() {
        assert_format_err(b"P5\n2 2\n255\n\x00\x01\x02", "truncated");
    }

    #[test]
    fn test_decode_huge_header_with_tiny_body() {
        // Header claims about 4 GiB of pixels.
        assert_format_err(b"P5\n65535 65535\n255\n\x00\x01\x02", "found 3");
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let img = decode_pgm(b"P5\n2 1\n255\n\x01\x02\x03\x04").unwrap();
        assert_eq!(img.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_write_matches_encode() {
        let img = Image::from_raw(3, 1, 9, vec![0, 4, 9]).unwrap();
        let mut out = Vec::new();
        write_pgm(&mut out, &img).unwrap();
        assert_eq!(out, encode_pgm(&img));
    }

    #[test]
    fn test_decode_rejects_level_above_maxval() {
        assert_format_err(b"P5\n2 1\n10\n\x05\x0b", "exceeds maxval");
    }

    #[test]
    fn test_encode_layout() {
        let img = Image::from_raw(2, 1, 200, vec![7, 200]).unwrap();
        assert_eq!(encode_pgm(&img), b"P5\n2 1\n200\n\x07\xc8".to_vec());
    }

    #[test]
    fn test_encode_decode_preserves_bytes() {
        let data = b"P5\n4 2\n255\n\x00\x10\x20\x30\x40\x50\x60\x70".to_vec();
        let img = decode_pgm(&data).unwrap();
        assert_eq!(encode_pgm(&img), data);
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = std::env::temp_dir().join(format!("graymap-pgm-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ramp.pgm");

        let img = Image::from_raw(3, 3, 255, (0..9).map(|i| i * 20).collect()).unwrap();
        let mut c = Counters::new();
        save_pgm_counted(&path, &img, &mut c).unwrap();
        let back = load_pgm_counted(&path, &mut c).unwrap();
        assert_eq!(back, img);
        assert_eq!(c.pixmem, 18);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, encode_pgm(&img));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = load_pgm("/definitely/not/here.pgm").unwrap_err();
        match &err {
            ImageError::Path { path, source } => {
                assert!(path.ends_with("here.pgm"));
                assert!(matches!(**source, ImageError::Io(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().starts_with("/definitely/not/here.pgm: "));
    }
}
