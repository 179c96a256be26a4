//! Compression codecs wrapped around the tar stream.
//!
//! User compression levels follow one scale for every codec:
//!
//! - **1-3**: Fast compression
//! - **6**: Default compression
//! - **7-9**: Best compression
//!
//! Each codec maps these levels to its own internal scale.

use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZIP2_MAGIC: [u8; 3] = *b"BZh";
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression codec applied to the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Gzip (deflate). Headers carry no timestamp or file name.
    #[default]
    Gzip,
    /// Bzip2.
    Bzip2,
    /// Xz (LZMA2).
    Xz,
    /// Zstandard, with frame checksums.
    Zstd,
}

impl Codec {
    /// Returns the conventional archive extension for this codec.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagepack_core::Codec;
    ///
    /// assert_eq!(Codec::Gzip.extension(), "tar.gz");
    /// assert_eq!(Codec::Zstd.extension(), "tar.zst");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
            Self::Xz => "tar.xz",
            Self::Zstd => "tar.zst",
        }
    }

    /// Detects the codec from an archive file name.
    ///
    /// Returns `None` for extensions that name no known compressed tar.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagepack_core::Codec;
    /// use std::path::Path;
    ///
    /// assert_eq!(Codec::from_path(Path::new("pkg.tgz")), Some(Codec::Gzip));
    /// assert_eq!(Codec::from_path(Path::new("pkg.tar.xz")), Some(Codec::Xz));
    /// assert_eq!(Codec::from_path(Path::new("pkg.zip")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "gz" | "tgz" => Some(Self::Gzip),
            "bz2" | "tbz" | "tbz2" => Some(Self::Bzip2),
            "xz" | "txz" => Some(Self::Xz),
            "zst" | "tzst" => Some(Self::Zstd),
            _ => None,
        }
    }

    /// Detects the codec from the leading bytes of a compressed stream.
    #[must_use]
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            Some(Self::Gzip)
        } else if bytes.starts_with(&BZIP2_MAGIC) {
            Some(Self::Bzip2)
        } else if bytes.starts_with(&XZ_MAGIC) {
            Some(Self::Xz)
        } else if bytes.starts_with(&ZSTD_MAGIC) {
            Some(Self::Zstd)
        } else {
            None
        }
    }

    /// Parses a codec name as used on the command line.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagepack_core::Codec;
    ///
    /// assert_eq!(Codec::from_name("zstd"), Some(Codec::Zstd));
    /// assert_eq!(Codec::from_name("GZ"), Some(Codec::Gzip));
    /// assert_eq!(Codec::from_name("lz4"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Some(Self::Gzip),
            "bzip2" | "bz2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            "zstd" | "zst" => Some(Self::Zstd),
            _ => None,
        }
    }

    /// Wraps `writer` in this codec's encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder cannot be initialized.
    pub fn encoder<W: Write>(self, writer: W, level: Option<u8>) -> io::Result<Encoder<W>> {
        let encoder = match self {
            Self::Gzip => Encoder::Gzip(flate2::write::GzEncoder::new(
                writer,
                level_to_flate2(level),
            )),
            Self::Bzip2 => Encoder::Bzip2(bzip2::write::BzEncoder::new(
                writer,
                level_to_bzip2(level),
            )),
            Self::Xz => Encoder::Xz(xz2::write::XzEncoder::new(writer, level_to_xz(level))),
            Self::Zstd => {
                let mut encoder = zstd::Encoder::new(writer, level_to_zstd(level))?;
                encoder.include_checksum(true)?;
                Encoder::Zstd(encoder)
            }
        };
        Ok(encoder)
    }

    /// Wraps `reader` in this codec's decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder cannot be initialized.
    pub fn decoder<'a, R: Read + 'a>(self, reader: R) -> io::Result<Box<dyn Read + 'a>> {
        let decoder: Box<dyn Read + 'a> = match self {
            Self::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Self::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Self::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Self::Zstd => Box::new(zstd::Decoder::new(reader)?),
        };
        Ok(decoder)
    }
}

/// Streaming compression encoder over `W`.
///
/// Dropping an encoder without calling [`Encoder::finish`] may leave the
/// compressed stream without its trailer.
pub enum Encoder<W: Write> {
    /// Gzip encoder.
    Gzip(flate2::write::GzEncoder<W>),
    /// Bzip2 encoder.
    Bzip2(bzip2::write::BzEncoder<W>),
    /// Xz encoder.
    Xz(xz2::write::XzEncoder<W>),
    /// Zstd encoder.
    Zstd(zstd::Encoder<'static, W>),
}

impl<W: Write> Encoder<W> {
    /// Writes the compression trailer and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailer cannot be written.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Gzip(encoder) => encoder.finish(),
            Self::Bzip2(encoder) => encoder.finish(),
            Self::Xz(encoder) => encoder.finish(),
            Self::Zstd(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Gzip(encoder) => encoder.write(buf),
            Self::Bzip2(encoder) => encoder.write(buf),
            Self::Xz(encoder) => encoder.write(buf),
            Self::Zstd(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Gzip(encoder) => encoder.flush(),
            Self::Bzip2(encoder) => encoder.flush(),
            Self::Xz(encoder) => encoder.flush(),
            Self::Zstd(encoder) => encoder.flush(),
        }
    }
}

fn level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n)),
    }
}

fn level_to_bzip2(level: Option<u8>) -> bzip2::Compression {
    match level {
        None | Some(6) => bzip2::Compression::default(),
        Some(1) => bzip2::Compression::fast(),
        Some(7..=9) => bzip2::Compression::best(),
        Some(n) => bzip2::Compression::new(u32::from(n.min(9))),
    }
}

fn level_to_xz(level: Option<u8>) -> u32 {
    level.map_or(6, |n| u32::from(n.min(9)))
}

#[allow(clippy::match_same_arms)]
fn level_to_zstd(level: Option<u8>) -> i32 {
    match level {
        None | Some(6) => 3,
        Some(1) => 1,
        Some(2) => 2,
        Some(7) => 10,
        Some(8) => 15,
        Some(9) => 19,
        _ => 3,
    }
}
