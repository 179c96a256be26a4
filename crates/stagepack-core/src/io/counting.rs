//! Byte-counting I/O wrappers.
//!
//! `CountingWriter` sits between the compression encoder and the output
//! file so the report can state the compressed archive size.
//! `CountingReader` wraps each staged file so the builder can verify that
//! exactly the announced number of bytes went into the entry body.

use std::io;
use std::io::Read;
use std::io::Write;

/// Writer that tracks the total number of bytes accepted by the inner writer.
///
/// Only successful writes are counted.
///
/// # Examples
///
/// ```
/// use stagepack_core::io::CountingWriter;
/// use std::io::Write;
///
/// let mut writer = CountingWriter::new(Vec::new());
/// writer.write_all(b"staged")?;
/// assert_eq!(writer.total_bytes(), 6);
/// assert_eq!(writer.into_inner(), b"staged");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Creates a new counting writer.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Returns the total number of bytes successfully written.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns a reference to the inner writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consumes the counting writer and returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Reader that tracks the total number of bytes read from the inner reader.
///
/// # Examples
///
/// ```
/// use stagepack_core::io::CountingReader;
/// use std::io::Read;
///
/// let mut reader = CountingReader::new(&b"content"[..]);
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out)?;
/// assert_eq!(reader.total_bytes(), 7);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct CountingReader<R> {
    inner: R,
    bytes_read: u64,
    failed: bool,
}

impl<R> CountingReader<R> {
    /// Creates a new counting reader.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
            failed: false,
        }
    }

    /// Returns the total number of bytes read so far.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_read
    }

    /// Returns `true` if a read from the inner reader returned an error.
    ///
    /// Lets a caller that hands this reader to a copy loop tell source
    /// errors apart from sink errors.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(bytes) => {
                self.bytes_read += bytes as u64;
                Ok(bytes)
            }
            Err(err) => {
                if err.kind() != io::ErrorKind::Interrupted {
                    self.failed = true;
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_writer_multiple_writes() {
        let mut writer = CountingWriter::new(Vec::new());

        for i in 0..10 {
            write!(writer, "{i}").unwrap();
        }

        assert_eq!(writer.total_bytes(), 10);
        assert_eq!(writer.get_ref(), b"0123456789");
    }

    #[test]
    fn test_counting_writer_partial_write() {
        struct LimitedWriter {
            inner: Vec<u8>,
            max_write: usize,
        }

        impl Write for LimitedWriter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                let to_write = buf.len().min(self.max_write);
                self.inner.extend_from_slice(&buf[..to_write]);
                Ok(to_write)
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let limited = LimitedWriter {
            inner: Vec::new(),
            max_write: 3,
        };
        let mut writer = CountingWriter::new(limited);

        let written = writer.write(b"hello").unwrap();
        assert_eq!(written, 3);
        assert_eq!(writer.total_bytes(), 3);
        assert_eq!(writer.get_ref().inner, b"hel");
    }

    #[test]
    fn test_counting_writer_does_not_count_failed_writes() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut writer = CountingWriter::new(FailingWriter);
        assert!(writer.write_all(b"data").is_err());
        assert_eq!(writer.total_bytes(), 0);
    }

    #[test]
    fn test_counting_reader_with_take() {
        let data = vec![7u8; 25];
        let mut reader = CountingReader::new(data.as_slice()).take(10);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();

        assert_eq!(out.len(), 10);
        assert_eq!(reader.get_ref().total_bytes(), 10);
    }

    #[test]
    fn test_counting_reader_records_failure() {
        struct BrokenReader;

        impl Read for BrokenReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
        }

        let mut reader = CountingReader::new(BrokenReader);
        assert!(!reader.failed());
        let mut out = Vec::new();
        assert!(reader.read_to_end(&mut out).is_err());
        assert!(reader.failed());
        assert_eq!(reader.total_bytes(), 0);
    }

    #[test]
    fn test_counting_reader_empty() {
        let mut reader = CountingReader::new(&b""[..]);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(reader.total_bytes(), 0);
    }
}
