//! I/O wrappers used by the archive pipeline.

pub mod counting;

pub use counting::CountingReader;
pub use counting::CountingWriter;
