//! Shared low-level helpers.
//!
//! - [`BlobSink`] - append-only output with the ECMA-335 compressed encodings

mod io;

pub use io::{
    write_compressed_int, write_compressed_uint, BlobSink, MAX_COMPRESSED_INT,
    MAX_COMPRESSED_UINT, MIN_COMPRESSED_INT,
};
