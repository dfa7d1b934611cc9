//! # persist_codec
//!
//! The binary protocol underneath every save file and entity snapshot.
//!
//! This crate provides:
//!
//! - [`Writer`]: appends primitives to an in-memory buffer, starting with
//!   the format's major version.
//! - [`Reader`]: reads them back, refusing streams written by any other
//!   major version.
//! - [`CodecError`]: everything that can go wrong at the byte level.
//!
//! All multi-byte values are little-endian. Strings, blobs, and element
//! counts are prefixed with a `u16`, so none of them may exceed
//! [`MAX_LEN`] elements.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::CodecError;
pub use reader::Reader;
pub use writer::Writer;

/// The current save/load major version.
///
/// Bump this whenever saving or loading code changes in a way that old data
/// can no longer be read. There is no migration path: every existing save
/// file becomes unreadable.
pub const MAJOR_VERSION: u16 = 1;

/// Largest length a string, blob, or element count can encode.
pub const MAX_LEN: usize = u16::MAX as usize;
