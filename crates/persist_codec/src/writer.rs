//! Save-data writer.

use persist_math::{Quat, Vec3};

use crate::{CodecError, MAJOR_VERSION};

/// Appends save data to an in-memory buffer.
///
/// Every writer begins its buffer with a 16-bit major version, so each
/// buffer it produces is a self-contained stream that [`crate::Reader`] can
/// open on its own.
#[derive(Debug, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create a writer for the current [`MAJOR_VERSION`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_version(MAJOR_VERSION)
    }

    /// Create a writer that stamps an arbitrary version.
    ///
    /// Only useful for producing streams a reader is expected to reject.
    #[must_use]
    pub fn with_version(version: u16) -> Self {
        let mut writer = Self { buf: Vec::new() };
        writer.write_u16(version);
        writer
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a string, array, or blob length as a `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TooLong`] if `len` exceeds [`crate::MAX_LEN`].
    /// Nothing is written in that case.
    pub fn write_len(&mut self, kind: &'static str, len: usize) -> Result<(), CodecError> {
        let len16 = u16::try_from(len).map_err(|_| CodecError::TooLong { kind, len })?;
        self.write_u16(len16);
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a float. Stored as a double, so every `f32` survives exactly.
    pub fn write_float(&mut self, value: f32) {
        self.write_f64(f64::from(value));
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_float(value.x);
        self.write_float(value.y);
        self.write_float(value.z);
    }

    pub fn write_quat(&mut self, value: Quat) {
        self.write_float(value.x);
        self.write_float(value.y);
        self.write_float(value.z);
        self.write_float(value.w);
    }

    /// Write a UTF-8 string with a 16-bit byte-length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TooLong`] for strings over 65535 bytes.
    pub fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.write_len("string", value.len())?;
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Write a length-prefixed byte blob.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TooLong`] for blobs over 65535 bytes.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), CodecError> {
        self.write_len("blob", value.len())?;
        self.buf.extend_from_slice(value);
        Ok(())
    }

    /// Total bytes written so far, including the version header.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always `false`: a writer holds at least its version header.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
