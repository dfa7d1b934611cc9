//! Save-data reader.

use persist_math::{Quat, Vec3};

use crate::{CodecError, MAJOR_VERSION};

/// Reads save data produced by [`crate::Writer`].
///
/// Construction validates the version header; a reader can therefore only
/// exist for a stream this build knows how to decode.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Open a stream, checking its major version.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::VersionMismatch`] if the stream's version is not
    /// [`MAJOR_VERSION`], or [`CodecError::UnexpectedEof`] if it is too short
    /// to hold a version. Only the two version bytes are inspected.
    pub fn new(data: &'a [u8]) -> Result<Self, CodecError> {
        let mut reader = Self { data, pos: 0 };
        let found = reader.read_u16()?;
        if found != MAJOR_VERSION {
            return Err(CodecError::VersionMismatch {
                found,
                expected: MAJOR_VERSION,
            });
        }
        Ok(reader)
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CodecError::UnexpectedEof { needed, remaining });
        }
        let bytes = &self.data[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// Read a `u16` length or element count.
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        Ok(usize::from(self.read_u16()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.take_array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Read a float written by [`crate::Writer::write_float`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_float(&mut self) -> Result<f32, CodecError> {
        Ok(self.read_f64()? as f32)
    }

    pub fn read_vec3(&mut self) -> Result<Vec3, CodecError> {
        Ok(Vec3::new(
            self.read_float()?,
            self.read_float()?,
            self.read_float()?,
        ))
    }

    pub fn read_quat(&mut self) -> Result<Quat, CodecError> {
        Ok(Quat::from_xyzw(
            self.read_float()?,
            self.read_float()?,
            self.read_float()?,
            self.read_float()?,
        ))
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_len()?;
        Ok(self.take(len)?.to_vec())
    }

    /// Byte offset of the next read, counting the version header.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Assert that the whole stream has been consumed.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TrailingBytes`] if anything is left.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}
