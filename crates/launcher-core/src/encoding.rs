//! Conversion between caller text (UTF-8) and OS-native wide strings (UTF-16).
//!
//! All strings that cross into or out of the shell pass through [`WideString`],
//! so invalid input is reported as an [`EncodingError`] instead of silently
//! turning into an empty string.

use std::fmt;
use thiserror::Error;

/// Failure converting text across the UTF-8/UTF-16 boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Native APIs take NUL-terminated strings; an embedded NUL would truncate.
    #[error("string contains an interior NUL at position {position}")]
    InteriorNul { position: usize },

    #[error("native string contains an unpaired UTF-16 surrogate")]
    InvalidUtf16,
}

/// An owned UTF-16 string without its terminating NUL.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct WideString(Vec<u16>);

impl WideString {
    /// Encode caller text. Fails on interior NULs.
    pub fn from_utf8(text: &str) -> Result<Self, EncodingError> {
        if let Some(position) = text.find('\0') {
            return Err(EncodingError::InteriorNul { position });
        }
        Ok(Self(text.encode_utf16().collect()))
    }

    /// Copy a native buffer, stopping at the first NUL if there is one.
    pub fn from_wide(wide: &[u16]) -> Self {
        let end = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
        Self(wide[..end].to_vec())
    }

    /// Decode back into caller text.
    pub fn to_utf8(&self) -> Result<String, EncodingError> {
        String::from_utf16(&self.0).map_err(|_| EncodingError::InvalidUtf16)
    }

    /// Copy with a trailing NUL, ready to pass as a `PCWSTR`.
    pub fn to_nul_terminated(&self) -> Vec<u16> {
        let mut buf = Vec::with_capacity(self.0.len() + 1);
        buf.extend_from_slice(&self.0);
        buf.push(0);
        buf
    }

    /// Append another wide string.
    pub fn push(&mut self, other: &WideString) {
        self.0.extend_from_slice(&other.0);
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for WideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf16_lossy(&self.0))
    }
}
