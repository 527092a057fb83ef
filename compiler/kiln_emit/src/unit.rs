//! The loadable unit: a binary container around a [`ModuleImage`].
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! offset  size  field
//!      0     8  magic "KILNUNIT"
//!      8     2  format version
//!     10     2  output kind (0 = library, 1 = executable)
//!     12     4  payload length
//!     16     8  payload checksum (FxHash)
//!     24     n  bincode-encoded ModuleImage
//! ```

use std::hash::{Hash, Hasher};
use std::path::Path;

use kiln_types::{ModuleMetadata, OutputKind};
use rustc_hash::FxHasher;

use crate::image::ModuleImage;

pub const MAGIC: &[u8; 8] = b"KILNUNIT";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 24;

/// Why bytes could not be decoded into a module image.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("unit is truncated: {len} bytes is shorter than the {HEADER_LEN}-byte header")]
    Truncated { len: usize },
    #[error("not a Kiln unit (bad magic number)")]
    BadMagic,
    #[error("unsupported unit format version {found} (this toolchain reads version {FORMAT_VERSION})")]
    UnsupportedVersion { found: u16 },
    #[error("invalid output kind flag {0}")]
    BadOutputKind(u16),
    #[error("payload length mismatch: header says {declared} bytes, found {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("payload of {len} bytes exceeds the 4 GiB limit")]
    TooLarge { len: usize },
    #[error("payload checksum mismatch")]
    ChecksumMismatch,
    #[error("payload could not be decoded: {0}")]
    Payload(String),
    #[error("header says {header:?} but the payload is {payload:?}")]
    KindMismatch {
        header: OutputKind,
        payload: OutputKind,
    },
}

/// Compiled bytes, as handed to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadableUnit {
    bytes: Vec<u8>,
}

impl LoadableUnit {
    /// Wrap bytes without validating them; [`LoadableUnit::decode`] does that.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        LoadableUnit { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn read_from(path: &Path) -> std::io::Result<Self> {
        std::fs::read(path).map(LoadableUnit::from_bytes)
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }

    /// Serialize an image. Fails only if the payload exceeds 4 GiB or the
    /// encoder rejects it.
    pub fn encode(image: &ModuleImage) -> Result<Self, FormatError> {
        let payload = bincode::serialize(image).map_err(|e| FormatError::Payload(e.to_string()))?;
        let declared = u32::try_from(payload.len())
            .map_err(|_| FormatError::TooLarge { len: payload.len() })?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&kind_flag(image.output_kind).to_le_bytes());
        bytes.extend_from_slice(&declared.to_le_bytes());
        bytes.extend_from_slice(&checksum(&payload).to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(LoadableUnit { bytes })
    }

    /// Validate the header and checksum, then decode the payload.
    pub fn decode(&self) -> Result<ModuleImage, FormatError> {
        let header = self.header()?;
        let payload = &self.bytes[HEADER_LEN..];
        if payload.len() != header.payload_len {
            return Err(FormatError::LengthMismatch {
                declared: header.payload_len,
                actual: payload.len(),
            });
        }
        if checksum(payload) != header.checksum {
            return Err(FormatError::ChecksumMismatch);
        }
        let image: ModuleImage =
            bincode::deserialize(payload).map_err(|e| FormatError::Payload(e.to_string()))?;
        if image.output_kind != header.output_kind {
            return Err(FormatError::KindMismatch {
                header: header.output_kind,
                payload: image.output_kind,
            });
        }
        Ok(image)
    }

    /// Output kind from the header alone.
    pub fn output_kind(&self) -> Result<OutputKind, FormatError> {
        self.header().map(|h| h.output_kind)
    }

    /// Public surface of the unit, for use as a compile reference.
    pub fn metadata(&self) -> Result<ModuleMetadata, FormatError> {
        self.decode().map(|image| image.metadata)
    }

    fn header(&self) -> Result<Header, FormatError> {
        let bytes = &self.bytes;
        if bytes.len() < HEADER_LEN {
            return Err(FormatError::Truncated { len: bytes.len() });
        }
        if &bytes[0..8] != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let version = u16::from_le_bytes([bytes[8], bytes[9]]);
        if version != FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion { found: version });
        }
        let flag = u16::from_le_bytes([bytes[10], bytes[11]]);
        let output_kind = match flag {
            0 => OutputKind::Library,
            1 => OutputKind::Executable,
            other => return Err(FormatError::BadOutputKind(other)),
        };
        let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
        let mut sum = [0u8; 8];
        sum.copy_from_slice(&bytes[16..24]);
        Ok(Header {
            output_kind,
            payload_len,
            checksum: u64::from_le_bytes(sum),
        })
    }
}

struct Header {
    output_kind: OutputKind,
    payload_len: usize,
    checksum: u64,
}

fn kind_flag(kind: OutputKind) -> u16 {
    match kind {
        OutputKind::Library => 0,
        OutputKind::Executable => 1,
    }
}

fn checksum(payload: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    payload.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
