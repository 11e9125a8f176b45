//! Program image format.
//!
//! A binary image is a two-byte little-endian load address followed by the
//! bytes to place at that address. There is no length field; everything
//! after the header is payload. Payloads that run past 0xFFFF wrap to 0x0000
//! when loaded.

use std::path::Path;
use thiserror::Error;

/// A parsed program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    /// Where the payload is loaded, and the initial program counter.
    pub load_address: u16,
    /// Bytes copied into memory.
    pub bytes: Vec<u8>,
}

impl ProgramImage {
    pub fn new(load_address: u16, bytes: Vec<u8>) -> Self {
        Self { load_address, bytes }
    }

    /// Parse an image from its on-disk bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ImageError> {
        match data {
            [lo, hi, payload @ ..] => Ok(Self {
                load_address: u16::from_le_bytes([*lo, *hi]),
                bytes: payload.to_vec(),
            }),
            _ => Err(ImageError::MissingHeader { len: data.len() }),
        }
    }

    /// Encode the image in its on-disk form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len() + 2);
        out.extend_from_slice(&self.load_address.to_le_bytes());
        out.extend_from_slice(&self.bytes);
        out
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Load an image file from disk.
///
/// The whole file is read before anything is returned, so a failure never
/// leaves a caller with a partial image.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| ImageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let image = ProgramImage::parse(&data)?;
    log::debug!(
        "loaded {} bytes at ${:04X} from {}",
        image.len(),
        image.load_address,
        path.display()
    );
    Ok(image)
}

/// Write an image file to disk.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ProgramImage) -> Result<(), ImageError> {
    let path = path.as_ref();
    std::fs::write(path, image.to_bytes()).map_err(|e| ImageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Errors that can occur while loading or saving an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("failed to access '{path}': {message}")]
    Io { path: String, message: String },

    #[error("image is {len} byte(s) long; the 2-byte load address is missing")]
    MissingHeader { len: usize },
}
