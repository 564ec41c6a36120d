//! Signature images and the signature pad seam

use std::path::Path;

use base64::Engine as Base64Engine;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Raster encoding of a captured signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Png,
    Jpeg,
}

impl ImageEncoding {
    /// Detect the encoding from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageEncoding::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            Some(ImageEncoding::Jpeg)
        } else {
            None
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageEncoding::Png => "image/png",
            ImageEncoding::Jpeg => "image/jpeg",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageEncoding::Png),
            "image/jpeg" | "image/jpg" => Some(ImageEncoding::Jpeg),
            _ => None,
        }
    }

    pub(crate) fn image_format(&self) -> image::ImageFormat {
        match self {
            ImageEncoding::Png => image::ImageFormat::Png,
            ImageEncoding::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// A signature as the renderer sees it: either an image or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureImage {
    Present { bytes: Vec<u8>, encoding: ImageEncoding },
    Absent,
}

impl SignatureImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        SignatureImage::Present {
            bytes,
            encoding: ImageEncoding::Png,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SignatureImage::Present { .. })
    }

    /// Parse a `data:image/png;base64,...` URL as emitted by a canvas pad
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidSignature("not a data URL".into()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidSignature("data URL has no payload".into()))?;
        let mut parts = meta.split(';');
        let mime = parts.next().unwrap_or_default();
        if !parts.any(|p| p == "base64") {
            return Err(Error::InvalidSignature(
                "only base64 data URLs are supported".into(),
            ));
        }
        let encoding = ImageEncoding::from_mime(mime).ok_or_else(|| {
            Error::InvalidSignature(format!("unsupported signature type '{}'", mime))
        })?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidSignature(format!("bad base64: {}", e)))?;
        Ok(SignatureImage::Present { bytes, encoding })
    }

    /// Read an image file, detecting PNG or JPEG from its contents
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let encoding = ImageEncoding::sniff(&bytes).ok_or_else(|| {
            Error::InvalidSignature(format!("{} is neither PNG nor JPEG", path.display()))
        })?;
        Ok(SignatureImage::Present { bytes, encoding })
    }
}

/// Signature capture surface.
///
/// The capture mechanism itself lives outside this crate; a pad only has to
/// say whether anything was drawn and hand over the raster.
pub trait SignaturePad {
    fn is_empty(&self) -> bool;

    /// Export the drawn signature. Only called when the pad is not empty.
    fn snapshot(&self) -> Result<SignatureImage>;

    fn clear(&mut self);
}

/// In-memory pad holding an already captured image
#[derive(Debug, Clone, Default)]
pub struct MemoryPad {
    image: Option<(Vec<u8>, ImageEncoding)>,
}

impl MemoryPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(bytes: Vec<u8>, encoding: ImageEncoding) -> Self {
        Self {
            image: Some((bytes, encoding)),
        }
    }

    pub fn draw(&mut self, image: SignatureImage) {
        self.image = match image {
            SignatureImage::Present { bytes, encoding } => Some((bytes, encoding)),
            SignatureImage::Absent => None,
        };
    }
}

impl SignaturePad for MemoryPad {
    fn is_empty(&self) -> bool {
        self.image.is_none()
    }

    fn snapshot(&self) -> Result<SignatureImage> {
        match &self.image {
            Some((bytes, encoding)) => Ok(SignatureImage::Present {
                bytes: bytes.clone(),
                encoding: *encoding,
            }),
            None => Ok(SignatureImage::Absent),
        }
    }

    fn clear(&mut self) {
        self.image = None;
    }
}

/// Resolve a pad to `Present` or `Absent`; a failed export counts as absent.
pub(crate) fn capture(pad: &dyn SignaturePad, which: &str) -> SignatureImage {
    if pad.is_empty() {
        return SignatureImage::Absent;
    }
    match pad.snapshot() {
        Ok(sig) => sig,
        Err(e) => {
            log::warn!("Error getting {} signature: {}", which, e);
            SignatureImage::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    struct BrokenPad;

    impl SignaturePad for BrokenPad {
        fn is_empty(&self) -> bool {
            false
        }
        fn snapshot(&self) -> Result<SignatureImage> {
            Err(Error::InvalidSignature("canvas tainted".into()))
        }
        fn clear(&mut self) {}
    }

    #[test]
    fn sniff_detects_png_and_jpeg() {
        assert_eq!(ImageEncoding::sniff(&PNG_MAGIC), Some(ImageEncoding::Png));
        assert_eq!(ImageEncoding::sniff(&[0xFF, 0xD8, 0xFF]), Some(ImageEncoding::Jpeg));
        assert_eq!(ImageEncoding::sniff(b"GIF89a"), None);
    }

    #[test]
    fn data_url_decodes_payload() {
        let url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC)
        );
        let sig = SignatureImage::from_data_url(&url).unwrap();
        assert_eq!(sig, SignatureImage::png(PNG_MAGIC.to_vec()));
    }

    #[test]
    fn data_url_rejects_other_types() {
        assert!(SignatureImage::from_data_url("data:image/gif;base64,AAAA").is_err());
        assert!(SignatureImage::from_data_url("data:image/png,raw").is_err());
        assert!(SignatureImage::from_data_url("image/png;base64,AAAA").is_err());
    }

    #[test]
    fn memory_pad_clear_is_idempotent() {
        let mut pad = MemoryPad::with_image(PNG_MAGIC.to_vec(), ImageEncoding::Png);
        assert!(!pad.is_empty());
        pad.clear();
        pad.clear();
        assert!(pad.is_empty());
        assert_eq!(capture(&pad, "patient"), SignatureImage::Absent);
    }

    #[test]
    fn failed_snapshot_counts_as_absent() {
        assert_eq!(capture(&BrokenPad, "witness"), SignatureImage::Absent);
    }
}
