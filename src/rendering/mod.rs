//! Document renderer: compose, paginate, write.

pub mod layout;
pub mod paint;
pub mod pdf;
pub mod text;

use std::sync::Arc;

use base64::Engine as Base64Engine;
use sha2::{Digest, Sha256};

use crate::config::ConsentConfig;
use crate::form::PatientFormData;
use crate::signature::SignatureImage;
use crate::{Error, Result};

use layout::SignaturePresence;
use paint::PaintedPage;
use pdf::SignatureImages;

pub const PDF_MIME: &str = "application/pdf";

/// A finished consent PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    filename: String,
    page_count: usize,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, page_count: usize) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            page_count,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime(&self) -> &'static str {
        PDF_MIME
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Hex SHA-256 of the PDF bytes
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    /// Printable form for text-only channels:
    /// `data:application/pdf;filename=<name>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};filename={};base64,{}",
            PDF_MIME,
            self.filename,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Inverse of `to_data_uri`. The payload is everything after the first comma.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (meta, payload) = uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| Error::Transport("not a data URI".into()))?;
        let mut parts = meta.split(';');
        let mime = parts.next().unwrap_or_default();
        if mime != PDF_MIME {
            return Err(Error::Transport(format!("unexpected MIME type '{}'", mime)));
        }
        let mut filename = None;
        let mut is_base64 = false;
        for part in parts {
            if part == "base64" {
                is_base64 = true;
            } else if let Some(name) = part.strip_prefix("filename=") {
                filename = Some(name.to_string());
            }
        }
        if !is_base64 {
            return Err(Error::Transport("payload is not base64".into()));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Transport(format!("bad base64 payload: {}", e)))?;
        let page_count = lopdf::Document::load_mem(&bytes)
            .map(|d| d.get_pages().len())
            .map_err(|e| Error::Transport(format!("payload is not a PDF: {}", e)))?;
        Ok(Self {
            bytes,
            filename: filename.unwrap_or_else(|| "document.pdf".to_string()),
            page_count,
        })
    }
}

/// Renders consent documents from form data and signatures.
///
/// Holds only the immutable configuration, so one renderer can be shared
/// freely; each call builds and owns its own PDF document.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: Arc<ConsentConfig>,
}

impl Renderer {
    /// Create a renderer, validating the configuration first
    pub fn new(config: Arc<ConsentConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    /// Positioned page contents, without writing a PDF
    pub fn layout(
        &self,
        data: &PatientFormData,
        patient: &SignatureImage,
        witness: &SignatureImage,
    ) -> Vec<PaintedPage> {
        let presence = SignaturePresence {
            patient: patient.is_present(),
            witness: witness.is_present(),
        };
        let commands = layout::compose(&self.config, data, presence);
        layout::paginate(&commands, &self.config.layout)
    }

    pub fn render(
        &self,
        data: &PatientFormData,
        patient: &SignatureImage,
        witness: &SignatureImage,
    ) -> Result<RenderedDocument> {
        let pages = self.layout(data, patient, witness);
        let bytes = pdf::write_pdf(
            &pages,
            &self.config.layout,
            SignatureImages { patient, witness },
            &self.config.text.title,
        )
        .map_err(|e| match e {
            Error::RenderFailure(_) => e,
            other => Error::RenderFailure(other.to_string()),
        })?;
        log::info!(
            "Rendered consent form for {}: {} page(s), {} bytes",
            if data.doctor_name.is_empty() { "<no doctor>" } else { data.doctor_name.as_str() },
            pages.len(),
            bytes.len()
        );
        Ok(RenderedDocument::new(
            bytes,
            self.config.text.document_filename.clone(),
            pages.len(),
        ))
    }
}
