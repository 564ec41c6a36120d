//! Consent PDF
//!
//! Collects a patient consent form for AI scribe use and renders it into a
//! PDF ready for download.
//!
//! # Features
//!
//! - **Form collector**: four text fields, two signature pads, and a submit
//!   flow that warns about missing signatures and blocks without a doctor
//! - **Deterministic renderer**: pure layout commands, a single paginating
//!   executor, and a lopdf writer
//! - **Handoff**: the PDF travels as a data URI through a session store to
//!   the confirmation step
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use consent_pdf::{ConsentConfig, ConsentForm, FormField, Prompter, SessionStore};
//!
//! struct Yes;
//! impl Prompter for Yes {
//!     fn confirm(&mut self, _message: &str) -> bool { true }
//!     fn notify(&mut self, message: &str) { eprintln!("{}", message); }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut form = ConsentForm::new(Arc::new(ConsentConfig::default()))?;
//! form.update_field(FormField::Name, "Jane Doe");
//! form.update_field(FormField::Doctor, "Dr. Chelsea Elwood");
//!
//! let mut store = SessionStore::new();
//! let handoff = form.submit(&mut Yes, &mut store)?;
//! println!("send {} to {}", handoff.document.filename(), handoff.contact);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod directory;
pub mod form;
pub mod handoff;
pub mod rendering;
pub mod signature;

pub use config::ConsentConfig;
pub use directory::{DoctorDirectory, DoctorEntry};
pub use form::{ConsentForm, FormField, PatientFormData, Prompter};
pub use handoff::{Confirmation, Download, Handoff, HandoffStore, SessionStore};
pub use rendering::{RenderedDocument, Renderer};
pub use signature::{ImageEncoding, MemoryPad, SignatureImage, SignaturePad};
