//! Handoff between the submission step and the confirmation step.
//!
//! The rendered PDF travels as a data URI through a text-only key/value
//! store, together with the resolved doctor contact. `Confirmation` reads it
//! back and offers the download.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::rendering::RenderedDocument;
use crate::Result;

pub const PDF_KEY: &str = "consentFormPdf";
pub const CONTACT_KEY: &str = "doctorEmail";

/// Text-only session storage shared by the two steps
pub trait HandoffStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
}

/// In-memory store that lives as long as the session
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    entries: BTreeMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

impl HandoffStore for SessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A successfully rendered form and where it should be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub document: RenderedDocument,
    pub contact: String,
}

impl Handoff {
    pub fn store_into(&self, store: &mut dyn HandoffStore) {
        store.set(PDF_KEY, self.document.to_data_uri());
        store.set(CONTACT_KEY, self.contact.clone());
    }

    /// Read a handoff back; `None` if no document was stored
    pub fn load_from(store: &dyn HandoffStore) -> Result<Option<Handoff>> {
        let Some(uri) = store.get(PDF_KEY) else {
            return Ok(None);
        };
        let document = RenderedDocument::from_data_uri(&uri)?;
        let contact = store.get(CONTACT_KEY).unwrap_or_default();
        Ok(Some(Handoff { document, contact }))
    }

    /// Drop the handoff from the store
    pub fn clear(store: &mut dyn HandoffStore) {
        store.remove(PDF_KEY);
        store.remove(CONTACT_KEY);
    }
}

/// A file ready to be saved by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub filename: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

pub const CONFIRMATION_TITLE: &str = "Form Completed Successfully!";
pub const CONFIRMATION_MESSAGE: &str = "Thank you for completing the AI Consent Form. Please download your completed form and email it to the doctor's office.";

/// The confirmation step shown after a successful submission
#[derive(Debug, Clone)]
pub struct Confirmation {
    handoff: Option<Handoff>,
    office_email: String,
}

impl Confirmation {
    pub fn from_store(store: &dyn HandoffStore, office_email: impl Into<String>) -> Result<Self> {
        Ok(Self {
            handoff: Handoff::load_from(store)?,
            office_email: office_email.into(),
        })
    }

    pub fn title(&self) -> &'static str {
        CONFIRMATION_TITLE
    }

    pub fn message(&self) -> &'static str {
        CONFIRMATION_MESSAGE
    }

    /// Address the patient is asked to e-mail the form to
    pub fn office_email(&self) -> &str {
        &self.office_email
    }

    /// Contact resolved for the selected doctor at submission time
    pub fn doctor_contact(&self) -> Option<&str> {
        self.handoff.as_ref().map(|h| h.contact.as_str())
    }

    pub fn next_steps(&self) -> [String; 3] {
        [
            "Download your completed form using the button below".to_string(),
            format!("Email the PDF to: {}", self.office_email),
            "Include your name and any relevant information in the email".to_string(),
        ]
    }

    pub fn has_document(&self) -> bool {
        self.handoff.is_some()
    }

    pub fn download(&self) -> Option<Download> {
        self.handoff.as_ref().map(|h| Download {
            filename: h.document.filename().to_string(),
            mime: h.document.mime().to_string(),
            bytes: h.document.as_bytes().to_vec(),
        })
    }
}
