//! Form collector: field values, signature pads and the submit flow.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ConsentConfig;
use crate::handoff::{Handoff, HandoffStore};
use crate::rendering::Renderer;
use crate::signature::{capture, MemoryPad, SignatureImage, SignaturePad};
use crate::{Error, Result};

pub const MISSING_SIGNATURES_PROMPT: &str =
    "One or both signatures are missing. Generate PDF without signatures?";
pub const MISSING_DOCTOR_NOTICE: &str = "Please select a doctor before submitting.";

/// The four text fields of the consent form. Empty means not filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientFormData {
    pub name: String,
    #[serde(rename = "dob")]
    pub date_of_birth: String,
    #[serde(rename = "date")]
    pub visit_date: String,
    #[serde(rename = "doctor")]
    pub doctor_name: String,
}

impl PatientFormData {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::DateOfBirth => &self.date_of_birth,
            FormField::VisitDate => &self.visit_date,
            FormField::Doctor => &self.doctor_name,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::DateOfBirth => &mut self.date_of_birth,
            FormField::VisitDate => &mut self.visit_date,
            FormField::Doctor => &mut self.doctor_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    DateOfBirth,
    VisitDate,
    Doctor,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::DateOfBirth,
        FormField::VisitDate,
        FormField::Doctor,
    ];

    /// Input name used by the form
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::DateOfBirth => "dob",
            FormField::VisitDate => "date",
            FormField::Doctor => "doctor",
        }
    }
}

impl FromStr for FormField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FormField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// User interaction during submission: confirmations and blocking notices
pub trait Prompter {
    /// Ask a yes/no question; `true` means proceed
    fn confirm(&mut self, message: &str) -> bool;

    /// Show a message the user must acknowledge
    fn notify(&mut self, message: &str);
}

/// Current state of one consent form session
pub struct ConsentForm {
    data: PatientFormData,
    patient_pad: Box<dyn SignaturePad>,
    witness_pad: Box<dyn SignaturePad>,
    renderer: Renderer,
}

impl std::fmt::Debug for ConsentForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentForm")
            .field("data", &self.data)
            .field("patient_signed", &!self.patient_pad.is_empty())
            .field("witness_signed", &!self.witness_pad.is_empty())
            .finish()
    }
}

impl ConsentForm {
    /// A blank form with in-memory signature pads
    pub fn new(config: Arc<ConsentConfig>) -> Result<Self> {
        Self::with_pads(config, Box::new(MemoryPad::new()), Box::new(MemoryPad::new()))
    }

    pub fn with_pads(
        config: Arc<ConsentConfig>,
        patient_pad: Box<dyn SignaturePad>,
        witness_pad: Box<dyn SignaturePad>,
    ) -> Result<Self> {
        Ok(Self {
            data: PatientFormData::default(),
            patient_pad,
            witness_pad,
            renderer: Renderer::new(config)?,
        })
    }

    pub fn data(&self) -> &PatientFormData {
        &self.data
    }

    pub fn config(&self) -> &ConsentConfig {
        self.renderer.config()
    }

    /// Doctors offered by the selection list
    pub fn doctor_options(&self) -> Vec<&str> {
        self.config().doctors.doctors().collect()
    }

    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.data.slot(field) = value.into();
    }

    /// `update_field` keyed by the input name (`name`, `dob`, `date`, `doctor`)
    pub fn update_named_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = name.parse::<FormField>()?;
        self.update_field(field, value);
        Ok(())
    }

    pub fn patient_pad_mut(&mut self) -> &mut dyn SignaturePad {
        self.patient_pad.as_mut()
    }

    pub fn witness_pad_mut(&mut self) -> &mut dyn SignaturePad {
        self.witness_pad.as_mut()
    }

    pub fn clear_signatures(&mut self) {
        self.patient_pad.clear();
        self.witness_pad.clear();
    }

    /// Validate, render and hand off the form.
    ///
    /// Nothing is written to `store` unless rendering and contact lookup
    /// both succeed. The form itself is never modified, so a failed
    /// submission can simply be retried.
    pub fn submit(
        &self,
        prompter: &mut dyn Prompter,
        store: &mut dyn HandoffStore,
    ) -> Result<Handoff> {
        let patient = capture(self.patient_pad.as_ref(), "patient");
        let witness = capture(self.witness_pad.as_ref(), "witness");

        if !patient.is_present() || !witness.is_present() {
            if !prompter.confirm(MISSING_SIGNATURES_PROMPT) {
                log::info!("Submission cancelled: user declined to proceed without signatures");
                return Err(Error::MissingSignature {
                    patient: !patient.is_present(),
                    witness: !witness.is_present(),
                });
            }
            log::warn!(
                "Generating consent form with missing signature(s): patient={} witness={}",
                patient.is_present(),
                witness.is_present()
            );
        }

        if self.data.doctor_name.trim().is_empty() {
            prompter.notify(MISSING_DOCTOR_NOTICE);
            return Err(Error::MissingMandatoryField(FormField::Doctor.as_str().to_string()));
        }

        let handoff = match self.build_handoff(&patient, &witness) {
            Ok(h) => h,
            Err(e) => {
                log::error!("Error generating PDF: {}", e);
                log::error!("Error detail: {:?}", e);
                prompter.notify(&format!(
                    "An error occurred while generating the PDF: {}\n\nCheck the log for more details.",
                    e
                ));
                return Err(e);
            }
        };

        handoff.store_into(store);
        log::info!(
            "Consent form handed off for {} (contact {})",
            self.data.doctor_name,
            handoff.contact
        );
        Ok(handoff)
    }

    fn build_handoff(&self, patient: &SignatureImage, witness: &SignatureImage) -> Result<Handoff> {
        let document = self.renderer.render(&self.data, patient, witness)?;
        let contact = self
            .config()
            .doctors
            .resolve_contact(&self.data.doctor_name)?
            .to_string();
        Ok(Handoff { document, contact })
    }
}
