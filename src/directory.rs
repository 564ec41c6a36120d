//! Doctor directory: the selectable doctors and where their forms go

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One selectable doctor and the address completed forms are sent to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorEntry {
    pub name: String,
    pub contact: String,
}

impl DoctorEntry {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }
}

/// Ordered doctor-name → contact-address mapping.
///
/// The directory's names are also the enumerated selection set offered by
/// the form, so a doctor that can be picked always has an entry. Order is
/// the order of the selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorDirectory {
    entries: Vec<DoctorEntry>,
}

impl DoctorDirectory {
    /// Build a directory, rejecting empty or duplicate names
    pub fn new(entries: Vec<DoctorEntry>) -> Result<Self> {
        let dir = Self { entries };
        dir.validate()?;
        Ok(dir)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::ConfigError("doctor directory is empty".into()));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(Error::ConfigError(format!("doctor entry {} has no name", i)));
            }
            if entry.contact.trim().is_empty() {
                return Err(Error::ConfigError(format!(
                    "doctor '{}' has no contact address",
                    entry.name
                )));
            }
            if self.entries[..i].iter().any(|e| e.name == entry.name) {
                return Err(Error::ConfigError(format!(
                    "doctor '{}' is listed more than once",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve the contact address for the selected doctor
    pub fn resolve_contact(&self, doctor: &str) -> Result<&str> {
        self.entries
            .iter()
            .find(|e| e.name == doctor)
            .map(|e| e.contact.as_str())
            .ok_or_else(|| Error::ContactNotFound(doctor.to_string()))
    }

    pub fn contains(&self, doctor: &str) -> bool {
        self.entries.iter().any(|e| e.name == doctor)
    }

    /// Doctor names in selection order
    pub fn doctors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[DoctorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DoctorDirectory {
    fn default() -> Self {
        Self {
            entries: vec![
                DoctorEntry::new("Dr. Stephanie Rhone", "rhone.moa@gmail.com"),
                DoctorEntry::new("Dr. Chelsea Elwood", "elwood.moa@gmail.com"),
                DoctorEntry::new("Dr. Stephanie Fisher", "fisher.moa@gmail.com"),
                DoctorEntry::new("Dr. Ana Sosa Cazales", "sosacazales.moa@gmail.com"),
            ],
        }
    }
}
