//! Immutable configuration for the consent document.
//!
//! Everything fixed about the form lives here: the clinic identity block,
//! the doctor directory, the consent wording and the page geometry. The
//! defaults reproduce the Fairmont Obstetrics & Gynecology form exactly; a
//! TOML file may override any section.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directory::DoctorDirectory;
use crate::{Error, Result};

/// Token replaced by the selected doctor's name in templated text
pub const DOCTOR_TOKEN: &str = "{doctor}";

/// Top-level configuration injected into the renderer and the form
///
/// # Examples
///
/// ```
/// let cfg = consent_pdf::ConsentConfig::default();
/// assert_eq!(cfg.doctors.len(), 4);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    /// Clinic identity printed in the document header
    pub clinic: ClinicInfo,
    /// Selectable doctors and their contact addresses
    pub doctors: DoctorDirectory,
    /// Title, paragraphs, table labels and output naming
    pub text: ConsentText,
    /// Page and table geometry, in millimetres
    pub layout: PageLayout,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            clinic: ClinicInfo::default(),
            doctors: DoctorDirectory::default(),
            text: ConsentText::default(),
            layout: PageLayout::default(),
        }
    }
}

impl ConsentConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ConsentConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let cfg = Self::from_toml_str(&content)?;
        log::debug!("Loaded consent configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Check geometry and directory invariants
    pub fn validate(&self) -> Result<()> {
        self.doctors.validate()?;
        self.layout.validate()?;
        if self.text.placeholder.trim().is_empty() {
            return Err(Error::ConfigError("placeholder must be visible".into()));
        }
        if self.text.document_filename.trim().is_empty() {
            return Err(Error::ConfigError("document filename is empty".into()));
        }
        Ok(())
    }
}

/// Clinic identity block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicInfo {
    /// First header line; `{doctor}` is replaced by the selected doctor
    pub organization: String,
    pub name: String,
    pub address: String,
    pub phone_fax: String,
    /// Office address patients send the completed form to
    pub office_email: String,
}

impl Default for ClinicInfo {
    fn default() -> Self {
        Self {
            organization: "{doctor} Inc.".to_string(),
            name: "Fairmont Obstetrics & Gynecology".to_string(),
            address: "915-750 W Broadway, Vancouver, BC V5Z 1H8".to_string(),
            phone_fax: "Phone: 604-878-8050 Fax: 604-875-8099".to_string(),
            office_email: "fairmontobgyn@gmail.com".to_string(),
        }
    }
}

impl ClinicInfo {
    /// The four bold header lines for the given doctor
    pub fn header_lines(&self, doctor: &str) -> [String; 4] {
        [
            interpolate(&self.organization, doctor),
            self.name.clone(),
            self.address.clone(),
            self.phone_fax.clone(),
        ]
    }
}

/// Fixed wording of the consent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentText {
    pub title: String,
    /// Consent paragraphs in order; `{doctor}` is interpolated at render time
    pub paragraphs: Vec<String>,
    /// Blank-line drawn wherever a value or signature is absent
    pub placeholder: String,
    pub document_filename: String,
    pub labels: TableLabels,
}

impl Default for ConsentText {
    fn default() -> Self {
        Self {
            title: "Patient Consent Form for Use of AI Scribe Technology".to_string(),
            paragraphs: vec![
                "To enhance the quality of care and improve documentation efficiency, {doctor} utilizes an AI scribe tool during patient visits. This technology assists with note-taking by generating a temporary audio recording of the conversation. The purpose is to allow the provider to focus more fully on the patient rather than typing during the visit.".to_string(),
                "With your permission, the AI scribe will create a temporary audio recording solely for the purpose of drafting a clinical summary. This summary will be reviewed and finalized by {doctor} before being added to the patient's medical chart.".to_string(),
                "Participation in this process is entirely optional. Your privacy is protected throughout, and you may decline or withdraw consent at any time without any impact on the quality or continuity of care.".to_string(),
                "By signing below, you acknowledge understanding of the above, that you have received the AI Scribe information sheet and grants permission of use to the AI scribe during the visit.".to_string(),
            ],
            placeholder: "_________________".to_string(),
            document_filename: "AI_Consent_Form.pdf".to_string(),
            labels: TableLabels::default(),
        }
    }
}

impl ConsentText {
    /// Paragraphs with the doctor's name filled in
    pub fn paragraphs_for(&self, doctor: &str) -> Vec<String> {
        self.paragraphs
            .iter()
            .map(|p| interpolate(p, doctor))
            .collect()
    }
}

/// Labels of the signature table cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLabels {
    pub patient_name: String,
    pub date_of_birth: String,
    pub patient_signature: String,
    pub witness_signature: String,
    pub date: String,
}

impl Default for TableLabels {
    fn default() -> Self {
        Self {
            patient_name: "Patient Name:".to_string(),
            date_of_birth: "DOB:".to_string(),
            patient_signature: "Patient Signature:".to_string(),
            witness_signature: "Witness Signature:".to_string(),
            date: "Date:".to_string(),
        }
    }
}

/// Page geometry in millimetres. Y grows downward from the top edge and
/// text positions are baselines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub left_margin: f64,
    /// First baseline on every page, and the cursor after a page break
    pub top_margin: f64,
    /// Width paragraphs are reflowed to
    pub column_width: f64,
    pub header_font_size: f64,
    pub header_pitch: f64,
    pub title_gap: f64,
    pub title_font_size: f64,
    pub body_gap: f64,
    pub body_font_size: f64,
    pub line_pitch: f64,
    pub paragraph_gap: f64,
    pub table_gap: f64,
    /// A page break happens when the cursor is below `page_height - bottom_threshold`
    pub bottom_threshold: f64,
    pub table: TableGeometry,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            left_margin: 20.0,
            top_margin: 20.0,
            column_width: 170.0,
            header_font_size: 11.0,
            header_pitch: 4.0,
            title_gap: 12.0,
            title_font_size: 12.0,
            body_gap: 10.0,
            body_font_size: 10.0,
            line_pitch: 5.0,
            paragraph_gap: 3.0,
            table_gap: 10.0,
            bottom_threshold: 80.0,
            table: TableGeometry::default(),
        }
    }
}

impl PageLayout {
    fn validate(&self) -> Result<()> {
        let t = &self.table;
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("column_width", self.column_width),
            ("header_font_size", self.header_font_size),
            ("title_font_size", self.title_font_size),
            ("body_font_size", self.body_font_size),
            ("line_pitch", self.line_pitch),
            ("bottom_threshold", self.bottom_threshold),
            ("table.row_height", t.row_height),
            ("table.font_size", t.font_size),
            ("table.signature_width", t.signature_width),
            ("table.signature_height", t.signature_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::ConfigError(format!("{} must be positive", name)));
            }
        }
        let non_negative = [
            ("left_margin", self.left_margin),
            ("top_margin", self.top_margin),
            ("header_pitch", self.header_pitch),
            ("title_gap", self.title_gap),
            ("body_gap", self.body_gap),
            ("paragraph_gap", self.paragraph_gap),
            ("table_gap", self.table_gap),
            ("table.left", t.left),
            ("table.cell_inset", t.cell_inset),
            ("table.label_offset", t.label_offset),
            ("table.value_offset", t.value_offset),
            ("table.signature_offset", t.signature_offset),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!("{} must not be negative", name)));
            }
        }
        if self.left_margin + self.column_width > self.page_width {
            return Err(Error::ConfigError(
                "text column does not fit the page width".into(),
            ));
        }
        if !(t.left < t.column_split && t.column_split < t.right) || t.right > self.page_width {
            return Err(Error::ConfigError(
                "table columns must satisfy left < column_split < right <= page_width".into(),
            ));
        }
        if self.bottom_threshold < t.height() {
            return Err(Error::ConfigError(format!(
                "bottom threshold {} is shorter than the signature table ({})",
                self.bottom_threshold,
                t.height()
            )));
        }
        if self.top_margin + t.height() > self.page_height {
            return Err(Error::ConfigError(
                "signature table does not fit on an empty page".into(),
            ));
        }
        if t.cell_inset + t.signature_width > t.column_split - t.left {
            return Err(Error::ConfigError(
                "signature box is wider than its table cell".into(),
            ));
        }
        // the witness image may run past its row but not past the reserved space
        let last_signature_bottom =
            t.row_height * (TableGeometry::ROWS - 1) as f64 + t.signature_offset + t.signature_height;
        if last_signature_bottom > self.bottom_threshold {
            return Err(Error::ConfigError(format!(
                "witness signature reaches {}mm below the table top, past the bottom threshold {}",
                last_signature_bottom, self.bottom_threshold
            )));
        }
        Ok(())
    }
}

/// Geometry of the two-column, three-row signature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableGeometry {
    pub left: f64,
    pub column_split: f64,
    pub right: f64,
    pub row_height: f64,
    /// Horizontal distance from a rule to the cell text
    pub cell_inset: f64,
    /// Label baseline, below the row top
    pub label_offset: f64,
    /// Value baseline, below the row top
    pub value_offset: f64,
    /// Signature image top, below the row top
    pub signature_offset: f64,
    pub signature_width: f64,
    pub signature_height: f64,
    pub font_size: f64,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            left: 20.0,
            column_split: 110.0,
            right: 190.0,
            row_height: 15.0,
            cell_inset: 2.0,
            label_offset: 4.0,
            value_offset: 10.0,
            signature_offset: 6.0,
            signature_width: 60.0,
            signature_height: 12.0,
            font_size: 10.0,
        }
    }
}

impl TableGeometry {
    pub const ROWS: usize = 3;

    pub fn height(&self) -> f64 {
        self.row_height * Self::ROWS as f64
    }
}

fn interpolate(template: &str, doctor: &str) -> String {
    template.replace(DOCTOR_TOKEN, doctor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ConsentConfig::default();
        assert_eq!(cfg.layout.page_width, 210.0);
        assert_eq!(cfg.layout.page_height, 297.0);
        assert_eq!(cfg.text.paragraphs.len(), 4);
        assert_eq!(cfg.text.placeholder, "_________________");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn doctor_is_interpolated_into_first_two_paragraphs() {
        let text = ConsentText::default();
        let paras = text.paragraphs_for("Dr. Chelsea Elwood");
        assert!(paras[0].contains(", Dr. Chelsea Elwood utilizes"));
        assert!(paras[1].contains("finalized by Dr. Chelsea Elwood before"));
        assert!(!paras[2].contains("Dr."));
        assert!(paras.iter().all(|p| !p.contains(DOCTOR_TOKEN)));
    }

    #[test]
    fn header_lines_name_the_doctor() {
        let lines = ClinicInfo::default().header_lines("Dr. Stephanie Fisher");
        assert_eq!(lines[0], "Dr. Stephanie Fisher Inc.");
        assert_eq!(lines[3], "Phone: 604-878-8050 Fax: 604-875-8099");
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = ConsentConfig::from_toml_str(
            r#"
            [clinic]
            office_email = "front-desk@example.com"

            [layout]
            page_height = 250.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.clinic.office_email, "front-desk@example.com");
        assert_eq!(cfg.clinic.name, "Fairmont Obstetrics & Gynecology");
        assert_eq!(cfg.layout.page_height, 250.0);
        assert_eq!(cfg.layout.column_width, 170.0);
        assert_eq!(cfg.doctors.len(), 4);
    }

    #[test]
    fn toml_can_replace_the_directory() {
        let cfg = ConsentConfig::from_toml_str(
            r#"
            [[doctors]]
            name = "Dr. Test"
            contact = "test@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.doctors.len(), 1);
        assert_eq!(cfg.doctors.resolve_contact("Dr. Test").unwrap(), "test@example.com");
    }

    #[test]
    fn table_taller_than_bottom_threshold_is_rejected() {
        let mut cfg = ConsentConfig::default();
        cfg.layout.bottom_threshold = 40.0;
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn default_geometry_validates_with_overhanging_signatures() {
        let layout = PageLayout::default();
        let t = &layout.table;
        assert!(t.signature_offset + t.signature_height > t.row_height);
        assert!(layout.validate().is_ok());
        assert!(ConsentConfig::default().validate().is_ok());
    }

    #[test]
    fn signature_past_bottom_threshold_is_rejected() {
        let mut cfg = ConsentConfig::default();
        cfg.layout.table.signature_height = 60.0;
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));

        let mut cfg = ConsentConfig::default();
        cfg.layout.table.signature_width = 95.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_finite_or_negative_geometry_is_rejected() {
        let cfg = ConsentConfig::from_toml_str(
            r#"
            [layout]
            bottom_threshold = nan
            "#,
        );
        assert!(matches!(cfg, Err(Error::ConfigError(_))));

        let tweaks: [fn(&mut PageLayout); 6] = [
            |l| l.top_margin = f64::NAN,
            |l| l.top_margin = -5.0,
            |l| l.bottom_threshold = f64::INFINITY,
            |l| l.paragraph_gap = -1.0,
            |l| l.table.label_offset = f64::NAN,
            |l| l.table.signature_offset = -6.0,
        ];
        for tweak in tweaks {
            let mut cfg = ConsentConfig::default();
            tweak(&mut cfg.layout);
            assert!(cfg.validate().is_err(), "accepted {:?}", cfg.layout);
        }
    }

    #[test]
    fn column_wider_than_page_is_rejected() {
        let mut cfg = ConsentConfig::default();
        cfg.layout.column_width = 200.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_survives_toml_round_trip() {
        let cfg = ConsentConfig::default();
        let s = cfg.to_toml_string().unwrap();
        let back = ConsentConfig::from_toml_str(&s).unwrap();
        assert_eq!(back, cfg);
    }
}
