//! Error types for form submission and document rendering

use thiserror::Error;

/// Result type alias for consent form operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting, rendering or handing off a form
#[derive(Error, Debug)]
pub enum Error {
    /// A field required for submission was left empty
    #[error("Missing mandatory field: {0}")]
    MissingMandatoryField(String),

    /// The user declined to continue with one or both signatures missing
    #[error("Submission cancelled: missing signature(s) (patient: {patient}, witness: {witness})")]
    MissingSignature { patient: bool, witness: bool },

    /// Composing or writing the document failed
    #[error("Rendering failed: {0}")]
    RenderFailure(String),

    /// The selected doctor has no directory entry
    #[error("No contact address for doctor: {0}")]
    ContactNotFound(String),

    /// Not one of the known form field names
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    /// Signature input could not be read
    #[error("Invalid signature image: {0}")]
    InvalidSignature(String),

    /// Malformed data on the handoff channel
    #[error("Transport encoding error: {0}")]
    Transport(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::RenderFailure(format!("PDF: {}", err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::RenderFailure(format!("signature image: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl Error {
    /// Whether the error came from user input rather than the renderer
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::MissingMandatoryField(_) | Error::MissingSignature { .. }
        )
    }
}
