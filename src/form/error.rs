use thiserror::Error;

use crate::client::ClientError;
use crate::widget::ValidationError;

/// Errors raised by the form host.
#[derive(Debug, Error)]
pub enum FormError {
    /// Finalization was attempted while errors remain
    #[error("Form has {count} blocking validation error(s)")]
    Blocked {
        count: usize,
        errors: Vec<ValidationError>,
    },

    /// The form is displayed read-only and rejects edits
    #[error("Form is read-only")]
    ReadOnly,

    /// The data could not be serialized for storage
    #[error("Failed to serialize form data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The record store rejected the save
    #[error("Failed to store record: {0}")]
    Store(#[from] ClientError),
}
