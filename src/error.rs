// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the fetch → parse → merge → write pipeline.
#[derive(Debug, Error)]
pub enum AupError {
    /// HTML snapshot or KML template is not on disk.
    #[error("input file not found: '{}'", .0.display())]
    MissingInput(PathBuf),

    /// The page has no `<tr>` rows at all.
    #[error("no table rows found in the AUP/UUP page")]
    NoTableRows,

    /// Template KML could not be read even after clean-up.
    #[error("malformed KML document: {0}")]
    MalformedDocument(String),

    /// No snapshot link between `newest` and `oldest`.
    #[error("no AUP/UUP table found from '{newest}' back to '{oldest}'; the portal layout or availability may have changed")]
    FetchExhausted { newest: String, oldest: String },

    /// Browser bridge could not be started or answered nonsense.
    #[error("browser bridge: {0}")]
    Bridge(String),

    #[error("failed to serialize KML: {0}")]
    Serialize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AupError {
    fn from(e: serde_json::Error) -> Self {
        AupError::Bridge(format!("JSON error: {e}"))
    }
}

impl From<xml::reader::Error> for AupError {
    fn from(e: xml::reader::Error) -> Self {
        AupError::MalformedDocument(e.to_string())
    }
}
