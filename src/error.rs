use thiserror::Error;

/// Failures that end up as an inline label in the UI.
///
/// Persistence and body-formatting problems are not represented here: they are
/// logged and degrade to "no saved state" / "raw body" without reaching the user.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("address request failed: {0}")]
    Generation(String),

    #[error("message listing failed: {0}")]
    Fetch(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),
}
