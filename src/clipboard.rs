use crate::error::ClientError;

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClientError>;
}

/// The desktop clipboard. Initialization failures are remembered and reported on copy.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                log::warn!("clipboard unavailable: {e}");
                None
            }
        };
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClientError> {
        let cb = self
            .inner
            .as_mut()
            .ok_or_else(|| ClientError::Clipboard("no clipboard available".into()))?;
        cb.set_text(text.to_owned())
            .map_err(|e| ClientError::Clipboard(e.to_string()))?;
        log::info!("copied {} to clipboard", text);
        Ok(())
    }
}
