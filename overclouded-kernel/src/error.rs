/// Whole-operation failures of an acquisition.
///
/// Individual collector failures never show up here: they are absorbed as
/// defaults inside the model. Only conditions that make the whole
/// acquisition impossible are reported to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("no credential supplied, sign in again to refresh the session")]
    MissingCredential,
    #[error("invalid subscription id '{0}': expected a GUID")]
    InvalidSubscription(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl AcquireError {
    /// True when re-authenticating is the only way forward.
    pub fn needs_sign_in(&self) -> bool {
        matches!(self, AcquireError::MissingCredential)
    }
}
