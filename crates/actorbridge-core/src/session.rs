//! Credential and session context
//!
//! The provider credential is an explicit value passed into client
//! construction, never ambient module state. A `Session` holds it for the
//! duration of a user session: set at login, cleared at logout, never
//! implicitly expired by this crate.

use crate::error::CredentialError;

/// Opaque provider credential.
///
/// Construction trims surrounding whitespace and rejects empty input, the
/// same checks the outer auth layer applies to incoming header values.
/// `Debug` output never includes the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Validate and normalise a raw token.
    pub fn new(raw: &str) -> Result<Self, CredentialError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(Credential(trimmed.to_string()))
    }

    /// The token value, for attaching to outgoing requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Per-session credential holder.
#[derive(Debug, Default)]
pub struct Session {
    credential: Option<Credential>,
}

impl Session {
    /// Fresh, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a credential to the session.
    pub fn login(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    /// Clear the credential. Explicit logout is the only way a credential
    /// leaves the session.
    pub fn logout(&mut self) {
        self.credential = None;
    }

    /// The current credential, if any.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Whether a credential is attached.
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}
