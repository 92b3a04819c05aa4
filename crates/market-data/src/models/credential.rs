use std::fmt;

/// Key used whenever the user leaves the credential blank.
pub const DEFAULT_CREDENTIAL: &str = "demo";

/// Provider API key.
///
/// Never empty: a blank value falls back to [`DEFAULT_CREDENTIAL`]. The key is
/// redacted from `Debug` output so it cannot leak into logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Build a credential from user input, trimming whitespace and falling
    /// back to the default when nothing is left.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_CREDENTIAL
    }

    /// The raw key, for building request parameters.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self(DEFAULT_CREDENTIAL.to_string())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("Credential(default)")
        } else {
            f.write_str("Credential(***)")
        }
    }
}
