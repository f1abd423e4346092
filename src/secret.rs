//! Secret-holding string type.
//!
//! Root tokens, unseal keys and client tokens arrive as plain strings from
//! the Vault API but must never end up in log output or debug dumps. They
//! are wrapped in [`SecretString`] as soon as they are parsed and only
//! unwrapped at the call site that actually needs the raw value.

use serde::Deserialize;

/// A string whose value is excluded from `Debug` formatting.
///
/// There is intentionally no `Display` implementation and no `Serialize`
/// implementation; the only way to get the raw value back out is
/// [`SecretString::expose`].
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw secret value. Callers must not pass the result to
    /// any logging or formatting machinery.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(<redacted>)")
    }
}
