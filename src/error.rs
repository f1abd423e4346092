//! Error taxonomy for Vault bootstrap operations.

/// Errors surfaced by the Vault API layer and the bootstrap components.
///
/// `Transient` is the only variant callers are expected to retry; every
/// other variant aborts the sequence it occurs in.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Connection refused or timed out; the service may simply not be up yet.
    #[error("transient network error: {0}")]
    Transient(String),

    /// The readiness deadline elapsed without a usable status response.
    #[error("vault unreachable after {waited_secs}s")]
    Unreachable { waited_secs: u64 },

    /// Missing/invalid credential, or a rejected unseal key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An existing server-side resource is incompatible with the desired
    /// configuration (wrong mount type, unknown policy, ...).
    #[error("conflicting state: {0}")]
    ConflictingState(String),

    /// The response did not match the expected wire contract.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Any other non-success HTTP status.
    #[error("HTTP status {0}: {1}")]
    HttpStatus(u16, String),

    /// Rejected before any network call: threshold must satisfy
    /// `1 <= threshold <= shares`.
    #[error("invalid key shares: threshold {threshold} must be between 1 and {shares}")]
    InvalidKeyShares { shares: u8, threshold: u8 },
}

impl From<reqwest::Error> for VaultError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            VaultError::Transient(err.to_string())
        } else if err.is_decode() {
            VaultError::Malformed(err.to_string())
        } else {
            VaultError::Transient(err.to_string())
        }
    }
}

/// Identifies which bootstrap transition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    WaitForService,
    Initialize,
    Unseal,
    EnableEngine,
    ApplyPolicies,
    IssueTokens,
}

impl std::fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BootstrapStep::WaitForService => "wait-for-service",
            BootstrapStep::Initialize => "initialize",
            BootstrapStep::Unseal => "unseal",
            BootstrapStep::EnableEngine => "enable-engine",
            BootstrapStep::ApplyPolicies => "apply-policies",
            BootstrapStep::IssueTokens => "issue-tokens",
        };
        f.write_str(name)
    }
}

/// A [`VaultError`] tagged with the bootstrap step it occurred in, so a
/// failed run reports which transition to look at.
#[derive(Debug, thiserror::Error)]
#[error("bootstrap step '{step}' failed: {source}")]
pub struct BootstrapError {
    pub step: BootstrapStep,
    #[source]
    pub source: VaultError,
}

impl BootstrapError {
    pub fn new(step: BootstrapStep, source: VaultError) -> Self {
        Self { step, source }
    }
}
