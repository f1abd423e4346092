//! The raw Vault API surface consumed by the bootstrap components.
//!
//! [`VaultApi`] abstracts the handful of HTTP endpoints the bootstrap
//! sequence touches. The production implementation is
//! [`VaultClient`](crate::client::VaultClient); tests substitute an
//! in-memory fake. Privileged calls take the credential as an explicit
//! parameter so no token ever lives in ambient state.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::VaultError;
use crate::secret::SecretString;

/// One-shot snapshot of the service's init/seal state. Never cached: both
/// flags can change underneath the orchestration at any time.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ServiceStatus {
    pub initialized: bool,
    pub sealed: bool,
}

/// Body of a successful `sys/init` call.
#[derive(Clone, Deserialize)]
pub struct InitResponse {
    pub root_token: SecretString,
    #[serde(default)]
    pub keys: Vec<SecretString>,
    #[serde(default)]
    pub keys_base64: Vec<SecretString>,
}

impl std::fmt::Debug for InitResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitResponse")
            .field("root_token", &self.root_token)
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .finish()
    }
}

/// Share-accumulation progress reported by `sys/unseal`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SealProgress {
    pub sealed: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, rename = "t")]
    pub threshold: u8,
}

/// Metadata for an existing secrets-engine mount.
#[derive(Debug, Clone, Deserialize)]
pub struct MountInfo {
    #[serde(rename = "type")]
    pub engine_type: String,
}

#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Read-only probe of the init/seal state.
    async fn status(&self) -> Result<ServiceStatus, VaultError>;

    /// One-time initialization. The service rejects a second call for the
    /// lifetime of its storage; callers must gate on [`VaultApi::status`].
    async fn init(&self, shares: u8, threshold: u8) -> Result<InitResponse, VaultError>;

    /// Submit a single unseal key share.
    async fn submit_unseal_key(&self, key: &str) -> Result<SealProgress, VaultError>;

    /// Seal a running service again.
    async fn seal(&self, token: &str) -> Result<(), VaultError>;

    /// Read mount metadata at `path`; `None` when no engine is mounted there.
    async fn read_mount(&self, token: &str, path: &str)
        -> Result<Option<MountInfo>, VaultError>;

    /// Mount a secrets engine of `engine_type` at `path`.
    async fn create_mount(
        &self,
        token: &str,
        path: &str,
        engine_type: &str,
    ) -> Result<(), VaultError>;

    /// Upsert the ACL policy document `name` (overwrite semantics).
    async fn write_policy(&self, token: &str, name: &str, policy: &str)
        -> Result<(), VaultError>;

    /// Mint a new token scoped to `policies`. Never idempotent.
    async fn create_token(
        &self,
        token: &str,
        policies: &[String],
    ) -> Result<SecretString, VaultError>;
}
