//! vault-bootstrap - Vault bootstrap orchestration library
//!
//! This crate takes a freshly started, encrypted-at-rest secrets service
//! (HashiCorp Vault API shape) through initialization, unsealing,
//! secrets-engine activation, policy definition and scoped-token issuance.
//! The sequence is safe to re-run against a service in any intermediate
//! state: every step probes the service before acting and skips work the
//! service reports as already done. Token issuance is the deliberate
//! exception; each run mints fresh tokens.
//!
//! ## Architecture
//!
//! - [`api`] - the `VaultApi` trait, the seam between bootstrap logic and
//!   the HTTP wire (tests substitute an in-memory fake here)
//! - [`client`] - reqwest implementation of `VaultApi`
//! - [`status`], [`init`], [`seal`], [`mounts`], [`policy`], [`token`] -
//!   one module per bootstrap component, each with its own idempotency
//!   predicate
//! - [`orchestrate`] - the linear state machine tying the components
//!   together
//!
//! Secret material (root token, unseal keys, client tokens) is carried in
//! [`secret::SecretString`], lives only in process memory for the duration
//! of a run, and is excluded from all `Debug` and log rendering.

pub mod api;
pub mod client;
pub mod error;
pub mod init;
pub mod mounts;
pub mod orchestrate;
pub mod policy;
pub mod seal;
pub mod secret;
pub mod status;
pub mod token;

pub use api::{InitResponse, MountInfo, SealProgress, ServiceStatus, VaultApi};
pub use client::VaultClient;
pub use error::{BootstrapError, BootstrapStep, VaultError};
pub use init::{initialize, InitOutcome, UnsealMaterial};
pub use mounts::ensure_engine;
pub use orchestrate::{bootstrap, BootstrapConfig, BootstrapOutcome};
pub use policy::{apply_policy, Capability, Policy, PolicyRule};
pub use seal::{seal, unseal, unseal_with_keys};
pub use secret::SecretString;
pub use status::{check_status, wait_until_ready, ReadinessProbe};
pub use token::{issue_token, Token};

/// Initialize logging for tests and examples.
#[allow(dead_code)]
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}
