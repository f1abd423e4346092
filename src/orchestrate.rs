//! The bootstrap state machine.
//!
//! Drives a service from any intermediate state through
//! `Unconfigured → Initialized(sealed) → Unsealed → EngineEnabled →
//! PoliciesApplied → TokensIssued`, re-probing before each transition so a
//! re-run against a partially bootstrapped service converges without
//! duplicating irreversible actions. Token issuance is the one exception:
//! every run mints fresh tokens.

use tracing::info;

use crate::api::VaultApi;
use crate::error::{BootstrapError, BootstrapStep, VaultError};
use crate::init::{initialize, InitOutcome, UnsealMaterial};
use crate::mounts::ensure_engine;
use crate::policy::{apply_policy, Policy};
use crate::seal::unseal_with_keys;
use crate::secret::SecretString;
use crate::status::{check_status, wait_until_ready, ReadinessProbe};
use crate::token::{issue_token, Token};

/// Input for one bootstrap run. Credentials for a service that was
/// initialized by an *earlier* run are supplied here; a fresh service
/// generates its own.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub secret_shares: u8,
    pub secret_threshold: u8,
    /// Mount path for the secret store, e.g. "secret".
    pub kv_mount: String,
    /// Engine type for the mount, e.g. "kv-v2".
    pub engine_type: String,
    pub policies: Vec<Policy>,
    /// One token is minted per entry; each entry names the policies the
    /// token is scoped to.
    pub token_policy_sets: Vec<Vec<String>>,
    pub readiness: ReadinessProbe,
    /// Root token from a previous run, required when the service is
    /// already initialized.
    pub root_token: Option<SecretString>,
    /// Externally supplied unseal key shares, used when the service is
    /// sealed but was not initialized by this run.
    pub unseal_keys: Vec<SecretString>,
}

impl BootstrapConfig {
    /// Single-share configuration with no pre-existing credentials.
    pub fn new(kv_mount: impl Into<String>, engine_type: impl Into<String>) -> Self {
        Self {
            secret_shares: 1,
            secret_threshold: 1,
            kv_mount: kv_mount.into(),
            engine_type: engine_type.into(),
            policies: Vec::new(),
            token_policy_sets: Vec::new(),
            readiness: ReadinessProbe::default(),
            root_token: None,
            unseal_keys: Vec::new(),
        }
    }
}

/// What one successful run hands back to the caller. The orchestrator
/// retains no copy of any of it.
#[derive(Debug)]
pub struct BootstrapOutcome {
    /// Present when this run performed the one-time initialization.
    pub unseal_material: Option<UnsealMaterial>,
    /// `true` when this run created the secrets-engine mount.
    pub engine_applied: bool,
    pub tokens: Vec<Token>,
}

fn at(step: BootstrapStep) -> impl Fn(VaultError) -> BootstrapError {
    move |source| BootstrapError::new(step, source)
}

/// Runs the full bootstrap sequence against `api`.
///
/// Strictly sequential: each step's precondition is the observable effect
/// of the previous one, and every fatal error short-circuits with the
/// failing step's identity attached.
pub async fn bootstrap(
    api: &impl VaultApi,
    config: &BootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    // Step 0: the collaborator contract is "a reachable endpoint"; hold the
    // sequence until the service answers at all.
    wait_until_ready(api, config.readiness)
        .await
        .map_err(at(BootstrapStep::WaitForService))?;

    // Step 1: one-time initialization.
    let outcome = initialize(api, config.secret_shares, config.secret_threshold)
        .await
        .map_err(at(BootstrapStep::Initialize))?;
    let unseal_material = match outcome {
        InitOutcome::Initialized(material) => Some(material),
        InitOutcome::AlreadyInitialized => None,
    };

    let root_token = match (&unseal_material, &config.root_token) {
        (Some(material), _) => material.root_token.clone(),
        (None, Some(token)) => token.clone(),
        (None, None) => {
            return Err(BootstrapError::new(
                BootstrapStep::Initialize,
                VaultError::ConflictingState(
                    "service is already initialized and no root token was supplied".into(),
                ),
            ))
        }
    };

    // Step 2: unseal, using this run's key shares or the supplied ones.
    let status = check_status(api)
        .await
        .map_err(at(BootstrapStep::Unseal))?;
    if status.sealed {
        let keys: &[SecretString] = match &unseal_material {
            Some(material) => material.keys.as_slice(),
            None => config.unseal_keys.as_slice(),
        };
        if keys.is_empty() {
            return Err(BootstrapError::new(
                BootstrapStep::Unseal,
                VaultError::ConflictingState(
                    "service is sealed and no unseal keys are available".into(),
                ),
            ));
        }
        let still_sealed = unseal_with_keys(api, keys)
            .await
            .map_err(at(BootstrapStep::Unseal))?;
        if still_sealed {
            return Err(BootstrapError::new(
                BootstrapStep::Unseal,
                VaultError::ConflictingState(format!(
                    "service remained sealed after submitting {} key shares",
                    keys.len()
                )),
            ));
        }
    }

    // Step 3: secrets engine.
    let engine_applied = ensure_engine(api, &root_token, &config.kv_mount, &config.engine_type)
        .await
        .map_err(at(BootstrapStep::EnableEngine))?;

    // Step 4: policies. Always written; convergent for identical rules.
    for policy in &config.policies {
        apply_policy(api, &root_token, policy)
            .await
            .map_err(at(BootstrapStep::ApplyPolicies))?;
    }

    // Step 5: scoped tokens, one per configured policy set.
    let mut tokens = Vec::with_capacity(config.token_policy_sets.len());
    for policy_set in &config.token_policy_sets {
        let token = issue_token(api, &root_token, policy_set)
            .await
            .map_err(at(BootstrapStep::IssueTokens))?;
        tokens.push(token);
    }

    info!(
        initialized_here = unseal_material.is_some(),
        engine_applied,
        policies = config.policies.len(),
        tokens = tokens.len(),
        "bootstrap complete"
    );

    Ok(BootstrapOutcome {
        unseal_material,
        engine_applied,
        tokens,
    })
}
