//! One-time Vault initialization.
//!
//! Initialization generates the root token and the unseal key shares and is
//! permitted exactly once per storage lifetime. The service is the arbiter:
//! if it reports (or rejects with) "already initialized", that is treated as
//! the target state being reached, never as a failure to retry.

use tracing::info;

use crate::api::VaultApi;
use crate::error::VaultError;
use crate::secret::SecretString;
use crate::status::check_status;

/// Secret material produced by initialization. Lives only in memory for the
/// duration of one orchestration run; `Debug` shows share counts, never key
/// material.
#[derive(Clone)]
pub struct UnsealMaterial {
    pub root_token: SecretString,
    pub keys: Vec<SecretString>,
    pub shares: u8,
    pub threshold: u8,
}

impl std::fmt::Debug for UnsealMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsealMaterial")
            .field("shares", &self.shares)
            .field("threshold", &self.threshold)
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .finish()
    }
}

/// Result of [`initialize`]. `AlreadyInitialized` is a success signal, not
/// an error: the caller skips the step and must source credentials
/// elsewhere.
#[derive(Debug)]
pub enum InitOutcome {
    Initialized(UnsealMaterial),
    AlreadyInitialized,
}

/// Initializes the service with `shares` key shares and unseal threshold
/// `threshold`, returning the generated root token and key list.
///
/// Probes status first and returns [`InitOutcome::AlreadyInitialized`]
/// without touching the init endpoint when the service reports itself
/// initialized. Requires `1 <= threshold <= shares`.
pub async fn initialize(
    api: &impl VaultApi,
    shares: u8,
    threshold: u8,
) -> Result<InitOutcome, VaultError> {
    if threshold == 0 || threshold > shares {
        return Err(VaultError::InvalidKeyShares { shares, threshold });
    }

    let status = check_status(api).await?;
    if status.initialized {
        info!("vault is already initialized, skipping init");
        return Ok(InitOutcome::AlreadyInitialized);
    }

    let response = match api.init(shares, threshold).await {
        Ok(response) => response,
        // Lost a race with a concurrent initializer: the service performed
        // the one-time operation for someone else.
        Err(err) if is_already_initialized(&err) => {
            info!("vault was initialized concurrently, skipping init");
            return Ok(InitOutcome::AlreadyInitialized);
        }
        Err(err) => return Err(err),
    };

    if response.root_token.is_empty() {
        return Err(VaultError::Malformed(
            "init response carried an empty root token".into(),
        ));
    }
    // Prefer the base64 encoding when the server provides both forms.
    let keys = if response.keys_base64.is_empty() {
        response.keys
    } else {
        response.keys_base64
    };
    if keys.len() < threshold as usize {
        return Err(VaultError::Malformed(format!(
            "init response carried {} key shares, need at least {}",
            keys.len(),
            threshold
        )));
    }

    info!(shares, threshold, "vault initialized");
    Ok(InitOutcome::Initialized(UnsealMaterial {
        root_token: response.root_token,
        keys,
        shares,
        threshold,
    }))
}

fn is_already_initialized(err: &VaultError) -> bool {
    match err {
        VaultError::HttpStatus(_, message) | VaultError::ConflictingState(message) => {
            message.contains("already initialized")
        }
        _ => false,
    }
}
