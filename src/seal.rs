//! Vault sealing and unsealing operations.
//!
//! Unsealing submits key shares which the service accumulates until its
//! configured threshold is met. For the common single-share setup one
//! correct key fully unseals.

use tracing::{debug, info};

use crate::api::VaultApi;
use crate::error::VaultError;
use crate::secret::SecretString;
use crate::status::check_status;

/// Submits one unseal key share. Returns the seal state afterwards
/// (`true` = still sealed).
///
/// When the service is already unsealed this is a no-op returning `false`
/// without touching the unseal endpoint. A rejected key surfaces as
/// [`VaultError::Unauthorized`] and leaves the service sealed.
pub async fn unseal(api: &impl VaultApi, key: &SecretString) -> Result<bool, VaultError> {
    let status = check_status(api).await?;
    if !status.sealed {
        debug!("vault already unsealed, skipping key submission");
        return Ok(false);
    }

    let progress = api.submit_unseal_key(key.expose()).await?;
    if progress.sealed {
        debug!(
            progress = progress.progress,
            threshold = progress.threshold,
            "unseal share accepted, still sealed"
        );
    } else {
        info!("vault unsealed");
    }
    Ok(progress.sealed)
}

/// Submits key shares in order until the service reports itself unsealed.
/// Returns the final seal state; `true` means the provided shares did not
/// meet the threshold.
pub async fn unseal_with_keys(
    api: &impl VaultApi,
    keys: &[SecretString],
) -> Result<bool, VaultError> {
    let mut sealed = true;
    for key in keys {
        sealed = unseal(api, key).await?;
        if !sealed {
            break;
        }
    }
    Ok(sealed)
}

/// Seals a running service again, making its storage inaccessible until the
/// next unseal. Requires a privileged token. Not part of the bootstrap
/// sequence.
pub async fn seal(api: &impl VaultApi, token: &SecretString) -> Result<(), VaultError> {
    api.seal(token.expose()).await?;
    info!("vault sealed");
    Ok(())
}
