//! Secrets-engine mount management.

use tracing::{debug, info};

use crate::api::VaultApi;
use crate::error::VaultError;
use crate::secret::SecretString;

/// Ensures a secrets engine of `engine_type` is mounted at `path`.
///
/// Returns `true` when the mount was created by this call and `false` when
/// a matching mount already existed. An existing mount with a *different*
/// engine type is [`VaultError::ConflictingState`]: this component never
/// destroys or migrates a mount.
pub async fn ensure_engine(
    api: &impl VaultApi,
    token: &SecretString,
    path: &str,
    engine_type: &str,
) -> Result<bool, VaultError> {
    match api.read_mount(token.expose(), path).await? {
        Some(existing) => {
            if existing.engine_type != engine_type {
                return Err(VaultError::ConflictingState(format!(
                    "mount '{}' exists with engine type '{}', wanted '{}'",
                    path, existing.engine_type, engine_type
                )));
            }
            debug!(path, engine_type, "mount already present");
            Ok(false)
        }
        None => {
            api.create_mount(token.expose(), path, engine_type).await?;
            info!(path, engine_type, "mounted secrets engine");
            Ok(true)
        }
    }
}
