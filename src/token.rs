//! Scoped token issuance.

use tracing::info;

use crate::api::VaultApi;
use crate::error::VaultError;
use crate::secret::SecretString;

/// A credential scoped to a set of named policies. Every issuance is a new,
/// distinct token; the orchestration run that minted it owns it.
#[derive(Clone)]
pub struct Token {
    pub client_token: SecretString,
    pub policies: Vec<String>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("client_token", &self.client_token)
            .field("policies", &self.policies)
            .finish()
    }
}

/// Mints a new token bound to `policies`. The policies must already exist
/// on the service or the call is rejected with a conflicting-state error.
///
/// There is no idempotency here: calling twice with the same policy set
/// yields two distinct live tokens. The caller decides issuance
/// cardinality.
pub async fn issue_token(
    api: &impl VaultApi,
    token: &SecretString,
    policies: &[String],
) -> Result<Token, VaultError> {
    let client_token = api.create_token(token.expose(), policies).await?;
    if client_token.is_empty() {
        return Err(VaultError::Malformed(
            "token creation returned an empty client token".into(),
        ));
    }
    info!(policies = ?policies, "issued scoped token");
    Ok(Token {
        client_token,
        policies: policies.to_vec(),
    })
}
