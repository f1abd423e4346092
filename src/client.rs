//! HTTP client for the Vault API.
//!
//! Thin reqwest wrapper that speaks the `/v1/` JSON surface and maps
//! transport and status failures onto the [`VaultError`] taxonomy. Vault
//! reports errors as `{"errors": ["..."]}`; the first message is extracted
//! where present so callers see the server's own wording.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::api::{InitResponse, MountInfo, SealProgress, ServiceStatus, VaultApi};
use crate::error::VaultError;
use crate::secret::SecretString;

const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Client for one Vault server address. Holds no credential: privileged
/// calls receive the token per request.
#[derive(Debug, Clone)]
pub struct VaultClient {
    addr: String,
    client: Client,
}

impl VaultClient {
    pub fn new(addr: &str) -> Result<Self, VaultError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VaultError::Transient(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            addr: addr.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.addr, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, String), VaultError> {
        let url = self.endpoint(path);
        debug!(%method, path, "vault request");
        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.header(VAULT_TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VaultError::Malformed(format!("failed to read response body: {}", e)))?;
        Ok((status, text))
    }

    fn parse<T: DeserializeOwned>(text: &str) -> Result<T, VaultError> {
        serde_json::from_str(text)
            .map_err(|e| VaultError::Malformed(format!("unexpected response shape: {}", e)))
    }

    /// Maps a non-success status to the error taxonomy, preferring the
    /// server's own `errors[]` message over the raw body.
    fn status_error(status: StatusCode, body: &str) -> VaultError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|val| {
                val.get("errors")
                    .and_then(|v| v.as_array())
                    .and_then(|errors| errors.first())
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());
        if status == StatusCode::FORBIDDEN {
            VaultError::Unauthorized(message)
        } else {
            VaultError::HttpStatus(status.as_u16(), message)
        }
    }
}

#[async_trait]
impl VaultApi for VaultClient {
    async fn status(&self) -> Result<ServiceStatus, VaultError> {
        let (status, body) = self.send(Method::GET, "sys/seal-status", None, None).await?;
        if status.is_success() {
            return Self::parse(&body);
        }
        // Some builds answer the seal-status probe with a 400 while the
        // barrier is uninitialized; that still pins down the state.
        if status == StatusCode::BAD_REQUEST && body.contains("not initialized") {
            return Ok(ServiceStatus {
                initialized: false,
                sealed: true,
            });
        }
        Err(Self::status_error(status, &body))
    }

    async fn init(&self, shares: u8, threshold: u8) -> Result<InitResponse, VaultError> {
        let payload = json!({
            "secret_shares": shares,
            "secret_threshold": threshold,
        });
        let (status, body) = self
            .send(Method::PUT, "sys/init", None, Some(payload))
            .await?;
        if status.is_success() {
            Self::parse(&body)
        } else {
            Err(Self::status_error(status, &body))
        }
    }

    async fn submit_unseal_key(&self, key: &str) -> Result<SealProgress, VaultError> {
        let (status, body) = self
            .send(Method::PUT, "sys/unseal", None, Some(json!({ "key": key })))
            .await?;
        if status.is_success() {
            return Self::parse(&body);
        }
        // A rejected key share comes back as a 400, distinct from any
        // transport failure.
        if status == StatusCode::BAD_REQUEST {
            return Err(VaultError::Unauthorized(format!(
                "unseal key rejected: {}",
                body
            )));
        }
        Err(Self::status_error(status, &body))
    }

    async fn seal(&self, token: &str) -> Result<(), VaultError> {
        let (status, body) = self
            .send(Method::PUT, "sys/seal", Some(token), Some(json!({})))
            .await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, &body))
        }
    }

    async fn read_mount(
        &self,
        token: &str,
        path: &str,
    ) -> Result<Option<MountInfo>, VaultError> {
        let api_path = format!("sys/mounts/{}", path);
        let (status, body) = self.send(Method::GET, &api_path, Some(token), None).await?;
        if status == StatusCode::NOT_FOUND
            || (status == StatusCode::BAD_REQUEST && body.contains("No secret engine mount"))
        {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }
        #[derive(serde::Deserialize)]
        struct MountResponse {
            data: MountInfo,
        }
        let parsed: MountResponse = Self::parse(&body)?;
        Ok(Some(parsed.data))
    }

    async fn create_mount(
        &self,
        token: &str,
        path: &str,
        engine_type: &str,
    ) -> Result<(), VaultError> {
        let api_path = format!("sys/mounts/{}", path);
        let payload = json!({ "type": engine_type });
        let (status, body) = self
            .send(Method::POST, &api_path, Some(token), Some(payload))
            .await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, &body))
        }
    }

    async fn write_policy(
        &self,
        token: &str,
        name: &str,
        policy: &str,
    ) -> Result<(), VaultError> {
        let api_path = format!("sys/policies/acl/{}", name);
        let payload = json!({ "policy": policy });
        let (status, body) = self
            .send(Method::PUT, &api_path, Some(token), Some(payload))
            .await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, &body))
        }
    }

    async fn create_token(
        &self,
        token: &str,
        policies: &[String],
    ) -> Result<SecretString, VaultError> {
        let payload = json!({ "policies": policies });
        let (status, body) = self
            .send(Method::POST, "auth/token/create", Some(token), Some(payload))
            .await?;
        if !status.is_success() {
            // Referencing a policy that was never written is a
            // configuration conflict, not an auth problem.
            if status == StatusCode::BAD_REQUEST && body.contains("policy") {
                return Err(VaultError::ConflictingState(format!(
                    "token creation rejected: {}",
                    body
                )));
            }
            return Err(Self::status_error(status, &body));
        }
        #[derive(serde::Deserialize)]
        struct TokenResponse {
            auth: TokenAuth,
        }
        #[derive(serde::Deserialize)]
        struct TokenAuth {
            client_token: SecretString,
        }
        let parsed: TokenResponse = Self::parse(&body)?;
        Ok(parsed.auth.client_token)
    }
}
