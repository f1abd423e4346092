//! In-memory Vault fake for exercising the bootstrap state machine
//! without a network.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use vault_bootstrap::{
    InitResponse, MountInfo, SealProgress, SecretString, ServiceStatus, VaultApi, VaultError,
};

#[derive(Debug, Default)]
pub struct FakeState {
    pub initialized: bool,
    pub sealed: bool,
    pub threshold: u8,
    pub progress: u8,
    pub keys: Vec<String>,
    pub root_token: Option<String>,
    pub mounts: BTreeMap<String, String>,
    pub policies: BTreeMap<String, String>,
    pub issued: Vec<String>,
    // Call counters for asserting which endpoints a step touched.
    pub init_calls: usize,
    pub unseal_submissions: usize,
    token_counter: usize,
}

pub struct FakeVault {
    pub state: Mutex<FakeState>,
}

impl FakeVault {
    /// A service that has just started for the first time.
    pub fn fresh() -> Self {
        Self {
            state: Mutex::new(FakeState {
                initialized: false,
                sealed: true,
                ..FakeState::default()
            }),
        }
    }

    /// A service initialized and unsealed by some earlier run.
    pub fn unsealed(root_token: &str) -> Self {
        Self {
            state: Mutex::new(FakeState {
                initialized: true,
                sealed: false,
                threshold: 1,
                keys: vec!["unseal-key-1".to_string()],
                root_token: Some(root_token.to_string()),
                ..FakeState::default()
            }),
        }
    }

    fn authorize(state: &FakeState, token: &str) -> Result<(), VaultError> {
        if state.root_token.as_deref() == Some(token) {
            Ok(())
        } else {
            Err(VaultError::Unauthorized("permission denied".into()))
        }
    }
}

#[async_trait]
impl VaultApi for FakeVault {
    async fn status(&self) -> Result<ServiceStatus, VaultError> {
        let state = self.state.lock().unwrap();
        Ok(ServiceStatus {
            initialized: state.initialized,
            sealed: state.sealed,
        })
    }

    async fn init(&self, shares: u8, threshold: u8) -> Result<InitResponse, VaultError> {
        let mut state = self.state.lock().unwrap();
        state.init_calls += 1;
        if state.initialized {
            return Err(VaultError::HttpStatus(
                400,
                "Vault is already initialized".into(),
            ));
        }
        state.initialized = true;
        state.sealed = true;
        state.threshold = threshold;
        state.keys = (1..=shares).map(|n| format!("unseal-key-{}", n)).collect();
        state.root_token = Some("hvs.fake-root".to_string());
        Ok(InitResponse {
            root_token: SecretString::new("hvs.fake-root"),
            keys: state
                .keys
                .iter()
                .map(|k| SecretString::from(k.as_str()))
                .collect(),
            keys_base64: Vec::new(),
        })
    }

    async fn submit_unseal_key(&self, key: &str) -> Result<SealProgress, VaultError> {
        let mut state = self.state.lock().unwrap();
        state.unseal_submissions += 1;
        if !state.keys.iter().any(|k| k == key) {
            return Err(VaultError::Unauthorized("unseal key rejected".into()));
        }
        state.progress += 1;
        if state.progress >= state.threshold {
            state.sealed = false;
            state.progress = 0;
        }
        Ok(SealProgress {
            sealed: state.sealed,
            progress: state.progress,
            threshold: state.threshold,
        })
    }

    async fn seal(&self, token: &str) -> Result<(), VaultError> {
        let mut state = self.state.lock().unwrap();
        Self::authorize(&state, token)?;
        state.sealed = true;
        Ok(())
    }

    async fn read_mount(
        &self,
        token: &str,
        path: &str,
    ) -> Result<Option<MountInfo>, VaultError> {
        let state = self.state.lock().unwrap();
        Self::authorize(&state, token)?;
        Ok(state.mounts.get(path).map(|engine_type| MountInfo {
            engine_type: engine_type.clone(),
        }))
    }

    async fn create_mount(
        &self,
        token: &str,
        path: &str,
        engine_type: &str,
    ) -> Result<(), VaultError> {
        let mut state = self.state.lock().unwrap();
        Self::authorize(&state, token)?;
        state
            .mounts
            .insert(path.to_string(), engine_type.to_string());
        Ok(())
    }

    async fn write_policy(
        &self,
        token: &str,
        name: &str,
        policy: &str,
    ) -> Result<(), VaultError> {
        let mut state = self.state.lock().unwrap();
        Self::authorize(&state, token)?;
        state
            .policies
            .insert(name.to_string(), policy.to_string());
        Ok(())
    }

    async fn create_token(
        &self,
        token: &str,
        policies: &[String],
    ) -> Result<SecretString, VaultError> {
        let mut state = self.state.lock().unwrap();
        Self::authorize(&state, token)?;
        for name in policies {
            if !state.policies.contains_key(name) {
                return Err(VaultError::ConflictingState(format!(
                    "unknown policy '{}'",
                    name
                )));
            }
        }
        state.token_counter += 1;
        let minted = format!("hvs.scoped-{}", state.token_counter);
        state.issued.push(minted.clone());
        Ok(SecretString::new(minted))
    }
}
