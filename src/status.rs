//! Status probing and service readiness.
//!
//! The probe never caches: both `initialized` and `sealed` can flip
//! underneath the orchestration, so every transition guard takes a fresh
//! snapshot.

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::{ServiceStatus, VaultApi};
use crate::error::VaultError;

/// Retry schedule for waiting on a service that may still be starting.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessProbe {
    /// Overall deadline; exceeding it is a fatal `Unreachable`.
    pub deadline: Duration,
    /// Pause between probe attempts.
    pub interval: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(60),
            interval: Duration::from_secs(2),
        }
    }
}

/// Takes a single status snapshot.
pub async fn check_status(api: &impl VaultApi) -> Result<ServiceStatus, VaultError> {
    let status = api.status().await?;
    debug!(
        initialized = status.initialized,
        sealed = status.sealed,
        "vault status"
    );
    Ok(status)
}

/// Polls the status endpoint until the service answers, treating
/// connection failures as "not up yet" rather than errors. Any
/// non-transient error aborts immediately; running out the deadline is
/// [`VaultError::Unreachable`].
pub async fn wait_until_ready(
    api: &impl VaultApi,
    probe: ReadinessProbe,
) -> Result<ServiceStatus, VaultError> {
    let start = Instant::now();
    loop {
        match api.status().await {
            Ok(status) => {
                info!(
                    initialized = status.initialized,
                    sealed = status.sealed,
                    "vault is answering status probes"
                );
                return Ok(status);
            }
            Err(VaultError::Transient(reason)) => {
                debug!(reason, "vault not ready yet");
            }
            Err(other) => return Err(other),
        }
        if start.elapsed() >= probe.deadline {
            warn!("gave up waiting for vault to answer");
            return Err(VaultError::Unreachable {
                waited_secs: start.elapsed().as_secs(),
            });
        }
        sleep(probe.interval).await;
    }
}
