//! End-to-end bootstrap against a real Vault container.
//!
//! Requires Docker; run explicitly with `cargo test --test e2e -- --ignored`.

use std::time::Duration;

use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use vault_bootstrap::{
    bootstrap, BootstrapConfig, Capability, Policy, PolicyRule, ReadinessProbe, VaultClient,
};

/// Starts Vault with file storage so it comes up uninitialized and sealed.
async fn start_vault() -> ContainerAsync<GenericImage> {
    let vault_local_config = r#"
    {"storage": {"file": {"path": "/vault/file"}},
     "listener": [{"tcp": { "address": "0.0.0.0:8200", "tls_disable": true}}],
     "default_lease_ttl": "168h", "max_lease_ttl": "720h"}
    "#;
    GenericImage::new("hashicorp/vault", "1.13.3")
        .with_exposed_port(8200.tcp())
        .with_wait_for(WaitFor::message_on_stdout("Vault server started!"))
        .with_env_var("VAULT_LOCAL_CONFIG", vault_local_config)
        .with_cmd(vec!["server"])
        .with_cap_add("IPC_LOCK")
        .start()
        .await
        .expect("failed to start vault container")
}

#[tokio::test]
#[ignore]
async fn bootstrap_real_vault() -> Result<(), Box<dyn std::error::Error>> {
    let container = start_vault().await;
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(8200).await?;
    let addr = format!("http://{}:{}", host, port);

    let client = VaultClient::new(&addr)?;
    let config = BootstrapConfig {
        policies: vec![
            Policy::new(
                "read-only",
                vec![PolicyRule::new(
                    "secret/data/*",
                    [Capability::Read, Capability::List],
                )],
            ),
            Policy::new(
                "read-write",
                vec![PolicyRule::new(
                    "secret/data/*",
                    [
                        Capability::Create,
                        Capability::Read,
                        Capability::Update,
                        Capability::Delete,
                        Capability::List,
                    ],
                )],
            ),
        ],
        token_policy_sets: vec![
            vec!["read-only".to_string()],
            vec!["read-write".to_string()],
        ],
        readiness: ReadinessProbe {
            deadline: Duration::from_secs(60),
            interval: Duration::from_secs(1),
        },
        // Plain "kv" so a re-run's mount read-back compares equal; the API
        // records aliased types under their canonical name.
        ..BootstrapConfig::new("secret", "kv")
    };

    let first = bootstrap(&client, &config).await?;
    let material = first
        .unseal_material
        .expect("fresh container must initialize");
    assert!(first.engine_applied);
    assert_eq!(first.tokens.len(), 2);
    assert!(!first.tokens[0].client_token.is_empty());

    // Re-run with the generated credentials: converges, but mints new
    // tokens.
    let mut rerun = config.clone();
    rerun.root_token = Some(material.root_token.clone());
    rerun.unseal_keys = material.keys.clone();
    let second = bootstrap(&client, &rerun).await?;
    assert!(second.unseal_material.is_none());
    assert!(!second.engine_applied);
    assert_ne!(
        second.tokens[0].client_token.expose(),
        first.tokens[0].client_token.expose()
    );

    Ok(())
}
