//! ACL policy definitions and application.
//!
//! Policies are declarative: applying one is always a write with overwrite
//! semantics, but the HCL rendering is deterministic, so re-applying
//! identical rules leaves the stored document byte-identical.

use std::collections::BTreeSet;
use tracing::info;

use crate::api::VaultApi;
use crate::error::VaultError;
use crate::secret::SecretString;

/// A single capability grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Read => "read",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::List => "list",
        }
    }
}

/// Capabilities granted over one path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub path: String,
    pub capabilities: BTreeSet<Capability>,
}

impl PolicyRule {
    pub fn new(path: impl Into<String>, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            path: path.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }
}

/// A named set of capability grants over path patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub name: String,
    pub rules: Vec<PolicyRule>,
}

impl Policy {
    pub fn new(name: impl Into<String>, rules: Vec<PolicyRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Renders the policy as HCL. Rules keep their declared order and
    /// capabilities are emitted in `BTreeSet` order, so identical rules
    /// always render to identical text.
    pub fn to_hcl(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            let caps = rule
                .capabilities
                .iter()
                .map(|c| format!("\"{}\"", c.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(
                "path \"{}\" {{\n  capabilities = [{}]\n}}\n",
                rule.path, caps
            ));
        }
        out
    }
}

/// Writes `policy` to the service (upsert). Convergent rather than
/// idempotent: the write always happens, but identical rules produce an
/// identical stored document. An unauthorized write is fatal.
pub async fn apply_policy(
    api: &impl VaultApi,
    token: &SecretString,
    policy: &Policy,
) -> Result<(), VaultError> {
    api.write_policy(token.expose(), &policy.name, &policy.to_hcl())
        .await?;
    info!(name = %policy.name, rules = policy.rules.len(), "applied policy");
    Ok(())
}
