//! Creation of the secrets a pod definition asks for.
//!
//! Before a definition is registered, every secret it wants created
//! (environment variable secrets with a new value, repository credentials
//! with new credentials) is stored in the vault and the options are rewritten
//! to reference the new secret by ID. If any creation fails, the secrets
//! created so far are deleted again.

use crate::cache::{SecretCache, SecretItem};
use crate::client::SecretVault;
use crate::error::{Error, Result, ResultExt};
use crate::pod::{PodDefinitionOptions, PodSecret};

/// Outcome of resolving a definition's secrets.
#[derive(Debug, Default)]
pub(crate) struct ResolvedSecrets {
    /// Every secret the definition references, by ID.
    pub secrets: Vec<PodSecret>,
    /// IDs of the secrets created during resolution.
    pub created: Vec<String>,
}

/// Creates the secrets `opts` asks for and rewrites them into ID references.
pub(crate) async fn resolve_secrets(
    vault: Option<&dyn SecretVault>,
    cache: Option<&dyn SecretCache>,
    opts: &mut PodDefinitionOptions,
) -> Result<ResolvedSecrets> {
    let mut resolved = ResolvedSecrets::default();
    match create_secrets(vault, cache, opts, &mut resolved).await {
        Ok(()) => Ok(resolved),
        Err(e) => {
            if let Some(vault) = vault {
                rollback_secrets(vault, cache, &resolved.created).await;
            }
            Err(e)
        }
    }
}

async fn create_secrets(
    vault: Option<&dyn SecretVault>,
    cache: Option<&dyn SecretCache>,
    opts: &mut PodDefinitionOptions,
    resolved: &mut ResolvedSecrets,
) -> Result<()> {
    for def in &mut opts.container_definitions {
        for ev in &mut def.env_vars {
            let Some(secret) = ev.secret_opts.as_mut() else {
                continue;
            };
            if secret.needs_creation() {
                let name = secret.name.clone().unwrap_or_default();
                let value = secret.new_value.clone().unwrap_or_default();
                let id = create_secret(vault, cache, &name, &value, resolved).await?;
                secret.id = Some(id);
                secret.new_value = None;
            }
            if let Some(id) = &secret.id {
                resolved.secrets.push(PodSecret {
                    id: id.clone(),
                    name: secret.name.clone(),
                    owned: secret.owned.unwrap_or(false),
                });
            }
        }

        if let Some(creds) = def.repo_creds.as_mut() {
            if let Some(new_creds) = creds.new_creds.as_ref().filter(|_| creds.id.is_none()) {
                let name = creds.name.clone().unwrap_or_default();
                let value = new_creds.to_secret_value()?;
                let id = create_secret(vault, cache, &name, &value, resolved).await?;
                creds.id = Some(id);
                creds.new_creds = None;
            }
            if let Some(id) = &creds.id {
                resolved.secrets.push(PodSecret {
                    id: id.clone(),
                    name: creds.name.clone(),
                    owned: creds.owned.unwrap_or(false),
                });
            }
        }
    }
    Ok(())
}

async fn create_secret(
    vault: Option<&dyn SecretVault>,
    cache: Option<&dyn SecretCache>,
    name: &str,
    value: &str,
    resolved: &mut ResolvedSecrets,
) -> Result<String> {
    let vault = vault.ok_or_else(|| {
        Error::InvalidInput(format!(
            "secret '{name}' must be created but no secret vault is configured"
        ))
    })?;
    let id = vault
        .create_secret(name, value)
        .await
        .context(format!("creating secret '{name}'"))?;
    resolved.created.push(id.clone());
    tracing::debug!(name, id = %id, "created secret");

    if let Some(cache) = cache {
        cache
            .put(SecretItem {
                id: id.clone(),
                name: name.to_string(),
            })
            .await
            .context(format!("caching secret '{name}'"))?;
    }
    Ok(id)
}

/// Deletes `ids` from the vault and cache, logging failures.
pub(crate) async fn rollback_secrets(
    vault: &dyn SecretVault,
    cache: Option<&dyn SecretCache>,
    ids: &[String],
) {
    for id in ids {
        if let Err(e) = vault.delete_secret(id).await {
            tracing::warn!(id = %id, error = %e, "failed to roll back secret");
            continue;
        }
        if let Some(cache) = cache {
            if let Err(e) = cache.delete(id).await {
                tracing::warn!(id = %id, error = %e, "failed to evict rolled back secret");
            }
        }
    }
}

/// Secrets referenced by ID in already resolved options.
pub(crate) fn referenced_secrets(opts: &PodDefinitionOptions) -> Vec<PodSecret> {
    let mut secrets = Vec::new();
    for def in &opts.container_definitions {
        for secret in def.env_vars.iter().filter_map(|ev| ev.secret_opts.as_ref()) {
            if let Some(id) = &secret.id {
                secrets.push(PodSecret {
                    id: id.clone(),
                    name: secret.name.clone(),
                    owned: secret.owned.unwrap_or(false),
                });
            }
        }
        if let Some(creds) = &def.repo_creds {
            if let Some(id) = &creds.id {
                secrets.push(PodSecret {
                    id: id.clone(),
                    name: creds.name.clone(),
                    owned: creds.owned.unwrap_or(false),
                });
            }
        }
    }
    secrets
}
