//! Credential persistence.
//!
//! The credential pair lives in a small YAML document that may hold other
//! keys too. It is read once before the run and overwritten once after it.

use async_trait::async_trait;
use checkin_core::CredentialPair;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::config::{AppConfig, FallbackCredentials};
use crate::error::StoreError;
use crate::persistence::{load_yaml_or_default, save_yaml};

// ============================================================================
// Credential Store Trait
// ============================================================================

/// Where the credential pair is kept between runs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads the pair used to start a run.
    async fn load(&self) -> Result<CredentialPair, StoreError>;

    /// Overwrites the stored pair.
    async fn save(&self, credentials: &CredentialPair) -> Result<(), StoreError>;
}

// ============================================================================
// Credential Document
// ============================================================================

/// On-disk shape of the credential document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialDocument {
    /// Stored access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Stored refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Any other keys, kept as they are.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl CredentialDocument {
    /// Returns the stored pair if both tokens are present and non-empty.
    pub fn credentials(&self) -> Option<CredentialPair> {
        let access = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let refresh = self.refresh_token.as_deref().filter(|t| !t.is_empty())?;
        Some(CredentialPair::new(access, refresh))
    }

    /// Replaces both tokens.
    pub fn set_credentials(&mut self, credentials: &CredentialPair) {
        self.access_token = Some(credentials.access_token.clone());
        self.refresh_token = Some(credentials.refresh_token.clone());
    }
}

// ============================================================================
// File Credential Store
// ============================================================================

/// YAML-file store with an environment fallback.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    fallback: FallbackCredentials,
}

impl FileCredentialStore {
    /// Creates a store for the given document.
    pub fn new(path: impl Into<PathBuf>, fallback: FallbackCredentials) -> Self {
        Self {
            path: path.into(),
            fallback,
        }
    }

    /// Creates the store described by the configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.credentials_path.clone(), config.fallback.clone())
    }

    /// Path of the credential document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<CredentialPair, StoreError> {
        let document: CredentialDocument = load_yaml_or_default(&self.path).await?;

        if let Some(credentials) = document.credentials() {
            debug!(source = "document", "Loaded credentials");
            return Ok(credentials);
        }

        // Either token missing from the document: take both from the environment.
        let credentials = CredentialPair::new(
            self.fallback.access_token.clone().unwrap_or_default(),
            self.fallback.refresh_token.clone().unwrap_or_default(),
        );
        credentials.validate().map_err(|_| {
            StoreError::MissingCredentials(format!(
                "no refresh_token in {} or the environment",
                self.path.display()
            ))
        })?;

        debug!(source = "env", "Loaded credentials");
        Ok(credentials)
    }

    #[instrument(skip(self, credentials), fields(path = %self.path.display()))]
    async fn save(&self, credentials: &CredentialPair) -> Result<(), StoreError> {
        let mut document: CredentialDocument = load_yaml_or_default(&self.path).await?;
        document.set_credentials(credentials);
        save_yaml(&self.path, &document).await?;

        info!("Credentials saved");
        Ok(())
    }
}
