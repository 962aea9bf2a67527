// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Check-in Store
//!
//! Start-up configuration and credential persistence.
//!
//! - **AppConfig**: the configuration value built once from the environment
//! - **CredentialStore**: where the rotating token pair lives between runs
//! - **Persistence**: atomic, owner-only YAML file I/O
//!
//! ## Usage
//!
//! ```ignore
//! use checkin_store::{AppConfig, CredentialStore, FileCredentialStore};
//!
//! let config = AppConfig::from_env("config.yaml");
//! let store = FileCredentialStore::from_config(&config);
//!
//! let credentials = store.load().await?;
//! // ... run the check-in ...
//! store.save(&credentials).await?;
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod persistence;

pub use config::{env_keys, AppConfig, ConfigSummary, FallbackCredentials, DEFAULT_CREDENTIALS_FILE};
pub use credentials::{CredentialDocument, CredentialStore, FileCredentialStore};
pub use error::StoreError;
pub use persistence::{load_yaml, load_yaml_or_default, save_yaml};
