//! Key file configuration
//!
//! Names the PEM files a [`KeyMaterial`](crate::KeyMaterial) is loaded from.
//!
//! # Example keys.toml
//!
//! ```toml
//! # PEM private key (SEC1 or PKCS#8). Takes precedence when both are set.
//! private-key-path = "keys/secp256k1-private.pem"
//!
//! # PEM public key (SPKI). Verification-only material.
//! public-key-path = "keys/secp256k1-public.pem"
//! ```

use crate::error::{KeyError, KeyResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Paths to PEM key files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyFilesConfig {
    /// PEM private key file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,

    /// PEM public key file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_path: Option<PathBuf>,
}

impl KeyFilesConfig {
    /// Config pointing at a private key file
    pub fn private(path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: Some(path.into()),
            public_key_path: None,
        }
    }

    /// Config pointing at a public key file
    pub fn public(path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: None,
            public_key_path: Some(path.into()),
        }
    }

    /// Parse from TOML text
    pub fn from_toml_str(s: &str) -> KeyResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    ///
    /// Relative key paths are resolved against the config file's directory.
    pub fn load(path: &Path) -> KeyResult<Self> {
        debug!("Loading key config from: {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| KeyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self {
            private_key_path: config.private_key_path.map(|p| base.join(p)),
            public_key_path: config.public_key_path.map(|p| base.join(p)),
        })
    }
}
