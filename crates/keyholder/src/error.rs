//! Key material error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for key material operations
pub type KeyResult<T> = Result<T, KeyError>;

/// The four representations a [`KeyMaterial`](crate::KeyMaterial) can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyField {
    /// Raw private scalar bytes
    PrivateRaw,
    /// PEM-encoded private key
    PrivatePem,
    /// Raw public point bytes
    PublicRaw,
    /// PEM-encoded public key
    PublicPem,
}

impl KeyField {
    /// All fields, in derivation order
    pub const ALL: [KeyField; 4] = [
        KeyField::PrivateRaw,
        KeyField::PrivatePem,
        KeyField::PublicRaw,
        KeyField::PublicPem,
    ];

    /// Whether this field carries private material
    pub fn is_private(&self) -> bool {
        matches!(self, KeyField::PrivateRaw | KeyField::PrivatePem)
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyField::PrivateRaw => write!(f, "private key"),
            KeyField::PrivatePem => write!(f, "private key PEM"),
            KeyField::PublicRaw => write!(f, "public key"),
            KeyField::PublicPem => write!(f, "public key PEM"),
        }
    }
}

/// Errors raised by the elliptic-curve primitives
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Invalid secret scalar bytes
    #[error("invalid secret key bytes")]
    InvalidSecretKey,

    /// Invalid public point bytes
    #[error("invalid public key bytes")]
    InvalidPublicKey,

    /// Invalid signature bytes
    #[error("invalid signature bytes")]
    InvalidSignature,

    /// PEM text could not be parsed as a key for this curve
    #[error("PEM decoding failed: {0}")]
    Pem(String),

    /// Key could not be written out as PEM
    #[error("PEM encoding failed: {0}")]
    Encoding(String),
}

/// Errors that can occur while deriving or using key material
#[derive(Debug, Error)]
pub enum KeyError {
    /// Neither the requested field nor anything it can be derived from is present
    #[error("missing source material: no values given to derive {0}")]
    MissingSourceMaterial(KeyField),

    /// Malformed raw or PEM input, passed through from the curve primitives
    #[error("decode failure: {0}")]
    Decode(#[from] CurveError),

    /// Key file could not be read
    #[error("failed to read key file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key file configuration could not be parsed
    #[error("invalid key configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Populated fields describe different key pairs
    #[error("inconsistent key material: {0}")]
    InconsistentKeyMaterial(String),
}

impl KeyError {
    /// Whether this error means the requested representation has no source
    pub fn is_missing_material(&self) -> bool {
        matches!(self, KeyError::MissingSourceMaterial(_))
    }
}
