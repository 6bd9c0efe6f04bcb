//! Lazily derived key material
//!
//! [`KeyMaterial`] holds up to four representations of one key pair:
//!
//! | field         | derived from                                  |
//! |---------------|-----------------------------------------------|
//! | `private_raw` | `private_pem`                                 |
//! | `private_pem` | `private_raw`                                 |
//! | `public_raw`  | `public_pem`, else `private_raw`              |
//! | `public_pem`  | `public_raw`                                  |
//!
//! Any non-empty subset may be supplied. A missing field is derived on first
//! access and cached for the lifetime of the object; a failed derivation
//! caches nothing. Public material never yields private material.
//!
//! # Example
//!
//! ```rust
//! use keyholder::Secp256k1Key;
//!
//! let key = Secp256k1Key::generate();
//! let sig = key.sign(b"hello").unwrap();
//! assert!(key.verify(b"hello", &sig).unwrap());
//!
//! let public_only = Secp256k1Key::from_public_key_pem(key.public_key_pem().unwrap());
//! assert!(public_only.sign(b"hello").is_err());
//! ```

use crate::config::KeyFilesConfig;
use crate::curve::CurvePrimitives;
use crate::error::{CurveError, KeyError, KeyField, KeyResult};
use crate::secp256k1::Secp256k1;
use crate::secure::{IntoSecret, SecretBytes, SecretString};
use once_cell::sync::OnceCell;
use rand::{CryptoRng, RngCore};
use secrecy::ExposeSecret;
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

/// Key material bound to secp256k1
pub type Secp256k1Key = KeyMaterial<Secp256k1>;

/// Whether a field currently holds a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Not supplied and not yet derived
    Absent,
    /// Supplied at construction or derived and cached
    Cached,
}

/// Signing capability shared by every key algorithm.
pub trait KeyHolder {
    /// Name of the bound curve
    fn algorithm(&self) -> &'static str;

    /// Sign a message with the private key
    fn sign(&self, msg: &[u8]) -> KeyResult<Vec<u8>>;

    /// Raw public key bytes
    fn public_key(&self) -> KeyResult<&[u8]>;

    /// PEM-encoded public key
    fn public_key_pem(&self) -> KeyResult<&str>;
}

/// Up to four representations of one key pair, derived on demand.
///
/// Each slot is an init-once cell, so concurrent readers derive a field at
/// most once and never observe a partially written value.
pub struct KeyMaterial<C: CurvePrimitives = Secp256k1> {
    curve: C,
    private_raw: OnceCell<SecretBytes>,
    private_pem: OnceCell<SecretString>,
    public_raw: OnceCell<Vec<u8>>,
    public_pem: OnceCell<String>,
}

impl<C: CurvePrimitives + Default> KeyMaterial<C> {
    /// Start building key material from explicit fields
    pub fn builder() -> KeyMaterialBuilder<C> {
        KeyMaterialBuilder::new(C::default())
    }

    /// Generate a fresh private key from the OS random source
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut rand::rngs::OsRng)
    }

    /// Generate a fresh private key from the given random source
    pub fn generate_with_rng<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let curve = C::default();
        let secret = curve.generate_secret(rng);
        debug!(algorithm = C::NAME, "generated new private key");
        KeyMaterialBuilder::new(curve).private_key_secret(secret).build()
    }

    /// Key material from a raw private scalar
    pub fn from_private_key(private_key: &[u8]) -> Self {
        Self::builder().private_key(private_key).build()
    }

    /// Key material from a PEM private key
    pub fn from_private_key_pem(pem: impl Into<String>) -> Self {
        Self::builder().private_key_pem(pem).build()
    }

    /// Key material from a raw public point
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self::builder().public_key(public_key).build()
    }

    /// Key material from a PEM public key
    pub fn from_public_key_pem(pem: impl Into<String>) -> Self {
        Self::builder().public_key_pem(pem).build()
    }

    /// Load a PEM private key file
    pub fn from_private_key_path(path: impl AsRef<Path>) -> KeyResult<Self> {
        let pem = read_pem_file(path.as_ref(), KeyField::PrivatePem)?;
        Ok(Self::builder().private_key_pem_secret(pem.into_secret()).build())
    }

    /// Load a PEM public key file.
    ///
    /// The result carries no private material: signing and private accessors fail.
    pub fn from_public_key_path(path: impl AsRef<Path>) -> KeyResult<Self> {
        let pem = read_pem_file(path.as_ref(), KeyField::PublicPem)?;
        Ok(Self::from_public_key_pem(pem))
    }

    /// Load the key files named by a configuration, preferring the private key
    pub fn from_config(config: &KeyFilesConfig) -> KeyResult<Self> {
        match (&config.private_key_path, &config.public_key_path) {
            (Some(private), _) => Self::from_private_key_path(private),
            (None, Some(public)) => Self::from_public_key_path(public),
            (None, None) => Err(KeyError::MissingSourceMaterial(KeyField::PrivatePem)),
        }
    }
}

impl<C: CurvePrimitives> KeyMaterial<C> {
    /// Start building key material on a specific curve instance
    pub fn builder_with(curve: C) -> KeyMaterialBuilder<C> {
        KeyMaterialBuilder::new(curve)
    }

    /// Name of the bound curve
    pub fn algorithm(&self) -> &'static str {
        C::NAME
    }

    /// Current state of one field
    pub fn field_state(&self, field: KeyField) -> FieldState {
        let cached = match field {
            KeyField::PrivateRaw => self.private_raw.get().is_some(),
            KeyField::PrivatePem => self.private_pem.get().is_some(),
            KeyField::PublicRaw => self.public_raw.get().is_some(),
            KeyField::PublicPem => self.public_pem.get().is_some(),
        };
        if cached {
            FieldState::Cached
        } else {
            FieldState::Absent
        }
    }

    /// Whether a private representation was supplied or has been derived
    pub fn has_private_material(&self) -> bool {
        self.private_raw.get().is_some() || self.private_pem.get().is_some()
    }

    /// Raw private scalar, decoded from the private PEM if necessary
    pub fn private_key(&self) -> KeyResult<&[u8]> {
        let secret = self.private_raw.get_or_try_init(|| -> KeyResult<SecretBytes> {
            let pem = self
                .private_pem
                .get()
                .ok_or(KeyError::MissingSourceMaterial(KeyField::PrivateRaw))?;
            trace!(algorithm = C::NAME, "decoding private key from PEM");
            Ok(self.curve.secret_from_pem(pem.expose_secret())?)
        })?;
        Ok(secret.expose_secret().as_slice())
    }

    /// PEM private key, encoded from the raw scalar if necessary
    pub fn private_key_pem(&self) -> KeyResult<&str> {
        let pem = self.private_pem.get_or_try_init(|| -> KeyResult<SecretString> {
            let secret = self
                .private_raw
                .get()
                .ok_or(KeyError::MissingSourceMaterial(KeyField::PrivatePem))?;
            trace!(algorithm = C::NAME, "encoding private key as PEM");
            Ok(self.curve.secret_to_pem(secret.expose_secret())?)
        })?;
        Ok(pem.expose_secret())
    }

    /// Raw public point.
    ///
    /// Decoded from the public PEM when present, otherwise computed from the
    /// private scalar.
    pub fn public_key(&self) -> KeyResult<&[u8]> {
        let public = self.public_raw.get_or_try_init(|| -> KeyResult<Vec<u8>> {
            if let Some(pem) = self.public_pem.get() {
                trace!(algorithm = C::NAME, "decoding public key from PEM");
                return Ok(self.curve.public_from_pem(pem)?);
            }
            if !self.has_private_material() {
                return Err(KeyError::MissingSourceMaterial(KeyField::PublicRaw));
            }
            let secret = self.private_key()?;
            debug!(algorithm = C::NAME, "deriving public key from private key");
            Ok(self.curve.public_from_secret(secret)?)
        })?;
        Ok(public.as_slice())
    }

    /// PEM public key, encoded from the raw public point
    pub fn public_key_pem(&self) -> KeyResult<&str> {
        let pem = self.public_pem.get_or_try_init(|| -> KeyResult<String> {
            let public = self.public_key().map_err(|e| match e {
                KeyError::MissingSourceMaterial(_) => {
                    KeyError::MissingSourceMaterial(KeyField::PublicPem)
                }
                other => other,
            })?;
            trace!(algorithm = C::NAME, "encoding public key as PEM");
            Ok(self.curve.public_to_pem(public)?)
        })?;
        Ok(pem.as_str())
    }

    /// Lowercase hex of the raw public key
    pub fn public_key_hex(&self) -> KeyResult<String> {
        Ok(hex::encode(self.public_key()?))
    }

    /// Sign a message with the private key.
    ///
    /// Fails with [`KeyError::MissingSourceMaterial`] when only public
    /// material is available.
    pub fn sign(&self, msg: &[u8]) -> KeyResult<Vec<u8>> {
        let secret = self.private_key()?;
        let sig = self.curve.sign(secret, msg)?;
        trace!(algorithm = C::NAME, msg_len = msg.len(), "signed message");
        Ok(sig)
    }

    /// Verify a signature against the (possibly derived) public key
    pub fn verify(&self, msg: &[u8], sig: &[u8]) -> KeyResult<bool> {
        let public = self.public_key()?;
        Ok(self.curve.verify(public, msg, sig))
    }

    /// Check that every populated field describes the same key pair.
    ///
    /// Construction trusts the caller; this is the opt-in check for mixed
    /// inputs. Decoding failures of supplied fields are reported as-is.
    pub fn check_consistency(&self) -> KeyResult<()> {
        let from_private = if self.has_private_material() {
            let secret = self.private_key()?;
            if let Some(pem) = self.private_pem.get() {
                let decoded = self.curve.secret_from_pem(pem.expose_secret())?;
                if decoded.expose_secret().as_slice() != secret {
                    return Err(KeyError::InconsistentKeyMaterial(
                        "private key PEM does not match raw private key".to_string(),
                    ));
                }
            }
            Some(self.curve.public_from_secret(secret)?)
        } else {
            None
        };

        let from_pem = match self.public_pem.get() {
            Some(pem) => Some(self.curve.public_from_pem(pem)?),
            None => None,
        };

        let mut candidates = [
            from_private.as_deref().map(|p| ("private key", p)),
            from_pem.as_deref().map(|p| ("public key PEM", p)),
            self.public_raw.get().map(|p| ("raw public key", p.as_slice())),
        ]
        .into_iter()
        .flatten();

        if let Some((first_name, first)) = candidates.next() {
            let first = normalize_public(&self.curve, first)?;
            for (name, other) in candidates {
                if normalize_public(&self.curve, other)? != first {
                    return Err(KeyError::InconsistentKeyMaterial(format!(
                        "{} does not match {}",
                        name, first_name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl<C: CurvePrimitives> KeyHolder for KeyMaterial<C> {
    fn algorithm(&self) -> &'static str {
        KeyMaterial::algorithm(self)
    }

    fn sign(&self, msg: &[u8]) -> KeyResult<Vec<u8>> {
        KeyMaterial::sign(self, msg)
    }

    fn public_key(&self) -> KeyResult<&[u8]> {
        KeyMaterial::public_key(self)
    }

    fn public_key_pem(&self) -> KeyResult<&str> {
        KeyMaterial::public_key_pem(self)
    }
}

impl<C: CurvePrimitives> fmt::Debug for KeyMaterial<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("KeyMaterial");
        debug.field("algorithm", &C::NAME);
        if self.has_private_material() {
            debug.field("private_key", &"[REDACTED]");
        }
        match self.public_raw.get() {
            Some(public) => {
                debug.field("public_key", &hex::encode(&public[..public.len().min(8)]))
            }
            None => debug.field("public_key", &FieldState::Absent),
        };
        debug.finish()
    }
}

/// Builder for [`KeyMaterial`] from any combination of fields.
///
/// No combination is rejected: validation is deferred to first use.
pub struct KeyMaterialBuilder<C: CurvePrimitives> {
    curve: C,
    private_raw: Option<SecretBytes>,
    private_pem: Option<SecretString>,
    public_raw: Option<Vec<u8>>,
    public_pem: Option<String>,
}

impl<C: CurvePrimitives> KeyMaterialBuilder<C> {
    /// Create an empty builder on the given curve
    pub fn new(curve: C) -> Self {
        Self {
            curve,
            private_raw: None,
            private_pem: None,
            public_raw: None,
            public_pem: None,
        }
    }

    /// Set the raw private scalar (copied into a zeroizing buffer)
    pub fn private_key(self, private_key: &[u8]) -> Self {
        self.private_key_secret(private_key.into_secret())
    }

    /// Set the raw private scalar from an existing secret buffer
    pub fn private_key_secret(mut self, private_key: SecretBytes) -> Self {
        self.private_raw = Some(private_key);
        self
    }

    /// Set the PEM private key
    pub fn private_key_pem(self, pem: impl Into<String>) -> Self {
        let pem: String = pem.into();
        self.private_key_pem_secret(pem.into_secret())
    }

    /// Set the PEM private key from an existing secret string
    pub fn private_key_pem_secret(mut self, pem: SecretString) -> Self {
        self.private_pem = Some(pem);
        self
    }

    /// Set the raw public point
    pub fn public_key(mut self, public_key: &[u8]) -> Self {
        self.public_raw = Some(public_key.to_vec());
        self
    }

    /// Set the PEM public key
    pub fn public_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.public_pem = Some(pem.into());
        self
    }

    /// Build the key material
    pub fn build(self) -> KeyMaterial<C> {
        KeyMaterial {
            curve: self.curve,
            private_raw: seeded(self.private_raw),
            private_pem: seeded(self.private_pem),
            public_raw: seeded(self.public_raw),
            public_pem: seeded(self.public_pem),
        }
    }
}

fn seeded<T>(value: Option<T>) -> OnceCell<T> {
    match value {
        Some(value) => OnceCell::with_value(value),
        None => OnceCell::new(),
    }
}

/// Re-encode any accepted public key form as the curve's raw form
fn normalize_public<C: CurvePrimitives>(curve: &C, public: &[u8]) -> Result<Vec<u8>, CurveError> {
    let pem = curve.public_to_pem(public)?;
    curve.public_from_pem(&pem)
}

/// Read a key file as PEM text
fn read_pem_file(path: &Path, field: KeyField) -> KeyResult<String> {
    debug!(path = %path.display(), "loading {} file", field);
    let bytes = std::fs::read(path).map_err(|source| KeyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| {
        // Key file bytes may be private; drop them before reporting
        let mut bytes = e.into_bytes();
        zeroize::Zeroize::zeroize(&mut bytes);
        KeyError::Decode(CurveError::Pem(format!("{} file is not UTF-8 text", field)))
    })
}
