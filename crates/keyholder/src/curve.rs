//! Elliptic-curve capability consumed by [`KeyMaterial`](crate::KeyMaterial)
//!
//! The key material never touches curve arithmetic directly. Everything it
//! needs (PEM codecs, generator multiplication, signing) goes through this
//! trait, so one implementation binds one named curve at the type level.
//!
//! Methods take `&self` so an implementation may carry state, e.g. a
//! call-counting test double wrapping the real curve.

use crate::error::CurveError;
use crate::secure::{SecretBytes, SecretString};
use rand::{CryptoRng, RngCore};

/// Primitive operations for a single named elliptic curve.
///
/// Raw secrets are fixed-length big-endian scalars of [`SECRET_LEN`](Self::SECRET_LEN)
/// bytes; raw public keys are encoded points of [`PUBLIC_LEN`](Self::PUBLIC_LEN) bytes.
pub trait CurvePrimitives: Send + Sync {
    /// Curve identifier (e.g. `"secp256k1"`)
    const NAME: &'static str;

    /// Length of a raw private scalar
    const SECRET_LEN: usize;

    /// Length of a raw public key as produced by this curve
    const PUBLIC_LEN: usize;

    /// Sample a uniformly random private scalar
    fn generate_secret<R: CryptoRng + RngCore>(&self, rng: &mut R) -> SecretBytes;

    /// Decode a PEM private key block into raw scalar bytes
    fn secret_from_pem(&self, pem: &str) -> Result<SecretBytes, CurveError>;

    /// Encode raw scalar bytes as a PEM private key block
    fn secret_to_pem(&self, secret: &[u8]) -> Result<SecretString, CurveError>;

    /// Decode a PEM public key block into raw point bytes
    fn public_from_pem(&self, pem: &str) -> Result<Vec<u8>, CurveError>;

    /// Encode raw point bytes as a PEM public key block
    fn public_to_pem(&self, public: &[u8]) -> Result<String, CurveError>;

    /// Multiply the generator by the private scalar
    fn public_from_secret(&self, secret: &[u8]) -> Result<Vec<u8>, CurveError>;

    /// Sign `msg` with the private scalar
    fn sign(&self, secret: &[u8], msg: &[u8]) -> Result<Vec<u8>, CurveError>;

    /// Verify `sig` over `msg`. Malformed keys or signatures verify as `false`.
    fn verify(&self, public: &[u8], msg: &[u8], sig: &[u8]) -> bool;
}
