//! Lazy, bidirectional key material for secp256k1
//!
//! This crate provides:
//! - KeyMaterial: raw and PEM forms of a key pair, each derived on demand and cached
//! - CurvePrimitives: the elliptic-curve capability the key material delegates to
//! - Secp256k1: the k256-backed implementation of that capability
//! - KeyFilesConfig: TOML configuration naming PEM key files
//! - Zeroizing secret buffers for private material

pub mod config;
pub mod curve;
pub mod error;
pub mod material;
pub mod secp256k1;
pub mod secure;

// Key material exports
pub use material::{FieldState, KeyHolder, KeyMaterial, KeyMaterialBuilder, Secp256k1Key};

// Curve exports
pub use curve::CurvePrimitives;
pub use secp256k1::Secp256k1;

// Config exports
pub use config::KeyFilesConfig;

// Error exports
pub use error::{CurveError, KeyError, KeyField, KeyResult};

// Secure memory exports
pub use secure::{IntoSecret, SecretBytes, SecretString};
