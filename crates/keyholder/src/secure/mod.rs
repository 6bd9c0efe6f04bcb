//! Secret buffers for private key material
//!
//! Private scalars and private PEM text are held in `secrecy` boxes so they are
//! zeroized on drop and print as `[REDACTED]` in debug output.

mod secret;

pub use secret::{IntoSecret, SecretBytes, SecretString};
