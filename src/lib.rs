//! A payment HSM emulator speaking the Thales command set.
//!
//! The crate accepts framed command messages, dispatches them by their
//! two-letter code and performs the requested cryptographic operation
//! under a protected Local Master Key. The building blocks are exposed
//! as modules:
//!
//! - [`crypto`]: DES/3DES helpers, key parity and check values, Visa
//!   PVV/CVV, EMV key derivation and application cryptograms.
//! - [`lmk`]: the key-protection layer — variant LMK and AES key-block
//!   engines behind the [`lmk::LmkProvider`] trait.
//! - [`pin`]: the PIN-block codec for the supported formats.
//! - [`command`]: the per-command parsers and orchestrators.
//! - [`server`]: wire framing and the bounded-pool TCP front end.
//! - [`config`]: LMK loading with embedded test defaults.
//!
//! Clear key material only ever lives in zeroizing buffers for the
//! duration of one command, and every verification comparison runs in
//! constant time.

pub mod command;
pub mod config;
pub mod crypto;
pub mod error;
pub mod lmk;
pub mod pin;
pub mod server;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::HsmError;
