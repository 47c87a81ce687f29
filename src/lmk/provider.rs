//! The LMK provider seam.
//!
//! Command handlers never touch LMK material directly: they hold a
//! `&dyn LmkProvider` and ask it to wrap, unwrap or generate keys. Two
//! engines implement the contract — the legacy 3DES variant LMK and the
//! AES key-block LMK — and a registry maps the 2-character engine ids
//! carried by some commands to provider instances.

use std::collections::HashMap;
use std::sync::Arc;

use zeroize::Zeroizing;

use super::key_type::KeyType;
use super::scheme::KeyScheme;
use crate::crypto::generate_random_key;
use crate::error::HsmError;

/// Uniform contract over the key-protection engines.
///
/// Wrapped keys are opaque octets outside the provider: raw ciphertext
/// for the variant engine, printable key-block records for the AES
/// engine. Clear keys only ever leave a provider inside zeroizing
/// buffers, and parity of unwrapped material is the caller's concern.
pub trait LmkProvider: Send + Sync {
    /// Wrap a clear key for the given type and scheme.
    fn encrypt_under_lmk(
        &self,
        clear_key: &[u8],
        key_type: KeyType,
        scheme: KeyScheme,
    ) -> Result<Vec<u8>, HsmError>;

    /// Unwrap a key previously wrapped for the same type and scheme.
    fn decrypt_under_lmk(
        &self,
        encrypted_key: &[u8],
        key_type: KeyType,
        scheme: KeyScheme,
    ) -> Result<Zeroizing<Vec<u8>>, HsmError>;

    /// Generate a random, parity-adjusted clear key.
    fn random_key(&self, len: usize) -> Result<Zeroizing<Vec<u8>>, HsmError> {
        generate_random_key(len)
    }

    /// 16-hex check value identifying the loaded LMK, computed over the
    /// all-zero block.
    fn check_value(&self) -> Result<String, HsmError>;
}

/// Read-only map of LMK engines keyed by their 2-character id.
///
/// Built once at startup; handlers only ever read it.
pub struct LmkRegistry {
    engines: HashMap<String, Arc<dyn LmkProvider>>,
    default_id: String,
}

impl LmkRegistry {
    /// Create a registry with a single default engine.
    pub fn new(default_id: &str, engine: Arc<dyn LmkProvider>) -> Self {
        let mut engines = HashMap::new();
        engines.insert(default_id.to_string(), engine);
        LmkRegistry {
            engines,
            default_id: default_id.to_string(),
        }
    }

    /// Register an additional engine under `id`. Intended for startup
    /// wiring only.
    pub fn register(&mut self, id: &str, engine: Arc<dyn LmkProvider>) {
        self.engines.insert(id.to_string(), engine);
    }

    /// Look up an engine by id.
    pub fn get(&self, id: &str) -> Result<&dyn LmkProvider, HsmError> {
        self.engines
            .get(id)
            .map(|engine| engine.as_ref())
            .ok_or_else(|| HsmError::LmkFailure(format!("no LMK engine with id {}", id)))
    }

    /// The engine commands use when they carry no engine selector.
    pub fn default_engine(&self) -> &dyn LmkProvider {
        self.engines
            .get(&self.default_id)
            .expect("registry always contains its default engine")
            .as_ref()
    }
}
