//! Error taxonomy for the HSM engine.
//!
//! Every failure detected inside the crate is one of the kinds below. The
//! kinds are internal values; the two-digit Thales code a client sees is
//! produced by [`HsmError::wire_code`] exactly once, at the command
//! boundary, when the reply frame is assembled. Codes never flow through
//! the engine as strings and error values never carry key or PIN
//! material.

use thiserror::Error;

/// Failure kinds raised by the crypto primitives, the LMK providers, the
/// PIN-block codec and the command handlers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HsmError {
    /// A PVV, CVV, ARQC or key-check comparison did not match.
    #[error("verification failed")]
    VerificationFailed,

    /// The scheme tag of a ZMK field is not a valid key scheme.
    #[error("invalid ZMK scheme tag `{0}`")]
    InvalidZmkScheme(char),

    /// A key decrypted under the LMK does not have odd parity.
    #[error("parity error on decrypted key")]
    KeyParity,

    /// A key failed a semantic check (all zero, bad PVK half).
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    /// The request body is too short or a field is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// A check value or PIN could not be extracted.
    #[error("extraction failed: {0}")]
    ExtractionFailed(&'static str),

    /// The two-digit PIN-block format code is not one the engine knows.
    #[error("unknown PIN block format code `{0}`")]
    UnknownPinFormat(String),

    /// The scheme tag of a key field is not a valid key scheme.
    #[error("invalid key scheme tag `{0}`")]
    InvalidKeyScheme(char),

    /// A command that requires a double-length key got another length.
    #[error("key is not double length")]
    KeyNotDoubleLength,

    /// A DES or AES primitive rejected its input.
    #[error("cryptographic operation failed: {0}")]
    CryptoFailure(String),

    /// An LMK engine could not wrap or unwrap a key.
    #[error("LMK operation failed: {0}")]
    LmkFailure(String),

    /// The transaction data length of a cryptogram request is out of
    /// range.
    #[error("invalid transaction data length: {0}")]
    InvalidTransactionData(usize),

    /// The mode field of a command is not one of its allowed values.
    #[error("invalid mode `{0}`")]
    InvalidMode(char),
}

impl HsmError {
    /// Map this kind to the two-digit ASCII code placed in the reply
    /// frame. The mapping is total: every kind has exactly one code.
    pub fn wire_code(&self) -> &'static str {
        match self {
            HsmError::VerificationFailed => "01",
            HsmError::InvalidZmkScheme(_) => "05",
            HsmError::KeyParity => "10",
            HsmError::InvalidKey(_) => "11",
            HsmError::InvalidInput(_) => "15",
            HsmError::ExtractionFailed(_) => "20",
            HsmError::UnknownPinFormat(_) => "23",
            HsmError::InvalidKeyScheme(_) => "26",
            HsmError::KeyNotDoubleLength => "27",
            HsmError::CryptoFailure(_) => "42",
            HsmError::LmkFailure(_) => "68",
            HsmError::InvalidTransactionData(_) => "80",
            HsmError::InvalidMode(_) => "A8",
        }
    }
}
