//! Key scheme tags.
//!
//! The scheme tag governs how a wrapped key appears on the wire and how
//! many bytes of key material it carries. Tags are converted to the
//! closed [`KeyScheme`] set at the parser; raw characters never travel
//! through the engine.

use crate::error::HsmError;

/// The closed set of key schemes understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScheme {
    /// Single-length 3DES key, tag `Z` or no tag at all.
    Single,
    /// Double-length 3DES key, tag `U`.
    Double,
    /// Triple-length 3DES key, tag `T`.
    Triple,
    /// Pair of single-length 3DES halves, tag `X`; rendered as two
    /// 16-hex halves without a tag.
    PairedSingle,
    /// Paired triple-length 3DES key, tag `Y`.
    PairedTriple,
    /// AES key block, tag `S` (tag `R` is accepted as a synonym on
    /// input).
    KeyBlock,
}

impl KeyScheme {
    /// Convert a wire tag character into a scheme.
    pub fn from_tag(tag: char) -> Result<Self, HsmError> {
        match tag {
            'Z' => Ok(KeyScheme::Single),
            'U' => Ok(KeyScheme::Double),
            'T' => Ok(KeyScheme::Triple),
            'X' => Ok(KeyScheme::PairedSingle),
            'Y' => Ok(KeyScheme::PairedTriple),
            'S' | 'R' => Ok(KeyScheme::KeyBlock),
            other => Err(HsmError::InvalidKeyScheme(other)),
        }
    }

    /// The canonical tag character, or `None` for schemes rendered
    /// without one.
    pub fn tag(&self) -> Option<char> {
        match self {
            KeyScheme::Single => Some('Z'),
            KeyScheme::Double => Some('U'),
            KeyScheme::Triple => Some('T'),
            KeyScheme::PairedSingle => None,
            KeyScheme::PairedTriple => Some('Y'),
            KeyScheme::KeyBlock => Some('S'),
        }
    }

    /// Length in bytes of the clear key material the scheme carries.
    pub fn key_len(&self) -> usize {
        match self {
            KeyScheme::Single => 8,
            KeyScheme::Double | KeyScheme::PairedSingle => 16,
            KeyScheme::Triple | KeyScheme::PairedTriple => 24,
            // Key blocks wrap double-length working keys for the
            // commands this engine serves.
            KeyScheme::KeyBlock => 16,
        }
    }

    /// Number of hex characters of the wrapped key on the wire.
    pub fn hex_len(&self) -> usize {
        self.key_len() * 2
    }

    /// True for the 3DES variant-LMK schemes.
    pub fn is_variant(&self) -> bool {
        !matches!(self, KeyScheme::KeyBlock)
    }

    /// Render a wrapped key for a reply message: uppercase hex behind
    /// the canonical tag, bare hex for paired singles, and the key
    /// block ASCII behind `S` for key blocks.
    pub fn render(&self, wrapped: &[u8]) -> String {
        match self {
            KeyScheme::KeyBlock => {
                let body = String::from_utf8_lossy(wrapped);
                format!("S{}", body)
            }
            KeyScheme::PairedSingle => hex::encode_upper(wrapped),
            _ => {
                let tag = self.tag().expect("variant schemes have a tag");
                format!("{}{}", tag, hex::encode_upper(wrapped))
            }
        }
    }
}
