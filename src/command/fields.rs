//! Field cursor over a command body.
//!
//! Thales command bodies are concatenated fixed-width fields with no
//! delimiters except the few explicit separator characters. The cursor
//! consumes fields by declared byte widths, which also keeps the mixed
//! binary and ASCII layout of the cryptogram commands honest. Every
//! short read or malformed field reports the input-shape kind, so the
//! wire sees `15` regardless of which field broke.

use crate::error::HsmError;
use crate::lmk::KeyScheme;

/// The fixed wire width of an AES key-block record wrapping a
/// double-length working key: 12 header characters, 64 ciphertext hex
/// characters and 32 MAC hex characters.
const KEY_BLOCK_WIRE_LEN: usize = 108;

/// A parsed key field: the scheme, the wrapped material, and whether
/// the field carried an explicit scheme tag.
#[derive(Debug)]
pub struct KeyField {
    pub scheme: KeyScheme,
    pub wrapped: Vec<u8>,
    pub tagged: bool,
}

impl KeyField {
    /// Render the wrapped key the way it arrived: tagged fields use the
    /// scheme rendering, untagged fields stay bare hex.
    pub fn render(&self, wrapped: &[u8]) -> String {
        if self.tagged {
            self.scheme.render(wrapped)
        } else {
            hex::encode_upper(wrapped)
        }
    }
}

/// Cursor over the raw bytes of one command body.
pub struct FieldCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        FieldCursor { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume `n` raw bytes.
    pub fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], HsmError> {
        if self.remaining() < n {
            return Err(HsmError::InvalidInput(field));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume `n` bytes as ASCII text.
    pub fn take_str(&mut self, n: usize, field: &'static str) -> Result<&'a str, HsmError> {
        let slice = self.take(n, field)?;
        let text = std::str::from_utf8(slice).map_err(|_| HsmError::InvalidInput(field))?;
        if !text.is_ascii() {
            return Err(HsmError::InvalidInput(field));
        }
        Ok(text)
    }

    /// Consume one ASCII character.
    pub fn take_char(&mut self, field: &'static str) -> Result<char, HsmError> {
        let slice = self.take(1, field)?;
        if !slice[0].is_ascii() {
            return Err(HsmError::InvalidInput(field));
        }
        Ok(slice[0] as char)
    }

    /// Consume `n` decimal digits.
    pub fn take_digits(&mut self, n: usize, field: &'static str) -> Result<&'a str, HsmError> {
        let text = self.take_str(n, field)?;
        if !text.chars().all(|c| c.is_ascii_digit()) {
            return Err(HsmError::InvalidInput(field));
        }
        Ok(text)
    }

    /// Consume `n` hex characters and decode them.
    pub fn take_hex(&mut self, n: usize, field: &'static str) -> Result<Vec<u8>, HsmError> {
        let text = self.take_str(n, field)?;
        hex::decode(text).map_err(|_| HsmError::InvalidInput(field))
    }

    /// The next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Consume the next byte when it equals `byte`.
    pub fn skip_if(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume bytes up to (not including) the delimiter as ASCII.
    pub fn take_until(&mut self, delim: u8, field: &'static str) -> Result<&'a str, HsmError> {
        let rest = &self.data[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == delim)
            .ok_or(HsmError::InvalidInput(field))?;
        self.take_str(end, field)
    }

    /// All unconsumed bytes.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    /// Consume a wrapped key field.
    ///
    /// A leading scheme tag selects the width and engine; a bare field
    /// is parsed as `bare` (paired single for most commands, single
    /// length where a command accepts 16 untagged hex characters). Key
    /// blocks arrive as the fixed-width ASCII record behind their `S`
    /// tag.
    pub fn take_key_field(
        &mut self,
        bare: KeyScheme,
        field: &'static str,
    ) -> Result<KeyField, HsmError> {
        let tag = self.peek().ok_or(HsmError::InvalidInput(field))? as char;
        if tag.is_ascii_uppercase() && !tag.is_ascii_hexdigit() {
            let scheme = KeyScheme::from_tag(tag)?;
            self.pos += 1;
            let wrapped = if scheme == KeyScheme::KeyBlock {
                self.take(KEY_BLOCK_WIRE_LEN - 1, field)?.to_vec()
            } else {
                self.take_hex(scheme.hex_len(), field)?
            };
            return Ok(KeyField {
                scheme,
                wrapped,
                tagged: true,
            });
        }

        let wrapped = self.take_hex(bare.hex_len(), field)?;
        Ok(KeyField {
            scheme: bare,
            wrapped,
            tagged: false,
        })
    }
}
