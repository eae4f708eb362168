//! Single name labels.

use crate::errors::*;
use crate::MAX_LABEL_LENGTH;
use std::borrow::Cow;
use std::fmt;
use unires_types::keccak256;

/// Wire length of an opaque label: `[` + 64 hex chars + `]`.
const OPAQUE_LABEL_LENGTH: usize = 66;

/// One segment of a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// Plaintext label, hashed from its UTF-8 bytes.
    Text(String),
    /// Opaque label whose plaintext is withheld; carries its hash verbatim.
    Hashed([u8; 32]),
}

impl Label {
    /// Parses one dotted-form label.
    pub fn parse(label: &str) -> Result<Label> {
        if let Some(hash) = parse_opaque(label.as_bytes()) {
            return Ok(Label::Hashed(hash));
        }
        validate_text(label)?;
        Ok(Label::Text(label.to_string()))
    }

    /// Parses one label read from the wire form.
    pub(crate) fn from_wire(bytes: &[u8]) -> Result<Label> {
        if let Some(hash) = parse_opaque(bytes) {
            return Ok(Label::Hashed(hash));
        }
        let text = std::str::from_utf8(bytes).map_err(|_| {
            NameError::malformed(
                String::from_utf8_lossy(bytes),
                "label is not valid UTF-8",
            )
        })?;
        validate_text(text)?;
        Ok(Label::Text(text.to_string()))
    }

    pub fn labelhash(&self) -> [u8; 32] {
        match self {
            Label::Text(text) => keccak256(text.as_bytes()),
            Label::Hashed(hash) => *hash,
        }
    }

    /// Bytes written after the length prefix on the wire.
    pub fn wire_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Label::Text(text) => Cow::Borrowed(text.as_bytes()),
            Label::Hashed(_) => Cow::Owned(self.to_string().into_bytes()),
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Label::Hashed(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(text) => f.write_str(text),
            Label::Hashed(hash) => write!(f, "[{}]", hex::encode(hash)),
        }
    }
}

/// Only the lowercase form is opaque, so `Display` reproduces it exactly.
fn parse_opaque(bytes: &[u8]) -> Option<[u8; 32]> {
    if bytes.len() != OPAQUE_LABEL_LENGTH
        || bytes[0] != b'['
        || bytes[OPAQUE_LABEL_LENGTH - 1] != b']'
    {
        return None;
    }
    let digits = &bytes[1..OPAQUE_LABEL_LENGTH - 1];
    if digits.iter().any(u8::is_ascii_uppercase) {
        return None;
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(digits, &mut hash).ok()?;
    Some(hash)
}

fn validate_text(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(NameError::malformed(label, "empty label"));
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(NameError::malformed(
            label,
            format!("label is {} bytes, limit is {MAX_LABEL_LENGTH}", label.len()),
        ));
    }
    if label.as_bytes().contains(&0) {
        return Err(NameError::malformed(label, "label contains the terminator byte"));
    }
    if label.contains('.') {
        return Err(NameError::malformed(label, "label contains a separator"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_HASH: &str = "9c22ff5f21f0b81b113e63f7db6da94fedef11b2119b4088b89664fb9a3cb658";

    #[test]
    fn opaque_label_carries_hash_verbatim() {
        let label = Label::parse(&format!("[{TEST_HASH}]")).unwrap();
        assert!(label.is_opaque());
        assert_eq!(label.labelhash(), Label::parse("test").unwrap().labelhash());
    }

    #[test]
    fn opaque_label_wire_form_is_bracketed_hex() {
        let label = Label::Hashed([0xab; 32]);
        let wire = label.wire_bytes();
        assert_eq!(wire.len(), OPAQUE_LABEL_LENGTH);
        assert_eq!(wire[0], b'[');
        assert_eq!(Label::from_wire(&wire).unwrap(), label);
    }

    #[test]
    fn bracketed_non_hex_is_plain_text() {
        let text = format!("[{}]", "z".repeat(64));
        assert!(matches!(Label::parse(&text).unwrap(), Label::Text(_)));
    }

    #[test]
    fn uppercase_hex_is_plain_text() {
        let text = format!("[{}]", TEST_HASH.to_uppercase());
        let label = Label::parse(&text).unwrap();
        assert!(matches!(label, Label::Text(_)));
        assert_eq!(label.to_string(), text);
        assert_eq!(Label::from_wire(&label.wire_bytes()).unwrap(), label);
    }

    #[test]
    fn oversized_label_is_malformed() {
        let err = Label::parse(&"a".repeat(MAX_LABEL_LENGTH + 1)).unwrap_err();
        assert!(matches!(err, NameError::MalformedName { .. }));
        assert!(Label::parse(&"a".repeat(MAX_LABEL_LENGTH)).is_ok());
    }

    #[test]
    fn terminator_byte_is_malformed() {
        assert!(Label::parse("a\0b").is_err());
        assert!(Label::parse("").is_err());
    }
}
