//! Full names and their two wire forms.

use crate::errors::*;
use crate::label::Label;
use crate::MAX_NAME_LENGTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unires_types::{Address, NodeId};

/// An ordered sequence of labels, most specific first. The empty sequence
/// is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name {
    labels: Vec<Label>,
}

/// One ancestor of a name visited during resolver discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ancestor {
    /// Offset of the ancestor's first label inside the wire form.
    pub offset: usize,
    pub node: NodeId,
}

impl Name {
    pub fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Parses a dotted name. The empty string is the root.
    pub fn parse(dotted: &str) -> Result<Name> {
        if dotted.is_empty() {
            return Ok(Name::root());
        }
        let labels = dotted
            .split('.')
            .map(Label::parse)
            .collect::<Result<Vec<_>>>()
            .map_err(|err| match err {
                NameError::MalformedName { reason, .. } => NameError::malformed(dotted, reason),
                other => other,
            })?;
        let name = Name { labels };
        name.check_length(dotted)?;
        Ok(name)
    }

    /// Decodes the length-prefixed wire form. The input must end exactly at
    /// the zero-length terminator.
    pub fn from_wire(wire: &[u8]) -> Result<Name> {
        if wire.len() > MAX_NAME_LENGTH {
            return Err(NameError::malformed(
                hex::encode(wire),
                format!("wire form is {} bytes, limit is {MAX_NAME_LENGTH}", wire.len()),
            ));
        }

        let mut labels = Vec::new();
        let mut offset = 0;
        loop {
            let Some(&len) = wire.get(offset) else {
                return Err(NameError::TruncatedName {
                    offset,
                    needed: 1,
                    available: 0,
                });
            };
            let len = usize::from(len);
            if len == 0 {
                break;
            }
            let start = offset + 1;
            let available = wire.len() - start;
            if len > available {
                return Err(NameError::TruncatedName {
                    offset,
                    needed: len,
                    available,
                });
            }
            labels.push(Label::from_wire(&wire[start..start + len])?);
            offset = start + len;
        }

        if offset + 1 != wire.len() {
            return Err(NameError::malformed(
                hex::encode(wire),
                format!("{} trailing bytes after terminator", wire.len() - offset - 1),
            ));
        }

        Ok(Name { labels })
    }

    /// Canonical reverse name of `address` under `suffix`, e.g.
    /// `<40 hex chars>.addr.reverse`.
    pub fn reverse(address: &Address, suffix: &str) -> Result<Name> {
        Name::parse(&format!("{}.{}", address.to_hex_lower(), suffix))
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// The name with its first label removed; `None` for the root.
    pub fn parent(&self) -> Option<Name> {
        if self.is_root() {
            return None;
        }
        Some(Name {
            labels: self.labels[1..].to_vec(),
        })
    }

    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        for label in &self.labels {
            let bytes = label.wire_bytes();
            out.push(bytes.len() as u8);
            out.extend_from_slice(&bytes);
        }
        out.push(0);
        out
    }

    pub fn namehash(&self) -> NodeId {
        self.labels
            .iter()
            .rev()
            .fold(NodeId::ROOT, |node, label| node.child(&label.labelhash()))
    }

    /// Every ancestor of this name from the name itself down to the root,
    /// most specific first. Always yields `label_count() + 1` entries.
    pub fn ancestors(&self) -> Vec<Ancestor> {
        let mut offsets = Vec::with_capacity(self.labels.len() + 1);
        let mut offset = 0;
        for label in &self.labels {
            offsets.push(offset);
            offset += 1 + label.wire_bytes().len();
        }
        offsets.push(offset);

        let mut ancestors = vec![
            Ancestor {
                offset,
                node: NodeId::ROOT,
            };
            self.labels.len() + 1
        ];
        let mut node = NodeId::ROOT;
        for (i, label) in self.labels.iter().enumerate().rev() {
            node = node.child(&label.labelhash());
            ancestors[i] = Ancestor {
                offset: offsets[i],
                node,
            };
        }
        ancestors
    }

    fn wire_len(&self) -> usize {
        self.labels
            .iter()
            .map(|l| 1 + l.wire_bytes().len())
            .sum::<usize>()
            + 1
    }

    fn check_length(&self, original: &str) -> Result<()> {
        let len = self.wire_len();
        if len > MAX_NAME_LENGTH {
            return Err(NameError::malformed(
                original,
                format!("wire form is {len} bytes, limit is {MAX_NAME_LENGTH}"),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self> {
        Name::parse(s)
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self> {
        Name::parse(&value)
    }
}

impl From<Name> for String {
    fn from(value: Name) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_encodes_to_single_terminator() {
        let root = Name::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.to_wire(), vec![0]);
        assert_eq!(root.namehash(), NodeId::ROOT);
        assert_eq!(Name::from_wire(&[0]).unwrap(), root);
    }

    #[test]
    fn wire_form_is_length_prefixed() {
        let name = Name::parse("test.astra").unwrap();
        assert_eq!(name.to_wire(), b"\x04test\x05astra\x00".to_vec());
    }

    #[test]
    fn empty_label_is_malformed() {
        for bad in ["a..b", ".a", "a."] {
            let err = Name::parse(bad).unwrap_err();
            assert!(matches!(err, NameError::MalformedName { .. }), "{bad}");
        }
    }

    #[test]
    fn truncated_label_is_reported() {
        let err = Name::from_wire(b"\x05tes").unwrap_err();
        assert_eq!(
            err,
            NameError::TruncatedName {
                offset: 0,
                needed: 5,
                available: 3
            }
        );
    }

    #[test]
    fn missing_terminator_is_truncated() {
        let err = Name::from_wire(b"\x04test").unwrap_err();
        assert!(matches!(err, NameError::TruncatedName { offset: 5, .. }));
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let err = Name::from_wire(b"\x01a\x00\x01").unwrap_err();
        assert!(matches!(err, NameError::MalformedName { .. }));
    }

    #[test]
    fn oversized_name_is_malformed() {
        let dotted = vec!["a".repeat(200); 6].join(".");
        assert!(matches!(
            Name::parse(&dotted),
            Err(NameError::MalformedName { .. })
        ));
    }

    #[test]
    fn ancestors_run_leaf_to_root() {
        let name = Name::parse("sub.test.astra").unwrap();
        let ancestors = name.ancestors();
        assert_eq!(ancestors.len(), 4);
        assert_eq!(ancestors[0].offset, 0);
        assert_eq!(ancestors[0].node, name.namehash());
        assert_eq!(ancestors[1].offset, 4);
        assert_eq!(ancestors[1].node, Name::parse("test.astra").unwrap().namehash());
        assert_eq!(ancestors[2].offset, 9);
        assert_eq!(ancestors[3].node, NodeId::ROOT);
        assert_eq!(ancestors[3].offset, name.to_wire().len() - 1);
    }

    #[test]
    fn reverse_name_uses_lowercase_hex() {
        let address: Address = "0xAbCdEf0123456789abcdef0123456789ABCDEF01".parse().unwrap();
        let name = Name::reverse(&address, crate::DEFAULT_REVERSE_SUFFIX).unwrap();
        assert_eq!(
            name.to_string(),
            "abcdef0123456789abcdef0123456789abcdef01.addr.reverse"
        );
    }

    #[test]
    fn parent_strips_first_label() {
        let name = Name::parse("a.b.c").unwrap();
        assert_eq!(name.parent().unwrap().to_string(), "b.c");
        assert!(Name::root().parent().is_none());
    }
}
