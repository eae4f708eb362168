//! ABI decoding.
//!
//! Offsets and lengths are bounds-checked against the input; an array length
//! is rejected before allocation if the input cannot hold that many heads.

use crate::errors::*;
use crate::token::{ParamType, Token};
use crate::WORD;
use unires_types::{Address, Selector};

/// Decodes `data` as a tuple with component types `types`.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>> {
    decode_sequence(types.iter(), data, 0)
}

/// Decodes call data whose leading four bytes must equal `selector`.
pub fn decode_call(selector: &Selector, types: &[ParamType], data: &[u8]) -> Result<Vec<Token>> {
    if data.len() < 4 {
        return Err(AbiError::Truncated {
            offset: 0,
            needed: 4,
            available: data.len(),
        });
    }
    let found = Selector::of(data);
    if &found != selector {
        return Err(AbiError::SelectorMismatch {
            expected: *selector,
            found,
        });
    }
    decode(types, &data[4..])
}

fn decode_sequence<'a>(
    types: impl Iterator<Item = &'a ParamType>,
    data: &[u8],
    base: usize,
) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut cursor = base;

    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, cursor)?;
            let start = base
                .checked_add(offset)
                .ok_or_else(|| AbiError::InvalidOffset {
                    word: format!("{offset:x}"),
                })?;
            tokens.push(decode_token(ty, data, start)?);
            cursor += WORD;
        } else {
            tokens.push(decode_token(ty, data, cursor)?);
            cursor += ty.head_size();
        }
    }

    Ok(tokens)
}

fn decode_token(ty: &ParamType, data: &[u8], at: usize) -> Result<Token> {
    match ty {
        ParamType::Address => {
            let word = read_word(data, at)?;
            if word[..WORD - 20].iter().any(|b| *b != 0) {
                return Err(AbiError::InvalidValue { kind: "address" });
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[WORD - 20..]);
            Ok(Token::Address(Address(bytes)))
        }
        ParamType::Bool => {
            let word = read_word(data, at)?;
            if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
                return Err(AbiError::InvalidValue { kind: "bool" });
            }
            Ok(Token::Bool(word[WORD - 1] == 1))
        }
        ParamType::Uint => Ok(Token::Uint(read_word(data, at)?)),
        ParamType::FixedBytes(size) => {
            if *size == 0 || *size > WORD {
                return Err(AbiError::InvalidValue { kind: "fixed bytes width" });
            }
            let word = read_word(data, at)?;
            Ok(Token::FixedBytes(word[..*size].to_vec()))
        }
        ParamType::Bytes => Ok(Token::Bytes(read_packed_bytes(data, at)?.to_vec())),
        ParamType::String => {
            let bytes = read_packed_bytes(data, at)?;
            let s = std::str::from_utf8(bytes).map_err(|_| AbiError::InvalidUtf8)?;
            Ok(Token::String(s.to_string()))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            let start = at + WORD;
            let needed = len.checked_mul(WORD).ok_or_else(|| AbiError::InvalidOffset {
                word: format!("{len:x}"),
            })?;
            ensure_available(data, start, needed)?;
            let items = decode_sequence(std::iter::repeat(inner.as_ref()).take(len), data, start)?;
            Ok(Token::Array(items))
        }
        ParamType::Tuple(inner) => Ok(Token::Tuple(decode_sequence(inner.iter(), data, at)?)),
    }
}

fn ensure_available(data: &[u8], offset: usize, needed: usize) -> Result<()> {
    match offset.checked_add(needed) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(AbiError::Truncated {
            offset,
            needed,
            available: data.len().saturating_sub(offset),
        }),
    }
}

fn read_word(data: &[u8], at: usize) -> Result<[u8; WORD]> {
    ensure_available(data, at, WORD)?;
    let mut word = [0u8; WORD];
    word.copy_from_slice(&data[at..at + WORD]);
    Ok(word)
}

fn read_usize(data: &[u8], at: usize) -> Result<usize> {
    let word = read_word(data, at)?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::InvalidOffset {
            word: hex::encode(word),
        });
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(tail)).map_err(|_| AbiError::InvalidOffset {
        word: hex::encode(word),
    })
}

fn read_packed_bytes(data: &[u8], at: usize) -> Result<&[u8]> {
    let len = read_usize(data, at)?;
    let start = at + WORD;
    ensure_available(data, start, len)?;
    Ok(&data[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    #[test]
    fn truncated_input_is_rejected() {
        let err = decode(&[ParamType::Bytes], &[0u8; 16]).unwrap_err();
        assert!(matches!(err, AbiError::Truncated { .. }));
    }

    #[test]
    fn length_past_end_is_rejected() {
        let mut data = encode(&[Token::Bytes(vec![1, 2, 3])]);
        // claim 64 bytes of payload
        data[63] = 64;
        let err = decode(&[ParamType::Bytes], &data).unwrap_err();
        assert!(matches!(err, AbiError::Truncated { .. }));
    }

    #[test]
    fn huge_array_length_is_rejected_without_allocating() {
        let mut data = encode(&[Token::Array(vec![])]);
        data[40..64].copy_from_slice(&[0xff; 24]);
        let err = decode(&[ParamType::array(ParamType::Bytes)], &data).unwrap_err();
        assert!(matches!(
            err,
            AbiError::Truncated { .. } | AbiError::InvalidOffset { .. }
        ));
    }

    #[test]
    fn dirty_address_is_rejected() {
        let mut data = encode(&[Token::Address(Address::repeat_byte(1))]);
        data[0] = 1;
        let err = decode(&[ParamType::Address], &data).unwrap_err();
        assert_eq!(err, AbiError::InvalidValue { kind: "address" });
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let mut data = encode(&[Token::Bool(true)]);
        data[31] = 2;
        assert!(decode(&[ParamType::Bool], &data).is_err());
    }

    #[test]
    fn selector_mismatch_is_reported() {
        let err = decode_call(&Selector([1, 1, 1, 1]), &[], &[2, 2, 2, 2]).unwrap_err();
        assert!(matches!(err, AbiError::SelectorMismatch { .. }));
    }
}
