//! ABI encoding.

use crate::token::Token;
use crate::WORD;
use unires_types::Selector;

/// Encodes `tokens` as the components of one tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    encode_tuple(tokens)
}

/// Encodes a call: the selector followed by the encoded arguments.
pub fn encode_call(selector: &Selector, tokens: &[Token]) -> Vec<u8> {
    let mut out = selector.as_bytes().to_vec();
    out.extend(encode_tuple(tokens));
    out
}

fn head_size(token: &Token) -> usize {
    match token {
        Token::Tuple(inner) if !token.is_dynamic() => inner.iter().map(head_size).sum(),
        _ => WORD,
    }
}

fn encode_tuple(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(head_size).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }

    head.extend(tail);
    head
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(address) => {
            let mut word = [0u8; WORD];
            word[WORD - 20..].copy_from_slice(address.as_bytes());
            word.to_vec()
        }
        Token::Bool(value) => {
            let mut word = [0u8; WORD];
            word[WORD - 1] = u8::from(*value);
            word.to_vec()
        }
        Token::Uint(word) => word.to_vec(),
        Token::FixedBytes(bytes) => {
            debug_assert!(bytes.len() <= WORD, "fixed bytes wider than one word");
            let mut word = [0u8; WORD];
            let n = bytes.len().min(WORD);
            word[..n].copy_from_slice(&bytes[..n]);
            word.to_vec()
        }
        Token::Bytes(bytes) => encode_packed_bytes(bytes),
        Token::String(s) => encode_packed_bytes(s.as_bytes()),
        Token::Array(items) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend(encode_tuple(items));
            out
        }
        Token::Tuple(items) => encode_tuple(items),
    }
}

fn encode_packed_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded, 0);
    out
}

pub(crate) fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}
