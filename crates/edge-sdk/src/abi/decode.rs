//! ABI decoding
//!
//! Offsets of dynamic values are relative to the start of the enclosing
//! tuple, array body or top-level parameter list.

use edge_primitives::{Address, U256};

use super::types::{ParamType, Token, I256};
use crate::SdkError;

/// Decode tokens from ABI-encoded data
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, SdkError> {
    decode_sequence(types, data, 0)
}

fn decode_sequence(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>, SdkError> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut pos = base;

    for param_type in types {
        if param_type.is_dynamic() {
            let offset = read_usize(data, pos)?;
            let at = base
                .checked_add(offset)
                .ok_or_else(|| SdkError::AbiDecode("offset overflow".to_string()))?;
            tokens.push(decode_at(param_type, data, at)?);
            pos += 32;
        } else {
            tokens.push(decode_at(param_type, data, pos)?);
            pos += param_type.head_length();
        }
    }

    Ok(tokens)
}

fn decode_at(param_type: &ParamType, data: &[u8], at: usize) -> Result<Token, SdkError> {
    match param_type {
        ParamType::Address => {
            let w = read_word(data, at)?;
            Ok(Token::Address(Address::from_word(&w)))
        }
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_big_endian(&read_word(data, at)?))),
        ParamType::Int(_) => Ok(Token::Int(I256::from_twos_complement(U256::from_big_endian(
            &read_word(data, at)?,
        )))),
        ParamType::Bool => Ok(Token::Bool(read_word(data, at)?[31] != 0)),
        ParamType::FixedBytes(size) => {
            let w = read_word(data, at)?;
            Ok(Token::FixedBytes(w[..(*size).min(32)].to_vec()))
        }
        ParamType::Bytes => Ok(Token::Bytes(read_bytes(data, at)?)),
        ParamType::String => {
            let bytes = read_bytes(data, at)?;
            String::from_utf8(bytes)
                .map(Token::String)
                .map_err(|e| SdkError::AbiDecode(format!("invalid UTF-8: {}", e)))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            // Every element takes at least one word.
            if len > data.len() / 32 {
                return Err(SdkError::AbiDecode(format!("array length {} too large", len)));
            }
            let types = vec![(**inner).clone(); len];
            decode_sequence(&types, data, at + 32).map(Token::Array)
        }
        ParamType::FixedArray(inner, size) => {
            let types = vec![(**inner).clone(); *size];
            decode_sequence(&types, data, at).map(Token::FixedArray)
        }
        ParamType::Tuple(types) => decode_sequence(types, data, at).map(Token::Tuple),
    }
}

fn read_word(data: &[u8], at: usize) -> Result<[u8; 32], SdkError> {
    check_length(data, at.saturating_add(32))?;
    let mut w = [0u8; 32];
    w.copy_from_slice(&data[at..at + 32]);
    Ok(w)
}

/// Read a word used as an offset or length. It must point inside `data`.
fn read_usize(data: &[u8], at: usize) -> Result<usize, SdkError> {
    let value = U256::from_big_endian(&read_word(data, at)?);
    if value > U256::from(data.len()) {
        return Err(SdkError::AbiDecode(format!(
            "offset or length {} exceeds data size {}",
            value,
            data.len()
        )));
    }
    Ok(value.as_usize())
}

fn read_bytes(data: &[u8], at: usize) -> Result<Vec<u8>, SdkError> {
    let len = read_usize(data, at)?;
    let start = at + 32;
    check_length(data, start + len)?;
    Ok(data[start..start + len].to_vec())
}

fn check_length(data: &[u8], required: usize) -> Result<(), SdkError> {
    if data.len() < required {
        return Err(SdkError::AbiDecode(format!(
            "insufficient data: need {} bytes, have {}",
            required,
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode, encode_params};

    #[test]
    fn test_decode_address_word() {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        let tokens = decode(&[ParamType::Address], &addr.to_word()).unwrap();
        assert_eq!(tokens, vec![Token::Address(addr)]);
    }

    #[test]
    fn test_decode_bool_and_uint() {
        let mut data = [0u8; 64];
        data[31] = 1;
        data[63] = 100;
        let tokens = decode(&[ParamType::Bool, ParamType::Uint(256)], &data).unwrap();
        assert_eq!(tokens, vec![Token::Bool(true), Token::uint(100u64)]);
    }

    #[test]
    fn test_decode_empty_return_fails() {
        // What a call into an account without code returns.
        assert!(matches!(
            decode(&[ParamType::Address], &[]),
            Err(SdkError::AbiDecode(_))
        ));
    }

    #[test]
    fn test_decode_mixed_params() {
        let tokens = vec![
            Token::uint(18u64),
            Token::string("panic"),
            Token::Bytes(vec![1, 2, 3]),
        ];
        let encoded = encode(&tokens);
        let types = [ParamType::Uint(256), ParamType::String, ParamType::Bytes];
        assert_eq!(decode(&types, &encoded).unwrap(), tokens);
    }

    #[test]
    fn test_decode_nested_dynamic_offsets() {
        // Offsets inside the tuple are relative to the tuple, not the payload.
        let types = vec![
            ParamType::Uint(256),
            ParamType::Tuple(vec![
                ParamType::String,
                ParamType::Array(Box::new(ParamType::String)),
            ]),
        ];
        let tokens = vec![
            Token::uint(7u64),
            Token::Tuple(vec![
                Token::string("outer"),
                Token::Array(vec![Token::string("a"), Token::string("bc")]),
            ]),
        ];
        let encoded = encode_params(&types, &tokens).unwrap();
        assert_eq!(decode(&types, &encoded).unwrap(), tokens);
    }

    #[test]
    fn test_decode_static_tuple_inline() {
        let types = vec![
            ParamType::Tuple(vec![ParamType::Address, ParamType::Bool]),
            ParamType::Uint(8),
        ];
        let tokens = vec![
            Token::Tuple(vec![Token::Address(Address::from_account_num(2)), Token::Bool(true)]),
            Token::uint(9u64),
        ];
        let encoded = encode_params(&types, &tokens).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(decode(&types, &encoded).unwrap(), tokens);
    }

    #[test]
    fn test_decode_rejects_bad_offsets() {
        let mut data = vec![0u8; 64];
        data[31] = 0xff;
        assert!(decode(&[ParamType::String], &data).is_err());

        let mut huge = vec![0xffu8; 32];
        huge.extend([0u8; 32]);
        assert!(decode(&[ParamType::Bytes], &huge).is_err());
    }

    #[test]
    fn test_decode_rejects_huge_array_length() {
        let mut data = vec![0u8; 64];
        data[31] = 0x20;
        data[63] = 0x40; // 64 elements claimed, none present
        assert!(decode(&[ParamType::Array(Box::new(ParamType::Uint(256)))], &data).is_err());
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let encoded = encode(&[Token::Bytes(vec![0xff, 0xfe])]);
        assert!(decode(&[ParamType::String], &encoded).is_err());
    }
}
