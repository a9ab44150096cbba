//! ABI encoding

use edge_primitives::U256;

use super::types::{ParamType, Token};
use crate::SdkError;

/// Encode self-describing tokens (types taken from [`Token::type_of`])
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let types: Vec<ParamType> = tokens.iter().map(Token::type_of).collect();
    // Types derived from the tokens always match them.
    encode_params(&types, tokens).unwrap_or_default()
}

/// Encode tokens against declared parameter types
pub fn encode_params(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, SdkError> {
    if types.len() != tokens.len() {
        return Err(SdkError::AbiEncode(format!(
            "expected {} arguments, got {}",
            types.len(),
            tokens.len()
        )));
    }

    let head_size: usize = types.iter().map(ParamType::head_length).sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (param_type, token) in types.iter().zip(tokens) {
        let encoded = encode_token(param_type, token)?;
        if param_type.is_dynamic() {
            head.extend(word(U256::from(head_size + tail.len())));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode function call (selector + params)
pub fn encode_function_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut result = selector.to_vec();
    result.extend(encode(tokens));
    result
}

fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, SdkError> {
    match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => Ok(addr.to_word().to_vec()),
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(SdkError::AbiEncode(format!(
                    "{} does not fit in uint{}",
                    value, bits
                )));
            }
            Ok(word(*value))
        }
        (ParamType::Int(_), Token::Int(value)) => Ok(word(value.to_twos_complement())),
        (ParamType::Bool, Token::Bool(b)) => Ok(word(U256::from(u8::from(*b)))),
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if data.len() > *size {
                return Err(SdkError::AbiEncode(format!(
                    "{} bytes do not fit in bytes{}",
                    data.len(),
                    size
                )));
            }
            let mut buf = [0u8; 32];
            buf[..data.len()].copy_from_slice(data);
            Ok(buf.to_vec())
        }
        (ParamType::Bytes, Token::Bytes(data)) => Ok(encode_bytes(data)),
        (ParamType::String, Token::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (ParamType::Array(inner), Token::Array(tokens)) => {
            let types = vec![(**inner).clone(); tokens.len()];
            let mut result = word(U256::from(tokens.len()));
            result.extend(encode_params(&types, tokens)?);
            Ok(result)
        }
        (ParamType::FixedArray(inner, size), Token::FixedArray(tokens)) => {
            if tokens.len() != *size {
                return Err(SdkError::AbiEncode(format!(
                    "expected {} elements, got {}",
                    size,
                    tokens.len()
                )));
            }
            encode_params(&vec![(**inner).clone(); *size], tokens)
        }
        (ParamType::Tuple(types), Token::Tuple(tokens)) => encode_params(types, tokens),
        (expected, got) => Err(SdkError::AbiEncode(format!(
            "type mismatch: expected {}, got {}",
            expected,
            got.type_of()
        ))),
    }
}

fn word(value: U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = word(U256::from(data.len()));
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);
    result
}

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = edge_crypto::keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Parse a canonical type string such as `uint256`, `bytes32[]` or
/// `(address,uint256)[2]`
pub fn parse_type(s: &str) -> Result<ParamType, SdkError> {
    let s = s.trim();
    let invalid = || SdkError::AbiEncode(format!("invalid type: {}", s));

    if let Some(rest) = s.strip_suffix(']') {
        let open = rest.rfind('[').ok_or_else(invalid)?;
        let inner = parse_type(&rest[..open])?;
        let size = &rest[open + 1..];
        return if size.is_empty() {
            Ok(ParamType::Array(Box::new(inner)))
        } else {
            let n = size.parse().map_err(|_| invalid())?;
            Ok(ParamType::FixedArray(Box::new(inner), n))
        };
    }

    if let Some(body) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        if body.trim().is_empty() {
            return Ok(ParamType::Tuple(vec![]));
        }
        return split_top_level(body)
            .into_iter()
            .map(parse_type)
            .collect::<Result<Vec<_>, _>>()
            .map(ParamType::Tuple);
    }

    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        _ => {}
    }

    let sized = |rest: &str, default: usize, valid: fn(usize) -> bool| -> Result<usize, SdkError> {
        let n = if rest.is_empty() {
            default
        } else {
            rest.parse().map_err(|_| invalid())?
        };
        if valid(n) {
            Ok(n)
        } else {
            Err(invalid())
        }
    };

    if let Some(rest) = s.strip_prefix("uint") {
        return sized(rest, 256, |n| n > 0 && n <= 256 && n % 8 == 0).map(ParamType::Uint);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return sized(rest, 256, |n| n > 0 && n <= 256 && n % 8 == 0).map(ParamType::Int);
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        return sized(rest, 0, |n| n > 0 && n <= 32).map(ParamType::FixedBytes);
    }

    Err(invalid())
}

/// Split `a,(b,c),d[]` on commas that are not inside parentheses
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}
