//! Revert data decoding
//!
//! A reverted call returns either nothing, `Error(string)`,
//! `Panic(uint256)` or a custom error declared in the contract's ABI.

use std::fmt;

use edge_primitives::U256;

use super::{decode, Abi, ParamType, Token};

/// Selector of `Error(string)`
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of `Panic(uint256)`
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Why a call reverted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// `revert()` / failed `require` without a message
    Empty,
    /// `revert("msg")` / `require(cond, "msg")`
    Message(String),
    /// Compiler-inserted panic (`assert`, overflow, division by zero, ...)
    Panic(U256),
    /// Custom error from the contract ABI
    Custom {
        /// Error name
        name: String,
        /// Decoded arguments
        args: Vec<Token>,
    },
    /// Data that matches no known shape
    Unknown(Vec<u8>),
}

impl RevertReason {
    /// Decode revert data. `abi` resolves custom errors.
    pub fn decode(data: &[u8], abi: Option<&Abi>) -> Self {
        if data.is_empty() {
            return RevertReason::Empty;
        }
        if data.len() < 4 {
            return RevertReason::Unknown(data.to_vec());
        }

        let (selector, payload) = data.split_at(4);
        if selector == ERROR_SELECTOR {
            if let Ok(tokens) = decode(&[ParamType::String], payload) {
                if let Some(Token::String(msg)) = tokens.into_iter().next() {
                    return RevertReason::Message(msg);
                }
            }
        } else if selector == PANIC_SELECTOR {
            if let Ok(tokens) = decode(&[ParamType::Uint(256)], payload) {
                if let Some(Token::Uint(code)) = tokens.into_iter().next() {
                    return RevertReason::Panic(code);
                }
            }
        } else if let Some(error) = abi.and_then(|abi| abi.error_by_selector(selector)) {
            if let Ok(args) = decode(&error.input_types(), payload) {
                return RevertReason::Custom {
                    name: error.name.clone(),
                    args,
                };
            }
        }

        RevertReason::Unknown(data.to_vec())
    }

    /// Name of the custom error, if any
    pub fn custom_name(&self) -> Option<&str> {
        match self {
            RevertReason::Custom { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Meaning of a Solidity panic code
pub fn panic_description(code: U256) -> &'static str {
    if code > U256::from(0xffu64) {
        return "unknown panic";
    }
    match code.low_u64() {
        0x00 => "generic compiler panic",
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "corrupt storage byte array",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to zero-initialized function",
        _ => "unknown panic",
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertReason::Empty => write!(f, "reverted without reason"),
            RevertReason::Message(msg) => write!(f, "reverted: {:?}", msg),
            RevertReason::Panic(code) => {
                write!(f, "panic 0x{:02x} ({})", code, panic_description(*code))
            }
            RevertReason::Custom { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            RevertReason::Unknown(data) => {
                write!(f, "unrecognised revert data 0x{}", hex::encode(data))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode, function_selector};

    fn with_selector(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
        let mut data = selector.to_vec();
        data.extend(encode(tokens));
        data
    }

    fn errors_abi() -> Abi {
        Abi::from_json(
            r#"[{"type":"error","name":"InsufficientBalance","inputs":[
                {"name":"available","type":"uint256"},
                {"name":"required","type":"uint256"}]}]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_builtin_selectors() {
        assert_eq!(function_selector("Error(string)"), ERROR_SELECTOR);
        assert_eq!(function_selector("Panic(uint256)"), PANIC_SELECTOR);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(RevertReason::decode(&[], None), RevertReason::Empty);
    }

    #[test]
    fn test_decode_message() {
        let data = with_selector(ERROR_SELECTOR, &[Token::string("revertWithMessage")]);
        let reason = RevertReason::decode(&data, None);
        assert_eq!(reason, RevertReason::Message("revertWithMessage".to_string()));
        assert_eq!(reason.to_string(), "reverted: \"revertWithMessage\"");
    }

    #[test]
    fn test_decode_panic() {
        let data = with_selector(PANIC_SELECTOR, &[Token::uint(0x12u64)]);
        let reason = RevertReason::decode(&data, None);
        assert_eq!(reason, RevertReason::Panic(U256::from(0x12)));
        assert_eq!(reason.to_string(), "panic 0x12 (division or modulo by zero)");
    }

    #[test]
    fn test_decode_custom_error() {
        let selector = function_selector("InsufficientBalance(uint256,uint256)");
        let data = with_selector(selector, &[Token::uint(1u64), Token::uint(100u64)]);

        let reason = RevertReason::decode(&data, Some(&errors_abi()));
        assert_eq!(reason.custom_name(), Some("InsufficientBalance"));
        assert_eq!(reason.to_string(), "InsufficientBalance(1, 100)");

        // Without the ABI the selector means nothing.
        assert!(matches!(
            RevertReason::decode(&data, None),
            RevertReason::Unknown(_)
        ));
    }

    #[test]
    fn test_decode_garbage() {
        assert_eq!(
            RevertReason::decode(&[0x01, 0x02], None),
            RevertReason::Unknown(vec![0x01, 0x02])
        );
        // Right selector, truncated payload.
        assert!(matches!(
            RevertReason::decode(&ERROR_SELECTOR, None),
            RevertReason::Unknown(_)
        ));
    }

    #[test]
    fn test_panic_descriptions() {
        assert_eq!(panic_description(U256::from(1)), "assertion failed");
        assert_eq!(panic_description(U256::from(0x99)), "unknown panic");
        assert_eq!(panic_description(U256::MAX), "unknown panic");
    }
}
