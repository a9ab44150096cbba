//! Contract handles: an ABI bound to an address

use std::sync::Arc;

use bytes::Bytes;
use edge_primitives::Address;
use edge_types::Log;

use crate::abi::{decode, encode_params, Abi, ParamType, RevertReason, Token};
use crate::SdkError;

/// Contract handle for encoding calls and decoding results
#[derive(Debug, Clone)]
pub struct Contract {
    address: Address,
    abi: Arc<Abi>,
}

/// An event log decoded against the ABI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Event name
    pub name: String,
    /// `(name, value)` in declaration order
    pub params: Vec<(String, Token)>,
}

impl DecodedEvent {
    /// Value of the named parameter
    pub fn param(&self, name: &str) -> Option<&Token> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

impl Contract {
    /// Bind `abi` to `address`
    pub fn new(address: Address, abi: Arc<Abi>) -> Self {
        Self { address, abi }
    }

    /// The same ABI at another address. The target need not implement it.
    pub fn at(&self, address: Address) -> Self {
        Self {
            address,
            abi: Arc::clone(&self.abi),
        }
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The bound ABI
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Encode a call to `function` (name, or full signature for overloads)
    pub fn encode_call(&self, function: &str, args: &[Token]) -> Result<Bytes, SdkError> {
        let f = self.abi.function(function)?;
        let mut data = f.selector().to_vec();
        data.extend(encode_params(&f.input_types(), args)?);
        Ok(Bytes::from(data))
    }

    /// Decode the return data of `function`
    pub fn decode_output(&self, function: &str, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        let f = self.abi.function(function)?;
        decode(&f.output_types(), data)
    }

    /// Decode revert data, resolving custom errors from this ABI
    pub fn decode_error(&self, data: &[u8]) -> RevertReason {
        RevertReason::decode(data, Some(&self.abi))
    }

    /// Decode a log emitted by this contract. Logs from other emitters or
    /// with an unknown topic give `None`.
    pub fn decode_event(&self, log: &Log) -> Option<DecodedEvent> {
        if log.address != self.address {
            return None;
        }
        let event = self.abi.event_by_topic(log.topic0()?)?;

        let data_types: Vec<ParamType> = event
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        let mut data_values = decode(&data_types, &log.data).ok()?.into_iter();
        let mut topics = log.topics.iter().skip(1);

        let mut params = Vec::with_capacity(event.inputs.len());
        for input in &event.inputs {
            let value = if input.indexed {
                let topic = topics.next()?;
                if input.kind.is_dynamic() {
                    // Indexed dynamic values are stored as their hash.
                    Token::FixedBytes(topic.as_bytes().to_vec())
                } else {
                    decode(std::slice::from_ref(&input.kind), topic.as_bytes())
                        .ok()?
                        .into_iter()
                        .next()?
                }
            } else {
                data_values.next()?
            };
            params.push((input.name.clone(), value));
        }

        Some(DecodedEvent {
            name: event.name.clone(),
            params,
        })
    }

    /// Decode every log in `logs` that this contract can decode
    pub fn decode_events<'a>(&'a self, logs: &'a [Log]) -> impl Iterator<Item = DecodedEvent> + 'a {
        logs.iter().filter_map(move |log| self.decode_event(log))
    }
}
