//! Contract ABI parsed from compiler JSON output

use edge_primitives::H256;
use serde::Deserialize;

use super::{function_selector, parse_type, ParamType};
use crate::SdkError;

/// A named parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name (may be empty)
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
    /// Indexed (event parameters only)
    pub indexed: bool,
}

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// `pure`
    Pure,
    /// `view`
    View,
    /// Default
    #[default]
    Nonpayable,
    /// `payable`
    Payable,
}

/// A contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Inputs
    pub inputs: Vec<Param>,
    /// Outputs
    pub outputs: Vec<Param>,
    /// Mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// 4-byte selector
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    /// Input types in order
    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Output types in order
    pub fn output_types(&self) -> Vec<ParamType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// `view` or `pure`
    pub fn is_read_only(&self) -> bool {
        matches!(self.state_mutability, StateMutability::View | StateMutability::Pure)
    }
}

/// A contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Parameters, indexed or not
    pub inputs: Vec<Param>,
    /// Anonymous events have no signature topic
    pub anonymous: bool,
}

impl Event {
    /// Canonical signature
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// topic0: keccak of the signature
    pub fn topic(&self) -> H256 {
        edge_crypto::keccak256(self.signature().as_bytes())
    }
}

/// A custom error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiError {
    /// Error name
    pub name: String,
    /// Arguments
    pub inputs: Vec<Param>,
}

impl AbiError {
    /// Canonical signature
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// 4-byte selector
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    /// Argument types in order
    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }
}

/// Everything a contract ABI declares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    /// Constructor inputs (empty when no constructor is declared)
    pub constructor: Vec<Param>,
    /// Whether the constructor is payable
    pub constructor_payable: bool,
    /// Functions, overloads included
    pub functions: Vec<Function>,
    /// Events
    pub events: Vec<Event>,
    /// Custom errors
    pub errors: Vec<AbiError>,
    /// Declares a `fallback`
    pub has_fallback: bool,
    /// Declares a `receive`
    pub has_receive: bool,
}

impl Abi {
    /// Parse a JSON ABI array
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        let items: Vec<RawItem> = serde_json::from_str(json)?;
        Self::from_items(items)
    }

    /// Parse from an already decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, SdkError> {
        let items: Vec<RawItem> = serde_json::from_value(value)?;
        Self::from_items(items)
    }

    fn from_items(items: Vec<RawItem>) -> Result<Self, SdkError> {
        let mut abi = Abi::default();
        for item in items {
            match item.kind.as_str() {
                "function" => abi.functions.push(Function {
                    name: item.name,
                    inputs: params(&item.inputs)?,
                    outputs: params(&item.outputs)?,
                    state_mutability: item.state_mutability,
                }),
                "constructor" => {
                    abi.constructor = params(&item.inputs)?;
                    abi.constructor_payable = item.state_mutability == StateMutability::Payable;
                }
                "event" => abi.events.push(Event {
                    name: item.name,
                    inputs: params(&item.inputs)?,
                    anonymous: item.anonymous,
                }),
                "error" => abi.errors.push(AbiError {
                    name: item.name,
                    inputs: params(&item.inputs)?,
                }),
                "fallback" => abi.has_fallback = true,
                "receive" => abi.has_receive = true,
                other => {
                    return Err(SdkError::Serialization(format!(
                        "unknown ABI item type: {}",
                        other
                    )))
                }
            }
        }
        Ok(abi)
    }

    /// Look a function up by name, or by full signature when `name`
    /// contains `(` (for overloads)
    pub fn function(&self, name: &str) -> Result<&Function, SdkError> {
        let found = if name.contains('(') {
            self.functions.iter().find(|f| f.signature() == name)
        } else {
            self.functions.iter().find(|f| f.name == name)
        };
        found.ok_or_else(|| SdkError::UnknownAbiItem(format!("function {}", name)))
    }

    /// Look an event up by name
    pub fn event(&self, name: &str) -> Result<&Event, SdkError> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| SdkError::UnknownAbiItem(format!("event {}", name)))
    }

    /// Find the event whose topic0 is `topic`
    pub fn event_by_topic(&self, topic: &H256) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| !e.anonymous && &e.topic() == topic)
    }

    /// Find the custom error with this selector
    pub fn error_by_selector(&self, selector: &[u8]) -> Option<&AbiError> {
        self.errors.iter().find(|e| e.selector()[..] == *selector)
    }

    /// Constructor input types
    pub fn constructor_types(&self) -> Vec<ParamType> {
        self.constructor.iter().map(|p| p.kind.clone()).collect()
    }
}

fn signature(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(rename = "type", default = "default_item_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    state_mutability: StateMutability,
    #[serde(default)]
    anonymous: bool,
}

fn default_item_type() -> String {
    "function".to_string()
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<RawParam>,
    #[serde(default)]
    indexed: bool,
}

fn params(raw: &[RawParam]) -> Result<Vec<Param>, SdkError> {
    raw.iter()
        .map(|p| {
            Ok(Param {
                name: p.name.clone(),
                kind: param_type(p)?,
                indexed: p.indexed,
            })
        })
        .collect()
}

/// `tuple`, `tuple[]` and `tuple[2]` take their shape from `components`
fn param_type(p: &RawParam) -> Result<ParamType, SdkError> {
    match p.kind.strip_prefix("tuple") {
        Some(suffix) => {
            let inner: Vec<String> = p
                .components
                .iter()
                .map(|c| param_type(c).map(|t| t.to_string()))
                .collect::<Result<_, _>>()?;
            parse_type(&format!("({}){}", inner.join(","), suffix))
        }
        None => parse_type(&p.kind),
    }
}
