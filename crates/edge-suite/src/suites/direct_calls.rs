//! EOA calls straight to addresses without contract code: the zero
//! address, the `0x2` precompile and random accounts with and without
//! balance. Every call mines with status 1.

use async_trait::async_trait;
use edge_primitives::{Address, H256, U256};
use edge_sdk::abi::Token;
use edge_sdk::Contract;

use super::{deployed, observe, ten_ether, ACCOUNT_TWO, ACCOUNT_ZERO};
use crate::{Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const SIMPLE: &str = "contracts/SimpleContract.sol:SimpleContract";

/// Funding for the random account with balance
fn funding() -> U256 {
    U256::from(1u128 << 72)
}

/// `"bytes32"` as a right-padded bytes32
fn bytes32_input() -> Token {
    let mut word = [0u8; 32];
    word[..7].copy_from_slice(b"bytes32");
    Token::bytes32(H256::from_bytes(word))
}

/// Where a case sends its call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Zero,
    Precompile,
    Funded,
    Unfunded,
}

fn parse_case(case: &str) -> Option<(Target, bool)> {
    let (base, with_value) = match case.strip_suffix("-value") {
        Some(base) => (base, true),
        None => (case, false),
    };
    let target = match base {
        "call-0" => Target::Zero,
        "call-2" => Target::Precompile,
        "call-funded" => Target::Funded,
        "call-unfunded" => Target::Unfunded,
        _ => return None,
    };
    Some((target, with_value))
}

/// `SimpleContract` ABI aimed at code-less addresses
#[derive(Default)]
pub struct DirectCalls {
    simple: Option<Contract>,
}

impl DirectCalls {
    async fn address_for(harness: &Harness, target: Target) -> SuiteResult<Address> {
        Ok(match target {
            Target::Zero => ACCOUNT_ZERO,
            Target::Precompile => ACCOUNT_TWO,
            Target::Unfunded => {
                let address = Address::random();
                observe("random account", address);
                address
            }
            Target::Funded => {
                let address = Address::random();
                observe("random account", address);
                let hash = *harness
                    .transfer(0, address, funding())
                    .await?
                    .expect_submitted()?;
                observe("funding tx", hash);
                address
            }
        })
    }
}

#[async_trait]
impl Suite for DirectCalls {
    fn id(&self) -> &'static str {
        "direct-calls"
    }

    fn title(&self) -> &'static str {
        "EOA direct calls scenarios"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("call-0", "CALL to address 0x0"),
            Case::new("call-2", "CALL to address 0x2"),
            Case::new("call-funded", "CALL to an account with balance and no code"),
            Case::new("call-unfunded", "CALL to an account with no balance and no code"),
            Case::new("call-0-value", "CALL with value to address 0x0"),
            Case::new("call-2-value", "CALL with value to address 0x2"),
            Case::new(
                "call-funded-value",
                "CALL with value to an account with balance and no code",
            ),
            Case::new(
                "call-unfunded-value",
                "CALL with value to an account with no balance and no code",
            ),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        self.simple = Some(harness.attach(SIMPLE, ACCOUNT_ZERO)?);
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let (target, with_value) = parse_case(case).ok_or_else(|| SuiteError::unknown_case(case))?;
        let simple = deployed(&self.simple, "SimpleContract")?;
        let contract = simple.at(Self::address_for(harness, target).await?);

        let (function, args) = match target {
            Target::Precompile => ("simpleBytesFunction", vec![bytes32_input()]),
            _ => ("simpleFunction", Vec::new()),
        };
        let value = if with_value { ten_ether() } else { U256::zero() };

        harness
            .send(&contract, function, &args, Overrides::new().value(value))
            .await?
            .expect_success()?;

        // The zero address is read back without value.
        let call_value = if target == Target::Zero { U256::zero() } else { value };
        let out = harness
            .static_call(&contract, function, &args, Overrides::new().value(call_value))
            .await?;
        if target == Target::Precompile {
            observe("static call result", out.describe());
            out.expect_returned()?;
        } else {
            out.expect_empty_return()?;
        }
        Ok(())
    }
}
