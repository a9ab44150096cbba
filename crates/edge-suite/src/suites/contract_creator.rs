//! Contract nonces: contracts creating contracts from constructors, from
//! calls and through calls with explicit gas and value.
//!
//! A contract's nonce starts at 1, so the first child of `parent` lives at
//! `create_address(parent, 1)`. Children that failed to deploy leave either
//! no code at their parent's address (the parent reverted too) or a zero
//! address stored where the child's address would be.

use async_trait::async_trait;
use edge_crypto::create_address;
use edge_primitives::{Address, U256};
use edge_sdk::abi::Token;

use super::observe;
use crate::harness::Deployment;
use crate::{
    ensure, ensure_eq, CallOutcome, Case, Harness, Overrides, Suite, SuiteError, SuiteResult,
};

const CONTRACT_CREATOR: &str = "contracts/ContractCreator.sol:ContractCreator";
const DOUBLE_CREATOR: &str = "contracts/ContractCreator.sol:DoubleContractCreator";
const DOUBLE_NESTED_CREATOR: &str = "contracts/ContractCreator.sol:DoubleNestedContractCreator";
const CALLING_CREATOR: &str = "contracts/ContractCreator.sol:DoubleNestedCallingContractCreator";
const WITH_GAS: &str = "contracts/ContractCreator.sol:CallingContractCreatorWithGas";
const WITH_GAS_AND_VALUE: &str =
    "contracts/ContractCreator.sol:CallingContractCreatorWithGasAndValue";
const FIRST_NESTED: &str = "contracts/ContractCreator.sol:FirstNestedContract";
const TRANSFERRING_CREATOR: &str = "contracts/ContractCreator.sol:TransferringContractCreator";
const RECIPIENT: &str = "contracts/ContractCreator.sol:RecipientContract";

/// `returnNestedContractAddress()`
const NESTED_ADDRESS: [u8; 4] = [0xb2, 0x5d, 0xe9, 0xbe];
/// `returnDirectlyCreatedContractAddress()`
const DIRECTLY_CREATED_ADDRESS: [u8; 4] = [0x96, 0x39, 0x3f, 0x54];

/// Contract nonce scenarios. Every case deploys its own contracts.
#[derive(Default)]
pub struct ContractCreator;

fn gas(limit: u64) -> Overrides {
    Overrides::new().gas_limit(limit)
}

async fn deploy(
    harness: &Harness,
    name: &str,
    args: &[Token],
    gas_limit: u64,
) -> SuiteResult<Deployment> {
    harness.deploy(name, args, gas(gas_limit)).await
}

async fn nested_address(harness: &Harness, at: &Address) -> SuiteResult<CallOutcome> {
    harness
        .raw_call(*at, NESTED_ADDRESS.to_vec(), U256::zero())
        .await
}

fn flags(reverting: bool, try_catch: bool) -> [Token; 2] {
    [Token::Bool(reverting), Token::Bool(try_catch)]
}

/// The first child must sit at nonce 1 of its parent
fn ensure_first_child(parent: &Address, child: Address) -> SuiteResult<()> {
    ensure_eq(child, create_address(parent, 1), "first nested contract address")
}

impl ContractCreator {
    async fn calling_creator(
        harness: &Harness,
        gas_limit: u64,
    ) -> SuiteResult<(Deployment, Address)> {
        let deployment = deploy(harness, CALLING_CREATOR, &[], gas_limit).await?;
        deployment.expect_deployed()?;
        harness.settle().await;
        let first = nested_address(harness, deployment.address())
            .await?
            .expect_address()?;
        observe("first nested contract", first);
        Ok((deployment, first))
    }

    async fn first_nested_and_caller(harness: &Harness) -> SuiteResult<(Address, Deployment)> {
        let first = deploy(harness, FIRST_NESTED, &[Token::Bool(false)], 1_000_000).await?;
        first.expect_deployed()?;
        harness.settle().await;
        let caller = deploy(harness, WITH_GAS, &[], 1_000_000).await?;
        caller.expect_deployed()?;
        harness.settle().await;
        Ok((*first.address(), caller))
    }
}

#[async_trait]
impl Suite for ContractCreator {
    fn id(&self) -> &'static str {
        "contract-creator"
    }

    fn title(&self) -> &'static str {
        "Contract nonces scenarios"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("nested-in-constructor", "deploy a nested contract in constructor"),
            Case::new("double-in-constructor", "deploy two nested contracts in constructor"),
            Case::new(
                "double-in-constructor-low-gas",
                "deploy two nested contracts in constructor with 1M gas",
            ),
            Case::new(
                "double-second-reverts-caught",
                "second nested deploy reverts inside try/catch in constructor",
            ),
            Case::new(
                "double-second-reverts-uncaught",
                "second nested deploy reverts without try/catch in constructor",
            ),
            Case::new("double-nested", "nested contract deploys another in its constructor"),
            Case::new(
                "double-nested-uncaught",
                "innermost deploy reverts without try/catch",
            ),
            Case::new("double-nested-caught", "innermost deploy reverts inside try/catch"),
            Case::new(
                "calling-creator",
                "create via call to a contract created in constructor",
            ),
            Case::new(
                "calling-creator-uncaught",
                "create a reverting contract via call without try/catch",
            ),
            Case::new(
                "calling-creator-caught",
                "create a reverting contract via call with try/catch",
            ),
            Case::new("direct-creation", "create another nested contract via separate call"),
            Case::new(
                "direct-creation-uncaught",
                "separate call creating a reverting contract without try/catch",
            ),
            Case::new("call-with-gas", "nested call with sufficient gas deploys a contract"),
            Case::new(
                "call-with-insufficient-gas",
                "nested call with too little gas to deploy reverts",
            ),
            Case::new(
                "call-with-value",
                "nested deploy transferring more value than it holds",
            ),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        harness.settle().await;
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        match case {
            "nested-in-constructor" => {
                let creator = deploy(harness, CONTRACT_CREATOR, &[], 5_000_000).await?;
                let parent = *creator.expect_deployed()?.address();
                let child = nested_address(harness, &parent).await?.expect_address()?;
                ensure_first_child(&parent, child)?;
            }
            "double-in-constructor" => {
                let creator =
                    deploy(harness, DOUBLE_CREATOR, &flags(false, false), 5_000_000).await?;
                let contract = creator.expect_deployed()?;
                let parent = *contract.address();
                let first = nested_address(harness, &parent).await?.expect_address()?;
                ensure_first_child(&parent, first)?;

                let second = harness
                    .static_call(
                        contract,
                        "returnSecondNestedContractAddress",
                        &[],
                        Overrides::new(),
                    )
                    .await?
                    .expect_address()?;
                ensure_eq(second, create_address(&parent, 2), "second nested contract address")?;
            }
            "double-in-constructor-low-gas" => {
                let creator =
                    deploy(harness, DOUBLE_CREATOR, &flags(false, false), 1_000_000).await?;
                observe(case, creator.outcome.describe());
            }
            "double-second-reverts-caught" => {
                let creator = deploy(harness, DOUBLE_CREATOR, &flags(true, true), 1_000_000).await?;
                observe(case, creator.outcome.describe());
                let first = nested_address(harness, creator.address()).await?;
                observe("first nested contract", first.describe());
            }
            "double-second-reverts-uncaught" => {
                let creator =
                    deploy(harness, DOUBLE_CREATOR, &flags(true, false), 1_000_000).await?;
                nested_address(harness, creator.address())
                    .await?
                    .expect_empty_return()?;
            }
            "double-nested" => {
                let creator =
                    deploy(harness, DOUBLE_NESTED_CREATOR, &flags(false, false), 8_000_000).await?;
                let parent = *creator.expect_deployed()?.address();
                harness.settle().await;

                let first = nested_address(harness, &parent).await?.expect_address()?;
                ensure_first_child(&parent, first)?;
                let second = nested_address(harness, &first).await?;
                observe("second nested contract", second.describe());
            }
            "double-nested-uncaught" => {
                let creator =
                    deploy(harness, DOUBLE_NESTED_CREATOR, &flags(true, false), 5_000_000).await?;
                nested_address(harness, creator.address())
                    .await?
                    .expect_empty_return()?;
            }
            "double-nested-caught" => {
                let creator =
                    deploy(harness, DOUBLE_NESTED_CREATOR, &flags(true, true), 5_000_000).await?;
                harness.settle().await;

                let first = nested_address(harness, creator.address()).await?.expect_address()?;
                let second = nested_address(harness, &first).await?.expect_address()?;
                ensure_eq(second, Address::ZERO, "second nested contract address")?;
            }
            "calling-creator" => {
                let (creator, first) = Self::calling_creator(harness, 10_000_000).await?;
                harness
                    .send(&creator.contract, "createContract", &flags(false, false), gas(1_000_000))
                    .await?
                    .expect_success()?;
                let second = nested_address(harness, &first).await?;
                observe("second nested contract", second.describe());
            }
            "calling-creator-uncaught" => {
                let (creator, _) = Self::calling_creator(harness, 6_000_000).await?;
                harness
                    .send(&creator.contract, "createContract", &flags(true, false), gas(1_000_000))
                    .await?
                    .expect_failure()?;
            }
            "calling-creator-caught" => {
                let (creator, first) = Self::calling_creator(harness, 6_000_000).await?;
                harness
                    .send(&creator.contract, "createContract", &flags(true, true), gas(1_000_000))
                    .await?
                    .expect_success()?;
                let second = nested_address(harness, &first).await?.expect_address()?;
                ensure_eq(second, Address::ZERO, "second nested contract address")?;
            }
            "direct-creation" | "direct-creation-uncaught" => {
                let reverting = case == "direct-creation-uncaught";
                let (creator, _) = Self::calling_creator(harness, 6_000_000).await?;
                let outcome = harness
                    .send(
                        &creator.contract,
                        "createContractDirectly",
                        &flags(reverting, false),
                        gas(1_000_000),
                    )
                    .await?;
                observe(case, outcome.describe());
                harness.settle().await;

                let second = harness
                    .raw_call(*creator.address(), DIRECTLY_CREATED_ADDRESS.to_vec(), U256::zero())
                    .await?;
                if reverting {
                    ensure_eq(second.expect_address()?, Address::ZERO, "directly created address")?;
                } else {
                    observe("directly created contract", second.describe());
                }
            }
            "call-with-gas" => {
                let (first, caller) = Self::first_nested_and_caller(harness).await?;
                let outcome = harness
                    .send(
                        &caller.contract,
                        "createContractWithCallWithGas",
                        &[Token::Address(first), Token::uint(5_000_000u64)],
                        Overrides::new(),
                    )
                    .await?;
                observe(case, outcome.describe());
                harness.settle().await;

                let child = nested_address(harness, &first).await?.expect_address()?;
                ensure(!child.is_zero(), || {
                    "nested contract was not created with sufficient gas".to_string()
                })?;
            }
            "call-with-insufficient-gas" => {
                let (first, caller) = Self::first_nested_and_caller(harness).await?;
                harness
                    .send(
                        &caller.contract,
                        "createContractWithCallWithGas",
                        &[Token::Address(first), Token::uint(1u64)],
                        Overrides::new(),
                    )
                    .await?
                    .expect_failure()?;
            }
            "call-with-value" => {
                let recipient = deploy_default(harness, RECIPIENT).await?;
                harness.settle().await;
                let transferring = deploy(harness, TRANSFERRING_CREATOR, &[], 1_000_000).await?;
                transferring.expect_deployed()?;
                harness.settle().await;
                let caller = deploy(harness, WITH_GAS_AND_VALUE, &[], 1_000_000).await?;
                caller.expect_deployed()?;
                harness.settle().await;

                let outcome = harness
                    .send(
                        &caller.contract,
                        "createContractWithCallWithGasAndValue",
                        &[
                            Token::Address(*transferring.address()),
                            Token::Address(recipient),
                            Token::uint(1_000_000u64),
                        ],
                        Overrides::new().value(U256::from(1_000u64)),
                    )
                    .await?;
                observe(case, outcome.describe());

                let child = nested_address(harness, transferring.address())
                    .await?
                    .expect_address()?;
                ensure_eq(child, Address::ZERO, "transferring contract child")?;
            }
            other => return Err(SuiteError::unknown_case(other)),
        }
        Ok(())
    }
}

async fn deploy_default(harness: &Harness, name: &str) -> SuiteResult<Address> {
    let deployment = harness.deploy(name, &[], Overrides::new()).await?;
    Ok(*deployment.expect_deployed()?.address())
}
