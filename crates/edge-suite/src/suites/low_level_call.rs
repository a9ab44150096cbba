//! Low-level CALL edge cases: transfers and calls to accounts and
//! contracts that do or do not exist

use async_trait::async_trait;
use edge_primitives::Address;
use edge_sdk::abi::Token;
use edge_sdk::Contract;

use super::{deployed, ten_ether};
use crate::{ensure, ensure_eq, Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const CALLER: &str = "contracts/LowLevelCall.sol:Caller";
const RECEIVER: &str = "contracts/LowLevelCall.sol:LowLevelReceiver";

/// Holds no code on any network the suite runs against
const INVALID: Address = Address::from_bytes([
    0xd9, 0x14, 0x5c, 0xce, 0x52, 0xd3, 0x86, 0xf2, 0x54, 0x91, 0x7e, 0x48, 0x1e, 0xb4, 0x4e, 0x99,
    0x43, 0xf3, 0x91, 0x38,
]);

/// Never received anything
const NON_EXISTENT: Address = Address::from_bytes([
    0x00, 0x04, 0x32, 0x43, 0x24, 0x32, 0x42, 0x34, 0x23, 0x42, 0x34, 0x23, 0x42, 0x34, 0x23, 0x42,
    0x34, 0x23, 0x42, 0x34,
]);

/// `Caller` / `LowLevelReceiver` scenarios
#[derive(Default)]
pub struct LowLevelCall {
    caller: Option<Contract>,
    receiver: Option<Contract>,
}

impl LowLevelCall {
    fn contracts(&self) -> SuiteResult<(&Contract, &Contract)> {
        Ok((
            deployed(&self.caller, "Caller")?,
            deployed(&self.receiver, "LowLevelReceiver")?,
        ))
    }

    async fn view_call_succeeds(&self, harness: &Harness, target: Address) -> SuiteResult<()> {
        let (caller, _) = self.contracts()?;
        let out = harness
            .static_call(caller, "testCallViewCall", &[Token::Address(target)], Overrides::new())
            .await?;
        let tokens = caller.decode_output("testCallViewCall", out.expect_returned()?)?;
        ensure_eq(tokens.first().and_then(Token::as_bool), Some(true), "success")
    }

    async fn is_contract(&self, harness: &Harness, target: Address) -> SuiteResult<bool> {
        let (caller, _) = self.contracts()?;
        harness
            .static_call(caller, "isContract", &[Token::Address(target)], Overrides::new())
            .await?
            .expect_bool()
    }

    async fn is_contract_tx(
        &self,
        harness: &Harness,
        target: Address,
        want: bool,
    ) -> SuiteResult<()> {
        let (caller, _) = self.contracts()?;
        let outcome = harness
            .send(caller, "isContractTx", &[Token::Address(target)], Overrides::new())
            .await?;
        let receipt = outcome.expect_success()?;
        let event = caller
            .decode_events(&receipt.logs)
            .find(|e| e.name == "Response")
            .ok_or_else(|| SuiteError::assertion("no Response event in receipt"))?;
        ensure_eq(
            event.param("success").and_then(Token::as_bool),
            Some(want),
            "Response.success",
        )
    }
}

#[async_trait]
impl Suite for LowLevelCall {
    fn id(&self) -> &'static str {
        "low-level-call"
    }

    fn title(&self) -> &'static str {
        "EVM calls and internal calls edge cases"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("transfer-existing", "top-level transfer to an existing account"),
            Case::new("transfer-non-existing", "top-level transfer to a non-existing account"),
            Case::new("call-non-existing-contract", "top-level CALL to a non-existing contract"),
            Case::new(
                "call-missing-function",
                "top-level CALL to a non-existing function of an existing contract",
            ),
            Case::new("internal-call-existing", "internal CALL to an existing contract"),
            Case::new("internal-call-non-existing", "internal CALL to a non-existing contract"),
            Case::new("view-call-valid", "internal view CALL on a valid receiver"),
            Case::new("view-call-invalid", "internal view CALL on an invalid receiver"),
            Case::new("is-contract-valid", "isContract confirms a contract"),
            Case::new("is-contract-invalid", "isContract rejects an account without code"),
            Case::pending(
                "is-contract-tx-valid",
                "isContractTx emits Response(true) for a contract",
            ),
            Case::pending(
                "is-contract-tx-invalid",
                "isContractTx emits Response(false) for an account without code",
            ),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        let caller = harness.deploy(CALLER, &[], Overrides::new()).await?;
        let receiver = harness.deploy(RECEIVER, &[], Overrides::new()).await?;
        self.caller = Some(caller.expect_deployed()?.clone());
        self.receiver = Some(receiver.expect_deployed()?.clone());
        harness.settle().await;
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let (caller, receiver) = self.contracts()?;
        let receiver_address = *receiver.address();

        match case {
            "transfer-existing" => {
                let operator = *harness.signer(1)?.address();
                harness.transfer(0, operator, ten_ether()).await?.expect_submitted()?;
            }
            "transfer-non-existing" => {
                harness
                    .transfer(0, NON_EXISTENT, ten_ether())
                    .await?
                    .expect_submitted()?;
            }
            "call-non-existing-contract" => {
                let fake = caller.at(INVALID);
                harness
                    .send(
                        &fake,
                        "testCallFoo",
                        &[Token::Address(receiver_address)],
                        Overrides::new().gas_limit(1_000_000),
                    )
                    .await?
                    .expect_success()?;
            }
            "call-missing-function" => {
                // The receiver has no testCallFoo; its fallback takes the call.
                let fake = caller.at(receiver_address);
                harness
                    .send(
                        &fake,
                        "testCallFoo",
                        &[Token::Address(receiver_address)],
                        Overrides::new(),
                    )
                    .await?
                    .expect_success()?;
            }
            "internal-call-existing" => {
                harness
                    .send(
                        caller,
                        "testCallFoo",
                        &[Token::Address(receiver_address)],
                        Overrides::new(),
                    )
                    .await?
                    .expect_success()?;
            }
            "internal-call-non-existing" => {
                harness
                    .send(caller, "testCallFoo", &[Token::Address(INVALID)], Overrides::new())
                    .await?
                    .expect_success()?;
            }
            "view-call-valid" => self.view_call_succeeds(harness, receiver_address).await?,
            "view-call-invalid" => self.view_call_succeeds(harness, INVALID).await?,
            "is-contract-valid" => {
                let result = self.is_contract(harness, receiver_address).await?;
                ensure(result, || "isContract(receiver) returned false".to_string())?;
            }
            "is-contract-invalid" => {
                let result = self.is_contract(harness, INVALID).await?;
                ensure(!result, || format!("isContract({}) returned true", INVALID))?;
            }
            "is-contract-tx-valid" => self.is_contract_tx(harness, receiver_address, true).await?,
            "is-contract-tx-invalid" => self.is_contract_tx(harness, INVALID, false).await?,
            other => return Err(SuiteError::unknown_case(other)),
        }
        Ok(())
    }
}
