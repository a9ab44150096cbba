//! Calls and transfers to Hedera system accounts `0.0.0`, `0.0.2` and
//! `0.0.800`, from an EOA and from inside a contract

use async_trait::async_trait;
use edge_primitives::Address;
use edge_sdk::abi::Token;
use edge_sdk::Contract;

use super::{deployed, observe, ten_ether, ACCOUNT_800, ACCOUNT_TWO, ACCOUNT_ZERO};
use crate::{Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const CALLER: &str = "contracts/SysAccountsCaller.sol:Caller";

/// Internal calls forward at most this much gas
const INTERNAL_GAS: u64 = 1_000_000;

/// `SysAccountsCaller` scenarios
#[derive(Default)]
pub struct SysAccounts {
    caller: Option<Contract>,
}

fn account(case: &str) -> Option<Address> {
    if case.ends_with("-0") {
        Some(ACCOUNT_ZERO)
    } else if case.ends_with("-2") {
        Some(ACCOUNT_TWO)
    } else if case.ends_with("-800") {
        Some(ACCOUNT_800)
    } else {
        None
    }
}

#[async_trait]
impl Suite for SysAccounts {
    fn id(&self) -> &'static str {
        "sys-accounts"
    }

    fn title(&self) -> &'static str {
        "EVM calls and internal calls to Hedera system accounts"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("transfer-0", "top-level transfer to 0.0.0 fails"),
            Case::new("call-0", "CALL to 0.0.0 reverts"),
            Case::new("call-value-0", "CALL with value to 0.0.0 reverts"),
            Case::new("transfer-2", "top-level transfer to 0.0.2 fails"),
            Case::new("call-2", "CALL to 0.0.2"),
            Case::new("call-value-2", "CALL with value to 0.0.2 reverts"),
            Case::new("transfer-800", "top-level transfer to 0.0.800 succeeds"),
            Case::new("call-800", "CALL to 0.0.800"),
            Case::new("call-value-800", "CALL with value to 0.0.800 reverts"),
            Case::new("internal-call-0", "internal CALL to 0.0.0 mines"),
            Case::new("internal-call-2", "internal CALL to 0.0.2 mines"),
            Case::new("internal-call-800", "internal CALL to 0.0.800 mines"),
            Case::new("internal-call-value-0", "internal CALL with value to 0.0.0 mines"),
            Case::new("internal-call-value-2", "internal CALL with value to 0.0.2 mines"),
            Case::new("internal-call-value-800", "internal CALL with value to 0.0.800 mines"),
            Case::new("internal-transfer-0", "internal transfer to 0.0.0 fails"),
            Case::new("internal-transfer-2", "internal transfer to 0.0.2 fails"),
            Case::new("internal-transfer-800", "internal transfer to 0.0.800 succeeds"),
            Case::new("internal-send-0", "internal send to 0.0.0 mines"),
            Case::new("internal-send-2", "internal send to 0.0.2 mines"),
            Case::new("internal-send-800", "internal send to 0.0.800 mines"),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        let caller = harness
            .deploy(CALLER, &[], Overrides::new().gas_limit(5_000_000))
            .await?;
        self.caller = Some(caller.expect_deployed()?.clone());
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let caller = deployed(&self.caller, "Caller")?;
        let target = account(case).ok_or_else(|| SuiteError::unknown_case(case))?;
        let internal = Overrides::new().gas_limit(INTERNAL_GAS);
        let with_value = internal.clone().value(ten_ether());

        // Kind of interaction, without the account suffix.
        let kind = case.rsplit_once('-').map_or(case, |(kind, _)| kind);
        match kind {
            "transfer" => {
                let outcome = harness.transfer(0, target, ten_ether()).await?;
                if target == ACCOUNT_800 {
                    outcome.expect_success()?;
                } else {
                    outcome.expect_failure()?;
                }
            }
            "call" => {
                let out = harness
                    .static_call(&caller.at(target), "canBeCalled", &[], Overrides::new())
                    .await?;
                if target == ACCOUNT_ZERO {
                    out.expect_revert()?;
                } else {
                    // Either nothing comes back or the precompile answers.
                    observe(case, out.describe());
                }
            }
            "call-value" => {
                harness
                    .static_call(
                        &caller.at(target),
                        "canBeCalled",
                        &[],
                        Overrides::new().value(ten_ether()),
                    )
                    .await?
                    .expect_revert()?;
            }
            "internal-call" => {
                let args = [Token::Address(target)];
                harness
                    .send(caller, "makeCallTo", &args, internal)
                    .await?
                    .expect_success()?;
            }
            "internal-call-value" => {
                let args = [Token::Address(target)];
                harness
                    .send(caller, "makeCallTo", &args, with_value)
                    .await?
                    .expect_success()?;
            }
            "internal-transfer" => {
                let args = [Token::Address(target)];
                let outcome = harness
                    .send(caller, "testTransfer", &args, with_value)
                    .await?;
                if target == ACCOUNT_800 {
                    outcome.expect_success()?;
                } else {
                    outcome.expect_failure()?;
                }
            }
            "internal-send" => {
                let args = [Token::Address(target)];
                harness
                    .send(caller, "testSend", &args, with_value)
                    .await?
                    .expect_success()?;
            }
            _ => return Err(SuiteError::unknown_case(case)),
        }
        Ok(())
    }
}
