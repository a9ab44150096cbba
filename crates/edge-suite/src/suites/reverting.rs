//! Reverts caught inside an internal call

use async_trait::async_trait;
use edge_sdk::abi::Token;
use edge_sdk::Contract;

use super::deployed;
use crate::{Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const CALLER: &str = "contracts/InternalCaller.sol:InternalCaller";
const CALLEE: &str = "contracts/InternalCallee.sol:InternalCallee";

/// `InternalCaller` / `InternalCallee` scenarios
#[derive(Default)]
pub struct Reverting {
    caller: Option<Contract>,
    callee: Option<Contract>,
}

#[async_trait]
impl Suite for Reverting {
    fn id(&self) -> &'static str {
        "reverting"
    }

    fn title(&self) -> &'static str {
        "Internal calls to reverting contracts"
    }

    fn cases(&self) -> Vec<Case> {
        vec![Case::new(
            "revert-without-reason",
            "EOA calls InternalCaller which calls a callee reverting without reason",
        )]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        let gas = Overrides::new().gas_limit(5_000_000);
        let caller = harness.deploy(CALLER, &[], gas.clone()).await?;
        let callee = harness.deploy(CALLEE, &[], gas).await?;
        self.caller = Some(caller.expect_deployed()?.clone());
        self.callee = Some(callee.expect_deployed()?.clone());
        harness.settle().await;
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let caller = deployed(&self.caller, "InternalCaller")?;
        let callee = deployed(&self.callee, "InternalCallee")?;

        match case {
            "revert-without-reason" => {
                harness
                    .send(
                        caller,
                        "callRevertWithoutRevertReason",
                        &[Token::Address(*callee.address())],
                        Overrides::new(),
                    )
                    .await?
                    .expect_success()?;
            }
            other => return Err(SuiteError::unknown_case(other)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::mock_node::{function, MockNode};
    use edge_primitives::Address;

    #[tokio::test]
    async fn test_caught_revert_mines() {
        let caller = vec![function("callRevertWithoutRevertReason", &["address"], &[])];
        let node = MockNode::new(&[(CALLER, caller), (CALLEE, vec![])]).await;
        let callee = Address::from_account_num(1002);
        let mut suite = Reverting::default();
        node.mines(true);
        node.deploys_at(callee);
        suite.setup(&node.harness).await.unwrap();

        suite.run_case(&node.harness, "revert-without-reason").await.unwrap();
        let raw = &node.transport.requests_for("eth_sendRawTransaction")[2].params[0];
        assert!(raw
            .as_str()
            .unwrap()
            .contains(&hex::encode(callee.as_bytes())));

        node.mines(false);
        assert!(suite.run_case(&node.harness, "revert-without-reason").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_deploy_stops_setup() {
        let node = MockNode::new(&[(CALLER, vec![]), (CALLEE, vec![])]).await;
        let mut suite = Reverting::default();
        node.mines(true);
        node.mines(false);
        assert!(suite.setup(&node.harness).await.is_err());
        assert!(matches!(
            suite.run_case(&node.harness, "revert-without-reason").await,
            Err(SuiteError::Setup(_))
        ));
    }
}
