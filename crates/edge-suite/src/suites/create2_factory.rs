//! CREATE2 onto an address that already holds value

use async_trait::async_trait;
use edge_crypto::create2_address;
use edge_primitives::{Address, H256};
use edge_sdk::abi::Token;
use edge_sdk::Contract;

use super::{deployed, observe, ten_ether};
use crate::{ensure, ensure_eq, Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const FACTORY: &str = "contracts/Create2Factory.sol:Create2Factory";
const CHILD: &str = "contracts/Create2Factory.sol:Create2Child";

/// `Create2Factory` scenarios
#[derive(Default)]
pub struct Create2Factory {
    factory: Option<Contract>,
    predicted: Option<Address>,
}

impl Create2Factory {
    fn predicted(&self) -> SuiteResult<Address> {
        self.predicted
            .ok_or_else(|| SuiteError::assertion("deploy address was not predicted"))
    }

    async fn is_contract(&self, harness: &Harness, account: Address) -> SuiteResult<bool> {
        let factory = deployed(&self.factory, "Create2Factory")?;
        harness
            .static_call(factory, "isContract", &[Token::Address(account)], Overrides::new())
            .await?
            .expect_bool()
    }
}

#[async_trait]
impl Suite for Create2Factory {
    fn id(&self) -> &'static str {
        "create2-factory"
    }

    fn title(&self) -> &'static str {
        "CREATE2 deployment on a predictable address"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("predict-address", "getDefaultAddress matches the CREATE2 formula"),
            Case::new("fund-predicted", "top-level transfer to the predicted address"),
            Case::new("deploy-on-funded", "deploy the child onto the funded address"),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        let factory = harness
            .deploy(FACTORY, &[], Overrides::new().gas_limit(5_000_000))
            .await?;
        self.factory = Some(factory.expect_deployed()?.clone());
        harness.settle().await;
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        match case {
            "predict-address" => {
                let factory = deployed(&self.factory, "Create2Factory")?;
                let predicted = harness
                    .static_call(factory, "getDefaultAddress", &[], Overrides::new())
                    .await?
                    .expect_address()?;
                observe("deploy address", predicted);

                let init_code_hash = harness.artifact(CHILD)?.init_code_hash(&[])?;
                let expected = create2_address(factory.address(), &H256::ZERO, &init_code_hash);
                ensure_eq(predicted, expected, "CREATE2 address")?;
                self.predicted = Some(predicted);
            }
            "fund-predicted" => {
                let predicted = self.predicted()?;
                harness
                    .transfer(0, predicted, ten_ether())
                    .await?
                    .expect_submitted()?;
                harness.settle().await;

                let is_contract = self.is_contract(harness, predicted).await?;
                observe("isContract before deploy", is_contract);
                ensure(!is_contract, || format!("{} has code before deploy", predicted))?;
            }
            "deploy-on-funded" => {
                let predicted = self.predicted()?;
                let factory = deployed(&self.factory, "Create2Factory")?;
                let outcome = harness
                    .send(factory, "deploy", &[], Overrides::new())
                    .await?;
                outcome.expect_success()?;

                let is_contract = self.is_contract(harness, predicted).await?;
                observe("isContract after deploy", is_contract);
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

    const FACTORY_AT: Address = Address::from_account_num(1001);

    async fn node() -> (MockNode, Create2Factory) {
        let abi = vec![
            function("getDefaultAddress", &[], &["address"]),
            function("isContract", &["address"], &["bool"]),
            function("deploy", &[], &[]),
        ];
        let node = MockNode::new(&[(FACTORY, abi), (CHILD, vec![])]).await;
        let mut suite = Create2Factory::default();
        node.deploys_at(FACTORY_AT);
        suite.setup(&node.harness).await.unwrap();
        (node, suite)
    }

    fn expected(node: &MockNode) -> Address {
        let hash = node.harness.artifact(CHILD).unwrap().init_code_hash(&[]).unwrap();
        create2_address(&FACTORY_AT, &H256::ZERO, &hash)
    }

    #[tokio::test]
    async fn test_predicted_address_feeds_later_cases() {
        let (node, mut suite) = node().await;
        let predicted = expected(&node);

        node.returns(&[Token::Address(predicted)]);
        suite.run_case(&node.harness, "predict-address").await.unwrap();

        node.returns(&[Token::Bool(false)]);
        suite.run_case(&node.harness, "fund-predicted").await.unwrap();
        let transfer = node.transport.requests_for("eth_sendRawTransaction");
        assert_eq!(transfer.len(), 2);

        node.returns(&[Token::Bool(true)]);
        suite.run_case(&node.harness, "deploy-on-funded").await.unwrap();
        let is_contract = &node.transport.requests_for("eth_call")[2].params[0];
        assert!(is_contract["data"]
            .as_str()
            .unwrap()
            .ends_with(&hex::encode(predicted.as_bytes())));
    }

    #[tokio::test]
    async fn test_wrong_prediction_fails() {
        let (node, mut suite) = node().await;
        node.returns(&[Token::Address(Address::from_account_num(1002))]);
        let err = suite.run_case(&node.harness, "predict-address").await.unwrap_err();
        assert!(err.to_string().contains("CREATE2 address"));

        // Nothing was predicted for the transfer to target.
        assert!(suite.run_case(&node.harness, "fund-predicted").await.is_err());
        assert_eq!(node.submitted(), 1);
    }

    #[tokio::test]
    async fn test_code_before_deploy_fails() {
        let (node, mut suite) = node().await;
        node.returns(&[Token::Address(expected(&node))]);
        suite.run_case(&node.harness, "predict-address").await.unwrap();

        node.returns(&[Token::Bool(true)]);
        assert!(suite.run_case(&node.harness, "fund-predicted").await.is_err());
    }
}
