//! ERC-20 approve and transfer

use async_trait::async_trait;
use edge_sdk::abi::Token;
use edge_sdk::Contract;

use super::{deployed, observe};
use crate::{Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const TOKEN: &str = "contracts/ERC20Mock.sol:ERC20Mock";

/// `ERC20Mock` scenarios
#[derive(Default)]
pub struct Erc20 {
    token: Option<Contract>,
}

#[async_trait]
impl Suite for Erc20 {
    fn id(&self) -> &'static str {
        "erc20"
    }

    fn title(&self) -> &'static str {
        "ERC20 token"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("approve", "approve(address,uint256)"),
            Case::new("transfer", "transfer(address,uint256)"),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        // Cases move tokens to a second signer.
        harness.signer(1)?;
        let args = [Token::string("Token"), Token::string("SYM")];
        let token = harness.deploy(TOKEN, &args, Overrides::new()).await?;
        let token = token.expect_deployed()?.clone();

        let owner = *harness.signer(0)?.address();
        let mint = harness
            .send(
                &token,
                "mint",
                &[Token::Address(owner), Token::uint(1000u64)],
                Overrides::new().gas_limit(1_000_000),
            )
            .await?;
        observe("mint", mint.expect_submitted()?);

        self.token = Some(token);
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let token = deployed(&self.token, "ERC20Mock")?;
        let spender = *harness.signer(1)?.address();
        let args = [Token::Address(spender), Token::uint(100u64)];

        let function = match case {
            "approve" => "approve",
            "transfer" => "transfer",
            other => return Err(SuiteError::unknown_case(other)),
        };
        harness
            .send(token, function, &args, Overrides::new().gas_limit(1_000_000))
            .await?
            .expect_success()?;
        Ok(())
    }
}
