//! ERC-721 approve and transferFrom

use async_trait::async_trait;
use edge_sdk::abi::Token;
use edge_sdk::Contract;

use super::{deployed, observe};
use crate::{Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const TOKEN: &str = "contracts/ERC721Mock.sol:ERC721Mock";

const TOKEN_ID: u64 = 33;

/// `ERC721Mock` scenarios
#[derive(Default)]
pub struct Erc721 {
    token: Option<Contract>,
}

#[async_trait]
impl Suite for Erc721 {
    fn id(&self) -> &'static str {
        "erc721"
    }

    fn title(&self) -> &'static str {
        "ERC721 token"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("approve", "approve(address,uint256)"),
            Case::new("transfer-from", "transferFrom(address,address,uint256)"),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        // Cases move tokens to a second signer.
        harness.signer(1)?;
        let args = [Token::string("TokenName"), Token::string("NFTSym")];
        let token = harness.deploy(TOKEN, &args, Overrides::new()).await?;
        let token = token.expect_deployed()?.clone();

        let owner = *harness.signer(0)?.address();
        harness
            .send(
                &token,
                "mint",
                &[Token::Address(owner), Token::uint(TOKEN_ID)],
                Overrides::new(),
            )
            .await?
            .expect_success()?;

        self.token = Some(token);
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let token = deployed(&self.token, "ERC721Mock")?;
        let owner = *harness.signer(0)?.address();
        let receiver = *harness.signer(1)?.address();

        let outcome = match case {
            "approve" => {
                let args = [Token::Address(receiver), Token::uint(TOKEN_ID)];
                harness.send(token, "approve", &args, Overrides::new()).await?
            }
            "transfer-from" => {
                let args = [
                    Token::Address(owner),
                    Token::Address(receiver),
                    Token::uint(TOKEN_ID),
                ];
                harness.send(token, "transferFrom", &args, Overrides::new()).await?
            }
            other => return Err(SuiteError::unknown_case(other)),
        };
        observe(case, outcome.expect_success()?.transaction_hash);
        Ok(())
    }
}
