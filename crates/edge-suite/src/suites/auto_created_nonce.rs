//! Hollow accounts: an address that first receives value gets an account
//! auto-created for it. The fresh key then signs contract creations for
//! both Hedera chains so the raw transactions can be replayed by hand.

use async_trait::async_trait;
use edge_sdk::{SignedTransaction, TxBuilder, Wallet};

use super::{observe, ten_ether};
use crate::{ensure, ensure_eq, Case, Harness, Suite, SuiteError, SuiteResult};

/// Creation code of a small CREATE2 deployer
const INIT_CODE: &str = "604580600e600039806000f350fe7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe03601600081602082378035828234f58015156039578182fd5b8082525050506014600cf3";

const CREATION_GAS: u64 = 0x493E0;

/// Chain id and gas price for each presigned creation
const PRESIGNED: [(u64, u128); 2] = [(298, 0x1802BA9F400), (296, 0x184D3C1BC00)];

/// Auto-created account scenarios
#[derive(Default)]
pub struct AutoCreatedNonce {
    wallet: Option<Wallet>,
}

fn sign_creation(
    wallet: &Wallet,
    chain_id: u64,
    gas_price: u128,
) -> SuiteResult<SignedTransaction> {
    let code = hex::decode(INIT_CODE)
        .map_err(|e| SuiteError::Transaction(format!("bad init code: {}", e)))?;
    Ok(TxBuilder::new(chain_id)
        .nonce(0)
        .gas_limit(CREATION_GAS)
        .gas_price(gas_price)
        .data(code)
        .sign_legacy(wallet)?)
}

#[async_trait]
impl Suite for AutoCreatedNonce {
    fn id(&self) -> &'static str {
        "auto-created-nonce"
    }

    fn title(&self) -> &'static str {
        "Auto-created account nonces"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::new("fund-new-account", "top-level transfer to a fresh random address"),
            Case::new(
                "presign-creation",
                "the new account signs nonce-0 contract creations",
            ),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        let wallet = harness.random_wallet();
        tracing::info!(address = %wallet.address(), "generated wallet");
        self.wallet = Some(wallet);
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| SuiteError::Setup("no wallet generated".to_string()))?;

        match case {
            "fund-new-account" => {
                let hash = *harness
                    .transfer(0, *wallet.address(), ten_ether())
                    .await?
                    .expect_submitted()?;
                observe("auto creation tx", hash);
            }
            "presign-creation" => {
                for (chain_id, gas_price) in PRESIGNED {
                    let tx = sign_creation(wallet, chain_id, gas_price)?;
                    ensure(tx.is_contract_creation(), || {
                        "presigned transaction is not a creation".to_string()
                    })?;
                    ensure_eq(tx.chain_id(), Some(chain_id), "chain id")?;
                    let sender = tx.recover_sender().map_err(edge_sdk::SdkError::from)?;
                    ensure_eq(sender, *wallet.address(), "recovered sender")?;
                    observe(
                        "presigned creation",
                        format!("chain {}: 0x{}", chain_id, hex::encode(tx.encode())),
                    );
                }
            }
            other => return Err(SuiteError::unknown_case(other)),
        }
        Ok(())
    }
}
