//! Solidity error paths: assert, require, revert with and without a
//! reason, custom errors, and try/catch around an external contract

use async_trait::async_trait;
use edge_primitives::U256;
use edge_sdk::abi::{RevertReason, Token};
use edge_sdk::Contract;

use super::deployed;
use crate::{ensure_eq, CallOutcome, Case, Harness, Overrides, Suite, SuiteError, SuiteResult};

const ERRORS: &str = "contracts/Errors.sol:Errors";
const ERRORS_EXTERNAL: &str = "contracts/ErrorsExternal.sol:ErrorsExternal";

const REVERT_MESSAGE: &str = "We unfortunalty need to revert this transaction";

/// Panic code for division by zero
const PANIC_DIVISION_BY_ZERO: u64 = 0x12;

/// `Errors` scenarios
#[derive(Default)]
pub struct Errors {
    errors: Option<Contract>,
}

impl Errors {
    async fn call(
        contract: &Contract,
        harness: &Harness,
        function: &str,
        args: &[Token],
    ) -> SuiteResult<CallOutcome> {
        harness
            .static_call(contract, function, args, Overrides::new())
            .await
    }

    /// Send `function` and check the single `ErrorLog(code, message)` it emits
    async fn expect_error_log(
        contract: &Contract,
        harness: &Harness,
        function: &str,
        args: &[Token],
        code: u64,
        message: &str,
    ) -> SuiteResult<()> {
        let outcome = harness
            .send(contract, function, args, Overrides::new())
            .await?;
        let receipt = outcome.expect_success()?;
        let event = contract
            .decode_events(&receipt.logs)
            .find(|e| e.name == "ErrorLog")
            .ok_or_else(|| SuiteError::assertion("no ErrorLog event in receipt"))?;

        ensure_eq(
            event.param("code").and_then(Token::as_uint),
            Some(U256::from(code)),
            "ErrorLog.code",
        )?;
        ensure_eq(
            event.param("message"),
            Some(&Token::string(message)),
            "ErrorLog.message",
        )
    }
}

#[async_trait]
impl Suite for Errors {
    fn id(&self) -> &'static str {
        "errors"
    }

    fn title(&self) -> &'static str {
        "Solidity errors"
    }

    fn cases(&self) -> Vec<Case> {
        vec![
            Case::pending("assert", "assert passes and fails"),
            Case::pending("require", "require passes and fails"),
            Case::pending("revert", "plain revert"),
            Case::pending("revert-with-message", "revert with a reason string"),
            Case::new("custom-error", "revert with custom error InsufficientBalance"),
            Case::pending("try-catch-simple-revert", "try/catch around a simple revert"),
            Case::pending("try-catch-message", "try/catch around a revert with message"),
            Case::pending("try-catch-panic", "try/catch around a panic"),
        ]
    }

    async fn setup(&mut self, harness: &Harness) -> SuiteResult<()> {
        let gas = Overrides::new().gas_limit(5_000_000);
        let external = harness.deploy(ERRORS_EXTERNAL, &[], gas.clone()).await?;
        let external = *external.expect_deployed()?.address();

        let errors = harness
            .deploy(ERRORS, &[Token::Address(external)], gas)
            .await?;
        self.errors = Some(errors.expect_deployed()?.clone());
        harness.settle().await;
        Ok(())
    }

    async fn run_case(&mut self, harness: &Harness, case: &str) -> SuiteResult<()> {
        let errors = deployed(&self.errors, "Errors")?;

        match case {
            "assert" => {
                let passed = Self::call(errors, harness, "assertCheck", &[Token::Bool(true)])
                    .await?
                    .expect_bool()?;
                ensure_eq(passed, true, "assertCheck(true)")?;
                Self::call(errors, harness, "assertCheck", &[Token::Bool(false)])
                    .await?
                    .expect_panic(1)?;
            }
            "require" => {
                let passed = Self::call(errors, harness, "requireCheck", &[Token::Bool(true)])
                    .await?
                    .expect_bool()?;
                ensure_eq(passed, true, "requireCheck(true)")?;
                Self::call(errors, harness, "requireCheck", &[Token::Bool(false)])
                    .await?
                    .expect_revert()?;
            }
            "revert" => {
                Self::call(errors, harness, "revertCheck", &[])
                    .await?
                    .expect_revert()?;
            }
            "revert-with-message" => {
                let args = [Token::string(REVERT_MESSAGE)];
                Self::call(errors, harness, "revertWithMessageCheck", &args)
                    .await?
                    .expect_revert_message(REVERT_MESSAGE)?;
            }
            "custom-error" => {
                let out = Self::call(errors, harness, "revertWithCustomError", &[]).await?;
                let reason = out.expect_custom_error("InsufficientBalance")?;
                if let RevertReason::Custom { args, .. } = reason {
                    ensure_eq(
                        args.as_slice(),
                        &[Token::uint(1u64), Token::uint(100u64)][..],
                        "InsufficientBalance arguments",
                    )?;
                }
            }
            "try-catch-simple-revert" => {
                Self::expect_error_log(
                    errors,
                    harness,
                    "tryCatchWithSimpleRevert",
                    &[],
                    0,
                    "revertSimple",
                )
                .await?;
            }
            "try-catch-message" => {
                Self::expect_error_log(
                    errors,
                    harness,
                    "tryCatchWithErrorMessageRevert",
                    &[Token::string(REVERT_MESSAGE)],
                    0,
                    REVERT_MESSAGE,
                )
                .await?;
            }
            "try-catch-panic" => {
                Self::expect_error_log(
                    errors,
                    harness,
                    "tryCatchWithPanic",
                    &[],
                    PANIC_DIVISION_BY_ZERO,
                    "panic",
                )
                .await?;
            }
            other => return Err(SuiteError::unknown_case(other)),
        }
        Ok(())
    }
}
