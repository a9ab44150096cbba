//! The conformance suites
//!
//! Each suite deploys what it needs in `setup` and then runs its cases in
//! order against the same on-chain state. Cases that only record what the
//! node did, without an expectation, go through [`observe`].

mod auto_created_nonce;
mod contract_creator;
mod create2_factory;
mod direct_calls;
mod erc20;
mod erc721;
mod errors;
mod low_level_call;
#[cfg(test)]
mod mock_node;
mod reverting;
mod sys_accounts;

pub use auto_created_nonce::AutoCreatedNonce;
pub use contract_creator::ContractCreator;
pub use create2_factory::Create2Factory;
pub use direct_calls::DirectCalls;
pub use erc20::Erc20;
pub use erc721::Erc721;
pub use errors::Errors;
pub use low_level_call::LowLevelCall;
pub use reverting::Reverting;
pub use sys_accounts::SysAccounts;

use std::fmt::Display;

use edge_primitives::{units, Address, U256};
use edge_sdk::Contract;

use crate::{Suite, SuiteError, SuiteResult};

/// Hedera `0.0.0`; does not exist and cannot be created
pub(crate) const ACCOUNT_ZERO: Address = Address::from_account_num(0);
/// Hedera `0.0.2`, a system account; the SHA-256 precompile on Ethereum
pub(crate) const ACCOUNT_TWO: Address = Address::from_account_num(2);
/// Hedera `0.0.800`, exists with `receiverSigRequired = false`
pub(crate) const ACCOUNT_800: Address = Address::from_account_num(800);

/// Every suite in its default run order
pub fn all() -> Vec<Box<dyn Suite>> {
    vec![
        Box::new(LowLevelCall::default()),
        Box::new(SysAccounts::default()),
        Box::new(ContractCreator::default()),
        Box::new(AutoCreatedNonce::default()),
        Box::new(Create2Factory::default()),
        Box::new(Reverting::default()),
        Box::new(Erc20::default()),
        Box::new(Erc721::default()),
        Box::new(DirectCalls::default()),
        Box::new(Errors::default()),
    ]
}

/// Suite by id
pub fn find(id: &str) -> SuiteResult<Box<dyn Suite>> {
    all()
        .into_iter()
        .find(|s| s.id() == id)
        .ok_or_else(|| SuiteError::Unknown {
            kind: "suite",
            id: id.to_string(),
        })
}

/// Record an outcome that carries no expectation
pub(crate) fn observe(what: &str, outcome: impl Display) {
    tracing::info!(observation = what, "{}", outcome);
}

/// Contract deployed during setup
pub(crate) fn deployed<'a>(slot: &'a Option<Contract>, what: &str) -> SuiteResult<&'a Contract> {
    slot.as_ref()
        .ok_or_else(|| SuiteError::Setup(format!("{} was not deployed", what)))
}

/// 10 ether, the amount the scenarios move around
pub(crate) fn ten_ether() -> U256 {
    units::ether(10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_suite_ids_unique() {
        let suites = all();
        let ids: HashSet<_> = suites.iter().map(|s| s.id()).collect();
        assert_eq!(ids.len(), suites.len());
    }

    #[test]
    fn test_case_ids_unique_within_suite() {
        for suite in all() {
            let cases = suite.cases();
            assert!(!cases.is_empty(), "{} has no cases", suite.id());
            let ids: HashSet<_> = cases.iter().map(|c| c.id).collect();
            assert_eq!(ids.len(), cases.len(), "duplicate case in {}", suite.id());
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find("errors").unwrap().id(), "errors");
        assert!(matches!(
            find("nope"),
            Err(SuiteError::Unknown { kind: "suite", .. })
        ));
    }

    #[test]
    fn test_pending_cases() {
        let pending: Vec<_> = all()
            .iter()
            .flat_map(|s| {
                s.cases()
                    .into_iter()
                    .filter(|c| c.pending)
                    .map(|c| format!("{}/{}", s.id(), c.id))
                    .collect::<Vec<_>>()
            })
            .collect();
        assert_eq!(
            pending,
            [
                "low-level-call/is-contract-tx-valid",
                "low-level-call/is-contract-tx-invalid",
                "errors/assert",
                "errors/require",
                "errors/revert",
                "errors/revert-with-message",
                "errors/try-catch-simple-revert",
                "errors/try-catch-message",
                "errors/try-catch-panic",
            ]
        );
    }

    #[test]
    fn test_system_accounts() {
        assert_eq!(ACCOUNT_800.to_hex(), "0x0000000000000000000000000000000000000320");
        assert!(ACCOUNT_ZERO.is_zero());
    }
}
