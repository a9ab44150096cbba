//! Contract address derivation.
//!
//! A contract's own nonce starts at 1 (EIP-161), so the first child a
//! contract creates lives at `create_address(contract, 1)`.

use crate::keccak256;
use edge_primitives::{Address, H256};
use rlp::RlpStream;

/// `CREATE` address: `keccak(rlp([sender, nonce]))[12..]`.
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(sender);
    stream.append(&nonce);
    let hash = keccak256(&stream.out());
    Address::from_word(hash.as_bytes())
}

/// `CREATE2` address: `keccak(0xff ++ deployer ++ salt ++ init_code_hash)[12..]`.
pub fn create2_address(deployer: &Address, salt: &H256, init_code_hash: &H256) -> Address {
    let mut buf = Vec::with_capacity(1 + 20 + 32 + 32);
    buf.push(0xff);
    buf.extend_from_slice(deployer.as_bytes());
    buf.extend_from_slice(salt.as_bytes());
    buf.extend_from_slice(init_code_hash.as_bytes());
    Address::from_word(keccak256(&buf).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_address_sequence() {
        let sender = Address::from_hex("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0").unwrap();
        let expected = [
            "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d",
            "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8",
            "0xf778b86fa74e846c4f0a1fbd1335fe81c00a0c91",
        ];
        for (nonce, want) in expected.iter().enumerate() {
            assert_eq!(create_address(&sender, nonce as u64).to_hex(), *want);
        }
    }

    #[test]
    fn test_create2_zero_deployer() {
        let init_code_hash = keccak256(&[0x00]);
        assert_eq!(
            create2_address(&Address::ZERO, &H256::ZERO, &init_code_hash).to_hex(),
            "0x4d1a2e2bb4f88f0250f26ffff098b0b30b26bf38"
        );
    }

    #[test]
    fn test_create2_empty_init_code() {
        let init_code_hash = keccak256(&[]);
        assert_eq!(
            create2_address(&Address::ZERO, &H256::ZERO, &init_code_hash).to_hex(),
            "0xe33c0c7f7df4809055c3eba6c09cfe4baf1bd9e0"
        );
    }

    #[test]
    fn test_create2_depends_on_salt() {
        let deployer = Address::from_account_num(1001);
        let code = keccak256(b"code");
        let a = create2_address(&deployer, &H256::ZERO, &code);
        let b = create2_address(&deployer, &H256::from_bytes([1u8; 32]), &code);
        assert_ne!(a, b);
    }
}
