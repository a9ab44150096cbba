//! Transaction types and their wire encoding.
//!
//! Legacy transactions are signed per EIP-155 and encoded as a bare RLP
//! list. EIP-1559 transactions use the EIP-2718 envelope `0x02 || rlp(..)`.
//! Access lists are always empty.

use bytes::Bytes;
use edge_crypto::{keccak256, recover_address, Signature};
use edge_primitives::{Address, H256};
use primitive_types::U256;
use rlp::{Rlp, RlpStream};

use crate::TypesError;

/// Transaction type identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TxType {
    /// Legacy transaction (pre-EIP-2718)
    #[default]
    Legacy = 0,
    /// EIP-1559 dynamic fee transaction
    DynamicFee = 2,
}

/// Legacy transaction (Type 0)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTx {
    /// Transaction nonce
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer in wei
    pub value: u128,
    /// Input data
    pub data: Bytes,
}

/// EIP-1559 dynamic fee transaction (Type 2)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicFeeTx {
    /// Chain ID
    pub chain_id: u64,
    /// Transaction nonce
    pub nonce: u64,
    /// Max priority fee per gas (tip)
    pub max_priority_fee_per_gas: u128,
    /// Max fee per gas
    pub max_fee_per_gas: u128,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer in wei
    pub value: u128,
    /// Input data
    pub data: Bytes,
}

/// Signature as carried in the transaction.
///
/// For legacy transactions `v` is `chain_id * 2 + 35 + y_parity`; for
/// EIP-1559 it is the bare y parity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxSignature {
    /// v value
    pub v: u64,
    /// R component
    pub r: H256,
    /// S component
    pub s: H256,
}

impl TxSignature {
    /// Create a new signature
    pub fn new(v: u64, r: H256, s: H256) -> Self {
        Self { v, r, s }
    }

    /// EIP-155 signature from a 27/28 recoverable signature.
    pub fn eip155(sig: &Signature, chain_id: u64) -> Self {
        Self {
            v: chain_id * 2 + 35 + u64::from(sig.recovery_id()),
            r: H256::from_bytes(sig.r),
            s: H256::from_bytes(sig.s),
        }
    }

    /// Typed-transaction signature (v = y parity).
    pub fn y_parity(sig: &Signature) -> Self {
        Self {
            v: u64::from(sig.recovery_id()),
            r: H256::from_bytes(sig.r),
            s: H256::from_bytes(sig.s),
        }
    }

    fn recoverable(&self, parity: u8) -> Signature {
        Signature::new(*self.r.as_bytes(), *self.s.as_bytes(), parity + 27)
    }
}

/// Transaction body (unsigned)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionBody {
    /// Legacy transaction
    Legacy(LegacyTx),
    /// EIP-1559 transaction
    DynamicFee(DynamicFeeTx),
}

impl LegacyTx {
    /// EIP-155 signing hash:
    /// `keccak(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))`.
    pub fn signing_hash(&self, chain_id: u64) -> H256 {
        let mut s = RlpStream::new_list(9);
        self.append_fields(&mut s);
        s.append(&chain_id);
        s.append_empty_data();
        s.append_empty_data();
        keccak256(&s.out())
    }

    /// Pre-EIP-155 signing hash (no chain id).
    pub fn unprotected_signing_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(6);
        self.append_fields(&mut s);
        keccak256(&s.out())
    }

    fn append_fields(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&U256::from(self.gas_price));
        s.append(&self.gas_limit);
        append_to(s, self.to.as_ref());
        s.append(&U256::from(self.value));
        s.append(&self.data.to_vec());
    }
}

impl Default for LegacyTx {
    fn default() -> Self {
        Self {
            nonce: 0,
            gas_price: 0,
            gas_limit: 21000,
            to: None,
            value: 0,
            data: Bytes::new(),
        }
    }
}

impl DynamicFeeTx {
    /// EIP-1559 signing hash: `keccak(0x02 || rlp([chainId, nonce, ...]))`.
    pub fn signing_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(9);
        self.append_fields(&mut s);
        let mut buf = vec![TxType::DynamicFee as u8];
        buf.extend_from_slice(&s.out());
        keccak256(&buf)
    }

    fn append_fields(&self, s: &mut RlpStream) {
        s.append(&self.chain_id);
        s.append(&self.nonce);
        s.append(&U256::from(self.max_priority_fee_per_gas));
        s.append(&U256::from(self.max_fee_per_gas));
        s.append(&self.gas_limit);
        append_to(s, self.to.as_ref());
        s.append(&U256::from(self.value));
        s.append(&self.data.to_vec());
        s.begin_list(0);
    }
}

/// Signed transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Transaction body
    pub tx: TransactionBody,
    /// Signature
    pub signature: TxSignature,
}

impl SignedTransaction {
    /// Create a new signed legacy transaction
    pub fn new_legacy(tx: LegacyTx, signature: TxSignature) -> Self {
        Self {
            tx: TransactionBody::Legacy(tx),
            signature,
        }
    }

    /// Create a new signed EIP-1559 transaction
    pub fn new_dynamic_fee(tx: DynamicFeeTx, signature: TxSignature) -> Self {
        Self {
            tx: TransactionBody::DynamicFee(tx),
            signature,
        }
    }

    /// Transaction type
    pub fn tx_type(&self) -> TxType {
        match &self.tx {
            TransactionBody::Legacy(_) => TxType::Legacy,
            TransactionBody::DynamicFee(_) => TxType::DynamicFee,
        }
    }

    /// Get transaction nonce
    pub fn nonce(&self) -> u64 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.nonce,
            TransactionBody::DynamicFee(tx) => tx.nonce,
        }
    }

    /// Get gas limit
    pub fn gas_limit(&self) -> u64 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.gas_limit,
            TransactionBody::DynamicFee(tx) => tx.gas_limit,
        }
    }

    /// Get recipient address
    pub fn to(&self) -> Option<&Address> {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.to.as_ref(),
            TransactionBody::DynamicFee(tx) => tx.to.as_ref(),
        }
    }

    /// Get transfer value
    pub fn value(&self) -> u128 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.value,
            TransactionBody::DynamicFee(tx) => tx.value,
        }
    }

    /// Get input data
    pub fn data(&self) -> &Bytes {
        match &self.tx {
            TransactionBody::Legacy(tx) => &tx.data,
            TransactionBody::DynamicFee(tx) => &tx.data,
        }
    }

    /// Check if this is a contract creation transaction
    pub fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }

    /// Chain id the signature commits to. `None` for pre-EIP-155 legacy
    /// transactions.
    pub fn chain_id(&self) -> Option<u64> {
        match &self.tx {
            TransactionBody::Legacy(_) if self.signature.v >= 35 => {
                Some((self.signature.v - 35) / 2)
            }
            TransactionBody::Legacy(_) => None,
            TransactionBody::DynamicFee(tx) => Some(tx.chain_id),
        }
    }

    /// Network encoding, as passed to `eth_sendRawTransaction`.
    pub fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(if self.is_legacy() { 9 } else { 12 });
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.append_fields(&mut s),
            TransactionBody::DynamicFee(tx) => tx.append_fields(&mut s),
        }
        s.append(&self.signature.v);
        s.append(&U256::from_big_endian(self.signature.r.as_bytes()));
        s.append(&U256::from_big_endian(self.signature.s.as_bytes()));

        match self.tx_type() {
            TxType::Legacy => s.out().to_vec(),
            typed => {
                let mut buf = vec![typed as u8];
                buf.extend_from_slice(&s.out());
                buf
            }
        }
    }

    /// Transaction hash: keccak of the network encoding.
    pub fn hash(&self) -> H256 {
        keccak256(&self.encode())
    }

    /// Recover the signer from the signature.
    pub fn recover_sender(&self) -> Result<Address, TypesError> {
        let (hash, parity) = match &self.tx {
            TransactionBody::Legacy(tx) => match self.chain_id() {
                Some(chain_id) => (tx.signing_hash(chain_id), (self.signature.v - 35) % 2),
                None => (
                    tx.unprotected_signing_hash(),
                    self.signature.v.checked_sub(27).ok_or_else(|| {
                        TypesError::InvalidSignature(format!("v = {}", self.signature.v))
                    })?,
                ),
            },
            TransactionBody::DynamicFee(tx) => (tx.signing_hash(), self.signature.v),
        };
        if parity > 1 {
            return Err(TypesError::InvalidSignature(format!(
                "v = {}",
                self.signature.v
            )));
        }
        Ok(recover_address(&hash, &self.signature.recoverable(parity as u8))?)
    }

    /// Decode a network-encoded transaction.
    pub fn decode(raw: &[u8]) -> Result<Self, TypesError> {
        match raw.first() {
            None => Err(TypesError::Rlp("empty input".to_string())),
            Some(b) if *b >= 0xc0 => decode_legacy(&Rlp::new(raw)),
            Some(b) if *b == TxType::DynamicFee as u8 => decode_dynamic_fee(&Rlp::new(&raw[1..])),
            Some(b) => Err(TypesError::UnsupportedType(*b)),
        }
    }

    fn is_legacy(&self) -> bool {
        self.tx_type() == TxType::Legacy
    }
}

fn append_to(s: &mut RlpStream, to: Option<&Address>) {
    match to {
        Some(addr) => {
            s.append(addr);
        }
        None => {
            s.append_empty_data();
        }
    }
}

fn u128_at(rlp: &Rlp, index: usize, field: &'static str) -> Result<u128, TypesError> {
    let value: U256 = rlp.val_at(index)?;
    if value > U256::from(u128::MAX) {
        return Err(TypesError::OutOfRange(field));
    }
    Ok(value.as_u128())
}

fn to_at(rlp: &Rlp, index: usize) -> Result<Option<Address>, TypesError> {
    let item = rlp.at(index)?;
    if item.is_empty() {
        Ok(None)
    } else {
        Ok(Some(item.as_val()?))
    }
}

fn signature_at(rlp: &Rlp, index: usize) -> Result<TxSignature, TypesError> {
    let word = |i: usize| -> Result<H256, TypesError> {
        let value: U256 = rlp.val_at(i)?;
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        Ok(H256::from_bytes(bytes))
    };
    Ok(TxSignature::new(
        rlp.val_at(index)?,
        word(index + 1)?,
        word(index + 2)?,
    ))
}

fn decode_legacy(rlp: &Rlp) -> Result<SignedTransaction, TypesError> {
    if rlp.item_count()? != 9 {
        return Err(TypesError::Rlp("legacy transaction must have 9 fields".to_string()));
    }
    let tx = LegacyTx {
        nonce: rlp.val_at(0)?,
        gas_price: u128_at(rlp, 1, "gas_price")?,
        gas_limit: rlp.val_at(2)?,
        to: to_at(rlp, 3)?,
        value: u128_at(rlp, 4, "value")?,
        data: Bytes::from(rlp.val_at::<Vec<u8>>(5)?),
    };
    Ok(SignedTransaction::new_legacy(tx, signature_at(rlp, 6)?))
}

fn decode_dynamic_fee(rlp: &Rlp) -> Result<SignedTransaction, TypesError> {
    if rlp.item_count()? != 12 {
        return Err(TypesError::Rlp("EIP-1559 transaction must have 12 fields".to_string()));
    }
    let tx = DynamicFeeTx {
        chain_id: rlp.val_at(0)?,
        nonce: rlp.val_at(1)?,
        max_priority_fee_per_gas: u128_at(rlp, 2, "max_priority_fee_per_gas")?,
        max_fee_per_gas: u128_at(rlp, 3, "max_fee_per_gas")?,
        gas_limit: rlp.val_at(4)?,
        to: to_at(rlp, 5)?,
        value: u128_at(rlp, 6, "value")?,
        data: Bytes::from(rlp.val_at::<Vec<u8>>(7)?),
    };
    Ok(SignedTransaction::new_dynamic_fee(tx, signature_at(rlp, 9)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_crypto::sign;
    use k256::ecdsa::SigningKey;

    // EIP-155 example transaction.
    fn eip155_example() -> LegacyTx {
        LegacyTx {
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21000,
            to: Some(Address::from_hex("0x3535353535353535353535353535353535353535").unwrap()),
            value: 1_000_000_000_000_000_000,
            data: Bytes::new(),
        }
    }

    const EIP155_SIGNED: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

    fn key() -> SigningKey {
        SigningKey::from_slice(&[0x46u8; 32]).unwrap()
    }

    #[test]
    fn test_tx_type_values() {
        assert_eq!(TxType::default(), TxType::Legacy);
        assert_eq!(TxType::DynamicFee as u8, 2);
    }

    #[test]
    fn test_eip155_signing_hash() {
        assert_eq!(
            eip155_example().signing_hash(1).to_hex(),
            "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_eip155_decode_and_recover() {
        let raw = hex::decode(EIP155_SIGNED).unwrap();
        let tx = SignedTransaction::decode(&raw).unwrap();

        assert_eq!(tx.tx, TransactionBody::Legacy(eip155_example()));
        assert_eq!(tx.signature.v, 37);
        assert_eq!(tx.chain_id(), Some(1));
        assert_eq!(
            tx.recover_sender().unwrap().to_hex(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
        assert_eq!(tx.encode(), raw);
        assert_eq!(
            tx.hash().to_hex(),
            "0x33469b22e9f636356c4160a87eb19df52b7412e8eac32a4a55ffe88ea8350788"
        );
    }

    #[test]
    fn test_legacy_sign_recover_hedera_chain() {
        let body = LegacyTx {
            nonce: 0,
            gas_price: 0x1802BA9F400,
            gas_limit: 0x493E0,
            to: None,
            value: 0,
            data: Bytes::from_static(&[0x60, 0x45, 0x80]),
        };
        let sig = sign(&body.signing_hash(298), &key()).unwrap();
        let tx = SignedTransaction::new_legacy(body, TxSignature::eip155(&sig, 298));

        assert!(tx.signature.v == 631 || tx.signature.v == 632);
        assert_eq!(tx.chain_id(), Some(298));
        assert!(tx.is_contract_creation());
        assert_eq!(
            tx.recover_sender().unwrap().to_hex(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
    }

    #[test]
    fn test_dynamic_fee_envelope() {
        let body = DynamicFeeTx {
            chain_id: 1337,
            nonce: 3,
            max_priority_fee_per_gas: 1_000_000_000,
            max_fee_per_gas: 50_000_000_000,
            gas_limit: 100_000,
            to: Some(Address::from_account_num(800)),
            value: 10,
            data: Bytes::from_static(&[0xde, 0xad]),
        };
        let sig = sign(&body.signing_hash(), &key()).unwrap();
        let tx = SignedTransaction::new_dynamic_fee(body, TxSignature::y_parity(&sig));

        let raw = tx.encode();
        assert_eq!(raw[0], 0x02);
        assert!(raw[1] >= 0xc0);

        let decoded = SignedTransaction::decode(&raw).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.chain_id(), Some(1337));
        assert_eq!(
            decoded.recover_sender().unwrap().to_hex(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(matches!(
            SignedTransaction::decode(&[0x01, 0xc0]),
            Err(TypesError::UnsupportedType(0x01))
        ));
        assert!(SignedTransaction::decode(&[]).is_err());
        assert!(SignedTransaction::decode(&[0xc1, 0x80]).is_err());
    }

    #[test]
    fn test_recover_rejects_bad_v() {
        let raw = hex::decode(EIP155_SIGNED).unwrap();
        let mut tx = SignedTransaction::decode(&raw).unwrap();
        tx.signature.v = 5;
        assert!(matches!(
            tx.recover_sender(),
            Err(TypesError::InvalidSignature(_))
        ));
    }
}
