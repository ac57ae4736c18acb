//! EIP-712 hashing for batched calls, delegation grants and audit
//! metadata.
//!
//! Provides domain-hash and final-digest computation plus a minimal ABI
//! encoder for the static field types these structures use. The
//! verifying contract for batch and grant digests is the chain's vault
//! contract.

use crate::batch::BatchedCall;
use crate::metadata::SwapMetadata;
use alloy_primitives::{keccak256, Address, B256, U256};

/// EIP-712 domain type used across all signed structures.
pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,uint256 chainId,address verifyingContract)";
/// Domain name of the vault's delegated-execution domain.
pub const VAULT_DOMAIN_NAME: &str = "OmniswapVault";
pub const CALL_TYPE: &str = "Call(address to,uint256 value,bytes data)";
pub const BATCHED_CALL_TYPE: &str = "BatchedCall(Call[] calls,bool revertOnFailure,uint256 nonce,uint256 deadline,address executor)Call(address to,uint256 value,bytes data)";
pub const DELEGATION_TYPE: &str = "Delegation(uint256 chainId,address delegate,address authority)";
pub const METADATA_TYPE: &str =
	"SwapMetadata(bytes32 intentId,bytes32[] sourceTxHashes,bytes32 destinationTxHash)";

/// Computes the EIP-712 domain hash for a chain's vault contract.
pub fn vault_domain_hash(chain_id: u64, vault: &Address) -> B256 {
	let domain_type_hash = keccak256(DOMAIN_TYPE.as_bytes());
	let name_hash = keccak256(VAULT_DOMAIN_NAME.as_bytes());
	let mut enc = AbiEncoder::new();
	enc.push_b256(&domain_type_hash);
	enc.push_b256(&name_hash);
	enc.push_u256(U256::from(chain_id));
	enc.push_address(vault);
	keccak256(enc.finish())
}

/// Computes the final digest: keccak256(0x1901 || domainHash || structHash).
pub fn final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Struct hash of a [`BatchedCall`]. The executor slot is the zero
/// address: submission is not restricted to a specific relayer.
pub fn batched_call_struct_hash(batch: &BatchedCall) -> B256 {
	let call_type_hash = keccak256(CALL_TYPE.as_bytes());
	let mut call_hashes = Vec::with_capacity(batch.calls.len() * 32);
	for call in &batch.calls {
		let mut enc = AbiEncoder::new();
		enc.push_b256(&call_type_hash);
		enc.push_address(&call.to);
		enc.push_u256(call.value);
		enc.push_b256(&keccak256(&call.data));
		call_hashes.extend_from_slice(keccak256(enc.finish()).as_slice());
	}

	let mut enc = AbiEncoder::new();
	enc.push_b256(&keccak256(BATCHED_CALL_TYPE.as_bytes()));
	enc.push_b256(&keccak256(call_hashes));
	enc.push_bool(batch.revert_on_failure);
	enc.push_u256(batch.nonce);
	enc.push_u256(batch.deadline);
	enc.push_address(&Address::ZERO);
	keccak256(enc.finish())
}

/// Struct hash of a delegation grant (signature field excluded).
pub fn delegation_struct_hash(grant_chain_id: u64, delegate: &Address, authority: &Address) -> B256 {
	let mut enc = AbiEncoder::new();
	enc.push_b256(&keccak256(DELEGATION_TYPE.as_bytes()));
	enc.push_u256(U256::from(grant_chain_id));
	enc.push_address(delegate);
	enc.push_address(authority);
	keccak256(enc.finish())
}

/// Struct hash of the audit metadata record (signature field excluded).
pub fn metadata_struct_hash(metadata: &SwapMetadata) -> B256 {
	let mut source_hashes = Vec::with_capacity(metadata.source_legs.len() * 32);
	for leg in &metadata.source_legs {
		source_hashes.extend_from_slice(leg.tx_hash.as_slice());
	}
	let dest_hash = metadata
		.destination_leg
		.as_ref()
		.map(|l| l.tx_hash)
		.unwrap_or(B256::ZERO);

	let mut enc = AbiEncoder::new();
	enc.push_b256(&keccak256(METADATA_TYPE.as_bytes()));
	enc.push_b256(&metadata.intent_id);
	enc.push_b256(&keccak256(source_hashes));
	enc.push_b256(&dest_hash);
	keccak256(enc.finish())
}

/// Minimal ABI encoder for static EIP-712 field types.
pub struct AbiEncoder {
	buf: Vec<u8>,
}

impl Default for AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn push_bool(&mut self, v: bool) {
		let mut word = [0u8; 32];
		word[31] = v as u8;
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
