//! Bit-exact wire codec for the relay submission protocol.
//!
//! One request frame carries every batch of a submission:
//!
//! ```text
//! frame    := u32-BE payload length || payload
//! payload  := u16-BE batch count || batch*
//! batch    := u64-BE chain id || nonce[32] || deadline[32] || sig[65]
//!             || grant flag u8 || grant? || u16-BE call count || call*
//! grant    := u64-BE chain id || delegate[20] || authority[20] || sig[65]
//! call     := to[20] || value[32] || u32-BE data length || data
//! ```
//!
//! The relay streams back one fixed-size reply per submitted batch:
//!
//! ```text
//! reply := u16-BE part index || tx hash[32] || errored u8
//! ```

use crate::SigningError;
use alloy_primitives::{Address, Bytes, B256, U256};
use omniswap_types::{BatchedCall, Call, ChainId, DelegationGrant, SignedBatchedCall};

/// Size of one reply on the wire.
pub const REPLY_LEN: usize = 2 + 32 + 1;

/// One relay reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
	pub part_index: u16,
	pub tx_hash: B256,
	pub errored: bool,
}

/// Encodes a full request frame, length prefix included.
pub fn encode_request(batches: &[SignedBatchedCall]) -> Vec<u8> {
	let mut payload = Vec::new();
	payload.extend_from_slice(&(batches.len() as u16).to_be_bytes());
	for signed in batches {
		encode_batch(&mut payload, signed);
	}

	let mut frame = Vec::with_capacity(4 + payload.len());
	frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
	frame.extend_from_slice(&payload);
	frame
}

fn encode_batch(out: &mut Vec<u8>, signed: &SignedBatchedCall) {
	out.extend_from_slice(&signed.batch.chain.0.to_be_bytes());
	out.extend_from_slice(&signed.batch.nonce.to_be_bytes::<32>());
	out.extend_from_slice(&signed.batch.deadline.to_be_bytes::<32>());
	out.extend_from_slice(&signed.signature);
	match &signed.authorization {
		Some(grant) => {
			out.push(1);
			out.extend_from_slice(&grant.chain.0.to_be_bytes());
			out.extend_from_slice(grant.delegate.as_slice());
			out.extend_from_slice(grant.authority.as_slice());
			out.extend_from_slice(&grant.signature);
		},
		None => out.push(0),
	}
	out.extend_from_slice(&(signed.batch.calls.len() as u16).to_be_bytes());
	for call in &signed.batch.calls {
		out.extend_from_slice(call.to.as_slice());
		out.extend_from_slice(&call.value.to_be_bytes::<32>());
		out.extend_from_slice(&(call.data.len() as u32).to_be_bytes());
		out.extend_from_slice(&call.data);
	}
}

/// Decodes a request payload (the bytes after the length prefix).
///
/// The engine only encodes requests; decoding exists for the test
/// harness standing in for the relay.
pub fn decode_request(payload: &[u8]) -> Result<Vec<SignedBatchedCall>, SigningError> {
	let mut cursor = Cursor::new(payload);
	let count = cursor.u16()?;
	let mut batches = Vec::with_capacity(count as usize);
	for _ in 0..count {
		batches.push(decode_batch(&mut cursor)?);
	}
	cursor.finish()?;
	Ok(batches)
}

fn decode_batch(cursor: &mut Cursor<'_>) -> Result<SignedBatchedCall, SigningError> {
	let chain = ChainId(cursor.u64()?);
	let nonce = U256::from_be_slice(cursor.take(32)?);
	let deadline = U256::from_be_slice(cursor.take(32)?);
	let signature = Bytes::copy_from_slice(cursor.take(65)?);
	let authorization = match cursor.u8()? {
		0 => None,
		1 => Some(DelegationGrant {
			chain: ChainId(cursor.u64()?),
			delegate: Address::from_slice(cursor.take(20)?),
			authority: Address::from_slice(cursor.take(20)?),
			signature: Bytes::copy_from_slice(cursor.take(65)?),
		}),
		other => {
			return Err(SigningError::Wire(format!(
				"invalid grant flag {}",
				other
			)))
		},
	};
	let call_count = cursor.u16()?;
	let mut calls = Vec::with_capacity(call_count as usize);
	for _ in 0..call_count {
		let to = Address::from_slice(cursor.take(20)?);
		let value = U256::from_be_slice(cursor.take(32)?);
		let data_len = cursor.u32()? as usize;
		let data = Bytes::copy_from_slice(cursor.take(data_len)?);
		calls.push(Call { to, value, data });
	}

	let mut batch = BatchedCall::new(chain, calls, nonce);
	batch.deadline = deadline;
	Ok(SignedBatchedCall {
		batch,
		signature,
		authorization,
	})
}

/// Encodes one reply.
pub fn encode_reply(reply: &RelayReply) -> [u8; REPLY_LEN] {
	let mut out = [0u8; REPLY_LEN];
	out[0..2].copy_from_slice(&reply.part_index.to_be_bytes());
	out[2..34].copy_from_slice(reply.tx_hash.as_slice());
	out[34] = reply.errored as u8;
	out
}

/// Decodes one reply.
pub fn decode_reply(buf: &[u8; REPLY_LEN]) -> RelayReply {
	RelayReply {
		part_index: u16::from_be_bytes([buf[0], buf[1]]),
		tx_hash: B256::from_slice(&buf[2..34]),
		errored: buf[34] != 0,
	}
}

/// Minimal bounds-checked byte cursor.
struct Cursor<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	fn take(&mut self, n: usize) -> Result<&'a [u8], SigningError> {
		if self.pos + n > self.buf.len() {
			return Err(SigningError::Wire(format!(
				"truncated frame: wanted {} bytes at offset {}",
				n, self.pos
			)));
		}
		let slice = &self.buf[self.pos..self.pos + n];
		self.pos += n;
		Ok(slice)
	}

	fn u8(&mut self) -> Result<u8, SigningError> {
		Ok(self.take(1)?[0])
	}

	fn u16(&mut self) -> Result<u16, SigningError> {
		let b = self.take(2)?;
		Ok(u16::from_be_bytes([b[0], b[1]]))
	}

	fn u32(&mut self) -> Result<u32, SigningError> {
		let b = self.take(4)?;
		Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
	}

	fn u64(&mut self) -> Result<u64, SigningError> {
		let b = self.take(8)?;
		let mut word = [0u8; 8];
		word.copy_from_slice(b);
		Ok(u64::from_be_bytes(word))
	}

	fn finish(self) -> Result<(), SigningError> {
		if self.pos != self.buf.len() {
			return Err(SigningError::Wire(format!(
				"{} trailing bytes after frame",
				self.buf.len() - self.pos
			)));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn signed(with_grant: bool) -> SignedBatchedCall {
		let batch = BatchedCall::new(
			ChainId(10),
			vec![Call {
				to: address!("00000000000000000000000000000000000000dd"),
				value: U256::from(7),
				data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
			}],
			U256::from(42),
		);
		SignedBatchedCall {
			batch,
			signature: Bytes::from(vec![0x11; 65]),
			authorization: with_grant.then(|| DelegationGrant {
				chain: ChainId(10),
				delegate: address!("00000000000000000000000000000000000000aa"),
				authority: address!("00000000000000000000000000000000000000ee"),
				signature: Bytes::from(vec![0x22; 65]),
			}),
		}
	}

	#[test]
	fn request_round_trips() {
		for with_grant in [false, true] {
			let batches = vec![signed(with_grant), signed(false)];
			let frame = encode_request(&batches);
			let len = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
			assert_eq!(len, frame.len() - 4);
			let decoded = decode_request(&frame[4..]).unwrap();
			assert_eq!(decoded, batches);
		}
	}

	#[test]
	fn reply_round_trips() {
		let reply = RelayReply {
			part_index: 3,
			tx_hash: B256::repeat_byte(0xab),
			errored: true,
		};
		assert_eq!(decode_reply(&encode_reply(&reply)), reply);
	}

	#[test]
	fn truncated_frame_is_rejected() {
		let frame = encode_request(&[signed(true)]);
		let payload = &frame[4..];
		assert!(decode_request(&payload[..payload.len() - 1]).is_err());
	}

	#[test]
	fn trailing_bytes_are_rejected() {
		let frame = encode_request(&[signed(false)]);
		let mut payload = frame[4..].to_vec();
		payload.push(0);
		assert!(decode_request(&payload).is_err());
	}
}
