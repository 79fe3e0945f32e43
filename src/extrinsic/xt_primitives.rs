/*
   Copyright 2024 Supercomputing Systems AG
   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at
	   http://www.apache.org/licenses/LICENSE-2.0
   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

use codec::{Compact, Decode, Encode, Error as CodecError, Input};
use core::fmt;
use sp_core::H256;
use sp_crypto_hashing::blake2_256;
use sp_runtime::{generic::Era, AccountId32, MultiAddress, MultiSignature};

/// Pallet index plus call index, the first two encoded bytes of any call.
pub type CallIndex = [u8; 2];

pub type GenericAddress = MultiAddress<AccountId32, ()>;

const V4: u8 = 4;

/// Simple generic extra mirroring the SignedExtra currently used in
/// extrinsics. It does not implement the SignedExtension trait, it simply
/// encodes to the same bytes as the real SignedExtra. The order is
/// (CheckEra, CheckNonce, ChargeTransactionPayment); fields that are merely
/// PhantomData are not encoded and are therefore omitted here.
#[derive(Debug, Clone, Eq, PartialEq, Encode, Decode)]
pub struct GenericExtra(pub Era, pub Compact<u32>, pub Compact<u128>);

impl GenericExtra {
	pub fn new(era: Era, nonce: u32, tip: u128) -> Self {
		Self(era, Compact(nonce), Compact(tip))
	}

	pub fn immortal_with_tip(nonce: u32, tip: u128) -> Self {
		Self::new(Era::Immortal, nonce, tip)
	}

	pub fn nonce(&self) -> u32 {
		self.1 .0
	}

	pub fn tip(&self) -> u128 {
		self.2 .0
	}
}

/// additionalSigned fields of the respective SignedExtra fields, in declared
/// order: spec version, transaction version, genesis hash, era anchor hash.
pub type AdditionalSigned = (u32, u32, H256, H256);

#[derive(Encode, Clone)]
pub struct SignedPayload<Call>((Call, GenericExtra, AdditionalSigned));

impl<Call> SignedPayload<Call>
where
	Call: Encode,
{
	pub fn from_raw(call: Call, extra: GenericExtra, additional_signed: AdditionalSigned) -> Self {
		Self((call, extra, additional_signed))
	}

	/// Get an encoded version of this payload.
	///
	/// Payloads longer than 256 bytes are going to be `blake2_256`-hashed.
	pub fn using_encoded<R, F: FnOnce(&[u8]) -> R>(&self, f: F) -> R {
		self.0.using_encoded(|payload| {
			if payload.len() > 256 {
				f(&blake2_256(payload)[..])
			} else {
				f(payload)
			}
		})
	}
}

/// Mirrors the currently used UncheckedExtrinsic format (V4) from substrate.
/// Has less traits and methods though; the SignedExtra used does not need to
/// implement the SignedExtension trait.
#[derive(Clone, Eq, PartialEq)]
pub struct UncheckedExtrinsicV4<Call> {
	pub signature: Option<(GenericAddress, MultiSignature, GenericExtra)>,
	pub function: Call,
}

impl<Call> UncheckedExtrinsicV4<Call>
where
	Call: Encode,
{
	pub fn new_signed(
		function: Call,
		signed: GenericAddress,
		signature: MultiSignature,
		extra: GenericExtra,
	) -> Self {
		Self { signature: Some((signed, signature, extra)), function }
	}

	pub fn new_unsigned(function: Call) -> Self {
		Self { signature: None, function }
	}

	pub fn hex_encode(&self) -> String {
		let mut hex_str = hex::encode(self.encode());
		hex_str.insert_str(0, "0x");
		hex_str
	}
}

impl<Call> fmt::Debug for UncheckedExtrinsicV4<Call>
where
	Call: fmt::Debug + Encode,
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"UncheckedExtrinsic({:?}, {:?})",
			self.signature.as_ref().map(|x| (&x.0, &x.2)),
			self.function
		)
	}
}

// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/primitives/runtime/src/generic/unchecked_extrinsic.rs
impl<Call> Encode for UncheckedExtrinsicV4<Call>
where
	Call: Encode,
{
	fn encode(&self) -> Vec<u8> {
		encode_with_vec_prefix::<Self, _>(|v| {
			match self.signature.as_ref() {
				Some(s) => {
					v.push(V4 | 0b1000_0000);
					s.encode_to(v);
				},
				None => {
					v.push(V4 & 0b0111_1111);
				},
			}
			self.function.encode_to(v);
		})
	}
}

impl<Call> Decode for UncheckedExtrinsicV4<Call>
where
	Call: Decode,
{
	fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
		// The binary format is compatible with substrate's generic `Vec<u8>`
		// type, so there is a length prefix to skip first.
		let _length_do_not_remove_me_see_above: Compact<u32> = Decode::decode(input)?;

		let version = input.read_byte()?;

		let is_signed = version & 0b1000_0000 != 0;
		let version = version & 0b0111_1111;
		if version != V4 {
			return Err("Invalid transaction version".into())
		}

		Ok(Self {
			signature: if is_signed { Some(Decode::decode(input)?) } else { None },
			function: Decode::decode(input)?,
		})
	}
}

/// Raw, still-encoded call whose concrete type is not statically known.
/// Encodes transparently, i.e. without a length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueCall(pub Vec<u8>);

impl OpaqueCall {
	/// The leading pallet and call index, if the blob is long enough.
	pub fn call_index(&self) -> Option<CallIndex> {
		Some([*self.0.first()?, *self.0.get(1)?])
	}

	/// The encoded call arguments following the call index.
	pub fn args(&self) -> &[u8] {
		self.0.get(2..).unwrap_or_default()
	}
}

impl Encode for OpaqueCall {
	fn size_hint(&self) -> usize {
		self.0.len()
	}

	fn encode_to<T: codec::Output + ?Sized>(&self, dest: &mut T) {
		dest.write(&self.0)
	}
}

impl Decode for OpaqueCall {
	fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
		let mut bytes = Vec::new();
		match input.remaining_len()? {
			Some(len) => {
				bytes.resize(len, 0);
				input.read(&mut bytes)?;
			},
			None =>
				while let Ok(byte) = input.read_byte() {
					bytes.push(byte);
				},
		}
		Ok(Self(bytes))
	}
}

/// Same dance as in substrate: reserve space for the compact length, encode,
/// then splice the actual length in front.
fn encode_with_vec_prefix<T: Encode, F: Fn(&mut Vec<u8>)>(encoder: F) -> Vec<u8> {
	let size = core::mem::size_of::<T>();
	let reserve = match size {
		0..=0b0011_1111 => 1,
		0b0100_0000..=0b0011_1111_1111_1111 => 2,
		_ => 4,
	};
	let mut v = Vec::with_capacity(reserve + size);
	v.resize(reserve, 0);
	encoder(&mut v);

	// need to prefix with the total length to ensure it's binary compatible with
	// Vec<u8>.
	let mut length: Vec<()> = Vec::new();
	length.resize(v.len() - reserve, ());
	length.using_encoded(|s| {
		v.splice(0..reserve, s.iter().cloned());
	});

	v
}

#[cfg(test)]
mod tests {
	use super::*;
	use sp_core::{sr25519, Pair};

	#[test]
	fn unsigned_extrinsic_roundtrips() {
		let xt = UncheckedExtrinsicV4::new_unsigned(([10u8, 0u8], Compact(42u128)));
		let encoded = xt.encode();
		// length prefix, then unsigned version byte
		assert_eq!(encoded[1], 4);
		let decoded =
			UncheckedExtrinsicV4::<(CallIndex, Compact<u128>)>::decode(&mut encoded.as_slice())
				.unwrap();
		assert_eq!(decoded.function, ([10, 0], Compact(42)));
		assert!(decoded.signature.is_none());
	}

	#[test]
	fn signed_extrinsic_decodes_as_opaque_call() {
		let pair = sr25519::Pair::from_string("//Alice", None).unwrap();
		let call = ([10u8, 0u8], Compact(5u128));
		let extra = GenericExtra::immortal_with_tip(7, 99);
		let signature = SignedPayload::from_raw(
			call,
			extra.clone(),
			(1, 1, H256::zero(), H256::zero()),
		)
		.using_encoded(|payload| pair.sign(payload));
		let xt = UncheckedExtrinsicV4::new_signed(
			call,
			GenericAddress::Id(pair.public().into()),
			MultiSignature::Sr25519(signature),
			extra,
		);

		let opaque =
			UncheckedExtrinsicV4::<OpaqueCall>::decode(&mut xt.encode().as_slice()).unwrap();
		assert_eq!(opaque.function.call_index(), Some([10, 0]));
		let amount = Compact::<u128>::decode(&mut opaque.function.args()).unwrap();
		assert_eq!(amount.0, 5);
		let (_, _, extra) = opaque.signature.unwrap();
		assert_eq!(extra.nonce(), 7);
		assert_eq!(extra.tip(), 99);
	}

	#[test]
	fn long_signed_payloads_are_hashed() {
		let call = vec![0u8; 300];
		let payload = SignedPayload::from_raw(
			call,
			GenericExtra::immortal_with_tip(0, 0),
			(1, 1, H256::zero(), H256::zero()),
		);
		payload.using_encoded(|encoded| assert_eq!(encoded.len(), 32));
	}
}
