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

//! Wire types shared between the RPC surface and the SCALE-encoded storage
//! values. Kept structurally identical to their substrate originals.

use crate::Balance;
use codec::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sp_core::{Bytes, H256, U256};

/// Resource cost of executing a transaction, split into computational time
/// and proof size.
// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/primitives/weights/src/weight_v2.rs
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
	/// The weight of computational time used based on some reference hardware.
	#[codec(compact)]
	pub ref_time: u64,
	/// The weight of storage space used by proof of validity.
	#[codec(compact)]
	pub proof_size: u64,
}

impl Weight {
	pub const fn from_parts(ref_time: u64, proof_size: u64) -> Self {
		Self { ref_time, proof_size }
	}

	pub const fn saturating_add(self, rhs: Self) -> Self {
		Self {
			ref_time: self.ref_time.saturating_add(rhs.ref_time),
			proof_size: self.proof_size.saturating_add(rhs.proof_size),
		}
	}
}

/// A generalized group of dispatch types.
// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/frame/support/src/dispatch.rs
#[derive(Debug, PartialEq, Eq, Clone, Copy, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchClass {
	/// A normal dispatch.
	Normal,
	/// An operational dispatch.
	Operational,
	/// A mandatory dispatch, part of the block validity.
	Mandatory,
}

impl Default for DispatchClass {
	fn default() -> Self {
		Self::Normal
	}
}

/// Explicit enum to denote if a transaction pays fee or not.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pays {
	Yes,
	No,
}

/// Information related to a dispatchable's class, weight, and fee that can be
/// queried from the runtime, i.e. the pre-execution fee quote.
// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/frame/transaction-payment/src/types.rs
#[derive(Debug, PartialEq, Eq, Clone, Encode, Decode, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "Balance: std::fmt::Display"))]
#[serde(bound(deserialize = "Balance: std::str::FromStr"))]
pub struct RuntimeDispatchInfo<Balance> {
	/// Weight of this dispatch.
	pub weight: Weight,
	/// Class of this dispatch.
	pub class: DispatchClass,
	/// The inclusion fee of this dispatch.
	///
	/// This does not include a tip or anything else that depends on the
	/// signature.
	#[serde(with = "serde_balance")]
	pub partial_fee: Balance,
}

mod serde_balance {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer, T: std::fmt::Display>(
		t: &T,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&t.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>, T: std::str::FromStr>(
		deserializer: D,
	) -> Result<T, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse::<T>().map_err(|_| serde::de::Error::custom("Parse from string failed"))
	}
}

/// The base fee and adjusted weight and length fees constitute the
/// _inclusion fee_.
#[derive(Debug, PartialEq, Eq, Clone, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionFee<Balance> {
	/// The minimum amount a user pays for a transaction, declared as a base
	/// weight in the runtime and converted to a fee via `WeightToFee`.
	pub base_fee: Balance,
	/// The amount paid for the encoded length (in bytes) of the transaction.
	pub len_fee: Balance,
	/// `targeted_fee_adjustment * weight_fee`, the congestion-adjusted
	/// weight portion of the fee.
	pub adjusted_weight_fee: Balance,
}

impl InclusionFee<Balance> {
	/// Returns the total of the inclusion fee.
	pub fn inclusion_fee(&self) -> Balance {
		self.base_fee
			.saturating_add(self.len_fee)
			.saturating_add(self.adjusted_weight_fee)
	}
}

/// Granular pre-execution fee estimate.
///
/// Only `Pays::Yes` transactions carry an inclusion fee.
#[derive(Debug, PartialEq, Eq, Clone, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDetails<Balance> {
	/// The minimum fee for a transaction to be included in a block, absent
	/// for fee-exempt transactions.
	pub inclusion_fee: Option<InclusionFee<Balance>>,
	#[serde(skip)]
	pub tip: Balance,
}

impl FeeDetails<Balance> {
	/// Returns the final fee: inclusion fee plus tip.
	pub fn final_fee(&self) -> Balance {
		self.inclusion_fee
			.as_ref()
			.map(|fee| fee.inclusion_fee())
			.unwrap_or_default()
			.saturating_add(self.tip)
	}
}

/// A number type that can be serialized both as a number or a string that
/// encodes a number in a string.
// Copied from substrate, as sp_rpc pulls in more than we need.
// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/primitives/rpc/src/number.rs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrHex {
	/// The number represented directly.
	Number(u64),
	/// Hex representation of the number.
	Hex(U256),
}

// `FeeDetails::tip` is absent from the rpc answer and skipped by serde,
// which needs a default to fill it in.
impl Default for NumberOrHex {
	fn default() -> Self {
		NumberOrHex::Number(0)
	}
}

impl NumberOrHex {
	pub fn into_u256(self) -> U256 {
		match self {
			NumberOrHex::Number(n) => n.into(),
			NumberOrHex::Hex(h) => h,
		}
	}
}

impl From<u64> for NumberOrHex {
	fn from(n: u64) -> Self {
		NumberOrHex::Number(n)
	}
}

impl From<u128> for NumberOrHex {
	fn from(n: u128) -> Self {
		NumberOrHex::Hex(n.into())
	}
}

impl TryFrom<NumberOrHex> for u128 {
	type Error = ();

	fn try_from(num_or_hex: NumberOrHex) -> Result<Self, Self::Error> {
		num_or_hex.into_u256().try_into().map_err(|_| ())
	}
}

/// Type used to encode the number of references an account has.
pub type RefCount = u32;

/// Information of an account, as stored under `System::Account`.
// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/frame/system/src/lib.rs
#[derive(Debug, Clone, Eq, PartialEq, Default, Encode, Decode)]
pub struct AccountInfo {
	/// The number of transactions this account has sent.
	pub nonce: u32,
	/// The number of other modules that currently depend on this account's
	/// existence.
	pub consumers: RefCount,
	/// The number of other modules that allow this account to exist.
	pub providers: RefCount,
	/// The number of modules that allow this account to exist for their own
	/// purposes only.
	pub sufficients: RefCount,
	/// The balances of the account.
	pub data: AccountData,
}

/// Balance information of an account.
// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/frame/balances/src/types.rs
#[derive(Debug, Clone, Eq, PartialEq, Default, Encode, Decode)]
pub struct AccountData {
	/// Non-reserved part of the balance, the only balance that matters in
	/// terms of most operations on tokens.
	pub free: Balance,
	/// Balance which is has active holds on it and may not be used at all.
	pub reserved: Balance,
	/// The amount that `free` may not drop below when withdrawing.
	pub frozen: Balance,
	/// Extra information about this account.
	pub flags: Balance,
}

/// The version fields the harness needs for offline signing. Unknown fields
/// of the `state_getRuntimeVersion` answer are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeVersion {
	pub spec_name: String,
	pub impl_name: String,
	pub authoring_version: u32,
	pub spec_version: u32,
	pub impl_version: u32,
	pub transaction_version: u32,
}

/// Slim block header, number is hex-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
	pub parent_hash: H256,
	#[serde(serialize_with = "serialize_block_number")]
	#[serde(deserialize_with = "deserialize_block_number")]
	pub number: u32,
	pub state_root: H256,
	pub extrinsics_root: H256,
	pub digest: Digest,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Digest {
	pub logs: Vec<Bytes>,
}

/// Block answered by `chain_getBlock`, extrinsics are opaque hex blobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
	pub header: Header,
	pub extrinsics: Vec<Bytes>,
}

/// A block plus its optional finality justifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBlock {
	pub block: Block,
	pub justifications: Option<serde_json::Value>,
}

/// Answer of the manual-seal `engine_createBlock` control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBlock {
	pub hash: H256,
}

fn serialize_block_number<S: Serializer>(number: &u32, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&format!("{number:#x}"))
}

fn deserialize_block_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
	let s = String::deserialize(deserializer)?;
	let stripped = s.strip_prefix("0x").unwrap_or(&s);
	u32::from_str_radix(stripped, 16).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn weight_encodes_compact() {
		// 1 byte per compact-encoded small value, not 8
		let weight = Weight::from_parts(42, 0);
		assert_eq!(weight.encode(), vec![42 << 2, 0]);
	}

	#[test]
	fn dispatch_info_deserializes_string_fee() {
		let json = r#"{"weight":{"refTime":185307000,"proofSize":3593},"class":"normal","partialFee":"2630678"}"#;
		let info: RuntimeDispatchInfo<Balance> = serde_json::from_str(json).unwrap();
		assert_eq!(info.weight, Weight::from_parts(185_307_000, 3593));
		assert_eq!(info.class, DispatchClass::Normal);
		assert_eq!(info.partial_fee, 2_630_678);
	}

	#[test]
	fn fee_details_sum_up() {
		let details = FeeDetails {
			inclusion_fee: Some(InclusionFee {
				base_fee: 1_000_000,
				len_fee: 145,
				adjusted_weight_fee: 1_630_678,
			}),
			tip: 10,
		};
		assert_eq!(details.final_fee(), 2_630_833);
	}

	#[test]
	fn fee_details_deserialize_without_a_tip_field() {
		// the rpc answer never carries the tip, serde fills in the default
		let json = r#"{"inclusionFee":{"baseFee":"0xf4240","lenFee":145,"adjustedWeightFee":1630678}}"#;
		let details: FeeDetails<NumberOrHex> = serde_json::from_str(json).unwrap();
		assert_eq!(details.tip, NumberOrHex::Number(0));
		let fee = details.inclusion_fee.unwrap();
		assert_eq!(u128::try_from(fee.base_fee).unwrap(), 1_000_000);
		assert_eq!(u128::try_from(fee.adjusted_weight_fee).unwrap(), 1_630_678);
	}

	#[test]
	fn number_or_hex_converts_large_values() {
		let large: NumberOrHex = serde_json::from_str("\"0x5af3107a4000\"").unwrap();
		let value: u128 = large.try_into().unwrap();
		assert_eq!(value, 100_000_000_000_000);
	}

	#[test]
	fn header_block_number_roundtrips_as_hex() {
		let header = Header {
			parent_hash: H256::zero(),
			number: 31,
			state_root: H256::zero(),
			extrinsics_root: H256::zero(),
			digest: Digest::default(),
		};
		let json = serde_json::to_value(&header).unwrap();
		assert_eq!(json["number"], "0x1f");
		let back: Header = serde_json::from_value(json).unwrap();
		assert_eq!(back, header);
	}
}
