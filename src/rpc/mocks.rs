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

//! In-process node simulator implementing the `Request` seam.
//!
//! Models exactly the slice of a manual-seal development node the harness
//! talks to: a transaction pool, block-by-block execution of balance
//! transfers with fee withdrawal and burn, the payment query endpoints and
//! the reserved block slots of the production schedule. The fee arithmetic
//! is derived from [`RuntimeFeeFixture`], so the simulator and the fixture
//! agree by construction.

use crate::{
	config::RuntimeFeeFixture,
	extrinsic::{GenericAddress, OpaqueCall, UncheckedExtrinsicV4},
	primitives::{
		AccountInfo, BalancesEvent, Block, CreatedBlock, Digest, DispatchClass,
		DispatchError, DispatchEventInfo, EventRecord, FeeDetails, Header, InclusionFee,
		NumberOrHex, Pays, Phase, RuntimeDispatchInfo, RuntimeEvent, RuntimeVersion,
		SignedBlock, SystemEvent, TokenError, TransactionPaymentEvent, Weight,
	},
	rpc::{Error, Request, Result, RpcParams},
	storage_key, AccountId, Balance, Hash,
};
use codec::{Compact, Decode, Encode};
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sp_core::{storage::StorageKey, Bytes};
use sp_crypto_hashing::blake2_256;
use std::{
	collections::BTreeMap,
	sync::{Arc, Mutex},
};

/// Execution weight of `Balances::transfer_allow_death` alone, i.e. the
/// fixture's reference weight with the per-extrinsic overhead subtracted.
pub fn transfer_call_weight() -> Weight {
	let fixture = RuntimeFeeFixture::dev();
	Weight::from_parts(
		fixture.reference_weight.ref_time - fixture.base_extrinsic_weight.ref_time,
		fixture.reference_weight.proof_size,
	)
}

/// Execution weight the simulator bills for a sudo-wrapped
/// `RootTesting::fill_block`.
pub const FILL_BLOCK_WEIGHT: Weight = Weight::from_parts(1_200_000_000_000, 0);

/// Call index of the timestamp inherent every simulated block carries.
const TIMESTAMP_SET_CALL: [u8; 2] = [1, 0];

const MILLIS_PER_BLOCK: u64 = 6_000;

/// A sealed block with the events its execution emitted.
struct BlockEntry {
	hash: Hash,
	parent_hash: Hash,
	extrinsics: Vec<Vec<u8>>,
	events: Vec<EventRecord>,
}

struct NodeState {
	fixture: RuntimeFeeFixture,
	runtime_version: RuntimeVersion,
	accounts: BTreeMap<AccountId, AccountInfo>,
	total_issuance: Balance,
	pool: Vec<Vec<u8>>,
	blocks: Vec<BlockEntry>,
}

/// A development node in a box. Cloning yields a handle onto the same chain.
#[derive(Clone)]
pub struct SimulatedNode {
	state: Arc<Mutex<NodeState>>,
}

impl Default for SimulatedNode {
	fn default() -> Self {
		Self::new()
	}
}

impl SimulatedNode {
	pub fn new() -> Self {
		let genesis = BlockEntry {
			hash: Hash::from(blake2_256(b"simulated-dev-genesis")),
			parent_hash: Hash::zero(),
			extrinsics: Vec::new(),
			events: Vec::new(),
		};
		let runtime_version = RuntimeVersion {
			spec_name: "simulated-dev".into(),
			impl_name: "simulated-dev".into(),
			authoring_version: 1,
			spec_version: 1,
			impl_version: 1,
			transaction_version: 1,
		};
		let state = NodeState {
			fixture: RuntimeFeeFixture::dev(),
			runtime_version,
			accounts: BTreeMap::new(),
			total_issuance: 0,
			pool: Vec::new(),
			blocks: vec![genesis],
		};
		Self { state: Arc::new(Mutex::new(state)) }
	}

	/// Credit `amount` of newly issued funds to `account`, as a genesis
	/// endowment would.
	pub fn endow(&self, account: &AccountId, amount: Balance) {
		let mut state = self.lock();
		state.accounts.entry(account.clone()).or_default().data.free += amount;
		state.total_issuance += amount;
	}

	/// Number of blocks sealed so far, the genesis block not counted.
	pub fn block_count(&self) -> u32 {
		self.lock().blocks.len() as u32 - 1
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, NodeState> {
		self.state.lock().expect("simulator state is never poisoned; qed")
	}

	fn dispatch(&self, method: &str, params: &[Value]) -> Result<Value> {
		let mut state = self.lock();
		match method {
			"chain_getBlockHash" => {
				let number: Option<u32> = param(params, 0)?;
				let entry = match number {
					Some(n) => state.blocks.get(n as usize),
					None => state.blocks.last(),
				};
				to_json(entry.map(|b| b.hash))
			},
			"chain_getBlock" => {
				let hash: Option<Hash> = param(params, 0)?;
				to_json(state.signed_block(hash))
			},
			"state_getRuntimeVersion" => to_json(&state.runtime_version),
			"state_getStorage" => {
				let key: StorageKey = required_param(params, 0)?;
				let at: Option<Hash> = param(params, 1)?;
				state.read_storage(&key, at)
			},
			"state_call" => {
				let name: String = required_param(params, 0)?;
				let data: Bytes = required_param(params, 1)?;
				state.runtime_call(&name, &data.0)
			},
			"payment_queryInfo" => {
				let encoded: Bytes = required_param(params, 0)?;
				to_json(state.query_info(&encoded.0)?)
			},
			"payment_queryFeeDetails" => {
				let encoded: Bytes = required_param(params, 0)?;
				to_json(state.query_fee_details(&encoded.0)?)
			},
			"author_submitExtrinsic" => {
				let encoded: Bytes = required_param(params, 0)?;
				// reject transactions whose sender cannot cover their fee,
				// like pool validation would
				state.validate(&encoded.0)?;
				let xt_hash = Hash::from(blake2_256(&encoded.0));
				state.pool.push(encoded.0);
				to_json(xt_hash)
			},
			"engine_createBlock" => {
				let _create_empty: bool = required_param(params, 0)?;
				let _finalize: bool = required_param(params, 1)?;
				let hash = state.seal_block();
				to_json(CreatedBlock { hash })
			},
			_ => Err(Error::UnsupportedMethod(method.to_owned())),
		}
	}
}

#[async_trait::async_trait(?Send)]
impl Request for SimulatedNode {
	async fn request<R: DeserializeOwned>(&self, method: &str, params: RpcParams) -> Result<R> {
		let answer = self.dispatch(method, &params.to_values())?;
		Ok(serde_json::from_value(answer)?)
	}
}

/// What the simulator makes of a decoded call blob.
enum CallKind {
	Transfer { to: AccountId, amount: Balance },
	FillBlock,
}

impl NodeState {
	fn signed_block(&self, hash: Option<Hash>) -> Option<SignedBlock> {
		let position = match hash {
			Some(hash) => self.blocks.iter().position(|b| b.hash == hash)?,
			None => self.blocks.len() - 1,
		};
		let entry = &self.blocks[position];
		Some(SignedBlock {
			block: Block {
				header: Header {
					parent_hash: entry.parent_hash,
					number: position as u32,
					state_root: Hash::zero(),
					extrinsics_root: Hash::zero(),
					digest: Digest::default(),
				},
				extrinsics: entry.extrinsics.iter().map(|xt| Bytes(xt.clone())).collect(),
			},
			justifications: None,
		})
	}

	fn read_storage(&self, key: &StorageKey, at: Option<Hash>) -> Result<Value> {
		let events_key = storage_key("System", "Events");
		let account_prefix = storage_key("System", "Account");
		let issuance_key = storage_key("Balances", "TotalIssuance");

		if key.0 == events_key.0 {
			let at = at.ok_or_else(|| {
				Error::InvalidParams("event queries need an explicit block hash".into())
			})?;
			let entry = self.blocks.iter().find(|b| b.hash == at);
			return to_json(entry.map(|b| Bytes(b.events.encode())))
		}
		if key.0.starts_with(&account_prefix.0) {
			// twox128 pair + blake2_128, then the raw 32 account bytes
			let raw = key.0.get(48..).unwrap_or_default();
			let account = AccountId::try_from(raw)
				.map_err(|_| Error::InvalidParams("malformed account storage key".into()))?;
			return to_json(self.accounts.get(&account).map(|info| Bytes(info.encode())))
		}
		if key.0 == issuance_key.0 {
			return to_json(Some(Bytes(self.total_issuance.encode())))
		}
		// unknown keys read as empty storage
		to_json(Option::<Bytes>::None)
	}

	fn runtime_call(&self, name: &str, data: &[u8]) -> Result<Value> {
		match name {
			"TransactionPaymentApi_query_weight_to_fee" => {
				let weight = Weight::decode(&mut &*data)
					.map_err(|e| Error::InvalidParams(e.to_string()))?;
				to_json(Bytes(self.weight_to_fee(weight).encode()))
			},
			"TransactionPaymentApi_query_length_to_fee" => {
				let length = u32::decode(&mut &*data)
					.map_err(|e| Error::InvalidParams(e.to_string()))?;
				to_json(Bytes(self.length_to_fee(length).encode()))
			},
			_ => Err(Error::UnsupportedMethod(format!("state_call {name}"))),
		}
	}

	/// The fee a given weight maps to. Linear in `ref_time` and anchored so
	/// the base extrinsic weight costs exactly the base fee; `proof_size`
	/// never enters the fee.
	fn weight_to_fee(&self, weight: Weight) -> Balance {
		weight.ref_time as Balance * self.fixture.base_fee
			/ self.fixture.base_extrinsic_weight.ref_time as Balance
	}

	fn length_to_fee(&self, length: u32) -> Balance {
		length as Balance * self.fixture.length_fee_per_byte
	}

	/// Inclusion fee of an encoded extrinsic, tip not included.
	fn partial_fee(&self, call_weight: Weight, encoded_len: usize) -> Balance {
		let total = self.fixture.base_extrinsic_weight.saturating_add(call_weight);
		self.weight_to_fee(total) + self.length_to_fee(encoded_len as u32)
	}

	fn query_info(&self, encoded: &[u8]) -> Result<RuntimeDispatchInfo<Balance>> {
		let xt = decode_extrinsic(encoded)?;
		let call_weight = self.call_weight(&xt.function)?;
		Ok(RuntimeDispatchInfo {
			weight: call_weight,
			class: DispatchClass::Normal,
			partial_fee: self.partial_fee(call_weight, encoded.len()),
		})
	}

	fn query_fee_details(&self, encoded: &[u8]) -> Result<FeeDetails<NumberOrHex>> {
		let xt = decode_extrinsic(encoded)?;
		let call_weight = self.call_weight(&xt.function)?;
		let base_fee = self.weight_to_fee(self.fixture.base_extrinsic_weight);
		let total =
			self.weight_to_fee(self.fixture.base_extrinsic_weight.saturating_add(call_weight));
		Ok(FeeDetails {
			inclusion_fee: Some(InclusionFee {
				base_fee: base_fee.into(),
				len_fee: self.length_to_fee(encoded.len() as u32).into(),
				adjusted_weight_fee: (total - base_fee).into(),
			}),
			tip: NumberOrHex::Number(0),
		})
	}

	fn call_weight(&self, call: &OpaqueCall) -> Result<Weight> {
		let index = call
			.call_index()
			.ok_or_else(|| Error::InvalidParams("call blob shorter than a call index".into()))?;
		if index == self.fixture.transfer_allow_death_call {
			Ok(transfer_call_weight())
		} else if index == self.fixture.sudo_call {
			let inner = OpaqueCall(call.args().to_vec());
			if inner.call_index() == Some(self.fixture.fill_block_call) {
				Ok(FILL_BLOCK_WEIGHT)
			} else {
				Err(Error::UnsupportedMethod("sudo call not modelled".into()))
			}
		} else {
			Err(Error::UnsupportedMethod(format!("call index {index:?} not modelled")))
		}
	}

	fn decode_call(&self, call: &OpaqueCall) -> Result<CallKind> {
		let index = call
			.call_index()
			.ok_or_else(|| Error::InvalidParams("call blob shorter than a call index".into()))?;
		if index == self.fixture.transfer_allow_death_call {
			let mut args = call.args();
			let to = GenericAddress::decode(&mut args)
				.map_err(|e| Error::InvalidParams(e.to_string()))?;
			let amount = Compact::<Balance>::decode(&mut args)
				.map_err(|e| Error::InvalidParams(e.to_string()))?;
			let to = match to {
				GenericAddress::Id(account) => account,
				_ => return Err(Error::InvalidParams("only id addresses are modelled".into())),
			};
			Ok(CallKind::Transfer { to, amount: amount.0 })
		} else {
			// call_weight already screened the index
			Ok(CallKind::FillBlock)
		}
	}

	/// Pool admission: the sender must exist and be able to pay the fee.
	fn validate(&self, encoded: &[u8]) -> Result<()> {
		let xt = decode_extrinsic(encoded)?;
		let (sender, tip) = signer_of(&xt)?;
		let call_weight = self.call_weight(&xt.function)?;
		let fee = self.partial_fee(call_weight, encoded.len()) + tip;
		let free = self.accounts.get(&sender).map(|info| info.data.free).unwrap_or_default();
		if free < fee {
			return Err(Error::InvalidParams("inability to pay some fees".into()))
		}
		Ok(())
	}

	/// Seal the next block. One slot per `block_fill_period` is reserved and
	/// carries only the inherent; pool transactions stay queued for the slot
	/// after it.
	fn seal_block(&mut self) -> Hash {
		let number = self.blocks.len() as u32;
		let reserved_slot = number % self.fixture.block_fill_period == 0;
		let pending = if reserved_slot { Vec::new() } else { std::mem::take(&mut self.pool) };

		let inherent = UncheckedExtrinsicV4::new_unsigned((
			TIMESTAMP_SET_CALL,
			Compact(number as u64 * MILLIS_PER_BLOCK),
		))
		.encode();
		let mut extrinsics = vec![inherent];
		let mut events = vec![EventRecord {
			phase: Phase::ApplyExtrinsic(0),
			event: RuntimeEvent::System(SystemEvent::ExtrinsicSuccess {
				dispatch_info: DispatchEventInfo {
					weight: self.fixture.base_extrinsic_weight,
					class: DispatchClass::Mandatory,
					pays_fee: Pays::Yes,
				},
			}),
			topics: Vec::new(),
		}];

		for encoded in pending {
			let index = extrinsics.len() as u32;
			if let Err(e) = self.apply_extrinsic(&encoded, index, &mut events) {
				debug!("dropping invalid pool transaction: {e}");
				continue
			}
			extrinsics.push(encoded);
		}

		let parent_hash = self.blocks[self.blocks.len() - 1].hash;
		let hash = Hash::from(blake2_256(&(number, parent_hash, &extrinsics).encode()));
		debug!(
			"sealed block {number} ({} extrinsics{})",
			extrinsics.len(),
			if reserved_slot { ", reserved slot" } else { "" }
		);
		self.blocks.push(BlockEntry { hash, parent_hash, extrinsics, events });
		hash
	}

	fn apply_extrinsic(
		&mut self,
		encoded: &[u8],
		index: u32,
		events: &mut Vec<EventRecord>,
	) -> Result<()> {
		let xt = decode_extrinsic(encoded)?;
		let (sender, tip) = signer_of(&xt)?;
		let call_weight = self.call_weight(&xt.function)?;
		let call = self.decode_call(&xt.function)?;
		let fee = self.partial_fee(call_weight, encoded.len()) + tip;

		let free = self.accounts.get(&sender).map(|info| info.data.free).unwrap_or_default();
		if free < fee {
			return Err(Error::InvalidParams("inability to pay some fees".into()))
		}

		let phase = Phase::ApplyExtrinsic(index);
		let mut record = |event: RuntimeEvent| {
			events.push(EventRecord { phase: phase.clone(), event, topics: Vec::new() })
		};

		// fees are withdrawn up front and burned, there is no block author
		// deposit on this chain
		{
			let sender_info = self.accounts.entry(sender.clone()).or_default();
			sender_info.data.free -= fee;
			sender_info.nonce += 1;
		}
		self.total_issuance -= fee;
		record(RuntimeEvent::Balances(BalancesEvent::Withdraw {
			who: sender.clone(),
			amount: fee,
		}));

		let dispatch_info = DispatchEventInfo {
			weight: self.fixture.base_extrinsic_weight.saturating_add(call_weight),
			class: DispatchClass::Normal,
			pays_fee: Pays::Yes,
		};

		let outcome = match call {
			CallKind::Transfer { to, amount } => {
				let sender_free = self.accounts.get(&sender).map(|i| i.data.free).unwrap_or_default();
				if sender_free < amount {
					Err(DispatchError::Token(TokenError::FundsUnavailable))
				} else {
					if !self.accounts.contains_key(&to) {
						record(RuntimeEvent::System(SystemEvent::NewAccount {
							account: to.clone(),
						}));
						record(RuntimeEvent::Balances(BalancesEvent::Endowed {
							account: to.clone(),
							free_balance: amount,
						}));
					}
					if let Some(info) = self.accounts.get_mut(&sender) {
						info.data.free -= amount;
					}
					self.accounts.entry(to.clone()).or_default().data.free += amount;
					record(RuntimeEvent::Balances(BalancesEvent::Transfer {
						from: sender.clone(),
						to,
						amount,
					}));
					Ok(())
				}
			},
			CallKind::FillBlock => Ok(()),
		};

		record(RuntimeEvent::TransactionPayment(
			TransactionPaymentEvent::TransactionFeePaid {
				who: sender,
				actual_fee: fee,
				tip,
			},
		));
		match outcome {
			Ok(()) =>
				record(RuntimeEvent::System(SystemEvent::ExtrinsicSuccess { dispatch_info })),
			Err(dispatch_error) => record(RuntimeEvent::System(SystemEvent::ExtrinsicFailed {
				dispatch_error,
				dispatch_info,
			})),
		}
		Ok(())
	}
}

fn decode_extrinsic(encoded: &[u8]) -> Result<UncheckedExtrinsicV4<OpaqueCall>> {
	UncheckedExtrinsicV4::<OpaqueCall>::decode(&mut &*encoded)
		.map_err(|e| Error::InvalidParams(format!("undecodable extrinsic: {e}")))
}

fn signer_of(xt: &UncheckedExtrinsicV4<OpaqueCall>) -> Result<(AccountId, Balance)> {
	let (address, _, extra) = xt
		.signature
		.as_ref()
		.ok_or_else(|| Error::InvalidParams("unsigned transactions are not accepted".into()))?;
	match address {
		GenericAddress::Id(account) => Ok((account.clone(), extra.tip())),
		_ => Err(Error::InvalidParams("only id addresses are modelled".into())),
	}
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
	Ok(serde_json::to_value(value)?)
}

fn param<T: DeserializeOwned>(params: &[Value], index: usize) -> Result<T> {
	let value = params.get(index).cloned().unwrap_or(Value::Null);
	serde_json::from_value(value)
		.map_err(|e| Error::InvalidParams(format!("parameter {index}: {e}")))
}

fn required_param<T: DeserializeOwned>(params: &[Value], index: usize) -> Result<T> {
	let value = params
		.get(index)
		.cloned()
		.ok_or_else(|| Error::InvalidParams(format!("parameter {index} is missing")))?;
	serde_json::from_value(value)
		.map_err(|e| Error::InvalidParams(format!("parameter {index}: {e}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rpc_params;

	fn alice() -> AccountId {
		AccountId::new([1u8; 32])
	}

	async fn latest_hash(node: &SimulatedNode) -> Hash {
		let hash: Option<Hash> =
			node.request("chain_getBlockHash", rpc_params![Option::<u32>::None]).await.unwrap();
		hash.unwrap()
	}

	#[tokio::test]
	async fn weight_to_fee_maps_the_reference_point() {
		let node = SimulatedNode::new();
		let fixture = RuntimeFeeFixture::dev();
		let fee: Bytes = node
			.request(
				"state_call",
				rpc_params![
					"TransactionPaymentApi_query_weight_to_fee",
					Bytes(fixture.reference_weight.encode())
				],
			)
			.await
			.unwrap();
		let fee = Balance::decode(&mut fee.0.as_slice()).unwrap();
		assert_eq!(fee, fixture.reference_weight_fee);
	}

	#[tokio::test]
	async fn weight_to_fee_ignores_proof_size() {
		let node = SimulatedNode::new();
		let state = node.lock();
		let fee_a = state.weight_to_fee(Weight::from_parts(298_945_000, 0));
		let fee_b = state.weight_to_fee(Weight::from_parts(298_945_000, 1 << 30));
		assert_eq!(fee_a, fee_b);
	}

	#[tokio::test]
	async fn base_weight_costs_exactly_the_base_fee() {
		let node = SimulatedNode::new();
		let fixture = RuntimeFeeFixture::dev();
		let state = node.lock();
		assert_eq!(state.weight_to_fee(fixture.base_extrinsic_weight), fixture.base_fee);
	}

	#[tokio::test]
	async fn every_fifth_slot_is_reserved() {
		let node = SimulatedNode::new();
		node.endow(&alice(), 1 << 40);
		// blocks 1..=4 are open, block 5 is the reserved slot
		for _ in 0..5 {
			let _: CreatedBlock =
				node.request("engine_createBlock", rpc_params![false, true]).await.unwrap();
		}
		assert_eq!(node.block_count(), 5);
		let hash = latest_hash(&node).await;
		let block: Option<SignedBlock> =
			node.request("chain_getBlock", rpc_params![hash]).await.unwrap();
		// the reserved slot still carries its inherent
		assert_eq!(block.unwrap().block.extrinsics.len(), 1);
	}

	#[tokio::test]
	async fn unknown_methods_are_rejected() {
		let node = SimulatedNode::new();
		let result: Result<Value> =
			node.request("system_health", rpc_params![]).await;
		assert!(matches!(result, Err(Error::UnsupportedMethod(_))));
	}

	#[tokio::test]
	async fn genesis_hash_is_stable() {
		let node = SimulatedNode::new();
		let first: Option<Hash> =
			node.request("chain_getBlockHash", rpc_params![0u32]).await.unwrap();
		let second: Option<Hash> =
			node.request("chain_getBlockHash", rpc_params![0u32]).await.unwrap();
		assert_eq!(first, second);
		assert!(first.is_some());
	}
}
