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

//! Statically decoded ledger events.
//!
//! The harness only understands the pallets it reconciles against; the
//! variant indices mirror the development runtime under test. Decoding the
//! dispatch outcome once here means the engine branches on proper variants
//! instead of string tags.

use crate::Balance;
use codec::{Decode, Encode};
use sp_core::H256;
use sp_runtime::AccountId32;

use super::types::{DispatchClass, Pays, Weight};

/// Execution phase an event was emitted in.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Phase {
	/// Applying an extrinsic, by index within the block.
	ApplyExtrinsic(u32),
	/// Finalizing the block.
	Finalization,
	/// Initializing the block.
	Initialization,
}

/// A single entry of the `System::Events` storage vector.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct EventRecord {
	/// The phase of the block it happened in.
	pub phase: Phase,
	/// The event itself.
	pub event: RuntimeEvent,
	/// The list of the topics this event has.
	pub topics: Vec<H256>,
}

/// The subset of the runtime event enum the harness decodes. Pallet indices
/// match the development runtime.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RuntimeEvent {
	#[codec(index = 0)]
	System(SystemEvent),
	#[codec(index = 10)]
	Balances(BalancesEvent),
	#[codec(index = 11)]
	TransactionPayment(TransactionPaymentEvent),
}

/// Weight, class and fee liability of a dispatched extrinsic, as reported by
/// the dispatch outcome event. Unlike a quote, the weight here includes the
/// per-extrinsic base overhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct DispatchEventInfo {
	pub weight: Weight,
	pub class: DispatchClass,
	pub pays_fee: Pays,
}

/// `frame_system` events.
// https://github.com/paritytech/polkadot-sdk/blob/master/substrate/frame/system/src/lib.rs
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum SystemEvent {
	/// An extrinsic completed successfully.
	#[codec(index = 0)]
	ExtrinsicSuccess { dispatch_info: DispatchEventInfo },
	/// An extrinsic failed.
	#[codec(index = 1)]
	ExtrinsicFailed { dispatch_error: DispatchError, dispatch_info: DispatchEventInfo },
	#[codec(index = 2)]
	CodeUpdated,
	#[codec(index = 3)]
	NewAccount { account: AccountId32 },
	#[codec(index = 4)]
	KilledAccount { account: AccountId32 },
	#[codec(index = 5)]
	Remarked { sender: AccountId32, hash: H256 },
}

impl SystemEvent {
	/// The dispatch info embedded in the outcome event, picking the success
	/// branch payload for successes and the failure branch otherwise.
	pub fn dispatch_info(&self) -> Option<DispatchEventInfo> {
		match self {
			SystemEvent::ExtrinsicSuccess { dispatch_info } => Some(*dispatch_info),
			SystemEvent::ExtrinsicFailed { dispatch_info, .. } => Some(*dispatch_info),
			_ => None,
		}
	}
}

/// `pallet_balances` events the harness may encounter in a fee scenario.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum BalancesEvent {
	/// An account was created with some free balance.
	#[codec(index = 0)]
	Endowed { account: AccountId32, free_balance: Balance },
	/// Transfer succeeded.
	#[codec(index = 2)]
	Transfer { from: AccountId32, to: AccountId32, amount: Balance },
	/// Some amount was deposited (e.g. for transaction fees).
	#[codec(index = 7)]
	Deposit { who: AccountId32, amount: Balance },
	/// Some amount was withdrawn from the account (e.g. for transaction fees).
	#[codec(index = 8)]
	Withdraw { who: AccountId32, amount: Balance },
	/// Some amount was burned from an account.
	#[codec(index = 11)]
	Burned { who: AccountId32, amount: Balance },
}

/// `pallet_transaction_payment` events.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TransactionPaymentEvent {
	/// A transaction fee `actual_fee`, of which `tip` was added to the
	/// minimum inclusion fee, has been paid by `who`.
	#[codec(index = 0)]
	TransactionFeePaid { who: AccountId32, actual_fee: Balance, tip: Balance },
}

/// Reason an extrinsic failed, structurally identical to the runtime's
/// `sp_runtime::DispatchError`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum DispatchError {
	Other,
	CannotLookup,
	BadOrigin,
	Module(ModuleError),
	ConsumerRemaining,
	NoProviders,
	TooManyConsumers,
	Token(TokenError),
	Arithmetic(ArithmeticError),
	Transactional(TransactionalError),
	Exhausted,
	Corruption,
	Unavailable,
	RootNotAllowed,
}

/// Reason why a pallet call failed.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ModuleError {
	/// Index of the pallet the error originates from.
	pub index: u8,
	/// Raw error of the pallet, SCALE encoded.
	pub error: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TokenError {
	FundsUnavailable,
	OnlyProvider,
	BelowMinimum,
	CannotCreate,
	UnknownAsset,
	Frozen,
	Unsupported,
	CannotCreateHold,
	NotExpendable,
	Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ArithmeticError {
	Underflow,
	Overflow,
	DivisionByZero,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TransactionalError {
	LimitReached,
	NoLayer,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn runtime_event_keeps_pallet_indices() {
		let event = RuntimeEvent::TransactionPayment(
			TransactionPaymentEvent::TransactionFeePaid {
				who: AccountId32::new([1u8; 32]),
				actual_fee: 2_630_823,
				tip: 0,
			},
		);
		let encoded = event.encode();
		// pallet index, then variant index
		assert_eq!(encoded[0], 11);
		assert_eq!(encoded[1], 0);
	}

	#[test]
	fn dispatch_info_is_taken_from_both_outcome_branches() {
		let info = DispatchEventInfo {
			weight: Weight::from_parts(298_945_000, 3593),
			class: DispatchClass::Normal,
			pays_fee: Pays::Yes,
		};
		let success = SystemEvent::ExtrinsicSuccess { dispatch_info: info };
		let failed = SystemEvent::ExtrinsicFailed {
			dispatch_error: DispatchError::BadOrigin,
			dispatch_info: info,
		};
		assert_eq!(success.dispatch_info(), Some(info));
		assert_eq!(failed.dispatch_info(), Some(info));
		assert_eq!(SystemEvent::CodeUpdated.dispatch_info(), None);
	}
}
