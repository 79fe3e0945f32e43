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

//! Extraction of the fee-relevant facts from a block's event vector.

use crate::{
	primitives::{
		DispatchClass, DispatchEventInfo, EventRecord, Pays, Phase, RuntimeEvent, SystemEvent,
		TransactionPaymentEvent,
	},
	AccountId, Balance,
};

/// The settled fee of one transaction, as reported by the
/// `TransactionFeePaid` ledger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeePaid {
	pub who: AccountId,
	/// The full amount withdrawn, tip included.
	pub actual_fee: Balance,
	pub tip: Balance,
}

/// The first `TransactionFeePaid` event among `records`, if any. Inherents
/// never pay fees, so in a block with a single user transaction the first
/// match is that transaction's fee.
pub fn extract_fee(records: &[EventRecord]) -> Option<FeePaid> {
	records.iter().find_map(|record| match &record.event {
		RuntimeEvent::TransactionPayment(TransactionPaymentEvent::TransactionFeePaid {
			who,
			actual_fee,
			tip,
		}) => Some(FeePaid { who: who.clone(), actual_fee: *actual_fee, tip: *tip }),
		_ => None,
	})
}

/// The dispatch outcome of the fee-paying user transaction: the first
/// success or failure event of class `Normal` with `Pays::Yes`, emitted
/// while applying an extrinsic. Skips the mandatory inherents a manually
/// sealed block always carries.
pub fn extract_dispatch_info(records: &[EventRecord]) -> Option<DispatchEventInfo> {
	records.iter().find_map(|record| {
		if !matches!(record.phase, Phase::ApplyExtrinsic(_)) {
			return None
		}
		let info = match &record.event {
			RuntimeEvent::System(event @ SystemEvent::ExtrinsicSuccess { .. }) =>
				event.dispatch_info()?,
			RuntimeEvent::System(event @ SystemEvent::ExtrinsicFailed { .. }) =>
				event.dispatch_info()?,
			_ => return None,
		};
		(info.class == DispatchClass::Normal && info.pays_fee == Pays::Yes).then_some(info)
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::primitives::{DispatchError, Weight};

	fn record(phase: Phase, event: RuntimeEvent) -> EventRecord {
		EventRecord { phase, event, topics: Vec::new() }
	}

	fn success(phase: Phase, class: DispatchClass, pays_fee: Pays) -> EventRecord {
		record(
			phase,
			RuntimeEvent::System(SystemEvent::ExtrinsicSuccess {
				dispatch_info: DispatchEventInfo {
					weight: Weight::from_parts(298_945_000, 3593),
					class,
					pays_fee,
				},
			}),
		)
	}

	#[test]
	fn mandatory_inherent_outcomes_are_skipped() {
		let records = vec![
			success(Phase::ApplyExtrinsic(0), DispatchClass::Mandatory, Pays::Yes),
			success(Phase::ApplyExtrinsic(1), DispatchClass::Normal, Pays::Yes),
		];
		let info = extract_dispatch_info(&records).unwrap();
		assert_eq!(info.class, DispatchClass::Normal);
		assert_eq!(info.weight, Weight::from_parts(298_945_000, 3593));
	}

	#[test]
	fn fee_exempt_outcomes_are_skipped() {
		let records = vec![success(Phase::ApplyExtrinsic(1), DispatchClass::Normal, Pays::No)];
		assert_eq!(extract_dispatch_info(&records), None);
	}

	#[test]
	fn failed_dispatches_still_carry_their_info() {
		let records = vec![record(
			Phase::ApplyExtrinsic(1),
			RuntimeEvent::System(SystemEvent::ExtrinsicFailed {
				dispatch_error: DispatchError::BadOrigin,
				dispatch_info: DispatchEventInfo {
					weight: Weight::from_parts(298_945_000, 3593),
					class: DispatchClass::Normal,
					pays_fee: Pays::Yes,
				},
			}),
		)];
		assert!(extract_dispatch_info(&records).is_some());
	}

	#[test]
	fn fee_paid_event_is_found_among_noise() {
		let who = AccountId::new([9u8; 32]);
		let records = vec![
			success(Phase::ApplyExtrinsic(0), DispatchClass::Mandatory, Pays::Yes),
			record(
				Phase::ApplyExtrinsic(1),
				RuntimeEvent::TransactionPayment(
					TransactionPaymentEvent::TransactionFeePaid {
						who: who.clone(),
						actual_fee: 2_630_823,
						tip: 55,
					},
				),
			),
		];
		let fee = extract_fee(&records).unwrap();
		assert_eq!(fee, FeePaid { who, actual_fee: 2_630_823, tip: 55 });
		assert_eq!(extract_fee(&records[..1]), None);
	}
}
