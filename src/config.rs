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

//! Per-runtime fee constants, injected into the verification engine.
//!
//! The values are golden fixture data tied to one concrete runtime
//! configuration. They are asserted against, never re-derived.

use crate::{extrinsic::CallIndex, primitives::Weight, Balance};

/// Runtime constants the fee checks are reconciled against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFeeFixture {
	/// Fixed per-extrinsic execution overhead. It is charged during block
	/// execution but absent from pre-execution quotes.
	pub base_extrinsic_weight: Weight,
	/// Weight-to-fee value of `base_extrinsic_weight`, the minimum fee of any
	/// fee-liable extrinsic.
	pub base_fee: Balance,
	/// Fee charged per encoded byte of the signed extrinsic.
	pub length_fee_per_byte: Balance,
	/// A known weight-to-fee reference point of the runtime under test.
	pub reference_weight: Weight,
	/// The fee the runtime maps `reference_weight` to.
	pub reference_weight_fee: Balance,
	/// Period of the block-production schedule. One slot per period is
	/// reserved and carries no user extrinsics.
	pub block_fill_period: u32,
	/// Call index of `Balances::transfer_allow_death`.
	pub transfer_allow_death_call: CallIndex,
	/// Call index of `RootTesting::fill_block`.
	pub fill_block_call: CallIndex,
	/// Call index of `Sudo::sudo`.
	pub sudo_call: CallIndex,
}

impl RuntimeFeeFixture {
	/// Fixture of the development runtime these checks were written against.
	pub fn dev() -> Self {
		Self {
			base_extrinsic_weight: Weight::from_parts(113_638 * 1_000, 0),
			base_fee: 1_000_000,
			length_fee_per_byte: 1,
			reference_weight: Weight::from_parts(298_945_000, 3593),
			reference_weight_fee: 1_000_000 + 1_630_678,
			block_fill_period: 5,
			transfer_allow_death_call: [10, 0],
			fill_block_call: [36, 0],
			sudo_call: [8, 0],
		}
	}
}

impl Default for RuntimeFeeFixture {
	fn default() -> Self {
		Self::dev()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dev_fixture_carries_the_known_runtime_constants() {
		let fixture = RuntimeFeeFixture::dev();
		assert_eq!(fixture.base_extrinsic_weight.ref_time, 113_638_000);
		assert_eq!(fixture.base_extrinsic_weight.proof_size, 0);
		assert_eq!(fixture.base_fee, 1_000_000);
		assert_eq!(fixture.reference_weight, Weight::from_parts(298_945_000, 3593));
		assert_eq!(fixture.reference_weight_fee, 2_630_678);
		assert_eq!(fixture.block_fill_period, 5);
	}
}
