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

//! The scenarios run against a node: a single verified transfer, a tipped
//! variant, fee burn accounting, and fee stability across a hundred
//! near-full blocks.

use crate::{
	api::{ensure_eq, Api, Error, GetBalanceState, Result, SubmitAndMine},
	extrinsic::SudoExtrinsics,
	rpc::Request,
	verify::{FeeReport, FeeVerifier},
	AccountId, Balance,
};
use codec::Encode;
use log::info;
use sp_core::{sr25519, Bytes, Pair};
use sp_runtime::{traits::IdentifyAccount, MultiSigner, Perbill};

/// Amount moved by the reference transfer of every scenario.
pub const TRANSFER_AMOUNT: Balance = 200_000;

/// Blocks to fill when probing fee stability.
pub const LOAD_BLOCKS: u32 = 100;

const FILL_RATIO_PERCENT: u32 = 60;

/// Well-known development keypair from its derivation path, e.g. `//Alice`.
pub fn dev_signer(path: &str) -> Result<sr25519::Pair> {
	sr25519::Pair::from_string(path, None)
		.map_err(|e| Error::Other(format!("invalid derivation path {path}: {e:?}").into()))
}

/// Account id of a well-known development keypair.
pub fn dev_account(path: &str) -> Result<AccountId> {
	Ok(MultiSigner::from(dev_signer(path)?.public()).into_account())
}

/// Drives the fee scenarios against one node. The api signer pays for
/// everything and must hold sudo rights for the load scenario.
pub struct ScenarioRunner<'a, Client> {
	api: &'a Api<Client>,
	recipient: AccountId,
}

impl<'a, Client: Request> ScenarioRunner<'a, Client> {
	pub fn new(api: &'a Api<Client>, recipient: AccountId) -> Self {
		Self { api, recipient }
	}

	/// One plain transfer, fully reconciled.
	pub async fn verify_transfer_fee(&self) -> Result<FeeReport> {
		info!("scenario: transfer fee reconciliation");
		FeeVerifier::new(self.api)
			.verify_transfer(self.recipient.clone(), TRANSFER_AMOUNT, 0)
			.await
	}

	/// A tipped transfer; the tip must land on top of the inclusion fee in
	/// every figure.
	pub async fn verify_tipped_transfer_fee(&self, tip: Balance) -> Result<FeeReport> {
		info!("scenario: tipped transfer fee reconciliation (tip {tip})");
		FeeVerifier::new(self.api)
			.verify_transfer(self.recipient.clone(), TRANSFER_AMOUNT, tip)
			.await
	}

	/// One verified transfer with an outer issuance snapshot on top: the
	/// amount vanishing from total issuance must be exactly the settled fee.
	/// Returns the burned amount.
	pub async fn verify_fee_burn(&self) -> Result<Balance> {
		info!("scenario: fee burn accounting");
		let issuance_before = self.api.get_total_issuance(None).await?;
		let report = FeeVerifier::new(self.api)
			.verify_transfer(self.recipient.clone(), TRANSFER_AMOUNT, 0)
			.await?;
		let issuance_after = self.api.get_total_issuance(None).await?;
		ensure_eq(
			"burned issuance equals the settled fee",
			issuance_before,
			issuance_after + report.actual_fee,
		)?;
		Ok(report.actual_fee)
	}

	/// Quote a reference transfer, drive the chain through `LOAD_BLOCKS`
	/// near-full blocks, quote again. The steady-state fee must not move.
	pub async fn verify_fee_stability_under_load(&self) -> Result<()> {
		info!("scenario: fee stability across {LOAD_BLOCKS} full blocks");
		let verifier = FeeVerifier::new(self.api);
		let fee_before = verifier
			.quote_transfer_weight_fee(self.recipient.clone(), TRANSFER_AMOUNT)
			.await?;

		for round in 0..LOAD_BLOCKS {
			let xt = self
				.api
				.sudo_fill_block(Perbill::from_percent(FILL_RATIO_PERCENT))
				.await?;
			verifier.mine_until_included(Bytes(xt.encode())).await?;
			if (round + 1) % 20 == 0 {
				info!("filled {} of {LOAD_BLOCKS} blocks", round + 1);
			}
		}

		let fee_after = verifier
			.quote_transfer_weight_fee(self.recipient.clone(), TRANSFER_AMOUNT)
			.await?;
		ensure_eq("transfer weight fee is unchanged after sustained load", fee_before, fee_after)?;
		info!("fee held at {fee_after} across {LOAD_BLOCKS} full blocks");
		Ok(())
	}
}

/// Mine a couple of empty blocks, e.g. to move past reserved slots before a
/// scenario starts.
pub async fn mine_empty_blocks<Client: Request>(api: &Api<Client>, count: u32) -> Result<()> {
	for _ in 0..count {
		api.create_block(true, true).await?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dev_accounts_are_deterministic() {
		let alice = dev_account("//Alice").unwrap();
		let again = dev_account("//Alice").unwrap();
		let bob = dev_account("//Bob").unwrap();
		assert_eq!(alice, again);
		assert_ne!(alice, bob);
	}
}
