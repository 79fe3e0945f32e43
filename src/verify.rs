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

//! The reconciliation engine: submit one fee-liable transfer, mine it, and
//! cross-check every fee figure the node reports about it.
//!
//! Five independent sources must agree on the settled fee:
//! the `TransactionFeePaid` ledger event, the `payment_queryInfo` quote, the
//! `payment_queryFeeDetails` components, the runtime's own weight- and
//! length-to-fee conversions applied to the dispatched weight, and the
//! balance plus issuance movements on chain. All comparisons are exact
//! integer equalities.

use crate::{
	api::{
		ensure_eq, Api, Error, GetAccountInfo, GetBalanceState, GetChainInfo,
		GetTransactionPayment, InvariantViolation, Result, SubmitAndMine,
	},
	events::{extract_fee, extract_dispatch_info},
	extrinsic::BalancesExtrinsics,
	primitives::Weight,
	rpc::Request,
	AccountId, Balance, Hash,
};
use codec::Encode;
use log::{debug, info};
use sp_core::Bytes;

/// Everything the engine established about one verified transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeReport {
	/// Block the transfer was mined into.
	pub block_hash: Hash,
	/// The settled fee, tip included, as withdrawn from the sender.
	pub actual_fee: Balance,
	pub tip: Balance,
	/// Dispatched weight from the outcome event, base overhead included.
	pub weight: Weight,
	/// Encoded byte length of the signed extrinsic.
	pub encoded_len: u32,
	/// The pre-execution quote, tip excluded.
	pub partial_fee: Balance,
}

/// Fee reconciliation against a node reachable through `api`.
pub struct FeeVerifier<'a, Client> {
	api: &'a Api<Client>,
}

impl<'a, Client: Request> FeeVerifier<'a, Client> {
	pub fn new(api: &'a Api<Client>) -> Self {
		Self { api }
	}

	/// Quote the weight portion of a transfer's fee without submitting it.
	/// The length fee is subtracted out: the signer's nonce grows between
	/// quotes and can change the compact-encoded length by a byte, which
	/// would show up as drift where there is none.
	pub async fn quote_transfer_weight_fee(
		&self,
		to: AccountId,
		amount: Balance,
	) -> Result<Balance> {
		let xt = self.api.balance_transfer_allow_death(to, amount, 0).await?;
		let encoded = Bytes(xt.encode());
		let encoded_len = encoded.0.len() as u32;
		let info = self.api.get_payment_info(encoded, None).await?;
		let length_fee = self.api.query_length_to_fee(encoded_len, None).await?;
		info.partial_fee.checked_sub(length_fee).ok_or_else(|| {
			Error::InvariantViolation(InvariantViolation {
				check: "quoted fee covers its length fee",
				expected: length_fee,
				actual: info.partial_fee,
			})
		})
	}

	/// Submit a signed transfer, mine it, and reconcile all fee figures.
	pub async fn verify_transfer(
		&self,
		to: AccountId,
		amount: Balance,
		tip: Balance,
	) -> Result<FeeReport> {
		let signer = self.api.signer_account().ok_or(Error::NoSigner)?;

		let issuance_before = self.api.get_total_issuance(None).await?;
		let sender_before = self.api.get_free_balance(&signer, None).await?;
		let recipient_before = self.api.get_free_balance(&to, None).await?;

		let xt = self.api.balance_transfer_allow_death(to.clone(), amount, tip).await?;
		debug!("signed transfer: {}", xt.hex_encode());
		let encoded = Bytes(xt.encode());
		let encoded_len = encoded.0.len() as u32;

		let quote = self.api.get_payment_info(encoded.clone(), None).await?;
		let details = self.api.get_fee_details(encoded.clone(), None).await?;
		let inclusion = details.inclusion_fee.ok_or(Error::FeeExempt)?;
		debug!(
			"quoted weight {:?}, partial fee {}, inclusion fee {}",
			quote.weight,
			quote.partial_fee,
			inclusion.inclusion_fee()
		);

		let block_hash = self.mine_until_included(encoded).await?;
		let events = self.api.fetch_events(block_hash).await?;

		let fee = extract_fee(&events).ok_or(Error::MissingFeeEvent)?;
		if fee.who != signer {
			return Err(Error::MissingFeeEvent)
		}
		let outcome = extract_dispatch_info(&events).ok_or(Error::MissingDispatchInfo)?;

		// the dispatched weight is the quoted call weight plus the
		// per-extrinsic base overhead
		let base = self.api.fixture().base_extrinsic_weight;
		ensure_eq(
			"dispatched ref_time is the quoted call weight plus base overhead",
			quote.weight.ref_time as u128 + base.ref_time as u128,
			outcome.weight.ref_time as u128,
		)?;
		ensure_eq(
			"dispatched proof size matches the quote",
			quote.weight.proof_size as u128 + base.proof_size as u128,
			outcome.weight.proof_size as u128,
		)?;
		ensure_eq("ledger event reports the signed tip", tip, fee.tip)?;

		// first-principles recomputation through the runtime's own curves
		let weight_fee = self.api.query_weight_to_fee(outcome.weight, None).await?;
		let length_fee = self.api.query_length_to_fee(encoded_len, None).await?;
		ensure_eq(
			"settled fee equals weight fee plus length fee plus tip",
			weight_fee + length_fee + tip,
			fee.actual_fee,
		)?;
		ensure_eq(
			"settled fee equals the payment_queryInfo quote plus tip",
			quote.partial_fee + tip,
			fee.actual_fee,
		)?;
		ensure_eq(
			"settled fee equals the sum of the fee detail components plus tip",
			inclusion.inclusion_fee() + tip,
			fee.actual_fee,
		)?;

		// ledger movement: sender pays transfer plus fee, recipient gets the
		// transfer, the fee vanishes from issuance. Compared additively so a
		// failed dispatch reports a violation instead of underflowing.
		let sender_after = self.api.get_free_balance(&signer, None).await?;
		let recipient_after = self.api.get_free_balance(&to, None).await?;
		let issuance_after = self.api.get_total_issuance(None).await?;
		ensure_eq(
			"sender balance drops by transfer amount plus fee",
			sender_before,
			sender_after + amount + fee.actual_fee,
		)?;
		ensure_eq(
			"recipient balance grows by the transfer amount",
			recipient_before + amount,
			recipient_after,
		)?;
		ensure_eq(
			"the fee is burned from total issuance",
			issuance_before,
			issuance_after + fee.actual_fee,
		)?;

		info!(
			"verified transfer in block {:?}: fee {} (tip {}), weight {:?}, {} bytes",
			block_hash, fee.actual_fee, fee.tip, outcome.weight, encoded_len
		);
		Ok(FeeReport {
			block_hash,
			actual_fee: fee.actual_fee,
			tip: fee.tip,
			weight: outcome.weight,
			encoded_len,
			partial_fee: quote.partial_fee,
		})
	}

	/// Submit `encoded` and mine until it lands in a block. The production
	/// schedule reserves one slot per period, so a transaction may be
	/// deferred by exactly one block; anything beyond that is a failure.
	pub async fn mine_until_included(&self, encoded: Bytes) -> Result<Hash> {
		let mined = self.api.submit_and_mine(encoded.clone()).await?;
		if mined.included {
			return Ok(mined.block_hash)
		}
		debug!("block {:?} was a reserved slot, mining one more", mined.block_hash);
		let created = self.api.create_block(false, true).await?;
		let extrinsics = self.api.get_block_extrinsics(created.hash).await?;
		if extrinsics.iter().any(|xt| xt.0 == encoded.0) {
			Ok(created.hash)
		} else {
			Err(Error::InclusionFailure)
		}
	}
}
