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

use crate::rpc::Error as RpcClientError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, derive_more::From)]
pub enum Error {
	/// Could not fetch the genesis hash from node.
	FetchGenesisHash,
	/// Expected a signer, but none is assigned.
	NoSigner,
	/// Rpc Client Error.
	RpcClient(RpcClientError),
	/// Encode / Decode Error.
	Codec(codec::Error),
	/// Could not convert an rpc number with try_from.
	TryFromIntError,
	/// Could not find the expected block.
	BlockNotFound,
	/// A submitted extrinsic is absent from the produced block, even after a
	/// supplementary block was mined past a reserved slot.
	InclusionFailure,
	/// The transaction is fee exempt, there is nothing to verify.
	FeeExempt,
	/// No `TransactionFeePaid` event for a mined, fee-liable transaction.
	MissingFeeEvent,
	/// No fee-paying, class-Normal dispatch outcome among the block events;
	/// the scenario setup is malformed.
	MissingDispatchInfo,
	/// A fee reconciliation check failed.
	InvariantViolation(InvariantViolation),
	/// Any custom Error.
	Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// A failed reconciliation check, with the invariant spelled out and both
/// sides of the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
	pub check: &'static str,
	pub expected: u128,
	pub actual: u128,
}

/// Compare one reconciliation invariant under exact integer arithmetic.
pub fn ensure_eq(check: &'static str, expected: u128, actual: u128) -> Result<()> {
	if expected == actual {
		Ok(())
	} else {
		log::warn!("invariant broken: {check}: expected {expected}, actual {actual}");
		Err(Error::InvariantViolation(InvariantViolation { check, expected, actual }))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ensure_eq_reports_the_failed_check() {
		assert!(ensure_eq("fee matches quote", 42, 42).is_ok());
		match ensure_eq("fee matches quote", 42, 43) {
			Err(Error::InvariantViolation(violation)) => {
				assert_eq!(violation.check, "fee matches quote");
				assert_eq!(violation.expected, 42);
				assert_eq!(violation.actual, 43);
			},
			other => panic!("unexpected result: {other:?}"),
		}
	}
}
