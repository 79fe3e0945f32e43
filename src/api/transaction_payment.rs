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

use crate::{
	api::{Api, Error, Result},
	primitives::{FeeDetails, InclusionFee, NumberOrHex, RuntimeDispatchInfo, Weight},
	rpc::Request,
	rpc_params, Balance, Hash,
};
use codec::Encode;
use sp_core::Bytes;

/// Fee quotes from the transaction payment pallet, both via the dedicated
/// `payment_*` rpc endpoints and the raw runtime api.
#[async_trait::async_trait(?Send)]
pub trait GetTransactionPayment {
	/// Weight, class and inclusion fee of `encoded_extrinsic`, as quoted
	/// before execution. The quote never contains the tip.
	async fn get_payment_info(
		&self,
		encoded_extrinsic: Bytes,
		at_block: Option<Hash>,
	) -> Result<RuntimeDispatchInfo<Balance>>;

	/// The fee split into base, length and weight portions.
	async fn get_fee_details(
		&self,
		encoded_extrinsic: Bytes,
		at_block: Option<Hash>,
	) -> Result<FeeDetails<Balance>>;

	/// Convert a weight into a fee via the runtime's `WeightToFee` curve.
	async fn query_weight_to_fee(&self, weight: Weight, at_block: Option<Hash>)
		-> Result<Balance>;

	/// Convert an encoded length into a fee via the runtime's `LengthToFee`
	/// curve.
	async fn query_length_to_fee(&self, length: u32, at_block: Option<Hash>) -> Result<Balance>;
}

#[async_trait::async_trait(?Send)]
impl<Client: Request> GetTransactionPayment for Api<Client> {
	async fn get_payment_info(
		&self,
		encoded_extrinsic: Bytes,
		at_block: Option<Hash>,
	) -> Result<RuntimeDispatchInfo<Balance>> {
		let info = self
			.client()
			.request("payment_queryInfo", rpc_params![encoded_extrinsic, at_block])
			.await?;
		Ok(info)
	}

	async fn get_fee_details(
		&self,
		encoded_extrinsic: Bytes,
		at_block: Option<Hash>,
	) -> Result<FeeDetails<Balance>> {
		let details: FeeDetails<NumberOrHex> = self
			.client()
			.request("payment_queryFeeDetails", rpc_params![encoded_extrinsic, at_block])
			.await?;
		convert_fee_details(details)
	}

	async fn query_weight_to_fee(
		&self,
		weight: Weight,
		at_block: Option<Hash>,
	) -> Result<Balance> {
		self.runtime_call("TransactionPaymentApi_query_weight_to_fee", weight.encode(), at_block)
			.await
	}

	async fn query_length_to_fee(&self, length: u32, at_block: Option<Hash>) -> Result<Balance> {
		self.runtime_call("TransactionPaymentApi_query_length_to_fee", length.encode(), at_block)
			.await
	}
}

fn convert_fee_details(details: FeeDetails<NumberOrHex>) -> Result<FeeDetails<Balance>> {
	let inclusion_fee = match details.inclusion_fee {
		Some(fee) => Some(InclusionFee {
			base_fee: to_balance(fee.base_fee)?,
			len_fee: to_balance(fee.len_fee)?,
			adjusted_weight_fee: to_balance(fee.adjusted_weight_fee)?,
		}),
		None => None,
	};
	let tip = to_balance(details.tip)?;
	Ok(FeeDetails { inclusion_fee, tip })
}

fn to_balance(value: NumberOrHex) -> Result<Balance> {
	value.try_into().map_err(|_| Error::TryFromIntError)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fee_details_convert_hex_components() {
		let details = FeeDetails::<NumberOrHex> {
			inclusion_fee: Some(InclusionFee {
				base_fee: 1_000_000u64.into(),
				len_fee: NumberOrHex::Hex(145u64.into()),
				adjusted_weight_fee: 1_630_678u64.into(),
			}),
			tip: NumberOrHex::Number(0),
		};
		let converted = convert_fee_details(details).unwrap();
		let fee = converted.inclusion_fee.unwrap();
		assert_eq!(fee.base_fee, 1_000_000);
		assert_eq!(fee.len_fee, 145);
		assert_eq!(fee.adjusted_weight_fee, 1_630_678);
	}

	#[test]
	fn overflowing_hex_component_is_rejected() {
		let details = FeeDetails::<NumberOrHex> {
			inclusion_fee: Some(InclusionFee {
				base_fee: NumberOrHex::Hex(sp_core::U256::MAX),
				len_fee: NumberOrHex::Number(0),
				adjusted_weight_fee: NumberOrHex::Number(0),
			}),
			tip: NumberOrHex::Number(0),
		};
		assert!(matches!(convert_fee_details(details), Err(Error::TryFromIntError)));
	}
}
