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
	api::{Api, Result},
	rpc::Request,
	rpc_params, storage_key, Balance, Hash,
};
use codec::Decode;
use sp_core::Bytes;

/// Aggregate balance state of the balances pallet.
#[async_trait::async_trait(?Send)]
pub trait GetBalanceState {
	/// The total units issued in the chain, zero before genesis endowment.
	async fn get_total_issuance(&self, at_block: Option<Hash>) -> Result<Balance>;
}

#[async_trait::async_trait(?Send)]
impl<Client: Request> GetBalanceState for Api<Client> {
	async fn get_total_issuance(&self, at_block: Option<Hash>) -> Result<Balance> {
		let key = storage_key("Balances", "TotalIssuance");
		let issuance: Option<Bytes> =
			self.client().request("state_getStorage", rpc_params![key, at_block]).await?;
		match issuance {
			Some(bytes) => Ok(Balance::decode(&mut bytes.0.as_slice())?),
			None => Ok(0),
		}
	}
}
