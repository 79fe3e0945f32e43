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
	primitives::AccountInfo,
	rpc::Request,
	rpc_params, storage_map_key, Balance, Hash,
};
use codec::{Decode, Encode};
use sp_core::Bytes;
use sp_runtime::AccountId32;

/// Account state from the system pallet.
#[async_trait::async_trait(?Send)]
pub trait GetAccountInfo {
	async fn get_account_info(
		&self,
		account: &AccountId32,
		at_block: Option<Hash>,
	) -> Result<Option<AccountInfo>>;

	/// The free balance of `account`, zero if the account does not exist.
	async fn get_free_balance(
		&self,
		account: &AccountId32,
		at_block: Option<Hash>,
	) -> Result<Balance>;

	/// The next transaction index of `account`, zero if the account does not
	/// exist.
	async fn get_nonce(&self, account: &AccountId32) -> Result<u32>;
}

#[async_trait::async_trait(?Send)]
impl<Client: Request> GetAccountInfo for Api<Client> {
	async fn get_account_info(
		&self,
		account: &AccountId32,
		at_block: Option<Hash>,
	) -> Result<Option<AccountInfo>> {
		let key = storage_map_key("System", "Account", &account.encode());
		let info: Option<Bytes> =
			self.client().request("state_getStorage", rpc_params![key, at_block]).await?;
		match info {
			Some(bytes) => Ok(Some(AccountInfo::decode(&mut bytes.0.as_slice())?)),
			None => Ok(None),
		}
	}

	async fn get_free_balance(
		&self,
		account: &AccountId32,
		at_block: Option<Hash>,
	) -> Result<Balance> {
		let info = self.get_account_info(account, at_block).await?;
		Ok(info.map(|info| info.data.free).unwrap_or_default())
	}

	async fn get_nonce(&self, account: &AccountId32) -> Result<u32> {
		let info = self.get_account_info(account, None).await?;
		Ok(info.map(|info| info.nonce).unwrap_or_default())
	}
}
