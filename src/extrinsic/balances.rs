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

use super::{CallIndex, GenericAddress, UncheckedExtrinsicV4};
use crate::{
	api::{Api, Result},
	rpc::Request,
	Balance,
};
use codec::Compact;
use sp_runtime::AccountId32;

pub type TransferAllowDeathCall = (CallIndex, GenericAddress, Compact<Balance>);

/// Extrinsics of the balances pallet.
#[async_trait::async_trait(?Send)]
pub trait BalancesExtrinsics {
	/// Transfer some liquid free balance to another account, allowing the
	/// sender to be killed if its balance drops below the existential
	/// deposit.
	async fn balance_transfer_allow_death(
		&self,
		to: AccountId32,
		amount: Balance,
		tip: Balance,
	) -> Result<UncheckedExtrinsicV4<TransferAllowDeathCall>>;
}

#[async_trait::async_trait(?Send)]
impl<Client: Request> BalancesExtrinsics for Api<Client> {
	async fn balance_transfer_allow_death(
		&self,
		to: AccountId32,
		amount: Balance,
		tip: Balance,
	) -> Result<UncheckedExtrinsicV4<TransferAllowDeathCall>> {
		let call = (
			self.fixture().transfer_allow_death_call,
			GenericAddress::Id(to),
			Compact(amount),
		);
		self.sign_extrinsic(call, tip).await
	}
}
