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

use super::{CallIndex, UncheckedExtrinsicV4};
use crate::{
	api::{Api, Result},
	rpc::Request,
};
use sp_runtime::Perbill;

pub type SudoCall<Inner> = (CallIndex, Inner);
pub type FillBlockCall = (CallIndex, Perbill);

/// Root-origin extrinsics, dispatched through the sudo pallet. Only used to
/// drive the chain through near-full blocks in the load scenario.
#[async_trait::async_trait(?Send)]
pub trait SudoExtrinsics {
	/// `RootTesting::fill_block(ratio)`, wrapped in `Sudo::sudo`.
	async fn sudo_fill_block(
		&self,
		ratio: Perbill,
	) -> Result<UncheckedExtrinsicV4<SudoCall<FillBlockCall>>>;
}

#[async_trait::async_trait(?Send)]
impl<Client: Request> SudoExtrinsics for Api<Client> {
	async fn sudo_fill_block(
		&self,
		ratio: Perbill,
	) -> Result<UncheckedExtrinsicV4<SudoCall<FillBlockCall>>> {
		let call = (self.fixture().sudo_call, (self.fixture().fill_block_call, ratio));
		self.sign_extrinsic(call, 0).await
	}
}
