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
	api::{chain::GetChainInfo, Api, Result},
	primitives::CreatedBlock,
	rpc::Request,
	rpc_params, Hash,
};
use log::debug;
use sp_core::Bytes;

/// Where a submitted transaction ended up after a round of manual sealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedExtrinsic {
	/// Hash of the block the seal produced.
	pub block_hash: Hash,
	/// Whether the submitted transaction is among the block's extrinsics. A
	/// reserved inherent slot can push it into the next block.
	pub included: bool,
}

/// Transaction submission and manual block sealing.
#[async_trait::async_trait(?Send)]
pub trait SubmitAndMine {
	/// Submit an opaque extrinsic to the transaction pool.
	async fn submit_extrinsic(&self, encoded: Bytes) -> Result<Hash>;

	/// Ask the manual-seal authorship task for a new block.
	async fn create_block(&self, create_empty: bool, finalize: bool) -> Result<CreatedBlock>;

	/// Submit `encoded` and seal one block, reporting whether that block
	/// picked the transaction up.
	async fn submit_and_mine(&self, encoded: Bytes) -> Result<MinedExtrinsic>;
}

#[async_trait::async_trait(?Send)]
impl<Client: Request> SubmitAndMine for Api<Client> {
	async fn submit_extrinsic(&self, encoded: Bytes) -> Result<Hash> {
		let xt_hash =
			self.client().request("author_submitExtrinsic", rpc_params![encoded]).await?;
		debug!("submitted extrinsic {:?}", xt_hash);
		Ok(xt_hash)
	}

	async fn create_block(&self, create_empty: bool, finalize: bool) -> Result<CreatedBlock> {
		let created: CreatedBlock = self
			.client()
			.request("engine_createBlock", rpc_params![create_empty, finalize])
			.await?;
		debug!("sealed block {:?}", created.hash);
		Ok(created)
	}

	async fn submit_and_mine(&self, encoded: Bytes) -> Result<MinedExtrinsic> {
		let xt_hash = self.submit_extrinsic(encoded.clone()).await?;
		let created = self.create_block(false, true).await?;
		let extrinsics = self.get_block_extrinsics(created.hash).await?;
		let included = extrinsics.iter().any(|xt| xt.0 == encoded.0);
		if !included {
			debug!("extrinsic {:?} missing from block {:?}", xt_hash, created.hash);
		}
		Ok(MinedExtrinsic { block_hash: created.hash, included })
	}
}
