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
	primitives::{EventRecord, SignedBlock},
	rpc::Request,
	rpc_params, storage_key, Hash,
};
use codec::Decode;
use log::debug;
use sp_core::Bytes;

/// Block and event queries.
#[async_trait::async_trait(?Send)]
pub trait GetChainInfo {
	async fn get_block_hash(&self, number: Option<u32>) -> Result<Option<Hash>>;

	async fn get_signed_block(&self, hash: Option<Hash>) -> Result<Option<SignedBlock>>;

	/// The opaque extrinsics included in the given block,
	/// `Error::BlockNotFound` if the node does not know the hash.
	async fn get_block_extrinsics(&self, hash: Hash) -> Result<Vec<Bytes>>;

	/// Fetch all events the execution of the given block emitted.
	async fn fetch_events(&self, block_hash: Hash) -> Result<Vec<EventRecord>>;
}

#[async_trait::async_trait(?Send)]
impl<Client: Request> GetChainInfo for Api<Client> {
	async fn get_block_hash(&self, number: Option<u32>) -> Result<Option<Hash>> {
		let block_hash = self.client().request("chain_getBlockHash", rpc_params![number]).await?;
		Ok(block_hash)
	}

	async fn get_signed_block(&self, hash: Option<Hash>) -> Result<Option<SignedBlock>> {
		let block = self.client().request("chain_getBlock", rpc_params![hash]).await?;
		Ok(block)
	}

	async fn get_block_extrinsics(&self, hash: Hash) -> Result<Vec<Bytes>> {
		let signed_block = self.get_signed_block(Some(hash)).await?.ok_or(Error::BlockNotFound)?;
		Ok(signed_block.block.extrinsics)
	}

	async fn fetch_events(&self, block_hash: Hash) -> Result<Vec<EventRecord>> {
		let key = storage_key("System", "Events");
		let event_bytes: Option<Bytes> = self
			.client()
			.request("state_getStorage", rpc_params![key, block_hash])
			.await?;
		let event_bytes = event_bytes.ok_or(Error::BlockNotFound)?;
		let records = Vec::<EventRecord>::decode(&mut event_bytes.0.as_slice())?;
		debug!("fetched {} events for block {:?}", records.len(), block_hash);
		Ok(records)
	}
}
