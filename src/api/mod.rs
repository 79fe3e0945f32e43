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

//! Typed adapter over a node's rpc surface. Generic over the rpc backend, so
//! scenarios run unchanged against a live node or the in-process simulator.

pub use author::{MinedExtrinsic, SubmitAndMine};
pub use balances::GetBalanceState;
pub use chain::GetChainInfo;
pub use error::{ensure_eq, Error, InvariantViolation, Result};
pub use frame_system::GetAccountInfo;
pub use transaction_payment::GetTransactionPayment;

pub mod author;
pub mod balances;
pub mod chain;
pub mod error;
pub mod frame_system;
pub mod transaction_payment;

use crate::{
	config::RuntimeFeeFixture,
	primitives::RuntimeVersion,
	rpc::Request,
	rpc_params, Hash,
};
use codec::Decode;
use log::{debug, info};
use sp_core::{sr25519, Bytes, Pair};
use sp_runtime::{traits::IdentifyAccount, AccountId32, MultiSigner};

/// Api to talk to a substrate node.
///
/// Caches the genesis hash and runtime version needed for offline signing,
/// and carries the fee fixture of the runtime under test.
#[derive(Clone)]
pub struct Api<Client> {
	signer: Option<sr25519::Pair>,
	genesis_hash: Hash,
	runtime_version: RuntimeVersion,
	fixture: RuntimeFeeFixture,
	client: Client,
}

impl<Client: Request> Api<Client> {
	pub async fn new(client: Client, fixture: RuntimeFeeFixture) -> Result<Self> {
		let genesis_hash = fetch_genesis_hash(&client).await?;
		let runtime_version: RuntimeVersion =
			client.request("state_getRuntimeVersion", rpc_params![]).await?;
		info!(
			"connected to {} (spec {}, tx version {}), genesis hash {:?}",
			runtime_version.spec_name,
			runtime_version.spec_version,
			runtime_version.transaction_version,
			genesis_hash
		);
		Ok(Self { signer: None, genesis_hash, runtime_version, fixture, client })
	}

	/// Set the api signer account.
	pub fn set_signer(&mut self, signer: sr25519::Pair) {
		self.signer = Some(signer);
	}

	/// Get the private key pair of the api signer.
	pub fn signer(&self) -> Option<&sr25519::Pair> {
		self.signer.as_ref()
	}

	/// Get the public account id of the api signer.
	pub fn signer_account(&self) -> Option<AccountId32> {
		let pair = self.signer.as_ref()?;
		Some(MultiSigner::from(pair.public()).into_account())
	}

	/// Get the cached genesis hash of the node.
	pub fn genesis_hash(&self) -> Hash {
		self.genesis_hash
	}

	/// Get the cached runtime version of the node.
	pub fn runtime_version(&self) -> &RuntimeVersion {
		&self.runtime_version
	}

	/// The fee fixture of the runtime under test.
	pub fn fixture(&self) -> &RuntimeFeeFixture {
		&self.fixture
	}

	/// Get the rpc client.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Execute a runtime api call at `at_block` via `state_call` and decode
	/// the SCALE-encoded answer.
	pub async fn runtime_call<V: Decode>(
		&self,
		method: &str,
		data: Vec<u8>,
		at_block: Option<Hash>,
	) -> Result<V> {
		debug!("state_call {} with {} payload bytes", method, data.len());
		let result: Bytes = self
			.client
			.request("state_call", rpc_params![method, Bytes(data), at_block])
			.await?;
		Ok(V::decode(&mut result.0.as_slice())?)
	}
}

async fn fetch_genesis_hash<Client: Request>(client: &Client) -> Result<Hash> {
	let genesis_hash: Option<Hash> =
		client.request("chain_getBlockHash", rpc_params![0u32]).await?;
	genesis_hash.ok_or(Error::FetchGenesisHash)
}
