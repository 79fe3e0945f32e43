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

//! The transport seam of the harness: a json-rpc `Request` trait plus the
//! available backends (websocket for live nodes, an in-process simulator for
//! offline runs).

pub use error::{Error, Result};
pub use params::RpcParams;

#[cfg(feature = "jsonrpsee-client")]
pub use jsonrpsee_client::JsonrpseeClient;
pub use mocks::SimulatedNode;

pub mod error;
#[cfg(feature = "jsonrpsee-client")]
pub mod jsonrpsee_client;
pub mod mocks;
pub mod params;

use serde::de::DeserializeOwned;

/// Trait to be implemented by the client backends for sending rpc requests.
#[async_trait::async_trait(?Send)]
pub trait Request {
	/// Sends a RPC request to the node and returns the deserialized answer.
	async fn request<R: DeserializeOwned>(&self, method: &str, params: RpcParams) -> Result<R>;
}
