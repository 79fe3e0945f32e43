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

use std::boxed::Box;

pub type Result<T> = core::result::Result<T, Error>;

/// Transport failures. Never recovered by the harness, a failed or hanging
/// rpc call aborts the running scenario.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Serde json error: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("Could not convert to valid Url: {0}")]
	Url(String),
	#[error("Websocket connection was closed unexpectedly")]
	ConnectionClosed,
	#[error("Method {0} is not supported by this backend")]
	UnsupportedMethod(String),
	#[error("Malformed request parameters: {0}")]
	InvalidParams(String),
	#[error(transparent)]
	Client(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}
