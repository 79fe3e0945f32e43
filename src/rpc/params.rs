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

//! Positional json-rpc parameters, backend independent.

use serde::Serialize;
use serde_json::Value;

/// Builder for a positional parameter list.
#[derive(Debug, Default)]
pub struct RpcParams {
	values: Vec<Value>,
}

impl RpcParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a plain value into the builder.
	pub fn insert<P: Serialize>(&mut self, value: P) -> serde_json::Result<()> {
		self.values.push(serde_json::to_value(value)?);
		Ok(())
	}

	/// Finish the building process and return a JSON compatible string,
	/// `None` for an empty parameter list.
	pub fn build(self) -> Option<String> {
		if self.values.is_empty() {
			None
		} else {
			Some(Value::Array(self.values).to_string())
		}
	}

	/// The parameters as parsed values, for backends that interpret them
	/// in-process.
	pub fn to_values(self) -> Vec<Value> {
		self.values
	}
}

/// Convenience for the majority case of literal positional parameters.
#[macro_export]
macro_rules! rpc_params {
	($($param:expr),*) => {{
		#[allow(unused_mut)]
		let mut params = $crate::rpc::RpcParams::new();
		$(
			params.insert($param).expect("json serialization of rpc params is infallible; qed");
		)*
		params
	}};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_params_build_to_none() {
		assert_eq!(RpcParams::new().build(), None);
	}

	#[test]
	fn params_build_to_json_array() {
		let params = crate::rpc_params!["0xdeadbeef", Option::<u32>::None, 5u32];
		assert_eq!(params.build().unwrap(), r#"["0xdeadbeef",null,5]"#);
	}
}
