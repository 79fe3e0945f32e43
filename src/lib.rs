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

//! Fee-verification harness for Substrate development nodes.
//!
//! Connects to a node with manual seal enabled, submits signed extrinsics,
//! drives block production and cross-checks the fees reported by the
//! transaction-payment pallet against the node's own pre-execution estimates
//! (`payment_queryInfo`, `payment_queryFeeDetails`) and its weight-to-fee
//! conversion. Also verifies that fees are burned from total issuance and
//! that the steady-state fee does not drift under sustained block load.

use sp_core::storage::StorageKey;
use sp_crypto_hashing::{blake2_128, twox_128};

pub use api::{Api, Error, Result};
pub use config::RuntimeFeeFixture;
pub use primitives::*;

pub mod api;
pub mod config;
pub mod events;
pub mod extrinsic;
pub mod harness;
pub mod primitives;
pub mod rpc;
pub mod verify;

/// The balance type of the runtimes under test.
pub type Balance = u128;
/// The hash type of the runtimes under test.
pub type Hash = sp_core::H256;
/// The account id type of the runtimes under test.
pub type AccountId = sp_runtime::AccountId32;

/// Returns the concatenated 128 bit hash of the given module and specific storage key
/// as a full Substrate StorageKey.
pub fn storage_key(module: &str, storage_key_name: &str) -> StorageKey {
	let mut key = twox_128(module.as_bytes()).to_vec();
	key.extend(twox_128(storage_key_name.as_bytes()));
	StorageKey(key)
}

/// Returns the StorageKey of a blake2_128_concat storage map entry.
pub fn storage_map_key(
	module: &str,
	storage_key_name: &str,
	encoded_map_key: &[u8],
) -> StorageKey {
	let mut key = storage_key(module, storage_key_name).0;
	key.extend(blake2_128(encoded_map_key));
	key.extend(encoded_map_key);
	StorageKey(key)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn storage_map_key_appends_hash_and_raw_key() {
		let account = [7u8; 32];
		let key = storage_map_key("System", "Account", &account);
		// 2 * twox128 + blake2_128 + raw key
		assert_eq!(key.0.len(), 16 + 16 + 16 + 32);
		assert_eq!(&key.0[..32], &storage_key("System", "Account").0[..]);
		assert_eq!(&key.0[48..], &account[..]);
	}
}
