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

//! Offline composition and signing of the extrinsics the scenarios submit.
//! Call indices come from the injected runtime fixture instead of from node
//! metadata; the fixture is the source of truth for the runtime under test.

pub use balances::{BalancesExtrinsics, TransferAllowDeathCall};
pub use sudo::{FillBlockCall, SudoCall, SudoExtrinsics};
pub use xt_primitives::{
	AdditionalSigned, CallIndex, GenericAddress, GenericExtra, OpaqueCall, SignedPayload,
	UncheckedExtrinsicV4,
};

pub mod balances;
pub mod sudo;
pub mod xt_primitives;

use crate::{
	api::{Api, Error, GetAccountInfo, Result},
	rpc::Request,
	Balance,
};
use codec::Encode;
use log::debug;
use sp_core::Pair;
use sp_runtime::MultiSignature;

impl<Client: Request> Api<Client> {
	/// Sign `call` with the configured signer, using an immortal era and the
	/// signer's on-chain nonce.
	pub async fn sign_extrinsic<Call: Encode + Clone>(
		&self,
		call: Call,
		tip: Balance,
	) -> Result<UncheckedExtrinsicV4<Call>> {
		let signer = self.signer().ok_or(Error::NoSigner)?;
		let account = self.signer_account().ok_or(Error::NoSigner)?;
		let nonce = self.get_nonce(&account).await?;
		debug!("signing extrinsic with nonce {} and tip {}", nonce, tip);

		let extra = GenericExtra::immortal_with_tip(nonce, tip);
		let additional: AdditionalSigned = (
			self.runtime_version().spec_version,
			self.runtime_version().transaction_version,
			self.genesis_hash(),
			self.genesis_hash(),
		);
		let signature = SignedPayload::from_raw(call.clone(), extra.clone(), additional)
			.using_encoded(|payload| signer.sign(payload));

		Ok(UncheckedExtrinsicV4::new_signed(
			call,
			GenericAddress::Id(account),
			MultiSignature::Sr25519(signature),
			extra,
		))
	}
}
