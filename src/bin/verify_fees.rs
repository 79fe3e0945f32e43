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

//! Run the fee scenarios against a development node with manual seal,
//! e.g. one started with `--dev --sealing manual`.
//!
//! Usage: `verify_fees [ws://127.0.0.1:9944]`

use substrate_fee_verifier::{
	api::{Api, Result},
	harness::{dev_account, dev_signer, ScenarioRunner},
	rpc::JsonrpseeClient,
	RuntimeFeeFixture,
};

#[tokio::main]
async fn main() {
	env_logger::init();
	if let Err(e) = run().await {
		log::error!("fee verification failed: {e:?}");
		std::process::exit(1);
	}
	println!("all fee scenarios passed");
}

async fn run() -> Result<()> {
	let client = match std::env::args().nth(1) {
		Some(url) => JsonrpseeClient::new(&url).await?,
		None => JsonrpseeClient::with_default_url().await?,
	};
	let mut api = Api::new(client, RuntimeFeeFixture::dev()).await?;
	api.set_signer(dev_signer("//Alice")?);

	let runner = ScenarioRunner::new(&api, dev_account("//Bob")?);
	let report = runner.verify_transfer_fee().await?;
	println!(
		"transfer fee {} settled in block {:?} ({} bytes, weight {:?})",
		report.actual_fee, report.block_hash, report.encoded_len, report.weight
	);
	let tipped = runner.verify_tipped_transfer_fee(1_000).await?;
	println!("tipped transfer fee {} (tip {})", tipped.actual_fee, tipped.tip);
	let burned = runner.verify_fee_burn().await?;
	println!("fee of {burned} burned from total issuance");
	runner.verify_fee_stability_under_load().await?;
	Ok(())
}
