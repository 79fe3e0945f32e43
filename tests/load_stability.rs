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

//! Fee stability under sustained block load, against the node simulator.

use substrate_fee_verifier::{
	api::{Api, GetBalanceState},
	harness::{dev_account, dev_signer, ScenarioRunner, LOAD_BLOCKS},
	rpc::SimulatedNode,
	Balance, RuntimeFeeFixture,
};

const ENDOWMENT: Balance = 1 << 50;

async fn signing_api(node: &SimulatedNode) -> Api<SimulatedNode> {
	let _ = env_logger::try_init();
	node.endow(&dev_account("//Alice").unwrap(), ENDOWMENT);
	let mut api = Api::new(node.clone(), RuntimeFeeFixture::dev()).await.unwrap();
	api.set_signer(dev_signer("//Alice").unwrap());
	api
}

#[tokio::test]
async fn fee_does_not_drift_across_a_hundred_full_blocks() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let runner = ScenarioRunner::new(&api, dev_account("//Bob").unwrap());

	runner.verify_fee_stability_under_load().await.unwrap();

	// every fill transaction got mined, reserved slots added extra blocks;
	// each supplementary block shifts later iterations onto later numbers,
	// so of period blocks only period - 1 carry a fill transaction
	let period = api.fixture().block_fill_period;
	assert!(node.block_count() >= LOAD_BLOCKS);
	assert!(node.block_count() <= LOAD_BLOCKS + LOAD_BLOCKS / (period - 1) + 1);
}

#[tokio::test]
async fn load_burns_the_fill_fees_from_issuance() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let runner = ScenarioRunner::new(&api, dev_account("//Bob").unwrap());

	let issuance_before = api.get_total_issuance(None).await.unwrap();
	runner.verify_fee_stability_under_load().await.unwrap();
	let issuance_after = api.get_total_issuance(None).await.unwrap();

	let burned = issuance_before - issuance_after;
	// every fill transaction costs at least the base fee
	assert!(burned >= LOAD_BLOCKS as Balance * api.fixture().base_fee);
}

#[tokio::test]
async fn transfer_still_reconciles_after_load() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let runner = ScenarioRunner::new(&api, dev_account("//Bob").unwrap());

	runner.verify_fee_stability_under_load().await.unwrap();
	let report = runner.verify_transfer_fee().await.unwrap();
	assert_eq!(report.weight, api.fixture().reference_weight);
}
