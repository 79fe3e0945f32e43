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

//! End-to-end fee reconciliation against the in-process node simulator.

use substrate_fee_verifier::{
	api::{Api, Error, GetTransactionPayment},
	harness::{dev_account, dev_signer, mine_empty_blocks, ScenarioRunner, TRANSFER_AMOUNT},
	rpc::SimulatedNode,
	Balance, RuntimeFeeFixture, Weight,
};
use test_case::test_case;

const ENDOWMENT: Balance = 1 << 50;

async fn signing_api(node: &SimulatedNode) -> Api<SimulatedNode> {
	let _ = env_logger::try_init();
	let alice = dev_signer("//Alice").unwrap();
	node.endow(&dev_account("//Alice").unwrap(), ENDOWMENT);
	let mut api = Api::new(node.clone(), RuntimeFeeFixture::dev()).await.unwrap();
	api.set_signer(alice);
	api
}

#[tokio::test]
async fn transfer_fee_reconciles_across_all_sources() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let fixture = api.fixture().clone();
	let runner = ScenarioRunner::new(&api, dev_account("//Bob").unwrap());

	let report = runner.verify_transfer_fee().await.unwrap();

	// the dispatched weight is the known reference point of the runtime
	assert_eq!(report.weight, fixture.reference_weight);
	// with a per-byte length fee of one unit the settled fee decomposes
	// into the reference weight fee plus the encoded length
	assert_eq!(
		report.actual_fee,
		fixture.reference_weight_fee + report.encoded_len as Balance
	);
	assert_eq!(report.tip, 0);
	assert_eq!(report.partial_fee, report.actual_fee);
}

#[tokio::test]
async fn tip_lands_on_top_of_the_inclusion_fee() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let runner = ScenarioRunner::new(&api, dev_account("//Bob").unwrap());

	let plain = runner.verify_transfer_fee().await.unwrap();
	let tipped = runner.verify_tipped_transfer_fee(5_000).await.unwrap();

	assert_eq!(tipped.tip, 5_000);
	// the tip's compact encoding costs one extra byte of length fee
	assert_eq!(tipped.encoded_len, plain.encoded_len + 1);
	assert_eq!(tipped.actual_fee, plain.actual_fee + 5_000 + 1);
	assert_eq!(tipped.partial_fee, plain.partial_fee + 1);
}

#[tokio::test]
async fn transfer_deferred_by_a_reserved_slot_still_reconciles() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let runner = ScenarioRunner::new(&api, dev_account("//Bob").unwrap());

	// move to block 4 so the next seal hits the reserved slot
	mine_empty_blocks(&api, 4).await.unwrap();
	let report = runner.verify_transfer_fee().await.unwrap();

	// reserved slot plus the supplementary block
	assert_eq!(node.block_count(), 6);
	assert_eq!(report.weight, api.fixture().reference_weight);
}

#[tokio::test]
async fn the_whole_fee_is_burned_from_issuance() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let runner = ScenarioRunner::new(&api, dev_account("//Bob").unwrap());

	let burned = runner.verify_fee_burn().await.unwrap();
	assert!(burned >= api.fixture().base_fee);
	assert_eq!(node_issuance(&api).await, ENDOWMENT - burned);
}

async fn node_issuance(api: &Api<SimulatedNode>) -> Balance {
	use substrate_fee_verifier::api::GetBalanceState;
	api.get_total_issuance(None).await.unwrap()
}

#[tokio::test]
async fn failed_dispatch_reports_a_violation_instead_of_panicking() {
	let node = SimulatedNode::new();
	// Dave covers the inclusion fee but not fee plus amount: the transfer
	// passes pool validation, pays its fee, and fails in the block
	node.endow(&dev_account("//Dave").unwrap(), 3_000_000);
	let mut api = Api::new(node.clone(), RuntimeFeeFixture::dev()).await.unwrap();
	api.set_signer(dev_signer("//Dave").unwrap());

	let verifier = substrate_fee_verifier::verify::FeeVerifier::new(&api);
	let result = verifier.verify_transfer(dev_account("//Bob").unwrap(), 2_000_000, 0).await;
	match result {
		Err(Error::InvariantViolation(violation)) => {
			assert_eq!(violation.check, "sender balance drops by transfer amount plus fee");
		},
		other => panic!("expected a balance violation, got {other:?}"),
	}
}

#[tokio::test]
async fn broke_sender_is_rejected_at_the_pool() {
	let node = SimulatedNode::new();
	let alice = dev_account("//Alice").unwrap();
	// Charlie holds less than any inclusion fee
	node.endow(&dev_account("//Charlie").unwrap(), 1_000);
	let mut api = Api::new(node.clone(), RuntimeFeeFixture::dev()).await.unwrap();
	api.set_signer(dev_signer("//Charlie").unwrap());

	let runner = ScenarioRunner::new(&api, alice);
	let result = runner.verify_transfer_fee().await;
	assert!(matches!(result, Err(Error::RpcClient(_))), "got {result:?}");
	// nothing was mined, nothing was charged
	assert_eq!(node.block_count(), 0);
}

#[test_case(0; "no proof size")]
#[test_case(3_593; "reference proof size")]
#[test_case(1 << 30; "gigabyte proof size")]
#[tokio::test]
async fn weight_to_fee_depends_only_on_ref_time(proof_size: u64) {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let fixture = api.fixture().clone();

	let fee = api
		.query_weight_to_fee(
			Weight::from_parts(fixture.reference_weight.ref_time, proof_size),
			None,
		)
		.await
		.unwrap();
	assert_eq!(fee, fixture.reference_weight_fee);
}

#[tokio::test]
async fn quoted_fee_components_sum_to_the_quote() {
	let node = SimulatedNode::new();
	let api = signing_api(&node).await;
	let bob = dev_account("//Bob").unwrap();

	use codec::Encode;
	use substrate_fee_verifier::extrinsic::BalancesExtrinsics;
	let xt = api.balance_transfer_allow_death(bob, TRANSFER_AMOUNT, 0).await.unwrap();
	let encoded = sp_core::Bytes(xt.encode());

	let info = api.get_payment_info(encoded.clone(), None).await.unwrap();
	let details = api.get_fee_details(encoded, None).await.unwrap();
	let inclusion = details.inclusion_fee.unwrap();

	assert_eq!(inclusion.base_fee, api.fixture().base_fee);
	assert_eq!(inclusion.inclusion_fee(), info.partial_fee);
}
