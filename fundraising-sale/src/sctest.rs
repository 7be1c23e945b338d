use crate::{test_infrastructure::*, *};
use std::sync::atomic::{AtomicU8, Ordering};

static ADDRESS_COUNTER: AtomicU8 = AtomicU8::new(10);
const OWNER_ACC: AccountAddress = AccountAddress([0u8; 32]);
const SELF_ADDRESS: ContractAddress = ContractAddress {
    index: 1,
    subindex: 0,
};
const SALE_START_MILLIS: u64 = 1_000;

fn new_account() -> AccountAddress {
    AccountAddress([ADDRESS_COUNTER.fetch_add(1, Ordering::SeqCst); 32])
}

fn ccd(micro: u64) -> Amount {
    Amount::from_micro_ccd(micro)
}

fn at(millis: u64) -> Timestamp {
    Timestamp::from_timestamp_millis(millis)
}

/// Bounds used throughout the tests: 100 / 1000 / 5000 / 200.
pub(crate) fn sale_terms() -> SaleTerms {
    SaleTerms::new(ccd(100), ccd(1000), ccd(5000), ccd(200)).unwrap_abort()
}

fn receive_context(
    sender: Address,
    slot_time: Timestamp,
    parameter_bytes: &[u8],
) -> TestReceiveContext {
    let mut ctx = TestReceiveContext::empty();
    ctx.set_self_address(SELF_ADDRESS);
    ctx.set_owner(OWNER_ACC);
    ctx.set_sender(sender);
    ctx.set_metadata_slot_time(slot_time);
    ctx.set_parameter(parameter_bytes);
    ctx
}

fn fresh_host() -> TestHost<State<TestStateApi>> {
    let mut state_builder = TestStateBuilder::new();
    let state = State::new(&mut state_builder, OWNER_ACC);
    TestHost::new(state, state_builder)
}

/// Host with a sale started at `SALE_START_MILLIS`.
fn started_host() -> TestHost<State<TestStateApi>> {
    let mut state_builder = TestStateBuilder::new();
    let mut state = State::new(&mut state_builder, OWNER_ACC);
    state
        .start(sale_terms(), at(SALE_START_MILLIS))
        .unwrap_abort();
    TestHost::new(state, state_builder)
}

mod admin;
mod participant;

#[concordium_cfg_test]
mod test_init {
    use super::*;

    #[concordium_test]
    /// Test that init records the origin as owner and leaves the sale unstarted.
    fn test_init() {
        let mut state_builder = TestStateBuilder::new();
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER_ACC);
        ctx.set_metadata_slot_time(at(1));

        let result = contract_init(&ctx, &mut state_builder);
        claim!(result.is_ok());
        let state = result.unwrap();

        claim_eq!(state.owner, OWNER_ACC);
        claim_eq!(state.stage, SaleStage::NotStarted);
        claim_eq!(state.terms, None);
        claim_eq!(state.sale_start, None);
        claim_eq!(state.total_allocated, Amount::zero());
        claim!(!state.everyone_allowed);
        claim_eq!(state.allowed.iter().count(), 0);
        claim_eq!(state.allocations.iter().count(), 0);
    }

    #[concordium_test]
    /// Test that two instances do not share any state.
    fn test_instances_are_isolated() {
        let mut first = started_host();
        let second = started_host();
        let user = new_account();
        first
            .state_mut()
            .allow_participants(vec![Address::Account(user)]);
        claim!(first.state().is_allowed_to_participate(&Address::Account(user)));
        claim!(!second.state().is_allowed_to_participate(&Address::Account(user)));
    }
}
