use crate::state::{State, *};
use concordium_std::*;

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub(crate) struct ViewResponse {
    pub(crate) owner: AccountAddress,
    pub(crate) stage: SaleStage,
    pub(crate) was_started: bool,
    pub(crate) was_closed: bool,
    pub(crate) is_active: bool,
    pub(crate) sale_start: Option<Timestamp>,
    pub(crate) minimum_allocation: Amount,
    pub(crate) maximum_allocation: Amount,
    pub(crate) total_allocations_limit: Amount,
    pub(crate) close_allocations_remainder: Amount,
    pub(crate) total_allocated: Amount,
    pub(crate) is_everyone_allowed_to_participate: bool,
    pub(crate) are_allocations_accepted: bool,
    pub(crate) can_close: bool,
}

#[receive(
    contract = "fundraising_sale",
    name = "view",
    return_value = "ViewResponse"
)]
fn contract_view<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResponse> {
    let state = host.state();

    Ok(ViewResponse {
        owner: state.owner,
        stage: state.stage,
        was_started: state.was_started(),
        was_closed: state.was_closed(),
        is_active: state.is_active(),
        sale_start: state.sale_start,
        minimum_allocation: state.minimum_allocation(),
        maximum_allocation: state.maximum_allocation(),
        total_allocations_limit: state.total_allocations_limit(),
        close_allocations_remainder: state.close_allocations_remainder(),
        total_allocated: state.total_allocated,
        is_everyone_allowed_to_participate: state.everyone_allowed,
        are_allocations_accepted: state.are_allocations_accepted(),
        can_close: state.can_close(ctx.metadata().slot_time()),
    })
}

// ------------------------------------------

type ViewAllocationsResponse = Vec<(Address, Amount)>;

#[receive(
    contract = "fundraising_sale",
    name = "viewAllocations",
    return_value = "ViewAllocationsResponse"
)]
fn contract_view_allocations<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewAllocationsResponse> {
    let state = host.state();

    let mut ret: Vec<(Address, Amount)> = Vec::new();
    for (addr, amount) in state.allocations.iter() {
        ret.push((*addr, *amount));
    }

    Ok(ret)
}

type ViewAllowedResponse = Vec<Address>;

#[receive(
    contract = "fundraising_sale",
    name = "viewAllowed",
    return_value = "ViewAllowedResponse"
)]
fn contract_view_allowed<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewAllowedResponse> {
    Ok(host.state().allowed.iter().map(|addr| *addr).collect())
}

// ------------------------------------------
// per participant

#[receive(
    contract = "fundraising_sale",
    name = "allocation",
    parameter = "Address",
    return_value = "Amount"
)]
fn contract_allocation<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    let participant: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().allocation(&participant))
}

#[receive(
    contract = "fundraising_sale",
    name = "canAllocate",
    parameter = "Address",
    return_value = "bool"
)]
fn contract_can_allocate<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    let participant: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().can_allocate(&participant))
}

#[receive(
    contract = "fundraising_sale",
    name = "isAllowedToParticipate",
    parameter = "Address",
    return_value = "bool"
)]
fn contract_is_allowed_to_participate<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    let participant: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().is_allowed_to_participate(&participant))
}

// ------------------------------------------
// sale wide

#[receive(contract = "fundraising_sale", name = "owner", return_value = "AccountAddress")]
fn contract_owner<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<AccountAddress> {
    Ok(host.state().owner)
}

#[receive(
    contract = "fundraising_sale",
    name = "areAllocationsAccepted",
    return_value = "bool"
)]
fn contract_are_allocations_accepted<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().are_allocations_accepted())
}

#[receive(contract = "fundraising_sale", name = "canClose", return_value = "bool")]
fn contract_can_close<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().can_close(ctx.metadata().slot_time()))
}

#[receive(
    contract = "fundraising_sale",
    name = "closeAllocationsRemainder",
    return_value = "Amount"
)]
fn contract_close_allocations_remainder<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().close_allocations_remainder())
}

#[receive(contract = "fundraising_sale", name = "isActive", return_value = "bool")]
fn contract_is_active<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().is_active())
}

#[receive(
    contract = "fundraising_sale",
    name = "isEveryoneAllowedToParticipate",
    return_value = "bool"
)]
fn contract_is_everyone_allowed_to_participate<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().everyone_allowed)
}

#[receive(
    contract = "fundraising_sale",
    name = "minimumAllocation",
    return_value = "Amount"
)]
fn contract_minimum_allocation<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().minimum_allocation())
}

#[receive(
    contract = "fundraising_sale",
    name = "maximumAllocation",
    return_value = "Amount"
)]
fn contract_maximum_allocation<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().maximum_allocation())
}

/// `None` until the sale is started.
#[receive(
    contract = "fundraising_sale",
    name = "saleStart",
    return_value = "Option<Timestamp>"
)]
fn contract_sale_start<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Option<Timestamp>> {
    Ok(host.state().sale_start)
}

#[receive(
    contract = "fundraising_sale",
    name = "totalAllocationsLimit",
    return_value = "Amount"
)]
fn contract_total_allocations_limit<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().total_allocations_limit())
}

#[receive(
    contract = "fundraising_sale",
    name = "totalAllocated",
    return_value = "Amount"
)]
fn contract_total_allocated<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Amount> {
    Ok(host.state().total_allocated)
}

#[receive(contract = "fundraising_sale", name = "wasStarted", return_value = "bool")]
fn contract_was_started<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().was_started())
}

#[receive(contract = "fundraising_sale", name = "wasClosed", return_value = "bool")]
fn contract_was_closed<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<bool> {
    Ok(host.state().was_closed())
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_std::test_infrastructure::*;

    const OWNER_ACC: AccountAddress = AccountAddress([0u8; 32]);
    const USER_ADDR: Address = Address::Account(AccountAddress([10u8; 32]));

    fn running_host() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);
        let terms = SaleTerms::new(
            Amount::from_micro_ccd(100),
            Amount::from_micro_ccd(1000),
            Amount::from_micro_ccd(5000),
            Amount::from_micro_ccd(200),
        )
        .unwrap_abort();
        state
            .start(terms, Timestamp::from_timestamp_millis(10))
            .unwrap_abort();
        state.allow_participants(vec![USER_ADDR]);
        state
            .allocate(USER_ADDR, Amount::from_micro_ccd(400))
            .unwrap_abort();
        TestHost::new(state, state_builder)
    }

    #[concordium_test]
    /// Test that view reflects the running sale.
    fn test_view() {
        let host = running_host();
        let mut ctx = TestReceiveContext::empty();
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(20));

        let result = contract_view(&ctx, &host);
        claim_eq!(
            result,
            Ok(ViewResponse {
                owner: OWNER_ACC,
                stage: SaleStage::Active,
                was_started: true,
                was_closed: false,
                is_active: true,
                sale_start: Some(Timestamp::from_timestamp_millis(10)),
                minimum_allocation: Amount::from_micro_ccd(100),
                maximum_allocation: Amount::from_micro_ccd(1000),
                total_allocations_limit: Amount::from_micro_ccd(5000),
                close_allocations_remainder: Amount::from_micro_ccd(200),
                total_allocated: Amount::from_micro_ccd(400),
                is_everyone_allowed_to_participate: false,
                are_allocations_accepted: true,
                can_close: false,
            })
        );
    }

    #[concordium_test]
    /// Test the per participant queries.
    fn test_participant_queries() {
        let host = running_host();
        let other = Address::Account(AccountAddress([11u8; 32]));

        let user_bytes = to_bytes(&USER_ADDR);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&user_bytes);
        claim_eq!(
            contract_allocation(&ctx, &host),
            Ok(Amount::from_micro_ccd(400))
        );
        claim_eq!(contract_can_allocate(&ctx, &host), Ok(true));
        claim_eq!(contract_is_allowed_to_participate(&ctx, &host), Ok(true));

        let other_bytes = to_bytes(&other);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_parameter(&other_bytes);
        claim_eq!(contract_allocation(&ctx, &host), Ok(Amount::zero()));
        claim_eq!(contract_can_allocate(&ctx, &host), Ok(false));
        claim_eq!(contract_is_allowed_to_participate(&ctx, &host), Ok(false));

        let ctx = TestReceiveContext::empty();
        claim_eq!(
            contract_view_allocations(&ctx, &host),
            Ok(vec![(USER_ADDR, Amount::from_micro_ccd(400))])
        );
        claim_eq!(contract_view_allowed(&ctx, &host), Ok(vec![USER_ADDR]));
    }

    #[concordium_test]
    /// Test that the sale wide queries are zero before the sale is started.
    fn test_queries_before_start() {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, OWNER_ACC);
        let host = TestHost::new(state, state_builder);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(20));

        claim_eq!(contract_owner(&ctx, &host), Ok(OWNER_ACC));
        claim_eq!(contract_was_started(&ctx, &host), Ok(false));
        claim_eq!(contract_was_closed(&ctx, &host), Ok(false));
        claim_eq!(contract_is_active(&ctx, &host), Ok(false));
        claim_eq!(contract_sale_start(&ctx, &host), Ok(None));
        claim_eq!(contract_minimum_allocation(&ctx, &host), Ok(Amount::zero()));
        claim_eq!(contract_maximum_allocation(&ctx, &host), Ok(Amount::zero()));
        claim_eq!(
            contract_total_allocations_limit(&ctx, &host),
            Ok(Amount::zero())
        );
        claim_eq!(
            contract_close_allocations_remainder(&ctx, &host),
            Ok(Amount::zero())
        );
        claim_eq!(contract_total_allocated(&ctx, &host), Ok(Amount::zero()));
        claim_eq!(contract_are_allocations_accepted(&ctx, &host), Ok(false));
        claim_eq!(contract_can_close(&ctx, &host), Ok(false));
        claim_eq!(
            contract_is_everyone_allowed_to_participate(&ctx, &host),
            Ok(false)
        );
    }
}
