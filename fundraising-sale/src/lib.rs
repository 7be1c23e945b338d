//! This contract runs a capped fundraising sale in CCD.
//!
//! The owner starts the sale with its bounds, may put addresses on an
//! allow-list or open the sale to everyone, and withdraws the whole balance
//! once the sale can be closed.
#[cfg(any(feature = "wasm-test", test))]
mod sctest;
mod state;
mod view;

use concordium_std::*;
use sale_utils::{AllocatedEvent, SaleEvent};
use state::{State, *};

/// # Init Function
/// The account that creates the instance becomes the owner of the sale.
#[init(contract = "fundraising_sale")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    Ok(State::new(state_builder, ctx.init_origin()))
}

// ==============================================
// For the owner
// ==========================================

/// Start the sale with its allocation bounds.
/// The bounds cannot be changed afterwards.
///
/// Caller: owner only
/// Reject if:
/// - The sender is not the owner.
/// - Fails to parse parameter
/// - The sale was already started
/// - The bounds are not valid
#[receive(
    contract = "fundraising_sale",
    name = "startSale",
    parameter = "SaleTerms",
    error = "SaleError",
    mutable,
    enable_logger
)]
fn contract_start_sale<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> SaleResult<()> {
    host.state().ensure_owner(&ctx.sender())?;

    let terms: SaleTerms = ctx.parameter_cursor().get()?;
    host.state_mut()
        .start(terms, ctx.metadata().slot_time())?;

    logger.log(&SaleEvent::SaleStarted)?;
    Ok(())
}

/// Let every address participate, not only the ones on the allow-list.
/// Cannot be undone.
///
/// Caller: owner only
/// Reject if:
/// - The sender is not the owner.
/// - The sale is not running
/// - The sale is already open to everyone
#[receive(
    contract = "fundraising_sale",
    name = "openToEveryone",
    error = "SaleError",
    mutable
)]
fn contract_open_to_everyone<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> SaleResult<()> {
    host.state().ensure_owner(&ctx.sender())?;
    host.state_mut().open_to_everyone()
}

/// Put addresses on the allow-list.
/// Addresses that are already listed are ignored.
///
/// Caller: owner only
/// Reject if:
/// - The sender is not the owner.
/// - Fails to parse parameter
#[receive(
    contract = "fundraising_sale",
    name = "addAllowedParticipants",
    parameter = "AllowedParticipantsParams",
    error = "SaleError",
    mutable
)]
fn contract_add_allowed_participants<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> SaleResult<()> {
    host.state().ensure_owner(&ctx.sender())?;

    let params: AllowedParticipantsParams = ctx.parameter_cursor().get()?;
    host.state_mut().allow_participants(params.participants);

    Ok(())
}

/// Close the sale and transfer the whole balance to the owner.
/// Note: if the transfer fails the call is rejected and the sale stays open.
///
/// Caller: owner only
/// Reject if:
/// - The sender is not the owner.
/// - The sale is not running
/// - Neither the payout delay has passed nor the sale is (nearly) full
/// - Fails to transfer the balance to the owner
#[receive(
    contract = "fundraising_sale",
    name = "closeSale",
    error = "SaleError",
    mutable,
    enable_logger
)]
fn contract_close_sale<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> SaleResult<()> {
    host.state().ensure_owner(&ctx.sender())?;

    host.state_mut().close(ctx.metadata().slot_time())?;
    logger.log(&SaleEvent::SaleClosed)?;

    let owner = host.state().owner;
    let balance = host.self_balance();
    host.invoke_transfer(&owner, balance)?;

    Ok(())
}

// ==============================================
// For participants
// ==========================================

/// Contribute the attached CCD to the sale.
/// The CCD is held by the contract until the owner closes the sale.
///
/// Caller: Anyone allowed to participate
/// Reject if:
/// - The sale is not running
/// - The remaining capacity is below the minimum allocation
/// - The sender is not allowed to participate
/// - The amount is below the minimum allocation
/// - The sender's total would exceed the maximum allocation
/// - The sender has no room left for a minimum allocation
/// - The sale total would exceed its limit
#[receive(
    contract = "fundraising_sale",
    name = "allocate",
    error = "SaleError",
    mutable,
    payable,
    enable_logger
)]
fn contract_allocate<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> SaleResult<()> {
    let participant = ctx.sender();
    host.state_mut().allocate(participant, amount)?;

    logger.log(&SaleEvent::Allocated(AllocatedEvent {
        participant,
        amount,
    }))?;
    Ok(())
}
