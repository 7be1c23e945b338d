use concordium_std::*;
pub use sale_utils::{
    error::{SaleError, SaleResult},
    types::*,
    OWNER_PAYOUT_DELAY_DAYS,
};

/// The contract state
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Account allowed to start, open and close the sale
    pub(crate) owner: AccountAddress,
    /// Where the sale is in its lifecycle
    pub(crate) stage: SaleStage,
    /// Bounds of the sale, set once by `startSale`
    pub(crate) terms: Option<SaleTerms>,
    /// Slot time at which the sale was started
    pub(crate) sale_start: Option<Timestamp>,
    /// Sum of all allocations
    pub(crate) total_allocated: Amount,
    /// If `true`, the allow-list is no longer consulted
    pub(crate) everyone_allowed: bool,
    /// Addresses allowed to participate before the sale is opened to everyone
    pub(crate) allowed: StateSet<Address, S>,
    /// Contributed amount per participant
    pub(crate) allocations: StateMap<Address, Amount, S>,
}

impl<S: HasStateApi> State<S> {
    pub(crate) fn new(state_builder: &mut StateBuilder<S>, owner: AccountAddress) -> Self {
        State {
            owner,
            stage: SaleStage::NotStarted,
            terms: None,
            sale_start: None,
            total_allocated: Amount::zero(),
            everyone_allowed: false,
            allowed: state_builder.new_set(),
            allocations: state_builder.new_map(),
        }
    }

    // ------------------------------------------
    // access control
    // ------------------------------------------

    pub(crate) fn ensure_owner(&self, sender: &Address) -> SaleResult<()> {
        ensure!(sender.matches_account(&self.owner), SaleError::Unauthorized);
        Ok(())
    }

    // ------------------------------------------
    // lifecycle
    // ------------------------------------------

    pub(crate) fn was_started(&self) -> bool {
        self.stage != SaleStage::NotStarted
    }

    pub(crate) fn was_closed(&self) -> bool {
        self.stage == SaleStage::Closed
    }

    pub(crate) fn is_active(&self) -> bool {
        self.stage == SaleStage::Active
    }

    /// Terms of a sale that is currently running.
    fn active_terms(&self) -> SaleResult<SaleTerms> {
        ensure!(self.is_active(), SaleError::InvalidState);
        self.terms.ok_or(SaleError::InvalidState)
    }

    pub(crate) fn start(&mut self, terms: SaleTerms, now: Timestamp) -> SaleResult<()> {
        ensure_eq!(self.stage, SaleStage::NotStarted, SaleError::InvalidState);
        terms.validate()?;

        self.terms = Some(terms);
        self.sale_start = Some(now);
        self.stage = SaleStage::Active;
        Ok(())
    }

    pub(crate) fn can_close(&self, now: Timestamp) -> bool {
        let (terms, sale_start) = match (self.active_terms(), self.sale_start) {
            (Ok(terms), Some(sale_start)) => (terms, sale_start),
            _ => return false,
        };

        // no deadline if the addition overflows
        let payout_delay_passed = sale_start
            .checked_add(Duration::from_days(OWNER_PAYOUT_DELAY_DAYS))
            .map_or(false, |deadline| now >= deadline);

        payout_delay_passed
            || !self.are_allocations_accepted()
            || terms.close_allocations_remainder >= terms.headroom(self.total_allocated)
    }

    pub(crate) fn close(&mut self, now: Timestamp) -> SaleResult<()> {
        ensure!(self.can_close(now), SaleError::CannotCloseYet);
        self.stage = SaleStage::Closed;
        Ok(())
    }

    // ------------------------------------------
    // allow-list
    // ------------------------------------------

    pub(crate) fn allow_participants<I>(&mut self, participants: I)
    where
        I: IntoIterator<Item = Address>,
    {
        for participant in participants {
            // already listed addresses are left as they are
            let _ = self.allowed.insert(participant);
        }
    }

    pub(crate) fn open_to_everyone(&mut self) -> SaleResult<()> {
        ensure!(self.is_active(), SaleError::InvalidState);
        ensure!(!self.everyone_allowed, SaleError::InvalidState);
        self.everyone_allowed = true;
        Ok(())
    }

    pub(crate) fn is_allowed_to_participate(&self, participant: &Address) -> bool {
        self.everyone_allowed || self.allowed.contains(participant)
    }

    // ------------------------------------------
    // allocations
    // ------------------------------------------

    pub(crate) fn allocation(&self, participant: &Address) -> Amount {
        self.allocations
            .get(participant)
            .map_or_else(Amount::zero, |amount| *amount)
    }

    pub(crate) fn minimum_allocation(&self) -> Amount {
        self.terms
            .map_or_else(Amount::zero, |terms| terms.minimum_allocation)
    }

    pub(crate) fn maximum_allocation(&self) -> Amount {
        self.terms
            .map_or_else(Amount::zero, |terms| terms.maximum_allocation)
    }

    pub(crate) fn total_allocations_limit(&self) -> Amount {
        self.terms
            .map_or_else(Amount::zero, |terms| terms.total_allocations_limit)
    }

    pub(crate) fn close_allocations_remainder(&self) -> Amount {
        self.terms
            .map_or_else(Amount::zero, |terms| terms.close_allocations_remainder)
    }

    /// The sale is running and still has room for a minimum sized allocation.
    pub(crate) fn are_allocations_accepted(&self) -> bool {
        match self.active_terms() {
            Ok(terms) => terms.headroom(self.total_allocated) >= terms.minimum_allocation,
            Err(_) => false,
        }
    }

    /// The participant is eligible and can still add a minimum sized allocation
    /// without going over the per participant cap.
    pub(crate) fn can_allocate(&self, participant: &Address) -> bool {
        let terms = match self.terms {
            Some(terms) => terms,
            None => return false,
        };
        let fits = self
            .allocation(participant)
            .micro_ccd
            .checked_add(terms.minimum_allocation.micro_ccd)
            .map_or(false, |total| total <= terms.maximum_allocation.micro_ccd);

        self.is_allowed_to_participate(participant) && fits
    }

    /// Records a contribution. Nothing is written unless every check passes.
    pub(crate) fn allocate(&mut self, participant: Address, amount: Amount) -> SaleResult<()> {
        let terms = self.active_terms()?;
        ensure!(
            self.are_allocations_accepted(),
            SaleError::SaleNotAcceptingAllocations
        );
        ensure!(
            self.is_allowed_to_participate(&participant),
            SaleError::NotEligible
        );
        ensure!(
            amount >= terms.minimum_allocation,
            SaleError::AllocationTooSmall
        );

        let participant_total = self
            .allocation(&participant)
            .micro_ccd
            .checked_add(amount.micro_ccd)
            .filter(|total| *total <= terms.maximum_allocation.micro_ccd)
            .ok_or(SaleError::AllocationTooLarge)?;

        ensure!(self.can_allocate(&participant), SaleError::NotEligible);

        let total_allocated = self
            .total_allocated
            .micro_ccd
            .checked_add(amount.micro_ccd)
            .filter(|total| *total <= terms.total_allocations_limit.micro_ccd)
            .ok_or(SaleError::AllocationTooLarge)?;

        self.total_allocated = Amount::from_micro_ccd(total_allocated);
        let _ = self
            .allocations
            .insert(participant, Amount::from_micro_ccd(participant_total));
        Ok(())
    }
}

/// Compares two sale states field by field, walking the allow-list and the
/// ledger, so tests can `claim_eq!` whole states.
/// Only compiled for unit tests and for the `wasm-test` feature.
#[cfg(any(feature = "wasm-test", test))]
impl<S: HasStateApi> PartialEq for State<S> {
    fn eq(&self, other: &Self) -> bool {
        if self.owner != other.owner
            || self.stage != other.stage
            || self.terms != other.terms
            || self.sale_start != other.sale_start
            || self.total_allocated != other.total_allocated
            || self.everyone_allowed != other.everyone_allowed
        {
            return false;
        }
        if self.allowed.iter().count() != other.allowed.iter().count() {
            return false;
        }
        for addr in self.allowed.iter() {
            if !other.allowed.contains(&addr) {
                return false;
            }
        }
        if self.allocations.iter().count() != other.allocations.iter().count() {
            return false;
        }
        for (addr, amount) in self.allocations.iter() {
            match other.allocations.get(&addr) {
                Some(other_amount) if *other_amount == *amount => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_infrastructure::*;

    const OWNER_ACC: AccountAddress = AccountAddress([0u8; 32]);
    const OWNER_ADDR: Address = Address::Account(OWNER_ACC);
    const USER1_ADDR: Address = Address::Account(AccountAddress([10u8; 32]));
    const USER2_ADDR: Address = Address::Account(AccountAddress([11u8; 32]));
    const USER3_ADDR: Address = Address::Contract(ContractAddress {
        index: 100,
        subindex: 0,
    });

    fn ccd(micro: u64) -> Amount {
        Amount::from_micro_ccd(micro)
    }

    fn ts(millis: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(millis)
    }

    fn terms() -> SaleTerms {
        SaleTerms::new(ccd(100), ccd(1000), ccd(5000), ccd(200)).unwrap()
    }

    fn started_state(state_builder: &mut TestStateBuilder) -> State<TestStateApi> {
        let mut state = State::new(state_builder, OWNER_ACC);
        state.start(terms(), ts(1_000)).unwrap();
        state
    }

    fn ledger_sum(state: &State<TestStateApi>) -> u64 {
        state
            .allocations
            .iter()
            .map(|(_, amount)| amount.micro_ccd)
            .sum()
    }

    #[test]
    fn test_ensure_owner() {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, OWNER_ACC);

        assert_eq!(state.ensure_owner(&OWNER_ADDR), Ok(()));
        assert_eq!(
            state.ensure_owner(&USER1_ADDR),
            Err(SaleError::Unauthorized)
        );
        assert_eq!(
            state.ensure_owner(&Address::Contract(ContractAddress::new(0, 0))),
            Err(SaleError::Unauthorized)
        );
    }

    #[test]
    fn test_lifecycle_flags() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);
        assert!(!state.was_started());
        assert!(!state.was_closed());
        assert!(!state.is_active());

        state.start(terms(), ts(1_000)).unwrap();
        assert!(state.was_started());
        assert!(state.is_active());
        assert_eq!(state.sale_start, Some(ts(1_000)));

        let later = ts(1_000 + Duration::from_days(3).millis());
        state.close(later).unwrap();
        assert!(state.was_started());
        assert!(state.was_closed());
        assert!(!state.is_active());
        assert_eq!(state.start(terms(), later), Err(SaleError::InvalidState));
        assert_eq!(state.close(later), Err(SaleError::CannotCloseYet));
    }

    #[test]
    fn test_start_twice_keeps_terms() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = started_state(&mut state_builder);

        let other = SaleTerms::new(ccd(1), ccd(2), ccd(3), ccd(4)).unwrap();
        assert_eq!(state.start(other, ts(2_000)), Err(SaleError::InvalidState));
        assert_eq!(state.terms, Some(terms()));
        assert_eq!(state.sale_start, Some(ts(1_000)));
    }

    #[test]
    fn test_start_rejects_invalid_terms() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);

        let bad = SaleTerms {
            minimum_allocation: ccd(100),
            maximum_allocation: ccd(100),
            total_allocations_limit: ccd(5000),
            close_allocations_remainder: ccd(200),
        };
        assert_eq!(state.start(bad, ts(1)), Err(SaleError::InvalidParameters));
        assert!(!state.was_started());
        assert_eq!(state.terms, None);
    }

    #[test]
    fn test_allow_participants() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);

        state.allow_participants(Vec::new());
        assert_eq!(state.allowed.iter().count(), 0);

        state.allow_participants(vec![USER1_ADDR]);
        assert!(state.is_allowed_to_participate(&USER1_ADDR));
        assert!(!state.is_allowed_to_participate(&USER2_ADDR));

        state.allow_participants(vec![USER1_ADDR, USER2_ADDR, USER2_ADDR, USER3_ADDR]);
        assert_eq!(state.allowed.iter().count(), 3);
        assert!(state.is_allowed_to_participate(&USER3_ADDR));

        let many: Vec<Address> = (0..1_000u64)
            .map(|i| Address::Contract(ContractAddress::new(1_000 + i, 0)))
            .collect();
        state.allow_participants(many.clone());
        state.allow_participants(many);
        assert_eq!(state.allowed.iter().count(), 1_003);
    }

    #[test]
    fn test_open_to_everyone() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);
        assert_eq!(state.open_to_everyone(), Err(SaleError::InvalidState));

        state.start(terms(), ts(1_000)).unwrap();
        assert!(!state.is_allowed_to_participate(&USER1_ADDR));
        assert_eq!(state.open_to_everyone(), Ok(()));
        assert!(state.is_allowed_to_participate(&USER1_ADDR));
        assert_eq!(state.open_to_everyone(), Err(SaleError::InvalidState));
    }

    #[test]
    fn test_allocate_check_order() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);
        state.allow_participants(vec![USER1_ADDR]);

        // not started
        assert_eq!(
            state.allocate(USER1_ADDR, ccd(100)),
            Err(SaleError::InvalidState)
        );

        state.start(terms(), ts(1_000)).unwrap();

        // membership is checked before the amount bounds
        assert_eq!(
            state.allocate(USER2_ADDR, ccd(50)),
            Err(SaleError::NotEligible)
        );
        assert_eq!(
            state.allocate(USER2_ADDR, ccd(1001)),
            Err(SaleError::NotEligible)
        );
        assert_eq!(
            state.allocate(USER1_ADDR, ccd(50)),
            Err(SaleError::AllocationTooSmall)
        );
        assert_eq!(
            state.allocate(USER1_ADDR, ccd(1001)),
            Err(SaleError::AllocationTooLarge)
        );
        assert_eq!(
            state.allocate(USER1_ADDR, ccd(u64::MAX)),
            Err(SaleError::AllocationTooLarge)
        );

        assert_eq!(state.allocate(USER1_ADDR, ccd(300)), Ok(()));
        assert_eq!(state.allocation(&USER1_ADDR), ccd(300));
        assert_eq!(state.total_allocated, ccd(300));
        assert_eq!(ledger_sum(&state), 300);
    }

    #[test]
    fn test_allocate_up_to_participant_cap() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = started_state(&mut state_builder);
        state.allow_participants(vec![USER1_ADDR]);

        state.allocate(USER1_ADDR, ccd(850)).unwrap();
        assert!(state.can_allocate(&USER1_ADDR));
        assert_eq!(
            state.allocate(USER1_ADDR, ccd(151)),
            Err(SaleError::AllocationTooLarge)
        );
        state.allocate(USER1_ADDR, ccd(100)).unwrap();

        // 950 + 100 > 1000: no room left for a minimum allocation
        assert!(!state.can_allocate(&USER1_ADDR));
        assert_eq!(
            state.allocate(USER1_ADDR, ccd(100)),
            Err(SaleError::AllocationTooLarge)
        );
        assert_eq!(
            state.allocate(USER1_ADDR, ccd(50)),
            Err(SaleError::AllocationTooSmall)
        );
        assert_eq!(state.allocation(&USER1_ADDR), ccd(950));
        assert_eq!(state.total_allocated, ccd(950));
    }

    #[test]
    fn test_allocate_over_total_limit() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = started_state(&mut state_builder);
        state.open_to_everyone().unwrap();

        for i in 0..4u8 {
            let user = Address::Account(AccountAddress([20 + i; 32]));
            state.allocate(user, ccd(1000)).unwrap();
        }
        state.allocate(USER1_ADDR, ccd(700)).unwrap();
        assert_eq!(state.total_allocated, ccd(4700));

        // 300 left, 400 asked
        assert_eq!(
            state.allocate(USER2_ADDR, ccd(400)),
            Err(SaleError::AllocationTooLarge)
        );
        assert_eq!(state.allocation(&USER2_ADDR), Amount::zero());
        assert_eq!(state.allocate(USER2_ADDR, ccd(300)), Ok(()));
        assert_eq!(state.total_allocated, ccd(5000));
        assert_eq!(ledger_sum(&state), 5000);

        assert!(!state.are_allocations_accepted());
        assert_eq!(
            state.allocate(USER3_ADDR, ccd(100)),
            Err(SaleError::SaleNotAcceptingAllocations)
        );
    }

    #[test]
    fn test_can_close() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);
        assert!(!state.can_close(ts(0)));

        state.start(terms(), ts(1_000)).unwrap();
        state.open_to_everyone().unwrap();
        assert!(!state.can_close(ts(1_000)));

        let delay = Duration::from_days(OWNER_PAYOUT_DELAY_DAYS).millis();
        assert!(!state.can_close(ts(1_000 + delay - 1)));
        assert!(state.can_close(ts(1_000 + delay)));

        // headroom 4800 -> 200: remainder rule applies
        for i in 0..4u8 {
            let user = Address::Account(AccountAddress([20 + i; 32]));
            state.allocate(user, ccd(1000)).unwrap();
        }
        assert!(!state.can_close(ts(1_000)));
        state.allocate(USER1_ADDR, ccd(800)).unwrap();
        assert!(state.are_allocations_accepted());
        assert!(state.can_close(ts(1_000)));
    }

    #[test]
    fn test_can_close_when_not_accepting() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, OWNER_ACC);
        // remainder smaller than the minimum allocation
        let terms = SaleTerms::new(ccd(100), ccd(1000), ccd(1050), ccd(10)).unwrap();
        state.start(terms, ts(0)).unwrap();
        state.allow_participants(vec![USER1_ADDR, USER2_ADDR]);

        state.allocate(USER1_ADDR, ccd(1000)).unwrap();
        // headroom 50 < minimum 100, but still > remainder 10
        assert!(!state.are_allocations_accepted());
        assert!(state.can_close(ts(1)));
    }
}
