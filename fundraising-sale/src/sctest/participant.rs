use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    fn allocate_as(
        host: &mut TestHost<State<TestStateApi>>,
        logger: &mut TestLogger,
        sender: Address,
        amount: Amount,
        now: u64,
    ) -> SaleResult<()> {
        let ctx = receive_context(sender, at(now), &[]);
        contract_allocate(&ctx, host, amount, logger)
    }

    fn open_host() -> TestHost<State<TestStateApi>> {
        let mut host = started_host();
        host.state_mut().open_to_everyone().unwrap_abort();
        host
    }

    #[concordium_test]
    /// Test that an unlisted participant is turned away until the sale is opened.
    fn test_allocate_unlisted_then_opened() {
        let mut host = started_host();
        let mut logger = TestLogger::init();
        let user = Address::Account(new_account());

        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(50), 1_500),
            Err(SaleError::NotEligible)
        );

        let ctx = receive_context(Address::Account(OWNER_ACC), at(1_500), &[]);
        claim_eq!(contract_open_to_everyone(&ctx, &mut host), Ok(()));

        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(50), 1_600),
            Err(SaleError::AllocationTooSmall)
        );
        claim!(logger.logs.is_empty());

        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(100), 1_700),
            Ok(())
        );
        claim_eq!(host.state().allocation(&user), ccd(100));
        claim_eq!(host.state().total_allocated, ccd(100));
        claim_eq!(
            logger.logs,
            vec![to_bytes(&SaleEvent::Allocated(AllocatedEvent {
                participant: user,
                amount: ccd(100),
            }))]
        );
    }

    #[concordium_test]
    /// Test that listed accounts and contracts can allocate before the sale is opened.
    fn test_allocate_allow_listed() {
        let mut host = started_host();
        let mut logger = TestLogger::init();
        let user = Address::Account(new_account());
        let contract = Address::Contract(ContractAddress::new(42, 0));
        host.state_mut().allow_participants(vec![user, contract]);

        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(400), 2_000),
            Ok(())
        );
        claim_eq!(
            allocate_as(&mut host, &mut logger, contract, ccd(1000), 2_000),
            Ok(())
        );
        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(600), 3_000),
            Ok(())
        );

        let state = host.state();
        claim_eq!(state.allocation(&user), ccd(1000));
        claim_eq!(state.allocation(&contract), ccd(1000));
        claim_eq!(state.total_allocated, ccd(2000));
        claim!(!state.can_allocate(&user));
        claim_eq!(logger.logs.len(), 3);
    }

    #[concordium_test]
    /// Test that allocate fails while the sale is not running.
    fn test_allocate_not_running() {
        let mut host = fresh_host();
        let mut logger = TestLogger::init();
        let user = Address::Account(new_account());
        host.state_mut().allow_participants(vec![user]);

        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(100), 1),
            Err(SaleError::InvalidState)
        );

        let mut host = open_host();
        host.state_mut().stage = SaleStage::Closed;
        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(100), 2_000),
            Err(SaleError::InvalidState)
        );
        claim_eq!(host.state().total_allocated, Amount::zero());
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    /// Test that a rejected allocation leaves the whole state untouched.
    fn test_failed_allocate_leaves_state_unchanged() {
        let first = Address::Account(new_account());
        let second = Address::Account(new_account());
        let setup = |host: &mut TestHost<State<TestStateApi>>| {
            host.state_mut().allow_participants(vec![first]);
            host.state_mut().allocate(first, ccd(900)).unwrap_abort();
        };

        let mut host = started_host();
        setup(&mut host);
        let mut expected = started_host();
        setup(&mut expected);

        let mut logger = TestLogger::init();
        let failures = [
            (second, ccd(500), SaleError::NotEligible),
            (first, ccd(99), SaleError::AllocationTooSmall),
            (first, ccd(101), SaleError::AllocationTooLarge),
            (first, ccd(u64::MAX), SaleError::AllocationTooLarge),
        ];
        for (sender, amount, error) in failures {
            claim_eq!(
                allocate_as(&mut host, &mut logger, sender, amount, 2_000),
                Err(error)
            );
            claim_eq!(*host.state(), *expected.state());
        }
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    /// Test that the sale fills up, stops accepting and can be closed before the payout delay.
    fn test_fill_sale_and_close_early() {
        let mut host = open_host();
        let mut logger = TestLogger::init();

        for _ in 0..4 {
            let user = Address::Account(new_account());
            claim_eq!(
                allocate_as(&mut host, &mut logger, user, ccd(1000), 2_000),
                Ok(())
            );
        }
        // 1000 left, more than the 200 remainder
        claim!(!host.state().can_close(at(2_000)));

        let last = Address::Account(new_account());
        claim_eq!(
            allocate_as(&mut host, &mut logger, last, ccd(1000), 2_000),
            Ok(())
        );
        claim_eq!(host.state().total_allocated, ccd(5000));
        claim!(!host.state().are_allocations_accepted());

        let late = Address::Account(new_account());
        claim_eq!(
            allocate_as(&mut host, &mut logger, late, ccd(100), 2_500),
            Err(SaleError::SaleNotAcceptingAllocations)
        );

        let ledger: u64 = host
            .state()
            .allocations
            .iter()
            .map(|(_, amount)| amount.micro_ccd)
            .sum();
        claim_eq!(ledger, 5000);
        claim_eq!(logger.logs.len(), 5);

        host.set_self_balance(ccd(5000));
        let mut close_logger = TestLogger::init();
        let ctx = receive_context(Address::Account(OWNER_ACC), at(3_000), &[]);
        claim_eq!(contract_close_sale(&ctx, &mut host, &mut close_logger), Ok(()));
        claim!(host.state().was_closed());
        claim_eq!(
            host.get_transfers(),
            [(OWNER_ACC, ccd(5000))],
            "The collected CCD should go to the owner."
        );
        claim_eq!(close_logger.logs, vec![to_bytes(&SaleEvent::SaleClosed)]);

        claim_eq!(
            allocate_as(&mut host, &mut logger, late, ccd(100), 3_500),
            Err(SaleError::InvalidState)
        );
    }

    #[concordium_test]
    /// Test that the remaining capacity is shared by all participants.
    fn test_total_limit_is_aggregate() {
        let mut host = open_host();
        let mut logger = TestLogger::init();
        let users: Vec<Address> = (0..5).map(|_| Address::Account(new_account())).collect();

        for user in &users[..4] {
            claim_eq!(
                allocate_as(&mut host, &mut logger, *user, ccd(1000), 2_000),
                Ok(())
            );
        }
        claim_eq!(
            allocate_as(&mut host, &mut logger, users[4], ccd(700), 2_000),
            Ok(())
        );

        // 300 left under the hardcap
        let user = Address::Account(new_account());
        claim!(host.state().can_allocate(&user));
        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(301), 2_000),
            Err(SaleError::AllocationTooLarge)
        );
        claim_eq!(
            allocate_as(&mut host, &mut logger, user, ccd(300), 2_000),
            Ok(())
        );
        claim_eq!(host.state().total_allocated, ccd(5000));
        claim!(host.state().total_allocated <= host.state().total_allocations_limit());
    }
}
