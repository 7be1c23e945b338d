use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
mod tests {
    use crate::sctest::*;

    #[concordium_test]
    /// Test that startSale stores the bounds and logs SaleStarted.
    fn test_start_sale() {
        let mut host = fresh_host();
        let mut logger = TestLogger::init();
        let params_bytes = to_bytes(&sale_terms());
        let ctx = receive_context(Address::Account(OWNER_ACC), at(500), &params_bytes);

        let result = contract_start_sale(&ctx, &mut host, &mut logger);
        claim!(result.is_ok());

        let state = host.state();
        claim_eq!(state.stage, SaleStage::Active);
        claim_eq!(state.terms, Some(sale_terms()));
        claim_eq!(state.sale_start, Some(at(500)));
        claim_eq!(state.minimum_allocation(), ccd(100));
        claim_eq!(state.maximum_allocation(), ccd(1000));
        claim_eq!(state.total_allocations_limit(), ccd(5000));
        claim_eq!(state.close_allocations_remainder(), ccd(200));
        claim_eq!(logger.logs, vec![to_bytes(&SaleEvent::SaleStarted)]);
    }

    #[concordium_test]
    /// Test that startSale rejects any sender but the owner.
    fn test_start_sale_unauthorized() {
        let mut host = fresh_host();
        let mut logger = TestLogger::init();
        let params_bytes = to_bytes(&sale_terms());
        let ctx = receive_context(Address::Account(new_account()), at(500), &params_bytes);

        let result = contract_start_sale(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(SaleError::Unauthorized));
        claim_eq!(*host.state(), *fresh_host().state());
        claim!(logger.logs.is_empty());

        let ctx = receive_context(
            Address::Contract(ContractAddress::new(5, 0)),
            at(500),
            &params_bytes,
        );
        let result = contract_start_sale(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(SaleError::Unauthorized));
    }

    #[concordium_test]
    /// Test that a second startSale fails and keeps the first bounds.
    fn test_start_sale_twice() {
        let mut host = started_host();
        let mut logger = TestLogger::init();
        let other_terms = SaleTerms::new(ccd(1), ccd(2), ccd(3), ccd(4)).unwrap_abort();
        let params_bytes = to_bytes(&other_terms);
        let ctx = receive_context(Address::Account(OWNER_ACC), at(9_000), &params_bytes);

        let result = contract_start_sale(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(SaleError::InvalidState));
        claim_eq!(*host.state(), *started_host().state());
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    /// Test that startSale rejects malformed bounds.
    fn test_start_sale_invalid_parameters() {
        let cases = [
            (0, 1000, 5000, 200),
            (100, 0, 5000, 200),
            (100, 100, 5000, 200),
            (1000, 100, 5000, 200),
            (100, 1000, 0, 200),
            (100, 1000, 5000, 0),
        ];
        for (min, max, limit, remainder) in cases {
            let mut host = fresh_host();
            let mut logger = TestLogger::init();
            let terms = SaleTerms {
                minimum_allocation: ccd(min),
                maximum_allocation: ccd(max),
                total_allocations_limit: ccd(limit),
                close_allocations_remainder: ccd(remainder),
            };
            let params_bytes = to_bytes(&terms);
            let ctx = receive_context(Address::Account(OWNER_ACC), at(500), &params_bytes);

            let result = contract_start_sale(&ctx, &mut host, &mut logger);
            claim_eq!(result, Err(SaleError::InvalidParameters));
            claim!(!host.state().was_started());
        }
    }

    #[concordium_test]
    /// Test that startSale rejects a parameter it cannot parse.
    fn test_start_sale_bad_parameter() {
        let mut host = fresh_host();
        let mut logger = TestLogger::init();
        let ctx = receive_context(Address::Account(OWNER_ACC), at(500), &[1, 2, 3]);

        let result = contract_start_sale(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(SaleError::ParseParams));
    }

    #[concordium_test]
    /// Test the lifecycle checks of openToEveryone.
    fn test_open_to_everyone() {
        let mut host = fresh_host();
        let ctx = receive_context(Address::Account(OWNER_ACC), at(1_500), &[]);
        claim_eq!(
            contract_open_to_everyone(&ctx, &mut host),
            Err(SaleError::InvalidState)
        );

        let mut host = started_host();
        let stranger = receive_context(Address::Account(new_account()), at(1_500), &[]);
        claim_eq!(
            contract_open_to_everyone(&stranger, &mut host),
            Err(SaleError::Unauthorized)
        );
        claim!(!host.state().everyone_allowed);

        claim_eq!(contract_open_to_everyone(&ctx, &mut host), Ok(()));
        claim!(host.state().everyone_allowed);
        claim!(host
            .state()
            .is_allowed_to_participate(&Address::Account(new_account())));

        claim_eq!(
            contract_open_to_everyone(&ctx, &mut host),
            Err(SaleError::InvalidState)
        );
        claim!(host.state().everyone_allowed);
    }

    #[concordium_test]
    /// Test that openToEveryone fails after the sale is closed.
    fn test_open_to_everyone_after_close() {
        let mut host = started_host();
        host.state_mut().stage = SaleStage::Closed;
        let ctx = receive_context(Address::Account(OWNER_ACC), at(1_500), &[]);
        claim_eq!(
            contract_open_to_everyone(&ctx, &mut host),
            Err(SaleError::InvalidState)
        );
        claim!(!host.state().everyone_allowed);
    }

    #[concordium_test]
    /// Test addAllowedParticipants with empty, single, duplicate and large inputs.
    fn test_add_allowed_participants() {
        let mut host = fresh_host();
        let user = Address::Account(new_account());

        // works before the sale is started
        let params = AllowedParticipantsParams {
            participants: vec![],
        };
        let params_bytes = to_bytes(&params);
        let ctx = receive_context(Address::Account(OWNER_ACC), at(1), &params_bytes);
        claim_eq!(contract_add_allowed_participants(&ctx, &mut host), Ok(()));
        claim_eq!(host.state().allowed.iter().count(), 0);

        let params = AllowedParticipantsParams {
            participants: vec![user],
        };
        let params_bytes = to_bytes(&params);
        let ctx = receive_context(Address::Account(OWNER_ACC), at(1), &params_bytes);
        claim_eq!(contract_add_allowed_participants(&ctx, &mut host), Ok(()));
        claim!(host.state().is_allowed_to_participate(&user));

        let mut participants = vec![user, user];
        for index in 0..500 {
            participants.push(Address::Contract(ContractAddress::new(index, 0)));
            participants.push(Address::Contract(ContractAddress::new(index, 0)));
        }
        let params = AllowedParticipantsParams { participants };
        let params_bytes = to_bytes(&params);
        let ctx = receive_context(Address::Account(OWNER_ACC), at(1), &params_bytes);
        claim_eq!(contract_add_allowed_participants(&ctx, &mut host), Ok(()));
        claim_eq!(host.state().allowed.iter().count(), 501);
        claim!(host
            .state()
            .is_allowed_to_participate(&Address::Contract(ContractAddress::new(499, 0))));
    }

    #[concordium_test]
    /// Test that addAllowedParticipants rejects any sender but the owner.
    fn test_add_allowed_participants_unauthorized() {
        let mut host = started_host();
        let params = AllowedParticipantsParams {
            participants: vec![Address::Account(new_account())],
        };
        let params_bytes = to_bytes(&params);
        let ctx = receive_context(Address::Account(new_account()), at(1_500), &params_bytes);

        claim_eq!(
            contract_add_allowed_participants(&ctx, &mut host),
            Err(SaleError::Unauthorized)
        );
        claim_eq!(host.state().allowed.iter().count(), 0);
    }

    #[concordium_test]
    /// Test that closeSale waits for the payout delay, then pays out the whole balance.
    fn test_close_sale_after_payout_delay() {
        let mut host = started_host();
        host.state_mut().open_to_everyone().unwrap_abort();
        let user = Address::Account(new_account());
        host.state_mut().allocate(user, ccd(400)).unwrap_abort();
        host.set_self_balance(ccd(400));

        let delay = Duration::from_days(OWNER_PAYOUT_DELAY_DAYS).millis();
        let mut logger = TestLogger::init();

        let ctx = receive_context(
            Address::Account(OWNER_ACC),
            at(SALE_START_MILLIS + delay - 1),
            &[],
        );
        claim_eq!(
            contract_close_sale(&ctx, &mut host, &mut logger),
            Err(SaleError::CannotCloseYet)
        );
        claim!(host.state().is_active());
        claim!(host.get_transfers().is_empty());

        let ctx = receive_context(
            Address::Account(OWNER_ACC),
            at(SALE_START_MILLIS + delay),
            &[],
        );
        claim_eq!(contract_close_sale(&ctx, &mut host, &mut logger), Ok(()));
        claim!(host.state().was_closed());
        claim!(host.state().was_started());
        claim_eq!(logger.logs, vec![to_bytes(&SaleEvent::SaleClosed)]);
        claim_eq!(
            host.get_transfers(),
            [(OWNER_ACC, ccd(400))],
            "The whole balance should go to the owner."
        );

        // closed is terminal
        claim_eq!(
            contract_close_sale(&ctx, &mut host, &mut logger),
            Err(SaleError::CannotCloseYet)
        );
    }

    #[concordium_test]
    /// Test that closeSale is rejected when the payout to the owner fails.
    fn test_close_sale_transfer_failed() {
        let mut host = started_host();
        host.set_self_balance(ccd(400));
        host.make_account_missing(OWNER_ACC);

        let delay = Duration::from_days(OWNER_PAYOUT_DELAY_DAYS).millis();
        let mut logger = TestLogger::init();
        let ctx = receive_context(
            Address::Account(OWNER_ACC),
            at(SALE_START_MILLIS + delay),
            &[],
        );

        // the rejection makes the chain discard the close and its event
        claim_eq!(
            contract_close_sale(&ctx, &mut host, &mut logger),
            Err(SaleError::TransferFailed)
        );
        claim!(host.get_transfers().is_empty());
    }

    #[concordium_test]
    /// Test that closeSale rejects any sender but the owner.
    fn test_close_sale_unauthorized() {
        let mut host = started_host();
        let mut logger = TestLogger::init();
        let delay = Duration::from_days(OWNER_PAYOUT_DELAY_DAYS).millis();
        let ctx = receive_context(
            Address::Account(new_account()),
            at(SALE_START_MILLIS + delay),
            &[],
        );

        claim_eq!(
            contract_close_sale(&ctx, &mut host, &mut logger),
            Err(SaleError::Unauthorized)
        );
        claim!(host.state().is_active());
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    /// Test that closeSale fails before the sale is started.
    fn test_close_sale_not_started() {
        let mut host = fresh_host();
        let mut logger = TestLogger::init();
        let ctx = receive_context(Address::Account(OWNER_ACC), at(u64::MAX), &[]);

        claim_eq!(
            contract_close_sale(&ctx, &mut host, &mut logger),
            Err(SaleError::CannotCloseYet)
        );
        claim!(!host.state().was_closed());
    }
}
