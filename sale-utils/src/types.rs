use crate::error::SaleError;
use concordium_std::*;

pub type MicroCcd = u64;

/// Lifecycle of a sale. `Closed` is terminal.
#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq)]
pub enum SaleStage {
    NotStarted,
    Active,
    Closed,
}

/// Bounds of the sale, written once by `startSale`.
#[derive(Debug, Serialize, SchemaType, Clone, Copy, PartialEq, Eq)]
pub struct SaleTerms {
    /// Smallest single contribution
    pub minimum_allocation: Amount,
    /// Largest total a single participant may contribute
    pub maximum_allocation: Amount,
    /// Hardcap of the whole sale
    pub total_allocations_limit: Amount,
    /// Once the remaining capacity is at most this, the owner may close early
    pub close_allocations_remainder: Amount,
}

impl SaleTerms {
    pub fn new(
        minimum_allocation: Amount,
        maximum_allocation: Amount,
        total_allocations_limit: Amount,
        close_allocations_remainder: Amount,
    ) -> Result<Self, SaleError> {
        let terms = SaleTerms {
            minimum_allocation,
            maximum_allocation,
            total_allocations_limit,
            close_allocations_remainder,
        };
        terms.validate()?;
        Ok(terms)
    }

    pub fn validate(&self) -> Result<(), SaleError> {
        let zero = Amount::zero();
        ensure!(self.minimum_allocation > zero, SaleError::InvalidParameters);
        ensure!(self.maximum_allocation > zero, SaleError::InvalidParameters);
        ensure!(
            self.maximum_allocation > self.minimum_allocation,
            SaleError::InvalidParameters
        );
        ensure!(self.total_allocations_limit > zero, SaleError::InvalidParameters);
        ensure!(
            self.close_allocations_remainder > zero,
            SaleError::InvalidParameters
        );
        Ok(())
    }

    /// Capacity left under the hardcap once `total_allocated` has been taken.
    pub fn headroom(&self, total_allocated: Amount) -> Amount {
        Amount::from_micro_ccd(
            self.total_allocations_limit
                .micro_ccd
                .saturating_sub(total_allocated.micro_ccd),
        )
    }
}

/// Parameter type for the contract function `addAllowedParticipants`.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct AllowedParticipantsParams {
    /// Addresses to put on the allow-list. Duplicates are ignored.
    pub participants: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ccd(micro: u64) -> Amount {
        Amount::from_micro_ccd(micro)
    }

    #[test]
    fn test_valid_terms() {
        let terms = SaleTerms::new(ccd(100), ccd(1000), ccd(5000), ccd(200));
        assert!(terms.is_ok());
        assert_eq!(terms.unwrap().headroom(ccd(4900)), ccd(100));
    }

    #[test]
    fn test_invalid_terms() {
        assert_eq!(
            SaleTerms::new(ccd(0), ccd(1000), ccd(5000), ccd(200)),
            Err(SaleError::InvalidParameters)
        );
        assert_eq!(
            SaleTerms::new(ccd(1000), ccd(1000), ccd(5000), ccd(200)),
            Err(SaleError::InvalidParameters)
        );
        assert_eq!(
            SaleTerms::new(ccd(1000), ccd(100), ccd(5000), ccd(200)),
            Err(SaleError::InvalidParameters)
        );
        assert_eq!(
            SaleTerms::new(ccd(100), ccd(1000), ccd(0), ccd(200)),
            Err(SaleError::InvalidParameters)
        );
        assert_eq!(
            SaleTerms::new(ccd(100), ccd(1000), ccd(5000), ccd(0)),
            Err(SaleError::InvalidParameters)
        );
    }

    #[test]
    fn test_headroom_saturates() {
        let terms = SaleTerms::new(ccd(1), ccd(2), ccd(10), ccd(1)).unwrap();
        assert_eq!(terms.headroom(ccd(20)), Amount::zero());
    }
}
