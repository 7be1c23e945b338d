use concordium_std::{
    collections::BTreeMap, schema, Address, Amount, SchemaType, Serial, Write,
};

pub mod error;
pub mod types;

/// Days that must pass after the sale start before the owner may close
/// a sale which still has capacity left.
pub const OWNER_PAYOUT_DELAY_DAYS: u64 = 3;

// ---------------------------------------

/// Tag for the SaleStarted event.
pub const SALE_STARTED_EVENT_TAG: u8 = 0u8;
pub const SALE_CLOSED_EVENT_TAG: u8 = 1u8;
pub const ALLOCATED_EVENT_TAG: u8 = 2u8;

/// The AllocatedEvent is logged for every accepted contribution.
#[derive(Serial, SchemaType, Debug, PartialEq, Eq)]
pub struct AllocatedEvent {
    pub participant: Address,
    pub amount: Amount,
}

/// Tagged events to be serialized for the event log.
#[derive(Debug, PartialEq, Eq)]
pub enum SaleEvent {
    SaleStarted,
    SaleClosed,
    Allocated(AllocatedEvent),
}

impl Serial for SaleEvent {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            SaleEvent::SaleStarted => out.write_u8(SALE_STARTED_EVENT_TAG),
            SaleEvent::SaleClosed => out.write_u8(SALE_CLOSED_EVENT_TAG),
            SaleEvent::Allocated(event) => {
                out.write_u8(ALLOCATED_EVENT_TAG)?;
                event.serial(out)
            }
        }
    }
}

impl schema::SchemaType for SaleEvent {
    fn get_type() -> schema::Type {
        let mut event_map = BTreeMap::new();
        event_map.insert(
            SALE_STARTED_EVENT_TAG,
            ("SaleStarted".to_string(), schema::Fields::None),
        );
        event_map.insert(
            SALE_CLOSED_EVENT_TAG,
            ("SaleClosed".to_string(), schema::Fields::None),
        );
        event_map.insert(
            ALLOCATED_EVENT_TAG,
            (
                "Allocated".to_string(),
                schema::Fields::Named(vec![
                    (String::from("participant"), Address::get_type()),
                    (String::from("amount"), Amount::get_type()),
                ]),
            ),
        );
        schema::Type::TaggedEnum(event_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concordium_std::{to_bytes, AccountAddress};

    #[test]
    fn test_event_tags() {
        assert_eq!(to_bytes(&SaleEvent::SaleStarted), vec![SALE_STARTED_EVENT_TAG]);
        assert_eq!(to_bytes(&SaleEvent::SaleClosed), vec![SALE_CLOSED_EVENT_TAG]);

        let participant = Address::Account(AccountAddress([7u8; 32]));
        let amount = Amount::from_micro_ccd(100);
        let bytes = to_bytes(&SaleEvent::Allocated(AllocatedEvent {
            participant,
            amount,
        }));
        let mut expected = vec![ALLOCATED_EVENT_TAG];
        expected.extend(to_bytes(&participant));
        expected.extend(to_bytes(&amount));
        assert_eq!(bytes, expected);
    }
}
