use crate::{
    config::{load_participants, SaleConfig},
    timestamp_from_str, timestamp_to_datetime,
};
use anyhow::{Context, Result};
use concordium_std::{to_bytes, Duration, Timestamp};
use sale_utils::OWNER_PAYOUT_DELAY_DAYS;
use std::path::Path;

/// Hex encoded `startSale` parameter for the terms in `config_path`.
pub fn start(config_path: &Path) -> Result<String> {
    let config = SaleConfig::load(config_path)?;
    let terms = config.to_terms()?;
    log::debug!("terms > {:?}", terms);

    Ok(hex::encode(to_bytes(&terms)))
}

/// Hex encoded `addAllowedParticipants` parameter for the accounts in `list_path`.
pub fn allow(list_path: &Path) -> Result<String> {
    let params = load_participants(list_path)?;
    log::info!("{} participant(s) to allow", params.participants.len());
    log::debug!("participants > {:?}", params.participants);

    Ok(hex::encode(to_bytes(&params)))
}

/// Earliest slot time at which the owner may close a sale started at `start`.
pub fn close_eta(start: &str) -> Result<Timestamp> {
    let sale_start = timestamp_from_str(start).context("Invalid sale start.")?;
    let eta = sale_start
        .checked_add(Duration::from_days(OWNER_PAYOUT_DELAY_DAYS))
        .context("Sale start too far in the future.")?;
    log::debug!("sale start > {:?}, eta > {:?}", sale_start, eta);

    Ok(eta)
}

pub fn print_close_eta(start: &str) -> Result<()> {
    let eta = close_eta(start)?;
    println!("{} <= UTC", timestamp_to_datetime(eta)?.to_rfc3339());
    println!("timestamp: {:?}", eta.timestamp_millis());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concordium_std::{from_bytes, AccountAddress, Address, Amount};
    use sale_utils::types::{AllowedParticipantsParams, SaleTerms};
    use std::{fs, path::PathBuf};

    fn write_tmp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sale-params-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_start() {
        let path = write_tmp(
            "sale.json",
            r#"{
                "minimum_allocation": 100,
                "maximum_allocation": 1000,
                "total_allocations_limit": 5000,
                "close_allocations_remainder": 200
            }"#,
        );
        let encoded = start(&path).unwrap();
        let terms: SaleTerms = from_bytes(&hex::decode(encoded).unwrap()).unwrap();
        assert_eq!(terms.maximum_allocation, Amount::from_micro_ccd(1000));
        assert_eq!(terms.close_allocations_remainder, Amount::from_micro_ccd(200));

        assert!(start(Path::new("does/not/exist.json")).is_err());
    }

    #[test]
    fn test_allow() {
        let account = AccountAddress([3u8; 32]);
        let path = write_tmp(
            "allow.json",
            &format!(r#"["{}"]"#, crate::account_address_to_string(&account)),
        );
        let encoded = allow(&path).unwrap();
        let params: AllowedParticipantsParams =
            from_bytes(&hex::decode(encoded).unwrap()).unwrap();
        assert_eq!(params.participants, vec![Address::Account(account)]);
    }

    #[test]
    fn test_close_eta() {
        let eta = close_eta("2023-05-18T00:00:00+00:00").unwrap();
        let expected = timestamp_from_str("2023-05-21T00:00:00+00:00").unwrap();
        assert_eq!(eta, expected);

        assert!(close_eta("2023-05-18").is_err());
    }
}
