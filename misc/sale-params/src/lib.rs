pub mod cmd;
pub mod config;

use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{ArgAction, Parser, Subcommand};
use concordium_std::{AccountAddress, Timestamp};
use std::path::PathBuf;

const ACCOUNT_ADDRESS_SIZE: usize = 32;
/// Version byte of base58check encoded account addresses.
const ACCOUNT_ADDRESS_VERSION: u8 = 1;

/// Builds the parameters of the fundraising sale contract
#[derive(Parser, Debug)]
#[command(name = "SaleParams", version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print debug output
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// hex encoded parameter for startSale
    Start {
        #[arg(
            short,
            long,
            default_value = "./data/sale.json",
            value_name = "PATH"
        )]
        config: PathBuf,
    },
    /// hex encoded parameter for addAllowedParticipants
    Allow {
        /// JSON list of account addresses
        #[arg(short, long, value_name = "PATH")]
        participants: PathBuf,
    },
    /// earliest time the owner can close a sale which is not full
    CloseEta {
        /// sale start in RFC 3339, ex) 2023-05-18T00:00:00+09:00
        start: String,
    },
}

pub fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();
}

pub fn timestamp_from_str(ts: &str) -> Result<Timestamp> {
    let time = DateTime::parse_from_rfc3339(ts)?;
    let millis = time.timestamp_millis();
    if millis < 0 {
        bail!("timestamp before 1970-01-01 is not supported");
    }
    Ok(Timestamp::from_timestamp_millis(millis as u64))
}

pub fn timestamp_to_datetime(ts: Timestamp) -> Result<DateTime<Utc>> {
    let millis = i64::try_from(ts.timestamp_millis())?;
    match Utc.timestamp_millis_opt(millis).single() {
        Some(datetime) => Ok(datetime),
        None => bail!("timestamp out of range"),
    }
}

pub fn account_address_from_str(v: &str) -> Result<AccountAddress> {
    let mut buf = [0xff; 1 + ACCOUNT_ADDRESS_SIZE + 4];
    let len = bs58::decode(v)
        .with_check(Some(ACCOUNT_ADDRESS_VERSION))
        .into(&mut buf)?;

    if len != 1 + ACCOUNT_ADDRESS_SIZE {
        bail!("invalid byte length");
    }

    let mut address_bytes = [0u8; ACCOUNT_ADDRESS_SIZE];
    address_bytes.copy_from_slice(&buf[1..1 + ACCOUNT_ADDRESS_SIZE]);
    Ok(AccountAddress(address_bytes))
}

pub fn account_address_to_string(address: &AccountAddress) -> String {
    bs58::encode(address.0)
        .with_check_version(ACCOUNT_ADDRESS_VERSION)
        .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_address_from_str() {
        let address = account_address_from_str("3jfAuU1c4kPE6GkpfYw4KcgvJngkgpFrD9SkDBgFW3aHmVB5r1");
        assert!(address.is_ok());
        assert_eq!(
            account_address_to_string(&address.unwrap()),
            "3jfAuU1c4kPE6GkpfYw4KcgvJngkgpFrD9SkDBgFW3aHmVB5r1"
        );
    }

    #[test]
    fn test_account_address_roundtrip() {
        let address = AccountAddress([7u8; 32]);
        let encoded = account_address_to_string(&address);
        assert_eq!(account_address_from_str(&encoded).unwrap(), address);
    }

    #[test]
    fn test_account_address_rejects_garbage() {
        assert!(account_address_from_str("").is_err());
        assert!(account_address_from_str("not-base58-0OIl").is_err());
        // checksum broken by the last character
        assert!(account_address_from_str("3jfAuU1c4kPE6GkpfYw4KcgvJngkgpFrD9SkDBgFW3aHmVB5r2").is_err());
        // valid base58check but a different version byte
        let other = bs58::encode([9u8; 32]).with_check_version(2).into_string();
        assert!(account_address_from_str(&other).is_err());
    }

    #[test]
    fn test_timestamp_from_str() {
        let ts = timestamp_from_str("2017-11-12T17:33:44+00:00").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_510_508_024_000);

        let ts = timestamp_from_str("2017-11-12T17:33:44+09:00").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_510_508_024_000 - 9 * 60 * 60 * 1000);

        assert!(timestamp_from_str("1969-12-31T23:59:59+00:00").is_err());
        assert!(timestamp_from_str("yesterday").is_err());
    }

    #[test]
    fn test_timestamp_to_datetime() {
        let ts = Timestamp::from_timestamp_millis(1_510_508_024_000);
        let datetime = timestamp_to_datetime(ts).unwrap();
        assert_eq!(datetime.to_rfc3339(), "2017-11-12T17:33:44+00:00");
    }
}
