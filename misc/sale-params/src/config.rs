use crate::account_address_from_str;
use anyhow::{anyhow, Context, Result};
use concordium_std::{Address, Amount};
use sale_utils::types::{AllowedParticipantsParams, MicroCcd, SaleTerms};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sale terms as written in the JSON config file, in micro CCD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaleConfig {
    pub minimum_allocation: MicroCcd,
    pub maximum_allocation: MicroCcd,
    pub total_allocations_limit: MicroCcd,
    pub close_allocations_remainder: MicroCcd,
}

impl SaleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read the sale config {:?}.", path))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Could not parse the sale config.")
    }

    /// Checks the terms with the same rules the contract applies in `startSale`.
    pub fn to_terms(&self) -> Result<SaleTerms> {
        SaleTerms::new(
            Amount::from_micro_ccd(self.minimum_allocation),
            Amount::from_micro_ccd(self.maximum_allocation),
            Amount::from_micro_ccd(self.total_allocations_limit),
            Amount::from_micro_ccd(self.close_allocations_remainder),
        )
        .map_err(|e| anyhow!("Invalid sale terms: {:?}", e))
    }
}

pub fn load_participants(path: &Path) -> Result<AllowedParticipantsParams> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read the participant list {:?}.", path))?;
    participants_from_json(&json)
}

pub fn participants_from_json(json: &str) -> Result<AllowedParticipantsParams> {
    let accounts: Vec<String> =
        serde_json::from_str(json).context("Expected a JSON list of account addresses.")?;

    let participants = accounts
        .iter()
        .map(|account| {
            account_address_from_str(account)
                .map(Address::Account)
                .with_context(|| format!("Invalid account address {:?}.", account))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AllowedParticipantsParams { participants })
}
