//! Authenticated session context.
//!
//! Holds the portal client and the resolved contract for one run; built
//! once and passed explicitly into command logic.

use fhc_client::{ApiClient, ContractClient};

use crate::config;
use crate::error::{CliError, Result};

pub struct Session {
    pub api: ApiClient,
    contract_token: String,
}

impl Session {
    /// Read the stored token and resolve the account's contract.
    ///
    /// The first contract on the account is the session contract; it must
    /// be ACTIVE.
    pub fn establish(base_url: &str, partnership: &str) -> Result<Self> {
        let token = config::read_token()?;
        let api = ApiClient::new(base_url, partnership, Some(token))?;

        let contracts = api.contracts()?;
        let contract = contracts.into_iter().next().ok_or(CliError::NoContract)?;
        if !contract.is_active() {
            return Err(CliError::ContractInactive(contract.state));
        }

        tracing::debug!("session established");
        Ok(Self {
            api,
            contract_token: contract.token,
        })
    }

    /// Client scoped to the session contract.
    #[must_use]
    pub fn contract(&self) -> ContractClient<'_> {
        self.api.contract(&self.contract_token)
    }
}
