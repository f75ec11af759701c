//! Per-contract endpoints.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::Result;
use crate::types::{Building, RefundRequestSetup, RefundSubmission, UnifiedRefunds};

/// Percent-encode everything except unreserved characters, so contract
/// tokens are safe as a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
struct ValidFeatureBody {
    valid: bool,
}

#[derive(Debug, Deserialize)]
struct BuildingsBody {
    #[serde(rename = "Buildings")]
    buildings: Vec<Building>,
}

/// Client scoped to a single contract.
pub struct ContractClient<'a> {
    api: &'a ApiClient,
    token: String,
}

impl<'a> ContractClient<'a> {
    pub(crate) fn new(api: &'a ApiClient, contract_token: &str) -> Self {
        Self {
            api,
            token: utf8_percent_encode(contract_token, PATH_SEGMENT).to_string(),
        }
    }

    fn path(&self, suffix: &str) -> String {
        format!("contracts/{}/{suffix}", self.token)
    }

    /// Check whether the contract grants a capability (e.g. refund submission).
    pub fn validate_feature(&self, feature: &str) -> Result<bool> {
        let payload = json!({ "feature": feature });
        let body: ValidFeatureBody = self
            .api
            .send(self.api.post(&self.path("validate-feature")).json(&payload))?;
        Ok(body.valid)
    }

    /// Reference data (services, insured persons) for composing a refund request.
    pub fn refunds_request_setup(&self) -> Result<RefundRequestSetup> {
        self.api
            .send(self.api.get(&self.path("refunds-requests/setup")))
    }

    /// Look up practice locations registered under a business tax identifier.
    ///
    /// Zero, one or many buildings may match.
    pub fn load_buildings(&self, nif: &str) -> Result<Vec<Building>> {
        let body: BuildingsBody = self.api.send(
            self.api
                .get(&self.path("buildings"))
                .query(&[("nif", nif)]),
        )?;
        Ok(body.buildings)
    }

    /// Submit a composed refund request. Not retried on failure.
    pub fn submit_refund_request(&self, submission: &RefundSubmission<'_>) -> Result<()> {
        tracing::debug!(
            invoice = submission.invoice_number,
            documents = submission.documents.len(),
            "submitting refund request"
        );
        self.api.send_ok(
            self.api
                .post(&self.path("refunds-requests/multiple"))
                .json(submission),
        )
    }

    /// One page of the unified refund listing.
    pub fn unified_refunds(&self, page: u32) -> Result<UnifiedRefunds> {
        self.api.send(
            self.api
                .get(&self.path("refunds/unified"))
                .query(&[("page", page)]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_token_is_path_encoded() {
        let api = ApiClient::new("https://example.net", "vic", None).unwrap();
        let contract = api.contract("a/b+c");
        assert_eq!(
            contract.path("validate-feature"),
            "contracts/a%2Fb%2Bc/validate-feature"
        );
    }

    #[test]
    fn test_unreserved_characters_pass_through() {
        let api = ApiClient::new("https://example.net", "vic", None).unwrap();
        let contract = api.contract("tok-en_1.2~x");
        assert_eq!(contract.path("buildings"), "contracts/tok-en_1.2~x/buildings");
    }
}
