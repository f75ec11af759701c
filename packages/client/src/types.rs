//! Result structures for portal endpoints.
//!
//! The portal answers in PascalCase (with the occasional misspelling);
//! serde aliases keep the Rust side conventional.

use serde::{Deserialize, Serialize};

/// A contract attached to the authenticated account.
#[derive(Debug, Clone, Deserialize)]
pub struct Contract {
    #[serde(rename = "Token")]
    pub token: String,

    /// Lifecycle state; only `ACTIVE` contracts can be operated on.
    #[serde(rename = "ContractState")]
    pub state: String,
}

impl Contract {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == "ACTIVE"
    }
}

/// A registered practice location, looked up by tax identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub address: String,
}

impl std::fmt::Display for Building {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.id, self.name)
    }
}

/// A refundable service offered under the contract.
#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    #[serde(rename = "Id")]
    pub id: i64,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "IsMandatoryInvoiceFile")]
    pub mandatory_invoice_file: bool,

    // "Aditional" is the portal's spelling, not ours.
    #[serde(rename = "IsMandatoryAditionalFile")]
    pub mandatory_additional_file: bool,
}

/// A person insured under the contract.
#[derive(Debug, Clone, Deserialize)]
pub struct InsuredPerson {
    #[serde(rename = "CardNumber")]
    pub card_number: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Email")]
    pub email: String,
}

/// Reference data needed to compose a refund request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundRequestSetup {
    #[serde(rename = "Services")]
    pub services: Vec<Service>,

    #[serde(rename = "InsuredPersons")]
    pub insured_persons: Vec<InsuredPerson>,
}

/// Composite refund submission payload. Sent exactly once per run.
#[derive(Debug, Serialize)]
pub struct RefundSubmission<'a> {
    #[serde(rename = "CardNumber")]
    pub card_number: &'a str,

    #[serde(rename = "ServiceId")]
    pub service_id: i64,

    #[serde(rename = "EntityNif")]
    pub entity_nif: &'a str,

    #[serde(rename = "InvoiceNumber")]
    pub invoice_number: &'a str,

    #[serde(rename = "TotalValue")]
    pub total_value: f64,

    #[serde(rename = "ExpenseDate")]
    pub expense_date: &'a str,

    /// Uploaded document guids, receipt first.
    #[serde(rename = "Documents")]
    pub documents: &'a [String],

    /// Expense was already partially covered by another entity.
    #[serde(rename = "OtherEntityPayment")]
    pub other_entity_payment: bool,

    #[serde(rename = "InternationalReceipt")]
    pub international_receipt: bool,

    #[serde(rename = "BuildingId")]
    pub building_id: &'a str,

    #[serde(rename = "Email")]
    pub email: &'a str,
}

/// One claim line inside a refund process.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundClaim {
    #[serde(rename = "DateOfTreatment")]
    pub date_of_treatment: String,

    #[serde(rename = "ServiceName")]
    pub service_name: String,

    #[serde(rename = "TotalCoPayment")]
    pub total_co_payment: f64,

    #[serde(rename = "TotalInsurer")]
    pub total_insurer: f64,
}

/// A refund process as listed by the unified consultation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Refund {
    #[serde(rename = "ProcessNr")]
    pub process_nr: Option<String>,

    #[serde(rename = "ExpenseDate")]
    pub expense_date: String,

    #[serde(rename = "PersonName")]
    pub person_name: String,

    #[serde(rename = "TotalValue")]
    pub total_value: f64,

    #[serde(rename = "Claims")]
    pub claims: Vec<RefundClaim>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationResult {
    #[serde(rename = "CurrentPage")]
    pub current_page: u32,

    #[serde(rename = "TotalPages")]
    pub total_pages: u32,
}

/// One page of the unified refund listing.
#[derive(Debug, Clone, Deserialize)]
pub struct UnifiedRefunds {
    #[serde(rename = "Refunds")]
    pub refunds: Vec<Refund>,

    #[serde(rename = "PaginationResult")]
    pub pagination: PaginationResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_is_active() {
        let contract: Contract =
            serde_json::from_str(r#"{"Token": "t0k", "ContractState": "ACTIVE"}"#).unwrap();
        assert!(contract.is_active());

        let contract: Contract =
            serde_json::from_str(r#"{"Token": "t0k", "ContractState": "SUSPENDED"}"#).unwrap();
        assert!(!contract.is_active());
    }

    #[test]
    fn test_service_aliases() {
        let service: Service = serde_json::from_str(
            r#"{"Id": 7, "Name": "Consulta", "IsMandatoryInvoiceFile": true, "IsMandatoryAditionalFile": false}"#,
        )
        .unwrap();
        assert_eq!(service.id, 7);
        assert_eq!(service.name, "Consulta");
        assert!(service.mandatory_invoice_file);
        assert!(!service.mandatory_additional_file);
    }

    #[test]
    fn test_building_display() {
        let building = Building {
            id: "b1".to_string(),
            name: "Hospital A".to_string(),
            address: "123 Main St".to_string(),
        };
        assert_eq!(building.to_string(), "b1 - Hospital A");
    }

    #[test]
    fn test_submission_serializes_portal_field_names() {
        let documents = vec!["guid-1".to_string(), "guid-2".to_string()];
        let submission = RefundSubmission {
            card_number: "123456789",
            service_id: 1,
            entity_nif: "505956985",
            invoice_number: "FR131329",
            total_value: 25.0,
            expense_date: "2025-10-11",
            documents: &documents,
            other_entity_payment: false,
            international_receipt: false,
            building_id: "b1",
            email: "someone@example.com",
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["CardNumber"], "123456789");
        assert_eq!(value["ServiceId"], 1);
        assert_eq!(value["Documents"][0], "guid-1");
        assert_eq!(value["OtherEntityPayment"], false);
        assert_eq!(value["BuildingId"], "b1");
    }
}
