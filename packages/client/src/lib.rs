//! Typed client for the Future Healthcare reimbursement portal.
//!
//! Every endpoint returns an explicit result structure instead of raw JSON,
//! and every failure maps onto [`ClientError`]:
//!
//! - non-200 responses become [`ClientError::Api`] with the portal's own
//!   message and status (login failures get the dedicated
//!   [`ClientError::Login`]),
//! - a 200 whose envelope says `success = false` is a
//!   [`ClientError::ProtocolViolation`],
//! - transport problems surface as [`ClientError::Http`].
//!
//! There is no retry policy here; callers decide what a failed call means.
//!
//! # Modules
//!
//! - [`api`]: the authenticated session ([`ApiClient`])
//! - [`contract`]: endpoints scoped to one contract ([`ContractClient`])
//! - [`types`]: result structures per endpoint
//! - [`error`]: error taxonomy and `Result` alias

pub mod api;
pub mod contract;
pub mod error;
pub mod types;

pub use api::{ApiClient, DEFAULT_BASE_URL, DEFAULT_PARTNERSHIP};
pub use contract::ContractClient;
pub use error::{ClientError, Result};
pub use types::{
    Building, Contract, InsuredPerson, Refund, RefundRequestSetup, RefundSubmission, Service,
    UnifiedRefunds,
};
