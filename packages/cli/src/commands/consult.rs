//! Consult command: paginated listing of submitted refunds.

use console::style;

use fhc_client::{DEFAULT_BASE_URL, DEFAULT_PARTNERSHIP};

use crate::audit::init_console_logging;
use crate::config::{self, FEATURE_REFUNDS_CONSULT};
use crate::error::{CliError, Result};
use crate::session::Session;

pub fn run() -> Result<()> {
    init_console_logging()?;
    let cfg = config::load()?;

    let base_url = cfg
        .portal
        .base_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let partnership = cfg
        .portal
        .partnership
        .unwrap_or_else(|| DEFAULT_PARTNERSHIP.to_string());

    let session = Session::establish(&base_url, &partnership)?;
    let contract = session.contract();

    if !contract.validate_feature(FEATURE_REFUNDS_CONSULT)? {
        return Err(CliError::FeatureUnavailable(
            "Refund consultation".to_string(),
        ));
    }

    let mut page = 1;
    loop {
        let listing = contract.unified_refunds(page)?;

        for refund in &listing.refunds {
            let Some(claim) = refund.claims.first() else {
                continue;
            };
            let received = if claim.total_insurer > 0.0 {
                style(claim.total_insurer).green()
            } else {
                style(claim.total_insurer).red()
            };
            println!(
                "{} ({})[{}] - {} - {} + {} = {}",
                claim.date_of_treatment,
                refund.expense_date,
                claim.service_name,
                refund.person_name,
                claim.total_co_payment,
                received,
                refund.total_value,
            );
        }

        if listing.pagination.current_page < listing.pagination.total_pages {
            page += 1;
        } else {
            break;
        }
    }

    Ok(())
}
