//! Submit command: the claim-submission workflow.
//!
//! Sequence: audit trail, receipt extraction, model parsing, operator
//! review, feature gate, building resolution, document uploads,
//! service/person resolution, final submission. Each step either succeeds,
//! loops at a prompt, or aborts the whole run.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use fhc_client::{RefundSubmission, DEFAULT_BASE_URL, DEFAULT_PARTNERSHIP};

use crate::audit::AuditTrail;
use crate::cli::SubmitArgs;
use crate::config::{self, FileConfig, FEATURE_REFUNDS_SUBMISSION};
use crate::error::{CliError, Result};
use crate::llm::CompletionClient;
use crate::parser;
use crate::prompt::ConsolePrompter;
use crate::receipt::{self, ExtractOptions};
use crate::reconcile;
use crate::review;
use crate::session::Session;

pub fn run(args: SubmitArgs) -> Result<()> {
    let cfg = config::load()?;

    let audit_dir = match &cfg.audit.dir {
        Some(dir) => dir.clone(),
        None => config::default_audit_dir()?,
    };
    let audit = AuditTrail::create(&audit_dir)?;
    audit.init_logging(args.debug)?;
    tracing::info!(
        run = audit.prefix(),
        log = %audit.log_path().display(),
        receipt = %args.receipt.display(),
        "starting refund submission"
    );

    let result = execute(&args, &cfg, &audit);
    if let Err(e) = &result {
        // Full context goes to the audit file; the console gets one line.
        tracing::error!(error = ?e, "submission failed");
    }
    result
}

fn execute(args: &SubmitArgs, cfg: &FileConfig, audit: &AuditTrail) -> Result<()> {
    let mut prompter = ConsolePrompter;

    audit.copy_input(&args.receipt)?;
    for attachment in &args.attachments {
        audit.copy_input(attachment)?;
    }

    // Receipt -> content blocks.
    let options = ExtractOptions {
        dpi: args.vision_dpi.unwrap_or(config::DEFAULT_VISION_DPI),
        force_vision: args.force_vision,
        ..ExtractOptions::default()
    };
    let blocks = receipt::read_receipt(&args.receipt, &options)?;
    tracing::info!(
        blocks = blocks.len(),
        text = blocks.first().is_some_and(|b| b.is_text()),
        "receipt content prepared"
    );

    // Content blocks -> record.
    let llm = CompletionClient::new(llm_url(args, cfg), llm_key(args, cfg)?)?;
    let model_text = pick(&args.model_text, &cfg.llm.model_text, config::DEFAULT_MODEL_TEXT);
    let model_vision = pick(
        &args.model_vision,
        &cfg.llm.model_vision,
        config::DEFAULT_MODEL_VISION,
    );

    let spinner = make_spinner("Extracting receipt data...");
    let record = parser::extract_record(&llm, &blocks, &model_text, &model_vision);
    spinner.finish_and_clear();
    let mut record = record?;
    tracing::info!(invoice = %record.invoice_number, "receipt parsed");

    // Operator sign-off before anything touches the portal.
    review::review_record(&mut record, &mut prompter)?;
    tracing::info!(?record, "record confirmed by operator");

    let base_url = match &cfg.portal.base_url {
        Some(url) => url.clone(),
        None => DEFAULT_BASE_URL.to_string(),
    };
    let partnership = match &cfg.portal.partnership {
        Some(partnership) => partnership.clone(),
        None => DEFAULT_PARTNERSHIP.to_string(),
    };
    let session = Session::establish(&base_url, &partnership)?;
    let contract = session.contract();

    if !contract.validate_feature(FEATURE_REFUNDS_SUBMISSION)? {
        return Err(CliError::FeatureUnavailable("Refund submission".to_string()));
    }

    let (building, corrected_nif) = reconcile::resolve_building(
        |nif| Ok(contract.load_buildings(nif)?),
        &record.business_nif,
        &mut prompter,
    )?;
    record.business_nif = corrected_nif;
    tracing::info!(building = %building, "building resolved");

    // Receipt first, then attachments, guids in upload order.
    let spinner = make_spinner("Uploading documents...");
    let documents = match upload_documents(&session, args) {
        Ok(documents) => documents,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };
    spinner.finish_and_clear();
    tracing::info!(documents = documents.len(), "documents uploaded");

    let setup = contract.refunds_request_setup()?;
    let service = reconcile::resolve_service(setup.services, args.service.as_deref(), &mut prompter)?;
    let person = reconcile::resolve_person(setup.insured_persons, args.person.as_deref(), &mut prompter)?;
    tracing::info!(service = %service.name, person = %person.name, "claim context resolved");

    let submission = RefundSubmission {
        card_number: &person.card_number,
        service_id: service.id,
        entity_nif: &record.business_nif,
        invoice_number: &record.invoice_number,
        total_value: record.total_amount,
        expense_date: &record.date,
        documents: &documents,
        other_entity_payment: args.partially_covered,
        international_receipt: false,
        building_id: &building.id,
        email: &person.email,
    };
    contract.submit_refund_request(&submission)?;
    tracing::info!(invoice = %record.invoice_number, "refund request submitted");

    println!(
        "{} {} - {} on {} for {}",
        style("Submitted:").green().bold(),
        record.invoice_number,
        record.total_amount,
        record.date,
        person.name,
    );
    Ok(())
}

fn upload_documents(session: &Session, args: &SubmitArgs) -> Result<Vec<String>> {
    let mut documents = vec![session.api.upload_file(&args.receipt, true)?];
    for attachment in &args.attachments {
        documents.push(session.api.upload_file(attachment, false)?);
    }
    Ok(documents)
}

fn llm_url(args: &SubmitArgs, cfg: &FileConfig) -> String {
    pick(&args.llm_url, &cfg.llm.api_url, config::DEFAULT_LLM_URL)
}

/// CLI flag > config file > `OPENAI_API_KEY`. A key must come from somewhere.
fn llm_key(args: &SubmitArgs, cfg: &FileConfig) -> Result<String> {
    args.llm_key
        .clone()
        .or_else(|| cfg.llm.api_key.clone())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .ok_or_else(|| {
            CliError::Config(
                "no completion API key (use --llm-key, config.toml or OPENAI_API_KEY)".to_string(),
            )
        })
}

fn pick(flag: &Option<String>, file: &Option<String>, default: &str) -> String {
    flag.clone()
        .or_else(|| file.clone())
        .unwrap_or_else(|| default.to_string())
}

fn make_spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
