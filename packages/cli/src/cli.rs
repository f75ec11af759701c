//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands;
use crate::error::Result;

/// CLI for the Future Healthcare reimbursement portal.
#[derive(Parser)]
#[command(name = "fhc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authenticate against the portal and store the bearer token.
    Login {
        /// Username; prompted when missing
        #[arg(short, long)]
        username: Option<String>,

        /// Password; prompted (hidden) when missing
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Submit a reimbursement claim from a receipt file.
    Submit(SubmitArgs),

    /// List submitted refunds and what the insurer paid on each.
    Consult,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Receipt file (PDF or image)
    pub receipt: PathBuf,

    /// Additional supporting documents, uploaded after the receipt
    pub attachments: Vec<PathBuf>,

    /// Name of the insured person. If not specified or multiple matches,
    /// it will be prompted interactively
    #[arg(short, long)]
    pub person: Option<String>,

    /// Name of the service to request refund. If not specified or multiple
    /// matches, it will be prompted interactively
    #[arg(short, long)]
    pub service: Option<String>,

    /// Send page images to the model even when the receipt has extractable text
    #[arg(long)]
    pub force_vision: bool,

    /// Render resolution for vision input
    #[arg(long)]
    pub vision_dpi: Option<u32>,

    /// Completion model for text receipts
    #[arg(long)]
    pub model_text: Option<String>,

    /// Completion model for image receipts
    #[arg(long)]
    pub model_vision: Option<String>,

    /// Completion endpoint base URL
    #[arg(long)]
    pub llm_url: Option<String>,

    /// Completion endpoint API key
    #[arg(long)]
    pub llm_key: Option<String>,

    /// The expense was already partially covered by another entity
    #[arg(long)]
    pub partially_covered: bool,

    /// Mirror full log detail to the console
    #[arg(short, long)]
    pub debug: bool,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login { username, password } => commands::login::run(username, password),
        Commands::Submit(args) => commands::submit::run(args),
        Commands::Consult => commands::consult::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_submit() {
        let cli = Cli::parse_from(["fhc", "submit", "receipt.pdf"]);

        let Commands::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.receipt, PathBuf::from("receipt.pdf"));
        assert!(args.attachments.is_empty());
        assert!(args.person.is_none());
        assert!(!args.force_vision);
        assert!(!args.partially_covered);
    }

    #[test]
    fn test_cli_parse_submit_with_attachments_and_hints() {
        let cli = Cli::parse_from([
            "fhc",
            "submit",
            "receipt.pdf",
            "prescription.pdf",
            "referral.jpg",
            "--person",
            "John",
            "-s",
            "Medical",
            "--force-vision",
            "--vision-dpi",
            "300",
        ]);

        let Commands::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.attachments.len(), 2);
        assert_eq!(args.person.as_deref(), Some("John"));
        assert_eq!(args.service.as_deref(), Some("Medical"));
        assert!(args.force_vision);
        assert_eq!(args.vision_dpi, Some(300));
    }

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::parse_from(["fhc", "login", "-u", "someone"]);

        let Commands::Login { username, password } = cli.command else {
            panic!("expected login");
        };
        assert_eq!(username.as_deref(), Some("someone"));
        assert!(password.is_none());
    }

    #[test]
    fn test_cli_requires_receipt_for_submit() {
        assert!(Cli::try_parse_from(["fhc", "submit"]).is_err());
    }
}
