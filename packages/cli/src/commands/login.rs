//! Login command: authenticate and store the bearer token.

use console::style;

use fhc_client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_PARTNERSHIP};

use crate::audit::init_console_logging;
use crate::config;
use crate::error::Result;
use crate::prompt::{password, ConsolePrompter, Prompter};

pub fn run(username: Option<String>, password_arg: Option<String>) -> Result<()> {
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

    let mut prompter = ConsolePrompter;
    let username = match username {
        Some(username) => username,
        None => prompter.input("Username", None)?,
    };
    let secret = match password_arg {
        Some(secret) => secret,
        None => password("Password")?,
    };

    let mut api = ApiClient::new(&base_url, &partnership, None)?;
    let token = api.login(&username, &secret)?;
    config::write_token(&token)?;

    println!("{}", style("Login succeeded").green());
    Ok(())
}
