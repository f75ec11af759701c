//! Configuration constants, the optional config file and token storage.
//!
//! Precedence for every tunable is CLI flag > `config.toml` > built-in
//! default. The config file lives in the platform config directory and is
//! entirely optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CliError, Result};

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "fhc";

/// Config file name inside [`APP_DIR`].
pub const CONFIG_FILENAME: &str = "config.toml";

/// Token file name inside [`APP_DIR`].
pub const TOKEN_FILENAME: &str = "token.txt";

/// Feature gate required for submitting refund requests.
pub const FEATURE_REFUNDS_SUBMISSION: &str = "REFUNDS_SUBMISSION";

/// Feature gate required for the refund listing.
pub const FEATURE_REFUNDS_CONSULT: &str = "REFUNDS_CONSULT";

/// Default completion endpoint.
pub const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1";

/// Default model for receipts with an extractable text layer.
pub const DEFAULT_MODEL_TEXT: &str = "gpt-4o-mini";

/// Default model for receipts sent as page images.
pub const DEFAULT_MODEL_VISION: &str = "gpt-4o";

/// Response budget for the extraction call. The record is small; anything
/// past this is the model rambling.
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 500;

/// Minimum extracted-text length before a PDF is trusted as text input.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Default render resolution for vision input.
pub const DEFAULT_VISION_DPI: u32 = 200;

/// Optional config file contents.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub portal: PortalConfig,
    pub llm: LlmConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: Option<String>,
    pub partnership: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model_text: Option<String>,
    pub model_vision: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub dir: Option<PathBuf>,
}

/// Platform config directory for this tool.
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| CliError::Config("no config directory on this platform".to_string()))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILENAME))
}

pub fn token_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(TOKEN_FILENAME))
}

/// Default location for per-run audit logs and input copies.
pub fn default_audit_dir() -> Result<PathBuf> {
    Ok(config_dir()?.join("runs"))
}

/// Load the config file; a missing file is an empty config.
pub fn load() -> Result<FileConfig> {
    parse_config_file(&config_path()?)
}

fn parse_config_file(path: &Path) -> Result<FileConfig> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&raw)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
}

/// Read the stored bearer token. Absence means "not logged in".
pub fn read_token() -> Result<String> {
    let path = token_path()?;
    match fs::read_to_string(&path) {
        Ok(token) => Ok(token.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CliError::NotLoggedIn),
        Err(e) => Err(e.into()),
    }
}

/// Store the bearer token with owner-only permissions.
pub fn write_token(token: &str) -> Result<()> {
    let path = token_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        restrict_permissions(parent, 0o700)?;
    }
    fs::write(&path, token)?;
    restrict_permissions(&path, 0o600)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_config() {
        let cfg: FileConfig = toml::from_str(
            r#"
            [portal]
            base_url = "https://staging.example.net/api/"
            partnership = "other"

            [llm]
            api_url = "http://localhost:11434/v1"
            model_text = "llama3"

            [audit]
            dir = "/tmp/fhc-runs"
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.portal.base_url.as_deref(),
            Some("https://staging.example.net/api/")
        );
        assert_eq!(cfg.llm.model_text.as_deref(), Some("llama3"));
        assert_eq!(cfg.llm.model_vision, None);
        assert_eq!(cfg.audit.dir, Some(PathBuf::from("/tmp/fhc-runs")));
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let cfg: FileConfig = toml::from_str("").unwrap();
        assert!(cfg.portal.base_url.is_none());
        assert!(cfg.llm.api_key.is_none());
        assert!(cfg.audit.dir.is_none());
    }

    #[test]
    fn test_missing_config_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = parse_config_file(&dir.path().join("nope.toml")).unwrap();
        assert!(cfg.portal.base_url.is_none());
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "portal = 3").unwrap();
        assert!(matches!(
            parse_config_file(&path),
            Err(CliError::Config(_))
        ));
    }
}
