mod session;
mod settings;

pub use session::{clear_session, clear_user, load_session, save_society, save_user, Session};
pub use settings::{AuthSettings, BillingSettings, Config, GeneralSettings, ListSettings};

use crate::error::{Result, SocietyError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the data directory path (XDG config dir, or ~/.society/)
pub fn data_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "society") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.society/
    let home = dirs_home().ok_or_else(|| {
        SocietyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".society"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Fail unless `init` has created the data directory.
pub fn ensure_initialized(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        return Err(SocietyError::DataDirNotFound(data_dir.to_path_buf()));
    }
    Ok(())
}

/// Load config.toml
pub fn load_config(data_dir: &Path) -> Result<Config> {
    let path = data_dir.join("config.toml");
    if !path.exists() {
        return Err(SocietyError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| SocietyError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[general]
currency_symbol = "₹"

[auth]
min_password_length = 6

[billing]
title_format = "{month_name} {year} Maintenance"  # e.g., January 2026 Maintenance
due_day = 10  # default due date: this day of the bill month

[lists]
payment_history_limit = 50   # society-wide payment history
resident_history_limit = 10  # a resident's own payments
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.general.currency_symbol, "₹");
        assert_eq!(config.auth.min_password_length, 6);
        assert_eq!(config.billing.due_day, 10);
        assert_eq!(config.lists.payment_history_limit, 50);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[general]\ncurrency_symbol = \"Rs \"\n").unwrap();
        assert_eq!(config.general.currency_symbol, "Rs ");
        assert_eq!(config.lists.resident_history_limit, 10);
    }
}
