use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub billing: BillingSettings,
    #[serde(default)]
    pub lists: ListSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GeneralSettings {
    pub currency_symbol: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthSettings {
    pub min_password_length: usize,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            min_password_length: 6,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BillingSettings {
    /// Supports `{month_name}`, `{month}` and `{year}`.
    pub title_format: String,
    /// Day of the bill month used as the due date when none is given.
    pub due_day: u32,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            title_format: "{month_name} {year} Maintenance".to_string(),
            due_day: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListSettings {
    pub payment_history_limit: usize,
    pub resident_history_limit: usize,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            payment_history_limit: 50,
            resident_history_limit: 10,
        }
    }
}
