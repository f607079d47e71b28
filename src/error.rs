use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocietyError {
    #[error("Data directory not found at {0}. Run 'society init' to create it.")]
    DataDirNotFound(PathBuf),

    #[error("Data directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to read data file {path}: {source}")]
    DataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write data: {0}")]
    DataWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Validation: rejected before anything touches the store
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Invalid amount '{0}': must be a number of at least zero")]
    InvalidAmount(String),

    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid bill month '{0}'. Expected YYYY-MM.")]
    InvalidMonth(String),

    #[error("Invalid {kind} '{value}'. Expected one of: {expected}")]
    InvalidChoice {
        kind: &'static str,
        value: String,
        expected: String,
    },

    // Lookups
    #[error("Society '{0}' not found")]
    SocietyNotFound(String),

    #[error("A society named '{0}' already exists")]
    DuplicateSociety(String),

    #[error("No society selected. Run 'society select <id>' first.")]
    NoSocietySelected,

    #[error("Not logged in. Run 'society login' first.")]
    NotLoggedIn,

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Flat '{0}' not found in this society")]
    FlatNotFound(String),

    #[error("Bill {0} not found")]
    BillNotFound(u64),

    #[error("No bills have been created for this society yet")]
    NoBills,

    #[error("Unable to find bill {bill} for flat {flat}")]
    FlatBillNotFound { flat: String, bill: u64 },

    #[error("Vehicle not found")]
    VehicleNotFound,

    #[error("Vehicle {0} is already registered in this society")]
    DuplicateVehicle(String),

    #[error("Notice {0} not found")]
    NoticeNotFound(u64),

    #[error("Complaint {0} not found")]
    ComplaintNotFound(u64),

    // Backend rejections
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("An account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("User does not belong to this society")]
    NotAMember,

    #[error("Permission denied: {0}")]
    PermissionDenied(&'static str),

    #[error("Complaint {id} is {from}; it cannot move to {to}")]
    IllegalTransition {
        id: u64,
        from: String,
        to: String,
    },

    #[error("No flats registered in this society; nothing to bill")]
    NoFlats,
}

pub type Result<T> = std::result::Result<T, SocietyError>;
