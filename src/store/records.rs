use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SocietyError;

/// Implements `Display`/`FromStr` for a unit enum using its wire names.
macro_rules! labelled_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = SocietyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok($ty::$variant),)+
                    _ => Err(SocietyError::InvalidChoice {
                        kind: $kind,
                        value: s.to_string(),
                        expected: [$($label),+].join(", "),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Society {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    pub created_at: DateTime<Utc>,
}

/// Authentication identity, kept apart from the society-scoped user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub email: String,
    pub salt: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Resident,
    Chairman,
    Secretary,
}

labelled_enum!(Role, "role", {
    Resident => "resident",
    Chairman => "chairman",
    Secretary => "secretary",
});

impl Role {
    /// Chairman and secretary run the society's notices, complaints and billing.
    pub fn is_committee(&self) -> bool {
        matches!(self, Role::Chairman | Role::Secretary)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Same value as the owning [`Identity`] id.
    pub id: u64,
    pub society_id: u64,
    pub flat_id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub flat_number: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flat {
    pub id: u64,
    pub society_id: u64,
    pub flat_number: String,
    pub owner_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "2-wheeler")]
    TwoWheeler,
    #[serde(rename = "4-wheeler")]
    FourWheeler,
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "commercial")]
    Commercial,
}

labelled_enum!(VehicleType, "vehicle type", {
    TwoWheeler => "2-wheeler",
    FourWheeler => "4-wheeler",
    Auto => "auto",
    Commercial => "commercial",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    pub society_id: u64,
    pub user_id: u64,
    pub flat_id: u64,
    pub number_plate: String,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoticeType {
    #[default]
    General,
    Urgent,
    Maintenance,
}

labelled_enum!(NoticeType, "notice type", {
    General => "general",
    Urgent => "urgent",
    Maintenance => "maintenance",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: u64,
    pub society_id: u64,
    pub created_by: u64,
    pub title: String,
    pub description: String,
    pub notice_type: NoticeType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[default]
    Open,
    Acknowledged,
    Resolved,
    Cleared,
}

labelled_enum!(ComplaintStatus, "complaint status", {
    Open => "open",
    Acknowledged => "acknowledged",
    Resolved => "resolved",
    Cleared => "cleared",
});

impl ComplaintStatus {
    /// The only status a complaint may move to from this one.
    pub fn next(&self) -> Option<ComplaintStatus> {
        match self {
            ComplaintStatus::Open => Some(ComplaintStatus::Acknowledged),
            ComplaintStatus::Acknowledged => Some(ComplaintStatus::Resolved),
            ComplaintStatus::Resolved => Some(ComplaintStatus::Cleared),
            ComplaintStatus::Cleared => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: u64,
    pub society_id: u64,
    pub filed_by: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cleared_at: Option<DateTime<Utc>>,
}

/// One society-wide billing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: u64,
    pub society_id: u64,
    /// `YYYY-MM`; several bills may share a month.
    pub bill_month: String,
    pub bill_year: i32,
    pub default_amount: f64,
    pub due_date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    #[default]
    Pending,
    Partial,
    Paid,
}

labelled_enum!(BillStatus, "bill status", {
    Pending => "pending",
    Partial => "partial",
    Paid => "paid",
});

/// A flat's share of a [`Bill`], carrying its running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatBill {
    pub id: u64,
    pub bill_id: u64,
    pub flat_id: u64,
    pub flat_number: String,
    pub society_id: u64,
    pub bill_amount: f64,
    pub adjusted_amount: f64,
    pub balance_due: f64,
    pub total_paid: f64,
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Upi,
    Cheque,
    BankTransfer,
    Neft,
}

labelled_enum!(PaymentMethod, "payment method", {
    Cash => "cash",
    Upi => "upi",
    Cheque => "cheque",
    BankTransfer => "bank_transfer",
    Neft => "neft",
});

/// Append-only record of money received against a [`FlatBill`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: u64,
    pub flat_bill_id: u64,
    pub flat_id: u64,
    pub flat_number: String,
    pub society_id: u64,
    pub amount_paid: f64,
    pub payment_method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub transaction_reference: String,
    #[serde(default)]
    pub remarks: String,
    pub recorded_by: u64,
    pub recorded_at: DateTime<Utc>,
}
