//! Row store standing in for the hosted backend.
//!
//! Every table lives in one [`Database`] value persisted as `data.json`.
//! Writes go through [`Store::transaction`]: the closure works on a staged
//! copy, and only a closure that returns `Ok` gets written (temp file, then
//! rename) and becomes the current state. A failed multi-row operation
//! therefore leaves both the file and the in-memory copy untouched.

mod auth;
pub mod records;

pub use auth::{authenticate, create_identity, hash_password, normalize_email};
pub use records::{
    Bill, BillStatus, Complaint, ComplaintStatus, Flat, FlatBill, Identity, Notice, NoticeType,
    PaymentMethod, PaymentTransaction, Role, Society, User, Vehicle, VehicleType,
};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SocietyError};

pub const DATA_FILE: &str = "data.json";

/// Next id to hand out per table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    pub society: u64,
    pub identity: u64,
    pub flat: u64,
    pub vehicle: u64,
    pub notice: u64,
    pub complaint: u64,
    pub bill: u64,
    pub flat_bill: u64,
    pub payment: u64,
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            society: 1,
            identity: 1,
            flat: 1,
            vehicle: 1,
            notice: 1,
            complaint: 1,
            bill: 1,
            flat_bill: 1,
            payment: 1,
        }
    }
}

fn take(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter += 1;
    id
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub sequence: Sequence,
    #[serde(default)]
    pub societies: Vec<Society>,
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub flats: Vec<Flat>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub notices: Vec<Notice>,
    #[serde(default)]
    pub complaints: Vec<Complaint>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub flat_bills: Vec<FlatBill>,
    #[serde(default)]
    pub payments: Vec<PaymentTransaction>,
}

impl Database {
    pub fn next_society_id(&mut self) -> u64 {
        take(&mut self.sequence.society)
    }

    pub fn next_identity_id(&mut self) -> u64 {
        take(&mut self.sequence.identity)
    }

    pub fn next_flat_id(&mut self) -> u64 {
        take(&mut self.sequence.flat)
    }

    pub fn next_vehicle_id(&mut self) -> u64 {
        take(&mut self.sequence.vehicle)
    }

    pub fn next_notice_id(&mut self) -> u64 {
        take(&mut self.sequence.notice)
    }

    pub fn next_complaint_id(&mut self) -> u64 {
        take(&mut self.sequence.complaint)
    }

    pub fn next_bill_id(&mut self) -> u64 {
        take(&mut self.sequence.bill)
    }

    pub fn next_flat_bill_id(&mut self) -> u64 {
        take(&mut self.sequence.flat_bill)
    }

    pub fn next_payment_id(&mut self) -> u64 {
        take(&mut self.sequence.payment)
    }

    pub fn society(&self, id: u64) -> Result<&Society> {
        self.societies
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SocietyError::SocietyNotFound(id.to_string()))
    }

    pub fn user(&self, id: u64) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| SocietyError::UserNotFound(id.to_string()))
    }

    pub fn user_mut(&mut self, id: u64) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| SocietyError::UserNotFound(id.to_string()))
    }

    pub fn flat(&self, id: u64) -> Result<&Flat> {
        self.flats
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| SocietyError::FlatNotFound(id.to_string()))
    }

    pub fn flat_by_number(&self, society_id: u64, flat_number: &str) -> Option<&Flat> {
        self.flats
            .iter()
            .find(|f| f.society_id == society_id && f.flat_number == flat_number)
    }

    /// Flats of a society ordered by flat number.
    pub fn flats_of(&self, society_id: u64) -> Vec<&Flat> {
        let mut flats: Vec<&Flat> = self
            .flats
            .iter()
            .filter(|f| f.society_id == society_id)
            .collect();
        flats.sort_by(|a, b| a.flat_number.cmp(&b.flat_number));
        flats
    }

    /// Residents linked to a flat.
    pub fn residents_of(&self, flat_id: u64) -> Vec<&User> {
        self.users.iter().filter(|u| u.flat_id == flat_id).collect()
    }

    pub fn bill(&self, society_id: u64, id: u64) -> Result<&Bill> {
        self.bills
            .iter()
            .find(|b| b.id == id && b.society_id == society_id)
            .ok_or(SocietyError::BillNotFound(id))
    }

    pub fn flat_bill(&self, id: u64) -> Option<&FlatBill> {
        self.flat_bills.iter().find(|fb| fb.id == id)
    }

    pub fn flat_bill_for(&self, flat_id: u64, bill_id: u64) -> Option<&FlatBill> {
        self.flat_bills
            .iter()
            .find(|fb| fb.flat_id == flat_id && fb.bill_id == bill_id)
    }
}

pub fn load_database(path: &Path) -> Result<Database> {
    if !path.exists() {
        return Ok(Database::default());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SocietyError::DataParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write through a sibling temp file so readers never see a half-written file.
pub fn save_database(path: &Path, db: &Database) -> Result<()> {
    let content =
        serde_json::to_string_pretty(db).map_err(|e| SocietyError::DataWrite(e.to_string()))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, content)?;
    fs::rename(&staging, path)?;
    Ok(())
}

pub struct Store {
    path: Option<PathBuf>,
    db: Database,
}

impl Store {
    /// Open the store kept in `data_dir`; a missing data file is an empty store.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(DATA_FILE);
        let db = load_database(&path)?;
        debug!(path = %path.display(), "opened store");
        Ok(Self {
            path: Some(path),
            db,
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            db: Database::default(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Run `work` as one unit: all of its writes are committed, or none are.
    pub fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T>,
    {
        let mut staged = self.db.clone();
        let out = work(&mut staged)?;
        if let Some(path) = &self.path {
            save_database(path, &staged)?;
        }
        self.db = staged;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn add_society(db: &mut Database, name: &str) -> u64 {
        let id = db.next_society_id();
        db.societies.push(Society {
            id,
            name: name.to_string(),
            address: String::new(),
            city: String::new(),
            created_at: Utc::now(),
        });
        id
    }

    #[test]
    fn test_failed_transaction_leaves_state_untouched() {
        let mut store = Store::in_memory();
        store
            .transaction(|db| {
                add_society(db, "Green Meadows");
                Ok(())
            })
            .unwrap();

        let result: Result<()> = store.transaction(|db| {
            add_society(db, "Blue Ridge");
            Err(SocietyError::NoFlats)
        });

        assert!(result.is_err());
        assert_eq!(store.db().societies.len(), 1);
        assert_eq!(store.db().sequence.society, 2);
    }

    #[test]
    fn test_committed_transaction_is_persisted() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        store
            .transaction(|db| {
                add_society(db, "Green Meadows");
                Ok(())
            })
            .unwrap();

        let reopened = Store::open(dir.path()).unwrap();
        assert_eq!(reopened.db().societies.len(), 1);
        assert_eq!(reopened.db().societies[0].name, "Green Meadows");
        assert!(!dir.path().join("data.json.tmp").exists());
    }

    #[test]
    fn test_rolled_back_transaction_does_not_write_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = Store::open(dir.path()).unwrap();
        let _ = store.transaction(|db| {
            add_society(db, "Green Meadows");
            Err::<(), _>(SocietyError::NoFlats)
        });
        assert!(!dir.path().join(DATA_FILE).exists());
    }
}
