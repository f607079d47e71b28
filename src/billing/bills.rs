use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info};

use super::payments::derive_status;
use crate::access::Actor;
use crate::config::BillingSettings;
use crate::error::{Result, SocietyError};
use crate::store::{Bill, BillStatus, Database, FlatBill, Store};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone)]
pub struct BillForm {
    /// `YYYY-MM`
    pub bill_month: String,
    pub default_amount: f64,
    pub due_date: NaiveDate,
    pub title: String,
    pub description: String,
}

/// Parse `YYYY-MM` into (year, month).
pub fn parse_bill_month(input: &str) -> Result<(i32, u32)> {
    let invalid = || SocietyError::InvalidMonth(input.to_string());
    let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Format bill title from template
fn format_bill_title(format: &str, year: i32, month: u32) -> String {
    let month_name = MONTH_NAMES[(month as usize).saturating_sub(1) % 12];
    format
        .replace("{month_name}", month_name)
        .replace("{month}", &format!("{:02}", month))
        .replace("{year}", &year.to_string())
}

/// Title for a bill month using the configured format.
pub fn default_title(settings: &BillingSettings, bill_month: &str) -> Result<String> {
    let (year, month) = parse_bill_month(bill_month)?;
    Ok(format_bill_title(&settings.title_format, year, month))
}

/// Configured due day of the bill month, pulled back to the month's last day.
pub fn default_due_date(settings: &BillingSettings, bill_month: &str) -> Result<NaiveDate> {
    let (year, month) = parse_bill_month(bill_month)?;
    let mut day = settings.due_day.clamp(1, 31);
    loop {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
        day -= 1;
    }
}

/// `YYYY-MM` for the given date.
pub fn month_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Outcome of folding a flat's outstanding balance into a new charge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarryForward {
    /// Signed sum of prior balances: positive is owed, negative is credit.
    pub prior_balance: f64,
    pub adjusted_amount: f64,
    pub status: BillStatus,
}

/// `adjusted = max(0, default + Σ prior)`. Credit beyond the new charge is
/// not carried as a negative balance; it is dropped at zero.
pub fn carry_forward(default_amount: f64, prior_balances: &[f64]) -> CarryForward {
    let prior_balance: f64 = prior_balances.iter().sum();
    let adjusted_amount = (default_amount + prior_balance).max(0.0);
    let status = if adjusted_amount == 0.0 {
        BillStatus::Paid
    } else {
        BillStatus::Pending
    };
    CarryForward {
        prior_balance,
        adjusted_amount,
        status,
    }
}

#[derive(Debug, Clone)]
pub struct BillRun {
    pub bill: Bill,
    pub flat_bills: Vec<FlatBill>,
}

fn validate(form: &BillForm) -> Result<(i32, u32)> {
    if form.bill_month.trim().is_empty() || form.title.trim().is_empty() {
        return Err(SocietyError::MissingFields("All required fields must be filled"));
    }
    if !form.default_amount.is_finite() || form.default_amount < 0.0 {
        return Err(SocietyError::InvalidAmount(form.default_amount.to_string()));
    }
    parse_bill_month(&form.bill_month)
}

/// Bill every flat of the actor's society, carrying each flat's outstanding
/// balance into its new flat bill. The whole run commits or nothing does.
pub fn create_bill(store: &mut Store, actor: Actor, form: &BillForm) -> Result<BillRun> {
    let (bill_year, _) = validate(form)?;

    let run = store.transaction(|db| {
        let creator = actor
            .committee(db, "only the chairman or secretary can create bills")?
            .id;
        let society_id = actor.society_id;

        let flats: Vec<(u64, String)> = db
            .flats_of(society_id)
            .into_iter()
            .map(|f| (f.id, f.flat_number.clone()))
            .collect();
        if flats.is_empty() {
            return Err(SocietyError::NoFlats);
        }

        let now = Utc::now();
        let bill = Bill {
            id: db.next_bill_id(),
            society_id,
            bill_month: form.bill_month.trim().to_string(),
            bill_year,
            default_amount: form.default_amount,
            due_date: form.due_date,
            title: form.title.trim().to_string(),
            description: form.description.trim().to_string(),
            created_by: creator,
            created_at: now,
        };
        db.bills.push(bill.clone());

        let mut flat_bills = Vec::with_capacity(flats.len());
        for (flat_id, flat_number) in flats {
            let mut priors = Vec::new();
            for prior in db.flat_bills.iter_mut().filter(|fb| fb.flat_id == flat_id) {
                priors.push(prior.balance_due);
                prior.balance_due = 0.0;
                prior.status = derive_status(prior.balance_due, prior.total_paid);
            }
            let outcome = carry_forward(form.default_amount, &priors);
            debug!(
                flat = %flat_number,
                prior = outcome.prior_balance,
                adjusted = outcome.adjusted_amount,
                "carried forward"
            );

            let flat_bill = FlatBill {
                id: db.next_flat_bill_id(),
                bill_id: bill.id,
                flat_id,
                flat_number,
                society_id,
                bill_amount: form.default_amount,
                adjusted_amount: outcome.adjusted_amount,
                balance_due: outcome.adjusted_amount,
                total_paid: 0.0,
                status: outcome.status,
                created_at: now,
            };
            db.flat_bills.push(flat_bill.clone());
            flat_bills.push(flat_bill);
        }

        Ok(BillRun { bill, flat_bills })
    })?;

    info!(
        bill_id = run.bill.id,
        flats = run.flat_bills.len(),
        amount = run.bill.default_amount,
        "bill created"
    );
    Ok(run)
}

/// Bills of a society, newest first.
pub fn list_bills(db: &Database, society_id: u64) -> Vec<&Bill> {
    let mut bills: Vec<&Bill> = db
        .bills
        .iter()
        .filter(|b| b.society_id == society_id)
        .collect();
    bills.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    bills
}

/// The most recently created bill of a society.
pub fn latest_bill(db: &Database, society_id: u64) -> Option<&Bill> {
    list_bills(db, society_id).into_iter().next()
}

/// A specific bill, or the latest one when no id is given.
pub fn resolve_bill(db: &Database, society_id: u64, bill_id: Option<u64>) -> Result<&Bill> {
    match bill_id {
        Some(id) => db.bill(society_id, id),
        None => latest_bill(db, society_id).ok_or(SocietyError::NoBills),
    }
}
