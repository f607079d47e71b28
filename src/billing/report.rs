use crate::access::Actor;
use crate::error::Result;
use crate::store::{Bill, Database, FlatBill, User};

use super::bills::resolve_bill;
use super::payments::EPSILON;

/// An unpaid flat bill together with the residents to chase for it.
#[derive(Debug)]
pub struct Defaulter<'a> {
    pub flat_bill: &'a FlatBill,
    pub residents: Vec<&'a User>,
}

/// Flat bills of `bill_id` (default: latest bill) with money still owing on
/// them, by flat number. A bill carried forward owes nothing itself.
pub fn defaulters(
    db: &Database,
    actor: Actor,
    bill_id: Option<u64>,
) -> Result<(&Bill, Vec<Defaulter<'_>>)> {
    actor.committee(db, "only the chairman or secretary can view defaulters")?;
    let bill = resolve_bill(db, actor.society_id, bill_id)?;

    let mut unpaid: Vec<&FlatBill> = db
        .flat_bills
        .iter()
        .filter(|fb| fb.bill_id == bill.id && fb.balance_due > EPSILON)
        .collect();
    unpaid.sort_by(|a, b| a.flat_number.cmp(&b.flat_number));

    let rows = unpaid
        .into_iter()
        .map(|flat_bill| Defaulter {
            flat_bill,
            residents: db.residents_of(flat_bill.flat_id),
        })
        .collect();
    Ok((bill, rows))
}

/// Collection figures for one bill.
#[derive(Debug, Clone, PartialEq)]
pub struct BillOverview {
    pub total_flats: usize,
    pub paid_flats: usize,
    pub pending_flats: usize,
    pub total_collected: f64,
    pub total_pending: f64,
    /// Rounded percentage of flats fully paid.
    pub collection_rate: u32,
}

pub fn summarize(flat_bills: &[&FlatBill]) -> BillOverview {
    let total_flats = flat_bills.len();
    let paid_flats = flat_bills
        .iter()
        .filter(|fb| fb.balance_due <= EPSILON)
        .count();
    let collection_rate = if total_flats > 0 {
        ((paid_flats as f64 / total_flats as f64) * 100.0).round() as u32
    } else {
        0
    };

    BillOverview {
        total_flats,
        paid_flats,
        pending_flats: total_flats - paid_flats,
        total_collected: flat_bills.iter().map(|fb| fb.total_paid).sum(),
        total_pending: flat_bills.iter().map(|fb| fb.balance_due).sum(),
        collection_rate,
    }
}

pub fn bill_overview(
    db: &Database,
    actor: Actor,
    bill_id: Option<u64>,
) -> Result<(&Bill, BillOverview)> {
    actor.committee(db, "only the chairman or secretary can view the billing overview")?;
    let bill = resolve_bill(db, actor.society_id, bill_id)?;
    let flat_bills: Vec<&FlatBill> = db
        .flat_bills
        .iter()
        .filter(|fb| fb.bill_id == bill.id)
        .collect();
    Ok((bill, summarize(&flat_bills)))
}
