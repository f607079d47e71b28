use chrono::{NaiveDate, Utc};
use tracing::info;

use super::bills::latest_bill;
use crate::access::{require, Actor};
use crate::error::{Result, SocietyError};
use crate::residents::normalize_flat_number;
use crate::store::{
    Bill, BillStatus, Database, Flat, FlatBill, PaymentMethod, PaymentTransaction, Store,
};

/// Balances within this distance of zero count as settled.
pub(crate) const EPSILON: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct PaymentForm {
    pub flat_number: String,
    pub bill_id: u64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    pub reference: String,
    pub remarks: String,
}

/// Status label implied by a flat bill's running totals.
pub fn derive_status(balance_due: f64, total_paid: f64) -> BillStatus {
    if balance_due <= EPSILON {
        BillStatus::Paid
    } else if total_paid > EPSILON {
        BillStatus::Partial
    } else {
        BillStatus::Pending
    }
}

/// Apply a received amount to a flat bill's running totals.
///
/// The balance moves by the amount. A flat bill already carried forward sits
/// at zero, so paying it leaves credit for the next bill.
fn apply_payment(flat_bill: &mut FlatBill, amount: f64) {
    flat_bill.total_paid += amount;
    flat_bill.balance_due -= amount;
    flat_bill.status = derive_status(flat_bill.balance_due, flat_bill.total_paid);
}

#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub transaction: PaymentTransaction,
    pub flat_bill: FlatBill,
}

/// Append a payment and bring its flat bill's totals up to date, as one unit.
/// Paying more than is due leaves a negative balance, which the next bill
/// treats as credit.
pub fn record_payment(store: &mut Store, actor: Actor, form: &PaymentForm) -> Result<PaymentReceipt> {
    require(&form.flat_number, "Flat, bill, and amount are required")?;
    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Err(SocietyError::InvalidPaymentAmount);
    }
    let flat_number = normalize_flat_number(&form.flat_number);

    let receipt = store.transaction(|db| {
        let recorder = actor
            .committee(db, "only the chairman or secretary can record payments")?
            .id;
        let society_id = actor.society_id;
        db.bill(society_id, form.bill_id)?;
        let flat_id = db
            .flat_by_number(society_id, &flat_number)
            .ok_or_else(|| SocietyError::FlatNotFound(flat_number.clone()))?
            .id;

        let flat_bill = db
            .flat_bills
            .iter_mut()
            .find(|fb| fb.flat_id == flat_id && fb.bill_id == form.bill_id)
            .ok_or_else(|| SocietyError::FlatBillNotFound {
                flat: flat_number.clone(),
                bill: form.bill_id,
            })?;
        apply_payment(flat_bill, form.amount);
        let flat_bill = flat_bill.clone();

        let transaction = PaymentTransaction {
            id: db.next_payment_id(),
            flat_bill_id: flat_bill.id,
            flat_id,
            flat_number: flat_number.clone(),
            society_id,
            amount_paid: form.amount,
            payment_method: form.method,
            payment_date: form.payment_date,
            transaction_reference: form.reference.trim().to_string(),
            remarks: form.remarks.trim().to_string(),
            recorded_by: recorder,
            recorded_at: Utc::now(),
        };
        db.payments.push(transaction.clone());

        Ok(PaymentReceipt {
            transaction,
            flat_bill,
        })
    })?;

    info!(
        payment_id = receipt.transaction.id,
        flat = %receipt.transaction.flat_number,
        amount = receipt.transaction.amount_paid,
        status = %receipt.flat_bill.status,
        "payment recorded"
    );
    Ok(receipt)
}

#[derive(Debug)]
pub struct PaymentView<'a> {
    pub payment: &'a PaymentTransaction,
    pub bill: Option<&'a Bill>,
    pub bill_amount: Option<f64>,
}

fn view<'a>(db: &'a Database, payment: &'a PaymentTransaction) -> PaymentView<'a> {
    let flat_bill = db.flat_bill(payment.flat_bill_id);
    PaymentView {
        payment,
        bill: flat_bill.and_then(|fb| db.bills.iter().find(|b| b.id == fb.bill_id)),
        bill_amount: flat_bill.map(|fb| fb.bill_amount),
    }
}

/// Society-wide payments, most recently recorded first.
pub fn payment_history(
    db: &Database,
    actor: Actor,
    limit: usize,
) -> Result<Vec<PaymentView<'_>>> {
    actor.committee(db, "only the chairman or secretary can view all payments")?;
    let mut payments: Vec<&PaymentTransaction> = db
        .payments
        .iter()
        .filter(|p| p.society_id == actor.society_id)
        .collect();
    payments.sort_by(|a, b| (b.recorded_at, b.id).cmp(&(a.recorded_at, a.id)));
    Ok(payments
        .into_iter()
        .take(limit)
        .map(|p| view(db, p))
        .collect())
}

/// One flat's payments, latest payment date first.
pub fn flat_payments(db: &Database, flat_id: u64, limit: usize) -> Vec<PaymentView<'_>> {
    let mut payments: Vec<&PaymentTransaction> =
        db.payments.iter().filter(|p| p.flat_id == flat_id).collect();
    payments.sort_by(|a, b| (b.payment_date, b.id).cmp(&(a.payment_date, a.id)));
    payments
        .into_iter()
        .take(limit)
        .map(|p| view(db, p))
        .collect()
}

/// Advance (positive) or amount due (negative) across all of a flat's bills.
pub fn ledger_balance(db: &Database, flat_id: u64) -> f64 {
    let due: f64 = db
        .flat_bills
        .iter()
        .filter(|fb| fb.flat_id == flat_id)
        .map(|fb| fb.balance_due)
        .sum();
    -due
}

#[derive(Debug)]
pub struct ResidentDues<'a> {
    pub flat: &'a Flat,
    pub latest_bill: Option<&'a Bill>,
    pub flat_bill: Option<&'a FlatBill>,
    pub payments: Vec<PaymentView<'a>>,
    pub ledger_balance: f64,
}

/// What a resident sees: the current bill for their flat and recent payments.
pub fn resident_dues(db: &Database, actor: Actor, limit: usize) -> Result<ResidentDues<'_>> {
    let user = actor.member(db)?;
    let flat = db.flat(user.flat_id)?;
    let latest_bill = latest_bill(db, user.society_id);
    let flat_bill = latest_bill.and_then(|bill| db.flat_bill_for(flat.id, bill.id));

    Ok(ResidentDues {
        flat,
        latest_bill,
        flat_bill,
        payments: flat_payments(db, flat.id, limit),
        ledger_balance: ledger_balance(db, flat.id),
    })
}
