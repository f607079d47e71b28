mod bills;
mod payments;
mod report;

pub use bills::{
    carry_forward, create_bill, default_due_date, default_title, latest_bill, list_bills,
    month_of, parse_bill_month, resolve_bill, BillForm, BillRun, CarryForward,
};
pub use payments::{
    derive_status, flat_payments, ledger_balance, payment_history, record_payment, resident_dues,
    PaymentForm, PaymentReceipt, PaymentView, ResidentDues,
};
pub use report::{bill_overview, defaulters, summarize, BillOverview, Defaulter};
