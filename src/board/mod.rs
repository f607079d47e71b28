//! Notice board and complaint tracker.

mod complaints;
mod notices;

pub use complaints::{
    advance_complaint, delete_complaint, file_complaint, list_complaints, set_complaint_status,
    ComplaintView,
};
pub use notices::{delete_notice, list_notices, post_notice, NoticeView};
