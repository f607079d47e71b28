use chrono::Utc;
use tracing::info;

use crate::access::Actor;
use crate::error::{Result, SocietyError};
use crate::store::{Complaint, ComplaintStatus, Database, Store, User};

#[derive(Debug)]
pub struct ComplaintView<'a> {
    pub complaint: &'a Complaint,
    pub filed_by: Option<&'a User>,
}

/// Complaints of a society, newest first, optionally narrowed to one status.
pub fn list_complaints(
    db: &Database,
    society_id: u64,
    status: Option<ComplaintStatus>,
) -> Vec<ComplaintView<'_>> {
    let mut complaints: Vec<&Complaint> = db
        .complaints
        .iter()
        .filter(|c| c.society_id == society_id)
        .filter(|c| status.map_or(true, |s| c.status == s))
        .collect();
    complaints.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

    complaints
        .into_iter()
        .map(|complaint| ComplaintView {
            complaint,
            filed_by: db.users.iter().find(|u| u.id == complaint.filed_by),
        })
        .collect()
}

pub fn file_complaint(
    store: &mut Store,
    actor: Actor,
    title: &str,
    description: &str,
) -> Result<Complaint> {
    if title.trim().is_empty() || description.trim().is_empty() {
        return Err(SocietyError::MissingFields("Title and description are required"));
    }

    let complaint = store.transaction(|db| {
        let filer = actor.member(db)?;
        let (society_id, filed_by) = (filer.society_id, filer.id);
        let complaint = Complaint {
            id: db.next_complaint_id(),
            society_id,
            filed_by,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            status: ComplaintStatus::Open,
            created_at: Utc::now(),
            cleared_at: None,
        };
        db.complaints.push(complaint.clone());
        Ok(complaint)
    })?;

    info!(complaint_id = complaint.id, "complaint filed");
    Ok(complaint)
}

/// Move a complaint to `target`, which must be the next step of its lifecycle.
pub fn set_complaint_status(
    store: &mut Store,
    actor: Actor,
    complaint_id: u64,
    target: ComplaintStatus,
) -> Result<Complaint> {
    let updated = store.transaction(|db| {
        actor.committee(db, "only the chairman or secretary can update complaint status")?;
        let complaint = db
            .complaints
            .iter_mut()
            .find(|c| c.id == complaint_id && c.society_id == actor.society_id)
            .ok_or(SocietyError::ComplaintNotFound(complaint_id))?;

        if complaint.status.next() != Some(target) {
            return Err(SocietyError::IllegalTransition {
                id: complaint_id,
                from: complaint.status.to_string(),
                to: target.to_string(),
            });
        }

        complaint.status = target;
        if target == ComplaintStatus::Cleared {
            complaint.cleared_at = Some(Utc::now());
        }
        Ok(complaint.clone())
    })?;

    info!(complaint_id, status = %updated.status, "complaint status updated");
    Ok(updated)
}

/// Move a complaint one step along open → acknowledged → resolved → cleared.
pub fn advance_complaint(store: &mut Store, actor: Actor, complaint_id: u64) -> Result<Complaint> {
    let current = store
        .db()
        .complaints
        .iter()
        .find(|c| c.id == complaint_id && c.society_id == actor.society_id)
        .ok_or(SocietyError::ComplaintNotFound(complaint_id))?
        .status;

    let target = current.next().ok_or_else(|| SocietyError::IllegalTransition {
        id: complaint_id,
        from: current.to_string(),
        to: "any other status".to_string(),
    })?;
    set_complaint_status(store, actor, complaint_id, target)
}

pub fn delete_complaint(store: &mut Store, actor: Actor, complaint_id: u64) -> Result<Complaint> {
    let removed = store.transaction(|db| {
        let idx = db
            .complaints
            .iter()
            .position(|c| c.id == complaint_id && c.society_id == actor.society_id)
            .ok_or(SocietyError::ComplaintNotFound(complaint_id))?;
        let filer_id = db.complaints[idx].filed_by;
        actor.owner_or_committee(db, filer_id, "you can only delete your own complaints")?;
        Ok(db.complaints.remove(idx))
    })?;

    info!(complaint_id, "complaint deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    fn filed(fx: &mut Fixture) -> Complaint {
        file_complaint(&mut fx.store, fx.resident, "Leaking pipe", "Water in the basement").unwrap()
    }

    #[test]
    fn test_new_complaint_is_open() {
        let mut fx = Fixture::new();
        let complaint = filed(&mut fx);
        assert_eq!(complaint.status, ComplaintStatus::Open);
        assert!(complaint.cleared_at.is_none());

        let listed = list_complaints(fx.store.db(), fx.society_id, None);
        assert_eq!(listed[0].filed_by.unwrap().flat_number, "A-101");
    }

    #[test]
    fn test_committee_walks_full_lifecycle() {
        let mut fx = Fixture::new();
        let complaint = filed(&mut fx);

        let step = advance_complaint(&mut fx.store, fx.chairman, complaint.id).unwrap();
        assert_eq!(step.status, ComplaintStatus::Acknowledged);
        let step = advance_complaint(&mut fx.store, fx.chairman, complaint.id).unwrap();
        assert_eq!(step.status, ComplaintStatus::Resolved);
        let step = advance_complaint(&mut fx.store, fx.chairman, complaint.id).unwrap();
        assert_eq!(step.status, ComplaintStatus::Cleared);
        assert!(step.cleared_at.is_some());

        let err = advance_complaint(&mut fx.store, fx.chairman, complaint.id).unwrap_err();
        assert!(matches!(err, SocietyError::IllegalTransition { .. }));
    }

    #[test]
    fn test_resident_cannot_change_status() {
        let mut fx = Fixture::new();
        let complaint = filed(&mut fx);
        let err = advance_complaint(&mut fx.store, fx.resident, complaint.id).unwrap_err();
        assert!(matches!(err, SocietyError::PermissionDenied(_)));
        assert_eq!(fx.store.db().complaints[0].status, ComplaintStatus::Open);
    }

    #[test]
    fn test_status_cannot_skip_steps() {
        let mut fx = Fixture::new();
        let complaint = filed(&mut fx);
        let err = set_complaint_status(
            &mut fx.store,
            fx.chairman,
            complaint.id,
            ComplaintStatus::Resolved,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Complaint {} is open; it cannot move to resolved", complaint.id)
        );
    }

    #[test]
    fn test_filter_by_status() {
        let mut fx = Fixture::new();
        let first = filed(&mut fx);
        filed(&mut fx);
        advance_complaint(&mut fx.store, fx.chairman, first.id).unwrap();

        let open = list_complaints(fx.store.db(), fx.society_id, Some(ComplaintStatus::Open));
        let acknowledged = list_complaints(
            fx.store.db(),
            fx.society_id,
            Some(ComplaintStatus::Acknowledged),
        );
        assert_eq!(open.len(), 1);
        assert_eq!(acknowledged.len(), 1);
        assert_eq!(acknowledged[0].complaint.id, first.id);
    }

    #[test]
    fn test_delete_by_filer_or_committee_only() {
        let mut fx = Fixture::new();
        let other = fx.add_resident("other@example.com", "B-201");
        let first = filed(&mut fx);
        let second = filed(&mut fx);

        let err = delete_complaint(&mut fx.store, other, first.id).unwrap_err();
        assert!(matches!(err, SocietyError::PermissionDenied(_)));

        delete_complaint(&mut fx.store, fx.resident, first.id).unwrap();
        delete_complaint(&mut fx.store, fx.chairman, second.id).unwrap();
        assert!(fx.store.db().complaints.is_empty());
    }
}
