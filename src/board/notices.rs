use chrono::Utc;
use tracing::info;

use crate::access::Actor;
use crate::error::{Result, SocietyError};
use crate::store::{Database, Notice, NoticeType, Store, User};

#[derive(Debug)]
pub struct NoticeView<'a> {
    pub notice: &'a Notice,
    pub author: Option<&'a User>,
}

/// Notices of a society, newest first, with their authors.
pub fn list_notices(db: &Database, society_id: u64) -> Vec<NoticeView<'_>> {
    let mut notices: Vec<&Notice> = db
        .notices
        .iter()
        .filter(|n| n.society_id == society_id)
        .collect();
    notices.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

    notices
        .into_iter()
        .map(|notice| NoticeView {
            notice,
            author: db.users.iter().find(|u| u.id == notice.created_by),
        })
        .collect()
}

pub fn post_notice(
    store: &mut Store,
    actor: Actor,
    title: &str,
    description: &str,
    notice_type: NoticeType,
) -> Result<Notice> {
    if title.trim().is_empty() || description.trim().is_empty() {
        return Err(SocietyError::MissingFields("Title and description are required"));
    }

    let notice = store.transaction(|db| {
        let author = if notice_type == NoticeType::General {
            actor.member(db)?
        } else {
            actor.committee(
                db,
                "only the chairman or secretary can post urgent or maintenance notices",
            )?
        };
        let (society_id, created_by) = (author.society_id, author.id);
        let notice = Notice {
            id: db.next_notice_id(),
            society_id,
            created_by,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            notice_type,
            created_at: Utc::now(),
        };
        db.notices.push(notice.clone());
        Ok(notice)
    })?;

    info!(notice_id = notice.id, kind = %notice.notice_type, "notice posted");
    Ok(notice)
}

pub fn delete_notice(store: &mut Store, actor: Actor, notice_id: u64) -> Result<Notice> {
    let removed = store.transaction(|db| {
        let idx = db
            .notices
            .iter()
            .position(|n| n.id == notice_id && n.society_id == actor.society_id)
            .ok_or(SocietyError::NoticeNotFound(notice_id))?;
        let author_id = db.notices[idx].created_by;
        actor.owner_or_committee(db, author_id, "you can only delete your own notices")?;
        Ok(db.notices.remove(idx))
    })?;

    info!(notice_id, "notice deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    #[test]
    fn test_resident_posts_general_notice() {
        let mut fx = Fixture::new();
        let notice = post_notice(
            &mut fx.store,
            fx.resident,
            "Lost keys",
            "Blue keychain near gate 2",
            NoticeType::General,
        )
        .unwrap();
        assert_eq!(notice.created_by, fx.resident.user_id);

        let board = list_notices(fx.store.db(), fx.society_id);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].author.unwrap().flat_number, "A-101");
    }

    #[test]
    fn test_resident_cannot_post_urgent_notice() {
        let mut fx = Fixture::new();
        let err = post_notice(
            &mut fx.store,
            fx.resident,
            "Water cut",
            "No water tomorrow",
            NoticeType::Urgent,
        )
        .unwrap_err();
        assert!(matches!(err, SocietyError::PermissionDenied(_)));
        assert!(fx.store.db().notices.is_empty());
        assert_eq!(fx.store.db().sequence.notice, 1);
    }

    #[test]
    fn test_committee_posts_maintenance_notice() {
        let mut fx = Fixture::new();
        post_notice(
            &mut fx.store,
            fx.chairman,
            "Lift service",
            "Lift B offline Saturday",
            NoticeType::Maintenance,
        )
        .unwrap();
        assert_eq!(fx.store.db().notices.len(), 1);
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut fx = Fixture::new();
        let err = post_notice(&mut fx.store, fx.resident, " ", "body", NoticeType::General)
            .unwrap_err();
        assert_eq!(err.to_string(), "Title and description are required");
    }

    #[test]
    fn test_newest_notice_first() {
        let mut fx = Fixture::new();
        for title in ["first", "second", "third"] {
            post_notice(&mut fx.store, fx.resident, title, "body", NoticeType::General).unwrap();
        }
        let titles: Vec<&str> = list_notices(fx.store.db(), fx.society_id)
            .iter()
            .map(|v| v.notice.title.as_str())
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_delete_rules() {
        let mut fx = Fixture::new();
        let other = fx.add_resident("other@example.com", "B-201");
        let notice =
            post_notice(&mut fx.store, fx.resident, "Sale", "Sofa", NoticeType::General).unwrap();

        let err = delete_notice(&mut fx.store, other, notice.id).unwrap_err();
        assert!(matches!(err, SocietyError::PermissionDenied(_)));

        delete_notice(&mut fx.store, fx.resident, notice.id).unwrap();
        let err = delete_notice(&mut fx.store, fx.chairman, notice.id).unwrap_err();
        assert!(matches!(err, SocietyError::NoticeNotFound(_)));
    }
}
