//! Authorization at the data-access boundary.
//!
//! Operations never trust the role recorded in the session blob: the acting
//! user is re-read from the store and checked against the society it acts in.

use tracing::warn;

use crate::error::{Result, SocietyError};
use crate::store::{Database, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: u64,
    pub society_id: u64,
}

impl Actor {
    pub fn new(user_id: u64, society_id: u64) -> Self {
        Self {
            user_id,
            society_id,
        }
    }

    pub fn of(user: &User) -> Self {
        Self::new(user.id, user.society_id)
    }

    /// The acting user's current row, provided it still belongs to the society.
    pub fn member<'a>(&self, db: &'a Database) -> Result<&'a User> {
        let user = db.user(self.user_id)?;
        if user.society_id != self.society_id {
            return Err(SocietyError::NotAMember);
        }
        Ok(user)
    }

    /// Like [`Actor::member`], but only for the chairman or secretary.
    pub fn committee<'a>(&self, db: &'a Database, action: &'static str) -> Result<&'a User> {
        let user = self.member(db)?;
        if !user.role.is_committee() {
            warn!(user_id = user.id, role = %user.role, action, "permission denied");
            return Err(SocietyError::PermissionDenied(action));
        }
        Ok(user)
    }

    /// Committee members may act on anything; others only on what they own.
    pub fn owner_or_committee<'a>(
        &self,
        db: &'a Database,
        owner_id: u64,
        action: &'static str,
    ) -> Result<&'a User> {
        let user = self.member(db)?;
        if user.id != owner_id && !user.role.is_committee() {
            warn!(user_id = user.id, owner_id, action, "permission denied");
            return Err(SocietyError::PermissionDenied(action));
        }
        Ok(user)
    }
}

/// Reject a blank required field with the given message.
pub(crate) fn require(value: &str, message: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SocietyError::MissingFields(message));
    }
    Ok(())
}
