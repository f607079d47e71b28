use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{Database, Identity};
use crate::error::{Result, SocietyError};

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Salted SHA-256 digest, hex encoded.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Register a new login. Emails are unique across every society.
pub fn create_identity(db: &mut Database, email: &str, password: &str) -> Result<u64> {
    let email = normalize_email(email);
    if db.identities.iter().any(|i| i.email == email) {
        return Err(SocietyError::DuplicateEmail(email));
    }

    let salt = Uuid::new_v4().simple().to_string();
    let password_hash = hash_password(&salt, password);
    let id = db.next_identity_id();
    db.identities.push(Identity {
        id,
        email,
        salt,
        password_hash,
        created_at: Utc::now(),
    });
    Ok(id)
}

/// Check a login; unknown email and wrong password are indistinguishable.
pub fn authenticate<'a>(db: &'a Database, email: &str, password: &str) -> Result<&'a Identity> {
    let email = normalize_email(email);
    db.identities
        .iter()
        .find(|i| i.email == email)
        .filter(|i| hash_password(&i.salt, password) == i.password_hash)
        .ok_or(SocietyError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_round_trip() {
        let mut db = Database::default();
        let id = create_identity(&mut db, "Asha@Example.com ", "secret1").unwrap();

        let identity = authenticate(&db, "asha@example.com", "secret1").unwrap();
        assert_eq!(identity.id, id);
        assert_ne!(identity.password_hash, "secret1");
    }

    #[test]
    fn test_wrong_password_and_unknown_email_fail_alike() {
        let mut db = Database::default();
        create_identity(&mut db, "asha@example.com", "secret1").unwrap();

        let wrong = authenticate(&db, "asha@example.com", "secret2").unwrap_err();
        let unknown = authenticate(&db, "ravi@example.com", "secret1").unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut db = Database::default();
        create_identity(&mut db, "asha@example.com", "secret1").unwrap();
        let err = create_identity(&mut db, "ASHA@example.com", "other12").unwrap_err();
        assert!(matches!(err, SocietyError::DuplicateEmail(_)));
    }

    #[test]
    fn test_salts_differ_per_identity() {
        let mut db = Database::default();
        create_identity(&mut db, "a@example.com", "same-password").unwrap();
        create_identity(&mut db, "b@example.com", "same-password").unwrap();
        assert_ne!(db.identities[0].password_hash, db.identities[1].password_hash);
    }
}
