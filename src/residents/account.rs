use chrono::Utc;
use tracing::{debug, info};

use crate::access::require;
use crate::error::{Result, SocietyError};
use crate::store::{
    authenticate, create_identity, normalize_email, Database, Flat, Role, Society, Store, User,
};

/// Societies ordered by name.
pub fn list_societies(db: &Database) -> Vec<&Society> {
    let mut societies: Vec<&Society> = db.societies.iter().collect();
    societies.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    societies
}

/// Resolve a society by id or by (case-insensitive) name.
/// Look a society up by id, then by case-insensitive name.
pub fn find_society<'a>(db: &'a Database, reference: &str) -> Result<&'a Society> {
    if let Ok(id) = reference.trim().parse::<u64>() {
        if let Ok(society) = db.society(id) {
            return Ok(society);
        }
    }
    let wanted = reference.trim().to_lowercase();
    db.societies
        .iter()
        .find(|s| s.name.to_lowercase() == wanted)
        .ok_or_else(|| SocietyError::SocietyNotFound(reference.to_string()))
}

pub fn add_society(store: &mut Store, name: &str, address: &str, city: &str) -> Result<Society> {
    require(name, "Society name is required")?;
    let name = name.trim().to_string();

    let society = store.transaction(|db| {
        if db
            .societies
            .iter()
            .any(|s| s.name.to_lowercase() == name.to_lowercase())
        {
            return Err(SocietyError::DuplicateSociety(name.clone()));
        }
        let society = Society {
            id: db.next_society_id(),
            name: name.clone(),
            address: address.trim().to_string(),
            city: city.trim().to_string(),
            created_at: Utc::now(),
        };
        db.societies.push(society.clone());
        Ok(society)
    })?;

    info!(society_id = society.id, name = %society.name, "society added");
    Ok(society)
}

/// Find the flat with this number in the society, creating it if needed.
pub(crate) fn link_flat(
    db: &mut Database,
    society_id: u64,
    flat_number: &str,
    owner_id: u64,
) -> u64 {
    if let Some(flat) = db.flat_by_number(society_id, flat_number) {
        return flat.id;
    }
    let id = db.next_flat_id();
    db.flats.push(Flat {
        id,
        society_id,
        flat_number: flat_number.to_string(),
        owner_id,
        created_at: Utc::now(),
    });
    debug!(flat_id = id, flat_number, "flat created");
    id
}

/// Canonical spelling for flat numbers: trimmed, upper-case.
pub fn normalize_flat_number(flat_number: &str) -> String {
    flat_number.trim().to_uppercase()
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub flat_number: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self, min_password_length: usize) -> Result<()> {
        let required = [
            &self.name,
            &self.email,
            &self.phone,
            &self.flat_number,
            &self.password,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(SocietyError::MissingFields("All fields are required"));
        }
        if self.password != self.confirm_password {
            return Err(SocietyError::PasswordMismatch);
        }
        if self.password.chars().count() < min_password_length {
            return Err(SocietyError::PasswordTooShort(min_password_length));
        }
        Ok(())
    }
}

/// Create the login, the flat (if new) and the resident row as one unit.
pub fn sign_up(
    store: &mut Store,
    society_id: u64,
    form: &SignUpForm,
    min_password_length: usize,
) -> Result<User> {
    form.validate(min_password_length)?;

    let user = store.transaction(|db| {
        db.society(society_id)?;
        let user_id = create_identity(db, &form.email, &form.password)?;
        let flat_number = normalize_flat_number(&form.flat_number);
        let flat_id = link_flat(db, society_id, &flat_number, user_id);

        let user = User {
            id: user_id,
            society_id,
            flat_id,
            name: form.name.trim().to_string(),
            email: normalize_email(&form.email),
            phone: form.phone.trim().to_string(),
            flat_number,
            role: Role::Resident,
            created_at: Utc::now(),
        };
        db.users.push(user.clone());
        Ok(user)
    })?;

    info!(user_id = user.id, society_id, flat = %user.flat_number, "resident signed up");
    Ok(user)
}

/// Authenticate, then confirm the account is a member of this society.
pub fn log_in(db: &Database, society_id: u64, email: &str, password: &str) -> Result<User> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(SocietyError::MissingFields("Email and password are required"));
    }

    let identity = authenticate(db, email, password)?;
    let user = db
        .users
        .iter()
        .find(|u| u.id == identity.id && u.society_id == society_id)
        .ok_or(SocietyError::NotAMember)?;

    info!(user_id = user.id, society_id, "logged in");
    Ok(user.clone())
}

/// Appoint a member to a role. This is a data-owner operation with no actor.
pub fn set_role(store: &mut Store, society_id: u64, email: &str, role: Role) -> Result<User> {
    let email = normalize_email(email);
    let user = store.transaction(|db| {
        let user = db
            .users
            .iter_mut()
            .find(|u| u.society_id == society_id && u.email == email)
            .ok_or_else(|| SocietyError::UserNotFound(email.clone()))?;
        user.role = role;
        Ok(user.clone())
    })?;

    info!(user_id = user.id, role = %role, "role assigned");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sign_up_form, Fixture};

    #[test]
    fn test_societies_sorted_by_name() {
        let mut store = Store::in_memory();
        add_society(&mut store, "Sunrise Towers", "", "Pune").unwrap();
        add_society(&mut store, "green meadows", "", "Pune").unwrap();

        let names: Vec<&str> = list_societies(store.db())
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["green meadows", "Sunrise Towers"]);
    }

    #[test]
    fn test_find_society_by_id_or_name() {
        let mut store = Store::in_memory();
        let towers = add_society(&mut store, "Sunrise Towers", "", "").unwrap();
        let numbered = add_society(&mut store, "42", "", "").unwrap();

        let db = store.db();
        assert_eq!(find_society(db, &towers.id.to_string()).unwrap().id, towers.id);
        assert_eq!(find_society(db, "sunrise towers").unwrap().id, towers.id);
        assert_eq!(find_society(db, " 42 ").unwrap().id, numbered.id);
        assert!(matches!(
            find_society(db, "Nowhere"),
            Err(SocietyError::SocietyNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_society_rejected() {
        let mut store = Store::in_memory();
        add_society(&mut store, "Sunrise Towers", "", "").unwrap();
        let err = add_society(&mut store, "SUNRISE TOWERS", "", "").unwrap_err();
        assert!(matches!(err, SocietyError::DuplicateSociety(_)));
    }

    #[test]
    fn test_sign_up_validation_happens_before_any_write() {
        let mut fx = Fixture::new();
        let before = fx.store.db().identities.len();

        let mut form = sign_up_form("new@example.com", "B-201");
        form.confirm_password = "different".to_string();
        let err = sign_up(&mut fx.store, fx.society_id, &form, 6).unwrap_err();
        assert!(matches!(err, SocietyError::PasswordMismatch));

        let mut form = sign_up_form("new@example.com", "B-201");
        form.password = "abc".to_string();
        form.confirm_password = "abc".to_string();
        let err = sign_up(&mut fx.store, fx.society_id, &form, 6).unwrap_err();
        assert!(matches!(err, SocietyError::PasswordTooShort(6)));

        let mut form = sign_up_form("new@example.com", "B-201");
        form.phone = "  ".to_string();
        let err = sign_up(&mut fx.store, fx.society_id, &form, 6).unwrap_err();
        assert_eq!(err.to_string(), "All fields are required");

        assert_eq!(fx.store.db().identities.len(), before);
    }

    #[test]
    fn test_sign_up_shares_flat_by_number() {
        let mut fx = Fixture::new();
        let first = fx.resident_flat_id();

        let user = sign_up(
            &mut fx.store,
            fx.society_id,
            &sign_up_form("spouse@example.com", " a-101 "),
            6,
        )
        .unwrap();

        assert_eq!(user.flat_number, "A-101");
        assert_eq!(user.flat_id, first);
        assert_eq!(fx.store.db().residents_of(first).len(), 2);
    }

    #[test]
    fn test_sign_up_with_taken_email_writes_nothing() {
        let mut fx = Fixture::new();
        let flats_before = fx.store.db().flats.len();

        let err = sign_up(
            &mut fx.store,
            fx.society_id,
            &sign_up_form("resident@example.com", "Z-999"),
            6,
        )
        .unwrap_err();

        assert!(matches!(err, SocietyError::DuplicateEmail(_)));
        assert_eq!(fx.store.db().flats.len(), flats_before);
        assert!(fx.store.db().flat_by_number(fx.society_id, "Z-999").is_none());
    }

    #[test]
    fn test_log_in_checks_society_membership() {
        let mut fx = Fixture::new();
        let other = add_society(&mut fx.store, "Other Society", "", "").unwrap();

        let user = log_in(fx.store.db(), fx.society_id, "resident@example.com", "secret1").unwrap();
        assert_eq!(user.id, fx.resident.user_id);

        let err = log_in(fx.store.db(), other.id, "resident@example.com", "secret1").unwrap_err();
        assert_eq!(err.to_string(), "User does not belong to this society");

        let err = log_in(fx.store.db(), fx.society_id, "resident@example.com", "nope").unwrap_err();
        assert!(matches!(err, SocietyError::InvalidCredentials));
    }

    #[test]
    fn test_set_role_promotes_member() {
        let mut fx = Fixture::new();
        let user = set_role(
            &mut fx.store,
            fx.society_id,
            "RESIDENT@example.com",
            Role::Secretary,
        )
        .unwrap();
        assert_eq!(user.role, Role::Secretary);
        assert!(fx.store.db().user(user.id).unwrap().role.is_committee());
    }
}
