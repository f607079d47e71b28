use tracing::info;

use super::account::{link_flat, normalize_flat_number};
use crate::access::Actor;
use crate::error::{Result, SocietyError};
use crate::store::{normalize_email, Database, Flat, Society, Store, User};

#[derive(Debug)]
pub struct Profile<'a> {
    pub user: &'a User,
    pub flat: &'a Flat,
    pub society: &'a Society,
}

pub fn profile<'a>(db: &'a Database, actor: Actor) -> Result<Profile<'a>> {
    let user = actor.member(db)?;
    Ok(Profile {
        user,
        flat: db.flat(user.flat_id)?,
        society: db.society(user.society_id)?,
    })
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub flat_number: Option<String>,
}

pub fn update_profile(store: &mut Store, actor: Actor, changes: &ProfileChanges) -> Result<User> {
    let current = actor.member(store.db())?.clone();

    let name = changes.name.clone().unwrap_or(current.name.clone());
    let email = changes.email.clone().unwrap_or(current.email.clone());
    let phone = changes.phone.clone().unwrap_or(current.phone.clone());
    let flat_number = changes
        .flat_number
        .clone()
        .unwrap_or(current.flat_number.clone());

    if [&name, &email, &phone, &flat_number]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(SocietyError::MissingFields("All fields are required"));
    }

    let email = normalize_email(&email);
    let flat_number = normalize_flat_number(&flat_number);

    let updated = store.transaction(|db| {
        if email != current.email {
            if db.identities.iter().any(|i| i.email == email && i.id != current.id) {
                return Err(SocietyError::DuplicateEmail(email.clone()));
            }
            if let Some(identity) = db.identities.iter_mut().find(|i| i.id == current.id) {
                identity.email = email.clone();
            }
        }

        let flat_id = if flat_number != current.flat_number {
            link_flat(db, current.society_id, &flat_number, current.id)
        } else {
            current.flat_id
        };
        for vehicle in db.vehicles.iter_mut().filter(|v| v.user_id == current.id) {
            vehicle.flat_id = flat_id;
        }

        let user = db.user_mut(current.id)?;
        user.name = name.trim().to_string();
        user.email = email.clone();
        user.phone = phone.trim().to_string();
        user.flat_number = flat_number.clone();
        user.flat_id = flat_id;
        Ok(user.clone())
    })?;

    info!(user_id = updated.id, "profile updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use crate::residents::{add_vehicle, find_vehicle, VehicleForm};
    use crate::store::{authenticate, VehicleType};

    #[test]
    fn test_profile_embeds_flat_and_society() {
        let fx = Fixture::new();
        let view = profile(fx.store.db(), fx.resident).unwrap();
        assert_eq!(view.flat.flat_number, "A-101");
        assert_eq!(view.society.name, "Green Meadows");
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut fx = Fixture::new();
        let changes = ProfileChanges {
            phone: Some(" ".to_string()),
            ..Default::default()
        };
        let err = update_profile(&mut fx.store, fx.resident, &changes).unwrap_err();
        assert_eq!(err.to_string(), "All fields are required");
    }

    #[test]
    fn test_email_change_moves_login() {
        let mut fx = Fixture::new();
        let changes = ProfileChanges {
            email: Some("New@Example.com".to_string()),
            ..Default::default()
        };
        let user = update_profile(&mut fx.store, fx.resident, &changes).unwrap();
        assert_eq!(user.email, "new@example.com");

        assert!(authenticate(fx.store.db(), "new@example.com", "secret1").is_ok());
        assert!(authenticate(fx.store.db(), "resident@example.com", "secret1").is_err());
    }

    #[test]
    fn test_email_taken_by_someone_else() {
        let mut fx = Fixture::new();
        let changes = ProfileChanges {
            email: Some("chair@example.com".to_string()),
            ..Default::default()
        };
        let err = update_profile(&mut fx.store, fx.resident, &changes).unwrap_err();
        assert!(matches!(err, SocietyError::DuplicateEmail(_)));
    }

    #[test]
    fn test_flat_change_relinks_to_shared_flat() {
        let mut fx = Fixture::new();
        let target = fx.flat_id("A-102");
        let changes = ProfileChanges {
            flat_number: Some("a-102".to_string()),
            ..Default::default()
        };
        let user = update_profile(&mut fx.store, fx.resident, &changes).unwrap();
        assert_eq!(user.flat_number, "A-102");
        assert_eq!(user.flat_id, target);
    }

    #[test]
    fn test_flat_change_moves_vehicles() {
        let mut fx = Fixture::new();
        let form = VehicleForm {
            number_plate: "MH12AB1234".to_string(),
            vehicle_type: VehicleType::FourWheeler,
            color: String::new(),
            brand: String::new(),
            model: String::new(),
        };
        add_vehicle(&mut fx.store, fx.resident, &form).unwrap();

        let changes = ProfileChanges {
            flat_number: Some("B-202".to_string()),
            ..Default::default()
        };
        let user = update_profile(&mut fx.store, fx.resident, &changes).unwrap();

        let found = find_vehicle(fx.store.db(), fx.society_id, "mh12ab1234").unwrap();
        assert_eq!(found.vehicle.flat_id, user.flat_id);
        assert_eq!(found.flat_number, Some("B-202"));
    }
}
