use chrono::Utc;
use tracing::{debug, info};

use crate::access::{require, Actor};
use crate::error::{Result, SocietyError};
use crate::store::{Database, Store, User, Vehicle, VehicleType};

#[derive(Debug, Clone)]
pub struct VehicleForm {
    pub number_plate: String,
    pub vehicle_type: VehicleType,
    pub color: String,
    pub brand: String,
    pub model: String,
}

/// Plates are matched on their upper-case spelling.
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

pub fn add_vehicle(store: &mut Store, actor: Actor, form: &VehicleForm) -> Result<Vehicle> {
    require(&form.number_plate, "Number plate and vehicle type are required")?;
    let plate = normalize_plate(&form.number_plate);

    let vehicle = store.transaction(|db| {
        let owner = actor.member(db)?.clone();
        if db
            .vehicles
            .iter()
            .any(|v| v.society_id == owner.society_id && v.number_plate == plate)
        {
            return Err(SocietyError::DuplicateVehicle(plate.clone()));
        }

        let vehicle = Vehicle {
            id: db.next_vehicle_id(),
            society_id: owner.society_id,
            user_id: owner.id,
            flat_id: owner.flat_id,
            number_plate: plate.clone(),
            vehicle_type: form.vehicle_type,
            color: form.color.trim().to_string(),
            brand: form.brand.trim().to_string(),
            model: form.model.trim().to_string(),
            created_at: Utc::now(),
        };
        db.vehicles.push(vehicle.clone());
        Ok(vehicle)
    })?;

    info!(vehicle_id = vehicle.id, plate = %vehicle.number_plate, "vehicle added");
    Ok(vehicle)
}

/// The acting user's own vehicles, oldest first.
pub fn list_vehicles(db: &Database, actor: Actor) -> Result<Vec<&Vehicle>> {
    let user = actor.member(db)?;
    Ok(db.vehicles.iter().filter(|v| v.user_id == user.id).collect())
}

pub fn remove_vehicle(store: &mut Store, actor: Actor, vehicle_id: u64) -> Result<Vehicle> {
    let removed = store.transaction(|db| {
        let idx = db
            .vehicles
            .iter()
            .position(|v| v.id == vehicle_id && v.society_id == actor.society_id)
            .ok_or(SocietyError::VehicleNotFound)?;
        let owner_id = db.vehicles[idx].user_id;
        actor.owner_or_committee(db, owner_id, "only the owner can remove a vehicle")?;
        Ok(db.vehicles.remove(idx))
    })?;

    info!(vehicle_id, plate = %removed.number_plate, "vehicle removed");
    Ok(removed)
}

#[derive(Debug)]
pub struct VehicleMatch<'a> {
    pub vehicle: &'a Vehicle,
    pub owner: Option<&'a User>,
    pub flat_number: Option<&'a str>,
}

/// Look up a plate within one society.
pub fn find_vehicle<'a>(db: &'a Database, society_id: u64, plate: &str) -> Result<VehicleMatch<'a>> {
    require(plate, "Please enter a number plate")?;
    let plate = normalize_plate(plate);
    debug!(society_id, plate = %plate, "vehicle search");

    let vehicle = db
        .vehicles
        .iter()
        .find(|v| v.society_id == society_id && v.number_plate == plate)
        .ok_or(SocietyError::VehicleNotFound)?;

    Ok(VehicleMatch {
        vehicle,
        owner: db.users.iter().find(|u| u.id == vehicle.user_id),
        flat_number: db.flat(vehicle.flat_id).ok().map(|f| f.flat_number.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;

    fn bike(plate: &str) -> VehicleForm {
        VehicleForm {
            number_plate: plate.to_string(),
            vehicle_type: VehicleType::TwoWheeler,
            color: "Red".to_string(),
            brand: "Honda".to_string(),
            model: "Activa".to_string(),
        }
    }

    #[test]
    fn test_add_uppercases_plate_and_links_flat() {
        let mut fx = Fixture::new();
        let vehicle = add_vehicle(&mut fx.store, fx.resident, &bike(" mh12ab1234 ")).unwrap();
        assert_eq!(vehicle.number_plate, "MH12AB1234");
        assert_eq!(vehicle.flat_id, fx.resident_flat_id());
        assert_eq!(list_vehicles(fx.store.db(), fx.resident).unwrap().len(), 1);
        assert!(list_vehicles(fx.store.db(), fx.chairman).unwrap().is_empty());
    }

    #[test]
    fn test_plate_required() {
        let mut fx = Fixture::new();
        let err = add_vehicle(&mut fx.store, fx.resident, &bike("   ")).unwrap_err();
        assert_eq!(err.to_string(), "Number plate and vehicle type are required");
    }

    #[test]
    fn test_duplicate_plate_in_society_rejected() {
        let mut fx = Fixture::new();
        add_vehicle(&mut fx.store, fx.resident, &bike("MH12AB1234")).unwrap();
        let err = add_vehicle(&mut fx.store, fx.chairman, &bike("mh12ab1234")).unwrap_err();
        assert!(matches!(err, SocietyError::DuplicateVehicle(_)));
    }

    #[test]
    fn test_search_finds_owner() {
        let mut fx = Fixture::new();
        add_vehicle(&mut fx.store, fx.resident, &bike("MH12AB1234")).unwrap();

        let found = find_vehicle(fx.store.db(), fx.society_id, "mh12ab1234").unwrap();
        assert_eq!(found.owner.unwrap().email, "resident@example.com");
        assert_eq!(found.flat_number, Some("A-101"));
    }

    #[test]
    fn test_search_miss_is_not_found() {
        let fx = Fixture::new();
        let err = find_vehicle(fx.store.db(), fx.society_id, "KA01ZZ0000").unwrap_err();
        assert!(matches!(err, SocietyError::VehicleNotFound));
    }

    #[test]
    fn test_search_is_scoped_to_society() {
        let mut fx = Fixture::new();
        add_vehicle(&mut fx.store, fx.resident, &bike("MH12AB1234")).unwrap();
        let err = find_vehicle(fx.store.db(), fx.society_id + 1, "MH12AB1234").unwrap_err();
        assert!(matches!(err, SocietyError::VehicleNotFound));
    }

    #[test]
    fn test_only_owner_or_committee_removes() {
        let mut fx = Fixture::new();
        let other = fx.add_resident("other@example.com", "B-201");
        let vehicle = add_vehicle(&mut fx.store, fx.resident, &bike("MH12AB1234")).unwrap();

        let err = remove_vehicle(&mut fx.store, other, vehicle.id).unwrap_err();
        assert!(matches!(err, SocietyError::PermissionDenied(_)));

        remove_vehicle(&mut fx.store, fx.chairman, vehicle.id).unwrap();
        assert!(fx.store.db().vehicles.is_empty());
    }
}
