//! Society membership: accounts, profiles and the vehicle registry.

mod account;
mod profile;
mod vehicles;

pub use account::{
    add_society, find_society, list_societies, log_in, normalize_flat_number, set_role, sign_up,
    SignUpForm,
};
pub use profile::{profile, update_profile, Profile, ProfileChanges};
pub use vehicles::{
    add_vehicle, find_vehicle, list_vehicles, normalize_plate, remove_vehicle, VehicleForm,
    VehicleMatch,
};
