//! Shared setup for unit tests: one society with a chairman in A-102 and a
//! resident in A-101.

use crate::access::Actor;
use crate::residents::{add_society, set_role, sign_up, SignUpForm};
use crate::store::{Role, Store};

pub(crate) fn sign_up_form(email: &str, flat_number: &str) -> SignUpForm {
    SignUpForm {
        name: format!("Member {flat_number}"),
        email: email.to_string(),
        phone: "9800000000".to_string(),
        flat_number: flat_number.to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    }
}

pub(crate) struct Fixture {
    pub store: Store,
    pub society_id: u64,
    pub chairman: Actor,
    pub resident: Actor,
}

impl Fixture {
    pub fn new() -> Self {
        let mut store = Store::in_memory();
        let society = add_society(&mut store, "Green Meadows", "1 Park Road", "Pune").unwrap();

        let resident = sign_up(
            &mut store,
            society.id,
            &sign_up_form("resident@example.com", "A-101"),
            6,
        )
        .unwrap();
        sign_up(
            &mut store,
            society.id,
            &sign_up_form("chair@example.com", "A-102"),
            6,
        )
        .unwrap();
        let chairman = set_role(&mut store, society.id, "chair@example.com", Role::Chairman).unwrap();

        Self {
            store,
            society_id: society.id,
            chairman: Actor::of(&chairman),
            resident: Actor::of(&resident),
        }
    }

    /// A society with no flats at all, plus a chairman who lives elsewhere.
    pub fn without_flats() -> (Store, Actor) {
        let mut fx = Self::new();
        let empty = add_society(&mut fx.store, "Empty Court", "", "").unwrap();
        let chairman = fx
            .store
            .transaction(|db| {
                let user = db.user_mut(fx.chairman.user_id)?;
                user.society_id = empty.id;
                Ok(user.clone())
            })
            .unwrap();
        (fx.store, Actor::of(&chairman))
    }

    pub fn flat_id(&self, flat_number: &str) -> u64 {
        self.store
            .db()
            .flat_by_number(self.society_id, flat_number)
            .map(|f| f.id)
            .unwrap()
    }

    pub fn resident_flat_id(&self) -> u64 {
        self.flat_id("A-101")
    }

    /// Sign up another resident and return them as an actor.
    pub fn add_resident(&mut self, email: &str, flat_number: &str) -> Actor {
        let user = sign_up(
            &mut self.store,
            self.society_id,
            &sign_up_form(email, flat_number),
            6,
        )
        .unwrap();
        Actor::of(&user)
    }
}
