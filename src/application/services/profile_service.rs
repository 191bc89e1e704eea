//! Profile updates from recognized entities

use crate::domain::entities::{RecognizerResult, UserProfile};
use crate::domain::entities::user::capitalize;

pub const USER_NAME_ENTITIES: [&str; 2] = ["userName", "userName_patternAny"];
pub const USER_LOCATION_ENTITIES: [&str; 2] = ["userLocation", "userLocation_patternAny"];

/// Which profile fields the entities of a turn filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapturedEntities {
    pub name: bool,
    pub city: bool,
}

impl CapturedEntities {
    pub fn any(&self) -> bool {
        self.name || self.city
    }
}

/// Copy user name and location entities into the profile, capitalised
pub fn apply_entities(result: &RecognizerResult, profile: &mut UserProfile) -> CapturedEntities {
    let mut captured = CapturedEntities::default();

    if let Some(name) = result.first_entity(&USER_NAME_ENTITIES) {
        profile.name = Some(capitalize(name));
        captured.name = true;
    }
    if let Some(city) = result.first_entity(&USER_LOCATION_ENTITIES) {
        profile.city = Some(capitalize(city));
        captured.city = true;
    }

    if captured.any() {
        tracing::debug!("Profile updated from entities: {}", profile);
    }
    captured
}
