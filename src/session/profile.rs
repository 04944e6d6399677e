/// Application-level member profile
///
/// The profile is the document-database record associated with an
/// identity. It is fetched on every sign-in event and discarded on
/// sign-out or fetch failure; it is never cached across sessions.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Profile document keyed by the identity id.
///
/// `role` is kept as the raw document string; [`Profile::role`] parses it
/// against the hierarchy, and unknown strings simply grant nothing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl Profile {
    /// The profile's role in the hierarchy, if the document's role string
    /// is recognized
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// True when this profile satisfies a check for `required`
    pub fn satisfies(&self, required: Role) -> bool {
        self.role().map_or(false, |role| role.satisfies(required))
    }

    /// Parse a profile from a document-database JSON payload
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
