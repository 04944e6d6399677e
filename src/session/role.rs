/// Role hierarchy for permission checks
///
/// Roles form a total order: member < treasurer < admin. A permission
/// check for a required role passes for that role and everything above
/// it, so an admin can do anything a treasurer can, and a treasurer
/// anything a member can.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Member,
    Treasurer,
    Admin,
}

impl Role {
    /// Position in the hierarchy; higher rank implies every lower rank.
    /// Unknown role strings parse to no role at all and effectively rank 0.
    pub fn rank(self) -> u8 {
        match self {
            Role::Member => 1,
            Role::Treasurer => 2,
            Role::Admin => 3,
        }
    }

    /// Parse a role string from a profile document.
    /// Returns `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_ascii_lowercase().as_str() {
            "member" => Some(Role::Member),
            "treasurer" => Some(Role::Treasurer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// True when this role satisfies a check for `required`
    pub fn satisfies(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Member => "member",
            Role::Treasurer => "treasurer",
            Role::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or(())
    }
}
