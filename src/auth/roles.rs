//! Marketplace Roles
//! Mission: One enumerated tag per account type, no implied hierarchy

use serde::{Deserialize, Serialize};

/// Account roles recognized by the gate.
///
/// Membership checks are exact: there is no hierarchy between tags, so a
/// route that should admit both admins and super-admins must list both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "super_admin")]
    SuperAdmin, // Platform operators
    #[serde(rename = "admin")]
    Admin, // Back-office staff
    #[serde(rename = "agent")]
    Agent, // Campaign managers acting for brands
    #[serde(rename = "brand")]
    Brand, // Advertiser accounts
    #[serde(rename = "creator")]
    Creator, // Influencer accounts
}

/// Routes restricted to the back office. Both tags are listed literally;
/// `super_admin` does not imply `admin`.
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

/// Roles allowed to open a creator's full contact profile.
pub const PROFILE_VIEWER_ROLES: &[Role] = &[
    Role::Brand,
    Role::Agent,
    Role::Admin,
    Role::SuperAdmin,
];

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Brand => "brand",
            Role::Creator => "creator",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "agent" => Some(Role::Agent),
            "brand" => Some(Role::Brand),
            "creator" => Some(Role::Creator),
            _ => None,
        }
    }
}
