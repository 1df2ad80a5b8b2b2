//! Staff directory model used for authorization decisions.

use super::{ParkId, StaffId, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role held by a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    /// Organisation-wide administrator, not bound to a park.
    Superadmin,
    /// Park manager.
    Manager,
    /// Plant specialist.
    Botanist,
    /// Tree specialist.
    Arborist,
    /// Patrol and visitor-facing staff.
    ParkRanger,
    /// Landscape design staff.
    LandscapeArchitect,
    /// Manages external vendors and contractors.
    VendorManager,
}

impl StaffRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superadmin => "SUPERADMIN",
            Self::Manager => "MANAGER",
            Self::Botanist => "BOTANIST",
            Self::Arborist => "ARBORIST",
            Self::ParkRanger => "PARK_RANGER",
            Self::LandscapeArchitect => "LANDSCAPE_ARCHITECT",
            Self::VendorManager => "VENDOR_MANAGER",
        }
    }

    /// Elevated roles bypass park scope checks.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Superadmin)
    }

    /// Managerial roles may release tasks assigned to other staff.
    #[must_use]
    pub const fn is_managerial(self) -> bool {
        matches!(self, Self::Superadmin | Self::Manager)
    }
}

impl TryFrom<&str> for StaffRole {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "SUPERADMIN" => Ok(Self::Superadmin),
            "MANAGER" => Ok(Self::Manager),
            "BOTANIST" => Ok(Self::Botanist),
            "ARBORIST" => Ok(Self::Arborist),
            "PARK_RANGER" => Ok(Self::ParkRanger),
            "LANDSCAPE_ARCHITECT" => Ok(Self::LandscapeArchitect),
            "VENDOR_MANAGER" => Ok(Self::VendorManager),
            _ => Err(TaskDomainError::unknown("role", value)),
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff member as seen by the task lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    id: StaffId,
    role: StaffRole,
    park_id: Option<ParkId>,
}

impl StaffMember {
    /// Creates a staff record.
    #[must_use]
    pub const fn new(id: StaffId, role: StaffRole, park_id: Option<ParkId>) -> Self {
        Self { id, role, park_id }
    }

    /// Returns the staff identifier.
    #[must_use]
    pub const fn id(&self) -> StaffId {
        self.id
    }

    /// Returns the staff role.
    #[must_use]
    pub const fn role(&self) -> StaffRole {
        self.role
    }

    /// Returns the home park, if the staff member is bound to one.
    #[must_use]
    pub const fn park_id(&self) -> Option<ParkId> {
        self.park_id
    }

    /// Returns whether this staff member may act on entities in `park`.
    ///
    /// Entities without a resolvable park are open to everyone.
    #[must_use]
    pub fn has_scope_over(&self, park: Option<ParkId>) -> bool {
        if self.role.is_elevated() {
            return true;
        }
        park.is_none_or(|target_park| self.park_id == Some(target_park))
    }
}
