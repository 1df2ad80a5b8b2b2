//! Target entities a task is raised against.
//!
//! Each task domain models its targets as a sum type. Requests carry a list of
//! candidate references so that "none" and "several" remain representable at
//! the boundary and can be rejected with a validation error.

use super::{MaintenanceTaskType, PlantTaskType, StaffRole, TaskDomainError, TaskKind};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a park facility.
    FacilityId
);
entity_id!(
    /// Identifier of a park asset.
    ParkAssetId
);
entity_id!(
    /// Identifier of an environmental sensor.
    SensorId
);
entity_id!(
    /// Identifier of a sensor hub.
    HubId
);
entity_id!(
    /// Identifier of a plant occurrence.
    OccurrenceId
);

/// The two families of work items sharing the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDomain {
    /// Work on facilities and equipment.
    Maintenance,
    /// Care of botanical occurrences.
    Plant,
}

impl TaskDomain {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Plant => "plant",
        }
    }
}

impl fmt::Display for TaskDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target reference type that parameterizes [`super::Task`].
pub trait TaskTarget:
    Clone
    + fmt::Debug
    + fmt::Display
    + Eq
    + Hash
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Task type catalogue used by this domain.
    type Kind: TaskKind;

    /// Storage discriminator for this domain.
    const DOMAIN: TaskDomain;

    /// Returns whether staff holding `role` may submit tasks in this domain.
    fn accepts_submitter(role: StaffRole) -> bool;
}

/// Picks the single reference out of `candidates`.
///
/// Returns `Ok(None)` when no reference was supplied.
///
/// # Errors
///
/// Returns [`TaskDomainError::MultipleTargets`] when more than one reference
/// was supplied.
pub fn at_most_one_target<T: Clone>(candidates: &[T]) -> Result<Option<T>, TaskDomainError> {
    match candidates {
        [] => Ok(None),
        [single] => Ok(Some(single.clone())),
        several => Err(TaskDomainError::MultipleTargets(several.len())),
    }
}

/// Picks the single mandatory reference out of `candidates`.
///
/// # Errors
///
/// Returns [`TaskDomainError::MissingTarget`] when nothing was supplied, or
/// [`TaskDomainError::MultipleTargets`] when more than one reference was.
pub fn exactly_one_target<T: Clone>(candidates: &[T]) -> Result<T, TaskDomainError> {
    at_most_one_target(candidates)?.ok_or(TaskDomainError::MissingTarget)
}

/// Entity a maintenance task is raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum MaintenanceTarget {
    /// A facility such as a toilet block or pavilion.
    Facility(FacilityId),
    /// A movable or fixed park asset.
    ParkAsset(ParkAssetId),
    /// A sensor.
    Sensor(SensorId),
    /// A sensor hub.
    Hub(HubId),
}

impl fmt::Display for MaintenanceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Facility(id) => write!(f, "facility:{id}"),
            Self::ParkAsset(id) => write!(f, "park_asset:{id}"),
            Self::Sensor(id) => write!(f, "sensor:{id}"),
            Self::Hub(id) => write!(f, "hub:{id}"),
        }
    }
}

impl TaskTarget for MaintenanceTarget {
    type Kind = MaintenanceTaskType;

    const DOMAIN: TaskDomain = TaskDomain::Maintenance;

    fn accepts_submitter(_role: StaffRole) -> bool {
        true
    }
}

/// Entity a plant task is raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PlantTarget {
    /// A recorded occurrence of a plant species.
    Occurrence(OccurrenceId),
}

impl fmt::Display for PlantTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occurrence(id) => write!(f, "occurrence:{id}"),
        }
    }
}

impl TaskTarget for PlantTarget {
    type Kind = PlantTaskType;

    const DOMAIN: TaskDomain = TaskDomain::Plant;

    fn accepts_submitter(role: StaffRole) -> bool {
        matches!(
            role,
            StaffRole::Superadmin | StaffRole::Manager | StaffRole::Botanist | StaffRole::Arborist
        )
    }
}
