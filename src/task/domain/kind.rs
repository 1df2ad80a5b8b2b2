//! Task type catalogues for each task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::hash::Hash;

/// Behaviour shared by the per-domain task type enums.
pub trait TaskKind:
    Copy
    + fmt::Debug
    + Eq
    + Hash
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
    + for<'a> TryFrom<&'a str, Error = TaskDomainError>
{
    /// Returns the canonical storage representation.
    fn as_str(self) -> &'static str;
}

/// Kind of work carried out on facilities and equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceTaskType {
    /// Visual or functional inspection.
    Inspection,
    /// Cleaning.
    Cleaning,
    /// General repair.
    Repair,
    /// Plumbing work.
    Plumbing,
    /// Electrical work.
    Electrical,
    /// Heating, ventilation and air conditioning.
    HeatAndAirConditioning,
    /// Sensor or instrument calibration.
    Calibration,
    /// Firmware or software update.
    SoftwareUpdate,
    /// Swap of a hardware component.
    HardwareReplacement,
    /// Functional testing.
    Testing,
    /// Moving an asset elsewhere.
    AssetRelocation,
    /// Fire safety check or remediation.
    FireSafety,
    /// Security check.
    SecurityCheck,
    /// Waste handling.
    WasteManagement,
    /// Anything else.
    Others,
}

impl TaskKind for MaintenanceTaskType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inspection => "INSPECTION",
            Self::Cleaning => "CLEANING",
            Self::Repair => "REPAIR",
            Self::Plumbing => "PLUMBING",
            Self::Electrical => "ELECTRICAL",
            Self::HeatAndAirConditioning => "HEAT_AND_AIR_CONDITIONING",
            Self::Calibration => "CALIBRATION",
            Self::SoftwareUpdate => "SOFTWARE_UPDATE",
            Self::HardwareReplacement => "HARDWARE_REPLACEMENT",
            Self::Testing => "TESTING",
            Self::AssetRelocation => "ASSET_RELOCATION",
            Self::FireSafety => "FIRE_SAFETY",
            Self::SecurityCheck => "SECURITY_CHECK",
            Self::WasteManagement => "WASTE_MANAGEMENT",
            Self::Others => "OTHERS",
        }
    }
}

impl TryFrom<&str> for MaintenanceTaskType {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "INSPECTION" => Ok(Self::Inspection),
            "CLEANING" => Ok(Self::Cleaning),
            "REPAIR" => Ok(Self::Repair),
            "PLUMBING" => Ok(Self::Plumbing),
            "ELECTRICAL" => Ok(Self::Electrical),
            "HEAT_AND_AIR_CONDITIONING" => Ok(Self::HeatAndAirConditioning),
            "CALIBRATION" => Ok(Self::Calibration),
            "SOFTWARE_UPDATE" => Ok(Self::SoftwareUpdate),
            "HARDWARE_REPLACEMENT" => Ok(Self::HardwareReplacement),
            "TESTING" => Ok(Self::Testing),
            "ASSET_RELOCATION" => Ok(Self::AssetRelocation),
            "FIRE_SAFETY" => Ok(Self::FireSafety),
            "SECURITY_CHECK" => Ok(Self::SecurityCheck),
            "WASTE_MANAGEMENT" => Ok(Self::WasteManagement),
            "OTHERS" => Ok(Self::Others),
            _ => Err(TaskDomainError::unknown("maintenance task type", value)),
        }
    }
}

/// Kind of care carried out on a plant occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlantTaskType {
    /// Health inspection.
    Inspection,
    /// Watering.
    Watering,
    /// Pruning and trimming.
    PruningTrimming,
    /// Pest control.
    PestManagement,
    /// Soil care.
    SoilMaintenance,
    /// Staking and supporting.
    StakingSupporting,
    /// Clearing fallen debris.
    DebrisRemoval,
    /// Light, shade or climate adjustment.
    EnvironmentalAdjustment,
    /// Anything else.
    Others,
}

impl TaskKind for PlantTaskType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inspection => "INSPECTION",
            Self::Watering => "WATERING",
            Self::PruningTrimming => "PRUNING_TRIMMING",
            Self::PestManagement => "PEST_MANAGEMENT",
            Self::SoilMaintenance => "SOIL_MAINTENANCE",
            Self::StakingSupporting => "STAKING_SUPPORTING",
            Self::DebrisRemoval => "DEBRIS_REMOVAL",
            Self::EnvironmentalAdjustment => "ENVIRONMENTAL_ADJUSTMENT",
            Self::Others => "OTHERS",
        }
    }
}

impl TryFrom<&str> for PlantTaskType {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "INSPECTION" => Ok(Self::Inspection),
            "WATERING" => Ok(Self::Watering),
            "PRUNING_TRIMMING" => Ok(Self::PruningTrimming),
            "PEST_MANAGEMENT" => Ok(Self::PestManagement),
            "SOIL_MAINTENANCE" => Ok(Self::SoilMaintenance),
            "STAKING_SUPPORTING" => Ok(Self::StakingSupporting),
            "DEBRIS_REMOVAL" => Ok(Self::DebrisRemoval),
            "ENVIRONMENTAL_ADJUSTMENT" => Ok(Self::EnvironmentalAdjustment),
            "OTHERS" => Ok(Self::Others),
            _ => Err(TaskDomainError::unknown("plant task type", value)),
        }
    }
}
