//! Asset a workshop task is raised against.

use super::{PlantId, TaskDomainError, VehicleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle or item of plant targeted by a task. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TaskAsset {
    /// Fleet vehicle.
    Vehicle(VehicleId),
    /// Item of plant (excavators, generators and so on).
    Plant(PlantId),
}

/// Kind of asset, without its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Fleet vehicle.
    Vehicle,
    /// Item of plant.
    Plant,
}

impl TaskAsset {
    /// Rebuilds an asset from the pair of nullable storage columns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidAssetReference`] unless exactly one
    /// column is set.
    pub const fn from_columns(
        vehicle_id: Option<VehicleId>,
        plant_id: Option<PlantId>,
    ) -> Result<Self, TaskDomainError> {
        match (vehicle_id, plant_id) {
            (Some(vehicle), None) => Ok(Self::Vehicle(vehicle)),
            (None, Some(plant)) => Ok(Self::Plant(plant)),
            _ => Err(TaskDomainError::InvalidAssetReference),
        }
    }

    /// Splits the asset into the `(vehicle_id, plant_id)` storage columns.
    #[must_use]
    pub const fn to_columns(self) -> (Option<VehicleId>, Option<PlantId>) {
        match self {
            Self::Vehicle(vehicle) => (Some(vehicle), None),
            Self::Plant(plant) => (None, Some(plant)),
        }
    }

    /// Returns the asset kind.
    #[must_use]
    pub const fn kind(self) -> AssetKind {
        match self {
            Self::Vehicle(_) => AssetKind::Vehicle,
            Self::Plant(_) => AssetKind::Plant,
        }
    }

    /// Returns the raw identifier of the asset.
    #[must_use]
    pub const fn id(self) -> uuid::Uuid {
        match self {
            Self::Vehicle(vehicle) => vehicle.into_inner(),
            Self::Plant(plant) => plant.into_inner(),
        }
    }
}

impl AssetKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Plant => "plant",
        }
    }
}

impl fmt::Display for TaskAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.id())
    }
}
