//! In-memory maintenance records.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ActorRef, AssetKind, CompletionValue, FieldName, TaskAsset},
    ports::{MaintenanceRepository, MaintenanceRepositoryError, MaintenanceRepositoryResult},
};

/// Thread-safe in-memory maintenance store.
///
/// Accepts any field unless a schema has been registered for the asset kind
/// with [`InMemoryMaintenanceRepository::with_fields`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryMaintenanceRepository {
    state: Arc<RwLock<MaintenanceState>>,
}

#[derive(Debug, Default)]
struct MaintenanceState {
    records: HashMap<TaskAsset, BTreeMap<FieldName, CompletionValue>>,
    schemas: HashMap<AssetKind, HashSet<String>>,
}

impl InMemoryMaintenanceRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the columns accepted for `kind`.
    #[must_use]
    pub fn with_fields<'a>(
        self,
        kind: AssetKind,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        if let Ok(mut state) = self.state.write() {
            state
                .schemas
                .insert(kind, fields.into_iter().map(str::to_owned).collect());
        }
        self
    }

    /// Returns the stored value of `field` for `asset`, if any.
    #[must_use]
    pub fn field(&self, asset: TaskAsset, field: &str) -> Option<CompletionValue> {
        let state = self.state.read().ok()?;
        state
            .records
            .get(&asset)?
            .iter()
            .find(|(name, _)| name.as_str() == field)
            .map(|(_, value)| value.clone())
    }
}

#[async_trait]
impl MaintenanceRepository for InMemoryMaintenanceRepository {
    async fn write_field(
        &self,
        asset: TaskAsset,
        field: &FieldName,
        value: &CompletionValue,
        _updated_by: &ActorRef,
    ) -> MaintenanceRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            MaintenanceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let known = state
            .schemas
            .get(&asset.kind())
            .is_none_or(|fields| fields.contains(field.as_str()));
        if !known {
            return Err(MaintenanceRepositoryError::UnknownField(field.clone()));
        }
        state
            .records
            .entry(asset)
            .or_default()
            .insert(field.clone(), value.clone());
        Ok(())
    }
}
