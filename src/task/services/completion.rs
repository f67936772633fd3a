//! Best-effort writes of completion values into maintenance records.

use crate::task::{
    domain::{
        ActorRef, CompletionUpdateRule, CompletionValue, FieldName, MaintenanceTarget, TaskAsset,
        ValidatedCompletionUpdate,
    },
    ports::MaintenanceRepository,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a completion rule produced no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The rule targets the other asset kind.
    AssetMismatch,
    /// The completing user supplied no value for the rule.
    NoValue,
}

/// A value written into a maintenance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedCompletionUpdate {
    /// Table written.
    pub target: MaintenanceTarget,
    /// Column written.
    pub field: FieldName,
    /// Stored value.
    pub value: CompletionValue,
}

/// A rule that produced no write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCompletionUpdate {
    /// Table the rule targets.
    pub target: MaintenanceTarget,
    /// Column the rule targets.
    pub field: FieldName,
    /// Why nothing was written.
    pub reason: SkipReason,
}

/// A write the maintenance store rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCompletionUpdate {
    /// Table written.
    pub target: MaintenanceTarget,
    /// Column written.
    pub field: FieldName,
    /// Value that could not be stored.
    pub value: CompletionValue,
    /// Store error message.
    pub error: String,
}

/// Outcome of applying completion rules after a task completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    /// Values stored.
    pub applied: Vec<AppliedCompletionUpdate>,
    /// Rules with nothing to write.
    pub skipped: Vec<SkippedCompletionUpdate>,
    /// Writes that failed. The status change stands regardless.
    pub failed: Vec<FailedCompletionUpdate>,
}

impl CompletionReport {
    /// Returns `true` when every attempted write succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes validated completion values through the maintenance port.
#[derive(Clone)]
pub struct CompletionUpdateApplier<M>
where
    M: MaintenanceRepository,
{
    maintenance: Arc<M>,
}

impl<M> CompletionUpdateApplier<M>
where
    M: MaintenanceRepository,
{
    /// Creates an applier over a maintenance store.
    #[must_use]
    pub const fn new(maintenance: Arc<M>) -> Self {
        Self { maintenance }
    }

    /// Applies `updates` for the task's asset, walking `rules` in order.
    ///
    /// Never fails: each write outcome lands in the returned report.
    pub async fn apply(
        &self,
        asset: TaskAsset,
        rules: &[CompletionUpdateRule],
        updates: &[ValidatedCompletionUpdate],
        actor: &ActorRef,
    ) -> CompletionReport {
        let mut report = CompletionReport::default();
        for rule in rules {
            if rule.target.asset_kind() != asset.kind() {
                debug!(%asset, target = %rule.target, field = %rule.field, "completion rule targets other asset kind");
                report.skipped.push(skipped(rule, SkipReason::AssetMismatch));
                continue;
            }
            let Some(update) = updates.iter().find(|candidate| candidate.rule == *rule) else {
                debug!(%asset, target = %rule.target, field = %rule.field, "no completion value supplied");
                report.skipped.push(skipped(rule, SkipReason::NoValue));
                continue;
            };

            match self
                .maintenance
                .write_field(asset, &rule.field, &update.value, actor)
                .await
            {
                Ok(()) => {
                    info!(%asset, target = %rule.target, field = %rule.field, value = %update.value, "maintenance record updated");
                    report.applied.push(AppliedCompletionUpdate {
                        target: rule.target,
                        field: rule.field.clone(),
                        value: update.value.clone(),
                    });
                }
                Err(err) => {
                    warn!(%asset, target = %rule.target, field = %rule.field, error = %err, "maintenance update failed; task stays completed");
                    report.failed.push(FailedCompletionUpdate {
                        target: rule.target,
                        field: rule.field.clone(),
                        value: update.value.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        report
    }
}

fn skipped(rule: &CompletionUpdateRule, reason: SkipReason) -> SkippedCompletionUpdate {
    SkippedCompletionUpdate {
        target: rule.target,
        field: rule.field.clone(),
        reason,
    }
}
