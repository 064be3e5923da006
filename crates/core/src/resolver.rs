//! Bulk baseline resolution.
//!
//! [`BaselineResolver::apply_batch`] validates each incoming candidate,
//! applies the configured [`ConflictPolicy`] against the stored baseline and
//! writes winners through the [`BaselineStore`]. Bad entries are skipped and
//! reported per item; only a storage failure aborts the batch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::baseline::{BaselineCandidate, BaselineSource, BASE_DATE_FORMAT, SOURCE_COMPLETION};
use crate::error::CoreError;
use crate::store::BaselineStore;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

pub const POLICY_OVERWRITE: &str = "overwrite";
pub const POLICY_SOURCE_PRIORITY: &str = "source_priority";

/// All valid conflict policy names.
pub const VALID_POLICIES: &[&str] = &[POLICY_OVERWRITE, POLICY_SOURCE_PRIORITY];

/// How a candidate is merged into an existing baseline for the same pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Every valid candidate replaces the stored baseline, whatever its
    /// source. Matches the behaviour of a plain `ON CONFLICT DO UPDATE`.
    #[default]
    Overwrite,
    /// A candidate replaces the stored baseline only when its source has
    /// equal or higher priority than the stored source.
    SourcePriority,
}

impl ConflictPolicy {
    /// Parse from a configuration string.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            POLICY_OVERWRITE => Ok(Self::Overwrite),
            POLICY_SOURCE_PRIORITY => Ok(Self::SourcePriority),
            _ => Err(format!(
                "Invalid conflict policy '{s}'. Must be one of: {}",
                VALID_POLICIES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => POLICY_OVERWRITE,
            Self::SourcePriority => POLICY_SOURCE_PRIORITY,
        }
    }

    /// Whether an incoming source may replace a stored one.
    pub fn admits(&self, existing: BaselineSource, incoming: BaselineSource) -> bool {
        match self {
            Self::Overwrite => true,
            Self::SourcePriority => incoming.priority() >= existing.priority(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a candidate was not written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// Missing or unparseable required field.
    InvalidInput { message: String },
    /// The stored baseline comes from a more trusted source.
    LowerPriority {
        existing: BaselineSource,
        incoming: BaselineSource,
    },
}

/// Result of applying one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ItemResult {
    Applied,
    Skipped(SkipReason),
}

/// Per-candidate report entry. `index` is the position in the input batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub index: usize,
    pub vehicle_id: Option<String>,
    pub inspection_type_id: Option<DbId>,
    pub result: ItemResult,
}

/// Summary of a whole batch.
///
/// `applied_count + skipped_count` always equals the number of candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub applied_count: usize,
    pub skipped_count: usize,
    pub items: Vec<ItemOutcome>,
}

impl BatchOutcome {
    fn push(&mut self, item: ItemOutcome) {
        match item.result {
            ItemResult::Applied => self.applied_count += 1,
            ItemResult::Skipped(_) => self.skipped_count += 1,
        }
        self.items.push(item);
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Applies baseline candidates to a [`BaselineStore`].
pub struct BaselineResolver<S> {
    store: Arc<S>,
    policy: ConflictPolicy,
    store_timeout: Duration,
}

impl<S> Clone for BaselineResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
            store_timeout: self.store_timeout,
        }
    }
}

impl<S: BaselineStore> BaselineResolver<S> {
    pub fn new(store: Arc<S>, policy: ConflictPolicy, store_timeout: Duration) -> Self {
        Self {
            store,
            policy,
            store_timeout,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Apply candidates sequentially in input order.
    ///
    /// Each write is committed on its own; a repeated key within the batch
    /// ends with the last accepted candidate. A [`CoreError::Persistence`]
    /// stops the batch and is returned; writes made before it remain.
    pub async fn apply_batch(
        &self,
        candidates: &[BaselineCandidate],
    ) -> Result<BatchOutcome, CoreError> {
        let mut outcome = BatchOutcome {
            items: Vec::with_capacity(candidates.len()),
            ..BatchOutcome::default()
        };

        for (index, candidate) in candidates.iter().enumerate() {
            let result = self.apply_one(index, candidate).await?;
            outcome.push(ItemOutcome {
                index,
                vehicle_id: candidate.vehicle_id.clone(),
                inspection_type_id: candidate.inspection_type_id,
                result,
            });
        }

        tracing::info!(
            total = candidates.len(),
            applied = outcome.applied_count,
            skipped = outcome.skipped_count,
            policy = self.policy.as_str(),
            "Baseline batch applied",
        );
        Ok(outcome)
    }

    /// Record that an inspection was completed on `completed_on`, making that
    /// date the new baseline with source `completion`.
    pub async fn record_completion(
        &self,
        vehicle_id: &str,
        inspection_type_id: DbId,
        completed_on: NaiveDate,
        notes: Option<String>,
    ) -> Result<ItemOutcome, CoreError> {
        let candidate = BaselineCandidate {
            vehicle_id: Some(vehicle_id.to_string()),
            inspection_type_id: Some(inspection_type_id),
            base_date: Some(completed_on.format(BASE_DATE_FORMAT).to_string()),
            source: Some(SOURCE_COMPLETION.to_string()),
            notes,
            malformed: None,
        };
        let mut outcome = self.apply_batch(std::slice::from_ref(&candidate)).await?;
        outcome
            .items
            .pop()
            .ok_or_else(|| CoreError::Internal("empty outcome for single candidate".to_string()))
    }

    async fn apply_one(
        &self,
        index: usize,
        candidate: &BaselineCandidate,
    ) -> Result<ItemResult, CoreError> {
        let upsert = match candidate.to_upsert() {
            Ok(upsert) => upsert,
            Err(CoreError::Validation(message)) => {
                tracing::warn!(index, error = %message, "Skipping invalid baseline candidate");
                return Ok(ItemResult::Skipped(SkipReason::InvalidInput { message }));
            }
            Err(other) => return Err(other),
        };

        let existing = self
            .bounded(
                "get",
                self.store.get(&upsert.vehicle_id, upsert.inspection_type_id),
            )
            .await?;

        if let Some(existing) = existing {
            if !self.policy.admits(existing.source, upsert.source) {
                tracing::debug!(
                    index,
                    vehicle_id = %upsert.vehicle_id,
                    inspection_type_id = upsert.inspection_type_id,
                    existing = existing.source.as_str(),
                    incoming = upsert.source.as_str(),
                    "Candidate loses to stored baseline",
                );
                return Ok(ItemResult::Skipped(SkipReason::LowerPriority {
                    existing: existing.source,
                    incoming: upsert.source,
                }));
            }
        }

        let stored = self.bounded("upsert", self.store.upsert(&upsert)).await?;
        tracing::debug!(
            index,
            vehicle_id = %stored.vehicle_id,
            inspection_type_id = stored.inspection_type_id,
            base_date = %stored.base_date,
            source = stored.source.as_str(),
            "Baseline written",
        );
        Ok(ItemResult::Applied)
    }

    /// Run a store call under the configured timeout. Expiry counts as a
    /// failed call.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Baseline store call timed out",
                );
                Err(CoreError::Persistence(format!(
                    "baseline store {operation} timed out after {}ms",
                    self.store_timeout.as_millis()
                )))
            }
        }
    }
}
