//! Analyzer operations with write-through audit history
//!
//! Each operation performs at most one store mutation and then queues a
//! history entry on the [`AuditTrail`]. The response never waits for, nor
//! fails because of, the history write.

use std::sync::Arc;

use audit_engine::{AuditTrail, HistoryAction, PendingEntry};
use database_layer::{Analyzer, AnalyzerFilter, AnalyzerPatch, AnalyzerStore, NewAnalyzer};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthContext;

const RESOURCE: &str = "analyzer";

/// Centralized analyzer service
#[derive(Clone)]
pub struct AnalyzerService {
    store: Arc<dyn AnalyzerStore>,
    audit: AuditTrail,
}

impl AnalyzerService {
    pub fn new(store: Arc<dyn AnalyzerStore>, audit: AuditTrail) -> Self {
        Self { store, audit }
    }

    /// Audit handle, shared with whoever needs to flush it
    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    pub async fn is_healthy(&self) -> bool {
        self.store.is_healthy().await
    }

    /// Insert an analyzer and record its creation.
    pub async fn create(&self, auth: &AuthContext, body: NewAnalyzer) -> ApiResult<Analyzer> {
        let analyzer = self.store.create(body).await?;

        info!(analyzer_id = %analyzer.id, "Analyzer created");
        self.track(
            auth,
            analyzer.id,
            HistoryAction::Create,
            &analyzer,
            Some(format!("Create new analyzer: {}", analyzer.name)),
        );

        Ok(analyzer)
    }

    /// Apply `patch` to one analyzer.
    ///
    /// History is recorded only when the activation status or the assignee
    /// actually changed.
    pub async fn update_by_id(
        &self,
        auth: &AuthContext,
        id: Uuid,
        patch: AnalyzerPatch,
    ) -> ApiResult<()> {
        let previous = self
            .store
            .update_by_id(id, &patch)
            .await?
            .ok_or_else(|| ApiError::not_found(RESOURCE))?;

        match update_brief(&previous, &patch) {
            Some(brief) => {
                let applied = AnalyzerPatch {
                    extra: patch.mergeable_extra(),
                    ..patch
                };
                self.track(auth, id, HistoryAction::Update, &applied, Some(brief));
            }
            None => debug!(analyzer_id = %id, "Update changed no tracked field; no history"),
        }

        Ok(())
    }

    /// Apply `patch` to every analyzer in `ids`.
    ///
    /// Matched analyzers are snapshotted first; one history entry per snapshot
    /// is queued only after the bulk update succeeded.
    pub async fn update_by_ids(
        &self,
        auth: &AuthContext,
        ids: &[Uuid],
        patch: AnalyzerPatch,
    ) -> ApiResult<()> {
        if ids.is_empty() {
            return Err(ApiError::bad_request("ids must be a non-empty list"));
        }
        if patch.is_empty() {
            return Err(ApiError::bad_request("properties must not be empty"));
        }

        let snapshots = self.store.find_by_ids(ids).await?;
        let updated = self.store.update_by_ids(ids, &patch).await?;

        if updated != snapshots.len() as u64 {
            warn!(
                requested = ids.len(),
                snapshotted = snapshots.len(),
                updated,
                "Bulk update matched a different set than its snapshot"
            );
        }

        for previous in &snapshots {
            let brief = patch
                .actived
                .and_then(|actived| status_brief(previous, actived));
            self.track(auth, previous.id, HistoryAction::Update, previous, brief);
        }

        info!(requested = ids.len(), updated, "Analyzers updated in bulk");
        Ok(())
    }

    /// Any analyzer by id, disabled ones included
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Analyzer> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(RESOURCE))
    }

    /// Enabled analyzers, oldest first
    pub async fn find_all(&self) -> ApiResult<Vec<Analyzer>> {
        Ok(self.store.find_all(AnalyzerFilter::default()).await?)
    }

    /// Remove an analyzer and record its deletion.
    pub async fn delete_by_id(&self, auth: &AuthContext, id: Uuid) -> ApiResult<Analyzer> {
        let analyzer = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(RESOURCE))?;

        info!(analyzer_id = %id, "Analyzer deleted");
        self.track(
            auth,
            analyzer.id,
            HistoryAction::Delete,
            &analyzer,
            Some(format!("Deleted analyzer: {}", analyzer.name)),
        );

        Ok(analyzer)
    }

    fn track<T: Serialize>(
        &self,
        auth: &AuthContext,
        analyzer_id: Uuid,
        action: HistoryAction,
        data: &T,
        brief: Option<String>,
    ) {
        match PendingEntry::new(analyzer_id, auth.email.as_str(), action).with_data(data) {
            Ok(entry) => self.audit.record(entry.with_brief(brief)),
            Err(e) => warn!(
                analyzer_id = %analyzer_id,
                action = %action,
                error = %e,
                "Could not serialize history payload; entry dropped"
            ),
        }
    }
}

/// Status clause, when `actived` differs from the stored flag
fn status_brief(previous: &Analyzer, actived: bool) -> Option<String> {
    (previous.actived != actived).then(|| {
        format!(
            "Updated analyzer: {}\n Changed status from {} to {}",
            previous.name, previous.actived, actived
        )
    })
}

/// Assignment clause, when `performed_by` differs from the stored assignee
fn assignment_brief(previous: &Analyzer, performed_by: &str) -> Option<String> {
    if previous.performed_by == performed_by {
        return None;
    }

    Some(if performed_by.is_empty() {
        format!("Unassign {}", previous.name)
    } else {
        format!("Assign {} to {}", previous.name, performed_by)
    })
}

/// Brief for a single update; `None` means nothing worth auditing changed.
fn update_brief(previous: &Analyzer, patch: &AnalyzerPatch) -> Option<String> {
    let clauses: Vec<String> = [
        patch.actived.and_then(|actived| status_brief(previous, actived)),
        patch
            .performed_by
            .as_deref()
            .and_then(|performed_by| assignment_brief(previous, performed_by)),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!clauses.is_empty()).then(|| clauses.join("\n"))
}
