//! Maps each alert of a batch onto the tracker: open a new issue for an
//! unseen fingerprint, otherwise append a note to the open one (closing it
//! when the alert resolved).
//!
//! No state is kept between batches. The open issue carrying the
//! `fingerprint::<fp>` label is the only record of an alert occurrence, so the
//! tracker's label search is the index. Two concurrent batches that both miss
//! the same new fingerprint will both create an issue; the tracker has no
//! "create unless label exists" call to prevent that.
use super::description::DescriptionRenderer;
use super::issue_error::ReconcileError;
use super::issue_tracker::{IssueTracker, NewIssue};
use crate::alertmanager::payload::{fingerprint_label, Alert, AlertBatch};
use std::sync::Arc;

const RESOLVED_MARKER: &str = "_**Alert resolved**_";
const RETRIGGERED_MARKER: &str = "_**Alert triggered again**_";
// GitLab quick action, applied when the note is posted
const CLOSE_DIRECTIVE: &str = "/close";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    Created(u64),
    Noted(u64),
    Closed(u64),
    NoteFailed(u64),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub created: usize,
    pub noted: usize,
    pub closed: usize,
    pub failed_notes: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: AlertOutcome) {
        match outcome {
            AlertOutcome::Created(_) => self.created += 1,
            AlertOutcome::Noted(_) => self.noted += 1,
            AlertOutcome::Closed(_) => self.closed += 1,
            AlertOutcome::NoteFailed(_) => self.failed_notes += 1,
        }
    }
}

pub fn note_body(resolved: bool, description: &str) -> String {
    if resolved {
        format!("{}\n\n{}\n{}", RESOLVED_MARKER, description, CLOSE_DIRECTIVE)
    } else {
        format!("{}\n\n{}", RETRIGGERED_MARKER, description)
    }
}

pub struct Reconciler {
    tracker: Arc<dyn IssueTracker>,
    renderer: DescriptionRenderer,
}

impl Reconciler {
    pub fn new(tracker: Arc<dyn IssueTracker>, renderer: DescriptionRenderer) -> Self {
        Self { tracker, renderer }
    }

    /// Alerts are handled in order. A failed lookup or a failed creation
    /// stops the batch; a failed note only costs that alert its update.
    pub async fn reconcile(&self, batch: &AlertBatch) -> Result<BatchSummary, ReconcileError> {
        let mut summary = BatchSummary::default();

        for alert in &batch.alerts {
            log::info!(
                "Processing alert: fingerprint={} status={}",
                alert.fingerprint,
                alert.status
            );
            let outcome = self.reconcile_alert(batch, alert).await?;
            summary.record(outcome);
        }

        log::info!(
            "Batch from {} done: created={} noted={} closed={} failed_notes={}",
            batch.receiver,
            summary.created,
            summary.noted,
            summary.closed,
            summary.failed_notes
        );
        Ok(summary)
    }

    async fn reconcile_alert(
        &self,
        batch: &AlertBatch,
        alert: &Alert,
    ) -> Result<AlertOutcome, ReconcileError> {
        let label = fingerprint_label(&alert.fingerprint);
        let description = self.renderer.render(batch, alert)?;

        // a failed search is not "not found": creating here would duplicate
        let existing = self
            .tracker
            .find_open_issues(&label)
            .await
            .map_err(|source| ReconcileError::Lookup {
                fingerprint: alert.fingerprint.clone(),
                source,
            })?;

        match existing.first() {
            Some(issue) => {
                if existing.len() > 1 {
                    log::warn!(
                        "{} open issues carry {}, using #{}",
                        existing.len(),
                        label,
                        issue.iid
                    );
                }
                Ok(self.append_note(alert, issue.iid, &description).await)
            }
            None => self.open_issue(alert, description).await,
        }
    }

    async fn append_note(&self, alert: &Alert, iid: u64, description: &str) -> AlertOutcome {
        let resolved = alert.is_resolved();
        let body = note_body(resolved, description);

        if let Err(e) = self.tracker.add_note(iid, &body).await {
            log::warn!(
                "Failed to add note to issue #{} for fingerprint {}: {}",
                iid,
                alert.fingerprint,
                e
            );
            return AlertOutcome::NoteFailed(iid);
        }

        if resolved {
            log::info!("[Close] fingerprint={} issue=#{}", alert.fingerprint, iid);
            AlertOutcome::Closed(iid)
        } else {
            log::info!("[Note] fingerprint={} issue=#{}", alert.fingerprint, iid);
            AlertOutcome::Noted(iid)
        }
    }

    async fn open_issue(
        &self,
        alert: &Alert,
        description: String,
    ) -> Result<AlertOutcome, ReconcileError> {
        let issue = NewIssue {
            title: alert.title(),
            description,
            labels: alert.issue_labels(),
        };

        let created = self
            .tracker
            .create_issue(&issue)
            .await
            .map_err(|source| ReconcileError::Create {
                fingerprint: alert.fingerprint.clone(),
                source,
            })?;

        log::info!(
            "[Create] fingerprint={} issue=#{} title={:?}",
            alert.fingerprint,
            created.iid,
            created.title
        );
        Ok(AlertOutcome::Created(created.iid))
    }
}
