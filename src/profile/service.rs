use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::domain::{
    NewVendor, PendingQueueEntry, ProfileChangeRequest, RequestId, RequestStatus, ReviewAction,
    ReviewerId, SubmissionOutcome, VendorId, VendorRecord,
};
use super::permissions::{validate, ChangeSetError};
use super::repository::{
    Notification, NotificationSender, NotificationTemplate, Recipient, RecordStore, StoreError,
};

static VENDOR_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_vendor_id() -> VendorId {
    let id = VENDOR_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    VendorId(format!("sup-{id:06}"))
}

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("pcr-{id:06}"))
}

/// Service arbitrating vendor profile edits: direct fields are written
/// straight to the live record, sensitive fields go through an admin-reviewed
/// change request, everything else is refused outright.
pub struct ProfileChangeService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> ProfileChangeService<S, N>
where
    S: RecordStore + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Register a new supplier account and notify administrators.
    pub fn register(&self, vendor: NewVendor) -> Result<VendorRecord, ProfileChangeError> {
        let record = vendor.into_record(next_vendor_id(), Utc::now());
        let stored = self.store.insert_vendor(record)?;

        let mut details = BTreeMap::new();
        details.insert("vendor_id".to_string(), stored.id.0.clone());
        details.insert("company_name".to_string(), stored.company_name.clone());
        self.notify(Notification {
            template: NotificationTemplate::VendorRegistered,
            recipient: Recipient::Admins,
            details,
        });

        Ok(stored)
    }

    /// Fetch the live vendor record.
    pub fn vendor(&self, vendor_id: &VendorId) -> Result<VendorRecord, ProfileChangeError> {
        self.store
            .fetch_vendor(vendor_id)?
            .ok_or_else(|| ProfileChangeError::VendorNotFound(vendor_id.clone()))
    }

    /// Submit a profile change-set. Validation happens before any write: one
    /// read-only field rejects the whole submission. Direct fields are
    /// applied immediately; the approval-required subset supersedes any
    /// existing pending request and opens a new one with a before/after
    /// snapshot.
    pub fn submit_changes(
        &self,
        vendor_id: &VendorId,
        requested: &Map<String, Value>,
    ) -> Result<SubmissionOutcome, ProfileChangeError> {
        let categorized = validate(requested)?;

        let mut live = self.vendor(vendor_id)?;

        let direct_fields: Vec<_> = categorized.direct.keys().copied().collect();
        let approval_fields: Vec<_> = categorized.approval_required.keys().copied().collect();

        if !categorized.direct.is_empty() {
            live = self
                .store
                .update_vendor_fields(vendor_id, &categorized.direct)?;
            info!(
                vendor = %vendor_id.0,
                fields = ?direct_fields,
                "applied direct profile updates"
            );
        }

        let mut request_id = None;
        if !categorized.approval_required.is_empty() {
            // Snapshot reflects the record as it stands after this
            // submission's direct updates.
            let current_values = live.snapshot(approval_fields.iter().copied());

            if let Some(mut superseded) = self.store.pending_request_for(vendor_id)? {
                superseded.status = RequestStatus::Cancelled;
                superseded.updated_at = Utc::now();
                let cancelled_id = superseded.id.clone();
                self.store.update_request(superseded)?;
                info!(
                    vendor = %vendor_id.0,
                    request = %cancelled_id.0,
                    "superseded prior pending change request"
                );
            }

            let now = Utc::now();
            let request = ProfileChangeRequest {
                id: next_request_id(),
                vendor_id: vendor_id.clone(),
                requested_changes: categorized.approval_required.clone(),
                current_values,
                status: RequestStatus::Pending,
                reviewed_by: None,
                reviewed_at: None,
                review_notes: None,
                created_at: now,
                updated_at: now,
            };
            let stored = self.store.insert_request(request)?;

            let mut details = BTreeMap::new();
            details.insert("vendor_id".to_string(), vendor_id.0.clone());
            details.insert("request_id".to_string(), stored.id.0.clone());
            details.insert(
                "fields".to_string(),
                approval_fields
                    .iter()
                    .map(|field| field.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            self.notify(Notification {
                template: NotificationTemplate::ProfileChangeRequested,
                recipient: Recipient::Admins,
                details,
            });

            request_id = Some(stored.id);
        }

        Ok(SubmissionOutcome {
            direct_applied: direct_fields.len(),
            approval_created: request_id.is_some(),
            request_id,
            direct_fields,
            approval_fields,
        })
    }

    /// The vendor's current pending request, if one exists.
    pub fn pending_request(
        &self,
        vendor_id: &VendorId,
    ) -> Result<Option<ProfileChangeRequest>, ProfileChangeError> {
        Ok(self.store.pending_request_for(vendor_id)?)
    }

    /// Full change history for a vendor, newest first.
    pub fn change_history(
        &self,
        vendor_id: &VendorId,
    ) -> Result<Vec<ProfileChangeRequest>, ProfileChangeError> {
        Ok(self.store.requests_for(vendor_id)?)
    }

    /// Admin-wide queue of pending requests with aging information.
    pub fn pending_queue(&self) -> Result<Vec<PendingQueueEntry>, ProfileChangeError> {
        let today = Utc::now();
        let queue = self.store.pending_requests()?;
        Ok(queue
            .iter()
            .map(|request| request.queue_view(today))
            .collect())
    }

    /// Review a pending request. Approval also applies the requested changes
    /// to the live record; a failed apply rolls the request back to PENDING.
    pub fn review(
        &self,
        request_id: &RequestId,
        action: ReviewAction,
        reviewer: &ReviewerId,
        notes: Option<String>,
    ) -> Result<ProfileChangeRequest, ProfileChangeError> {
        let mut request = self
            .store
            .fetch_request(request_id)?
            .ok_or_else(|| ProfileChangeError::RequestNotFound(request_id.clone()))?;

        if request.status != RequestStatus::Pending {
            return Err(ProfileChangeError::InvalidState(request.status));
        }

        let now = Utc::now();
        request.status = match action {
            ReviewAction::Approve => RequestStatus::Approved,
            ReviewAction::Reject => RequestStatus::Rejected,
        };
        request.reviewed_by = Some(reviewer.clone());
        request.reviewed_at = Some(now);
        request.review_notes = notes;
        request.updated_at = now;
        self.store.update_request(request.clone())?;

        if action == ReviewAction::Approve {
            request = self.apply(request_id)?;
        }

        let template = match action {
            ReviewAction::Approve => NotificationTemplate::ProfileChangeApproved,
            ReviewAction::Reject => NotificationTemplate::ProfileChangeRejected,
        };
        let mut details = BTreeMap::new();
        details.insert("request_id".to_string(), request.id.0.clone());
        if let Some(notes) = &request.review_notes {
            details.insert("review_notes".to_string(), notes.clone());
        }
        self.notify(Notification {
            template,
            recipient: Recipient::Vendor(request.vendor_id.clone()),
            details,
        });

        Ok(request)
    }

    /// Write an APPROVED request's changes onto the live vendor record. If
    /// the store write fails the request reverts to PENDING with its review
    /// metadata cleared, so it re-enters the reviewable queue instead of
    /// being stranded as approved-but-not-applied.
    pub fn apply(
        &self,
        request_id: &RequestId,
    ) -> Result<ProfileChangeRequest, ProfileChangeError> {
        let mut request = self
            .store
            .fetch_request(request_id)?
            .ok_or_else(|| ProfileChangeError::RequestNotFound(request_id.clone()))?;

        if request.status != RequestStatus::Approved {
            return Err(ProfileChangeError::NotApproved(request.status));
        }

        match self
            .store
            .update_vendor_fields(&request.vendor_id, &request.requested_changes)
        {
            Ok(_) => Ok(request),
            Err(err) => {
                request.status = RequestStatus::Pending;
                request.clear_review();
                request.updated_at = Utc::now();
                if let Err(rollback_err) = self.store.update_request(request) {
                    warn!(
                        request = %request_id.0,
                        error = %rollback_err,
                        "failed to roll back request status after apply failure"
                    );
                }
                Err(ProfileChangeError::ApplyFailed(err))
            }
        }
    }

    fn notify(&self, notification: Notification) {
        let template = notification.template;
        if let Err(err) = self.notifier.send(notification) {
            warn!(template = template.label(), error = %err, "notification dispatch failed");
        }
    }
}

/// Error raised by the profile change service.
#[derive(Debug, thiserror::Error)]
pub enum ProfileChangeError {
    #[error(transparent)]
    ChangeSet(#[from] ChangeSetError),
    #[error("vendor {0} not found")]
    VendorNotFound(VendorId),
    #[error("change request {0} not found")]
    RequestNotFound(RequestId),
    #[error("cannot review request with status: {}", .0.label())]
    InvalidState(RequestStatus),
    #[error("cannot apply request with status: {}", .0.label())]
    NotApproved(RequestStatus),
    #[error("failed to apply approved changes: {0}")]
    ApplyFailed(#[source] StoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
