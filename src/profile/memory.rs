use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::info;

use super::domain::{ChangeSet, ProfileChangeRequest, RequestId, RequestStatus, VendorId, VendorRecord};
use super::repository::{
    Notification, NotificationError, NotificationSender, Recipient, RecordStore, StoreError,
};

/// Mutex-guarded in-memory record store backing the server binary and the
/// test suite. Requests are kept in insertion order so history and queue
/// ordering fall out naturally.
#[derive(Default, Clone)]
pub struct InMemoryRecordStore {
    vendors: Arc<Mutex<HashMap<VendorId, VendorRecord>>>,
    requests: Arc<Mutex<Vec<ProfileChangeRequest>>>,
}

impl RecordStore for InMemoryRecordStore {
    fn insert_vendor(&self, record: VendorRecord) -> Result<VendorRecord, StoreError> {
        let mut guard = self.vendors.lock().expect("vendor mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_vendor(&self, id: &VendorId) -> Result<Option<VendorRecord>, StoreError> {
        let guard = self.vendors.lock().expect("vendor mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_vendor_fields(
        &self,
        id: &VendorId,
        changes: &ChangeSet,
    ) -> Result<VendorRecord, StoreError> {
        let mut guard = self.vendors.lock().expect("vendor mutex poisoned");
        let mut record = guard.get(id).cloned().ok_or(StoreError::NotFound)?;

        // Stage every field on a copy first so a rejected value leaves the
        // stored record untouched.
        for (field, value) in changes {
            record.set_field(*field, value)?;
        }
        record.updated_at = Utc::now();

        guard.insert(id.clone(), record.clone());
        Ok(record)
    }

    fn insert_request(
        &self,
        request: ProfileChangeRequest,
    ) -> Result<ProfileChangeRequest, StoreError> {
        let mut guard = self.requests.lock().expect("request mutex poisoned");
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(StoreError::Conflict);
        }
        // Uniqueness invariant: at most one PENDING request per vendor. The
        // cancel-then-create sequence spans two store calls, so racing
        // submissions are caught here rather than in the service.
        if request.status == RequestStatus::Pending
            && guard.iter().any(|existing| {
                existing.vendor_id == request.vendor_id
                    && existing.status == RequestStatus::Pending
            })
        {
            return Err(StoreError::Conflict);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<ProfileChangeRequest>, StoreError> {
        let guard = self.requests.lock().expect("request mutex poisoned");
        Ok(guard.iter().find(|request| &request.id == id).cloned())
    }

    fn update_request(&self, request: ProfileChangeRequest) -> Result<(), StoreError> {
        let mut guard = self.requests.lock().expect("request mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == request.id) {
            Some(slot) => {
                *slot = request;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn pending_request_for(
        &self,
        vendor: &VendorId,
    ) -> Result<Option<ProfileChangeRequest>, StoreError> {
        let guard = self.requests.lock().expect("request mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .find(|request| {
                &request.vendor_id == vendor && request.status == RequestStatus::Pending
            })
            .cloned())
    }

    fn requests_for(&self, vendor: &VendorId) -> Result<Vec<ProfileChangeRequest>, StoreError> {
        let guard = self.requests.lock().expect("request mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|request| &request.vendor_id == vendor)
            .cloned()
            .collect())
    }

    fn pending_requests(&self) -> Result<Vec<ProfileChangeRequest>, StoreError> {
        let guard = self.requests.lock().expect("request mutex poisoned");
        Ok(guard
            .iter()
            .filter(|request| request.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }
}

/// Notification sink that records deliveries in the log stream. Stands in
/// for the real mail transport, which is out of scope for this service.
#[derive(Default, Clone)]
pub struct LogNotificationSender;

impl NotificationSender for LogNotificationSender {
    fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        let recipient = match &notification.recipient {
            Recipient::Admins => "admins".to_string(),
            Recipient::Vendor(id) => id.0.clone(),
        };
        info!(
            template = notification.template.label(),
            recipient = %recipient,
            "notification dispatched"
        );
        Ok(())
    }
}
