use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{Map, Value};

use crate::profile::domain::{
    ChangeSet, FieldValue, NewVendor, ProfileChangeRequest, ProfileField, RequestId,
    RequestStatus, ReviewerId, VendorId, VendorRecord,
};
use crate::profile::memory::InMemoryRecordStore;
use crate::profile::repository::{
    Notification, NotificationError, NotificationSender, RecordStore, StoreError,
};
use crate::profile::router::profile_router;
use crate::profile::service::ProfileChangeService;

pub(super) fn new_vendor() -> NewVendor {
    NewVendor {
        company_name: "Acme Industrial Supplies".to_string(),
        email: "accounts@acme.example".to_string(),
        tax_id: "TX-554-8812".to_string(),
        registration_number: "REG-2019-00421".to_string(),
        business_category: "Industrial Equipment".to_string(),
        years_in_business: 6,
        contact_person_name: "Jordan Mutasa".to_string(),
        contact_person_title: "Operations Lead".to_string(),
        phone: "+263 4 123456".to_string(),
        website: "https://acme.example".to_string(),
        street_address: "14 Foundry Road".to_string(),
        city: "Harare".to_string(),
        state_province: "Harare Province".to_string(),
        postal_code: "00263".to_string(),
        country: "Zimbabwe".to_string(),
    }
}

/// A hand-built PENDING request, for driving the store directly without the
/// service's supersede step in front of it.
pub(super) fn pending_request(vendor: &VendorId, id: &str, renamed_to: &str) -> ProfileChangeRequest {
    let now = chrono::Utc::now();
    let mut requested_changes = ChangeSet::new();
    requested_changes.insert(
        ProfileField::CompanyName,
        FieldValue::Text(renamed_to.to_string()),
    );
    let mut current_values = ChangeSet::new();
    current_values.insert(
        ProfileField::CompanyName,
        FieldValue::Text("Acme Industrial Supplies".to_string()),
    );
    ProfileChangeRequest {
        id: RequestId(id.to_string()),
        vendor_id: vendor.clone(),
        requested_changes,
        current_values,
        status: RequestStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
        review_notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn reviewer() -> ReviewerId {
    ReviewerId("adm-000001".to_string())
}

pub(super) fn changes(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub(super) fn build_service() -> (
    ProfileChangeService<InMemoryRecordStore, MemoryNotifier>,
    Arc<InMemoryRecordStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(InMemoryRecordStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = ProfileChangeService::new(store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn build_flaky_service() -> (
    ProfileChangeService<FlakyVendorWriteStore, MemoryNotifier>,
    Arc<FlakyVendorWriteStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(FlakyVendorWriteStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = ProfileChangeService::new(store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn profile_router_with_service(
    service: ProfileChangeService<InMemoryRecordStore, MemoryNotifier>,
) -> axum::Router {
    profile_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Notification sink recording deliveries so tests can assert the
/// integration boundary.
#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationSender for MemoryNotifier {
    fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Notification sink whose transport is permanently down.
pub(super) struct FailingNotifier;

impl NotificationSender for FailingNotifier {
    fn send(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

/// Record store whose vendor-field writes can be switched off, so apply-time
/// failures can be provoked after submissions succeeded.
#[derive(Default)]
pub(super) struct FlakyVendorWriteStore {
    inner: InMemoryRecordStore,
    fail_vendor_writes: AtomicBool,
}

impl FlakyVendorWriteStore {
    pub(super) fn fail_vendor_writes(&self, fail: bool) {
        self.fail_vendor_writes.store(fail, Ordering::Release);
    }
}

impl RecordStore for FlakyVendorWriteStore {
    fn insert_vendor(&self, record: VendorRecord) -> Result<VendorRecord, StoreError> {
        self.inner.insert_vendor(record)
    }

    fn fetch_vendor(&self, id: &VendorId) -> Result<Option<VendorRecord>, StoreError> {
        self.inner.fetch_vendor(id)
    }

    fn update_vendor_fields(
        &self,
        id: &VendorId,
        changes: &ChangeSet,
    ) -> Result<VendorRecord, StoreError> {
        if self.fail_vendor_writes.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("supplier table offline".to_string()));
        }
        self.inner.update_vendor_fields(id, changes)
    }

    fn insert_request(
        &self,
        request: ProfileChangeRequest,
    ) -> Result<ProfileChangeRequest, StoreError> {
        self.inner.insert_request(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<ProfileChangeRequest>, StoreError> {
        self.inner.fetch_request(id)
    }

    fn update_request(&self, request: ProfileChangeRequest) -> Result<(), StoreError> {
        self.inner.update_request(request)
    }

    fn pending_request_for(
        &self,
        vendor: &VendorId,
    ) -> Result<Option<ProfileChangeRequest>, StoreError> {
        self.inner.pending_request_for(vendor)
    }

    fn requests_for(&self, vendor: &VendorId) -> Result<Vec<ProfileChangeRequest>, StoreError> {
        self.inner.requests_for(vendor)
    }

    fn pending_requests(&self) -> Result<Vec<ProfileChangeRequest>, StoreError> {
        self.inner.pending_requests()
    }
}
