use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    ChangeSet, FieldValueMismatch, ProfileChangeRequest, RequestId, VendorId, VendorRecord,
};

/// Storage abstraction over the vendor and change-request tables so the
/// arbitration engine can be exercised against test doubles.
pub trait RecordStore: Send + Sync {
    fn insert_vendor(&self, record: VendorRecord) -> Result<VendorRecord, StoreError>;
    fn fetch_vendor(&self, id: &VendorId) -> Result<Option<VendorRecord>, StoreError>;
    /// Overwrite the given fields on the live record and bump `updated_at`.
    /// The write is atomic per call: either every field lands or none does.
    fn update_vendor_fields(
        &self,
        id: &VendorId,
        changes: &ChangeSet,
    ) -> Result<VendorRecord, StoreError>;

    fn insert_request(
        &self,
        request: ProfileChangeRequest,
    ) -> Result<ProfileChangeRequest, StoreError>;
    fn fetch_request(&self, id: &RequestId) -> Result<Option<ProfileChangeRequest>, StoreError>;
    fn update_request(&self, request: ProfileChangeRequest) -> Result<(), StoreError>;
    /// The single PENDING request for a vendor, if any.
    fn pending_request_for(
        &self,
        vendor: &VendorId,
    ) -> Result<Option<ProfileChangeRequest>, StoreError>;
    /// Full request history for a vendor, newest first.
    fn requests_for(&self, vendor: &VendorId) -> Result<Vec<ProfileChangeRequest>, StoreError>;
    /// Admin-wide queue of PENDING requests, oldest first.
    fn pending_requests(&self) -> Result<Vec<ProfileChangeRequest>, StoreError>;
}

/// Error enumeration for record-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Value(#[from] FieldValueMismatch),
}

/// Trait describing the outbound notification hook (e-mail or similar).
/// Delivery is best-effort from the engine's perspective.
pub trait NotificationSender: Send + Sync {
    fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Message templates dispatched by the arbitration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    VendorRegistered,
    ProfileChangeRequested,
    ProfileChangeApproved,
    ProfileChangeRejected,
}

impl NotificationTemplate {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationTemplate::VendorRegistered => "vendor_registered",
            NotificationTemplate::ProfileChangeRequested => "profile_change_requested",
            NotificationTemplate::ProfileChangeApproved => "profile_change_approved",
            NotificationTemplate::ProfileChangeRejected => "profile_change_rejected",
        }
    }
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Admins,
    Vendor(VendorId),
}

/// Notification payload so routes and tests can assert integration
/// boundaries without a real mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: NotificationTemplate,
    pub recipient: Recipient,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
