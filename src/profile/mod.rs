//! Profile change arbitration engine.
//!
//! Vendor profile edits are split by a static field-sensitivity
//! classification: low-risk contact fields apply immediately, identity- and
//! compliance-sensitive fields open an admin-reviewed change request, and
//! system-managed fields are rejected outright. Approved requests are applied
//! to the live record atomically, with the request rolled back to PENDING if
//! the write fails.

pub mod domain;
pub mod memory;
pub mod permissions;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ChangeSet, FieldValue, FieldValueMismatch, NewVendor, PendingQueueEntry, ProfileChangeRequest,
    ProfileField, RequestId, RequestStatus, ReviewAction, ReviewerId, SubmissionOutcome,
    ValueKind, VendorId, VendorRecord, VendorStatus,
};
pub use memory::{InMemoryRecordStore, LogNotificationSender};
pub use permissions::{
    classify, separate, validate, CategorizedChanges, ChangeSetError, PermissionLevel,
    APPROVAL_REQUIRED_FIELDS, DIRECT_UPDATE_FIELDS, READ_ONLY_FIELDS,
};
pub use repository::{
    Notification, NotificationError, NotificationSender, NotificationTemplate, Recipient,
    RecordStore, StoreError,
};
pub use router::{profile_router, ReviewProfileChange, SubmitProfileChanges};
pub use service::{ProfileChangeError, ProfileChangeService};
