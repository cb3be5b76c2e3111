//! Field-level permissions for vendor profile edits.
//!
//! Every recognized field carries exactly one sensitivity level; anything the
//! engine does not recognize is treated as read-only so classification fails
//! closed rather than open.

use serde::Serialize;
use serde_json::{Map, Value};

use super::domain::{ChangeSet, FieldValue, ProfileField, ValueKind};

/// Sensitivity level controlling how a field edit is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    Direct,
    ApprovalRequired,
    ReadOnly,
}

impl PermissionLevel {
    pub const fn label(self) -> &'static str {
        match self {
            PermissionLevel::Direct => "direct",
            PermissionLevel::ApprovalRequired => "approval_required",
            PermissionLevel::ReadOnly => "read_only",
        }
    }
}

/// Low-risk contact and address fields vendors may change with immediate
/// effect.
pub const DIRECT_UPDATE_FIELDS: [ProfileField; 9] = [
    ProfileField::ContactPersonName,
    ProfileField::ContactPersonTitle,
    ProfileField::Phone,
    ProfileField::Website,
    ProfileField::StreetAddress,
    ProfileField::City,
    ProfileField::StateProvince,
    ProfileField::PostalCode,
    ProfileField::Country,
];

/// Identity- and compliance-sensitive fields that must not change without
/// human review.
pub const APPROVAL_REQUIRED_FIELDS: [ProfileField; 6] = [
    ProfileField::CompanyName,
    ProfileField::Email,
    ProfileField::TaxId,
    ProfileField::RegistrationNumber,
    ProfileField::BusinessCategory,
    ProfileField::YearsInBusiness,
];

/// System-managed field names vendors can never touch. Kept as names rather
/// than enum variants: these are not part of the mutable field set.
pub const READ_ONLY_FIELDS: [&str; 11] = [
    "id",
    "status",
    "activity_status",
    "created_at",
    "updated_at",
    "submitted_at",
    "reviewed_at",
    "reviewed_by",
    "admin_notes",
    "rejection_reason",
    "info_request_message",
];

impl ProfileField {
    /// Sensitivity of a recognized mutable field.
    pub fn permission(self) -> PermissionLevel {
        if APPROVAL_REQUIRED_FIELDS.contains(&self) {
            PermissionLevel::ApprovalRequired
        } else {
            PermissionLevel::Direct
        }
    }
}

/// Classify a raw field name. Unrecognized names are read-only by default.
pub fn classify(field_name: &str) -> PermissionLevel {
    match ProfileField::parse(field_name) {
        Some(field) => field.permission(),
        None => PermissionLevel::ReadOnly,
    }
}

/// Three-way split of a submitted change-set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedChanges {
    pub direct: ChangeSet,
    pub approval_required: ChangeSet,
    pub rejected: Vec<String>,
}

/// Validation errors raised before any write happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChangeSetError {
    #[error("cannot modify read-only fields: {}", .0.join(", "))]
    ReadOnlyFields(Vec<String>),
    #[error("no valid fields to update")]
    Empty,
    #[error("field {field} expects a {expected} value")]
    InvalidValue {
        field: ProfileField,
        expected: ValueKind,
    },
}

/// Partition a raw submission by field sensitivity. Every key lands in
/// exactly one bucket; values are coerced into their field's shape.
pub fn separate(requested: &Map<String, Value>) -> Result<CategorizedChanges, ChangeSetError> {
    let mut categorized = CategorizedChanges::default();

    for (name, raw) in requested {
        let Some(field) = ProfileField::parse(name) else {
            categorized.rejected.push(name.clone());
            continue;
        };

        let value =
            FieldValue::for_field(field, raw).ok_or_else(|| ChangeSetError::InvalidValue {
                field,
                expected: field.value_kind(),
            })?;

        match field.permission() {
            PermissionLevel::Direct => {
                categorized.direct.insert(field, value);
            }
            PermissionLevel::ApprovalRequired => {
                categorized.approval_required.insert(field, value);
            }
            PermissionLevel::ReadOnly => categorized.rejected.push(name.clone()),
        }
    }

    Ok(categorized)
}

/// Validate a submission in full before anything is applied. A single
/// read-only field rejects the whole change-set.
pub fn validate(requested: &Map<String, Value>) -> Result<CategorizedChanges, ChangeSetError> {
    let categorized = separate(requested)?;

    if !categorized.rejected.is_empty() {
        return Err(ChangeSetError::ReadOnlyFields(categorized.rejected));
    }

    if categorized.direct.is_empty() && categorized.approval_required.is_empty() {
        return Err(ChangeSetError::Empty);
    }

    Ok(categorized)
}
