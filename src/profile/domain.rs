use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for supplier records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VendorId(pub String);

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for profile change requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for the administrator who reviewed a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewerId(pub String);

/// The closed set of vendor-mutable profile fields. Anything outside this
/// enum is system-managed and never writable through the arbitration engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    CompanyName,
    Email,
    TaxId,
    RegistrationNumber,
    BusinessCategory,
    YearsInBusiness,
    ContactPersonName,
    ContactPersonTitle,
    Phone,
    Website,
    StreetAddress,
    City,
    StateProvince,
    PostalCode,
    Country,
}

impl ProfileField {
    pub const ALL: [ProfileField; 15] = [
        ProfileField::CompanyName,
        ProfileField::Email,
        ProfileField::TaxId,
        ProfileField::RegistrationNumber,
        ProfileField::BusinessCategory,
        ProfileField::YearsInBusiness,
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

    pub const fn name(self) -> &'static str {
        match self {
            ProfileField::CompanyName => "company_name",
            ProfileField::Email => "email",
            ProfileField::TaxId => "tax_id",
            ProfileField::RegistrationNumber => "registration_number",
            ProfileField::BusinessCategory => "business_category",
            ProfileField::YearsInBusiness => "years_in_business",
            ProfileField::ContactPersonName => "contact_person_name",
            ProfileField::ContactPersonTitle => "contact_person_title",
            ProfileField::Phone => "phone",
            ProfileField::Website => "website",
            ProfileField::StreetAddress => "street_address",
            ProfileField::City => "city",
            ProfileField::StateProvince => "state_province",
            ProfileField::PostalCode => "postal_code",
            ProfileField::Country => "country",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == raw)
    }

    /// The value shape this field accepts on the wire.
    pub const fn value_kind(self) -> ValueKind {
        match self {
            ProfileField::YearsInBusiness => ValueKind::Integer,
            _ => ValueKind::Text,
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of a field's value, used to reject mistyped submissions early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Integer,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => f.write_str("text"),
            ValueKind::Integer => f.write_str("integer"),
        }
    }
}

/// Tagged value for a single profile field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(u32),
    Text(String),
}

impl FieldValue {
    pub const fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Integer(_) => ValueKind::Integer,
            FieldValue::Text(_) => ValueKind::Text,
        }
    }

    /// Coerce a raw JSON value into the shape `field` expects.
    pub fn for_field(field: ProfileField, raw: &serde_json::Value) -> Option<Self> {
        match field.value_kind() {
            ValueKind::Integer => raw
                .as_u64()
                .and_then(|value| u32::try_from(value).ok())
                .map(FieldValue::Integer),
            ValueKind::Text => raw.as_str().map(|value| FieldValue::Text(value.to_string())),
        }
    }
}

/// A set of profile edits keyed by recognized field.
pub type ChangeSet = BTreeMap<ProfileField, FieldValue>;

/// Raised when a store write carries a value of the wrong shape for a field.
#[derive(Debug, Clone, thiserror::Error)]
#[error("field {field} expects a {expected} value")]
pub struct FieldValueMismatch {
    pub field: ProfileField,
    pub expected: ValueKind,
}

/// Registration lifecycle status of a supplier account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorStatus {
    Incomplete,
    Submitted,
    UnderReview,
    NeedMoreInfo,
    Approved,
    Rejected,
}

impl VendorStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VendorStatus::Incomplete => "INCOMPLETE",
            VendorStatus::Submitted => "SUBMITTED",
            VendorStatus::UnderReview => "UNDER_REVIEW",
            VendorStatus::NeedMoreInfo => "NEED_MORE_INFO",
            VendorStatus::Approved => "APPROVED",
            VendorStatus::Rejected => "REJECTED",
        }
    }
}

/// Live, canonical representation of a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub id: VendorId,
    pub status: VendorStatus,
    pub company_name: String,
    pub email: String,
    pub tax_id: String,
    pub registration_number: String,
    pub business_category: String,
    pub years_in_business: u32,
    pub contact_person_name: String,
    pub contact_person_title: String,
    pub phone: String,
    pub website: String,
    pub street_address: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorRecord {
    fn text_slot(&self, field: ProfileField) -> Option<&String> {
        match field {
            ProfileField::CompanyName => Some(&self.company_name),
            ProfileField::Email => Some(&self.email),
            ProfileField::TaxId => Some(&self.tax_id),
            ProfileField::RegistrationNumber => Some(&self.registration_number),
            ProfileField::BusinessCategory => Some(&self.business_category),
            ProfileField::YearsInBusiness => None,
            ProfileField::ContactPersonName => Some(&self.contact_person_name),
            ProfileField::ContactPersonTitle => Some(&self.contact_person_title),
            ProfileField::Phone => Some(&self.phone),
            ProfileField::Website => Some(&self.website),
            ProfileField::StreetAddress => Some(&self.street_address),
            ProfileField::City => Some(&self.city),
            ProfileField::StateProvince => Some(&self.state_province),
            ProfileField::PostalCode => Some(&self.postal_code),
            ProfileField::Country => Some(&self.country),
        }
    }

    fn text_slot_mut(&mut self, field: ProfileField) -> Option<&mut String> {
        match field {
            ProfileField::CompanyName => Some(&mut self.company_name),
            ProfileField::Email => Some(&mut self.email),
            ProfileField::TaxId => Some(&mut self.tax_id),
            ProfileField::RegistrationNumber => Some(&mut self.registration_number),
            ProfileField::BusinessCategory => Some(&mut self.business_category),
            ProfileField::YearsInBusiness => None,
            ProfileField::ContactPersonName => Some(&mut self.contact_person_name),
            ProfileField::ContactPersonTitle => Some(&mut self.contact_person_title),
            ProfileField::Phone => Some(&mut self.phone),
            ProfileField::Website => Some(&mut self.website),
            ProfileField::StreetAddress => Some(&mut self.street_address),
            ProfileField::City => Some(&mut self.city),
            ProfileField::StateProvince => Some(&mut self.state_province),
            ProfileField::PostalCode => Some(&mut self.postal_code),
            ProfileField::Country => Some(&mut self.country),
        }
    }

    /// Current value of a mutable profile field.
    pub fn field(&self, field: ProfileField) -> FieldValue {
        match self.text_slot(field) {
            Some(text) => FieldValue::Text(text.clone()),
            None => FieldValue::Integer(self.years_in_business),
        }
    }

    /// Overwrite a mutable profile field, rejecting values of the wrong shape.
    pub fn set_field(
        &mut self,
        field: ProfileField,
        value: &FieldValue,
    ) -> Result<(), FieldValueMismatch> {
        match (field, value) {
            (ProfileField::YearsInBusiness, FieldValue::Integer(years)) => {
                self.years_in_business = *years;
                Ok(())
            }
            (field, FieldValue::Text(text)) if field != ProfileField::YearsInBusiness => {
                if let Some(slot) = self.text_slot_mut(field) {
                    slot.clone_from(text);
                }
                Ok(())
            }
            (field, _) => Err(FieldValueMismatch {
                field,
                expected: field.value_kind(),
            }),
        }
    }

    /// Capture the live values for exactly the given fields.
    pub fn snapshot<I>(&self, fields: I) -> ChangeSet
    where
        I: IntoIterator<Item = ProfileField>,
    {
        fields
            .into_iter()
            .map(|field| (field, self.field(field)))
            .collect()
    }
}

/// Registration payload for a new supplier account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVendor {
    pub company_name: String,
    pub email: String,
    pub tax_id: String,
    pub registration_number: String,
    pub business_category: String,
    pub years_in_business: u32,
    pub contact_person_name: String,
    #[serde(default)]
    pub contact_person_title: String,
    pub phone: String,
    #[serde(default)]
    pub website: String,
    pub street_address: String,
    pub city: String,
    pub state_province: String,
    pub postal_code: String,
    pub country: String,
}

impl NewVendor {
    pub fn into_record(self, id: VendorId, now: DateTime<Utc>) -> VendorRecord {
        VendorRecord {
            id,
            status: VendorStatus::Submitted,
            company_name: self.company_name,
            email: self.email,
            tax_id: self.tax_id,
            registration_number: self.registration_number,
            business_category: self.business_category,
            years_in_business: self.years_in_business,
            contact_person_name: self.contact_person_name,
            contact_person_title: self.contact_person_title,
            phone: self.phone,
            website: self.website,
            street_address: self.street_address,
            city: self.city,
            state_province: self.state_province,
            postal_code: self.postal_code,
            country: self.country,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lifecycle state of a profile change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }
}

/// One bundle of approval-required edits for a single vendor, tracked from
/// submission through review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileChangeRequest {
    pub id: RequestId,
    pub vendor_id: VendorId,
    pub requested_changes: ChangeSet,
    pub current_values: ChangeSet,
    pub status: RequestStatus,
    pub reviewed_by: Option<ReviewerId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileChangeRequest {
    /// Drop review metadata, used when an approval is rolled back.
    pub fn clear_review(&mut self) {
        self.reviewed_by = None;
        self.reviewed_at = None;
        self.review_notes = None;
    }

    /// Admin queue entry with before/after values and aging information.
    pub fn queue_view(&self, today: DateTime<Utc>) -> PendingQueueEntry {
        PendingQueueEntry {
            id: self.id.clone(),
            vendor_id: self.vendor_id.clone(),
            requested_changes: self.requested_changes.clone(),
            current_values: self.current_values.clone(),
            created_at: self.created_at,
            days_pending: (today - self.created_at).num_days().max(0),
        }
    }
}

/// Sanitized admin-queue representation of a pending request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingQueueEntry {
    pub id: RequestId,
    pub vendor_id: VendorId,
    pub requested_changes: ChangeSet,
    pub current_values: ChangeSet,
    pub created_at: DateTime<Utc>,
    pub days_pending: i64,
}

/// Reviewer decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// What happened to each part of a submitted change-set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub direct_applied: usize,
    pub approval_created: bool,
    pub request_id: Option<RequestId>,
    pub direct_fields: Vec<ProfileField>,
    pub approval_fields: Vec<ProfileField>,
}
