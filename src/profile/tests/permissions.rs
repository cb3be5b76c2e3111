use serde_json::json;

use super::common::*;
use crate::profile::domain::{ProfileField, ValueKind};
use crate::profile::permissions::{
    classify, separate, validate, ChangeSetError, PermissionLevel, APPROVAL_REQUIRED_FIELDS,
    DIRECT_UPDATE_FIELDS, READ_ONLY_FIELDS,
};

#[test]
fn permission_sets_are_disjoint_and_cover_every_field() {
    for field in DIRECT_UPDATE_FIELDS {
        assert!(
            !APPROVAL_REQUIRED_FIELDS.contains(&field),
            "{field} classified both direct and approval-required"
        );
    }

    for field in ProfileField::ALL {
        let direct = DIRECT_UPDATE_FIELDS.contains(&field);
        let approval = APPROVAL_REQUIRED_FIELDS.contains(&field);
        assert!(
            direct ^ approval,
            "{field} must belong to exactly one permission set"
        );
    }

    // System-managed names must never overlap with the mutable field set.
    for name in READ_ONLY_FIELDS {
        assert!(ProfileField::parse(name).is_none(), "{name} is not mutable");
    }
}

#[test]
fn classify_matches_the_static_tables() {
    for field in DIRECT_UPDATE_FIELDS {
        assert_eq!(classify(field.name()), PermissionLevel::Direct);
    }
    for field in APPROVAL_REQUIRED_FIELDS {
        assert_eq!(classify(field.name()), PermissionLevel::ApprovalRequired);
    }
    for name in READ_ONLY_FIELDS {
        assert_eq!(classify(name), PermissionLevel::ReadOnly);
    }
}

#[test]
fn classify_fails_closed_for_unrecognized_names() {
    assert_eq!(classify("internal_flag"), PermissionLevel::ReadOnly);
    assert_eq!(classify(""), PermissionLevel::ReadOnly);
    // Near-misses of real names must not classify open.
    assert_eq!(classify("company-name"), PermissionLevel::ReadOnly);
    assert_eq!(classify("Phone"), PermissionLevel::ReadOnly);
}

#[test]
fn classify_is_deterministic() {
    for field in ProfileField::ALL {
        assert_eq!(classify(field.name()), classify(field.name()));
    }
}

#[test]
fn separate_partitions_every_key_exactly_once() {
    let requested = changes(&[
        ("phone", json!("+263 4 555 0100")),
        ("city", json!("Bulawayo")),
        ("company_name", json!("Acme Renamed")),
        ("tax_id", json!("TX-999-0001")),
        ("status", json!("APPROVED")),
        ("made_up_field", json!("x")),
    ]);

    let categorized = separate(&requested).expect("separation succeeds");

    assert_eq!(categorized.direct.len(), 2);
    assert_eq!(categorized.approval_required.len(), 2);
    assert_eq!(
        categorized.rejected,
        vec!["made_up_field".to_string(), "status".to_string()]
    );

    let total = categorized.direct.len() + categorized.approval_required.len()
        + categorized.rejected.len();
    assert_eq!(total, requested.len());

    for field in categorized.direct.keys() {
        assert!(!categorized.approval_required.contains_key(field));
    }
}

#[test]
fn validate_rejects_read_only_fields_listing_names() {
    let requested = changes(&[
        ("phone", json!("+263 4 555 0100")),
        ("status", json!("APPROVED")),
    ]);

    match validate(&requested) {
        Err(ChangeSetError::ReadOnlyFields(fields)) => {
            assert_eq!(fields, vec!["status".to_string()]);
        }
        other => panic!("expected read-only rejection, got {other:?}"),
    }
}

#[test]
fn validate_rejects_empty_submissions() {
    assert!(matches!(
        validate(&changes(&[])),
        Err(ChangeSetError::Empty)
    ));
}

#[test]
fn validate_rejects_mistyped_values() {
    let requested = changes(&[("years_in_business", json!("ten"))]);

    match validate(&requested) {
        Err(ChangeSetError::InvalidValue { field, expected }) => {
            assert_eq!(field, ProfileField::YearsInBusiness);
            assert_eq!(expected, ValueKind::Integer);
        }
        other => panic!("expected invalid value error, got {other:?}"),
    }

    let requested = changes(&[("phone", json!(42))]);
    assert!(matches!(
        validate(&requested),
        Err(ChangeSetError::InvalidValue {
            field: ProfileField::Phone,
            ..
        })
    ));
}

#[test]
fn validate_passes_through_a_clean_split() {
    let requested = changes(&[
        ("phone", json!("+263 4 555 0100")),
        ("company_name", json!("Acme Renamed")),
        ("years_in_business", json!(11)),
    ]);

    let categorized = validate(&requested).expect("valid submission");
    assert_eq!(categorized.direct.len(), 1);
    assert_eq!(categorized.approval_required.len(), 2);
    assert!(categorized.rejected.is_empty());
}
