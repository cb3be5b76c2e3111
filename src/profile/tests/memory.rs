use super::common::*;
use crate::profile::domain::{RequestStatus, VendorId};
use crate::profile::memory::InMemoryRecordStore;
use crate::profile::repository::{RecordStore, StoreError};

#[test]
fn store_refuses_a_second_pending_request_for_the_same_vendor() {
    let store = InMemoryRecordStore::default();
    let vendor = VendorId("sup-900001".to_string());

    store
        .insert_request(pending_request(&vendor, "pcr-900001", "Acme Renamed"))
        .expect("first pending request");

    // Racing submission that skipped the supersede step: the store itself
    // holds the one-pending-per-vendor line.
    let second = store.insert_request(pending_request(&vendor, "pcr-900002", "Acme Again"));
    assert!(matches!(second, Err(StoreError::Conflict)));

    let pending = store
        .pending_request_for(&vendor)
        .expect("lookup succeeds")
        .expect("survivor present");
    assert_eq!(pending.id.0, "pcr-900001");
}

#[test]
fn resolved_requests_do_not_block_a_new_pending_one() {
    let store = InMemoryRecordStore::default();
    let vendor = VendorId("sup-900002".to_string());

    let mut first = store
        .insert_request(pending_request(&vendor, "pcr-900003", "Acme Renamed"))
        .expect("first pending request");
    first.status = RequestStatus::Cancelled;
    store.update_request(first).expect("cancel succeeds");

    store
        .insert_request(pending_request(&vendor, "pcr-900004", "Acme Again"))
        .expect("new pending request after cancellation");
}

#[test]
fn pending_requests_for_different_vendors_coexist() {
    let store = InMemoryRecordStore::default();
    let one = VendorId("sup-900003".to_string());
    let other = VendorId("sup-900004".to_string());

    store
        .insert_request(pending_request(&one, "pcr-900005", "Acme Renamed"))
        .expect("first vendor's request");
    store
        .insert_request(pending_request(&other, "pcr-900006", "Borrowdale Tools"))
        .expect("second vendor's request");

    assert_eq!(store.pending_requests().expect("queue").len(), 2);
}
