//! Retrieve-Multiple Paging Tests
//!
//! Tests for positional paging:
//! - Pages partition the ordered result set
//! - more_records is set iff records exist past the page
//! - Paging cookies are bit-exact and only emitted with more records
//! - Top count and total record count interplay

use crmsim::executor::execute;
use crmsim::query::{OrderExpression, PagingInfo, QueryExpression};
use crmsim::record::Record;
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

fn contact_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn five_contacts() -> Vec<Record> {
    (1..=5)
        .map(|n| Record::with_id("contact", contact_id(n)).with("firstname", format!("C{}", n)))
        .collect()
}

fn page(number: u32, count: u32) -> QueryExpression {
    QueryExpression::new("contact").with_paging(PagingInfo::page(number, count))
}

fn ids(records: &[Record]) -> Vec<Uuid> {
    records.iter().map(Record::id_or_nil).collect()
}

// =============================================================================
// Page Window Tests
// =============================================================================

/// First page of five contacts with page size two.
#[test]
fn test_first_page() {
    let result = execute(&page(1, 2), &five_contacts(), 5000).unwrap();

    assert_eq!(ids(&result.entities), vec![contact_id(1), contact_id(2)]);
    assert!(result.more_records);
    assert_eq!(
        result.paging_cookie.as_deref(),
        Some(
            "<cookie page=\"1\"><contactid \
             last=\"{00000000-0000-0000-0000-000000000002}\" \
             first=\"{00000000-0000-0000-0000-000000000001}\" /></cookie>"
        )
    );
}

/// Middle page cookie carries that page's bounds.
#[test]
fn test_middle_page_cookie() {
    let result = execute(&page(2, 2), &five_contacts(), 5000).unwrap();

    assert_eq!(ids(&result.entities), vec![contact_id(3), contact_id(4)]);
    assert!(result.more_records);
    assert_eq!(
        result.paging_cookie.as_deref(),
        Some(
            "<cookie page=\"2\"><contactid \
             last=\"{00000000-0000-0000-0000-000000000004}\" \
             first=\"{00000000-0000-0000-0000-000000000003}\" /></cookie>"
        )
    );
}

/// Last partial page returns the remainder without a cookie.
#[test]
fn test_last_page() {
    let result = execute(&page(3, 2), &five_contacts(), 5000).unwrap();

    assert_eq!(ids(&result.entities), vec![contact_id(5)]);
    assert!(!result.more_records);
    assert!(result.paging_cookie.is_none());
}

/// A page past the end is empty, not an error.
#[test]
fn test_out_of_range_page() {
    let result = execute(&page(10, 2), &five_contacts(), 5000).unwrap();

    assert!(result.is_empty());
    assert!(!result.more_records);
    assert!(result.paging_cookie.is_none());
}

/// Cookie ids render in braced upper case.
#[test]
fn test_cookie_uppercase_ids() {
    let records = vec![
        Record::with_id("account", Uuid::from_u128(0xa << 96)),
        Record::with_id("account", Uuid::from_u128(0xb << 96)),
        Record::with_id("account", Uuid::from_u128(0xc << 96)),
    ];
    let query = QueryExpression::new("account").with_paging(PagingInfo::page(1, 2));

    let result = execute(&query, &records, 0).unwrap();
    assert_eq!(
        result.paging_cookie.as_deref(),
        Some(
            "<cookie page=\"1\"><accountid \
             last=\"{0000000B-0000-0000-0000-000000000000}\" \
             first=\"{0000000A-0000-0000-0000-000000000000}\" /></cookie>"
        )
    );
}

/// Records without identity render the nil id in the cookie.
#[test]
fn test_cookie_without_identity() {
    let records: Vec<Record> = (0..3).map(|n| Record::new("note").with("n", n)).collect();
    let query = QueryExpression::new("note").with_paging(PagingInfo::page(1, 1));

    let result = execute(&query, &records, 0).unwrap();
    assert_eq!(
        result.paging_cookie.as_deref(),
        Some(
            "<cookie page=\"1\"><noteid \
             last=\"{00000000-0000-0000-0000-000000000000}\" \
             first=\"{00000000-0000-0000-0000-000000000000}\" /></cookie>"
        )
    );
}

/// Paging applies after ordering.
#[test]
fn test_paging_follows_order() {
    let query = page(1, 2).with_order(OrderExpression::desc("firstname"));
    let result = execute(&query, &five_contacts(), 5000).unwrap();

    assert_eq!(ids(&result.entities), vec![contact_id(5), contact_id(4)]);
}

// =============================================================================
// Top Count And Total Count Tests
// =============================================================================

/// Top count of zero yields an empty page.
#[test]
fn test_top_zero() {
    let query = QueryExpression::new("contact").with_top_count(0);
    let result = execute(&query, &five_contacts(), 5000).unwrap();

    assert!(result.is_empty());
    assert!(!result.more_records);
}

/// Top count larger than the set is a no-op.
#[test]
fn test_top_larger_than_set() {
    let query = QueryExpression::new("contact").with_top_count(50);
    let result = execute(&query, &five_contacts(), 5000).unwrap();

    assert_eq!(result.len(), 5);
}

/// Total count reflects the whole set, not the page.
#[test]
fn test_total_record_count() {
    let query = QueryExpression::new("contact")
        .with_paging(PagingInfo::page(2, 2).with_total_record_count());
    let result = execute(&query, &five_contacts(), 5000).unwrap();

    assert_eq!(result.total_record_count, 5);
    assert_eq!(result.len(), 2);
    assert!(!result.total_record_count_limit_exceeded);
}

/// Total count is -1 unless requested.
#[test]
fn test_total_record_count_not_requested() {
    let result = execute(&page(1, 2), &five_contacts(), 5000).unwrap();
    assert_eq!(result.total_record_count, -1);
}

// =============================================================================
// Wire Shape Tests
// =============================================================================

/// Result package serializes with service field names.
#[test]
fn test_result_package_json() {
    let result = execute(&page(1, 2), &five_contacts(), 5000).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(json["EntityName"], "contact");
    assert_eq!(json["MoreRecords"], true);
    assert_eq!(json["Entities"].as_array().unwrap().len(), 2);
    assert!(json["PagingCookie"]
        .as_str()
        .unwrap()
        .starts_with("<cookie page=\"1\">"));
}
