//! Existing-record lookup
//!
//! Reads the values currently published for a record set. This is what lets
//! a DELETE template reference the data being removed instead of guessing it.
//!
//! ## Ordering hazard
//!
//! The lookup reads authoritative state, not the batch being rendered. When
//! called from the template engine the record name must already be rendered,
//! otherwise the query targets a literal template string and will not match.
//! The template engine enforces this; direct callers must do the same.

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::RecordStore;

/// Lookup of published record values, backed by a [`RecordStore`]
#[derive(Clone, Copy)]
pub struct ExistingRecordLookup<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> ExistingRecordLookup<'a> {
    /// Create a lookup over the given record store
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Get the published values of the record set `name`/`record_type`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<String>)`: The record's values in published order
    /// - `Err(Error::RecordNotFound)`: Nothing published under that name and type
    /// - `Err(Error::Query)`: The listing call failed
    pub async fn lookup(&self, zone_id: &str, name: &str, record_type: &str) -> Result<Vec<String>> {
        debug!(
            "Looking for resource record set {} {} in zone ID: {}",
            name, record_type, zone_id
        );

        let sets = self
            .store
            .list_record_sets(zone_id, name, record_type, 1)
            .await
            .map_err(|e| match e {
                Error::Query(_) | Error::RecordNotFound { .. } => e,
                other => Error::query(format!(
                    "{}: error locating resource record: {}",
                    self.store.store_name(),
                    other
                )),
            })?;

        // The listing starts at the requested name but happily returns the
        // next set in zone order when the requested one does not exist.
        let set = sets
            .into_iter()
            .next()
            .filter(|set| names_match(&set.name, name) && set.record_type.eq_ignore_ascii_case(record_type))
            .ok_or_else(|| Error::record_not_found(name, record_type))?;

        Ok(set.values)
    }
}

impl std::fmt::Debug for ExistingRecordLookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExistingRecordLookup")
            .field("store", &self.store.store_name())
            .finish()
    }
}

/// DNS names compare case-insensitively, with or without the root dot.
fn names_match(published: &str, requested: &str) -> bool {
    let published = unescape_name(published);
    let requested = unescape_name(requested);

    published
        .trim_end_matches('.')
        .eq_ignore_ascii_case(requested.trim_end_matches('.'))
}

/// Decode `\NNN` octal escapes, which Route 53 uses in listed names
/// (`\052.example.com.` for `*.example.com.`).
fn unescape_name(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let code = bytes
                .get(i + 1..i + 4)
                .and_then(|digits| std::str::from_utf8(digits).ok())
                .filter(|digits| digits.bytes().all(|b| (b'0'..=b'7').contains(&b)))
                .and_then(|digits| u8::from_str_radix(digits, 8).ok());

            if let Some(code) = code {
                out.push(code);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::RecordChange;
    use crate::traits::{ChangeInfo, RecordSet};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Store returning a fixed listing and recording the listing requests
    struct ListingStore {
        listing: std::result::Result<Vec<RecordSet>, &'static str>,
        requests: Mutex<Vec<(String, String, String, u32)>>,
    }

    impl ListingStore {
        fn new(listing: std::result::Result<Vec<RecordSet>, &'static str>) -> Self {
            Self {
                listing,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecordStore for ListingStore {
        async fn list_record_sets(
            &self,
            zone_id: &str,
            start_name: &str,
            start_type: &str,
            max_items: u32,
        ) -> Result<Vec<RecordSet>> {
            self.requests.lock().unwrap().push((
                zone_id.to_string(),
                start_name.to_string(),
                start_type.to_string(),
                max_items,
            ));
            self.listing.clone().map_err(|e| Error::Other(e.to_string()))
        }

        async fn change_record_sets(&self, _zone_id: &str, _changes: &[RecordChange]) -> Result<ChangeInfo> {
            unreachable!("lookup never mutates")
        }

        async fn get_change(&self, _change_id: &str) -> Result<ChangeInfo> {
            unreachable!("lookup never polls")
        }

        fn store_name(&self) -> &'static str {
            "listing"
        }
    }

    fn a_record(name: &str, values: &[&str]) -> RecordSet {
        RecordSet {
            name: name.to_string(),
            record_type: "A".to_string(),
            ttl: Some(300),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn returns_values_of_exact_match() {
        let store = ListingStore::new(Ok(vec![a_record("i-1.example.com.", &["54.0.0.1", "54.0.0.2"])]));
        let lookup = ExistingRecordLookup::new(&store);

        let values = lookup.lookup("Z1", "i-1.example.com.", "A").await.unwrap();
        assert_eq!(values, vec!["54.0.0.1", "54.0.0.2"]);

        let requests = store.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            &[("Z1".to_string(), "i-1.example.com.".to_string(), "A".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn tolerates_case_and_root_dot() {
        let store = ListingStore::new(Ok(vec![a_record("www.example.com.", &["1.2.3.4"])]));
        let lookup = ExistingRecordLookup::new(&store);

        let values = lookup.lookup("Z1", "WWW.Example.com", "a").await.unwrap();
        assert_eq!(values, vec!["1.2.3.4"]);
    }

    #[tokio::test]
    async fn next_record_in_zone_order_is_not_a_match() {
        let store = ListingStore::new(Ok(vec![a_record("j.example.com.", &["1.2.3.4"])]));
        let lookup = ExistingRecordLookup::new(&store);

        let err = lookup.lookup("Z1", "i.example.com.", "A").await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { .. }));

        let err = lookup.lookup("Z1", "j.example.com.", "AAAA").await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_listing_is_not_found() {
        let store = ListingStore::new(Ok(Vec::new()));
        let lookup = ExistingRecordLookup::new(&store);

        let err = lookup.lookup("Z1", "i.example.com.", "A").await.unwrap_err();
        assert_eq!(err.to_string(), "Resource record set i.example.com. A not found");
    }

    #[tokio::test]
    async fn transport_failure_is_a_query_error() {
        let store = ListingStore::new(Err("throttled"));
        let lookup = ExistingRecordLookup::new(&store);

        let err = lookup.lookup("Z1", "i.example.com.", "A").await.unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn name_comparison() {
        assert!(names_match("a.example.com.", "a.example.com"));
        assert!(names_match("A.EXAMPLE.COM.", "a.example.com."));
        assert!(!names_match("a.example.com.", "b.example.com."));
        assert!(!names_match("a.example.com.", "{{InstanceID}}.example.com."));
    }

    #[test]
    fn octal_escapes_are_decoded() {
        assert_eq!(unescape_name(r"\052.example.com."), "*.example.com.");
        assert_eq!(unescape_name(r"a\100b.example.com."), "a@b.example.com.");
        // Not an escape: fewer than three octal digits follow.
        assert_eq!(unescape_name(r"a\09.example.com."), r"a\09.example.com.");
        assert_eq!(unescape_name("tail\\"), "tail\\");
    }

    #[tokio::test]
    async fn wildcard_record_matches_its_escaped_listing() {
        let store = ListingStore::new(Ok(vec![a_record(r"\052.example.com.", &["1.2.3.4"])]));
        let lookup = ExistingRecordLookup::new(&store);

        let values = lookup.lookup("Z1", "*.example.com.", "A").await.unwrap();
        assert_eq!(values, vec!["1.2.3.4"]);
    }
}
