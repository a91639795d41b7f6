// # Record Store Trait
//
// Defines the interface to the authoritative DNS record management service.
//
// ## Implementations
//
// - Route 53: `hookdns-aws` crate (`Route53RecordStore`)
//
// ## Usage
//
// ```rust,ignore
// use hookdns_core::RecordStore;
//
// // Read what is currently published
// let sets = store.list_record_sets("Z123", "www.example.com.", "A", 1).await?;
//
// // Submit a batch and check on it
// let info = store.change_record_sets("Z123", &changes).await?;
// let info = store.get_change(&info.id).await?;
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::notification::RecordChange;

/// A published resource record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Fully qualified record name
    pub name: String,
    /// Record type (A, AAAA, CNAME, ...)
    pub record_type: String,
    /// Time-to-live, absent for alias records
    pub ttl: Option<i64>,
    /// Record values in published order
    pub values: Vec<String>,
}

/// Propagation status of a submitted change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Not yet applied on every authoritative server
    Pending,
    /// Applied on every authoritative server
    InSync,
}

impl ChangeStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Pending => "PENDING",
            ChangeStatus::InSync => "INSYNC",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about a submitted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Change identifier, used to poll the status
    pub id: String,
    /// Current propagation status
    pub status: ChangeStatus,
    /// When the DNS service accepted the change
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Trait for DNS record store implementations
///
/// # Trust Level: Untrusted
///
/// Record stores are single-shot: one API call per method invocation, no
/// retries, no polling, no background tasks. The propagation driver owns the
/// polling schedule and the attempt budget.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List record sets in a zone, starting at the given name and type
    ///
    /// Listing is ordered by the DNS service; the first returned set is the
    /// requested one only if it exists. Callers must check.
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Hosted zone to list
    /// - `start_name`: Record name to start listing from
    /// - `start_type`: Record type to start listing from
    /// - `max_items`: Maximum number of record sets to return
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<RecordSet>)`: Up to `max_items` record sets
    /// - `Err(Error)`: Transport or API failure
    async fn list_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: u32,
    ) -> Result<Vec<RecordSet>, crate::Error>;

    /// Submit an ordered change batch
    ///
    /// The batch is applied atomically by the DNS service.
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeInfo)`: The accepted change
    /// - `Err(Error)`: The batch was rejected or could not be sent
    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: &[RecordChange],
    ) -> Result<ChangeInfo, crate::Error>;

    /// Get the current status of a submitted change
    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo, crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
