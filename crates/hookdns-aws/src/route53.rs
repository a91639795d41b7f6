//! Route 53 record store
//!
//! # Dry-Run Mode
//!
//! When `dry_run` is true, the store will:
//! - Perform every `ListResourceRecordSets` call
//! - Build and log the `ChangeResourceRecordSets` batch
//! - **NOT** submit it, and report a synthetic INSYNC change instead

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction as SdkChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use hookdns_core::traits::{ChangeInfo, ChangeStatus, RecordSet, RecordStore};
use hookdns_core::{Error, RecordChange, Result};
use tracing::{debug, info};

/// Change ID prefix reported for batches that were never submitted
const DRY_RUN_CHANGE_PREFIX: &str = "dry-run/";

/// Record store backed by Route 53
#[derive(Debug, Clone)]
pub struct Route53RecordStore {
    client: aws_sdk_route53::Client,

    /// Dry-run mode: if true, perform reads but skip submissions
    dry_run: bool,
}

impl Route53RecordStore {
    /// Create a new Route 53 record store
    ///
    /// # Parameters
    ///
    /// - `client`: Route 53 client
    /// - `dry_run`: If true, perform lookups but skip change submissions
    pub fn new(client: aws_sdk_route53::Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Whether submissions are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl RecordStore for Route53RecordStore {
    async fn list_record_sets(
        &self,
        zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: u32,
    ) -> Result<Vec<RecordSet>> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(start_name)
            .start_record_type(RrType::from(start_type))
            .max_items(i32::try_from(max_items).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(|e| {
                Error::query(format!(
                    "ListResourceRecordSets failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output
            .resource_record_sets()
            .iter()
            .map(record_set_from_sdk)
            .collect())
    }

    async fn change_record_sets(&self, zone_id: &str, changes: &[RecordChange]) -> Result<ChangeInfo> {
        let batch = change_batch(changes).map_err(|e| Error::submit(format!("{:#}", e)))?;

        if self.dry_run {
            info!(
                "[DRY-RUN] Would submit change batch to zone ID {}: {}",
                zone_id,
                serde_json::to_string(changes)?
            );
            return Ok(ChangeInfo {
                id: format!("{}{}", DRY_RUN_CHANGE_PREFIX, zone_id),
                status: ChangeStatus::InSync,
                submitted_at: Some(chrono::Utc::now()),
            });
        }

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                Error::submit(format!(
                    "ChangeResourceRecordSets failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let info = output
            .change_info()
            .ok_or_else(|| Error::submit("ChangeResourceRecordSets returned no change info"))?;

        Ok(change_info_from_sdk(info))
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        if change_id.starts_with(DRY_RUN_CHANGE_PREFIX) {
            debug!("[DRY-RUN] Change {} is INSYNC", change_id);
            return Ok(ChangeInfo {
                id: change_id.to_string(),
                status: ChangeStatus::InSync,
                submitted_at: None,
            });
        }

        let output = self
            .client
            .get_change()
            .id(change_id)
            .send()
            .await
            .map_err(|e| Error::Other(format!("GetChange failed: {}", DisplayErrorContext(&e))))?;

        let info = output
            .change_info()
            .ok_or_else(|| Error::Other(format!("GetChange returned no change info for {}", change_id)))?;

        Ok(change_info_from_sdk(info))
    }

    fn store_name(&self) -> &'static str {
        "route53"
    }
}

/// Convert an ordered list of rendered changes into a Route 53 change batch
fn change_batch(changes: &[RecordChange]) -> anyhow::Result<ChangeBatch> {
    // Route 53 rejects an empty batch; refuse it here so dry-run agrees.
    anyhow::ensure!(!changes.is_empty(), "InvalidChangeBatch: change batch has no changes");

    let changes = changes
        .iter()
        .enumerate()
        .map(|(index, change)| {
            sdk_change(change).with_context(|| format!("record set #{} ({})", index, change.name()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    ChangeBatch::builder()
        .set_changes(Some(changes))
        .build()
        .context("invalid change batch")
}

fn sdk_change(change: &RecordChange) -> anyhow::Result<Change> {
    let records = change
        .values()
        .map(|value| ResourceRecord::builder().value(value).build())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("invalid resource record")?;

    let record_set = ResourceRecordSet::builder()
        .name(change.name())
        .r#type(RrType::from(change.record_type()))
        .set_ttl(change.record_set.ttl)
        .set_resource_records((!records.is_empty()).then_some(records))
        .build()
        .context("invalid resource record set")?;

    Ok(Change::builder()
        .action(SdkChangeAction::from(change.action.as_str()))
        .resource_record_set(record_set)
        .build()?)
}

fn record_set_from_sdk(set: &ResourceRecordSet) -> RecordSet {
    RecordSet {
        name: set.name().to_string(),
        record_type: set.r#type().as_str().to_string(),
        ttl: set.ttl(),
        values: set
            .resource_records()
            .iter()
            .map(|record| record.value().to_string())
            .collect(),
    }
}

fn change_info_from_sdk(info: &aws_sdk_route53::types::ChangeInfo) -> ChangeInfo {
    let status = match info.status().as_str() {
        "INSYNC" => ChangeStatus::InSync,
        _ => ChangeStatus::Pending,
    };
    let submitted = info.submitted_at();

    ChangeInfo {
        id: info.id().to_string(),
        status,
        submitted_at: chrono::DateTime::from_timestamp(submitted.secs(), submitted.subsec_nanos()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_route53::primitives::DateTime;
    use aws_sdk_route53::types::ChangeStatus as SdkChangeStatus;
    use hookdns_core::notification::ChangeAction;

    #[test]
    fn batch_keeps_order_and_fields() {
        let changes = vec![
            RecordChange::new(ChangeAction::Upsert, "i-1.example.com.", "A", Some(3600), ["54.0.0.1"]),
            RecordChange::new(ChangeAction::Delete, "www.example.com.", "CNAME", None, ["i-1.example.com."]),
        ];

        let batch = change_batch(&changes).unwrap();
        let sdk = batch.changes();
        assert_eq!(sdk.len(), 2);

        assert_eq!(sdk[0].action().as_str(), "UPSERT");
        let first = sdk[0].resource_record_set().unwrap();
        assert_eq!(first.name(), "i-1.example.com.");
        assert_eq!(first.r#type().as_str(), "A");
        assert_eq!(first.ttl(), Some(3600));
        assert_eq!(first.resource_records()[0].value(), "54.0.0.1");

        assert_eq!(sdk[1].action().as_str(), "DELETE");
        assert_eq!(sdk[1].resource_record_set().unwrap().ttl(), None);
    }

    #[test]
    fn maps_listed_record_set() {
        let sdk = ResourceRecordSet::builder()
            .name("www.example.com.")
            .r#type(RrType::A)
            .ttl(300)
            .resource_records(ResourceRecord::builder().value("1.2.3.4").build().unwrap())
            .resource_records(ResourceRecord::builder().value("1.2.3.5").build().unwrap())
            .build()
            .unwrap();

        assert_eq!(
            record_set_from_sdk(&sdk),
            RecordSet {
                name: "www.example.com.".to_string(),
                record_type: "A".to_string(),
                ttl: Some(300),
                values: vec!["1.2.3.4".to_string(), "1.2.3.5".to_string()],
            }
        );
    }

    #[test]
    fn maps_change_status() {
        let sdk = aws_sdk_route53::types::ChangeInfo::builder()
            .id("/change/C1")
            .status(SdkChangeStatus::Insync)
            .submitted_at(DateTime::from_secs(1_700_000_000))
            .build()
            .unwrap();

        let info = change_info_from_sdk(&sdk);
        assert_eq!(info.id, "/change/C1");
        assert_eq!(info.status, ChangeStatus::InSync);
        assert_eq!(info.submitted_at.map(|t| t.timestamp()), Some(1_700_000_000));

        let pending = aws_sdk_route53::types::ChangeInfo::builder()
            .id("/change/C2")
            .status(SdkChangeStatus::Pending)
            .submitted_at(DateTime::from_secs(0))
            .build()
            .unwrap();
        assert_eq!(change_info_from_sdk(&pending).status, ChangeStatus::Pending);
    }

    #[tokio::test]
    async fn dry_run_reports_in_sync_without_calling_route53() {
        let config = aws_sdk_route53::Config::builder()
            .behavior_version(aws_sdk_route53::config::BehaviorVersion::latest())
            .region(aws_sdk_route53::config::Region::new("us-east-1"))
            .build();
        let store = Route53RecordStore::new(aws_sdk_route53::Client::from_conf(config), true);
        assert!(store.is_dry_run());

        let changes = vec![RecordChange::new(
            ChangeAction::Create,
            "i-1.example.com.",
            "A",
            Some(60),
            ["54.0.0.1"],
        )];

        let info = store.change_record_sets("Z1", &changes).await.unwrap();
        assert_eq!(info.status, ChangeStatus::InSync);

        let polled = store.get_change(&info.id).await.unwrap();
        assert_eq!(polled.status, ChangeStatus::InSync);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_even_in_dry_run() {
        let config = aws_sdk_route53::Config::builder()
            .behavior_version(aws_sdk_route53::config::BehaviorVersion::latest())
            .region(aws_sdk_route53::config::Region::new("us-east-1"))
            .build();
        let store = Route53RecordStore::new(aws_sdk_route53::Client::from_conf(config), true);

        let err = store.change_record_sets("Z1", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Submit(_)));
        assert!(err.to_string().contains("InvalidChangeBatch"));
    }
}
