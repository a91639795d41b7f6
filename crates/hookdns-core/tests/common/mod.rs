//! Test doubles and common utilities for contract tests
//!
//! The doubles count and record every call so tests can assert which
//! collaborators an invocation touched. Counters live behind `Arc` so a test
//! keeps a handle after boxing the double into the engine.

#![allow(dead_code)]

use async_trait::async_trait;
use hookdns_core::error::{Error, Result};
use hookdns_core::traits::{
    ChangeInfo, ChangeStatus, CompleteLifecycleAction, InstanceDescription, InstanceDirectory,
    LifecycleController, RecordSet, RecordStore, Reservation,
};
use hookdns_core::{EngineConfig, LifecycleEngine, RecordChange};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Instance ID the directory reports as missing
pub const BAD_INSTANCE: &str = "bad";

/// Zone ID the record store rejects submissions for
pub const BAD_ZONE: &str = "bad";

/// Instance directory that knows every instance except [`BAD_INSTANCE`]
#[derive(Clone, Default)]
pub struct MockDirectory {
    describe_calls: Arc<AtomicUsize>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of times describe_instances() was called
    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstanceDirectory for MockDirectory {
    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<Reservation>> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);

        let id = instance_ids.first().cloned().unwrap_or_default();
        if id == BAD_INSTANCE {
            return Err(Error::lookup(format!(
                "The instance ID '{}' does not exist",
                id
            )));
        }

        Ok(vec![Reservation {
            instances: vec![InstanceDescription {
                instance_id: Some(id),
                private_ip_address: Some("10.0.0.1".to_string()),
                public_ip_address: Some("54.0.0.1".to_string()),
            }],
        }])
    }

    fn directory_name(&self) -> &'static str {
        "mock"
    }
}

/// Record store over an in-memory zone
///
/// Submissions to [`BAD_ZONE`] and empty batches are rejected. Accepted changes report INSYNC
/// on the first poll unless the store was built with [`MockRecordStore::never_in_sync`].
#[derive(Clone, Default)]
pub struct MockRecordStore {
    published: Arc<Mutex<Vec<RecordSet>>>,
    submitted: Arc<Mutex<Vec<(String, Vec<RecordChange>)>>>,
    list_calls: Arc<AtomicUsize>,
    change_calls: Arc<AtomicUsize>,
    poll_calls: Arc<AtomicUsize>,
    never_in_sync: bool,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose changes stay PENDING forever
    pub fn never_in_sync() -> Self {
        Self {
            never_in_sync: true,
            ..Self::default()
        }
    }

    /// Publish a record set that lookups can find
    pub fn publish(&self, name: &str, record_type: &str, values: &[&str]) {
        self.published.lock().unwrap().push(RecordSet {
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl: Some(3600),
            values: values.iter().map(|v| v.to_string()).collect(),
        });
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn change_calls(&self) -> usize {
        self.change_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    /// Every batch passed to change_record_sets(), with its zone
    pub fn submitted(&self) -> Vec<(String, Vec<RecordChange>)> {
        self.submitted.lock().unwrap().clone()
    }

    /// Total number of calls of any kind
    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.change_calls() + self.poll_calls()
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn list_record_sets(
        &self,
        _zone_id: &str,
        start_name: &str,
        start_type: &str,
        max_items: u32,
    ) -> Result<Vec<RecordSet>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut sets = self.published.lock().unwrap().clone();
        sets.sort_by(|a, b| (&a.name, &a.record_type).cmp(&(&b.name, &b.record_type)));
        Ok(sets
            .into_iter()
            .skip_while(|s| (s.name.as_str(), s.record_type.as_str()) < (start_name, start_type))
            .take(max_items as usize)
            .collect())
    }

    async fn change_record_sets(&self, zone_id: &str, changes: &[RecordChange]) -> Result<ChangeInfo> {
        self.change_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .unwrap()
            .push((zone_id.to_string(), changes.to_vec()));

        if zone_id == BAD_ZONE {
            return Err(Error::submit("NoSuchHostedZone: No hosted zone found with ID: bad"));
        }
        if changes.is_empty() {
            return Err(Error::submit("InvalidChangeBatch: the change batch has no changes"));
        }

        Ok(ChangeInfo {
            id: "/change/C2PWXDT0BBOE0E".to_string(),
            status: ChangeStatus::Pending,
            submitted_at: Some(chrono::Utc::now()),
        })
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);

        Ok(ChangeInfo {
            id: change_id.to_string(),
            status: if self.never_in_sync {
                ChangeStatus::Pending
            } else {
                ChangeStatus::InSync
            },
            submitted_at: None,
        })
    }

    fn store_name(&self) -> &'static str {
        "mock"
    }
}

/// Lifecycle controller that records every completion
#[derive(Clone, Default)]
pub struct RecordingController {
    completions: Arc<Mutex<Vec<CompleteLifecycleAction>>>,
    failing: bool,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller that records completions but rejects them
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn completions(&self) -> Vec<CompleteLifecycleAction> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl LifecycleController for RecordingController {
    async fn complete_lifecycle_action(&self, action: &CompleteLifecycleAction) -> Result<()> {
        self.completions.lock().unwrap().push(action.clone());
        if self.failing {
            return Err(Error::report("No active Lifecycle Action found with token"));
        }
        Ok(())
    }

    fn controller_name(&self) -> &'static str {
        "recording"
    }
}

/// Build an engine over clones of the given doubles with default settings
pub fn engine(
    directory: &MockDirectory,
    store: &MockRecordStore,
    controller: &RecordingController,
) -> LifecycleEngine {
    LifecycleEngine::new(
        Box::new(directory.clone()),
        Box::new(store.clone()),
        Box::new(controller.clone()),
        EngineConfig::default(),
    )
    .unwrap()
}

/// Wrap a lifecycle message in the transport envelope
pub fn payload(event: &str, instance_id: &str, metadata: &str) -> Vec<u8> {
    let message = json!({
        "Event": event,
        "EC2InstanceId": instance_id,
        "AutoScalingGroupName": "ASGName",
        "LifecycleHookName": "Lifecycle",
        "LifecycleActionToken": "Token",
        "NotificationMetadata": metadata,
    });

    serde_json::to_vec(&json!({
        "Records": [ { "Sns": { "Message": message.to_string() } } ]
    }))
    .unwrap()
}

/// Launch notification carrying the given metadata
pub fn launching(instance_id: &str, metadata: &str) -> Vec<u8> {
    payload("autoscaling:EC2_INSTANCE_LAUNCHING", instance_id, metadata)
}

/// Two-record batch: an A record for the instance and a CNAME pointing at it
pub fn two_record_metadata(zone_id: &str) -> String {
    json!({
        "HostedZoneID": zone_id,
        "Changes": [
            {
                "Action": "UPSERT",
                "ResourceRecordSet": {
                    "Name": "{{InstanceID}}.example.com.",
                    "TTL": 3600,
                    "Type": "A",
                    "ResourceRecords": [ { "Value": "{{InstancePublicIPAddress}}" } ]
                }
            },
            {
                "Action": "UPSERT",
                "ResourceRecordSet": {
                    "Name": "www.example.com.",
                    "TTL": 3600,
                    "Type": "CNAME",
                    "ResourceRecords": [ { "Value": "{{InstanceID}}.example.com." } ]
                }
            }
        ]
    })
    .to_string()
}
