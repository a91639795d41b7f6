//! Lifecycle notification decoding
//!
//! A lifecycle hook notification arrives wrapped three times:
//!
//! ```text
//! { "Records": [ { "Sns": { "Message": "<json>" } } ] }
//!                                        │
//!                                        ▼
//! { "Event", "EC2InstanceId", "AutoScalingGroupName", "LifecycleHookName",
//!   "LifecycleActionToken", "NotificationMetadata": "<json>" }
//!                                                      │
//!                                                      ▼
//! { "HostedZoneID", "Changes": [ { "Action", "ResourceRecordSet": {
//!     "Name", "TTL", "Type", "ResourceRecords": [ { "Value" } ] } } ] }
//! ```
//!
//! The metadata is supplied by the operator when the hook is created. Its
//! `Name` and `Value` fields are templates, rendered later by
//! [`crate::template`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};

/// Outer event delivered by the transport
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EventEnvelope {
    #[serde(default)]
    records: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EventRecord {
    sns: SnsEvent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnsEvent {
    message: String,
}

/// Lifecycle hook message
///
/// Test notifications only carry the event kind and group name; every other
/// field defaults to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleMessage {
    /// Event kind, e.g. `autoscaling:EC2_INSTANCE_LAUNCHING`
    #[serde(default)]
    pub event: String,

    /// Instance the lifecycle action is paused on
    #[serde(rename = "EC2InstanceId", default)]
    pub instance_id: String,

    /// Scaling group that owns the hook
    #[serde(default)]
    pub auto_scaling_group_name: String,

    /// Hook that fired
    #[serde(default)]
    pub lifecycle_hook_name: String,

    /// Token identifying this lifecycle action
    #[serde(default)]
    pub lifecycle_action_token: String,

    /// Operator-supplied metadata, itself JSON
    #[serde(default)]
    pub notification_metadata: String,
}

/// Operator instruction set carried in the notification metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MutationInstruction {
    /// Hosted zone to operate on
    #[serde(rename = "HostedZoneID", default)]
    pub hosted_zone_id: String,

    /// Ordered record mutations
    #[serde(default)]
    pub changes: Vec<RecordChange>,
}

/// Record mutation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create a record set, failing if it exists
    Create,
    /// Create or replace a record set
    Upsert,
    /// Delete a record set; values must match what is published
    Delete,
}

impl ChangeAction {
    /// Wire representation of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Upsert => "UPSERT",
            ChangeAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record mutation
///
/// Before template resolution `record_set.name` and every value hold template
/// strings; afterwards they hold rendered literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordChange {
    /// What to do with the record set
    pub action: ChangeAction,

    /// The record set to act on
    #[serde(rename = "ResourceRecordSet")]
    pub record_set: ChangeRecordSet,
}

impl RecordChange {
    /// Create a record change with literal (or template) fields
    pub fn new(
        action: ChangeAction,
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: Option<i64>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            action,
            record_set: ChangeRecordSet {
                name: name.into(),
                record_type: record_type.into(),
                ttl,
                records: values
                    .into_iter()
                    .map(|value| ResourceRecord {
                        value: value.into(),
                    })
                    .collect(),
            },
        }
    }

    /// Record name
    pub fn name(&self) -> &str {
        &self.record_set.name
    }

    /// Record type
    pub fn record_type(&self) -> &str {
        &self.record_set.record_type
    }

    /// Record values in order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.record_set.records.iter().map(|r| r.value.as_str())
    }
}

/// Record set portion of a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeRecordSet {
    /// Record name (template before resolution)
    pub name: String,

    /// Record type
    #[serde(rename = "Type")]
    pub record_type: String,

    /// Time-to-live in seconds
    #[serde(rename = "TTL", default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    /// Record values (templates before resolution)
    #[serde(rename = "ResourceRecords", default)]
    pub records: Vec<ResourceRecord>,
}

/// One record value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecord {
    /// Value (template before resolution)
    pub value: String,
}

/// Whether a decoded notification should be acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A real lifecycle action
    Actionable,
    /// A test notification; nothing past decoding may run
    Test,
}

/// A fully decoded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The lifecycle message
    pub message: LifecycleMessage,
    /// The operator instruction set (empty for test notifications)
    pub instruction: MutationInstruction,
    /// Whether to act on it
    pub kind: NotificationKind,
}

impl Notification {
    /// Whether this is a test notification
    pub fn is_test(&self) -> bool {
        self.kind == NotificationKind::Test
    }
}

/// Decode a raw transport payload
///
/// # Parameters
///
/// - `raw`: The payload bytes as delivered by the transport
/// - `test_event`: Event kind that marks a test notification
///
/// # Returns
///
/// - `Ok(Notification)`: Decoded message and instruction
/// - `Err(Error::Decode)`: No records, malformed JSON at any layer, or
///   metadata that does not match the instruction schema
pub fn decode(raw: &[u8], test_event: &str) -> Result<Notification> {
    debug!("Raw event JSON data: {}", String::from_utf8_lossy(raw));

    let envelope: EventEnvelope = serde_json::from_slice(raw)
        .map_err(|e| Error::decode(format!("Error parsing event JSON: {}", e)))?;

    let record = envelope
        .records
        .into_iter()
        .next()
        .ok_or_else(|| Error::decode("Parsed event contains no records"))?;

    let message = decode_message(&record.sns.message)?;

    if message.event == test_event {
        // Test notifications carry no metadata.
        return Ok(Notification {
            message,
            instruction: MutationInstruction::default(),
            kind: NotificationKind::Test,
        });
    }

    let instruction = decode_metadata(&message.notification_metadata)?;

    Ok(Notification {
        message,
        instruction,
        kind: NotificationKind::Actionable,
    })
}

/// Decode the inner lifecycle message
pub fn decode_message(raw: &str) -> Result<LifecycleMessage> {
    debug!("Raw SNS message JSON data: {}", raw);

    serde_json::from_str(raw)
        .map_err(|e| Error::decode(format!("Error parsing SNS message JSON: {}", e)))
}

/// Decode the notification metadata into an instruction set
///
/// Blank metadata decodes to an empty instruction.
pub fn decode_metadata(raw: &str) -> Result<MutationInstruction> {
    debug!("Raw metadata JSON data: {}", raw);

    if raw.trim().is_empty() {
        return Ok(MutationInstruction::default());
    }

    serde_json::from_str(raw)
        .map_err(|e| Error::decode(format!("Error parsing metadata JSON: {}", e)))
}
