//! Change batch submission and propagation polling
//!
//! The driver submits a rendered batch exactly once, then polls the change
//! status until the DNS service reports INSYNC or the attempt budget runs out.
//!
//! ```text
//!  submit ──► PENDING ──poll──► INSYNC      ─► Ok(handle)
//!                │
//!                └──budget spent──► TIMED_OUT ─► Err(PropagationTimeout)
//! ```
//!
//! A failed poll is logged and counted against the budget; it does not end
//! the wait on its own. While polling, a heartbeat task logs progress once per
//! interval. The heartbeat is owned by [`Heartbeat`], which stops it when the
//! wait ends for any reason.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, info, warn};

use crate::config::PropagationConfig;
use crate::error::{Error, Result};
use crate::notification::RecordChange;
use crate::traits::{ChangeStatus, RecordStore};

/// A change that reached INSYNC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationHandle {
    /// Change identifier assigned by the DNS service
    pub change_id: String,
    /// When the DNS service accepted the change, if reported
    pub submitted_at: Option<DateTime<Utc>>,
    /// Number of status polls it took
    pub polls: u32,
}

/// Submits change batches and waits for them to propagate
pub struct PropagationDriver<'a> {
    store: &'a dyn RecordStore,
    config: PropagationConfig,
}

impl<'a> PropagationDriver<'a> {
    /// Create a driver over the given record store
    pub fn new(store: &'a dyn RecordStore, config: PropagationConfig) -> Self {
        Self { store, config }
    }

    /// Submit a change batch and wait until it is INSYNC
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Hosted zone the batch applies to
    /// - `changes`: Rendered record changes, in order
    ///
    /// # Returns
    ///
    /// - `Ok(PropagationHandle)`: The change is live on every authoritative server
    /// - `Err(Error::Submit)`: The batch was rejected; nothing was polled
    /// - `Err(Error::PropagationTimeout)`: The budget ran out before INSYNC
    pub async fn submit(&self, zone_id: &str, changes: &[RecordChange]) -> Result<PropagationHandle> {
        info!(
            "Submitting change batch of {} record(s) to zone ID: {}",
            changes.len(),
            zone_id
        );

        let info = self
            .store
            .change_record_sets(zone_id, changes)
            .await
            .map_err(|e| match e {
                Error::Submit(_) => e,
                other => Error::submit(format!("{}: {}", self.store.store_name(), other)),
            })?;

        info!(
            "Change {} accepted with status {}",
            info.id, info.status
        );

        if info.status == ChangeStatus::InSync {
            return Ok(PropagationHandle {
                change_id: info.id,
                submitted_at: info.submitted_at,
                polls: 0,
            });
        }

        let polls = self.wait_until_in_sync(&info.id).await?;

        Ok(PropagationHandle {
            change_id: info.id,
            submitted_at: info.submitted_at,
            polls,
        })
    }

    /// Poll a change until INSYNC, returning the number of polls made
    async fn wait_until_in_sync(&self, change_id: &str) -> Result<u32> {
        let interval = self.config.poll_interval();
        let max_attempts = self.config.max_attempts;
        let _heartbeat = Heartbeat::start(change_id, interval);

        for attempt in 1..=max_attempts {
            match self.store.get_change(change_id).await {
                Ok(info) if info.status == ChangeStatus::InSync => {
                    info!("Change {} is INSYNC after {} status check(s)", change_id, attempt);
                    return Ok(attempt);
                }
                Ok(info) => {
                    debug!(
                        "Change {} is {} ({}/{})",
                        change_id, info.status, attempt, max_attempts
                    );
                }
                Err(e) => {
                    warn!(
                        "Status check {}/{} for change {} failed: {}",
                        attempt, max_attempts, change_id, e
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(Error::PropagationTimeout {
            change_id: change_id.to_string(),
            attempts: max_attempts,
        })
    }
}

/// Background progress logger for a change being polled
///
/// Dropping the guard stops the task.
pub struct Heartbeat {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Heartbeat {
    /// Start logging progress for `change_id` once per `period`
    pub fn start(change_id: &str, period: Duration) -> Self {
        let (stop, mut stopped) = oneshot::channel::<()>();
        let change_id = change_id.to_string();
        // interval_at panics on a zero period.
        let period = period.max(Duration::from_millis(1));
        let started = Instant::now();
        let mut ticks = IntervalStream::new(tokio::time::interval_at(started + period, period));

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    tick = ticks.next() => match tick {
                        Some(_) => info!(
                            "Still waiting for change {}, elapsed {}s",
                            change_id,
                            started.elapsed().as_secs()
                        ),
                        None => break,
                    },
                }
            }
        });

        Self {
            stop: Some(stop),
            task,
        }
    }

    /// Whether the background task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.abort();
    }
}
