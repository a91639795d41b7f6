//! Core traits for hookdns
//!
//! This module defines the abstract interfaces of the external collaborators.
//!
//! - [`InstanceDirectory`]: Look up compute instances by ID
//! - [`RecordStore`]: List, mutate and poll authoritative DNS record sets
//! - [`LifecycleController`]: Complete a paused lifecycle action

pub mod instance_directory;
pub mod lifecycle_controller;
pub mod record_store;

pub use instance_directory::{InstanceDescription, InstanceDirectory, Reservation};
pub use lifecycle_controller::{CompleteLifecycleAction, LifecycleController, LifecycleResult};
pub use record_store::{ChangeInfo, ChangeStatus, RecordSet, RecordStore};
