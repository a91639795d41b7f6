//! Instance attribute resolution
//!
//! Fetches the network attributes a template can reference. Missing
//! addresses are rendered as empty strings rather than failing: on
//! termination the instance has usually released them already. Operators
//! deleting records on termination should use `ExistingRDataValue` instead of
//! the address placeholders.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::InstanceDirectory;

/// Resolved instance attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceAttributes {
    /// The instance ID
    pub instance_id: String,
    /// Private address, or empty
    pub private_ip_address: String,
    /// Public address, or empty
    pub public_ip_address: String,
}

/// Resolve the attributes of a single instance
///
/// # Returns
///
/// - `Ok(InstanceAttributes)`: The first matching instance
/// - `Err(Error::InstanceNotFound)`: No reservation or no instance matched
/// - `Err(Error::Lookup)`: The directory call failed
pub async fn resolve_attributes(
    directory: &dyn InstanceDirectory,
    instance_id: &str,
) -> Result<InstanceAttributes> {
    info!("Fetching instance data for ID: {}", instance_id);

    let reservations = directory
        .describe_instances(&[instance_id.to_string()])
        .await
        .map_err(|e| match e {
            Error::Lookup(_) | Error::InstanceNotFound(_) => e,
            other => Error::lookup(format!(
                "{}: error fetching instance data: {}",
                directory.directory_name(),
                other
            )),
        })?;

    let instance = reservations
        .into_iter()
        .next()
        .and_then(|reservation| reservation.instances.into_iter().next())
        .ok_or_else(|| Error::instance_not_found(format!("Cannot find instance ID {}", instance_id)))?;

    debug!("Instance data returned: {:?}", instance);

    Ok(InstanceAttributes {
        instance_id: instance_id.to_string(),
        private_ip_address: non_empty(instance.private_ip_address),
        public_ip_address: non_empty(instance.public_ip_address),
    })
}

fn non_empty(value: Option<String>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_default()
}
